//! Korean lunisolar calendar, computed from new moons and principal terms.
//!
//! Months run from new moon to new moon, each dated by the civil day on
//! which the new moon falls at the Korean standard meridian of the time.
//! Month 11 holds the winter solstice. When thirteen months separate two
//! solstice months, the first one without a principal term (중기) is the
//! leap month and repeats the number before it.
//!
//! This is the Korean almanac rule. It parts from the Chinese calendar
//! ([`super::LunarTable`]) whenever a new moon or principal term falls in
//! the hour before Beijing midnight: 2012 has a leap 3rd month in Korea and
//! a leap 4th in China, and 1997 starts a day later in Korea.

use chrono::{Datelike, NaiveDate};

use super::astro::{new_moon, solar_longitude_instant, LUNATIONS_PER_YEAR};
use super::lunar::{LunarDate, LUNAR_END_YEAR, LUNAR_START_YEAR};
use super::{julian_day_number, LunarCalendar};
use crate::error::{CoreError, CoreResult};

/// Events this close to local midnight cannot be assigned a civil day.
const UNRESOLVED_WINDOW_MINUTES: f64 = 0.5;

const MINUTES_PER_DAY: f64 = 1440.0;

/// Seoul local mean time (126°58′ E), in use before 1908-04-01.
const SEOUL_MEAN_TIME_MINUTES: f64 = 507.912;

/// First Julian day number and UTC offset (minutes) of each standard-time era.
const STANDARD_TIME_ERAS: [(i64, f64); 4] = [
    (2_418_033, 510.0), // 1908-04-01, 127°30′ E
    (2_419_403, 540.0), // 1912-01-01, 135° E
    (2_434_823, 510.0), // 1954-03-21
    (2_437_522, 540.0), // 1961-08-10
];

/// Civil day of an astronomical event, and the neighbouring day it may
/// belong to when it falls within the unresolved window of midnight.
#[derive(Debug, Clone, Copy)]
struct LocalDay {
    day: i64,
    alternative: Option<i64>,
}

fn utc_offset_minutes(jd_ut: f64) -> f64 {
    let day = (jd_ut + 0.5).floor() as i64;
    STANDARD_TIME_ERAS
        .iter()
        .rev()
        .find(|(start, _)| day >= *start)
        .map_or(SEOUL_MEAN_TIME_MINUTES, |&(_, offset)| offset)
}

fn local_day(jd_ut: f64) -> LocalDay {
    let local = jd_ut + 0.5 + utc_offset_minutes(jd_ut) / MINUTES_PER_DAY;
    let floor = local.floor();
    let minutes = (local - floor) * MINUTES_PER_DAY;
    let day = floor as i64;
    let alternative = if minutes < UNRESOLVED_WINDOW_MINUTES {
        Some(day - 1)
    } else if MINUTES_PER_DAY - minutes < UNRESOLVED_WINDOW_MINUTES {
        Some(day + 1)
    } else {
        None
    };
    LocalDay { day, alternative }
}

/// One month of a lunar year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LunarMonth {
    pub month: u32,
    pub leap: bool,
    /// Julian day number of day 1.
    pub start: i64,
    pub days: u32,
    /// False when a boundary of the month lies too close to midnight to date.
    pub resolved: bool,
}

impl LunarMonth {
    fn contains(&self, jdn: i64) -> bool {
        (self.start..self.start + self.days as i64).contains(&jdn)
    }
}

fn span_error(year: i32) -> CoreError {
    CoreError::CalendarConversion(format!(
        "cannot place the lunar months between the {year} and {} winter solstices",
        year + 1
    ))
}

/// Months from month 11 of `year` up to, not including, month 11 of `year + 1`.
fn solstice_span(year: i32) -> CoreResult<Vec<LunarMonth>> {
    let solstices = [
        local_day(solar_longitude_instant(year, 270.0)),
        local_day(solar_longitude_instant(year + 1, 270.0)),
    ];
    let first = ((year as f64 + 10.5 / 12.0 - 2000.0) * LUNATIONS_PER_YEAR).floor() as i64 - 2;
    let moons: Vec<LocalDay> = (first..first + 20).map(|k| local_day(new_moon(k))).collect();

    let last_on_or_before = |day: i64| moons.iter().rposition(|m| m.day <= day);
    let (Some(open), Some(close)) = (
        last_on_or_before(solstices[0].day),
        last_on_or_before(solstices[1].day),
    ) else {
        return Err(span_error(year));
    };
    let count = close.checked_sub(open).ok_or_else(|| span_error(year))?;
    if count != 12 && count != 13 {
        return Err(span_error(year));
    }
    let bounds = &moons[open..=close];
    let starts: Vec<i64> = bounds.iter().map(|m| m.day).collect();

    let principal_terms: Vec<LocalDay> = [year, year + 1]
        .into_iter()
        .flat_map(|y| (0..12).map(move |i| local_day(solar_longitude_instant(y, 30.0 * i as f64))))
        .collect();

    // An event near midnight matters only if the other candidate day sits in another month.
    let month_of = |day: i64| starts.iter().rposition(|&s| s <= day);
    let changes_month = |event: &LocalDay| {
        event
            .alternative
            .is_some_and(|alt| month_of(alt) != month_of(event.day))
    };
    let mut span_resolved = !solstices.iter().any(|s| changes_month(s));
    if count == 13 {
        span_resolved &= !principal_terms.iter().any(|t| changes_month(t));
    }

    let mut months = Vec::with_capacity(count);
    let mut number = 11;
    let mut leap_pending = count == 13;
    for (i, pair) in bounds.windows(2).enumerate() {
        let (start, end) = (pair[0].day, pair[1].day);
        let has_principal_term = principal_terms.iter().any(|t| (start..end).contains(&t.day));
        let leap = leap_pending && i > 0 && !has_principal_term;
        if leap {
            leap_pending = false;
        } else if i > 0 {
            number = number % 12 + 1;
        }
        months.push(LunarMonth {
            month: number,
            leap,
            start,
            days: (end - start) as u32,
            resolved: span_resolved && pair[0].alternative.is_none() && pair[1].alternative.is_none(),
        });
    }
    Ok(months)
}

fn out_of_range(year: i32) -> CoreError {
    CoreError::CalendarConversion(format!(
        "lunar year {year} outside supported range {LUNAR_START_YEAR}-{LUNAR_END_YEAR}"
    ))
}

fn lunar_year(year: i32) -> CoreResult<Vec<LunarMonth>> {
    if !(LUNAR_START_YEAR..=LUNAR_END_YEAR).contains(&year) {
        return Err(out_of_range(year));
    }
    let is_new_year = |m: &LunarMonth| m.month == 1 && !m.leap;
    let previous = solstice_span(year - 1)?;
    let current = solstice_span(year)?;

    let first = previous
        .iter()
        .position(is_new_year)
        .ok_or_else(|| span_error(year - 1))?;
    let mut months = previous[first..].to_vec();
    months.extend(current.into_iter().take_while(|m| !is_new_year(m)));
    Ok(months)
}

fn date_from_jdn(jdn: i64) -> CoreResult<NaiveDate> {
    i32::try_from(jdn - 1_721_425)
        .ok()
        .and_then(NaiveDate::from_num_days_from_ce_opt)
        .ok_or_else(|| CoreError::CalendarConversion(format!("day number {jdn} is not a calendar date")))
}

fn unresolved(year: i32, month: &LunarMonth) -> CoreError {
    CoreError::CalendarConversion(format!(
        "lunar {year}-{}{} starts or ends within {UNRESOLVED_WINDOW_MINUTES} minutes of midnight \
         and cannot be dated",
        month.month,
        if month.leap { " leap" } else { "" }
    ))
}

/// Lunar calendar as observed in Korea, lunar years 1900 to 2100.
#[derive(Debug, Clone, Copy, Default)]
pub struct KoreanCalendar;

impl KoreanCalendar {
    /// Months of `year` in order, leap month included.
    pub fn months(&self, year: i32) -> CoreResult<Vec<LunarMonth>> {
        lunar_year(year)
    }

    pub fn leap_month(&self, year: i32) -> CoreResult<Option<u32>> {
        Ok(lunar_year(year)?.iter().find(|m| m.leap).map(|m| m.month))
    }

    pub fn month_length(&self, year: i32, month: u32, leap: bool) -> CoreResult<u32> {
        Ok(self.month(year, month, leap)?.days)
    }

    fn month(&self, year: i32, month: u32, leap: bool) -> CoreResult<LunarMonth> {
        if !(1..=12).contains(&month) {
            return Err(CoreError::CalendarConversion(format!("lunar month {month} out of range (1-12)")));
        }
        lunar_year(year)?
            .into_iter()
            .find(|m| m.month == month && m.leap == leap)
            .ok_or_else(|| {
                CoreError::CalendarConversion(if leap {
                    format!("lunar year {year} has no leap month {month}")
                } else {
                    format!("lunar year {year} has no month {month}")
                })
            })
    }
}

impl LunarCalendar for KoreanCalendar {
    fn name(&self) -> &str {
        "korean-astronomical"
    }

    fn to_solar(&self, date: LunarDate) -> CoreResult<NaiveDate> {
        let month = self.month(date.year, date.month, date.leap_month)?;
        if date.day < 1 || date.day > month.days {
            return Err(CoreError::CalendarConversion(format!(
                "lunar day {} out of range for {}-{}{} ({} days)",
                date.day,
                date.year,
                date.month,
                if date.leap_month { " leap" } else { "" },
                month.days
            )));
        }
        if !month.resolved {
            return Err(unresolved(date.year, &month));
        }
        date_from_jdn(month.start + (date.day - 1) as i64)
    }

    fn to_lunar(&self, date: NaiveDate) -> CoreResult<LunarDate> {
        let jdn = julian_day_number(date);
        // Before the lunar new year a date still belongs to the previous lunar year.
        for year in [date.year(), date.year() - 1] {
            if !(LUNAR_START_YEAR..=LUNAR_END_YEAR).contains(&year) {
                continue;
            }
            if let Some(month) = lunar_year(year)?.into_iter().find(|m| m.contains(jdn)) {
                if !month.resolved {
                    return Err(unresolved(year, &month));
                }
                return Ok(LunarDate {
                    year,
                    month: month.month,
                    day: (jdn - month.start) as u32 + 1,
                    leap_month: month.leap,
                });
            }
        }
        Err(CoreError::CalendarConversion(format!(
            "solar date {date} is outside lunar years {LUNAR_START_YEAR}-{LUNAR_END_YEAR}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::LunarTable;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn lunar(year: i32, month: u32, day: u32, leap_month: bool) -> LunarDate {
        LunarDate { year, month, day, leap_month }
    }

    #[test]
    fn test_new_years() {
        let cal = KoreanCalendar;
        assert_eq!(cal.to_solar(lunar(1900, 1, 1, false)).unwrap(), ymd(1900, 1, 31));
        assert_eq!(cal.to_solar(lunar(1990, 1, 1, false)).unwrap(), ymd(1990, 1, 27));
        assert_eq!(cal.to_solar(lunar(2020, 1, 1, false)).unwrap(), ymd(2020, 1, 25));
        assert_eq!(cal.to_solar(lunar(2024, 1, 1, false)).unwrap(), ymd(2024, 2, 10));
        assert_eq!(cal.to_solar(lunar(2100, 1, 1, false)).unwrap(), ymd(2100, 2, 9));
    }

    #[test]
    fn test_new_year_a_day_after_china() {
        let cal = KoreanCalendar;
        assert_eq!(cal.to_solar(lunar(1997, 1, 1, false)).unwrap(), ymd(1997, 2, 8));
        assert_eq!(LunarTable.to_solar(lunar(1997, 1, 1, false)).unwrap(), ymd(1997, 2, 7));
        assert_eq!(cal.to_solar(lunar(2027, 1, 1, false)).unwrap(), ymd(2027, 2, 7));
    }

    #[test]
    fn test_2012_leap_third_month() {
        let cal = KoreanCalendar;
        assert_eq!(cal.leap_month(2012).unwrap(), Some(3));
        assert_eq!(LunarTable.leap_month(2012).unwrap(), Some(4));

        assert_eq!(cal.to_solar(lunar(2012, 3, 1, true)).unwrap(), ymd(2012, 4, 21));
        assert_eq!(cal.to_solar(lunar(2012, 4, 1, false)).unwrap(), ymd(2012, 5, 21));
        assert_eq!(cal.to_solar(lunar(2012, 4, 8, false)).unwrap(), ymd(2012, 5, 28));
        assert_eq!(cal.to_solar(lunar(2012, 5, 1, false)).unwrap(), ymd(2012, 6, 20));

        let err = cal.to_solar(lunar(2012, 4, 1, true)).unwrap_err();
        assert!(matches!(err, CoreError::CalendarConversion(_)));
        assert_eq!(cal.to_lunar(ymd(2012, 4, 21)).unwrap(), lunar(2012, 3, 1, true));
    }

    #[test]
    fn test_2017_leap_fifth_month() {
        let cal = KoreanCalendar;
        assert_eq!(cal.leap_month(2017).unwrap(), Some(5));
        assert_eq!(cal.to_solar(lunar(2017, 5, 1, true)).unwrap(), ymd(2017, 6, 24));
        assert!(cal.to_solar(lunar(2017, 6, 1, true)).is_err());
        assert_eq!(cal.to_solar(lunar(2017, 8, 15, false)).unwrap(), ymd(2017, 10, 4));
    }

    #[test]
    fn test_agrees_with_table_where_calendars_match() {
        let cal = KoreanCalendar;
        assert_eq!(cal.to_solar(lunar(1990, 4, 21, false)).unwrap(), ymd(1990, 5, 15));
        assert_eq!(cal.to_solar(lunar(2020, 4, 1, true)).unwrap(), ymd(2020, 5, 23));
        assert_eq!(cal.to_solar(lunar(2024, 8, 15, false)).unwrap(), ymd(2024, 9, 17));
        assert_eq!(cal.month_length(2020, 4, true).unwrap(), 29);
    }

    #[test]
    fn test_month_on_midnight_new_moon_rejected() {
        // The new moon of 2097-01-13 falls seconds from Seoul midnight.
        let cal = KoreanCalendar;
        let months = cal.months(2096).unwrap();
        let december = months.iter().find(|m| m.month == 12).unwrap();
        assert!(!december.resolved);

        let err = cal.to_solar(lunar(2096, 12, 1, false)).unwrap_err();
        assert!(matches!(err, CoreError::CalendarConversion(_)));
        assert!(cal.to_lunar(ymd(2097, 1, 20)).is_err());
        assert_eq!(cal.to_solar(lunar(2096, 10, 1, false)).unwrap(), ymd(2096, 11, 15));
    }

    #[test]
    fn test_out_of_range_rejected() {
        let cal = KoreanCalendar;
        assert!(cal.to_solar(lunar(1899, 12, 1, false)).is_err());
        assert!(cal.to_solar(lunar(2101, 1, 1, false)).is_err());
        assert!(cal.to_solar(lunar(2000, 13, 1, false)).is_err());
        assert!(cal.to_solar(lunar(2000, 1, 31, false)).is_err());
        assert!(cal.to_lunar(ymd(1900, 1, 30)).is_err());
        assert!(cal.to_lunar(ymd(2150, 1, 1)).is_err());
    }

    #[test]
    fn test_to_lunar_inverts_to_solar() {
        let cal = KoreanCalendar;
        let cases = [
            lunar(1990, 4, 21, false),
            lunar(2012, 3, 15, true),
            lunar(2017, 12, 29, false),
            lunar(1955, 3, 10, true),
            lunar(2033, 11, 1, false),
        ];
        for case in cases {
            let solar = cal.to_solar(case).unwrap();
            assert_eq!(cal.to_lunar(solar).unwrap(), case, "{solar}");
        }
    }

    #[test]
    fn test_leap_month_after_eleventh() {
        assert_eq!(KoreanCalendar.leap_month(2033).unwrap(), Some(11));
        assert_eq!(KoreanCalendar.to_solar(lunar(2033, 11, 1, true)).unwrap(), ymd(2033, 12, 22));
    }

    #[test]
    fn test_years_are_contiguous() {
        let cal = KoreanCalendar;
        for year in (1900..2100).step_by(7) {
            let months = cal.months(year).unwrap();
            assert!(months.len() == 12 || months.len() == 13, "{year}");
            assert_eq!((months[0].month, months[0].leap), (1, false));
            assert_eq!(months.iter().filter(|m| m.leap).count(), months.len() - 12);
            assert!(months.iter().all(|m| m.days == 29 || m.days == 30), "{year}");
            for pair in months.windows(2) {
                assert_eq!(pair[0].start + pair[0].days as i64, pair[1].start, "{year}");
            }
            let last = months[months.len() - 1];
            let next = cal.months(year + 1).unwrap();
            assert_eq!(last.start + last.days as i64, next[0].start, "{year}");
        }
    }
}
