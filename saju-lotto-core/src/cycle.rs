//! Sexagenary (60-step) cycle and the four pillars.
//!
//! Reference points:
//! - year: 1984 is 甲子, and the saju year starts at 입춘 (solar longitude 315°)
//! - day: 2000-01-01 is 戊午, i.e. cycle index `(JDN + 49) mod 60`
//! - month: the 인 month stem follows the year stem (갑/기 years start at 병인)
//! - hour: the 자 hour stem follows the day stem (갑/기 days start at 갑자)

use chrono::{Datelike, Duration, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::calendar::julian_day_number;
use crate::calendar::solar_term::{
    approximate_month_index, julian_date, month_index_from_longitude, sun_apparent_longitude,
    SolarTerm,
};
use crate::config::{BoundaryMode, CalendarConfig, ZiHourMode};
use crate::element::{Branch, Stem, Symbol};
use crate::error::{CoreError, CoreResult};

pub const CYCLE_LEN: i64 = 60;
const REFERENCE_YEAR: i64 = 1984;
const DAY_OFFSET: i64 = 49;

/// A stem and branch of equal parity; only 60 of the 120 pairs exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawPillar")]
pub struct Pillar {
    stem: Stem,
    branch: Branch,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawPillar {
    stem: Stem,
    branch: Branch,
}

impl TryFrom<RawPillar> for Pillar {
    type Error = CoreError;

    fn try_from(raw: RawPillar) -> CoreResult<Self> {
        Pillar::new(raw.stem, raw.branch)
    }
}

impl Pillar {
    /// Only stems and branches of equal parity form a pillar.
    pub fn new(stem: Stem, branch: Branch) -> CoreResult<Self> {
        if stem.index() % 2 != branch.index() % 2 {
            return Err(CoreError::ArithmeticInvariant {
                kind: "pillar parity",
                index: (stem.index() as i64) * 100 + branch.index() as i64,
            });
        }
        Ok(Self { stem, branch })
    }

    pub fn from_cycle_index(index: i64) -> CoreResult<Self> {
        let i = index.rem_euclid(CYCLE_LEN);
        Ok(Self {
            stem: Stem::from_index(i % Stem::COUNT as i64)?,
            branch: Branch::from_index(i % Branch::COUNT as i64)?,
        })
    }

    pub fn stem(&self) -> Stem {
        self.stem
    }

    pub fn branch(&self) -> Branch {
        self.branch
    }

    /// Position in the 60-cycle, 0 = 甲子.
    pub fn cycle_index(&self) -> u8 {
        let s = self.stem.index() as i64;
        let b = self.branch.index() as i64;
        (6 * s - 5 * b).rem_euclid(CYCLE_LEN) as u8
    }

    pub fn hangul(&self) -> String {
        format!("{}{}", self.stem.hangul(), self.branch.hangul())
    }
}

impl std::fmt::Display for Pillar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.stem, self.branch)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PillarPosition {
    Year,
    Month,
    Day,
    Hour,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FourPillarsChart {
    pub year: Pillar,
    pub month: Pillar,
    pub day: Pillar,
    pub hour: Pillar,
    pub boundary: BoundaryMode,
    /// Term in effect at birth; only known in solar-term mode.
    pub solar_term: Option<SolarTerm>,
}

impl FourPillarsChart {
    pub fn pillars(&self) -> [(PillarPosition, Pillar); 4] {
        [
            (PillarPosition::Year, self.year),
            (PillarPosition::Month, self.month),
            (PillarPosition::Day, self.day),
            (PillarPosition::Hour, self.hour),
        ]
    }

    /// The eight chart symbols: four stems then four branches.
    pub fn symbols(&self) -> [Symbol; 8] {
        let p = [self.year, self.month, self.day, self.hour];
        [
            p[0].stem.into(),
            p[1].stem.into(),
            p[2].stem.into(),
            p[3].stem.into(),
            p[0].branch.into(),
            p[1].branch.into(),
            p[2].branch.into(),
            p[3].branch.into(),
        ]
    }

    pub fn is_approximate(&self) -> bool {
        self.boundary == BoundaryMode::Approximate
    }
}

pub fn year_pillar(saju_year: i32) -> CoreResult<Pillar> {
    Pillar::from_cycle_index(saju_year as i64 - REFERENCE_YEAR)
}

/// `month_index` counts from the 인 month (0) to the 축 month (11).
pub fn month_pillar(year_stem: Stem, month_index: i64) -> CoreResult<Pillar> {
    if !(0..12).contains(&month_index) {
        return Err(CoreError::ArithmeticInvariant { kind: "month", index: month_index });
    }
    let first_stem = (year_stem.index() as i64 % 5) * 2 + 2;
    Pillar::new(
        Stem::from_index((first_stem + month_index) % 10)?,
        Branch::from_index((month_index + 2) % 12)?,
    )
}

pub fn day_pillar(date: NaiveDate) -> CoreResult<Pillar> {
    Pillar::from_cycle_index(julian_day_number(date) + DAY_OFFSET)
}

pub fn hour_pillar(day_stem: Stem, hour: u32) -> CoreResult<Pillar> {
    let branch = Branch::from_hour(hour)?;
    let first_stem = (day_stem.index() as i64 % 5) * 2;
    Pillar::new(
        Stem::from_index((first_stem + branch.index() as i64) % 10)?,
        branch,
    )
}

/// Four pillars for a local civil date and time.
///
/// The minute never moves the hour pillar; in solar-term mode it only places
/// the birth instant relative to a term boundary.
pub fn compute_pillars(
    date: NaiveDate,
    hour: u32,
    minute: u32,
    config: &CalendarConfig,
) -> CoreResult<FourPillarsChart> {
    let time = NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(|| {
        CoreError::InvalidBirthDate(format!("{hour:02}:{minute:02} is not a time of day"))
    })?;
    let local = date.and_time(time);

    let (month_index, solar_term) = match config.boundary {
        BoundaryMode::SolarTerm => {
            let ut = local - Duration::minutes(config.utc_offset_minutes as i64);
            let longitude = sun_apparent_longitude(julian_date(ut));
            (month_index_from_longitude(longitude), Some(SolarTerm::from_longitude(longitude)))
        }
        BoundaryMode::Approximate => (approximate_month_index(date), None),
    };

    // January and early February still belong to the previous saju year
    // until the 인 month begins.
    let saju_year = if date.month() <= 2 && month_index >= 10 {
        date.year() - 1
    } else {
        date.year()
    };

    let year = year_pillar(saju_year)?;
    let month = month_pillar(year.stem, month_index)?;

    let day_date = match config.zi_hour {
        ZiHourMode::NextDay if hour == 23 => date.succ_opt().ok_or_else(|| {
            CoreError::InvalidBirthDate(format!("{date} has no following day"))
        })?,
        _ => date,
    };
    let day = day_pillar(day_date)?;
    let hour = hour_pillar(day.stem, hour)?;

    log::debug!(
        "pillars for {local}: {year} {month} {day} {hour} ({:?}, month index {month_index})",
        config.boundary
    );

    Ok(FourPillarsChart {
        year,
        month,
        day,
        hour,
        boundary: config.boundary,
        solar_term,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn approximate() -> CalendarConfig {
        CalendarConfig {
            boundary: BoundaryMode::Approximate,
            ..CalendarConfig::default()
        }
    }

    #[test]
    fn test_cycle_index_roundtrip() {
        for i in 0..60 {
            let p = Pillar::from_cycle_index(i).unwrap();
            assert_eq!(p.cycle_index() as i64, i);
            assert!(p.stem().index() < 10 && p.branch().index() < 12);
        }
        assert_eq!(Pillar::from_cycle_index(-1).unwrap().to_string(), "癸亥");
        assert_eq!(Pillar::from_cycle_index(60).unwrap().to_string(), "甲子");
    }

    #[test]
    fn test_pillar_parity_enforced() {
        assert!(Pillar::new(Stem::Gap, Branch::Ja).is_ok());
        assert!(matches!(
            Pillar::new(Stem::Gap, Branch::Chuk),
            Err(CoreError::ArithmeticInvariant { .. })
        ));
    }

    #[test]
    fn test_deserialize_rejects_mismatched_parity() {
        let err = serde_json::from_str::<Pillar>(r#"{"stem":"甲","branch":"丑"}"#).unwrap_err();
        assert!(err.to_string().contains("pillar parity"), "{err}");

        let p: Pillar = serde_json::from_str(r#"{"stem":"己","branch":"未"}"#).unwrap();
        assert_eq!(p, Pillar::from_cycle_index(55).unwrap());
        assert_eq!(serde_json::to_string(&p).unwrap(), r#"{"stem":"己","branch":"未"}"#);
    }

    #[test]
    fn test_chart_deserialize_checks_every_pillar() {
        let chart = compute_pillars(ymd(1990, 5, 15), 10, 0, &CalendarConfig::default()).unwrap();
        let json = serde_json::to_string(&chart).unwrap();
        assert_eq!(serde_json::from_str::<FourPillarsChart>(&json).unwrap(), chart);

        let tampered = json.replacen(r#""branch":"巳""#, r#""branch":"午""#, 1);
        assert_ne!(tampered, json);
        assert!(serde_json::from_str::<FourPillarsChart>(&tampered).is_err());
    }

    #[test]
    fn test_year_pillar() {
        assert_eq!(year_pillar(1984).unwrap().to_string(), "甲子");
        assert_eq!(year_pillar(1990).unwrap().to_string(), "庚午");
        assert_eq!(year_pillar(2024).unwrap().to_string(), "甲辰");
        assert_eq!(year_pillar(1900).unwrap().to_string(), "庚子");
    }

    #[test]
    fn test_day_pillar_reference() {
        assert_eq!(day_pillar(ymd(2000, 1, 1)).unwrap().to_string(), "戊午");
        assert_eq!(day_pillar(ymd(1990, 5, 15)).unwrap().to_string(), "庚辰");
    }

    #[test]
    fn test_day_pillar_repeats_every_sixty_days() {
        let mut date = ymd(1950, 1, 1);
        while date < ymd(2050, 1, 1) {
            let later = date + Duration::days(60);
            assert_eq!(day_pillar(date).unwrap(), day_pillar(later).unwrap());
            assert_ne!(day_pillar(date).unwrap(), day_pillar(date + Duration::days(1)).unwrap());
            date += Duration::days(37);
        }
    }

    #[test]
    fn test_month_pillar_stem_rule() {
        // 갑 and 기 years open with 병인, 을/경 with 무인, …, 무/계 with 갑인.
        assert_eq!(month_pillar(Stem::Gap, 0).unwrap().to_string(), "丙寅");
        assert_eq!(month_pillar(Stem::Gi, 0).unwrap().to_string(), "丙寅");
        assert_eq!(month_pillar(Stem::Gyeong, 0).unwrap().to_string(), "戊寅");
        assert_eq!(month_pillar(Stem::Mu, 0).unwrap().to_string(), "甲寅");
        assert_eq!(month_pillar(Stem::Gap, 11).unwrap().to_string(), "丁丑");
        assert!(month_pillar(Stem::Gap, 12).is_err());
        assert!(month_pillar(Stem::Gap, -1).is_err());
    }

    #[test]
    fn test_hour_pillar_stem_rule() {
        assert_eq!(hour_pillar(Stem::Gap, 0).unwrap().to_string(), "甲子");
        assert_eq!(hour_pillar(Stem::Eul, 0).unwrap().to_string(), "丙子");
        assert_eq!(hour_pillar(Stem::Gyeong, 10).unwrap().to_string(), "辛巳");
        assert_eq!(hour_pillar(Stem::Gye, 22).unwrap().to_string(), "癸亥");
    }

    #[test]
    fn test_reference_chart_1990_05_15() {
        let chart = compute_pillars(ymd(1990, 5, 15), 10, 0, &CalendarConfig::default()).unwrap();
        assert_eq!(chart.year.to_string(), "庚午");
        assert_eq!(chart.month.to_string(), "辛巳");
        assert_eq!(chart.day.to_string(), "庚辰");
        assert_eq!(chart.hour.to_string(), "辛巳");
        assert_eq!(chart.solar_term.as_ref().unwrap().hangul, "입하");

        let approx = compute_pillars(ymd(1990, 5, 15), 10, 0, &approximate()).unwrap();
        assert_eq!(approx.pillars().map(|(_, p)| p), chart.pillars().map(|(_, p)| p));
        assert!(approx.is_approximate());
        assert!(approx.solar_term.is_none());
    }

    #[test]
    fn test_year_cutover_at_start_of_spring() {
        let config = CalendarConfig::default();
        // 입춘 2024 at 17:27 KST.
        let before = compute_pillars(ymd(2024, 2, 4), 16, 0, &config).unwrap();
        assert_eq!(before.year.to_string(), "癸卯");
        assert_eq!(before.month.branch(), Branch::Chuk);
        let after = compute_pillars(ymd(2024, 2, 4), 19, 0, &config).unwrap();
        assert_eq!(after.year.to_string(), "甲辰");
        assert_eq!(after.month.to_string(), "丙寅");

        let jan = compute_pillars(ymd(2024, 1, 20), 12, 0, &config).unwrap();
        assert_eq!(jan.year.to_string(), "癸卯");
        assert_eq!(jan.month.to_string(), "乙丑");
    }

    #[test]
    fn test_approximate_mode_ignores_time_of_day() {
        let before = compute_pillars(ymd(2024, 2, 4), 16, 0, &approximate()).unwrap();
        assert_eq!(before.year.to_string(), "甲辰");
        assert_eq!(before.month.branch(), Branch::In);
    }

    #[test]
    fn test_hour_23_maps_to_ja_window() {
        let chart = compute_pillars(ymd(1990, 5, 15), 23, 0, &CalendarConfig::default()).unwrap();
        assert_eq!(chart.hour.branch(), Branch::Ja);
        assert_eq!(chart.day.to_string(), "庚辰");
        // 庚 day: 자 hour stem is 丙.
        assert_eq!(chart.hour.to_string(), "丙子");

        let at_22 = compute_pillars(ymd(1990, 5, 15), 22, 59, &CalendarConfig::default()).unwrap();
        assert_eq!(at_22.hour.branch(), Branch::Hae);
    }

    #[test]
    fn test_next_day_zi_hour_mode() {
        let config = CalendarConfig {
            zi_hour: ZiHourMode::NextDay,
            ..CalendarConfig::default()
        };
        let chart = compute_pillars(ymd(1990, 5, 15), 23, 30, &config).unwrap();
        assert_eq!(chart.day.to_string(), "辛巳");
        // 辛 day: 자 hour stem is 戊.
        assert_eq!(chart.hour.to_string(), "戊子");

        let early = compute_pillars(ymd(1990, 5, 15), 0, 30, &config).unwrap();
        assert_eq!(early.day.to_string(), "庚辰");
    }

    #[test]
    fn test_minute_does_not_move_hour_pillar() {
        let config = CalendarConfig::default();
        let a = compute_pillars(ymd(1990, 5, 15), 10, 0, &config).unwrap();
        let b = compute_pillars(ymd(1990, 5, 15), 10, 59, &config).unwrap();
        assert_eq!(a.hour, b.hour);
    }

    #[test]
    fn test_indices_stay_in_range() {
        let config = CalendarConfig::default();
        let mut date = ymd(1901, 1, 1);
        while date < ymd(2100, 12, 31) {
            for hour in [0, 1, 11, 12, 23] {
                let chart = compute_pillars(date, hour, 0, &config).unwrap();
                for (_, p) in chart.pillars() {
                    assert!(p.stem().index() <= 9);
                    assert!(p.branch().index() <= 11);
                }
            }
            date += Duration::days(97);
        }
    }

    #[test]
    fn test_invalid_minute_rejected() {
        let err = compute_pillars(ymd(1990, 5, 15), 10, 60, &CalendarConfig::default()).unwrap_err();
        assert!(matches!(err, CoreError::InvalidBirthDate(_)));
    }
}
