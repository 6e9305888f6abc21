pub mod astro;
pub mod korean;
pub mod lunar;
pub mod solar_term;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
pub use korean::KoreanCalendar;
pub use lunar::{LunarDate, LunarTable, LUNAR_END_YEAR, LUNAR_START_YEAR};

/// Proleptic Gregorian date after normalization.
pub type SolarDate = NaiveDate;

pub const MIN_YEAR: i32 = 1;
pub const MAX_YEAR: i32 = 9999;

/// Time of day used when the birth hour is unknown.
pub const DEFAULT_HOUR: u32 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalendarKind {
    #[default]
    Solar,
    Lunar,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BirthInput {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    #[serde(default)]
    pub hour: Option<u32>,
    #[serde(default)]
    pub minute: Option<u32>,
    #[serde(default)]
    pub calendar: CalendarKind,
    /// Only meaningful for lunar input: the date lies in the leap month.
    #[serde(default)]
    pub leap_month: bool,
}

impl BirthInput {
    pub fn solar(year: i32, month: u32, day: u32, hour: u32) -> Self {
        Self {
            year,
            month,
            day,
            hour: Some(hour),
            minute: None,
            calendar: CalendarKind::Solar,
            leap_month: false,
        }
    }

    pub fn lunar(year: i32, month: u32, day: u32, hour: u32, leap_month: bool) -> Self {
        Self {
            year,
            month,
            day,
            hour: Some(hour),
            minute: None,
            calendar: CalendarKind::Lunar,
            leap_month,
        }
    }

    pub fn with_minute(mut self, minute: u32) -> Self {
        self.minute = Some(minute);
        self
    }

    /// Hour and minute with defaults applied: noon when the hour is unknown.
    pub fn time_of_day(&self) -> (u32, u32) {
        match self.hour {
            Some(h) => (h, self.minute.unwrap_or(0)),
            None => (DEFAULT_HOUR, 0),
        }
    }

    fn validate_time(&self) -> CoreResult<()> {
        if let Some(h) = self.hour {
            if h > 23 {
                return Err(CoreError::InvalidBirthDate(format!("hour {h} out of range (0-23)")));
            }
        }
        if let Some(m) = self.minute {
            if m > 59 {
                return Err(CoreError::InvalidBirthDate(format!("minute {m} out of range (0-59)")));
            }
            if self.hour.is_none() {
                return Err(CoreError::InvalidBirthDate("minute given without an hour".into()));
            }
        }
        Ok(())
    }
}

/// Lunar ↔ solar conversion collaborator.
pub trait LunarCalendar: Send + Sync {
    fn name(&self) -> &str;
    fn to_solar(&self, date: LunarDate) -> CoreResult<SolarDate>;
    fn to_lunar(&self, date: SolarDate) -> CoreResult<LunarDate>;
}

/// Resolves the birth date to a Gregorian date.
///
/// Solar input is validated and passed through; lunar input goes through
/// `calendar`, whose errors are returned unchanged.
pub fn normalize(birth: &BirthInput, calendar: &dyn LunarCalendar) -> CoreResult<SolarDate> {
    birth.validate_time()?;
    if !(MIN_YEAR..=MAX_YEAR).contains(&birth.year) {
        return Err(CoreError::InvalidBirthDate(format!(
            "year {} out of range ({MIN_YEAR}-{MAX_YEAR})",
            birth.year
        )));
    }

    match birth.calendar {
        CalendarKind::Solar => {
            if birth.leap_month {
                return Err(CoreError::InvalidBirthDate(
                    "leap month flag is only valid for lunar dates".into(),
                ));
            }
            NaiveDate::from_ymd_opt(birth.year, birth.month, birth.day).ok_or_else(|| {
                CoreError::InvalidBirthDate(format!(
                    "{:04}-{:02}-{:02} is not a calendar date",
                    birth.year, birth.month, birth.day
                ))
            })
        }
        CalendarKind::Lunar => {
            let date = LunarDate {
                year: birth.year,
                month: birth.month,
                day: birth.day,
                leap_month: birth.leap_month,
            };
            let solar = calendar.to_solar(date)?;
            log::debug!("lunar {date} -> solar {solar} via {}", calendar.name());
            Ok(solar)
        }
    }
}

/// Julian day number (noon-based day count) of a Gregorian date.
pub fn julian_day_number(date: NaiveDate) -> i64 {
    date.num_days_from_ce() as i64 + 1_721_425
}
