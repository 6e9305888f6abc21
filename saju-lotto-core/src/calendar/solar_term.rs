//! Solar longitude and the 24 solar terms (절기).
//!
//! Term boundaries come from the sun's apparent longitude at the birth
//! instant (see [`super::astro`]), so a birth minutes either side of a term
//! lands in the right month.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use super::astro::{sun_longitude_tt, ut_to_tt};
use super::julian_day_number;

/// Names of the 24 terms, indexed by `floor(longitude / 15°)` (춘분 at 0°).
pub const SOLAR_TERMS: [(&str, &str); 24] = [
    ("춘분", "春分"), ("청명", "清明"), ("곡우", "穀雨"), ("입하", "立夏"),
    ("소만", "小滿"), ("망종", "芒種"), ("하지", "夏至"), ("소서", "小暑"),
    ("대서", "大暑"), ("입추", "立秋"), ("처서", "處暑"), ("백로", "白露"),
    ("추분", "秋分"), ("한로", "寒露"), ("상강", "霜降"), ("입동", "立冬"),
    ("소설", "小雪"), ("대설", "大雪"), ("동지", "冬至"), ("소한", "小寒"),
    ("대한", "大寒"), ("입춘", "立春"), ("우수", "雨水"), ("경칩", "驚蟄"),
];

/// Longitude of 입춘, where the 인 month and the saju year begin.
pub const START_OF_SPRING_DEG: f64 = 315.0;

/// Approximate first day of each saju month, keyed by Gregorian month.
/// The saju month starting in Gregorian month `m` has index `(m + 10) % 12`.
const APPROXIMATE_START_DAY: [u32; 12] = [6, 4, 6, 5, 6, 6, 7, 8, 8, 8, 7, 7];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolarTerm {
    pub index: u8,
    pub hangul: String,
    pub hanja: String,
    pub longitude: f64,
}

impl SolarTerm {
    pub fn from_longitude(longitude: f64) -> Self {
        let lon = longitude.rem_euclid(360.0);
        let index = ((lon / 15.0).floor() as usize).min(23);
        let (hangul, hanja) = SOLAR_TERMS[index];
        Self {
            index: index as u8,
            hangul: hangul.to_string(),
            hanja: hanja.to_string(),
            longitude: lon,
        }
    }
}

/// Julian date of a UT date-time.
pub fn julian_date(ut: NaiveDateTime) -> f64 {
    let seconds = ut.num_seconds_from_midnight() as f64;
    julian_day_number(ut.date()) as f64 - 0.5 + seconds / 86_400.0
}

/// Apparent geocentric ecliptic longitude of the sun at a UT Julian date,
/// degrees in [0, 360).
pub fn sun_apparent_longitude(jd: f64) -> f64 {
    sun_longitude_tt(ut_to_tt(jd))
}

/// Saju month index (0 = 인 … 11 = 축) for a solar longitude.
pub fn month_index_from_longitude(longitude: f64) -> i64 {
    ((longitude - START_OF_SPRING_DEG).rem_euclid(360.0) / 30.0).floor() as i64
}

/// Saju month index from fixed calendar boundaries (lower precision).
pub fn approximate_month_index(date: NaiveDate) -> i64 {
    let m = date.month();
    let starts_here = (m as i64 + 10) % 12;
    if date.day() >= APPROXIMATE_START_DAY[(m - 1) as usize] {
        starts_here
    } else {
        (starts_here + 11) % 12
    }
}
