//! Packed Chinese lunisolar calendar table, lunar years 1900 to 2100.
//!
//! One word per lunar year:
//! - bits 0..4: leap month number (0 when the year has none)
//! - bits 4..16: month lengths, month 1 at bit 15 down to month 12 at bit 4
//!   (set = 30 days, clear = 29 days)
//! - bit 16: the leap month has 30 days
//!
//! Lunar 1900-01-01 falls on solar 1900-01-31.

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};

use super::LunarCalendar;
use crate::error::{CoreError, CoreResult};

pub const LUNAR_START_YEAR: i32 = 1900;
pub const LUNAR_END_YEAR: i32 = 2100;

#[rustfmt::skip]
const LUNAR_INFO: [u32; 201] = [
    0x04bd8, 0x04ae0, 0x0a570, 0x054d5, 0x0d260, 0x0d950, 0x16554, 0x056a0, 0x09ad0, 0x055d2, // 1900
    0x04ae0, 0x0a5b6, 0x0a4d0, 0x0d250, 0x1d255, 0x0b540, 0x0d6a0, 0x0ada2, 0x095b0, 0x14977, // 1910
    0x04970, 0x0a4b0, 0x0b4b5, 0x06a50, 0x06d40, 0x1ab54, 0x02b60, 0x09570, 0x052f2, 0x04970, // 1920
    0x06566, 0x0d4a0, 0x0ea50, 0x16a95, 0x05ad0, 0x02b60, 0x186e3, 0x092e0, 0x1c8d7, 0x0c950, // 1930
    0x0d4a0, 0x1d8a6, 0x0b550, 0x056a0, 0x1a5b4, 0x025d0, 0x092d0, 0x0d2b2, 0x0a950, 0x0b557, // 1940
    0x06ca0, 0x0b550, 0x15355, 0x04da0, 0x0a5b0, 0x14573, 0x052b0, 0x0a9a8, 0x0e950, 0x06aa0, // 1950
    0x0aea6, 0x0ab50, 0x04b60, 0x0aae4, 0x0a570, 0x05260, 0x0f263, 0x0d950, 0x05b57, 0x056a0, // 1960
    0x096d0, 0x04dd5, 0x04ad0, 0x0a4d0, 0x0d4d4, 0x0d250, 0x0d558, 0x0b540, 0x0b6a0, 0x195a6, // 1970
    0x095b0, 0x049b0, 0x0a974, 0x0a4b0, 0x0b27a, 0x06a50, 0x06d40, 0x0af46, 0x0ab60, 0x09570, // 1980
    0x04af5, 0x04970, 0x064b0, 0x074a3, 0x0ea50, 0x06b58, 0x05ac0, 0x0ab60, 0x096d5, 0x092e0, // 1990
    0x0c960, 0x0d954, 0x0d4a0, 0x0da50, 0x07552, 0x056a0, 0x0abb7, 0x025d0, 0x092d0, 0x0cab5, // 2000
    0x0a950, 0x0b4a0, 0x0baa4, 0x0ad50, 0x055d9, 0x04ba0, 0x0a5b0, 0x15176, 0x052b0, 0x0a930, // 2010
    0x07954, 0x06aa0, 0x0ad50, 0x05b52, 0x04b60, 0x0a6e6, 0x0a4e0, 0x0d260, 0x0ea65, 0x0d530, // 2020
    0x05aa0, 0x076a3, 0x096d0, 0x04afb, 0x04ad0, 0x0a4d0, 0x1d0b6, 0x0d250, 0x0d520, 0x0dd45, // 2030
    0x0b5a0, 0x056d0, 0x055b2, 0x049b0, 0x0a577, 0x0a4b0, 0x0aa50, 0x1b255, 0x06d20, 0x0ada0, // 2040
    0x14b63, 0x09370, 0x049f8, 0x04970, 0x064b0, 0x168a6, 0x0ea50, 0x06b20, 0x1a6c4, 0x0aae0, // 2050
    0x092e0, 0x0d2e3, 0x0c960, 0x0d557, 0x0d4a0, 0x0da50, 0x05d55, 0x056a0, 0x0a6d0, 0x055d4, // 2060
    0x052d0, 0x0a9b8, 0x0a950, 0x0b4a0, 0x0b6a6, 0x0ad50, 0x055a0, 0x0aba4, 0x0a5b0, 0x052b0, // 2070
    0x0b273, 0x06930, 0x07337, 0x06aa0, 0x0ad50, 0x14b55, 0x04b60, 0x0a570, 0x054e4, 0x0d160, // 2080
    0x0e968, 0x0d520, 0x0daa0, 0x16aa6, 0x056d0, 0x04ae0, 0x0a9d4, 0x0a2d0, 0x0d150, 0x0f252, // 2090
    0x0d520,                                                                                   // 2100
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LunarDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub leap_month: bool,
}

impl std::fmt::Display for LunarDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let leap = if self.leap_month { " (leap)" } else { "" };
        write!(f, "{:04}-{:02}-{:02}{}", self.year, self.month, self.day, leap)
    }
}

fn info(year: i32) -> u32 {
    LUNAR_INFO[(year - LUNAR_START_YEAR) as usize]
}

fn in_range(year: i32) -> bool {
    (LUNAR_START_YEAR..=LUNAR_END_YEAR).contains(&year)
}

fn epoch() -> CoreResult<NaiveDate> {
    NaiveDate::from_ymd_opt(1900, 1, 31)
        .ok_or_else(|| CoreError::CalendarConversion("lunar epoch is not a valid date".into()))
}

/// Leap month of `year`, if any. Caller guarantees the year is in range.
fn leap_month_of(year: i32) -> Option<u32> {
    let m = info(year) & 0xf;
    (m != 0).then_some(m)
}

fn leap_days(year: i32) -> u32 {
    match leap_month_of(year) {
        Some(_) if info(year) & 0x10000 != 0 => 30,
        Some(_) => 29,
        None => 0,
    }
}

fn month_days(year: i32, month: u32) -> u32 {
    if info(year) & (0x10000 >> month) != 0 {
        30
    } else {
        29
    }
}

fn year_days(year: i32) -> u32 {
    (1..=12).map(|m| month_days(year, m)).sum::<u32>() + leap_days(year)
}

/// Chinese calendar conversion backed by [`LUNAR_INFO`].
#[derive(Debug, Clone, Copy, Default)]
pub struct LunarTable;

impl LunarTable {
    pub fn leap_month(&self, year: i32) -> CoreResult<Option<u32>> {
        if !in_range(year) {
            return Err(out_of_table(year));
        }
        Ok(leap_month_of(year))
    }

    /// Length of a lunar month, leap or regular.
    pub fn month_length(&self, year: i32, month: u32, leap: bool) -> CoreResult<u32> {
        if !in_range(year) {
            return Err(out_of_table(year));
        }
        if !(1..=12).contains(&month) {
            return Err(CoreError::CalendarConversion(format!("lunar month {month} out of range (1-12)")));
        }
        if leap {
            if leap_month_of(year) != Some(month) {
                return Err(CoreError::CalendarConversion(format!(
                    "lunar year {year} has no leap month {month}"
                )));
            }
            return Ok(leap_days(year));
        }
        Ok(month_days(year, month))
    }
}

fn out_of_table(year: i32) -> CoreError {
    CoreError::CalendarConversion(format!(
        "lunar year {year} outside supported range {LUNAR_START_YEAR}-{LUNAR_END_YEAR}"
    ))
}

impl LunarCalendar for LunarTable {
    fn name(&self) -> &str {
        "lunar-table-1900-2100"
    }

    fn to_solar(&self, date: LunarDate) -> CoreResult<NaiveDate> {
        let length = self.month_length(date.year, date.month, date.leap_month)?;
        if date.day < 1 || date.day > length {
            return Err(CoreError::CalendarConversion(format!(
                "lunar day {} out of range for {}-{}{} ({} days)",
                date.day,
                date.year,
                date.month,
                if date.leap_month { " leap" } else { "" },
                length
            )));
        }

        let mut offset: u64 = (LUNAR_START_YEAR..date.year).map(|y| year_days(y) as u64).sum();
        let leap = leap_month_of(date.year);
        for m in 1..date.month {
            offset += month_days(date.year, m) as u64;
            if leap == Some(m) {
                offset += leap_days(date.year) as u64;
            }
        }
        // The leap month follows the regular month of the same number.
        if date.leap_month {
            offset += month_days(date.year, date.month) as u64;
        }
        offset += (date.day - 1) as u64;

        epoch()?
            .checked_add_days(Days::new(offset))
            .ok_or_else(|| CoreError::CalendarConversion(format!("lunar date {date} overflows")))
    }

    fn to_lunar(&self, date: NaiveDate) -> CoreResult<LunarDate> {
        let epoch = epoch()?;
        if date < epoch {
            return Err(CoreError::CalendarConversion(format!(
                "solar date {date} precedes the lunar table"
            )));
        }
        let mut offset = (date - epoch).num_days() as u32;

        let mut year = LUNAR_START_YEAR;
        loop {
            if !in_range(year) {
                return Err(CoreError::CalendarConversion(format!(
                    "solar date {date} is past the end of the lunar table"
                )));
            }
            let days = year_days(year);
            if offset < days {
                break;
            }
            offset -= days;
            year += 1;
        }

        let leap = leap_month_of(year);
        for month in 1..=12 {
            let days = month_days(year, month);
            if offset < days {
                return Ok(LunarDate { year, month, day: offset + 1, leap_month: false });
            }
            offset -= days;
            if leap == Some(month) {
                let days = leap_days(year);
                if offset < days {
                    return Ok(LunarDate { year, month, day: offset + 1, leap_month: true });
                }
                offset -= days;
            }
        }
        Err(CoreError::CalendarConversion(format!(
            "lunar year {} does not cover {}-{:02}-{:02}",
            year,
            date.year(),
            date.month(),
            date.day()
        )))
    }
}
