//! CF calendars and calendar date-times.
//!
//! Every calendar counts whole days from its own 1970-01-01, so a date-time maps to a
//! number of seconds since that origin. Timestamps of two domains on the same calendar
//! can therefore be compared directly, whatever reference date they were encoded with.

use crate::errors::{CouplingError, CouplingResult};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const SECONDS_PER_DAY: i64 = 86_400;
/// Days between 0001-01-01 and 1970-01-01 in the proleptic Gregorian calendar.
const GREGORIAN_EPOCH_FROM_CE: i64 = 719_163;
/// Julian day number of 1970-01-01 in the Julian calendar.
const JULIAN_EPOCH_JDN: i64 = 2_440_601;

const NOLEAP_MONTHS: [u32; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];
const ALL_LEAP_MONTHS: [u32; 12] = [31, 29, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

/// Calendars recognised by the CF conventions.
///
/// Aliases (`standard`/`gregorian`, `noleap`/`365_day`, `all_leap`/`366_day`) parse to the
/// same variant and therefore compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Calendar {
    #[serde(rename = "gregorian", alias = "standard")]
    Gregorian,
    #[serde(rename = "proleptic_gregorian")]
    ProlepticGregorian,
    #[serde(rename = "julian")]
    Julian,
    #[serde(rename = "noleap", alias = "365_day")]
    NoLeap,
    #[serde(rename = "all_leap", alias = "366_day")]
    AllLeap,
    #[serde(rename = "360_day")]
    Day360,
}

impl Calendar {
    pub fn is_leap_year(&self, year: i32) -> bool {
        match self {
            Self::Gregorian | Self::ProlepticGregorian => {
                (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
            }
            Self::Julian => year.rem_euclid(4) == 0,
            Self::NoLeap | Self::Day360 => false,
            Self::AllLeap => true,
        }
    }

    pub fn days_in_month(&self, year: i32, month: u32) -> u32 {
        match self {
            Self::Day360 => 30,
            _ if self.is_leap_year(year) => ALL_LEAP_MONTHS[(month - 1) as usize],
            _ => NOLEAP_MONTHS[(month - 1) as usize],
        }
    }

    /// Number of days in a year, for calendars where it is constant.
    fn fixed_year_length(&self) -> Option<i64> {
        match self {
            Self::NoLeap => Some(365),
            Self::AllLeap => Some(366),
            Self::Day360 => Some(360),
            _ => None,
        }
    }

    /// Days elapsed since 1970-01-01 of this calendar.
    pub fn days_since_epoch(&self, year: i32, month: u32, day: u32) -> CouplingResult<i64> {
        if !(1..=12).contains(&month) || day < 1 || day > self.days_in_month(year, month) {
            return Err(CouplingError::InvalidDomain(format!(
                "{year:04}-{month:02}-{day:02} is not a valid date in the {self} calendar"
            )));
        }

        match self {
            Self::Gregorian | Self::ProlepticGregorian => {
                let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
                    CouplingError::InvalidDomain(format!(
                        "{year:04}-{month:02}-{day:02} is out of range"
                    ))
                })?;
                Ok(date.num_days_from_ce() as i64 - GREGORIAN_EPOCH_FROM_CE)
            }
            Self::Julian => Ok(julian_day_number(year, month, day) - JULIAN_EPOCH_JDN),
            _ => {
                let year_length = self.fixed_year_length().unwrap_or(365);
                let day_of_year: i64 = (1..month)
                    .map(|m| self.days_in_month(year, m) as i64)
                    .sum::<i64>()
                    + day as i64
                    - 1;
                Ok((year as i64 - 1970) * year_length + day_of_year)
            }
        }
    }

    /// Inverse of [`Calendar::days_since_epoch`].
    pub fn date_from_days(&self, days: i64) -> CouplingResult<(i32, u32, u32)> {
        match self {
            Self::Gregorian | Self::ProlepticGregorian => {
                let date = i32::try_from(days + GREGORIAN_EPOCH_FROM_CE)
                    .ok()
                    .and_then(NaiveDate::from_num_days_from_ce_opt)
                    .ok_or_else(|| {
                        CouplingError::InvalidDomain(format!(
                            "{days} days since 1970-01-01 is out of range"
                        ))
                    })?;
                Ok((date.year(), date.month(), date.day()))
            }
            Self::Julian => Ok(julian_date(days + JULIAN_EPOCH_JDN)),
            _ => {
                let year_length = self.fixed_year_length().unwrap_or(365);
                let year = 1970 + days.div_euclid(year_length) as i32;
                let mut remaining = days.rem_euclid(year_length) as u32;
                let mut month = 1;
                while remaining >= self.days_in_month(year, month) {
                    remaining -= self.days_in_month(year, month);
                    month += 1;
                }
                Ok((year, month, remaining + 1))
            }
        }
    }

    /// Seconds elapsed since 1970-01-01 00:00:00 of this calendar.
    pub fn seconds_since_epoch(&self, datetime: &CalendarDateTime) -> CouplingResult<i64> {
        let days = self.days_since_epoch(datetime.year, datetime.month, datetime.day)?;
        Ok(days * SECONDS_PER_DAY
            + datetime.hour as i64 * 3600
            + datetime.minute as i64 * 60
            + datetime.second as i64)
    }

    /// Inverse of [`Calendar::seconds_since_epoch`].
    pub fn datetime_from_seconds(&self, seconds: i64) -> CouplingResult<CalendarDateTime> {
        let (year, month, day) = self.date_from_days(seconds.div_euclid(SECONDS_PER_DAY))?;
        let within_day = seconds.rem_euclid(SECONDS_PER_DAY) as u32;
        Ok(CalendarDateTime {
            year,
            month,
            day,
            hour: within_day / 3600,
            minute: within_day % 3600 / 60,
            second: within_day % 60,
        })
    }
}

fn julian_day_number(year: i32, month: u32, day: u32) -> i64 {
    let a = (14 - month as i64) / 12;
    let y = year as i64 + 4800 - a;
    let m = month as i64 + 12 * a - 3;
    day as i64 + (153 * m + 2) / 5 + 365 * y + y.div_euclid(4) - 32_083
}

fn julian_date(jdn: i64) -> (i32, u32, u32) {
    let c = jdn + 32_082;
    let d = (4 * c + 3).div_euclid(1461);
    let e = c - (1461 * d).div_euclid(4);
    let m = (5 * e + 2) / 153;
    let day = e - (153 * m + 2) / 5 + 1;
    let month = m + 3 - 12 * (m / 10);
    let year = d - 4800 + m / 10;
    (year as i32, month as u32, day as u32)
}

impl FromStr for Calendar {
    type Err = CouplingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "standard" | "gregorian" => Ok(Self::Gregorian),
            "proleptic_gregorian" => Ok(Self::ProlepticGregorian),
            "julian" => Ok(Self::Julian),
            "noleap" | "no_leap" | "365_day" => Ok(Self::NoLeap),
            "all_leap" | "366_day" => Ok(Self::AllLeap),
            "360_day" => Ok(Self::Day360),
            other => Err(CouplingError::InvalidDomain(format!(
                "unknown calendar '{other}'"
            ))),
        }
    }
}

impl fmt::Display for Calendar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Gregorian => "gregorian",
            Self::ProlepticGregorian => "proleptic_gregorian",
            Self::Julian => "julian",
            Self::NoLeap => "noleap",
            Self::AllLeap => "all_leap",
            Self::Day360 => "360_day",
        };
        write!(f, "{name}")
    }
}

/// A date and time of day, interpreted in the calendar of the domain holding it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CalendarDateTime {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
}

impl CalendarDateTime {
    pub fn new(year: i32, month: u32, day: u32, hour: u32, minute: u32, second: u32) -> Self {
        Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
        }
    }

    pub fn date(year: i32, month: u32, day: u32) -> Self {
        Self::new(year, month, day, 0, 0, 0)
    }
}

impl FromStr for CalendarDateTime {
    type Err = CouplingError;

    /// Parses `YYYY-MM-DD`, optionally followed by ` hh:mm[:ss]` or `Thh:mm[:ss]` and a
    /// trailing `Z`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CouplingError::InvalidDomain(format!("invalid date-time '{s}'"));
        let trimmed = s.trim().trim_end_matches('Z').trim_end_matches(" UTC");
        let (date, time) = match trimmed.split_once(['T', ' ']) {
            Some((date, time)) => (date, Some(time.trim())),
            None => (trimmed, None),
        };

        // A leading '-' belongs to the year, not to the separator
        let (sign, date) = match date.strip_prefix('-') {
            Some(rest) => (-1, rest),
            None => (1, date),
        };
        let date_parts: Vec<&str> = date.split('-').collect();
        let [year, month, day] = date_parts.as_slice() else {
            return Err(invalid());
        };
        let year: i32 = year.parse::<i32>().map_err(|_| invalid())? * sign;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        let day: u32 = day.parse().map_err(|_| invalid())?;

        let (hour, minute, second) = match time.filter(|t| !t.is_empty()) {
            None => (0, 0, 0),
            Some(time) => {
                let parts: Vec<u32> = time
                    .split(':')
                    .map(|p| {
                        // Fractional seconds are not resolved
                        let whole = p.split('.').next().unwrap_or(p);
                        whole.parse::<u32>().map_err(|_| invalid())
                    })
                    .collect::<Result<_, _>>()?;
                match parts.as_slice() {
                    [h] => (*h, 0, 0),
                    [h, m] => (*h, *m, 0),
                    [h, m, sec] => (*h, *m, *sec),
                    _ => return Err(invalid()),
                }
            }
        };
        if hour > 23 || minute > 59 || second > 59 {
            return Err(invalid());
        }

        Ok(Self::new(year, month, day, hour, minute, second))
    }
}

impl fmt::Display for CalendarDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}
