//! Calendar periods
//!
//! A reward round covers exactly one calendar month. `Period` is always
//! normalized to the first day of its month, so equality and ordering are
//! equality and ordering of months.

use crate::error::{Result, RewardsError};
use chrono::{DateTime, Datelike, Months, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Canonical string format of a period
const PERIOD_FORMAT: &str = "%Y-%m";

/// A calendar month
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Period {
    /// First day of the month
    first_day: NaiveDate,
}

impl Period {
    /// Create a period from a year and a 1-based month
    pub fn new(year: i32, month: u32) -> Result<Self> {
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(|first_day| Self { first_day })
            .ok_or_else(|| RewardsError::InvalidPeriod(format!("{year:04}-{month:02}")))
    }

    /// The period containing the given instant
    pub fn containing(instant: DateTime<Utc>) -> Self {
        Self::from_date(instant.date_naive())
    }

    /// The period containing the given date
    pub fn from_date(date: NaiveDate) -> Self {
        // Day 1 exists in every month chrono can represent.
        Self {
            first_day: date.with_day(1).unwrap_or(date),
        }
    }

    pub fn year(&self) -> i32 {
        self.first_day.year()
    }

    pub fn month(&self) -> u32 {
        self.first_day.month()
    }

    /// First calendar day of the period
    pub fn first_day(&self) -> NaiveDate {
        self.first_day
    }

    /// Last calendar day of the period
    pub fn last_day(&self) -> NaiveDate {
        self.next()
            .first_day
            .pred_opt()
            .unwrap_or(self.first_day)
    }

    /// Midnight UTC at the start of the period
    pub fn start(&self) -> DateTime<Utc> {
        self.first_day.and_time(NaiveTime::MIN).and_utc()
    }

    /// Number of days in the period (28-31)
    pub fn days(&self) -> u32 {
        (self.last_day() - self.first_day).num_days() as u32 + 1
    }

    /// The following period
    pub fn next(&self) -> Self {
        Self {
            first_day: self
                .first_day
                .checked_add_months(Months::new(1))
                .unwrap_or(NaiveDate::MAX),
        }
    }
}

impl FromStr for Period {
    type Err = RewardsError;

    /// Parses `YYYY-MM`. A full `YYYY-MM-DD` date is accepted when it names
    /// the first day of a month.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let invalid = || RewardsError::InvalidPeriod(s.to_string());

        if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            return if date.day() == 1 {
                Ok(Self { first_day: date })
            } else {
                Err(invalid())
            };
        }

        let (year, month) = s.split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(invalid());
        }
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        Self::new(year, month).map_err(|_| invalid())
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.first_day.format(PERIOD_FORMAT))
    }
}

impl fmt::Debug for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Period({self})")
    }
}

impl Serialize for Period {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Period {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
