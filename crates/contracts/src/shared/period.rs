use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Calendar month, serialized as `"YYYY-MM"`.
///
/// Ordering is chronological (year first, then month).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Month {
    year: i32,
    month: u32,
}

impl Month {
    /// Returns `None` when `month` is outside `1..=12`.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if (1..=12).contains(&month) {
            Some(Self { year, month })
        } else {
            None
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// Parse `"YYYY-MM"`. A full date (`"YYYY-MM-DD"`) is also accepted; the day
    /// must be valid for that month and is then ignored.
    pub fn parse(s: &str) -> anyhow::Result<Self> {
        let trimmed = s.trim();
        let invalid = || anyhow::anyhow!("invalid month '{}': expected YYYY-MM", s);

        if !trimmed.is_ascii() {
            return Err(invalid());
        }
        let (year_month, day) = match trimmed.len() {
            7 => (trimmed, None),
            10 => (&trimmed[..7], Some(&trimmed[7..])),
            _ => return Err(invalid()),
        };
        if let Some(day) = day {
            if !day.starts_with('-') {
                return Err(invalid());
            }
            NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
                .map_err(|e| anyhow::anyhow!("invalid date '{}': {}", s, e))?;
        }

        let (year, month) = year_month.split_once('-').ok_or_else(invalid)?;
        let digits = |p: &str, len: usize| p.len() == len && p.bytes().all(|b| b.is_ascii_digit());
        if !digits(year, 4) || !digits(month, 2) {
            return Err(invalid());
        }
        let year = year.parse::<i32>().map_err(|_| invalid())?;
        let month = month.parse::<u32>().map_err(|_| invalid())?;

        Self::new(year, month).ok_or_else(|| anyhow::anyhow!("month out of range in '{}'", s))
    }

    fn index(&self) -> i64 {
        self.year as i64 * 12 + (self.month as i64 - 1)
    }

    fn from_index(index: i64) -> Self {
        Self {
            year: index.div_euclid(12) as i32,
            month: index.rem_euclid(12) as u32 + 1,
        }
    }

    pub fn next(&self) -> Self {
        Self::from_index(self.index() + 1)
    }

    pub fn previous(&self) -> Self {
        Self::from_index(self.index() - 1)
    }

    /// Signed number of months from `self` to `other`.
    pub fn months_until(&self, other: &Month) -> i64 {
        other.index() - self.index()
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or_default()
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for Month {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Month::parse(s)
    }
}

impl Serialize for Month {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Month {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Month::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Inclusive range of months.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthRange {
    pub start: Month,
    pub end: Month,
}

impl MonthRange {
    pub fn new(start: Month, end: Month) -> Self {
        Self { start, end }
    }

    pub fn single(month: Month) -> Self {
        Self {
            start: month,
            end: month,
        }
    }

    pub fn is_ordered(&self) -> bool {
        self.start <= self.end
    }

    /// Number of months in the range (0 when `start > end`).
    pub fn len(&self) -> usize {
        let diff = self.start.months_until(&self.end);
        if diff < 0 {
            0
        } else {
            diff as usize + 1
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, month: &Month) -> bool {
        self.start <= *month && *month <= self.end
    }

    pub fn months(&self) -> Vec<Month> {
        let mut months = Vec::with_capacity(self.len());
        let mut cursor = self.start;
        while cursor <= self.end {
            months.push(cursor);
            cursor = cursor.next();
        }
        months
    }

    /// Lower bound for date filters, `"YYYY-MM-01"`.
    pub fn date_from(&self) -> String {
        self.start.first_day().format("%Y-%m-%d").to_string()
    }

    /// Exclusive upper bound for date filters: first day after the range.
    pub fn date_to_exclusive(&self) -> String {
        self.end.next().first_day().format("%Y-%m-%d").to_string()
    }
}
