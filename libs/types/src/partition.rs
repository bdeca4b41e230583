//! Partition identity
//!
//! A partition holds every tick for one ticker within one calendar month.
//! On disk the month directory is named `MM-YYYY` under a `YYYY` directory.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifies one partition file.
///
/// Ordering is (year, month, ticker), which is the discovery order used
/// when several partitions are concatenated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PartitionRef {
    pub year: u16,
    pub month: u8,
    pub ticker: String,
}

impl PartitionRef {
    pub fn new(year: u16, month: u8, ticker: impl Into<String>) -> Self {
        Self {
            year,
            month,
            ticker: ticker.into(),
        }
    }

    /// Name of the directory holding this partition, e.g. `01-2025`.
    pub fn month_dir_name(&self) -> String {
        format_month_dir(self.year, self.month)
    }

    /// File name of this partition, e.g. `SBIN.csv`.
    pub fn file_name(&self) -> String {
        format!("{}.csv", self.ticker)
    }
}

impl fmt::Display for PartitionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.year, self.month_dir_name(), self.ticker)
    }
}

pub fn format_month_dir(year: u16, month: u8) -> String {
    format!("{:02}-{:04}", month, year)
}

/// Parse a `YYYY` year directory name.
pub fn parse_year_dir(name: &str) -> Option<u16> {
    if name.len() != 4 || !name.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    name.parse().ok()
}

/// Parse a `MM-YYYY` month directory name into `(year, month)`.
pub fn parse_month_dir(name: &str) -> Option<(u16, u8)> {
    let (month, year) = name.split_once('-')?;
    if month.len() != 2 || !month.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let month: u8 = month.parse().ok()?;
    if !(1..=12).contains(&month) {
        return None;
    }
    Some((parse_year_dir(year)?, month))
}
