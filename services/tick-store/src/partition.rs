//! Partition discovery
//!
//! Walks `{root}/{YYYY}/{MM-YYYY}/{TICKER}.csv`. Nothing is cached: every
//! call reads the directory tree fresh, since the external producer may add
//! partitions between requests. Missing directories mean "no partitions";
//! only unexpected I/O faults are reported.

use std::collections::BTreeSet;
use std::fs::{self, DirEntry};
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;
use types::errors::QueryError;
use types::partition::{format_month_dir, parse_month_dir, parse_year_dir, PartitionRef};

use crate::params::{PartitionFilter, Ticker};

const PARTITION_EXTENSION: &str = "csv";

/// Index over the on-disk partition layout.
#[derive(Debug, Clone)]
pub struct PartitionIndex {
    root: PathBuf,
    /// When set, only these archive years are visible.
    years: Option<BTreeSet<u16>>,
}

impl PartitionIndex {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            years: None,
        }
    }

    /// Restrict discovery to the given archive years.
    pub fn with_years(mut self, years: impl IntoIterator<Item = u16>) -> Self {
        self.years = Some(years.into_iter().collect());
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Backing file of a partition.
    pub fn path_of(&self, part: &PartitionRef) -> PathBuf {
        month_dir_path(&self.root, part.year, part.month).join(part.file_name())
    }

    fn year_visible(&self, year: u16) -> bool {
        self.years
            .as_ref()
            .map_or(true, |allowed| allowed.contains(&year))
    }

    /// Archive years present on disk, ascending.
    pub fn known_years(&self) -> Result<Vec<u16>, QueryError> {
        let mut years: Vec<u16> = read_dir_or_empty(&self.root)?
            .into_iter()
            .filter(|entry| is_dir(entry))
            .filter_map(|entry| parse_year_dir(&entry.file_name().to_string_lossy()))
            .filter(|year| self.year_visible(*year))
            .collect();
        years.sort_unstable();
        years.dedup();
        Ok(years)
    }

    /// Month directories of one year as `(month, path)`, ascending.
    fn month_dirs(&self, year: u16) -> Result<Vec<(u8, PathBuf)>, QueryError> {
        let year_path = self.root.join(format!("{:04}", year));
        let mut months = Vec::new();
        for entry in read_dir_or_empty(&year_path)? {
            if !is_dir(&entry) {
                continue;
            }
            let name = entry.file_name();
            let name = name.to_string_lossy();
            match parse_month_dir(&name) {
                Some((dir_year, month)) if dir_year == year => months.push((month, entry.path())),
                _ => debug!(year, dir = %name, "ignoring unrecognised month directory"),
            }
        }
        months.sort_unstable_by_key(|(month, _)| *month);
        Ok(months)
    }

    /// Partitions backing `ticker` under the optional filter, in discovery
    /// (calendar) order.
    ///
    /// With both year and month set exactly one candidate is probed. A
    /// missing partition is an empty set, not an error.
    pub fn resolve(
        &self,
        ticker: &Ticker,
        filter: PartitionFilter,
    ) -> Result<BTreeSet<PartitionRef>, QueryError> {
        let mut found = BTreeSet::new();

        if let (Some(year), Some(month)) = (filter.year, filter.month) {
            let candidate = PartitionRef::new(year, month, ticker.as_str());
            if self.year_visible(year) && self.path_of(&candidate).is_file() {
                found.insert(candidate);
            }
            debug!(%ticker, year, month, count = found.len(), "probed single partition");
            return Ok(found);
        }

        for year in self.known_years()? {
            if filter.year.is_some_and(|wanted| wanted != year) {
                continue;
            }
            for (month, dir) in self.month_dirs(year)? {
                if filter.month.is_some_and(|wanted| wanted != month) {
                    continue;
                }
                let candidate = PartitionRef::new(year, month, ticker.as_str());
                if dir.join(candidate.file_name()).is_file() {
                    found.insert(candidate);
                }
            }
        }

        debug!(%ticker, ?filter, count = found.len(), "resolved partitions");
        Ok(found)
    }

    /// Every ticker with at least one partition, sorted.
    pub fn enumerate_tickers(&self) -> Result<BTreeSet<String>, QueryError> {
        let mut tickers = BTreeSet::new();
        for year in self.known_years()? {
            for (_, dir) in self.month_dirs(year)? {
                for entry in read_dir_or_empty(&dir)? {
                    let path = entry.path();
                    if !path.is_file()
                        || path.extension().and_then(|e| e.to_str()) != Some(PARTITION_EXTENSION)
                    {
                        continue;
                    }
                    if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                        tickers.insert(stem.to_string());
                    }
                }
            }
        }
        Ok(tickers)
    }
}

/// Directory holding every partition of one month.
pub fn month_dir_path(root: &Path, year: u16, month: u8) -> PathBuf {
    root.join(format!("{:04}", year)).join(format_month_dir(year, month))
}

fn is_dir(entry: &DirEntry) -> bool {
    entry.file_type().map(|t| t.is_dir()).unwrap_or(false) || entry.path().is_dir()
}

fn read_dir_or_empty(path: &Path) -> Result<Vec<DirEntry>, QueryError> {
    match fs::read_dir(path) {
        Ok(entries) => Ok(entries.collect::<io::Result<Vec<_>>>()?),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(err) => Err(QueryError::storage(format!("{}: {}", path.display(), err))),
    }
}
