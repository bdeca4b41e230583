//! Partition loading
//!
//! Concatenates every resolved partition of a ticker in discovery order.
//! A partition that cannot be opened or parsed is skipped with a warning so
//! that one corrupt month does not hide the rest of the archive.

use std::path::Path;

use thiserror::Error;
use tracing::{debug, warn};
use types::errors::QueryError;
use types::tick::TickRecord;

use crate::params::{PartitionFilter, Ticker};
use crate::partition::PartitionIndex;

// ── Errors ──────────────────────────────────────────────────────────

/// Why a single partition could not be read.
#[derive(Error, Debug)]
pub enum PartitionError {
    #[error("cannot open partition: {0}")]
    Open(#[source] csv::Error),

    #[error("malformed row {row}: {source}")]
    Parse {
        row: u64,
        #[source]
        source: csv::Error,
    },
}

// ── Loader ──────────────────────────────────────────────────────────

/// Loads tick records for a ticker from the partition archive.
#[derive(Debug, Clone)]
pub struct TickDataLoader {
    index: PartitionIndex,
}

impl TickDataLoader {
    pub fn new(index: PartitionIndex) -> Self {
        Self { index }
    }

    pub fn index(&self) -> &PartitionIndex {
        &self.index
    }

    /// All records for `ticker` under `filter`, partition after partition.
    ///
    /// No partitions is an empty result, not an error; only directory
    /// discovery faults are reported.
    pub fn load(
        &self,
        ticker: &Ticker,
        filter: PartitionFilter,
    ) -> Result<Vec<TickRecord>, QueryError> {
        let partitions = self.index.resolve(ticker, filter)?;
        let mut records = Vec::new();

        for part in &partitions {
            let path = self.index.path_of(part);
            match read_partition(&path) {
                Ok(mut rows) => {
                    debug!(partition = %part, rows = rows.len(), "loaded partition");
                    records.append(&mut rows);
                }
                Err(err) => {
                    warn!(partition = %part, path = %path.display(), error = %err, "skipping malformed partition");
                }
            }
        }

        Ok(records)
    }
}

/// Parse one partition file. Columns are matched by header name.
pub fn read_partition(path: &Path) -> Result<Vec<TickRecord>, PartitionError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(PartitionError::Open)?;

    let mut rows = Vec::new();
    for result in reader.deserialize::<TickRecord>() {
        let record = result.map_err(|source| PartitionError::Parse {
            row: source
                .position()
                .map(|p| p.line())
                .unwrap_or(rows.len() as u64 + 2),
            source,
        })?;
        rows.push(record);
    }
    Ok(rows)
}
