//! Validated query parameters
//!
//! Raw request values arrive as signed integers and strings; everything here
//! is checked before any storage access so a malformed request never touches
//! the archive.

use std::fmt;

use types::errors::QueryError;

/// Default page size.
pub const DEFAULT_LIMIT: usize = 1_000;
/// Largest page a caller may request.
pub const MAX_LIMIT: usize = 10_000;
/// Longest accepted ticker symbol.
pub const MAX_TICKER_LEN: usize = 64;

/// A ticker symbol that is safe to use as a partition file stem.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ticker(String);

impl Ticker {
    pub fn parse(raw: &str) -> Result<Self, QueryError> {
        let symbol = raw.trim();
        if symbol.is_empty() {
            return Err(QueryError::validation("ticker", "must not be empty"));
        }
        if symbol.len() > MAX_TICKER_LEN {
            return Err(QueryError::validation(
                "ticker",
                format!("must be at most {} characters", MAX_TICKER_LEN),
            ));
        }
        if symbol == "." || symbol == ".." {
            return Err(QueryError::validation("ticker", "is not a valid symbol"));
        }
        if symbol
            .chars()
            .any(|c| c == '/' || c == '\\' || c == '\0' || c.is_control())
        {
            return Err(QueryError::validation(
                "ticker",
                "must not contain path separators or control characters",
            ));
        }
        Ok(Self(symbol.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Page window over a sorted result: `[offset, offset + limit)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub limit: usize,
    pub offset: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

impl Pagination {
    pub fn new(limit: Option<i64>, offset: Option<i64>) -> Result<Self, QueryError> {
        let limit = match limit {
            None => DEFAULT_LIMIT,
            Some(l) if l < 1 || l > MAX_LIMIT as i64 => {
                return Err(QueryError::validation(
                    "limit",
                    format!("must be between 1 and {}", MAX_LIMIT),
                ));
            }
            Some(l) => l as usize,
        };
        let offset = match offset {
            None => 0,
            Some(o) if o < 0 => {
                return Err(QueryError::validation("offset", "must be non-negative"));
            }
            Some(o) => usize::try_from(o)
                .map_err(|_| QueryError::validation("offset", "is too large"))?,
        };
        Ok(Self { limit, offset })
    }

    /// Slice out this page; an offset past the end yields an empty page.
    pub fn apply<T: Clone>(&self, items: &[T]) -> Vec<T> {
        let start = self.offset.min(items.len());
        let end = start.saturating_add(self.limit).min(items.len());
        items[start..end].to_vec()
    }
}

/// Optional year/month narrowing for partition resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PartitionFilter {
    pub year: Option<u16>,
    pub month: Option<u8>,
}

impl PartitionFilter {
    pub fn new(year: Option<i64>, month: Option<i64>) -> Result<Self, QueryError> {
        let year = year
            .map(|y| {
                u16::try_from(y)
                    .ok()
                    .filter(|y| *y <= 9999)
                    .ok_or_else(|| QueryError::validation("year", "must be between 0 and 9999"))
            })
            .transpose()?;
        let month = month
            .map(|m| {
                u8::try_from(m)
                    .ok()
                    .filter(|m| (1..=12).contains(m))
                    .ok_or_else(|| QueryError::validation("month", "must be between 1 and 12"))
            })
            .transpose()?;
        Ok(Self { year, month })
    }

    pub fn all() -> Self {
        Self::default()
    }
}

/// Validate a `YYYYMMDD` date parameter (no calendar check).
pub fn parse_date(field: &str, raw: Option<i64>) -> Result<Option<u32>, QueryError> {
    raw.map(|d| {
        u32::try_from(d).map_err(|_| QueryError::validation(field, "must be a YYYYMMDD integer"))
    })
    .transpose()
}

/// Like [`parse_date`] for a parameter the caller must supply.
pub fn require_date(field: &str, raw: Option<i64>) -> Result<u32, QueryError> {
    parse_date(field, raw)?.ok_or_else(|| QueryError::validation(field, "is required"))
}
