//! Read queries over the tick archive
//!
//! Every operation loads fresh from disk, then runs a pure transform. A
//! query whose load (after its own filter) is empty reports `NotFound`;
//! callers never see an empty success for an unknown ticker.

use serde::{Serialize, Serializer};
use types::errors::QueryError;
use types::tick::TickRecord;

use crate::loader::TickDataLoader;
use crate::params::{Pagination, PartitionFilter, Ticker};
use crate::partition::PartitionIndex;
use crate::stats::{self, DateSpan, PriceRange, TickStatistics};

// ── Responses ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickerListing {
    pub tickers: Vec<String>,
    pub count: usize,
}

/// One page of chronologically sorted ticks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickPage {
    pub data: Vec<TickRecord>,
    /// Filtered count before pagination.
    pub total: usize,
    pub ticker: String,
    /// Min/max Date of `data` (the page, not the whole selection).
    pub date_range: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickerSummary {
    pub ticker: String,
    pub total_records: usize,
    pub date_range: DateSpan,
    pub price_range: PriceRange,
    pub total_volume: i64,
    pub unique_dates: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DateListing {
    pub ticker: String,
    pub dates: Vec<u32>,
    pub count: usize,
    pub date_range: DateSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LatestTick {
    pub ticker: String,
    pub latest_tick: TickRecord,
}

/// Which ticks a statistics block covers: one trading day or everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatsScope {
    Day(u32),
    All,
}

impl Serialize for StatsScope {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            StatsScope::Day(date) => serializer.serialize_u32(*date),
            StatsScope::All => serializer.serialize_str("all"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickerStats {
    pub ticker: String,
    pub date: StatsScope,
    pub statistics: TickStatistics,
}

// ── Engine ──────────────────────────────────────────────────────────

/// Query front-end over a [`TickDataLoader`]. Holds no mutable state, so a
/// single instance may serve any number of concurrent requests.
#[derive(Debug, Clone)]
pub struct QueryEngine {
    loader: TickDataLoader,
}

impl QueryEngine {
    pub fn new(loader: TickDataLoader) -> Self {
        Self { loader }
    }

    pub fn from_index(index: PartitionIndex) -> Self {
        Self::new(TickDataLoader::new(index))
    }

    pub fn index(&self) -> &PartitionIndex {
        self.loader.index()
    }

    fn load_non_empty(
        &self,
        ticker: &Ticker,
        filter: PartitionFilter,
    ) -> Result<Vec<TickRecord>, QueryError> {
        let ticks = self.loader.load(ticker, filter)?;
        if ticks.is_empty() {
            return Err(QueryError::not_found_ticker(ticker.as_str()));
        }
        Ok(ticks)
    }

    pub fn list_tickers(&self) -> Result<TickerListing, QueryError> {
        let tickers: Vec<String> = self.index().enumerate_tickers()?.into_iter().collect();
        Ok(TickerListing {
            count: tickers.len(),
            tickers,
        })
    }

    /// Ticks for `ticker`, optionally narrowed to a month/year and a single
    /// trading day, sorted by (Date, Time) and paginated.
    pub fn raw_data(
        &self,
        ticker: &Ticker,
        filter: PartitionFilter,
        date: Option<u32>,
        page: Pagination,
    ) -> Result<TickPage, QueryError> {
        let mut ticks = self.load_non_empty(ticker, filter)?;
        if let Some(day) = date {
            ticks.retain(|t| t.date == day);
            if ticks.is_empty() {
                return Err(QueryError::NotFound(format!(
                    "No data found for ticker {} on date {}",
                    ticker, day
                )));
            }
        }
        Ok(sorted_page(ticker, ticks, page))
    }

    /// Ticks with `start <= Date <= end`, sorted and paginated.
    pub fn range_data(
        &self,
        ticker: &Ticker,
        start: u32,
        end: u32,
        page: Pagination,
    ) -> Result<TickPage, QueryError> {
        let mut ticks = self.load_non_empty(ticker, PartitionFilter::all())?;
        ticks.retain(|t| (start..=end).contains(&t.date));
        if ticks.is_empty() {
            return Err(QueryError::NotFound(format!(
                "No data found for ticker {} in the specified date range",
                ticker
            )));
        }
        Ok(sorted_page(ticker, ticks, page))
    }

    /// Aggregates over the entire unfiltered load.
    pub fn summary(&self, ticker: &Ticker) -> Result<TickerSummary, QueryError> {
        let ticks = self.load_non_empty(ticker, PartitionFilter::all())?;
        Ok(TickerSummary {
            ticker: ticker.to_string(),
            total_records: ticks.len(),
            date_range: span_of(&ticks)?,
            price_range: stats::price_range(&ticks).ok_or_else(|| empty_after_load(ticker))?,
            total_volume: stats::total_volume(&ticks),
            unique_dates: stats::distinct_dates(&ticks).len(),
        })
    }

    pub fn dates(&self, ticker: &Ticker) -> Result<DateListing, QueryError> {
        let ticks = self.load_non_empty(ticker, PartitionFilter::all())?;
        let dates = stats::distinct_dates(&ticks);
        Ok(DateListing {
            ticker: ticker.to_string(),
            count: dates.len(),
            date_range: span_of(&ticks)?,
            dates,
        })
    }

    pub fn latest(&self, ticker: &Ticker) -> Result<LatestTick, QueryError> {
        let ticks = self.load_non_empty(ticker, PartitionFilter::all())?;
        let latest = stats::latest(&ticks).ok_or_else(|| empty_after_load(ticker))?;
        Ok(LatestTick {
            ticker: ticker.to_string(),
            latest_tick: latest.clone(),
        })
    }

    /// Statistics over load order: `open`/`close` are the first and last
    /// rows as loaded, not the chronological extremes.
    pub fn stats(&self, ticker: &Ticker, date: Option<u32>) -> Result<TickerStats, QueryError> {
        let mut ticks = self.load_non_empty(ticker, PartitionFilter::all())?;
        if let Some(day) = date {
            ticks.retain(|t| t.date == day);
            if ticks.is_empty() {
                return Err(QueryError::NotFound(format!(
                    "No data found for ticker {} on date {}",
                    ticker, day
                )));
            }
        }
        let statistics = stats::compute(&ticks).ok_or_else(|| empty_after_load(ticker))?;
        Ok(TickerStats {
            ticker: ticker.to_string(),
            date: date.map_or(StatsScope::All, StatsScope::Day),
            statistics,
        })
    }
}

fn sorted_page(ticker: &Ticker, mut ticks: Vec<TickRecord>, page: Pagination) -> TickPage {
    ticks.sort_by(TickRecord::cmp_chronological);
    let total = ticks.len();
    let data = page.apply(&ticks);
    TickPage {
        date_range: DateSpan::label(&data),
        total,
        ticker: ticker.to_string(),
        data,
    }
}

fn span_of(ticks: &[TickRecord]) -> Result<DateSpan, QueryError> {
    DateSpan::of(ticks).ok_or_else(|| QueryError::NotFound("No data found".to_string()))
}

fn empty_after_load(ticker: &Ticker) -> QueryError {
    QueryError::not_found_ticker(ticker.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::partition::month_dir_path;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    const HEADER: &str = "Ticker,Date,Time,Close,Volume,OI,Bid,BidQty,Ask,AskQty";

    fn write(root: &Path, year: u16, month: u8, ticker: &str, rows: &[(u32, &str, f64, i64)]) {
        let dir = month_dir_path(root, year, month);
        fs::create_dir_all(&dir).unwrap();
        let mut body = String::from(HEADER);
        for (date, time, close, volume) in rows {
            body.push_str(&format!(
                "\n{ticker},{date},{time},{close},{volume},0,{},10,{},20",
                close - 0.1,
                close + 0.1
            ));
        }
        body.push('\n');
        fs::write(dir.join(format!("{ticker}.csv")), body).unwrap();
    }

    fn t(s: &str) -> Ticker {
        Ticker::parse(s).unwrap()
    }

    fn fixture() -> (TempDir, QueryEngine) {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), 2025, 1, "SBIN", &[
            (20250102, "09:15:00", 800.0, 100),
            (20250102, "09:15:01", 801.0, 200),
            (20250102, "09:14:59", 799.0, 300),
            (20250103, "09:15:00", 805.0, 400),
        ]);
        write(tmp.path(), 2025, 2, "SBIN", &[(20250203, "09:15:00", 810.0, 500)]);
        write(tmp.path(), 2025, 1, "TCS", &[(20250102, "09:15:00", 4100.0, 10)]);
        let engine = QueryEngine::from_index(PartitionIndex::new(tmp.path()));
        (tmp, engine)
    }

    #[test]
    fn test_list_tickers() {
        let (_tmp, engine) = fixture();
        let listing = engine.list_tickers().unwrap();
        assert_eq!(listing.tickers, vec!["SBIN", "TCS"]);
        assert_eq!(listing.count, 2);
    }

    #[test]
    fn test_raw_data_sorts_time_within_day() {
        let (_tmp, engine) = fixture();
        let page = engine
            .raw_data(&t("SBIN"), PartitionFilter::all(), Some(20250102), Pagination::default())
            .unwrap();
        let times: Vec<&str> = page.data.iter().map(|r| r.time.as_str()).collect();
        assert_eq!(times, vec!["09:14:59", "09:15:00", "09:15:01"]);
        assert_eq!(page.total, 3);
        assert_eq!(page.date_range, "20250102 to 20250102");
    }

    #[test]
    fn test_raw_data_pagination_and_page_date_range() {
        let (_tmp, engine) = fixture();
        let page = engine
            .raw_data(&t("SBIN"), PartitionFilter::all(), None, Pagination { limit: 2, offset: 3 })
            .unwrap();
        assert_eq!(page.total, 5);
        assert_eq!(page.data.len(), 2);
        assert_eq!(page.data[0].date, 20250103);
        assert_eq!(page.data[1].date, 20250203);
        assert_eq!(page.date_range, "20250103 to 20250203");
    }

    #[test]
    fn test_raw_data_offset_past_end() {
        let (_tmp, engine) = fixture();
        let page = engine
            .raw_data(&t("SBIN"), PartitionFilter::all(), None, Pagination { limit: 10, offset: 50 })
            .unwrap();
        assert!(page.data.is_empty());
        assert_eq!(page.total, 5);
        assert_eq!(page.date_range, "N/A");
    }

    #[test]
    fn test_raw_data_month_filter() {
        let (_tmp, engine) = fixture();
        let filter = PartitionFilter { year: Some(2025), month: Some(2) };
        let page = engine.raw_data(&t("SBIN"), filter, None, Pagination::default()).unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.data[0].close, 810.0);
    }

    #[test]
    fn test_raw_data_unknown_ticker_not_found() {
        let (_tmp, engine) = fixture();
        let err = engine
            .raw_data(&t("XYZ"), PartitionFilter::all(), None, Pagination::default())
            .unwrap_err();
        assert_eq!(err, QueryError::not_found_ticker("XYZ"));
    }

    #[test]
    fn test_raw_data_date_filter_empty_not_found() {
        let (_tmp, engine) = fixture();
        let err = engine
            .raw_data(&t("SBIN"), PartitionFilter::all(), Some(20240101), Pagination::default())
            .unwrap_err();
        assert!(matches!(err, QueryError::NotFound(_)));
    }

    #[test]
    fn test_range_data_inclusive() {
        let (_tmp, engine) = fixture();
        let page = engine
            .range_data(&t("SBIN"), 20250103, 20250203, Pagination::default())
            .unwrap();
        assert_eq!(page.total, 2);
        assert!(page.data.iter().all(|r| (20250103..=20250203).contains(&r.date)));
    }

    #[test]
    fn test_range_data_empty_window_not_found() {
        let (_tmp, engine) = fixture();
        let err = engine
            .range_data(&t("SBIN"), 20240101, 20241231, Pagination::default())
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "No data found for ticker SBIN in the specified date range"
        );
    }

    #[test]
    fn test_summary() {
        let (_tmp, engine) = fixture();
        let s = engine.summary(&t("SBIN")).unwrap();
        assert_eq!(s.total_records, 5);
        assert_eq!(s.date_range, DateSpan { start: 20250102, end: 20250203 });
        assert_eq!(s.price_range.min, 799.0);
        assert_eq!(s.price_range.max, 810.0);
        assert!((s.price_range.avg - 803.0).abs() < 1e-9);
        assert_eq!(s.total_volume, 1500);
        assert_eq!(s.unique_dates, 3);
    }

    #[test]
    fn test_dates_matches_summary() {
        let (_tmp, engine) = fixture();
        let d = engine.dates(&t("SBIN")).unwrap();
        assert_eq!(d.dates, vec![20250102, 20250103, 20250203]);
        assert_eq!(d.count, engine.summary(&t("SBIN")).unwrap().unique_dates);
    }

    #[test]
    fn test_latest() {
        let (_tmp, engine) = fixture();
        let latest = engine.latest(&t("SBIN")).unwrap();
        assert_eq!(latest.latest_tick.date, 20250203);
        assert_eq!(latest.latest_tick.close, 810.0);
    }

    #[test]
    fn test_stats_for_day_uses_load_order() {
        let (_tmp, engine) = fixture();
        let s = engine.stats(&t("SBIN"), Some(20250102)).unwrap();
        assert_eq!(s.date, StatsScope::Day(20250102));
        // File order, not chronological order
        assert_eq!(s.statistics.price.open, 800.0);
        assert_eq!(s.statistics.price.close, 799.0);
        assert_eq!(s.statistics.tick_count, 3);
    }

    #[test]
    fn test_stats_all_and_missing_day() {
        let (_tmp, engine) = fixture();
        let s = engine.stats(&t("SBIN"), None).unwrap();
        assert_eq!(s.date, StatsScope::All);
        assert_eq!(s.statistics.tick_count, 5);
        assert!(matches!(
            engine.stats(&t("SBIN"), Some(20250501)),
            Err(QueryError::NotFound(_))
        ));
    }

    #[test]
    fn test_stats_scope_serialization() {
        assert_eq!(serde_json::to_value(StatsScope::All).unwrap(), "all");
        assert_eq!(serde_json::to_value(StatsScope::Day(20250102)).unwrap(), 20250102);
    }

    #[test]
    fn test_single_record_ticker_std_null() {
        let (_tmp, engine) = fixture();
        let s = engine.stats(&t("TCS"), None).unwrap();
        assert_eq!(s.statistics.price.std, None);
    }
}
