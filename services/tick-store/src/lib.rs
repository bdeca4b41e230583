//! Tick Store Service
//!
//! Serves read queries over a partitioned archive of per-ticker tick files:
//! - Partition discovery (ticker × year × month) and ticker enumeration
//! - Loading with skip-and-warn handling of malformed partitions
//! - Raw, range, summary, dates, latest and statistics queries
//!
//! # Architecture
//!
//! ```text
//!  {data_dir}/{YYYY}/{MM-YYYY}/{TICKER}.csv
//!        │
//!  ┌─────▼──────┐
//!  │ Partition  │  ← resolve(ticker, year?, month?)
//!  │   Index    │
//!  └─────┬──────┘
//!        │
//!  ┌─────▼──────┐
//!  │   Loader   │  ← concatenates partitions in discovery order
//!  └─────┬──────┘
//!        │
//!  ┌─────▼──────┐
//!  │   Query    │  ← filter / sort / paginate / aggregate
//!  │   Engine   │
//!  └────────────┘
//! ```
//!
//! Partitions are written by an external producer and never mutated here,
//! so every query path is read-only and needs no coordination.

pub mod loader;
pub mod params;
pub mod partition;
pub mod query;
pub mod stats;

pub use loader::TickDataLoader;
pub use params::{Pagination, PartitionFilter, Ticker};
pub use partition::PartitionIndex;
pub use query::QueryEngine;

// Library version
pub const SERVICE_VERSION: &str = "0.1.0";
