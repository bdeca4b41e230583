//! Types library for the tick archive API
//!
//! Core type definitions shared by the storage engine and the HTTP gateway.
//! Field names of [`tick::TickRecord`] are part of the wire contract.
//!
//! # Modules
//! - `tick`: Tick records and their chronological ordering
//! - `partition`: Partition identity (ticker × year × month)
//! - `errors`: Error taxonomy for query paths

pub mod errors;
pub mod partition;
pub mod tick;

// Library version constant
pub const LIB_VERSION: &str = "1.0.0";

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::errors::*;
    pub use crate::partition::*;
    pub use crate::tick::*;
}
