//! Gateway API service
//!
//! HTTP front-end for the tick archive: API-key authentication, admin-gated
//! key issuance with an audit trail, and the read endpoints of
//! [`tick_store::QueryEngine`].

pub mod audit;
pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod keystore;
pub mod models;
pub mod router;
pub mod state;
