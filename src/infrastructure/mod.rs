//! Infrastructure Layer
//!
//! Implementations of the storage contract and other external concerns:
//! - Document stores (PostgreSQL, in-memory)
//! - Connection pool and migrations
//! - Prometheus metrics

pub mod database;
pub mod metrics;
pub mod repositories;
