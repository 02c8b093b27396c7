//! txn-extract - Exports high-value AC00 transactions from MySQL to CSV.
//!
//! This library exposes the core modules for use in integration tests.

pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod export;
pub mod logging;
pub mod pipeline;
pub mod query;
pub mod table;
pub mod timer;
