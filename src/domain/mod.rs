//! Core domain types and logic.

pub mod price_table;
pub mod resample;
pub mod momentum;
pub mod ranking;
pub mod portfolio;
pub mod decision;
pub mod diagnostics;
pub mod backtest;
pub mod metrics;
pub mod snapshot;
pub mod live;
pub mod universe;
pub mod config_validation;
pub mod error;
