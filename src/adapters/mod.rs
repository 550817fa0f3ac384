//! Concrete adapter implementations for ports.

pub mod csv_price_adapter;
pub mod csv_report_adapter;
pub mod csv_universe_adapter;
pub mod file_config_adapter;
#[cfg(feature = "yahoo")]
pub mod yahoo_adapter;
