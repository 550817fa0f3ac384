//! Price data access port.

use crate::domain::error::MomentumError;
use crate::domain::price_table::PriceTable;
use chrono::NaiveDate;

/// Source of daily adjusted close prices.
pub trait PriceSource {
    /// Daily prices for `tickers` from `start_date` onward, one column per
    /// ticker in the order given.
    fn fetch(&self, tickers: &[String], start_date: NaiveDate) -> Result<PriceTable, MomentumError>;
}
