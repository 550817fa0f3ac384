//! Lookback-minus-skip momentum over a monthly price table.
//!
//! For the latest monthly row `t`:
//!
//! ```text
//! signal = price[t - skip] / price[t - lookback - skip] - 1
//! ```
//!
//! Lags are row positions, not calendar offsets. With the defaults
//! (`lookback = 12`, `skip = 1`) this is the classic 12-1 momentum factor.

use crate::domain::error::MomentumError;
use crate::domain::price_table::PriceTable;
use chrono::NaiveDate;

pub const DEFAULT_LOOKBACK_MONTHS: usize = 12;
pub const DEFAULT_SKIP_MONTHS: usize = 1;

/// Cross-sectional signal snapshot, one value per ticker, in table column order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Signal {
    entries: Vec<(String, f64)>,
}

impl Signal {
    pub fn from_entries(entries: Vec<(String, f64)>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, ticker: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(t, _)| t == ticker)
            .map(|(_, v)| *v)
    }

    pub fn entries(&self) -> &[(String, f64)] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(t, v)| (t.as_str(), *v))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MomentumSignal {
    lookback: usize,
    skip: usize,
}

impl Default for MomentumSignal {
    fn default() -> Self {
        Self {
            lookback: DEFAULT_LOOKBACK_MONTHS,
            skip: DEFAULT_SKIP_MONTHS,
        }
    }
}

impl MomentumSignal {
    pub fn new(lookback: usize, skip: usize) -> Result<Self, MomentumError> {
        if lookback == 0 {
            return Err(MomentumError::invalid_parameter(
                "lookback_months",
                "must be at least 1",
            ));
        }
        Ok(Self { lookback, skip })
    }

    /// Minimum number of monthly rows before a signal can be indexed at all.
    pub fn required_rows(&self) -> usize {
        self.lookback + self.skip
    }

    /// Signal as of the last row of `monthly`.
    ///
    /// Tickers missing either lagged price, or whose ratio is not finite, are
    /// left out. A table with exactly
    /// `lookback + skip` rows yields an empty signal, since the far lag falls
    /// one row before the start.
    pub fn compute(&self, monthly: &PriceTable) -> Result<Signal, MomentumError> {
        let rows = monthly.len();
        if rows < self.required_rows() {
            return Err(MomentumError::InsufficientHistory {
                rows,
                required: self.required_rows(),
            });
        }

        let last = rows - 1;
        let entries = monthly
            .tickers()
            .iter()
            .filter_map(|ticker| {
                self.value_at(monthly, last, ticker)
                    .map(|value| (ticker.clone(), value))
            })
            .collect();

        Ok(Signal::from_entries(entries))
    }

    /// Full momentum history for one ticker: every row where both lags exist.
    pub fn history(&self, monthly: &PriceTable, ticker: &str) -> Vec<(NaiveDate, f64)> {
        monthly
            .dates()
            .iter()
            .enumerate()
            .filter_map(|(row, &date)| self.value_at(monthly, row, ticker).map(|v| (date, v)))
            .collect()
    }

    fn value_at(&self, monthly: &PriceTable, row: usize, ticker: &str) -> Option<f64> {
        let near = row.checked_sub(self.skip)?;
        let far = row.checked_sub(self.lookback + self.skip)?;
        let near_price = monthly.price(near, ticker)?;
        let far_price = monthly.price(far, ticker)?;
        Some(near_price / far_price - 1.0).filter(|v| v.is_finite())
    }
}
