//! Multi-horizon trailing return snapshot.
//!
//! For each ticker: the simple return over the last 1, 3, 12, 36 and 60
//! monthly rows, plus the current 12-1 momentum value. Rows are sorted by the
//! 12-month return, best first, with tickers lacking that return last.

use crate::domain::error::MomentumError;
use crate::domain::momentum::MomentumSignal;
use crate::domain::price_table::PriceTable;
use crate::domain::resample::to_monthly;
use crate::ports::price_port::PriceSource;
use chrono::NaiveDate;
use std::cmp::Ordering;
use tracing::info;

pub const HORIZONS: [usize; 5] = [1, 3, 12, 36, 60];

pub fn default_history_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2010, 1, 1).unwrap_or(NaiveDate::MIN)
}

#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotRow {
    pub ticker: String,
    /// Trailing returns aligned with [`HORIZONS`].
    pub returns: [Option<f64>; 5],
    pub momentum_12_1: Option<f64>,
}

impl SnapshotRow {
    pub fn twelve_month(&self) -> Option<f64> {
        self.returns[2]
    }
}

/// Fetch history for `tickers` and build the snapshot.
pub fn run(
    source: &dyn PriceSource,
    tickers: &[String],
    start_date: NaiveDate,
) -> Result<Vec<SnapshotRow>, MomentumError> {
    info!(tickers = tickers.len(), start = %start_date, "building snapshot");
    let daily = source.fetch(tickers, start_date)?;
    let monthly = to_monthly(&daily)?;
    Ok(compute(&monthly))
}

pub fn compute(monthly: &PriceTable) -> Vec<SnapshotRow> {
    let Some(last_date) = monthly.last_date() else {
        return Vec::new();
    };
    let last = monthly.len() - 1;
    let momentum = MomentumSignal::default();

    let mut rows: Vec<SnapshotRow> = monthly
        .tickers()
        .iter()
        .map(|ticker| {
            let returns = HORIZONS.map(|months| trailing_return(monthly, last, months, ticker));
            let momentum_12_1 = momentum
                .history(monthly, ticker)
                .last()
                .filter(|(date, _)| *date == last_date)
                .map(|(_, value)| *value);
            SnapshotRow {
                ticker: ticker.clone(),
                returns,
                momentum_12_1,
            }
        })
        .collect();

    rows.sort_by(|a, b| match (a.twelve_month(), b.twelve_month()) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    rows
}

fn trailing_return(monthly: &PriceTable, row: usize, months: usize, ticker: &str) -> Option<f64> {
    let base = monthly.price(row.checked_sub(months)?, ticker)?;
    let current = monthly.price(row, ticker)?;
    Some(current / base - 1.0)
}
