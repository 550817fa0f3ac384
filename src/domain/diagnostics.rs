//! Per-holding history behind a live selection.
//!
//! For every selected ticker, in rank order, one row per monthly price with
//! the momentum value on that row (empty until both lags exist) and the
//! ticker's current rank.

use crate::domain::momentum::MomentumSignal;
use crate::domain::price_table::PriceTable;
use crate::domain::ranking::RankedSignal;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiagnosticRecord {
    pub ticker: String,
    pub date: NaiveDate,
    pub price: f64,
    pub momentum_12_1: Option<f64>,
    pub rank: usize,
}

/// History rows for the `selected` tickers.
///
/// Tickers that are unranked, or that have no price or no momentum value
/// anywhere in `monthly`, are left out.
pub fn build(
    monthly: &PriceTable,
    model: &MomentumSignal,
    ranked: &RankedSignal,
    selected: &[String],
) -> Vec<DiagnosticRecord> {
    let mut records = Vec::new();

    for (ticker, _) in ranked.entries() {
        if !selected.contains(ticker) {
            continue;
        }
        let Some(rank) = ranked.rank_of(ticker) else {
            continue;
        };

        let momentum: HashMap<NaiveDate, f64> = model.history(monthly, ticker).into_iter().collect();
        if momentum.is_empty() {
            continue;
        }

        records.extend(monthly.dates().iter().enumerate().filter_map(|(row, date)| {
            monthly.price(row, ticker).map(|price| DiagnosticRecord {
                ticker: ticker.clone(),
                date: *date,
                price,
                momentum_12_1: momentum.get(date).copied(),
                rank,
            })
        }));
    }

    records
}
