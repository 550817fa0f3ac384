//! Performance statistics over a backtest's rebalance history.
//!
//! Annualisation assumes quarterly periods. Volatility and Sharpe use the
//! sample standard deviation of period returns, with no risk-free rate.

use crate::domain::backtest::RebalanceRecord;
use crate::domain::error::MomentumError;
use chrono::NaiveDate;

pub const PERIODS_PER_YEAR: f64 = 4.0;
const DAYS_PER_YEAR: f64 = 365.25;

#[derive(Debug, Clone, PartialEq)]
pub struct Metrics {
    pub cagr: f64,
    pub annualized_volatility: f64,
    pub sharpe_ratio: f64,
    pub max_drawdown: f64,
}

impl Metrics {
    pub fn compute(records: &[RebalanceRecord]) -> Result<Self, MomentumError> {
        let sorted = sorted_by_next_date(records);
        let (Some(first), Some(last)) = (sorted.first(), sorted.last()) else {
            return Err(MomentumError::InsufficientHistory {
                rows: 0,
                required: 1,
            });
        };

        let years = (last.next_date - first.next_date).num_days() as f64 / DAYS_PER_YEAR;
        let cagr = if years > 0.0 {
            (last.capital / first.capital).powf(1.0 / years) - 1.0
        } else {
            0.0
        };

        let returns: Vec<f64> = sorted.iter().map(|r| r.portfolio_return).collect();
        let stddev = sample_stddev(&returns);
        let annualized_volatility = stddev * PERIODS_PER_YEAR.sqrt();
        let sharpe_ratio = if stddev != 0.0 {
            mean(&returns) / stddev * PERIODS_PER_YEAR.sqrt()
        } else {
            0.0
        };

        let max_drawdown = drawdown_series(records)
            .into_iter()
            .map(|(_, dd)| dd)
            .fold(0.0_f64, f64::min);

        Ok(Metrics {
            cagr,
            annualized_volatility,
            sharpe_ratio,
            max_drawdown,
        })
    }
}

/// `(capital - running peak) / running peak` at each `next_date`, as
/// non-positive fractions.
pub fn drawdown_series(records: &[RebalanceRecord]) -> Vec<(NaiveDate, f64)> {
    let mut peak = f64::NEG_INFINITY;
    sorted_by_next_date(records)
        .into_iter()
        .map(|r| {
            peak = peak.max(r.capital);
            let dd = if peak > 0.0 {
                (r.capital - peak) / peak
            } else {
                0.0
            };
            (r.next_date, dd)
        })
        .collect()
}

fn sorted_by_next_date(records: &[RebalanceRecord]) -> Vec<&RebalanceRecord> {
    let mut sorted: Vec<&RebalanceRecord> = records.iter().collect();
    sorted.sort_by_key(|r| r.next_date);
    sorted
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Standard deviation with one degree of freedom removed; 0 below two values.
fn sample_stddev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let variance =
        values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}
