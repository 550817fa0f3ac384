//! Quarterly rebalance backtest.
//!
//! The loop walks adjacent quarter-end rows of the monthly table. At each
//! rebalance it computes the signal on data up to and including that row,
//! ranks, selects the equal-weight top N, and holds the selection until the
//! next quarter end. Capital compounds with the realized period return.

use crate::domain::error::MomentumError;
use crate::domain::momentum::MomentumSignal;
use crate::domain::portfolio::{self, WeightVector};
use crate::domain::price_table::PriceTable;
use crate::domain::ranking;
use crate::domain::resample::{month_key, quarter_key, to_monthly};
use crate::ports::price_port::PriceSource;
use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct BacktestConfig {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub initial_capital: f64,
    pub lookback_months: usize,
    pub skip_months: usize,
    pub top_n: usize,
}

/// Outcome of one holding period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RebalanceRecord {
    pub rebalance_date: NaiveDate,
    pub next_date: NaiveDate,
    pub portfolio_return: f64,
    pub capital: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BacktestPhase {
    Initialized,
    Fetching,
    Running { period: usize },
    Done,
}

#[derive(Debug)]
pub struct Backtester {
    config: BacktestConfig,
    signal: MomentumSignal,
    phase: BacktestPhase,
}

impl Backtester {
    pub fn new(config: BacktestConfig) -> Result<Self, MomentumError> {
        let signal = MomentumSignal::new(config.lookback_months, config.skip_months)?;
        if config.top_n == 0 {
            return Err(MomentumError::invalid_parameter("top_n", "must be at least 1"));
        }
        if !(config.initial_capital.is_finite() && config.initial_capital > 0.0) {
            return Err(MomentumError::invalid_parameter(
                "initial_capital",
                "must be a positive number",
            ));
        }
        if config.start_date >= config.end_date {
            return Err(MomentumError::invalid_parameter(
                "start_date",
                "must be before end_date",
            ));
        }
        Ok(Self {
            config,
            signal,
            phase: BacktestPhase::Initialized,
        })
    }

    pub fn phase(&self) -> BacktestPhase {
        self.phase
    }

    /// Fetch, resample and run. Any failure aborts the whole run.
    pub fn run(
        &mut self,
        source: &dyn PriceSource,
        universe: &[String],
    ) -> Result<Vec<RebalanceRecord>, MomentumError> {
        self.phase = BacktestPhase::Fetching;
        info!(
            tickers = universe.len(),
            start = %self.config.start_date,
            "fetching prices"
        );
        let daily = source.fetch(universe, self.config.start_date)?;
        let monthly = to_monthly(&daily)?.between(self.config.start_date, self.config.end_date);
        debug!(
            daily_rows = daily.len(),
            monthly_rows = monthly.len(),
            "resampled to month end"
        );
        self.run_monthly(&monthly)
    }

    /// Run the rebalance loop over an already-monthly table.
    pub fn run_monthly(
        &mut self,
        monthly: &PriceTable,
    ) -> Result<Vec<RebalanceRecord>, MomentumError> {
        let rebalance_rows = quarter_end_rows(monthly);
        let required = self.signal.required_rows() as i64;
        let first_month = monthly.first_date().map(month_index);

        let mut capital = self.config.initial_capital;
        let mut history = Vec::new();

        for (period, pair) in rebalance_rows.windows(2).enumerate() {
            self.phase = BacktestPhase::Running { period };
            let (row, next_row) = (pair[0], pair[1]);
            let date = monthly.dates()[row];
            let next_date = monthly.dates()[next_row];

            if first_month.is_none_or(|first| month_index(date) - first < required) {
                debug!(%date, "skipping rebalance: lookback window not yet populated");
                continue;
            }

            let signal = self.signal.compute(&monthly.up_to(date))?;
            let ranked = ranking::rank(&signal);
            let weights = portfolio::construct(&ranked.tickers(), self.config.top_n)?;

            let portfolio_return = period_return(monthly, &weights, row, next_row);
            capital *= 1.0 + portfolio_return;

            debug!(
                %date,
                %next_date,
                candidates = signal.len(),
                selected = weights.len(),
                portfolio_return,
                capital,
                "rebalanced"
            );

            history.push(RebalanceRecord {
                rebalance_date: date,
                next_date,
                portfolio_return,
                capital,
            });
        }

        self.phase = BacktestPhase::Done;
        info!(periods = history.len(), final_capital = capital, "backtest complete");
        Ok(history)
    }
}

/// Row index of the last monthly row in each calendar quarter.
pub fn quarter_end_rows(monthly: &PriceTable) -> Vec<usize> {
    let dates = monthly.dates();
    (0..dates.len())
        .filter(|&i| {
            dates
                .get(i + 1)
                .is_none_or(|next| quarter_key(*next) != quarter_key(dates[i]))
        })
        .collect()
}

/// Months since year zero, so warmup compares calendar months rather than
/// trading-day labels.
fn month_index(date: NaiveDate) -> i64 {
    let (year, month) = month_key(date);
    i64::from(year) * 12 + i64::from(month)
}

/// Weighted sum of simple returns from `row` to `next_row`.
///
/// A holding without a usable price at either end contributes nothing; its
/// weight is not handed to the other holdings.
fn period_return(monthly: &PriceTable, weights: &WeightVector, row: usize, next_row: usize) -> f64 {
    weights
        .iter()
        .filter_map(|(ticker, weight)| {
            let current = monthly.price(row, ticker)?;
            let next = monthly.price(next_row, ticker)?;
            let ret = next / current - 1.0;
            ret.is_finite().then_some(ret * weight)
        })
        .sum()
}
