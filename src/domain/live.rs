//! Live decision run: the current ranking and the portfolio it selects.

use crate::domain::decision::{self, DecisionRecord};
use crate::domain::diagnostics::{self, DiagnosticRecord};
use crate::domain::error::MomentumError;
use crate::domain::momentum::MomentumSignal;
use crate::domain::portfolio::{self, WeightVector};
use crate::domain::ranking;
use crate::domain::resample::to_monthly;
use crate::ports::price_port::PriceSource;
use chrono::NaiveDate;
use tracing::info;

#[derive(Debug, Clone)]
pub struct LiveConfig {
    pub data_start: NaiveDate,
    pub lookback_months: usize,
    pub skip_months: usize,
    pub top_n: usize,
}

#[derive(Debug, Clone)]
pub struct LiveDecision {
    /// Last monthly row the signal was computed on.
    pub as_of: NaiveDate,
    pub weights: WeightVector,
    pub records: Vec<DecisionRecord>,
    /// Monthly price and momentum history of each selected holding.
    pub diagnostics: Vec<DiagnosticRecord>,
}

pub fn run(
    source: &dyn PriceSource,
    tickers: &[String],
    config: &LiveConfig,
) -> Result<LiveDecision, MomentumError> {
    let model = MomentumSignal::new(config.lookback_months, config.skip_months)?;

    let daily = source.fetch(tickers, config.data_start)?;
    let monthly = to_monthly(&daily)?;
    let as_of = monthly.last_date().ok_or_else(|| {
        MomentumError::data_unavailable(format!("no prices since {}", config.data_start))
    })?;

    let signal = model.compute(&monthly)?;
    let ranked = ranking::rank(&signal);
    let weights = portfolio::construct(&ranked.tickers(), config.top_n)?;
    let records = decision::generate(&signal, &ranked, config.top_n);
    let selected: Vec<String> = records
        .iter()
        .filter(|r| r.selected)
        .map(|r| r.ticker.clone())
        .collect();
    let diagnostics = diagnostics::build(&monthly, &model, &ranked, &selected);

    info!(
        %as_of,
        universe = tickers.len(),
        ranked = ranked.len(),
        selected = weights.len(),
        "live decision computed"
    );

    Ok(LiveDecision {
        as_of,
        weights,
        records,
        diagnostics,
    })
}
