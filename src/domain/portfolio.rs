//! Equal-weight top-N portfolio construction.

use crate::domain::error::MomentumError;

const WEIGHT_DECIMALS: i32 = 6;

/// Selected tickers and their weights, in rank order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeightVector {
    weights: Vec<(String, f64)>,
}

impl WeightVector {
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn get(&self, ticker: &str) -> Option<f64> {
        self.weights
            .iter()
            .find(|(t, _)| t == ticker)
            .map(|(_, w)| *w)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.weights.iter().map(|(t, w)| (t.as_str(), *w))
    }

    pub fn total(&self) -> f64 {
        self.weights.iter().map(|(_, w)| w).sum()
    }
}

/// Take the first `top_n` of `ranked` and give each `round(1 / top_n, 6)`.
///
/// Weights are fractions of the requested `top_n`, not of the number actually
/// selected: with fewer than `top_n` candidates the weights sum to less than 1
/// and the remainder is left uninvested.
pub fn construct(ranked: &[String], top_n: usize) -> Result<WeightVector, MomentumError> {
    if top_n == 0 {
        return Err(MomentumError::invalid_parameter("top_n", "must be at least 1"));
    }

    let weight = round_to(1.0 / top_n as f64, WEIGHT_DECIMALS);
    let weights = ranked
        .iter()
        .take(top_n)
        .map(|ticker| (ticker.clone(), weight))
        .collect();

    Ok(WeightVector { weights })
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
