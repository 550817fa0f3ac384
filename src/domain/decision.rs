//! Decision trace for a single rebalance.
//!
//! Records every ranked ticker, not just the selected ones, so a run can be
//! audited after the fact. Reports are write-only; the pipeline never reads
//! them back.

use crate::domain::momentum::Signal;
use crate::domain::ranking::RankedSignal;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecisionRecord {
    pub ticker: String,
    #[serde(rename = "momentum_12_1")]
    pub signal: f64,
    pub rank: usize,
    pub cutoff_rank: usize,
    pub selected: bool,
    pub universe_size: usize,
}

/// One record per ranked ticker, in rank order.
pub fn generate(signal: &Signal, ranked: &RankedSignal, top_n: usize) -> Vec<DecisionRecord> {
    ranked
        .entries()
        .iter()
        .enumerate()
        .map(|(i, (ticker, value))| {
            let rank = i + 1;
            DecisionRecord {
                ticker: ticker.clone(),
                signal: *value,
                rank,
                cutoff_rank: top_n,
                selected: rank <= top_n,
                universe_size: signal.len(),
            }
        })
        .collect()
}
