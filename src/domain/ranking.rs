//! Cross-sectional ranking by descending signal value.

use crate::domain::momentum::Signal;

/// Signal entries ordered best first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RankedSignal {
    entries: Vec<(String, f64)>,
}

impl RankedSignal {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[(String, f64)] {
        &self.entries
    }

    pub fn tickers(&self) -> Vec<String> {
        self.entries.iter().map(|(t, _)| t.clone()).collect()
    }

    /// 1-based position of `ticker`, if ranked.
    pub fn rank_of(&self, ticker: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|(t, _)| t == ticker)
            .map(|i| i + 1)
    }
}

/// Sort `signal` by value, highest first.
///
/// The sort is stable: equal values keep the order they had in `signal`.
pub fn rank(signal: &Signal) -> RankedSignal {
    let mut entries = signal.entries().to_vec();
    entries.sort_by(|a, b| b.1.total_cmp(&a.1));
    RankedSignal { entries }
}
