//! Universe resolution.
//!
//! A universe comes from a CSV file (named directly or through a shortcut)
//! or from an inline comma-separated ticker list. Shortcuts are an explicit
//! table handed to the resolver rather than a process-wide constant.

use crate::domain::error::MomentumError;
use crate::ports::universe_port::UniversePort;
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq)]
pub struct Universe {
    pub name: String,
    pub tickers: Vec<String>,
}

impl Universe {
    pub fn count(&self) -> usize {
        self.tickers.len()
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum UniverseError {
    #[error("empty token in ticker list")]
    EmptyToken,

    #[error("duplicate ticker: {0}")]
    DuplicateTicker(String),
}

/// Parse an inline `A,B,C` ticker list, upper-cased, rejecting empties and
/// duplicates.
pub fn parse_codes(input: &str) -> Result<Vec<String>, UniverseError> {
    let mut codes = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(UniverseError::EmptyToken);
        }
        let code = trimmed.to_uppercase();
        if !seen.insert(code.clone()) {
            return Err(UniverseError::DuplicateTicker(code));
        }
        codes.push(code);
    }

    Ok(codes)
}

/// Named universe files, e.g. `nifty100` -> `data/nifty100_constituents.csv`.
#[derive(Debug, Clone, Default)]
pub struct UniverseShortcuts {
    entries: BTreeMap<String, PathBuf>,
}

impl UniverseShortcuts {
    pub fn new() -> Self {
        Self::default()
    }

    /// The NSE index files shipped under `data/`.
    pub fn nse_defaults() -> Self {
        Self::new()
            .with("nifty100", "data/nifty100_constituents.csv")
            .with("niftynext50", "data/ind_niftynext50list.csv")
    }

    pub fn with(mut self, name: &str, path: impl Into<PathBuf>) -> Self {
        self.entries.insert(name.to_lowercase(), path.into());
        self
    }

    /// Shortcut target for `name_or_path`, or the input itself as a path.
    pub fn resolve(&self, name_or_path: &str) -> PathBuf {
        self.entries
            .get(&name_or_path.to_lowercase())
            .cloned()
            .unwrap_or_else(|| PathBuf::from(name_or_path))
    }
}

/// Where a run's tickers come from.
#[derive(Debug, Clone, PartialEq)]
pub enum UniverseSource {
    File(PathBuf),
    Inline(Vec<String>),
}

impl UniverseSource {
    pub fn load(&self, port: &dyn UniversePort) -> Result<Universe, MomentumError> {
        match self {
            UniverseSource::File(path) => load_file(port, path),
            UniverseSource::Inline(tickers) => Ok(Universe {
                name: "inline".to_string(),
                tickers: tickers.clone(),
            }),
        }
    }
}

/// Load a universe file; the universe is named after the file stem.
pub fn load_file(port: &dyn UniversePort, path: &Path) -> Result<Universe, MomentumError> {
    let tickers = port.get_tickers(path)?;
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok(Universe { name, tickers })
}
