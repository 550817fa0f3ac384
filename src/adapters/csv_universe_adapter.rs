//! CSV universe file adapter.
//!
//! Accepts the NSE constituents download (a `Symbol` column, suffixed with
//! `.NS` on load) or a bare single-column ticker list.

use crate::domain::error::MomentumError;
use crate::ports::universe_port::UniversePort;
use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

const SYMBOL_COLUMN: &str = "Symbol";
const NSE_SUFFIX: &str = ".NS";

#[derive(Debug, Default)]
pub struct CsvUniverseAdapter;

impl CsvUniverseAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl UniversePort for CsvUniverseAdapter {
    fn get_tickers(&self, source: &Path) -> Result<Vec<String>, MomentumError> {
        let display = source.display().to_string();
        let content = fs::read_to_string(source).map_err(|e| match e.kind() {
            ErrorKind::NotFound => MomentumError::UniverseNotFound {
                path: display.clone(),
            },
            ErrorKind::InvalidData => MomentumError::UniverseFormat {
                path: display.clone(),
                reason: "file is not valid UTF-8".to_string(),
            },
            _ => MomentumError::Io(e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let headers = rdr.headers()?.clone();

        let (column, suffix) = match headers.iter().position(|h| h.trim() == SYMBOL_COLUMN) {
            Some(col) => (col, NSE_SUFFIX),
            None if headers.len() == 1 => (0, ""),
            None => {
                return Err(MomentumError::UniverseFormat {
                    path: display,
                    reason: format!(
                        "expected a '{}' column or a single column, found {} columns",
                        SYMBOL_COLUMN,
                        headers.len()
                    ),
                });
            }
        };

        let mut seen = HashSet::new();
        let mut tickers = Vec::new();
        for result in rdr.records() {
            let record = result?;
            let value = record.get(column).unwrap_or_default().trim();
            if value.is_empty() || !seen.insert(value.to_string()) {
                continue;
            }
            tickers.push(format!("{}{}", value, suffix));
        }

        Ok(tickers)
    }
}
