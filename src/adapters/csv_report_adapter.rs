//! CSV report writer.

use crate::domain::backtest::RebalanceRecord;
use crate::domain::decision::DecisionRecord;
use crate::domain::diagnostics::DiagnosticRecord;
use crate::domain::error::MomentumError;
use crate::ports::report_port::ReportPort;
use csv::WriterBuilder;
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::info;

const DECISION_HEADER: [&str; 6] = [
    "ticker",
    "momentum_12_1",
    "rank",
    "cutoff_rank",
    "selected",
    "universe_size",
];
const DIAGNOSTICS_HEADER: [&str; 5] = ["ticker", "date", "price", "momentum_12_1", "rank"];
const BACKTEST_HEADER: [&str; 4] = ["rebalance_date", "next_date", "portfolio_return", "capital"];

#[derive(Debug, Default)]
pub struct CsvReportAdapter;

impl CsvReportAdapter {
    pub fn new() -> Self {
        Self
    }

    /// Header is written up front so an empty report still carries it.
    fn write_records<T: Serialize>(
        header: &[&str],
        records: &[T],
        path: &Path,
    ) -> Result<(), MomentumError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut writer = WriterBuilder::new().has_headers(false).from_path(path)?;
        writer.write_record(header)?;
        for record in records {
            writer.serialize(record)?;
        }
        writer.flush()?;

        info!(path = %path.display(), rows = records.len(), "report written");
        Ok(())
    }
}

impl ReportPort for CsvReportAdapter {
    fn write_decision(&self, records: &[DecisionRecord], path: &Path) -> Result<(), MomentumError> {
        Self::write_records(&DECISION_HEADER, records, path)
    }

    fn write_diagnostics(
        &self,
        records: &[DiagnosticRecord],
        path: &Path,
    ) -> Result<(), MomentumError> {
        Self::write_records(&DIAGNOSTICS_HEADER, records, path)
    }

    fn write_backtest(&self, records: &[RebalanceRecord], path: &Path) -> Result<(), MomentumError> {
        Self::write_records(&BACKTEST_HEADER, records, path)
    }
}
