//! Report output port.

use crate::domain::backtest::RebalanceRecord;
use crate::domain::decision::DecisionRecord;
use crate::domain::diagnostics::DiagnosticRecord;
use crate::domain::error::MomentumError;
use std::path::Path;

/// Port for persisting decision, diagnostics and backtest reports.
pub trait ReportPort {
    fn write_decision(&self, records: &[DecisionRecord], path: &Path) -> Result<(), MomentumError>;

    fn write_diagnostics(
        &self,
        records: &[DiagnosticRecord],
        path: &Path,
    ) -> Result<(), MomentumError>;

    fn write_backtest(&self, records: &[RebalanceRecord], path: &Path) -> Result<(), MomentumError>;
}
