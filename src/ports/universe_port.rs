//! Universe resolution port.

use crate::domain::error::MomentumError;
use std::path::Path;

pub trait UniversePort {
    /// Ordered, de-duplicated ticker list read from `source`.
    fn get_tickers(&self, source: &Path) -> Result<Vec<String>, MomentumError>;
}
