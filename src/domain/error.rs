//! Domain error types.

/// Top-level error type for the momentum engine.
#[derive(Debug, thiserror::Error)]
pub enum MomentumError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("universe file not found: {path}")]
    UniverseNotFound { path: String },

    #[error("unsupported universe file {path}: {reason}")]
    UniverseFormat { path: String, reason: String },

    #[error("price data unavailable: {reason}")]
    DataUnavailable { reason: String },

    #[error("expected column '{column}' not found in price data")]
    MissingColumn { column: String },

    #[error("insufficient history: have {rows} rows, need {required}")]
    InsufficientHistory { rows: usize, required: usize },

    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl MomentumError {
    pub fn invalid_parameter(name: &str, reason: impl Into<String>) -> Self {
        MomentumError::InvalidParameter {
            name: name.to_string(),
            reason: reason.into(),
        }
    }

    pub fn data_unavailable(reason: impl Into<String>) -> Self {
        MomentumError::DataUnavailable {
            reason: reason.into(),
        }
    }
}

impl From<&MomentumError> for std::process::ExitCode {
    fn from(err: &MomentumError) -> Self {
        let code: u8 = match err {
            MomentumError::Io(_) | MomentumError::Csv(_) => 1,
            MomentumError::ConfigParse { .. }
            | MomentumError::ConfigMissing { .. }
            | MomentumError::ConfigInvalid { .. }
            | MomentumError::UniverseNotFound { .. }
            | MomentumError::UniverseFormat { .. } => 2,
            MomentumError::DataUnavailable { .. } | MomentumError::MissingColumn { .. } => 3,
            MomentumError::InsufficientHistory { .. } => 4,
            MomentumError::InvalidParameter { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
