//! Configuration validation.
//!
//! Validates all config fields before any price data is fetched.

use crate::domain::error::MomentumError;
use crate::domain::universe::parse_codes;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;

pub const DEFAULT_TOP_N: i64 = 10;
pub const DEFAULT_INITIAL_CAPITAL: f64 = 100_000.0;
pub const DATA_SOURCES: [&str; 2] = ["csv", "yahoo"];

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), MomentumError> {
    validate_universe(config)?;
    validate_backtest_settings(config)
}

/// Everything a backtest needs except the universe, for runs where the
/// universe comes from the command line.
pub fn validate_backtest_settings(config: &dyn ConfigPort) -> Result<(), MomentumError> {
    validate_data_source(config)?;
    validate_momentum(config)?;
    validate_top_n(config)?;
    validate_initial_capital(config)?;
    validate_backtest_dates(config)?;
    Ok(())
}

pub fn validate_live_config(config: &dyn ConfigPort) -> Result<(), MomentumError> {
    validate_universe(config)?;
    validate_data_source(config)?;
    validate_momentum(config)?;
    validate_top_n(config)?;
    parse_date(config, "data", "start_date")?;
    Ok(())
}

/// Parse a required `YYYY-MM-DD` value.
pub fn parse_date(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<NaiveDate, MomentumError> {
    let value = config
        .get_string(section, key)
        .ok_or_else(|| MomentumError::ConfigMissing {
            section: section.to_string(),
            key: key.to_string(),
        })?;
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| MomentumError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: format!("invalid {} format, expected YYYY-MM-DD", key),
    })
}

/// Read an integer that must be at least `min`, falling back to `default`
/// when the key is absent. A present but non-numeric value is an error.
pub fn read_int_at_least(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: i64,
    min: i64,
) -> Result<i64, MomentumError> {
    let invalid = |reason: String| MomentumError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason,
    };

    let value = match config.get_string(section, key) {
        None => default,
        Some(raw) => raw
            .trim()
            .parse::<i64>()
            .map_err(|_| invalid(format!("{} must be an integer", key)))?,
    };
    if value < min {
        return Err(invalid(format!("{} must be at least {}", key, min)));
    }
    Ok(value)
}

/// Read a finite number greater than zero, falling back to `default` when
/// the key is absent.
pub fn read_f64_positive(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: f64,
) -> Result<f64, MomentumError> {
    let invalid = |reason: String| MomentumError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason,
    };

    let value = match config.get_string(section, key) {
        None => default,
        Some(raw) => raw
            .trim()
            .parse::<f64>()
            .map_err(|_| invalid(format!("{} must be a number", key)))?,
    };
    if !(value.is_finite() && value > 0.0) {
        return Err(invalid(format!("{} must be a positive number", key)));
    }
    Ok(value)
}

fn validate_universe(config: &dyn ConfigPort) -> Result<(), MomentumError> {
    let present = |key: &str| {
        config
            .get_string("universe", key)
            .filter(|s| !s.trim().is_empty())
    };

    if present("file").is_some() || present("name").is_some() {
        return Ok(());
    }
    match present("tickers") {
        Some(list) => parse_codes(&list)
            .map(|_| ())
            .map_err(|e| MomentumError::ConfigInvalid {
                section: "universe".to_string(),
                key: "tickers".to_string(),
                reason: e.to_string(),
            }),
        None => Err(MomentumError::ConfigMissing {
            section: "universe".to_string(),
            key: "file".to_string(),
        }),
    }
}

fn validate_data_source(config: &dyn ConfigPort) -> Result<(), MomentumError> {
    match config.get_string("data", "source") {
        None => Ok(()),
        Some(s) if DATA_SOURCES.contains(&s.trim().to_lowercase().as_str()) => Ok(()),
        Some(s) => Err(MomentumError::ConfigInvalid {
            section: "data".to_string(),
            key: "source".to_string(),
            reason: format!("unknown source '{}', expected one of {:?}", s, DATA_SOURCES),
        }),
    }
}

fn validate_momentum(config: &dyn ConfigPort) -> Result<(), MomentumError> {
    read_int_at_least(config, "momentum", "lookback_months", 12, 1)?;
    read_int_at_least(config, "momentum", "skip_recent_months", 1, 0)?;
    Ok(())
}

fn validate_top_n(config: &dyn ConfigPort) -> Result<(), MomentumError> {
    read_int_at_least(config, "portfolio", "top_n", DEFAULT_TOP_N, 1)?;
    Ok(())
}

fn validate_initial_capital(config: &dyn ConfigPort) -> Result<(), MomentumError> {
    read_f64_positive(config, "backtest", "initial_capital", DEFAULT_INITIAL_CAPITAL)?;
    Ok(())
}

fn validate_backtest_dates(config: &dyn ConfigPort) -> Result<(), MomentumError> {
    let start_date = parse_date(config, "backtest", "start_date")?;
    let end_date = parse_date(config, "backtest", "end_date")?;

    if start_date >= end_date {
        return Err(MomentumError::ConfigInvalid {
            section: "backtest".to_string(),
            key: "start_date".to_string(),
            reason: "start_date must be before end_date".to_string(),
        });
    }
    Ok(())
}
