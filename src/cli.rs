//! CLI definition and dispatch.

use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_price_adapter::CsvPriceAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::csv_universe_adapter::CsvUniverseAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::backtest::{BacktestConfig, Backtester};
use crate::domain::config_validation::{
    parse_date, read_f64_positive, read_int_at_least, validate_backtest_config,
    validate_backtest_settings, validate_live_config, DEFAULT_INITIAL_CAPITAL, DEFAULT_TOP_N,
};
use crate::domain::error::MomentumError;
use crate::domain::live::{self, LiveConfig};
use crate::domain::metrics::Metrics;
use crate::domain::momentum::{DEFAULT_LOOKBACK_MONTHS, DEFAULT_SKIP_MONTHS};
use crate::domain::snapshot::{self, SnapshotRow, HORIZONS};
use crate::domain::universe::{parse_codes, Universe, UniverseShortcuts, UniverseSource};
use crate::ports::config_port::ConfigPort;
use crate::ports::price_port::PriceSource;
use crate::ports::report_port::ReportPort;

pub const DEFAULT_PRICE_DIR: &str = "data/prices";
pub const DEFAULT_OUTPUT_DIR: &str = "output";

#[derive(Parser, Debug)]
#[command(
    name = "momentum-engine",
    about = "12-1 momentum equity selection and quarterly backtesting",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Rank the universe today and write the decision report
    RunLive {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Run the quarterly rebalance backtest
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// Universe file or shortcut (overrides the config)
        #[arg(short, long)]
        universe: Option<String>,
        /// Output directory (overrides the config)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print trailing 1M/3M/12M/36M/60M returns for a universe
    Snapshot {
        #[arg(short, long)]
        universe: String,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Print version information
    Version,
}

pub fn run(cli: Cli) -> ExitCode {
    let shortcuts = UniverseShortcuts::nse_defaults();
    let result = match cli.command {
        Command::RunLive { config } => run_live(&config, &shortcuts),
        Command::Backtest {
            config,
            universe,
            output,
        } => run_backtest(&config, universe.as_deref(), output.as_deref(), &shortcuts),
        Command::Snapshot { universe, config } => {
            run_snapshot(&universe, config.as_deref(), &shortcuts)
        }
        Command::Validate { config } => run_validate(&config),
        Command::Version => {
            println!("momentum-engine {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, MomentumError> {
    eprintln!("Loading config from {}", path.display());
    FileConfigAdapter::from_file(path)
}

pub fn build_backtest_config(config: &dyn ConfigPort) -> Result<BacktestConfig, MomentumError> {
    Ok(BacktestConfig {
        start_date: parse_date(config, "backtest", "start_date")?,
        end_date: parse_date(config, "backtest", "end_date")?,
        initial_capital: read_f64_positive(
            config,
            "backtest",
            "initial_capital",
            DEFAULT_INITIAL_CAPITAL,
        )?,
        lookback_months: lookback_months(config)?,
        skip_months: skip_months(config)?,
        top_n: top_n(config)?,
    })
}

pub fn build_live_config(config: &dyn ConfigPort) -> Result<LiveConfig, MomentumError> {
    Ok(LiveConfig {
        data_start: parse_date(config, "data", "start_date")?,
        lookback_months: lookback_months(config)?,
        skip_months: skip_months(config)?,
        top_n: top_n(config)?,
    })
}

fn lookback_months(config: &dyn ConfigPort) -> Result<usize, MomentumError> {
    let value = read_int_at_least(
        config,
        "momentum",
        "lookback_months",
        DEFAULT_LOOKBACK_MONTHS as i64,
        1,
    )?;
    Ok(value as usize)
}

fn skip_months(config: &dyn ConfigPort) -> Result<usize, MomentumError> {
    let value = read_int_at_least(
        config,
        "momentum",
        "skip_recent_months",
        DEFAULT_SKIP_MONTHS as i64,
        0,
    )?;
    Ok(value as usize)
}

fn top_n(config: &dyn ConfigPort) -> Result<usize, MomentumError> {
    Ok(read_int_at_least(config, "portfolio", "top_n", DEFAULT_TOP_N, 1)? as usize)
}

/// Pick the universe: command-line override, then `[universe] file`, then
/// `[universe] name`, then an inline `[universe] tickers` list.
pub fn resolve_universe_source(
    universe_override: Option<&str>,
    config: Option<&dyn ConfigPort>,
    shortcuts: &UniverseShortcuts,
) -> Result<UniverseSource, MomentumError> {
    if let Some(name_or_path) = universe_override {
        return Ok(UniverseSource::File(shortcuts.resolve(name_or_path.trim())));
    }

    let value = |key: &str| {
        config
            .and_then(|c| c.get_string("universe", key))
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    };

    if let Some(file) = value("file") {
        return Ok(UniverseSource::File(PathBuf::from(file)));
    }
    if let Some(name) = value("name") {
        return Ok(UniverseSource::File(shortcuts.resolve(&name)));
    }
    if let Some(list) = value("tickers") {
        let tickers = parse_codes(&list).map_err(|e| MomentumError::ConfigInvalid {
            section: "universe".to_string(),
            key: "tickers".to_string(),
            reason: e.to_string(),
        })?;
        return Ok(UniverseSource::Inline(tickers));
    }

    Err(MomentumError::ConfigMissing {
        section: "universe".to_string(),
        key: "file".to_string(),
    })
}

pub fn build_price_source(
    config: Option<&dyn ConfigPort>,
) -> Result<Box<dyn PriceSource>, MomentumError> {
    let setting = |key: &str| config.and_then(|c| c.get_string("data", key));
    let source = setting("source")
        .map(|s| s.trim().to_lowercase())
        .unwrap_or_else(|| "csv".to_string());

    match source.as_str() {
        "csv" => {
            let dir = setting("directory").unwrap_or_else(|| DEFAULT_PRICE_DIR.to_string());
            Ok(Box::new(CsvPriceAdapter::new(PathBuf::from(dir))))
        }
        #[cfg(feature = "yahoo")]
        "yahoo" => Ok(Box::new(
            crate::adapters::yahoo_adapter::YahooPriceAdapter::new()?,
        )),
        other => Err(MomentumError::ConfigInvalid {
            section: "data".to_string(),
            key: "source".to_string(),
            reason: format!("price source '{}' is not available in this build", other),
        }),
    }
}

pub fn output_dir(output_override: Option<&Path>, config: &dyn ConfigPort) -> PathBuf {
    output_override
        .map(Path::to_path_buf)
        .or_else(|| config.get_string("output", "directory").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR))
}

/// `{dir}/{YYYY-MM-DD}_{kind}.csv`
pub fn report_path(dir: &Path, date: NaiveDate, kind: &str) -> PathBuf {
    dir.join(format!("{}_{}.csv", date.format("%Y-%m-%d"), kind))
}

fn load_universe(source: &UniverseSource) -> Result<Universe, MomentumError> {
    let universe = source.load(&CsvUniverseAdapter::new())?;
    if universe.tickers.is_empty() {
        return Err(MomentumError::UniverseFormat {
            path: universe.name,
            reason: "universe contains no tickers".to_string(),
        });
    }
    Ok(universe)
}

fn run_live(config_path: &Path, shortcuts: &UniverseShortcuts) -> Result<(), MomentumError> {
    let config = load_config(config_path)?;
    validate_live_config(&config)?;
    let live_config = build_live_config(&config)?;

    let universe = load_universe(&resolve_universe_source(
        None,
        Some(&config as &dyn ConfigPort),
        shortcuts,
    )?)?;
    let source = build_price_source(Some(&config as &dyn ConfigPort))?;

    run_live_pipeline(
        source.as_ref(),
        &universe,
        &live_config,
        &CsvReportAdapter::new(),
        &output_dir(None, &config),
        Local::now().date_naive(),
    )
}

/// Live run against an already-resolved universe and price source. Writes
/// the decision and diagnostics reports for `run_date` under `dir`.
pub fn run_live_pipeline(
    source: &dyn PriceSource,
    universe: &Universe,
    live_config: &LiveConfig,
    report: &dyn ReportPort,
    dir: &Path,
    run_date: NaiveDate,
) -> Result<(), MomentumError> {
    eprintln!(
        "Universe: {} ({} tickers)",
        universe.name,
        universe.count()
    );

    let decision = live::run(source, &universe.tickers, live_config)?;
    let decision_path = report_path(dir, run_date, "decision");
    let diagnostics_path = report_path(dir, run_date, "diagnostics");
    report.write_decision(&decision.records, &decision_path)?;
    report.write_diagnostics(&decision.diagnostics, &diagnostics_path)?;

    eprintln!("\n=== Selected Portfolio (as of {}) ===", decision.as_of);
    for (ticker, weight) in decision.weights.iter() {
        println!("{} -> {:.6}", ticker, weight);
    }
    eprintln!("\nDecision report written to: {}", decision_path.display());
    eprintln!("Diagnostics report written to: {}", diagnostics_path.display());
    Ok(())
}

fn run_backtest(
    config_path: &Path,
    universe_override: Option<&str>,
    output_override: Option<&Path>,
    shortcuts: &UniverseShortcuts,
) -> Result<(), MomentumError> {
    let config = load_config(config_path)?;
    match universe_override {
        Some(_) => validate_backtest_settings(&config)?,
        None => validate_backtest_config(&config)?,
    }
    let bt_config = build_backtest_config(&config)?;

    let universe = load_universe(&resolve_universe_source(
        universe_override,
        Some(&config as &dyn ConfigPort),
        shortcuts,
    )?)?;
    let source = build_price_source(Some(&config as &dyn ConfigPort))?;
    let path = report_path(
        &output_dir(output_override, &config),
        Local::now().date_naive(),
        "backtest",
    );

    run_backtest_pipeline(source.as_ref(), &universe, bt_config, &CsvReportAdapter::new(), &path)
        .map(|_| ())
}

/// Backtest against an already-resolved universe and price source. Writes the
/// rebalance history before computing metrics so an empty run still leaves a
/// report behind.
pub fn run_backtest_pipeline(
    source: &dyn PriceSource,
    universe: &Universe,
    bt_config: BacktestConfig,
    report: &dyn ReportPort,
    report_path: &Path,
) -> Result<Metrics, MomentumError> {
    eprintln!(
        "Universe: {} ({} tickers)",
        universe.name,
        universe.count()
    );
    eprintln!(
        "Running backtest: {} to {}, top {} of {}-{} momentum",
        bt_config.start_date,
        bt_config.end_date,
        bt_config.top_n,
        bt_config.lookback_months,
        bt_config.skip_months,
    );

    let mut backtester = Backtester::new(bt_config)?;
    let history = backtester.run(source, &universe.tickers)?;
    report.write_backtest(&history, report_path)?;
    eprintln!("  Rebalance periods: {}", history.len());

    let metrics = Metrics::compute(&history)?;

    eprintln!("\n=== Performance ===");
    eprintln!("CAGR:             {:.2}%", metrics.cagr * 100.0);
    eprintln!(
        "Volatility:       {:.2}%",
        metrics.annualized_volatility * 100.0
    );
    eprintln!("Sharpe Ratio:     {:.2}", metrics.sharpe_ratio);
    eprintln!("Max Drawdown:     {:.2}%", metrics.max_drawdown * 100.0);
    eprintln!("\nBacktest report written to: {}", report_path.display());
    Ok(metrics)
}

fn run_snapshot(
    universe_arg: &str,
    config_path: Option<&Path>,
    shortcuts: &UniverseShortcuts,
) -> Result<(), MomentumError> {
    let config = config_path.map(load_config).transpose()?;
    let config_ref = config.as_ref().map(|c| c as &dyn ConfigPort);

    let universe = load_universe(&resolve_universe_source(
        Some(universe_arg),
        config_ref,
        shortcuts,
    )?)?;
    let source = build_price_source(config_ref)?;

    eprintln!(
        "Universe: {} ({} tickers)",
        universe.name,
        universe.count()
    );
    let rows = snapshot::run(
        source.as_ref(),
        &universe.tickers,
        snapshot::default_history_start(),
    )?;

    print!("{}", format_snapshot(&rows));
    Ok(())
}

/// Render snapshot rows as a whitespace-aligned table, percentages with two
/// decimals, `-` where a horizon is unavailable.
pub fn format_snapshot(rows: &[SnapshotRow]) -> String {
    let pct = |v: Option<f64>| match v {
        Some(x) => format!("{:.2}%", x * 100.0),
        None => "-".to_string(),
    };

    let mut out = format!("{:<16}", "TICKER");
    for months in HORIZONS {
        out.push_str(&format!("{:>10}", format!("{}M", months)));
    }
    out.push_str(&format!("{:>10}\n", "12-1"));

    for row in rows {
        out.push_str(&format!("{:<16}", row.ticker));
        for value in row.returns {
            out.push_str(&format!("{:>10}", pct(value)));
        }
        out.push_str(&format!("{:>10}\n", pct(row.momentum_12_1)));
    }
    out
}

fn run_validate(config_path: &Path) -> Result<(), MomentumError> {
    let config = load_config(config_path)?;

    let has = |section: &str, key: &str| config.get_string(section, key).is_some();
    let backtest = has("backtest", "start_date") || has("backtest", "end_date");
    let live = has("data", "start_date");

    if backtest {
        validate_backtest_config(&config)?;
        eprintln!("[backtest] settings are valid");
    }
    if live || !backtest {
        validate_live_config(&config)?;
        eprintln!("[data] live settings are valid");
    }

    eprintln!("\nConfiguration is valid.");
    Ok(())
}
