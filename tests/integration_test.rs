//! Integration tests for the momentum pipeline.
//!
//! Tests cover:
//! - Full quarterly backtest over daily data with hand-computed compounding
//! - No look-ahead: future prices never change past rebalances
//! - Fail-fast on a price fetch error
//! - Live decision run: ranking, selection and weights
//! - Performance metrics over a known rebalance history

mod common;

use approx::assert_relative_eq;
use common::*;
use momentum_engine::domain::backtest::{BacktestConfig, BacktestPhase, Backtester};
use momentum_engine::domain::error::MomentumError;
use momentum_engine::domain::live::{self, LiveConfig};
use momentum_engine::domain::metrics::{drawdown_series, Metrics};
use momentum_engine::domain::snapshot;

const MONTHS: usize = 24;

fn steady(i: usize) -> f64 {
    100.0 * 1.02_f64.powi(i as i32)
}

/// Rallies 5% a month for the first year, then falls 3% a month.
fn boom_bust(i: usize) -> f64 {
    if i < 12 {
        100.0 * 1.05_f64.powi(i as i32)
    } else {
        100.0 * 1.05_f64.powi(11) * 0.97_f64.powi(i as i32 - 11)
    }
}

fn two_ticker_source() -> MockPriceSource {
    let first = date("2020-01-01");
    MockPriceSource::new()
        .with_series("STEADY", daily_series(first, MONTHS, steady))
        .with_series("BOOM", daily_series(first, MONTHS, boom_bust))
}

fn config() -> BacktestConfig {
    BacktestConfig {
        start_date: date("2020-01-01"),
        end_date: date("2021-12-31"),
        initial_capital: 100_000.0,
        lookback_months: 3,
        skip_months: 1,
        top_n: 1,
    }
}

fn month_end(i: usize) -> chrono::NaiveDate {
    let first = date("2020-01-01");
    last_weekday_of_month(first.checked_add_months(chrono::Months::new(i as u32)).unwrap())
}

mod full_backtest_pipeline {
    use super::*;

    #[test]
    fn quarterly_rebalances_after_warmup() {
        let source = two_ticker_source();
        let mut backtester = Backtester::new(config()).unwrap();
        let history = backtester
            .run(&source, &tickers(&["STEADY", "BOOM"]))
            .unwrap();

        // warmup ends four months after January, so March is skipped
        let expected_dates: Vec<_> = [5, 8, 11, 14, 17, 20].iter().map(|&i| month_end(i)).collect();
        let actual: Vec<_> = history.iter().map(|r| r.rebalance_date).collect();
        assert_eq!(actual, expected_dates);
        assert_eq!(history.last().unwrap().next_date, month_end(23));
        assert_eq!(backtester.phase(), BacktestPhase::Done);
    }

    #[test]
    fn compounding_matches_hand_computation() {
        let source = two_ticker_source();
        let mut backtester = Backtester::new(config()).unwrap();
        let history = backtester
            .run(&source, &tickers(&["STEADY", "BOOM"]))
            .unwrap();

        let boom_quarter = |row: usize| boom_bust(row + 3) / boom_bust(row) - 1.0;
        let steady_quarter = steady(3) / steady(0) - 1.0;
        // BOOM leads until its decline shows up in the 3-1 window at row 14
        let expected_returns = [
            boom_quarter(5),
            boom_quarter(8),
            boom_quarter(11),
            steady_quarter,
            steady_quarter,
            steady_quarter,
        ];

        let mut capital = 100_000.0;
        for (record, expected) in history.iter().zip(expected_returns) {
            capital *= 1.0 + expected;
            assert_relative_eq!(record.portfolio_return, expected, epsilon = 1e-9);
            assert_relative_eq!(record.capital, capital, epsilon = 1e-6);
        }
        assert_relative_eq!(
            history.last().unwrap().capital,
            100_000.0 * 1.05_f64.powi(6) * 0.97_f64.powi(3) * 1.02_f64.powi(9),
            max_relative = 1e-9
        );
    }

    #[test]
    fn fetch_starts_at_backtest_start() {
        let source = two_ticker_source();
        let mut backtester = Backtester::new(config()).unwrap();
        backtester
            .run(&source, &tickers(&["STEADY", "BOOM"]))
            .unwrap();

        let requests = source.requests.borrow();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].1, date("2020-01-01"));
        assert_eq!(requests[0].0, tickers(&["STEADY", "BOOM"]));
    }

    #[test]
    fn end_date_truncates_history() {
        let source = two_ticker_source();
        let mut config = config();
        config.end_date = date("2020-12-31");
        let history = Backtester::new(config)
            .unwrap()
            .run(&source, &tickers(&["STEADY", "BOOM"]))
            .unwrap();

        assert_eq!(history.len(), 2);
        assert_eq!(history[1].next_date, month_end(11));
    }

    #[test]
    fn top_n_above_universe_leaves_cash() {
        let source = two_ticker_source();
        let mut config = config();
        config.top_n = 4;
        let history = Backtester::new(config)
            .unwrap()
            .run(&source, &tickers(&["STEADY", "BOOM"]))
            .unwrap();

        // each holding gets 0.25; the other half of capital earns nothing
        let expected = 0.25 * (boom_bust(8) / boom_bust(5) - 1.0)
            + 0.25 * (steady(8) / steady(5) - 1.0);
        assert_relative_eq!(history[0].portfolio_return, expected, epsilon = 1e-9);
    }
}

mod point_in_time {
    use super::*;

    #[test]
    fn future_prices_do_not_change_past_rebalances() {
        let first = date("2020-01-01");
        let crash_after_2020 = |i: usize| if i < 12 { steady(i) } else { steady(i) * 0.1 };
        let altered = MockPriceSource::new()
            .with_series("STEADY", daily_series(first, MONTHS, crash_after_2020))
            .with_series("BOOM", daily_series(first, MONTHS, boom_bust));

        let universe = tickers(&["STEADY", "BOOM"]);
        let base = Backtester::new(config())
            .unwrap()
            .run(&two_ticker_source(), &universe)
            .unwrap();
        let changed = Backtester::new(config())
            .unwrap()
            .run(&altered, &universe)
            .unwrap();

        let settled = |h: &[momentum_engine::domain::backtest::RebalanceRecord]| {
            h.iter()
                .filter(|r| r.next_date <= date("2020-12-31"))
                .cloned()
                .collect::<Vec<_>>()
        };
        assert_eq!(settled(&base).len(), 2);
        assert_eq!(settled(&base), settled(&changed));
        assert_ne!(base, changed);
    }
}

mod fail_fast {
    use super::*;

    #[test]
    fn fetch_error_aborts_backtest() {
        let source = two_ticker_source().with_error("BOOM", "connection reset");
        let mut backtester = Backtester::new(config()).unwrap();
        let result = backtester.run(&source, &tickers(&["STEADY", "BOOM"]));

        assert!(matches!(
            result,
            Err(MomentumError::DataUnavailable { ref reason }) if reason == "connection reset"
        ));
        assert_eq!(backtester.phase(), BacktestPhase::Fetching);
    }

    #[test]
    fn invalid_config_rejected_before_fetch() {
        let mut config = config();
        config.top_n = 0;
        assert!(matches!(
            Backtester::new(config),
            Err(MomentumError::InvalidParameter { .. })
        ));
    }
}

mod live_decision {
    use super::*;

    fn live_config(top_n: usize) -> LiveConfig {
        LiveConfig {
            data_start: date("2020-01-01"),
            lookback_months: 3,
            skip_months: 1,
            top_n,
        }
    }

    #[test]
    fn ranks_selects_and_weights() {
        let source = two_ticker_source();
        let decision = live::run(&source, &tickers(&["BOOM", "STEADY"]), &live_config(1)).unwrap();

        assert_eq!(decision.as_of, month_end(23));
        assert_eq!(decision.weights.len(), 1);
        assert_eq!(decision.weights.get("STEADY"), Some(1.0));

        assert_eq!(decision.records.len(), 2);
        let first = &decision.records[0];
        assert_eq!(first.ticker, "STEADY");
        assert_eq!(first.rank, 1);
        assert!(first.selected);
        assert_relative_eq!(first.signal, steady(22) / steady(19) - 1.0, epsilon = 1e-12);

        let second = &decision.records[1];
        assert_eq!(second.ticker, "BOOM");
        assert!(!second.selected);
        assert_eq!(second.cutoff_rank, 1);
        assert_eq!(second.universe_size, 2);
    }

    #[test]
    fn weights_not_renormalised_for_small_universe() {
        let source = two_ticker_source();
        let decision = live::run(&source, &tickers(&["BOOM", "STEADY"]), &live_config(3)).unwrap();

        assert_eq!(decision.weights.len(), 2);
        assert_eq!(decision.weights.get("BOOM"), Some(0.333333));
        assert_relative_eq!(decision.weights.total(), 0.666666, epsilon = 1e-12);
    }

    #[test]
    fn too_little_history_is_reported() {
        let first = date("2020-01-01");
        let source = MockPriceSource::new().with_series("STEADY", daily_series(first, 3, steady));
        let result = live::run(&source, &tickers(&["STEADY"]), &live_config(1));

        assert!(matches!(
            result,
            Err(MomentumError::InsufficientHistory { rows: 3, required: 4 })
        ));
    }

    #[test]
    fn empty_price_history_is_unavailable() {
        let source = MockPriceSource::new();
        let result = live::run(&source, &tickers(&["NOPE"]), &live_config(1));
        assert!(matches!(result, Err(MomentumError::DataUnavailable { .. })));
    }
}

mod performance {
    use super::*;

    #[test]
    fn metrics_over_backtest_history() {
        let source = two_ticker_source();
        let history = Backtester::new(config())
            .unwrap()
            .run(&source, &tickers(&["STEADY", "BOOM"]))
            .unwrap();
        let metrics = Metrics::compute(&history).unwrap();

        assert_relative_eq!(metrics.max_drawdown, 0.97_f64.powi(3) - 1.0, epsilon = 1e-9);
        assert!(metrics.cagr > 0.0);
        assert!(metrics.annualized_volatility > 0.0);
        assert!(metrics.sharpe_ratio > 0.0);

        let drawdowns = drawdown_series(&history);
        assert_eq!(drawdowns.len(), history.len());
        assert!(drawdowns.iter().all(|(_, dd)| *dd <= 0.0));
    }

    #[test]
    fn empty_history_is_insufficient() {
        assert!(matches!(
            Metrics::compute(&[]),
            Err(MomentumError::InsufficientHistory { rows: 0, required: 1 })
        ));
    }
}

mod snapshot_pipeline {
    use super::*;

    #[test]
    fn snapshot_over_daily_history() {
        let source = two_ticker_source();
        let rows = snapshot::run(
            &source,
            &tickers(&["STEADY", "BOOM"]),
            snapshot::default_history_start(),
        )
        .unwrap();

        assert_eq!(rows.len(), 2);
        // 12M: STEADY 1.02^12 - 1 beats BOOM's decline
        assert_eq!(rows[0].ticker, "STEADY");
        assert_relative_eq!(
            rows[0].twelve_month().unwrap(),
            steady(23) / steady(11) - 1.0,
            epsilon = 1e-12
        );
        assert!(rows[0].returns[3].is_none());
        assert_relative_eq!(
            rows[1].momentum_12_1.unwrap(),
            boom_bust(22) / boom_bust(10) - 1.0,
            epsilon = 1e-12
        );
    }
}
