//! Yahoo Finance chart API price adapter.

use crate::domain::error::MomentumError;
use crate::domain::price_table::PriceTable;
use crate::ports::price_port::PriceSource;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

const CHART_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
const USER_AGENT: &str = concat!("momentum-engine/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    adjclose: Option<Vec<AdjClose>>,
}

#[derive(Debug, Deserialize)]
struct AdjClose {
    adjclose: Vec<Option<f64>>,
}

pub struct YahooPriceAdapter {
    client: reqwest::blocking::Client,
}

impl YahooPriceAdapter {
    pub fn new() -> Result<Self, MomentumError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| MomentumError::data_unavailable(format!("http client: {}", e)))?;
        Ok(Self { client })
    }

    fn fetch_series(
        &self,
        ticker: &str,
        start_date: NaiveDate,
    ) -> Result<Vec<(NaiveDate, f64)>, MomentumError> {
        let period1 = start_date
            .and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc().timestamp())
            .unwrap_or_default();
        let period2 = Utc::now().timestamp();
        let url = format!(
            "{}/{}?period1={}&period2={}&interval=1d&events=div%2Csplits",
            CHART_URL, ticker, period1, period2
        );

        let body = self
            .client
            .get(&url)
            .send()
            .and_then(|r| r.error_for_status())
            .and_then(|r| r.text())
            .map_err(|e| MomentumError::data_unavailable(format!("{}: {}", ticker, e)))?;

        let series = parse_chart(ticker, &body)?;
        debug!(ticker, rows = series.len(), "fetched chart");
        Ok(series)
    }
}

impl PriceSource for YahooPriceAdapter {
    fn fetch(&self, tickers: &[String], start_date: NaiveDate) -> Result<PriceTable, MomentumError> {
        let series = tickers
            .iter()
            .map(|ticker| Ok((ticker.clone(), self.fetch_series(ticker, start_date)?)))
            .collect::<Result<Vec<_>, MomentumError>>()?;
        PriceTable::from_series(series)
    }
}

/// Extract `(date, adjusted close)` points from a chart response body.
/// Null prices are dropped.
fn parse_chart(ticker: &str, body: &str) -> Result<Vec<(NaiveDate, f64)>, MomentumError> {
    let response: ChartResponse = serde_json::from_str(body).map_err(|e| {
        MomentumError::data_unavailable(format!("{}: malformed chart response: {}", ticker, e))
    })?;

    if let Some(error) = response.chart.error {
        return Err(MomentumError::data_unavailable(format!(
            "{}: {}",
            ticker, error.description
        )));
    }

    let result = response
        .chart
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(|| MomentumError::data_unavailable(format!("{}: empty chart result", ticker)))?;

    let prices = result
        .indicators
        .adjclose
        .and_then(|a| a.into_iter().next())
        .map(|a| a.adjclose)
        .ok_or_else(|| {
            MomentumError::data_unavailable(format!("{}: adjusted close not in response", ticker))
        })?;

    Ok(result
        .timestamp
        .iter()
        .zip(prices)
        .filter_map(|(ts, price)| {
            let date = DateTime::from_timestamp(*ts, 0)?.date_naive();
            Some((date, price?))
        })
        .collect())
}
