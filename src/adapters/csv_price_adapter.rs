//! CSV file price adapter.
//!
//! One file per ticker, `{base_path}/{TICKER}.csv`, with a header row that
//! holds `date` and `adj_close` (or `close` when no adjusted column exists).

use crate::domain::error::MomentumError;
use crate::domain::price_table::PriceTable;
use crate::ports::price_port::PriceSource;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;
use tracing::debug;

const DATE_COLUMN: &str = "date";
const PRICE_COLUMNS: [&str; 2] = ["adj_close", "close"];

pub struct CsvPriceAdapter {
    base_path: PathBuf,
}

impl CsvPriceAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, ticker: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", ticker))
    }

    fn read_series(
        &self,
        ticker: &str,
        start_date: NaiveDate,
    ) -> Result<Vec<(NaiveDate, f64)>, MomentumError> {
        let path = self.csv_path(ticker);
        let content = fs::read_to_string(&path).map_err(|e| {
            MomentumError::data_unavailable(format!("failed to read {}: {}", path.display(), e))
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let headers = rdr.headers()?.clone();
        let position = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };

        let date_col = position(DATE_COLUMN).ok_or_else(|| MomentumError::MissingColumn {
            column: DATE_COLUMN.to_string(),
        })?;
        let price_col = PRICE_COLUMNS
            .iter()
            .find_map(|name| position(name))
            .ok_or_else(|| MomentumError::MissingColumn {
                column: PRICE_COLUMNS[0].to_string(),
            })?;

        let mut series = Vec::new();
        for result in rdr.records() {
            let record = result?;

            let date_str = record.get(date_col).unwrap_or_default().trim();
            let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| {
                MomentumError::data_unavailable(format!(
                    "{}: invalid date '{}': {}",
                    ticker, date_str, e
                ))
            })?;
            if date < start_date {
                continue;
            }

            let cell = record.get(price_col).unwrap_or_default().trim();
            if cell.is_empty() {
                continue;
            }
            let price: f64 = cell.parse().map_err(|e| {
                MomentumError::data_unavailable(format!(
                    "{}: invalid price '{}' on {}: {}",
                    ticker, cell, date, e
                ))
            })?;
            if !price.is_finite() {
                debug!(ticker, %date, cell, "skipping non-finite price");
                continue;
            }
            series.push((date, price));
        }

        debug!(ticker, rows = series.len(), "loaded price file");
        Ok(series)
    }
}

impl PriceSource for CsvPriceAdapter {
    fn fetch(&self, tickers: &[String], start_date: NaiveDate) -> Result<PriceTable, MomentumError> {
        let series = tickers
            .iter()
            .map(|ticker| Ok((ticker.clone(), self.read_series(ticker, start_date)?)))
            .collect::<Result<Vec<_>, MomentumError>>()?;
        PriceTable::from_series(series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn setup_test_data() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().to_path_buf();

        fs::write(
            path.join("TCS.NS.csv"),
            "date,open,close,adj_close\n\
             2024-01-15,100.0,105.0,104.0\n\
             2024-01-16,105.0,110.0,109.0\n\
             2024-01-17,110.0,115.0,114.0\n",
        )
        .unwrap();
        fs::write(
            path.join("INFY.NS.csv"),
            "Date,Close\n\
             2024-01-16,50.0\n\
             2024-01-18,\n\
             2024-01-19,52.0\n",
        )
        .unwrap();
        fs::write(
            path.join("WIPRO.NS.csv"),
            "date,adj_close\n\
             2024-01-15,100.0\n\
             2024-01-16,NaN\n\
             2024-01-17,inf\n\
             2024-01-18,50.0\n",
        )
        .unwrap();
        fs::write(path.join("BAD.NS.csv"), "date,open,volume\n2024-01-15,1.0,10\n").unwrap();

        (dir, path)
    }

    fn tickers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn fetch_prefers_adjusted_close() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvPriceAdapter::new(path);

        let table = adapter.fetch(&tickers(&["TCS.NS"]), d(2024, 1, 1)).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.price(0, "TCS.NS"), Some(104.0));
        assert_eq!(table.price(2, "TCS.NS"), Some(114.0));
    }

    #[test]
    fn fetch_outer_joins_tickers() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvPriceAdapter::new(path);

        let table = adapter
            .fetch(&tickers(&["TCS.NS", "INFY.NS"]), d(2024, 1, 1))
            .unwrap();
        assert_eq!(table.tickers(), &tickers(&["TCS.NS", "INFY.NS"])[..]);
        assert_eq!(
            table.dates(),
            &[d(2024, 1, 15), d(2024, 1, 16), d(2024, 1, 17), d(2024, 1, 19)]
        );
        assert_eq!(table.price(0, "INFY.NS"), None);
        assert_eq!(table.price(1, "INFY.NS"), Some(50.0));
        assert_eq!(table.price(3, "TCS.NS"), None);
    }

    #[test]
    fn fetch_filters_before_start() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvPriceAdapter::new(path);

        let table = adapter.fetch(&tickers(&["TCS.NS"]), d(2024, 1, 16)).unwrap();
        assert_eq!(table.first_date(), Some(d(2024, 1, 16)));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn non_finite_prices_are_skipped() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvPriceAdapter::new(path);

        let table = adapter.fetch(&tickers(&["WIPRO.NS"]), d(2024, 1, 1)).unwrap();
        assert_eq!(table.dates(), &[d(2024, 1, 15), d(2024, 1, 18)]);
        assert_eq!(table.price(0, "WIPRO.NS"), Some(100.0));
        assert_eq!(table.price(1, "WIPRO.NS"), Some(50.0));
    }

    #[test]
    fn missing_file_is_data_unavailable() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvPriceAdapter::new(path);

        let result = adapter.fetch(&tickers(&["XYZ.NS"]), d(2024, 1, 1));
        assert!(matches!(result, Err(MomentumError::DataUnavailable { .. })));
    }

    #[test]
    fn missing_price_column_is_reported() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvPriceAdapter::new(path);

        let result = adapter.fetch(&tickers(&["BAD.NS"]), d(2024, 1, 1));
        assert!(matches!(
            result,
            Err(MomentumError::MissingColumn { ref column }) if column == "adj_close"
        ));
    }
}
