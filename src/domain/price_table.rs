//! Date-indexed price table: rows are trading dates, columns are tickers.

use crate::domain::error::MomentumError;
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashSet};

/// Adjusted close prices laid out row-major by date.
///
/// Dates are strictly increasing and tickers are unique. A cell is `None`
/// when the ticker has no price on that date.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceTable {
    dates: Vec<NaiveDate>,
    tickers: Vec<String>,
    rows: Vec<Vec<Option<f64>>>,
}

impl PriceTable {
    pub fn new(
        dates: Vec<NaiveDate>,
        tickers: Vec<String>,
        rows: Vec<Vec<Option<f64>>>,
    ) -> Result<Self, MomentumError> {
        if dates.windows(2).any(|w| w[0] >= w[1]) {
            return Err(MomentumError::invalid_parameter(
                "dates",
                "dates must be strictly increasing",
            ));
        }

        let mut seen = HashSet::new();
        for ticker in &tickers {
            if !seen.insert(ticker.as_str()) {
                return Err(MomentumError::invalid_parameter(
                    "tickers",
                    format!("duplicate ticker column {ticker}"),
                ));
            }
        }

        if rows.len() != dates.len() {
            return Err(MomentumError::invalid_parameter(
                "rows",
                format!("{} rows for {} dates", rows.len(), dates.len()),
            ));
        }
        if let Some(bad) = rows.iter().position(|r| r.len() != tickers.len()) {
            return Err(MomentumError::invalid_parameter(
                "rows",
                format!(
                    "row {} has {} cells, expected {}",
                    bad,
                    rows[bad].len(),
                    tickers.len()
                ),
            ));
        }

        Ok(Self {
            dates,
            tickers,
            rows,
        })
    }

    /// Outer-join per-ticker `(date, price)` series on date.
    ///
    /// Series may arrive unsorted; a repeated date within one series keeps the
    /// last price seen. Non-finite prices are stored as missing.
    pub fn from_series(
        series: Vec<(String, Vec<(NaiveDate, f64)>)>,
    ) -> Result<Self, MomentumError> {
        let tickers: Vec<String> = series.iter().map(|(t, _)| t.clone()).collect();
        let width = tickers.len();

        let mut by_date: BTreeMap<NaiveDate, Vec<Option<f64>>> = BTreeMap::new();
        for (col, (_, points)) in series.into_iter().enumerate() {
            for (date, price) in points {
                by_date.entry(date).or_insert_with(|| vec![None; width])[col] =
                    price.is_finite().then_some(price);
            }
        }

        let (dates, rows): (Vec<_>, Vec<_>) = by_date.into_iter().unzip();
        Self::new(dates, tickers, rows)
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn tickers(&self) -> &[String] {
        &self.tickers
    }

    pub fn row(&self, index: usize) -> &[Option<f64>] {
        &self.rows[index]
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.dates.first().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    pub fn column_index(&self, ticker: &str) -> Option<usize> {
        self.tickers.iter().position(|t| t == ticker)
    }

    /// Price of `ticker` on the row at `row`, `None` if the row, the column or
    /// the cell is missing.
    pub fn price(&self, row: usize, ticker: &str) -> Option<f64> {
        let col = self.column_index(ticker)?;
        self.rows.get(row).and_then(|r| r[col])
    }

    /// Rows whose date lies in `[start, end]`.
    pub fn between(&self, start: NaiveDate, end: NaiveDate) -> PriceTable {
        self.filter_rows(|d| d >= start && d <= end)
    }

    /// Rows up to and including `date`.
    pub fn up_to(&self, date: NaiveDate) -> PriceTable {
        self.filter_rows(|d| d <= date)
    }

    fn filter_rows(&self, keep: impl Fn(NaiveDate) -> bool) -> PriceTable {
        let (dates, rows): (Vec<_>, Vec<_>) = self
            .dates
            .iter()
            .zip(&self.rows)
            .filter(|(d, _)| keep(**d))
            .map(|(d, r)| (*d, r.clone()))
            .unzip();
        PriceTable {
            dates,
            tickers: self.tickers.clone(),
            rows,
        }
    }
}
