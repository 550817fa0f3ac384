#![allow(dead_code)]

use chrono::{Datelike, Months, NaiveDate, Weekday};
use momentum_engine::domain::error::MomentumError;
use momentum_engine::domain::price_table::PriceTable;
use momentum_engine::ports::price_port::PriceSource;
use std::cell::RefCell;
use std::collections::HashMap;

/// In-memory price source. Records the start date of every fetch so tests can
/// check what the pipeline asked for.
pub struct MockPriceSource {
    pub series: Vec<(String, Vec<(NaiveDate, f64)>)>,
    pub errors: HashMap<String, String>,
    pub requests: RefCell<Vec<(Vec<String>, NaiveDate)>>,
}

impl MockPriceSource {
    pub fn new() -> Self {
        Self {
            series: Vec::new(),
            errors: HashMap::new(),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn with_series(mut self, ticker: &str, points: Vec<(NaiveDate, f64)>) -> Self {
        self.series.push((ticker.to_string(), points));
        self
    }

    pub fn with_error(mut self, ticker: &str, reason: &str) -> Self {
        self.errors.insert(ticker.to_string(), reason.to_string());
        self
    }
}

impl PriceSource for MockPriceSource {
    fn fetch(&self, tickers: &[String], start_date: NaiveDate) -> Result<PriceTable, MomentumError> {
        self.requests
            .borrow_mut()
            .push((tickers.to_vec(), start_date));

        let mut wanted = Vec::with_capacity(tickers.len());
        for ticker in tickers {
            if let Some(reason) = self.errors.get(ticker) {
                return Err(MomentumError::data_unavailable(reason.clone()));
            }
            let points = self
                .series
                .iter()
                .find(|(t, _)| t == ticker)
                .map(|(_, p)| p.iter().copied().filter(|(d, _)| *d >= start_date).collect())
                .unwrap_or_default();
            wanted.push((ticker.clone(), points));
        }
        PriceTable::from_series(wanted)
    }
}

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

pub fn tickers(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

/// Last weekday of the month containing `day`.
pub fn last_weekday_of_month(day: NaiveDate) -> NaiveDate {
    let first = NaiveDate::from_ymd_opt(day.year(), day.month(), 1).unwrap();
    let mut last = first
        .checked_add_months(Months::new(1))
        .unwrap()
        .pred_opt()
        .unwrap();
    while matches!(last.weekday(), Weekday::Sat | Weekday::Sun) {
        last = last.pred_opt().unwrap();
    }
    last
}

/// One price per month on the last weekday, starting in the month of
/// `first_month`, from `price(i)` for month index `i`.
pub fn month_end_series(
    first_month: NaiveDate,
    months: usize,
    price: impl Fn(usize) -> f64,
) -> Vec<(NaiveDate, f64)> {
    (0..months)
        .map(|i| {
            let month = first_month.checked_add_months(Months::new(i as u32)).unwrap();
            (last_weekday_of_month(month), price(i))
        })
        .collect()
}

/// Daily weekday prices interpolating geometrically between the monthly
/// anchors of [`month_end_series`]; month-end closes match the anchors.
pub fn daily_series(
    first_month: NaiveDate,
    months: usize,
    price: impl Fn(usize) -> f64,
) -> Vec<(NaiveDate, f64)> {
    let anchors = month_end_series(first_month, months, &price);
    let mut out = Vec::new();
    let mut prev: Option<(NaiveDate, f64)> = None;

    for (end, close) in anchors {
        let start = NaiveDate::from_ymd_opt(end.year(), end.month(), 1).unwrap();
        let trading: Vec<NaiveDate> = start
            .iter_days()
            .take_while(|d| *d <= end)
            .filter(|d| !matches!(d.weekday(), Weekday::Sat | Weekday::Sun))
            .collect();
        let open = prev.map(|(_, p)| p).unwrap_or(close);
        let steps = trading.len() as f64;
        for (k, d) in trading.iter().enumerate() {
            let frac = (k + 1) as f64 / steps;
            let value = if k + 1 == trading.len() {
                close
            } else {
                open * (close / open).powf(frac)
            };
            out.push((*d, value));
        }
        prev = Some((end, close));
    }
    out
}
