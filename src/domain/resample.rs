//! Daily to month-end resampling.
//!
//! Each calendar month present in the source becomes one row dated at the
//! last trading date of that month. Per ticker the row carries the last
//! non-missing price observed within the month.

use crate::domain::error::MomentumError;
use crate::domain::price_table::PriceTable;
use chrono::{Datelike, NaiveDate};

/// Collapse a daily table to one row per calendar month.
///
/// Resampling an already-monthly table returns an identical table.
pub fn to_monthly(daily: &PriceTable) -> Result<PriceTable, MomentumError> {
    let width = daily.tickers().len();
    let mut dates: Vec<NaiveDate> = Vec::new();
    let mut rows: Vec<Vec<Option<f64>>> = Vec::new();

    for (i, &date) in daily.dates().iter().enumerate() {
        let same_month = dates
            .last()
            .is_some_and(|last| month_key(*last) == month_key(date));

        if !same_month {
            dates.push(date);
            rows.push(vec![None; width]);
        }

        let (Some(last_date), Some(row)) = (dates.last_mut(), rows.last_mut()) else {
            continue;
        };
        *last_date = date;
        for (cell, price) in row.iter_mut().zip(daily.row(i)) {
            if price.is_some() {
                *cell = *price;
            }
        }
    }

    PriceTable::new(dates, daily.tickers().to_vec(), rows)
}

pub(crate) fn month_key(date: NaiveDate) -> (i32, u32) {
    (date.year(), date.month())
}

/// Calendar quarter of `date`, as `(year, 1..=4)`.
pub(crate) fn quarter_key(date: NaiveDate) -> (i32, u32) {
    (date.year(), (date.month() - 1) / 3 + 1)
}
