//! CSV file quote adapter.
//!
//! Reads `<base>/<SYMBOL>.csv` so evaluations can run against local
//! fixtures with no network. Header names are normalized through an alias
//! map before column extraction, so exports with `Adj Close`, `adj_close`,
//! or `ADJ CLOSE` headers all resolve to the same canonical column.

use crate::domain::error::TrendevalError;
use crate::domain::series::PriceBar;
use crate::ports::quote_port::QuotePort;
use chrono::{Duration, NaiveDate};
use std::collections::HashMap;
use std::path::PathBuf;

pub struct CsvQuoteAdapter {
    base_path: PathBuf,
}

/// Canonical column names for the headers we understand.
fn canonical_header(raw: &str) -> Option<&'static str> {
    match raw.trim().to_lowercase().as_str() {
        "date" => Some("date"),
        "open" => Some("open"),
        "high" => Some("high"),
        "low" => Some("low"),
        "close" => Some("close"),
        "adj close" | "adj_close" | "adjclose" => Some("adj_close"),
        "volume" => Some("volume"),
        _ => None,
    }
}

impl CsvQuoteAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{symbol}.csv"))
    }

    fn parse_error(symbol: &str, reason: impl ToString) -> TrendevalError {
        TrendevalError::Fetch {
            symbol: symbol.to_string(),
            reason: reason.to_string(),
        }
    }
}

fn lookback_start(period: &str, last: NaiveDate) -> Option<NaiveDate> {
    let years = period.strip_suffix('y')?.parse::<i64>().ok()?;
    Some(last - Duration::days((years as f64 * 365.25) as i64))
}

impl QuotePort for CsvQuoteAdapter {
    fn fetch_daily(
        &self,
        symbol: &str,
        period: &str,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<PriceBar>, TrendevalError> {
        let path = self.csv_path(symbol);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let mut reader =
            csv::Reader::from_path(&path).map_err(|e| Self::parse_error(symbol, e))?;

        let headers = reader
            .headers()
            .map_err(|e| Self::parse_error(symbol, e))?
            .clone();
        let columns: HashMap<&'static str, usize> = headers
            .iter()
            .enumerate()
            .filter_map(|(i, name)| canonical_header(name).map(|canon| (canon, i)))
            .collect();
        let date_col = *columns
            .get("date")
            .ok_or_else(|| Self::parse_error(symbol, "missing date column"))?;
        let close_col = *columns
            .get("close")
            .ok_or_else(|| Self::parse_error(symbol, "missing close column"))?;

        let field = |record: &csv::StringRecord, name: &str| -> Option<f64> {
            columns
                .get(name)
                .and_then(|&i| record.get(i))
                .and_then(|raw| raw.trim().parse().ok())
        };

        let mut bars = Vec::new();
        for result in reader.records() {
            let record = result.map_err(|e| Self::parse_error(symbol, e))?;
            let raw_date = record
                .get(date_col)
                .ok_or_else(|| Self::parse_error(symbol, "short record"))?;
            let date = NaiveDate::parse_from_str(raw_date.trim(), "%Y-%m-%d")
                .map_err(|e| Self::parse_error(symbol, format!("bad date {raw_date:?}: {e}")))?;
            if let Some(end) = end_date {
                if date > end {
                    continue;
                }
            }
            let close: f64 = record
                .get(close_col)
                .and_then(|raw| raw.trim().parse().ok())
                .ok_or_else(|| Self::parse_error(symbol, format!("bad close on {date}")))?;

            bars.push(PriceBar {
                date,
                open: field(&record, "open").unwrap_or(close),
                high: field(&record, "high").unwrap_or(close),
                low: field(&record, "low").unwrap_or(close),
                close,
                volume: field(&record, "volume").unwrap_or(0.0),
                adj_close: field(&record, "adj_close"),
            });
        }

        bars.sort_by_key(|b| b.date);
        if let Some(last) = bars.last().map(|b| b.date) {
            if let Some(start) = lookback_start(period, end_date.unwrap_or(last)) {
                bars.retain(|b| b.date >= start);
            }
        }
        Ok(bars)
    }
}
