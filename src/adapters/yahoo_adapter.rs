//! Yahoo Finance chart API quote adapter.
//!
//! Blocking HTTP against the v8 chart endpoint. The upstream `period2`
//! bound is exclusive, so an inclusive cutoff date is widened by one
//! calendar day before the request; no post-filtering is applied to the
//! returned range.

use crate::domain::error::TrendevalError;
use crate::domain::series::PriceBar;
use crate::ports::quote_port::QuotePort;
use chrono::{Duration, NaiveDate, Utc};
use serde_json::Value;
use tracing::debug;

const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";
const SECONDS_PER_YEAR: i64 = 31_557_600; // 365.25 days

pub struct YahooAdapter {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl YahooAdapter {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Point the adapter at a different host; used to run against a local
    /// test server.
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn fetch_error(symbol: &str, reason: impl ToString) -> TrendevalError {
        TrendevalError::Fetch {
            symbol: symbol.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl Default for YahooAdapter {
    fn default() -> Self {
        Self::new()
    }
}

/// (period1, period2) unix bounds for a lookback period ending at the
/// exclusive-adjusted cutoff.
fn period_bounds(period: &str, end_date: Option<NaiveDate>) -> (i64, i64) {
    let period2 = match end_date {
        // Upstream end bound is exclusive: ask for one day past the
        // inclusive cutoff.
        Some(end) => (end + Duration::days(1))
            .and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc().timestamp())
            .unwrap_or_else(|| Utc::now().timestamp()),
        None => Utc::now().timestamp(),
    };
    let period1 = match period.strip_suffix('y').and_then(|y| y.parse::<i64>().ok()) {
        Some(years) => period2 - years * SECONDS_PER_YEAR,
        // "max" or anything unparseable falls back to all available history.
        None => 0,
    };
    (period1, period2)
}

fn parse_chart(symbol: &str, body: &Value) -> Result<Vec<PriceBar>, TrendevalError> {
    if let Some(error) = body["chart"]["error"].as_object() {
        return Err(YahooAdapter::fetch_error(
            symbol,
            format!("chart error: {:?}", error.get("description")),
        ));
    }
    let result = &body["chart"]["result"][0];
    let Some(timestamps) = result["timestamp"].as_array() else {
        // A well-formed response with no timestamps means the symbol has no
        // data for the range; that is the ingestor's call to classify.
        return Ok(Vec::new());
    };
    let quote = &result["indicators"]["quote"][0];
    let adjclose = result["indicators"]["adjclose"][0]["adjclose"].as_array();

    let column = |name: &str| -> Vec<Option<f64>> {
        quote[name]
            .as_array()
            .map(|values| values.iter().map(Value::as_f64).collect())
            .unwrap_or_default()
    };
    let opens = column("open");
    let highs = column("high");
    let lows = column("low");
    let closes = column("close");
    let volumes = column("volume");

    let mut bars = Vec::with_capacity(timestamps.len());
    for (i, ts) in timestamps.iter().enumerate() {
        let Some(ts) = ts.as_i64() else { continue };
        let Some(date) = chrono::DateTime::from_timestamp(ts, 0).map(|dt| dt.date_naive()) else {
            continue;
        };
        // Skip half-formed rows (halted days come back as nulls).
        let Some(close) = closes.get(i).copied().flatten() else {
            continue;
        };
        bars.push(PriceBar {
            date,
            open: opens.get(i).copied().flatten().unwrap_or(close),
            high: highs.get(i).copied().flatten().unwrap_or(close),
            low: lows.get(i).copied().flatten().unwrap_or(close),
            close,
            volume: volumes.get(i).copied().flatten().unwrap_or(0.0),
            adj_close: adjclose.and_then(|col| col.get(i)).and_then(Value::as_f64),
        });
    }
    Ok(bars)
}

impl QuotePort for YahooAdapter {
    fn fetch_daily(
        &self,
        symbol: &str,
        period: &str,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<PriceBar>, TrendevalError> {
        let (period1, period2) = period_bounds(period, end_date);
        let url = format!(
            "{}/v8/finance/chart/{}?period1={}&period2={}&interval=1d&includeAdjustedClose=true",
            self.base_url, symbol, period1, period2
        );
        debug!(symbol, period, %url, "fetching chart");

        let response = self
            .client
            .get(&url)
            .header("User-Agent", "Mozilla/5.0")
            .send()
            .map_err(|e| Self::fetch_error(symbol, e))?;
        if !response.status().is_success() {
            return Err(Self::fetch_error(
                symbol,
                format!("HTTP {}", response.status()),
            ));
        }
        let body: Value = response.json().map_err(|e| Self::fetch_error(symbol, e))?;
        parse_chart(symbol, &body)
    }
}
