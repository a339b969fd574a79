//! Price-series ingestion: cache-gated retrieval and normalization of
//! daily history into a canonical [`PriceSeries`].

use crate::adapters::cache_store::CacheStore;
use crate::domain::error::TrendevalError;
use crate::domain::params::period_for;
use crate::domain::series::{PricePoint, PriceSeries};
use crate::ports::quote_port::QuotePort;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

pub const PRICE_HISTORY_RESOURCE: &str = "price_history";
pub const INTERVAL_DAILY: &str = "1d";

/// The flat JSON payload cached per (symbol, period, end-date) request and
/// returned to offline callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceHistoryPayload {
    pub symbol: String,
    pub period: String,
    pub interval: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    pub series: Vec<PricePoint>,
    pub latest_close: f64,
    pub latest_date: NaiveDate,
}

/// Fetches and normalizes one symbol's history, reading from the cache in
/// offline mode and writing through to it after every live fetch.
pub struct Ingestor<'a> {
    quotes: &'a dyn QuotePort,
    cache: &'a CacheStore,
}

/// Deterministic cache key: every parameter that affects the payload, and
/// nothing else. Identical logical requests always collide.
pub fn history_cache_key(symbol: &str, period: &str, end_date: Option<NaiveDate>) -> String {
    let end = end_date.map_or_else(|| "latest".to_string(), |d| d.to_string());
    format!("{symbol}_{period}_{INTERVAL_DAILY}_{end}")
}

impl<'a> Ingestor<'a> {
    pub fn new(quotes: &'a dyn QuotePort, cache: &'a CacheStore) -> Self {
        Self { quotes, cache }
    }

    /// Produce the canonical ascending price series for a symbol.
    ///
    /// Offline: the cache is authoritative; a miss or an empty cached
    /// series is [`TrendevalError::DataUnavailable`] and no network call is
    /// made. Online: always fetch live, then overwrite the cache entry.
    pub fn fetch_series(
        &self,
        symbol: &str,
        lookback_years: u32,
        end_date: Option<NaiveDate>,
    ) -> Result<PriceSeries, TrendevalError> {
        let period = period_for(lookback_years);
        let key = history_cache_key(symbol, &period, end_date);

        if self.cache.is_offline() {
            return self.load_cached(symbol, &period, &key);
        }

        let bars = self.quotes.fetch_daily(symbol, &period, end_date)?;
        let series = PriceSeries::from_bars(symbol, &bars);
        let Some(latest) = series.last().copied() else {
            return Err(TrendevalError::DataUnavailable {
                symbol: symbol.to_string(),
                period,
            });
        };
        info!(symbol, %period, bars = series.len(), "fetched live history");
        let payload = PriceHistoryPayload {
            symbol: symbol.to_string(),
            period: period.clone(),
            interval: INTERVAL_DAILY.to_string(),
            end_date,
            series: series.points.clone(),
            latest_close: latest.price,
            latest_date: latest.date,
        };
        let value = serde_json::to_value(&payload).map_err(|e| TrendevalError::Cache {
            reason: format!("unserializable price history for {symbol}: {e}"),
        })?;
        self.cache.put(PRICE_HISTORY_RESOURCE, &key, &value)?;

        Ok(series)
    }

    fn load_cached(
        &self,
        symbol: &str,
        period: &str,
        key: &str,
    ) -> Result<PriceSeries, TrendevalError> {
        let unavailable = || TrendevalError::DataUnavailable {
            symbol: symbol.to_string(),
            period: period.to_string(),
        };
        let value = self
            .cache
            .get(PRICE_HISTORY_RESOURCE, key)?
            .ok_or_else(unavailable)?;
        let payload: PriceHistoryPayload =
            serde_json::from_value(value).map_err(|e| TrendevalError::Cache {
                reason: format!("malformed cached price history for {symbol}: {e}"),
            })?;
        if payload.series.is_empty() {
            return Err(unavailable());
        }
        info!(symbol, period, bars = payload.series.len(), "loaded cached history");
        Ok(PriceSeries::from_points(symbol, payload.series))
    }
}
