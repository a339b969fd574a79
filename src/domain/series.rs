//! Daily price bars and the canonical per-symbol price series.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single daily OHLCV bar as returned by a quote source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adj_close: Option<f64>,
}

impl PriceBar {
    /// The price used for all downstream computation: adjusted close when
    /// the source provides it, otherwise the raw close.
    pub fn canonical_price(&self) -> f64 {
        self.adj_close.unwrap_or(self.close)
    }
}

/// One (date, canonical price) observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: f64,
}

/// An ascending, de-duplicated daily price series for one symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    pub symbol: String,
    pub points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Build a canonical series from raw bars: sort ascending by date and
    /// collapse duplicate dates (last observation wins).
    pub fn from_bars(symbol: &str, bars: &[PriceBar]) -> Self {
        let points = bars
            .iter()
            .map(|bar| PricePoint {
                date: bar.date,
                price: bar.canonical_price(),
            })
            .collect();
        Self::from_points(symbol, points)
    }

    /// Build a canonical series from (date, price) pairs, sorting and
    /// de-duplicating as in [`PriceSeries::from_bars`].
    pub fn from_points(symbol: &str, mut points: Vec<PricePoint>) -> Self {
        points.sort_by_key(|p| p.date);
        points.dedup_by(|next, prev| {
            if next.date == prev.date {
                prev.price = next.price;
                true
            } else {
                false
            }
        });
        Self {
            symbol: symbol.to_string(),
            points,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(date: NaiveDate, close: f64, adj_close: Option<f64>) -> PriceBar {
        PriceBar {
            date,
            open: close,
            high: close,
            low: close,
            close,
            volume: 1000.0,
            adj_close,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn canonical_price_prefers_adjusted_close() {
        let b = bar(date(2024, 1, 2), 100.0, Some(98.5));
        assert!((b.canonical_price() - 98.5).abs() < f64::EPSILON);
    }

    #[test]
    fn canonical_price_falls_back_to_close() {
        let b = bar(date(2024, 1, 2), 100.0, None);
        assert!((b.canonical_price() - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn from_bars_sorts_ascending() {
        let bars = vec![
            bar(date(2024, 1, 3), 102.0, None),
            bar(date(2024, 1, 1), 100.0, None),
            bar(date(2024, 1, 2), 101.0, None),
        ];
        let series = PriceSeries::from_bars("TEST", &bars);
        let dates: Vec<NaiveDate> = series.points.iter().map(|p| p.date).collect();
        assert_eq!(
            dates,
            vec![date(2024, 1, 1), date(2024, 1, 2), date(2024, 1, 3)]
        );
    }

    #[test]
    fn from_bars_collapses_duplicate_dates_last_wins() {
        let bars = vec![
            bar(date(2024, 1, 1), 100.0, None),
            bar(date(2024, 1, 2), 101.0, None),
            bar(date(2024, 1, 2), 105.0, None),
        ];
        let series = PriceSeries::from_bars("TEST", &bars);
        assert_eq!(series.len(), 2);
        assert!((series.points[1].price - 105.0).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_series() {
        let series = PriceSeries::from_bars("TEST", &[]);
        assert!(series.is_empty());
        assert!(series.last().is_none());
    }
}
