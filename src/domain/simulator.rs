//! Moving-average crossover simulation over a daily price series.
//!
//! Warmup handling mirrors the sliding-window indicator convention: each
//! computed column is `Option<f64>` until its trailing window is full, and
//! rows with any undefined column are excluded from the frame (burn-in)
//! before metrics are computed.

use crate::domain::error::TrendevalError;
use crate::domain::series::{PricePoint, PriceSeries};
use std::collections::HashMap;

/// One fully-defined post-burn-in simulation row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameRow {
    pub date: chrono::NaiveDate,
    pub price: f64,
    pub ret: f64,
    pub ma_short: f64,
    pub ma_long: f64,
    pub signal: u8,
    pub position: u8,
    pub strategy_return: f64,
}

/// The burn-in-excluded day-by-day simulation frame.
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyFrame {
    pub rows: Vec<FrameRow>,
}

impl StrategyFrame {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn latest(&self) -> Option<&FrameRow> {
        self.rows.last()
    }

    /// The row immediately before the latest one, when present.
    pub fn previous(&self) -> Option<&FrameRow> {
        self.rows.len().checked_sub(2).map(|i| &self.rows[i])
    }

    pub fn strategy_returns(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.strategy_return).collect()
    }

    pub fn positions(&self) -> Vec<u8> {
        self.rows.iter().map(|r| r.position).collect()
    }

    /// Raw per-day returns of the underlying price over the frame, the
    /// buy-and-hold variant of the return series.
    pub fn buy_and_hold_returns(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.ret).collect()
    }
}

// Per-date state before burn-in exclusion. Columns stay None until their
// trailing window (or the prior day's signal) exists.
struct RawRow {
    date: chrono::NaiveDate,
    price: f64,
    ret: Option<f64>,
    ma_short: Option<f64>,
    ma_long: Option<f64>,
    signal: Option<u8>,
    position: Option<u8>,
}

/// Simulate the crossover strategy over an ascending price series.
///
/// For each day: pct-change return, trailing arithmetic-mean MAs, signal
/// (short MA strictly above long MA), and position equal to the previous
/// day's signal. The one-day lag means a crossover observed at the close of
/// day t-1 is only acted on from day t.
pub fn simulate(prices: &PriceSeries, short_window: usize, long_window: usize) -> StrategyFrame {
    let points = &prices.points;
    let mut raw: Vec<RawRow> = Vec::with_capacity(points.len());
    let mut short_sum = 0.0_f64;
    let mut long_sum = 0.0_f64;

    for (i, point) in points.iter().enumerate() {
        short_sum += point.price;
        if i >= short_window {
            short_sum -= points[i - short_window].price;
        }
        long_sum += point.price;
        if i >= long_window {
            long_sum -= points[i - long_window].price;
        }

        let ret = if i > 0 {
            let prev = points[i - 1].price;
            if prev != 0.0 {
                Some(point.price / prev - 1.0)
            } else {
                None
            }
        } else {
            None
        };
        let ma_short = (i + 1 >= short_window).then(|| short_sum / short_window as f64);
        let ma_long = (i + 1 >= long_window).then(|| long_sum / long_window as f64);
        let signal = match (ma_short, ma_long) {
            (Some(s), Some(l)) => Some(u8::from(s > l)),
            _ => None,
        };
        let position = if i > 0 { raw[i - 1].signal } else { None };

        raw.push(RawRow {
            date: point.date,
            price: point.price,
            ret,
            ma_short,
            ma_long,
            signal,
            position,
        });
    }

    let rows = raw
        .into_iter()
        .filter_map(|r| {
            let ret = r.ret?;
            let ma_short = r.ma_short?;
            let ma_long = r.ma_long?;
            let signal = r.signal?;
            let position = r.position?;
            Some(FrameRow {
                date: r.date,
                price: r.price,
                ret,
                ma_short,
                ma_long,
                signal,
                position,
                strategy_return: f64::from(position) * ret,
            })
        })
        .collect();

    StrategyFrame { rows }
}

/// Inner-join two series on date, returning both restricted to the shared
/// ascending date index. An empty intersection is an alignment failure,
/// distinct from a fetch failure: both series were retrieved successfully.
pub fn align(
    ticker: &PriceSeries,
    benchmark: &PriceSeries,
) -> Result<(PriceSeries, PriceSeries), TrendevalError> {
    let benchmark_by_date: HashMap<chrono::NaiveDate, f64> = benchmark
        .points
        .iter()
        .map(|p| (p.date, p.price))
        .collect();

    let mut ticker_points = Vec::new();
    let mut benchmark_points = Vec::new();
    for point in &ticker.points {
        if let Some(&price) = benchmark_by_date.get(&point.date) {
            ticker_points.push(*point);
            benchmark_points.push(PricePoint {
                date: point.date,
                price,
            });
        }
    }

    if ticker_points.is_empty() {
        return Err(TrendevalError::Alignment {
            ticker: ticker.symbol.clone(),
            benchmark: benchmark.symbol.clone(),
        });
    }

    Ok((
        PriceSeries {
            symbol: ticker.symbol.clone(),
            points: ticker_points,
        },
        PriceSeries {
            symbol: benchmark.symbol.clone(),
            points: benchmark_points,
        },
    ))
}

/// The benchmark's own pct-change returns reindexed onto the frame's dates.
/// Dates the benchmark cannot price (no prior observation) contribute 0.
pub fn benchmark_returns(frame: &StrategyFrame, benchmark: &PriceSeries) -> Vec<f64> {
    let mut by_date: HashMap<chrono::NaiveDate, f64> = HashMap::new();
    for pair in benchmark.points.windows(2) {
        if pair[0].price != 0.0 {
            by_date.insert(pair[1].date, pair[1].price / pair[0].price - 1.0);
        }
    }
    frame
        .rows
        .iter()
        .map(|row| by_date.get(&row.date).copied().unwrap_or(0.0))
        .collect()
}
