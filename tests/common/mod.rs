#![allow(dead_code)]

use chrono::NaiveDate;
use std::cell::RefCell;
use std::collections::HashMap;
use trendeval::domain::error::TrendevalError;
use trendeval::domain::series::PriceBar;
use trendeval::ports::quote_port::QuotePort;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_bar(date: NaiveDate, close: f64) -> PriceBar {
    PriceBar {
        date,
        open: close,
        high: close,
        low: close,
        close,
        volume: 1_000.0,
        adj_close: None,
    }
}

/// `n` consecutive calendar days of bars moving linearly from `start_price`
/// to `end_price`, beginning at `start_date`.
pub fn linear_bars(start_date: NaiveDate, start_price: f64, end_price: f64, n: usize) -> Vec<PriceBar> {
    (0..n)
        .map(|i| {
            let t = if n > 1 { i as f64 / (n - 1) as f64 } else { 0.0 };
            make_bar(
                start_date + chrono::Duration::days(i as i64),
                start_price + (end_price - start_price) * t,
            )
        })
        .collect()
}

pub struct MockQuotePort {
    pub bars: HashMap<String, Vec<PriceBar>>,
    pub calls: RefCell<usize>,
}

impl MockQuotePort {
    pub fn new() -> Self {
        Self {
            bars: HashMap::new(),
            calls: RefCell::new(0),
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<PriceBar>) -> Self {
        self.bars.insert(symbol.to_string(), bars);
        self
    }

    pub fn call_count(&self) -> usize {
        *self.calls.borrow()
    }
}

impl QuotePort for MockQuotePort {
    fn fetch_daily(
        &self,
        symbol: &str,
        _period: &str,
        _end_date: Option<NaiveDate>,
    ) -> Result<Vec<PriceBar>, TrendevalError> {
        *self.calls.borrow_mut() += 1;
        Ok(self.bars.get(symbol).cloned().unwrap_or_default())
    }
}
