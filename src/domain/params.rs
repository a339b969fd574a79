//! Strategy request parameters and their validation.

use crate::domain::error::TrendevalError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const MIN_LOOKBACK_YEARS: u32 = 1;
pub const MAX_LOOKBACK_YEARS: u32 = 10;
pub const MIN_SHORT_WINDOW: usize = 5;
pub const MAX_SHORT_WINDOW: usize = 120;
pub const MIN_LONG_WINDOW: usize = 20;
pub const MAX_LONG_WINDOW: usize = 252;
pub const MAX_RISK_FREE_RATE: f64 = 0.1;

/// Parameters for one strategy evaluation request.
///
/// Validation happens before any I/O: a request that fails
/// [`StrategyParams::validated`] never touches the cache or the network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyParams {
    pub ticker: String,
    pub benchmark: String,
    pub lookback_years: u32,
    pub short_window: usize,
    pub long_window: usize,
    pub risk_free_rate: f64,
    pub end_date: Option<NaiveDate>,
}

impl Default for StrategyParams {
    fn default() -> Self {
        Self {
            ticker: String::new(),
            benchmark: "SPY".to_string(),
            lookback_years: 3,
            short_window: 21,
            long_window: 63,
            risk_free_rate: 0.02,
            end_date: None,
        }
    }
}

fn normalize_symbol(raw: &str, field: &str) -> Result<String, TrendevalError> {
    let cleaned = raw.trim().to_uppercase();
    if cleaned.is_empty() {
        return Err(TrendevalError::Validation {
            reason: format!("{field} cannot be empty"),
        });
    }
    Ok(cleaned)
}

impl StrategyParams {
    /// Normalize symbols and enforce all range invariants, consuming self.
    pub fn validated(mut self) -> Result<Self, TrendevalError> {
        self.ticker = normalize_symbol(&self.ticker, "ticker")?;
        self.benchmark = normalize_symbol(&self.benchmark, "benchmark")?;

        if !(MIN_LOOKBACK_YEARS..=MAX_LOOKBACK_YEARS).contains(&self.lookback_years) {
            return Err(TrendevalError::Validation {
                reason: format!(
                    "lookback_years must be in [{MIN_LOOKBACK_YEARS}, {MAX_LOOKBACK_YEARS}], got {}",
                    self.lookback_years
                ),
            });
        }
        if !(MIN_SHORT_WINDOW..=MAX_SHORT_WINDOW).contains(&self.short_window) {
            return Err(TrendevalError::Validation {
                reason: format!(
                    "short_window must be in [{MIN_SHORT_WINDOW}, {MAX_SHORT_WINDOW}], got {}",
                    self.short_window
                ),
            });
        }
        if !(MIN_LONG_WINDOW..=MAX_LONG_WINDOW).contains(&self.long_window) {
            return Err(TrendevalError::Validation {
                reason: format!(
                    "long_window must be in [{MIN_LONG_WINDOW}, {MAX_LONG_WINDOW}], got {}",
                    self.long_window
                ),
            });
        }
        if self.short_window >= self.long_window {
            return Err(TrendevalError::Validation {
                reason: format!(
                    "long_window ({}) must be greater than short_window ({})",
                    self.long_window, self.short_window
                ),
            });
        }
        if !(0.0..=MAX_RISK_FREE_RATE).contains(&self.risk_free_rate) {
            return Err(TrendevalError::Validation {
                reason: format!(
                    "risk_free_rate must be in [0, {MAX_RISK_FREE_RATE}], got {}",
                    self.risk_free_rate
                ),
            });
        }
        Ok(self)
    }

    /// Lookback expressed as an upstream period string: `"{n}y"`, or the
    /// `"max"` sentinel once the lookback reaches the 10-year cap.
    pub fn period(&self) -> String {
        period_for(self.lookback_years)
    }
}

/// Period string for a lookback in years.
pub fn period_for(lookback_years: u32) -> String {
    if lookback_years < MAX_LOOKBACK_YEARS {
        format!("{lookback_years}y")
    } else {
        "max".to_string()
    }
}

/// Parse a `YYYY-MM-DD` cutoff date, rejecting malformed input as a
/// validation failure rather than an I/O error.
pub fn parse_end_date(raw: &str) -> Result<NaiveDate, TrendevalError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|e| TrendevalError::Validation {
        reason: format!("end_date must be a YYYY-MM-DD date: {e}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn params(ticker: &str) -> StrategyParams {
        StrategyParams {
            ticker: ticker.to_string(),
            ..StrategyParams::default()
        }
    }

    #[test]
    fn defaults_validate() {
        let p = params("nvda").validated().unwrap();
        assert_eq!(p.ticker, "NVDA");
        assert_eq!(p.benchmark, "SPY");
        assert_eq!(p.short_window, 21);
        assert_eq!(p.long_window, 63);
    }

    #[test]
    fn empty_ticker_rejected() {
        let err = params("  ").validated().unwrap_err();
        assert!(matches!(err, TrendevalError::Validation { .. }));
    }

    #[test]
    fn short_window_must_be_below_long_window() {
        let p = StrategyParams {
            short_window: 63,
            long_window: 63,
            ..params("NVDA")
        };
        let err = p.validated().unwrap_err();
        assert!(matches!(err, TrendevalError::Validation { .. }));
    }

    #[test]
    fn lookback_out_of_range_rejected() {
        for years in [0u32, 11] {
            let p = StrategyParams {
                lookback_years: years,
                ..params("NVDA")
            };
            assert!(p.validated().is_err());
        }
    }

    #[test]
    fn risk_free_rate_out_of_range_rejected() {
        for rate in [-0.01, 0.11] {
            let p = StrategyParams {
                risk_free_rate: rate,
                ..params("NVDA")
            };
            assert!(p.validated().is_err());
        }
    }

    #[test]
    fn period_caps_at_max() {
        assert_eq!(period_for(3), "3y");
        assert_eq!(period_for(9), "9y");
        assert_eq!(period_for(10), "max");
    }

    #[test]
    fn parse_end_date_accepts_iso() {
        let d = parse_end_date("2024-06-28").unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2024, 6, 28).unwrap());
    }

    #[test]
    fn parse_end_date_rejects_garbage() {
        assert!(matches!(
            parse_end_date("not-a-date"),
            Err(TrendevalError::Validation { .. })
        ));
        assert!(matches!(
            parse_end_date("2024-13-40"),
            Err(TrendevalError::Validation { .. })
        ));
    }

    proptest! {
        #[test]
        fn window_order_always_enforced(short in 5usize..=120, long in 20usize..=252) {
            let p = StrategyParams {
                short_window: short,
                long_window: long,
                ..params("NVDA")
            };
            let result = p.validated();
            if short < long {
                prop_assert!(result.is_ok());
            } else {
                let is_validation_err = matches!(result, Err(TrendevalError::Validation { .. }));
                prop_assert!(is_validation_err);
            }
        }
    }
}
