//! Daily price history port trait.

use crate::domain::error::TrendevalError;
use crate::domain::series::PriceBar;
use chrono::NaiveDate;

/// A source of daily OHLCV history for a symbol.
///
/// `period` is a lookback window expressed as `"{n}y"` (n in years) or the
/// sentinel `"max"` for all available history. `end_date`, when set, is the
/// inclusive last calendar day of the requested range; adapters are
/// responsible for compensating if their upstream treats the end bound as
/// exclusive.
pub trait QuotePort {
    fn fetch_daily(
        &self,
        symbol: &str,
        period: &str,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<PriceBar>, TrendevalError>;
}
