//! Domain error types.

/// Top-level error type for trendeval.
#[derive(Debug, thiserror::Error)]
pub enum TrendevalError {
    #[error("invalid parameters: {reason}")]
    Validation { reason: String },

    #[error("no price data for {symbol} over {period}")]
    DataUnavailable { symbol: String, period: String },

    #[error("no overlapping history between {ticker} and {benchmark}")]
    Alignment { ticker: String, benchmark: String },

    #[error("insufficient history for {symbol}: have {bars} bars, need {minimum}")]
    InsufficientData {
        symbol: String,
        bars: usize,
        minimum: usize,
    },

    #[error("cache error: {reason}")]
    Cache { reason: String },

    #[error("fetch failed for {symbol}: {reason}")]
    Fetch { symbol: String, reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&TrendevalError> for std::process::ExitCode {
    fn from(err: &TrendevalError) -> Self {
        let code: u8 = match err {
            TrendevalError::Io(_) => 1,
            TrendevalError::ConfigParse { .. } | TrendevalError::ConfigInvalid { .. } => 2,
            TrendevalError::Cache { .. } => 3,
            TrendevalError::Validation { .. } => 4,
            TrendevalError::DataUnavailable { .. }
            | TrendevalError::Alignment { .. }
            | TrendevalError::InsufficientData { .. } => 5,
            TrendevalError::Fetch { .. } => 6,
        };
        std::process::ExitCode::from(code)
    }
}
