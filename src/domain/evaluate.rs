//! The evaluation entrypoint: ingest, align, simulate, summarize, decide.

use crate::adapters::cache_store::CacheStore;
use crate::domain::error::TrendevalError;
use crate::domain::ingest::Ingestor;
use crate::domain::metrics::{round4, StrategyMetrics, TRADING_DAYS_PER_YEAR};
use crate::domain::params::StrategyParams;
use crate::domain::recommend::{decide, fresh_crossover, Recommendation, SignalState};
use crate::domain::simulator::{align, benchmark_returns, simulate, FrameRow, StrategyFrame};
use crate::ports::quote_port::QuotePort;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

pub const EVALUATION_RESOURCE: &str = "strategy_evaluation";

/// Window parameters echoed back in the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterEcho {
    pub short_window: usize,
    pub long_window: usize,
    pub risk_free_rate: f64,
}

/// Point-in-time risk state of the latest simulated row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskSnapshot {
    pub current_signal: SignalState,
    pub last_price: f64,
    pub ma_short: f64,
    pub ma_long: f64,
    pub distance_from_long_ma_pct: f64,
    pub annualized_volatility: f64,
    pub max_drawdown: f64,
}

/// The full evaluation report; flat, serde-serializable, and stable enough
/// to round-trip through the cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub ticker: String,
    pub benchmark: String,
    pub lookback_years: u32,
    pub parameters: ParameterEcho,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    pub strategy_metrics: StrategyMetrics,
    pub buy_and_hold_metrics: StrategyMetrics,
    pub benchmark_metrics: StrategyMetrics,
    pub risk_snapshot: RiskSnapshot,
    pub latest_signal_date: NaiveDate,
    pub recommendation: Recommendation,
}

/// Cache key covering every parameter that affects the report.
pub fn evaluation_cache_key(params: &StrategyParams) -> String {
    let end = params
        .end_date
        .map_or_else(|| "latest".to_string(), |d| d.to_string());
    format!(
        "{}_{}_{}y_s{}_l{}_rf{}_{}",
        params.ticker,
        params.benchmark,
        params.lookback_years,
        params.short_window,
        params.long_window,
        params.risk_free_rate,
        end
    )
}

/// Evaluate the crossover strategy described by `params`.
///
/// Validation runs before any I/O. In offline mode a previously cached
/// report for the identical parameter set is returned as-is; otherwise
/// both series are ingested, aligned, simulated, and summarized, and the
/// fresh report is written through to the cache.
pub fn evaluate(
    params: StrategyParams,
    quotes: &dyn QuotePort,
    cache: &CacheStore,
) -> Result<EvaluationResult, TrendevalError> {
    let params = params.validated()?;
    let key = evaluation_cache_key(&params);

    if cache.is_offline() {
        if let Some(value) = cache.get(EVALUATION_RESOURCE, &key)? {
            let result = serde_json::from_value(value).map_err(|e| TrendevalError::Cache {
                reason: format!("malformed cached evaluation for {}: {e}", params.ticker),
            })?;
            info!(ticker = %params.ticker, "served evaluation from cache");
            return Ok(result);
        }
    }

    let ingestor = Ingestor::new(quotes, cache);
    let ticker_series = ingestor.fetch_series(&params.ticker, params.lookback_years, params.end_date)?;
    let bench_series = ingestor.fetch_series(&params.benchmark, params.lookback_years, params.end_date)?;

    let (ticker_aligned, bench_aligned) = align(&ticker_series, &bench_series)?;

    let frame = simulate(&ticker_aligned, params.short_window, params.long_window);
    let Some(latest) = frame.latest().copied() else {
        return Err(TrendevalError::InsufficientData {
            symbol: params.ticker.clone(),
            bars: ticker_aligned.len(),
            minimum: params.long_window + 1,
        });
    };

    let positions = frame.positions();
    let strategy = StrategyMetrics::compute(&frame.strategy_returns(), &positions, params.risk_free_rate);
    let buy_and_hold =
        StrategyMetrics::compute(&frame.buy_and_hold_returns(), &positions, params.risk_free_rate);
    let benchmark = StrategyMetrics::compute(
        &benchmark_returns(&frame, &bench_aligned),
        &positions,
        params.risk_free_rate,
    );

    let state = if latest.position > 0 {
        SignalState::Long
    } else {
        SignalState::Flat
    };
    let distance_pct = latest.price / latest.ma_long - 1.0;
    let crossed = fresh_crossover(frame.previous(), &latest);
    let recommendation = decide(state, distance_pct, strategy.sharpe, crossed);

    let snapshot = risk_snapshot(&frame, &latest, state, distance_pct, strategy.max_drawdown);
    info!(
        ticker = %params.ticker,
        benchmark = %params.benchmark,
        rows = frame.len(),
        recommendation = recommendation.as_str(),
        "evaluation complete"
    );

    let result = EvaluationResult {
        ticker: params.ticker.clone(),
        benchmark: params.benchmark.clone(),
        lookback_years: params.lookback_years,
        parameters: ParameterEcho {
            short_window: params.short_window,
            long_window: params.long_window,
            risk_free_rate: params.risk_free_rate,
        },
        end_date: params.end_date,
        strategy_metrics: strategy.rounded(),
        buy_and_hold_metrics: buy_and_hold.rounded(),
        benchmark_metrics: benchmark.rounded(),
        risk_snapshot: snapshot,
        latest_signal_date: latest.date,
        recommendation,
    };

    if !cache.is_offline() {
        let value = serde_json::to_value(&result).map_err(|e| TrendevalError::Cache {
            reason: format!("unserializable evaluation for {}: {e}", params.ticker),
        })?;
        cache.put(EVALUATION_RESOURCE, &key, &value)?;
    }

    Ok(result)
}

fn risk_snapshot(
    frame: &StrategyFrame,
    latest: &FrameRow,
    state: SignalState,
    distance_pct: f64,
    max_drawdown: f64,
) -> RiskSnapshot {
    let raw_returns = frame.buy_and_hold_returns();
    let n = raw_returns.len();
    let volatility = if n < 2 {
        0.0
    } else {
        let mean = raw_returns.iter().sum::<f64>() / n as f64;
        let variance =
            raw_returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
        variance.sqrt() * TRADING_DAYS_PER_YEAR.sqrt()
    };
    RiskSnapshot {
        current_signal: state,
        last_price: round4(latest.price),
        ma_short: round4(latest.ma_short),
        ma_long: round4(latest.ma_long),
        distance_from_long_ma_pct: round4(distance_pct),
        annualized_volatility: round4(volatility),
        max_drawdown: round4(max_drawdown),
    }
}
