//! Risk and performance statistics over a burn-in-excluded return series.
//!
//! Every degenerate case resolves to a defined zero rather than letting
//! NaN or infinity propagate into the report: empty series, zero
//! volatility, no negative returns, and non-positive cumulative growth all
//! map to 0.

use serde::{Deserialize, Serialize};

pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrategyMetrics {
    pub cagr: f64,
    pub sharpe: f64,
    pub sortino: f64,
    pub max_drawdown: f64,
    pub hit_rate: f64,
    pub avg_gain: f64,
    pub avg_loss: f64,
    pub exposure: f64,
}

impl StrategyMetrics {
    /// Compute all metrics for one return series. `positions` is the
    /// simulated position indicator over the same window; exposure is its
    /// mean regardless of which return variant is being summarized, so the
    /// strategy, buy-and-hold, and benchmark legs report a comparable
    /// exposure over the identical frame.
    pub fn compute(returns: &[f64], positions: &[u8], risk_free_rate: f64) -> Self {
        let cagr = annualized_return(returns);
        let vol = annualized_vol(returns);
        let downside = downside_vol(returns);
        let sharpe = if vol > 0.0 {
            (cagr - risk_free_rate) / vol
        } else {
            0.0
        };
        let sortino = if downside > 0.0 {
            (cagr - risk_free_rate) / downside
        } else {
            0.0
        };
        let (avg_gain, avg_loss) = average_gain_loss(returns);
        let exposure = if positions.is_empty() {
            0.0
        } else {
            positions.iter().map(|&p| f64::from(p)).sum::<f64>() / positions.len() as f64
        };

        StrategyMetrics {
            cagr,
            sharpe,
            sortino,
            max_drawdown: max_drawdown(returns),
            hit_rate: hit_rate(returns),
            avg_gain,
            avg_loss,
            exposure,
        }
    }

    /// Reporting form: non-finite values mapped to 0, then rounded to four
    /// decimal digits. Threshold comparisons must use the unrounded values.
    pub fn rounded(&self) -> Self {
        StrategyMetrics {
            cagr: round4(self.cagr),
            sharpe: round4(self.sharpe),
            sortino: round4(self.sortino),
            max_drawdown: round4(self.max_drawdown),
            hit_rate: round4(self.hit_rate),
            avg_gain: round4(self.avg_gain),
            avg_loss: round4(self.avg_loss),
            exposure: round4(self.exposure),
        }
    }
}

/// Map non-finite to 0 and round to 4 decimal digits.
pub fn round4(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    (value * 10_000.0).round() / 10_000.0
}

/// Geometric annualized return: (prod(1 + r))^(252/n) - 1.
fn annualized_return(returns: &[f64]) -> f64 {
    if returns.is_empty() {
        return 0.0;
    }
    let cumulative: f64 = returns.iter().map(|r| 1.0 + r).product();
    if cumulative <= 0.0 {
        return 0.0;
    }
    cumulative.powf(TRADING_DAYS_PER_YEAR / returns.len() as f64) - 1.0
}

// Sample standard deviation (n - 1 denominator); fewer than two
// observations have no spread.
fn sample_stdev(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / n as f64;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    variance.sqrt()
}

fn annualized_vol(returns: &[f64]) -> f64 {
    sample_stdev(returns) * TRADING_DAYS_PER_YEAR.sqrt()
}

fn downside_vol(returns: &[f64]) -> f64 {
    let downside: Vec<f64> = returns.iter().copied().filter(|&r| r < 0.0).collect();
    if downside.is_empty() {
        return 0.0;
    }
    sample_stdev(&downside) * TRADING_DAYS_PER_YEAR.sqrt()
}

/// Largest peak-to-trough decline of the cumulative growth curve,
/// reported as a non-positive fraction.
fn max_drawdown(returns: &[f64]) -> f64 {
    let mut cumulative = 1.0_f64;
    let mut running_max = f64::MIN;
    let mut worst = 0.0_f64;
    for r in returns {
        cumulative *= 1.0 + r;
        if cumulative > running_max {
            running_max = cumulative;
        }
        if running_max > 0.0 {
            let dd = cumulative / running_max - 1.0;
            if dd < worst {
                worst = dd;
            }
        }
    }
    worst
}

/// Fraction of non-zero-return days that were gains. Zero-return days are
/// excluded from both numerator and denominator.
fn hit_rate(returns: &[f64]) -> f64 {
    let gains = returns.iter().filter(|&&r| r > 0.0).count();
    let losses = returns.iter().filter(|&&r| r < 0.0).count();
    let total = gains + losses;
    if total == 0 {
        return 0.0;
    }
    gains as f64 / total as f64
}

fn average_gain_loss(returns: &[f64]) -> (f64, f64) {
    let mean_of = |subset: Vec<f64>| {
        if subset.is_empty() {
            0.0
        } else {
            subset.iter().sum::<f64>() / subset.len() as f64
        }
    };
    let avg_gain = mean_of(returns.iter().copied().filter(|&r| r > 0.0).collect());
    let avg_loss = mean_of(returns.iter().copied().filter(|&r| r < 0.0).collect());
    (avg_gain, avg_loss)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn empty_series_is_all_zero() {
        let m = StrategyMetrics::compute(&[], &[], 0.02);
        assert_eq!(m, StrategyMetrics {
            cagr: 0.0,
            sharpe: 0.0,
            sortino: 0.0,
            max_drawdown: 0.0,
            hit_rate: 0.0,
            avg_gain: 0.0,
            avg_loss: 0.0,
            exposure: 0.0,
        });
    }

    #[test]
    fn constant_zero_returns_are_all_zero() {
        let returns = vec![0.0; 100];
        let positions = vec![0u8; 100];
        let m = StrategyMetrics::compute(&returns, &positions, 0.02);
        assert_relative_eq!(m.cagr, 0.0);
        assert_relative_eq!(m.sharpe, 0.0);
        assert_relative_eq!(m.sortino, 0.0);
        assert_relative_eq!(m.max_drawdown, 0.0);
        assert_relative_eq!(m.hit_rate, 0.0);
        assert_relative_eq!(m.avg_gain, 0.0);
        assert_relative_eq!(m.avg_loss, 0.0);
        assert_relative_eq!(m.exposure, 0.0);
    }

    #[test]
    fn cagr_annualizes_one_year_exactly() {
        // 252 days of +0.1% compounds to (1.001)^252; over exactly one
        // year CAGR equals the cumulative return.
        let returns = vec![0.001; 252];
        let m = StrategyMetrics::compute(&returns, &[1; 252], 0.0);
        let expected = 1.001f64.powi(252) - 1.0;
        assert_relative_eq!(m.cagr, expected, max_relative = 1e-12);
    }

    #[test]
    fn cagr_zero_when_cumulative_wiped_out() {
        let returns = vec![0.5, -1.0, 0.2];
        let m = StrategyMetrics::compute(&returns, &[1; 3], 0.0);
        assert_relative_eq!(m.cagr, 0.0);
    }

    #[test]
    fn sharpe_zero_when_volatility_zero() {
        // Zero spread with a nonzero risk-free rate would otherwise divide
        // a negative excess return by zero.
        let returns = vec![0.0; 50];
        let m = StrategyMetrics::compute(&returns, &[1; 50], 0.02);
        assert_relative_eq!(m.sharpe, 0.0);
        assert_relative_eq!(m.sortino, 0.0);
    }

    #[test]
    fn sortino_zero_without_negative_returns() {
        let returns = vec![0.001, 0.002, 0.0, 0.003];
        let m = StrategyMetrics::compute(&returns, &[1; 4], 0.0);
        assert_relative_eq!(m.sortino, 0.0);
    }

    #[test]
    fn sharpe_positive_for_steady_gains() {
        let returns: Vec<f64> = (0..252).map(|i| 0.001 + 0.0001 * (i % 5) as f64).collect();
        let m = StrategyMetrics::compute(&returns, &[1; 252], 0.02);
        assert!(m.sharpe > 0.0);
    }

    #[test]
    fn max_drawdown_peak_to_trough() {
        // 1.0 -> 1.10 -> 0.88 (peak 1.10, trough 0.88): dd = 0.88/1.10 - 1.
        let returns = vec![0.10, -0.20, 0.05];
        let m = StrategyMetrics::compute(&returns, &[1; 3], 0.0);
        assert_relative_eq!(m.max_drawdown, 0.88 / 1.10 - 1.0, max_relative = 1e-12);
    }

    #[test]
    fn max_drawdown_zero_for_monotonic_growth() {
        let returns = vec![0.01; 30];
        let m = StrategyMetrics::compute(&returns, &[1; 30], 0.0);
        assert_relative_eq!(m.max_drawdown, 0.0);
    }

    #[test]
    fn hit_rate_ignores_zero_return_days() {
        let returns = vec![0.01, 0.0, -0.01, 0.0, 0.02];
        let m = StrategyMetrics::compute(&returns, &[1; 5], 0.0);
        assert_relative_eq!(m.hit_rate, 2.0 / 3.0, max_relative = 1e-12);
    }

    #[test]
    fn avg_gain_and_loss_over_subsets() {
        let returns = vec![0.02, -0.01, 0.04, -0.03, 0.0];
        let m = StrategyMetrics::compute(&returns, &[1; 5], 0.0);
        assert_relative_eq!(m.avg_gain, 0.03, max_relative = 1e-12);
        assert_relative_eq!(m.avg_loss, -0.02, max_relative = 1e-12);
    }

    #[test]
    fn exposure_is_mean_position() {
        let returns = vec![0.01; 4];
        let m = StrategyMetrics::compute(&returns, &[1, 0, 1, 1], 0.0);
        assert_relative_eq!(m.exposure, 0.75);
    }

    #[test]
    fn rounded_maps_non_finite_to_zero() {
        assert_relative_eq!(round4(f64::NAN), 0.0);
        assert_relative_eq!(round4(f64::INFINITY), 0.0);
        assert_relative_eq!(round4(f64::NEG_INFINITY), 0.0);
        assert_relative_eq!(round4(0.123456), 0.1235);
        assert_relative_eq!(round4(-0.00004), 0.0);
    }

    #[test]
    fn rounded_metrics_have_four_decimals() {
        let m = StrategyMetrics {
            cagr: 0.123456789,
            sharpe: f64::NAN,
            sortino: 1.5,
            max_drawdown: -0.098765,
            hit_rate: 0.666666,
            avg_gain: 0.0123456,
            avg_loss: -0.0123456,
            exposure: 0.5,
        }
        .rounded();
        assert_relative_eq!(m.cagr, 0.1235);
        assert_relative_eq!(m.sharpe, 0.0);
        assert_relative_eq!(m.max_drawdown, -0.0988);
        assert_relative_eq!(m.hit_rate, 0.6667);
    }
}
