//! Rule-based recommendation derived from the latest simulated state.

use crate::domain::simulator::FrameRow;
use serde::{Deserialize, Serialize};

/// Distance-from-long-MA threshold below which a long position is still
/// considered close enough to its trend support to add to.
pub const SCALE_UP_DISTANCE: f64 = 0.05;

/// Sharpe threshold a long position must clear before scaling up.
pub const SCALE_UP_SHARPE: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalState {
    Long,
    Flat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    ScaleUp,
    Hold,
    PrepareEntry,
    Monitor,
}

impl Recommendation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Recommendation::ScaleUp => "scale_up",
            Recommendation::Hold => "hold",
            Recommendation::PrepareEntry => "prepare_entry",
            Recommendation::Monitor => "monitor",
        }
    }
}

/// Whether the short MA crossed above the long MA on the latest day: it
/// was at or below on the previous day and is strictly above now. With no
/// previous row there is nothing to cross from.
pub fn fresh_crossover(previous: Option<&FrameRow>, latest: &FrameRow) -> bool {
    match previous {
        Some(prev) => prev.ma_short <= prev.ma_long && latest.ma_short > latest.ma_long,
        None => false,
    }
}

/// The fixed decision table. Pure and deterministic: identical inputs
/// always produce the same label. Thresholds compare unrounded values.
pub fn decide(
    state: SignalState,
    distance_from_long_ma_pct: f64,
    sharpe: f64,
    crossed_over: bool,
) -> Recommendation {
    match state {
        SignalState::Long => {
            if distance_from_long_ma_pct < SCALE_UP_DISTANCE && sharpe > SCALE_UP_SHARPE {
                Recommendation::ScaleUp
            } else {
                Recommendation::Hold
            }
        }
        SignalState::Flat => {
            if crossed_over {
                Recommendation::PrepareEntry
            } else {
                Recommendation::Monitor
            }
        }
    }
}
