//! Fibonacci price levels from swing pivots.
//!
//! The calculator is strategy-agnostic: retracement, extension, expansion and
//! projection all apply the same formula, only the ratio set differs.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};

pub const RETRACEMENT_RATIOS: [f64; 5] = [0.236, 0.382, 0.5, 0.618, 0.786];
pub const EXTENSION_RATIOS: [f64; 5] = [1.272, 1.414, 1.618, 2.0, 2.618];
pub const EXPANSION_RATIOS: [f64; 3] = [0.618, 1.0, 1.618];
pub const PROJECTION_RATIOS: [f64; 4] = [0.618, 1.0, 1.272, 1.618];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum FibStrategy {
    Retracement,
    Extension,
    Expansion,
    Projection,
}

impl FibStrategy {
    pub fn default_ratios(&self) -> &'static [f64] {
        match self {
            FibStrategy::Retracement => &RETRACEMENT_RATIOS,
            FibStrategy::Extension => &EXTENSION_RATIOS,
            FibStrategy::Expansion => &EXPANSION_RATIOS,
            FibStrategy::Projection => &PROJECTION_RATIOS,
        }
    }
}

/// Which side the levels are measured from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FibDirection {
    /// Measured down from the swing high
    Buy,
    /// Measured up from the swing low
    Sell,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FibonacciLevel {
    pub ratio: f64,
    pub price: f64,
    pub strategy: FibStrategy,
}

/// Ratio -> price for a swing range, in the order the ratios were given.
///
/// `Buy`: `high - (high - low) * ratio`. `Sell`: `low + (high - low) * ratio`.
/// A degenerate range (`high <= low`, or non-finite input) yields no levels.
pub fn levels(
    high: f64,
    low: f64,
    ratios: &[f64],
    direction: FibDirection,
    strategy: FibStrategy,
) -> Vec<FibonacciLevel> {
    if !is_valid_range(high, low) {
        return Vec::new();
    }
    let range = high - low;
    ratios
        .iter()
        .map(|&ratio| {
            let price = match direction {
                FibDirection::Buy => high - range * ratio,
                FibDirection::Sell => low + range * ratio,
            };
            FibonacciLevel {
                ratio,
                price,
                strategy,
            }
        })
        .collect()
}

/// `levels` using the strategy's default ratio set.
pub fn levels_for_strategy(
    high: f64,
    low: f64,
    direction: FibDirection,
    strategy: FibStrategy,
) -> Vec<FibonacciLevel> {
    levels(high, low, strategy.default_ratios(), direction, strategy)
}

/// Three-point projection: the swing range re-applied from a third pivot.
///
/// `Buy`: `anchor + (high - low) * ratio`. `Sell`: `anchor - (high - low) * ratio`.
pub fn projected_levels(
    high: f64,
    low: f64,
    anchor: f64,
    ratios: &[f64],
    direction: FibDirection,
) -> Vec<FibonacciLevel> {
    if !is_valid_range(high, low) || !anchor.is_finite() {
        return Vec::new();
    }
    let range = high - low;
    ratios
        .iter()
        .map(|&ratio| FibonacciLevel {
            ratio,
            price: match direction {
                FibDirection::Buy => anchor + range * ratio,
                FibDirection::Sell => anchor - range * ratio,
            },
            strategy: FibStrategy::Projection,
        })
        .collect()
}

fn is_valid_range(high: f64, low: f64) -> bool {
    high.is_finite() && low.is_finite() && high > low
}
