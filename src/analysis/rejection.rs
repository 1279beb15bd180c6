//! Fibonacci rejection (bounce) detection on the most recent bars.

use crate::config::RejectionConfig;
use crate::domain::{Bar, Timeframe};
use crate::error::Result;
use crate::models::{AggregatedSignal, SignalDirection, SignalType, TimeframeTrend, TrendDirection};
use crate::utils::maths_utils::to_confidence;
use crate::utils::time_utils::epoch_ms_to_datetime;

use super::fibonacci::{FibDirection, FibStrategy, FibonacciLevel, levels};

/// A level together with the bar that rejected it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rejection {
    pub level: FibonacciLevel,
    pub bar: Bar,
}

/// Does `bar` reject `level` in the given direction?
///
/// Long: the low dipped to within `tolerance` above the level (or through it),
/// the close held above it and the candle is bullish. Short mirrors that.
pub fn is_rejection(bar: &Bar, level: f64, direction: SignalDirection, tolerance: f64) -> bool {
    match direction {
        SignalDirection::Long => {
            bar.low <= level * (1.0 + tolerance) && bar.close > level && bar.is_bullish()
        }
        SignalDirection::Short => {
            bar.high >= level * (1.0 - tolerance) && bar.close < level && bar.is_bearish()
        }
    }
}

/// Scans the last `lookback` bars, newest first; at most one hit per level.
pub fn scan_levels(
    bars: &[Bar],
    fib_levels: &[FibonacciLevel],
    direction: SignalDirection,
    tolerance: f64,
    lookback: usize,
) -> Vec<Rejection> {
    let recent = &bars[bars.len().saturating_sub(lookback)..];
    fib_levels
        .iter()
        .filter_map(|level| {
            // The newest touching bar wins
            recent
                .iter()
                .rev()
                .find(|bar| is_rejection(bar, level.price, direction, tolerance))
                .map(|bar| Rejection {
                    level: *level,
                    bar: *bar,
                })
        })
        .collect()
}

/// `fib_rejection` signals for one timeframe, measured on the trend's swing.
///
/// Neutral trends and trends without a usable swing range produce nothing.
pub fn detect_rejections(
    timeframe: Timeframe,
    bars: &[Bar],
    trend: &TimeframeTrend,
    config: &RejectionConfig,
) -> Result<Vec<AggregatedSignal>> {
    config.validate()?;
    let (direction, fib_direction) = match trend.direction {
        TrendDirection::Up => (SignalDirection::Long, FibDirection::Buy),
        TrendDirection::Down => (SignalDirection::Short, FibDirection::Sell),
        TrendDirection::Neutral => return Ok(Vec::new()),
    };
    let Some((high, low)) = trend.swing_range() else {
        return Ok(Vec::new());
    };
    let Some(last_close) = bars.last().map(|b| b.close) else {
        return Ok(Vec::new());
    };

    let fib_levels = levels(high, low, &config.ratios, fib_direction, FibStrategy::Retracement);
    // Unrounded, so the penalty is applied before the only rounding step
    let trend_score = trend.strength * 100.0;

    let signals = scan_levels(
        bars,
        &fib_levels,
        direction,
        config.touch_tolerance_pct,
        config.lookback_bars,
    )
    .into_iter()
    .map(|hit| {
        let ratio = hit.level.ratio;
        let penalty = 1.0 - (ratio - config.golden_ratio).abs() * config.golden_ratio_penalty;
        let is_active = match direction {
            SignalDirection::Long => last_close > hit.level.price,
            SignalDirection::Short => last_close < hit.level.price,
        };
        AggregatedSignal {
            id: format!("{}-{}-{}", SignalType::FibRejection, timeframe, ratio),
            timeframe,
            direction,
            signal_type: SignalType::FibRejection,
            confidence: to_confidence(trend_score * penalty),
            price: hit.level.price,
            description: format!(
                "{} {} rejection at {:.1}% retracement ({:.4})",
                timeframe,
                direction,
                ratio * 100.0,
                hit.level.price
            ),
            is_active,
            timestamp: epoch_ms_to_datetime(hit.bar.time),
            fib_level: Some(ratio),
            fib_strategy: Some(hit.level.strategy),
            confluence_count: None,
        }
    })
    .collect();

    Ok(signals)
}
