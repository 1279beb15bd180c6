//! Analysis configuration: indicator periods, voting weights and signal thresholds.
//!
//! Every numeric default below is an empirical tunable awaiting validation per
//! instrument. The core never reads these constants directly; callers build an
//! [`AnalysisConfig`] (usually via `Default`) and pass it in.

use serde::{Deserialize, Serialize};

use crate::domain::{DEFAULT_TIMEFRAMES, Timeframe};
use crate::error::{AnalysisError, Result, ensure_non_negative, ensure_period};

// --- Pivots & indicators ---
pub const PIVOT_LOOKBACK: usize = 5;
pub const MA_FAST_PERIOD: usize = 20;
pub const MA_SLOW_PERIOD: usize = 50;
pub const RSI_PERIOD: usize = 14;
pub const RSI_BULLISH_THRESHOLD: f64 = 50.0;
pub const ADX_PERIOD: usize = 14;
pub const ADX_TRENDING_THRESHOLD: f64 = 25.0;

// --- Trend voting ---
pub const PIVOT_WEIGHT: f64 = 0.4;
pub const MA_WEIGHT: f64 = 0.25;
pub const RSI_WEIGHT: f64 = 0.2;
pub const ADX_WEIGHT: f64 = 0.15;
pub const CONSENSUS_THRESHOLD: f64 = 0.6;
pub const PIVOT_STRONG_STRENGTH: f64 = 0.9;
pub const PIVOT_WEAK_STRENGTH: f64 = 0.6;
pub const PIVOT_PROXIMITY_PCT: f64 = 0.005;
pub const PIVOT_PROXIMITY_BONUS: f64 = 0.1;
pub const ADX_BONUS_DIVISOR: f64 = 50.0;
pub const ADX_BONUS_CAP: f64 = 0.15;
/// Extra bars required beyond the slow MA period before a trend is scored.
pub const MA_HISTORY_MARGIN: usize = 10;

// --- Trade action ---
pub const STAND_ASIDE_CONFIDENCE: f64 = 0.3;
pub const OPPOSITION_BONUS: f64 = 0.15;

// --- Fibonacci rejection ---
pub const REJECTION_RATIOS: [f64; 4] = [0.382, 0.5, 0.618, 0.786];
pub const REJECTION_LOOKBACK_BARS: usize = 5;
pub const REJECTION_TOUCH_TOLERANCE_PCT: f64 = 0.005;
pub const GOLDEN_RATIO: f64 = 0.618;
pub const GOLDEN_RATIO_PENALTY: f64 = 0.5;

// --- Confluence ---
pub const CONFLUENCE_TOLERANCE_PCT: f64 = 0.005;
pub const CONFLUENCE_MEMBER_BONUS: f64 = 5.0;
pub const CONFLUENCE_MAX_CONFIDENCE: u8 = 95;
pub const CONFLUENCE_MIN_GROUP_SIZE: usize = 2;

// --- Aggregation ---
pub const TREND_SIGNAL_MIN_CONFIDENCE: u8 = 60;
pub const TREND_SIGNAL_ACTIVE_CONFIDENCE: u8 = 70;

/// Voting weight per indicator. Renormalised over whichever indicators vote.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendWeights {
    pub pivot: f64,
    pub ma: f64,
    pub rsi: f64,
    pub adx: f64,
}

impl Default for TrendWeights {
    fn default() -> Self {
        Self {
            pivot: PIVOT_WEIGHT,
            ma: MA_WEIGHT,
            rsi: RSI_WEIGHT,
            adx: ADX_WEIGHT,
        }
    }
}

/// Settings for the per-timeframe trend combiner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendIndicatorConfig {
    pub lookback: usize,

    pub use_pivots: bool,
    pub use_ma: bool,
    pub ma_fast_period: usize,
    pub ma_slow_period: usize,
    pub use_rsi: bool,
    pub rsi_period: usize,
    pub rsi_threshold: f64,
    pub use_adx: bool,
    pub adx_period: usize,
    pub adx_threshold: f64,

    pub weights: TrendWeights,
    pub consensus_threshold: f64,
    pub pivot_strong_strength: f64,
    pub pivot_weak_strength: f64,
    pub proximity_pct: f64,
    pub proximity_bonus: f64,
    pub adx_bonus_divisor: f64,
    pub adx_bonus_cap: f64,
}

impl Default for TrendIndicatorConfig {
    fn default() -> Self {
        Self {
            lookback: PIVOT_LOOKBACK,
            use_pivots: true,
            use_ma: true,
            ma_fast_period: MA_FAST_PERIOD,
            ma_slow_period: MA_SLOW_PERIOD,
            use_rsi: true,
            rsi_period: RSI_PERIOD,
            rsi_threshold: RSI_BULLISH_THRESHOLD,
            use_adx: true,
            adx_period: ADX_PERIOD,
            adx_threshold: ADX_TRENDING_THRESHOLD,
            weights: TrendWeights::default(),
            consensus_threshold: CONSENSUS_THRESHOLD,
            pivot_strong_strength: PIVOT_STRONG_STRENGTH,
            pivot_weak_strength: PIVOT_WEAK_STRENGTH,
            proximity_pct: PIVOT_PROXIMITY_PCT,
            proximity_bonus: PIVOT_PROXIMITY_BONUS,
            adx_bonus_divisor: ADX_BONUS_DIVISOR,
            adx_bonus_cap: ADX_BONUS_CAP,
        }
    }
}

impl TrendIndicatorConfig {
    /// Pivot detection only; every indicator vote disabled.
    pub fn pivots_only(lookback: usize) -> Self {
        Self {
            lookback,
            use_ma: false,
            use_rsi: false,
            use_adx: false,
            ..Self::default()
        }
    }

    /// Bars needed before the combiner will score a timeframe.
    pub fn min_bars(&self) -> usize {
        (2 * self.lookback + 1).max(self.ma_slow_period + MA_HISTORY_MARGIN)
    }

    pub fn any_enabled(&self) -> bool {
        self.use_pivots || self.use_ma || self.use_rsi || self.use_adx
    }

    pub fn validate(&self) -> Result<()> {
        ensure_period("pivot lookback", self.lookback)?;
        ensure_period("slow MA", self.ma_slow_period)?;
        if self.use_ma {
            ensure_period("fast MA", self.ma_fast_period)?;
            if self.ma_fast_period >= self.ma_slow_period {
                return Err(AnalysisError::malformed(format!(
                    "fast MA period ({}) must be shorter than slow MA period ({})",
                    self.ma_fast_period, self.ma_slow_period
                )));
            }
        }
        if self.use_rsi {
            ensure_period("RSI", self.rsi_period)?;
            ensure_non_negative("RSI threshold", self.rsi_threshold)?;
        }
        if self.use_adx {
            ensure_period("ADX", self.adx_period)?;
            ensure_non_negative("ADX threshold", self.adx_threshold)?;
        }
        for (name, w) in [
            ("pivot weight", self.weights.pivot),
            ("MA weight", self.weights.ma),
            ("RSI weight", self.weights.rsi),
            ("ADX weight", self.weights.adx),
            ("consensus threshold", self.consensus_threshold),
            ("proximity pct", self.proximity_pct),
            ("proximity bonus", self.proximity_bonus),
            ("ADX bonus cap", self.adx_bonus_cap),
        ] {
            ensure_non_negative(name, w)?;
        }
        if !(self.adx_bonus_divisor.is_finite() && self.adx_bonus_divisor > 0.0) {
            return Err(AnalysisError::malformed("ADX bonus divisor must be positive"));
        }
        Ok(())
    }
}

/// Settings for the STAND_ASIDE / GO_LONG / GO_SHORT decision
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TradeActionConfig {
    pub stand_aside_confidence: f64,
    pub opposition_bonus: f64,
}

impl Default for TradeActionConfig {
    fn default() -> Self {
        Self {
            stand_aside_confidence: STAND_ASIDE_CONFIDENCE,
            opposition_bonus: OPPOSITION_BONUS,
        }
    }
}

/// Settings for Fibonacci rejection scanning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RejectionConfig {
    pub ratios: Vec<f64>,
    /// How many of the most recent bars are scanned
    pub lookback_bars: usize,
    pub touch_tolerance_pct: f64,
    pub golden_ratio: f64,
    pub golden_ratio_penalty: f64,
}

impl Default for RejectionConfig {
    fn default() -> Self {
        Self {
            ratios: REJECTION_RATIOS.to_vec(),
            lookback_bars: REJECTION_LOOKBACK_BARS,
            touch_tolerance_pct: REJECTION_TOUCH_TOLERANCE_PCT,
            golden_ratio: GOLDEN_RATIO,
            golden_ratio_penalty: GOLDEN_RATIO_PENALTY,
        }
    }
}

impl RejectionConfig {
    pub fn validate(&self) -> Result<()> {
        ensure_period("rejection lookback", self.lookback_bars)?;
        ensure_non_negative("touch tolerance", self.touch_tolerance_pct)?;
        ensure_non_negative("golden ratio penalty", self.golden_ratio_penalty)?;
        for &r in &self.ratios {
            ensure_non_negative("fibonacci ratio", r)?;
        }
        Ok(())
    }
}

/// Settings for price clustering across signals
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfluenceConfig {
    pub tolerance_pct: f64,
    pub member_bonus: f64,
    pub max_confidence: u8,
    pub min_group_size: usize,
}

impl Default for ConfluenceConfig {
    fn default() -> Self {
        Self {
            tolerance_pct: CONFLUENCE_TOLERANCE_PCT,
            member_bonus: CONFLUENCE_MEMBER_BONUS,
            max_confidence: CONFLUENCE_MAX_CONFIDENCE,
            min_group_size: CONFLUENCE_MIN_GROUP_SIZE,
        }
    }
}

impl ConfluenceConfig {
    pub fn validate(&self) -> Result<()> {
        ensure_non_negative("confluence tolerance", self.tolerance_pct)?;
        ensure_non_negative("confluence member bonus", self.member_bonus)?;
        if self.min_group_size < 2 {
            return Err(AnalysisError::malformed(
                "confluence groups need at least 2 members",
            ));
        }
        Ok(())
    }
}

/// Settings for the multi-timeframe orchestrator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregatorConfig {
    pub default_timeframes: Vec<Timeframe>,
    pub trend_signal_min_confidence: u8,
    pub trend_signal_active_confidence: u8,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            default_timeframes: DEFAULT_TIMEFRAMES.to_vec(),
            trend_signal_min_confidence: TREND_SIGNAL_MIN_CONFIDENCE,
            trend_signal_active_confidence: TREND_SIGNAL_ACTIVE_CONFIDENCE,
        }
    }
}

/// The Master Analysis Configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub trend: TrendIndicatorConfig,
    pub trade_action: TradeActionConfig,
    pub rejection: RejectionConfig,
    pub confluence: ConfluenceConfig,
    pub aggregator: AggregatorConfig,
}

impl AnalysisConfig {
    pub fn validate(&self) -> Result<()> {
        self.trend.validate()?;
        self.rejection.validate()?;
        self.confluence.validate()?;
        ensure_non_negative(
            "stand-aside confidence",
            self.trade_action.stand_aside_confidence,
        )?;
        ensure_non_negative("opposition bonus", self.trade_action.opposition_bonus)?;
        Ok(())
    }
}
