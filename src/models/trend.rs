use serde::{Deserialize, Serialize};

use crate::domain::Timeframe;
use crate::error::{AnalysisError, Result};
use crate::utils::maths_utils::to_confidence;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TrendDirection {
    Up,
    Down,
    Neutral,
}

/// Latest indicator values for one timeframe; `None` means not enough history.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorReading {
    pub sma_fast: Option<f64>,
    pub sma_slow: Option<f64>,
    pub rsi: Option<f64>,
    pub adx: Option<f64>,
    #[serde(rename = "plusDI")]
    pub plus_di: Option<f64>,
    #[serde(rename = "minusDI")]
    pub minus_di: Option<f64>,
}

/// Trend classification of a single timeframe. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeframeTrend {
    pub timeframe: Timeframe,
    pub direction: TrendDirection,
    /// 0.0 ..= 1.0
    pub strength: f64,
    pub pivot_high: Option<f64>,
    pub pivot_low: Option<f64>,
    pub indicators: IndicatorReading,
}

impl TimeframeTrend {
    pub fn neutral(timeframe: Timeframe) -> Self {
        Self {
            timeframe,
            direction: TrendDirection::Neutral,
            strength: 0.0,
            pivot_high: None,
            pivot_low: None,
            indicators: IndicatorReading::default(),
        }
    }

    /// Strength on the 0-100 integer scale used by signals.
    pub fn confidence(&self) -> u8 {
        to_confidence(self.strength * 100.0)
    }

    /// Swing range usable for Fibonacci levels, if both pivots are known.
    pub fn swing_range(&self) -> Option<(f64, f64)> {
        match (self.pivot_high, self.pivot_low) {
            (Some(high), Some(low)) if high > low => Some((high, low)),
            _ => None,
        }
    }

    /// Adopts an externally supplied assessment for this timeframe.
    pub fn from_assessment(timeframe: Timeframe, assessment: &TrendAssessment) -> Result<Self> {
        assessment.validate()?;
        Ok(Self {
            timeframe,
            direction: assessment.direction,
            strength: f64::from(assessment.confidence) / 100.0,
            pivot_high: Some(assessment.swing_high),
            pivot_low: Some(assessment.swing_low),
            indicators: IndicatorReading::default(),
        })
    }
}

/// Pre-computed trend supplied by an external oracle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendAssessment {
    pub direction: TrendDirection,
    /// 0-100
    pub confidence: u8,
    pub swing_high: f64,
    pub swing_low: f64,
}

impl TrendAssessment {
    pub fn validate(&self) -> Result<()> {
        if self.confidence > 100 {
            return Err(AnalysisError::malformed(format!(
                "assessment confidence {} exceeds 100",
                self.confidence
            )));
        }
        if !(self.swing_high.is_finite() && self.swing_low.is_finite())
            || self.swing_high <= self.swing_low
        {
            return Err(AnalysisError::malformed(format!(
                "swing high {} must be above swing low {}",
                self.swing_high, self.swing_low
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeAction {
    GoLong,
    GoShort,
    StandAside,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendAlignment {
    pub higher_trend: TimeframeTrend,
    pub lower_trend: TimeframeTrend,
    pub action: TradeAction,
    /// 0.0 ..= 1.0
    pub confidence: f64,
}
