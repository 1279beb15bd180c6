//! Typed errors surfaced by the analysis core.
//!
//! Insufficient history is deliberately absent: short inputs produce `None`
//! indicator values or empty pivot/signal sequences instead of an error.

use thiserror::Error;

use crate::domain::Timeframe;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    /// Invalid configuration or input (zero period, inverted swing, ...).
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// A single timeframe's external fetch failed or was cancelled.
    #[error("Fetch failed for {timeframe}: {reason}")]
    TimeframeFetchFailure { timeframe: Timeframe, reason: String },

    /// Every requested timeframe failed; the run has no usable data.
    #[error("All timeframe fetches failed ({})", format_timeframes(.timeframes))]
    TotalFetchFailure { timeframes: Vec<Timeframe> },

    /// The blocking analysis pass panicked or was aborted.
    #[error("Analysis task failed: {0}")]
    AnalysisTask(String),
}

fn format_timeframes(timeframes: &[Timeframe]) -> String {
    use itertools::Itertools;
    timeframes.iter().join(", ")
}

impl AnalysisError {
    pub fn malformed(msg: impl Into<String>) -> Self {
        AnalysisError::MalformedInput(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Fail fast on a zero period.
pub(crate) fn ensure_period(name: &str, period: usize) -> Result<()> {
    if period == 0 {
        return Err(AnalysisError::malformed(format!(
            "{} period must be positive",
            name
        )));
    }
    Ok(())
}

/// Fail fast on a negative or non-finite numeric parameter.
pub(crate) fn ensure_non_negative(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(AnalysisError::malformed(format!(
            "{} must be a finite, non-negative number (got {})",
            name, value
        )));
    }
    Ok(())
}
