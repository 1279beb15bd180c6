//! Pure indicator functions over a bar series.
//!
//! Every function returns one value per input bar, `None` where the history is
//! too short. Only a zero period is rejected as malformed.

pub mod adx;
pub mod moving_average;
pub mod rsi;

pub use adx::{AdxOutput, adx, is_trending};
pub use moving_average::{ema, sma};
pub use rsi::rsi;

/// Latest defined reading of an indicator series.
pub fn last_value(series: &[Option<f64>]) -> Option<f64> {
    series.last().copied().flatten()
}

pub(crate) fn closes(bars: &[crate::domain::Bar]) -> Vec<f64> {
    bars.iter().map(|b| b.close).collect()
}

#[cfg(test)]
pub(crate) fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}
