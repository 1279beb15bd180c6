use crate::domain::Bar;
use crate::error::{Result, ensure_period};
use crate::utils::maths_utils::mean;

use super::closes;

/// Simple trailing mean of `close`; `None` for the first `period - 1` bars.
pub fn sma(bars: &[Bar], period: usize) -> Result<Vec<Option<f64>>> {
    ensure_period("SMA", period)?;
    let closes = closes(bars);
    let mut out = vec![None; closes.len()];
    for (end, slot) in out.iter_mut().enumerate().skip(period - 1) {
        *slot = mean(&closes[end + 1 - period..=end]);
    }
    Ok(out)
}

/// Exponential moving average seeded with the SMA of the first `period` closes.
pub fn ema(bars: &[Bar], period: usize) -> Result<Vec<Option<f64>>> {
    ensure_period("EMA", period)?;
    let closes = closes(bars);
    let mut out = vec![None; closes.len()];
    if closes.len() < period {
        return Ok(out);
    }

    let k = 2.0 / (period as f64 + 1.0);
    let mut prev = mean(&closes[..period]).unwrap_or_default();
    out[period - 1] = Some(prev);
    for i in period..closes.len() {
        prev = (closes[i] - prev) * k + prev;
        out[i] = Some(prev);
    }
    Ok(out)
}
