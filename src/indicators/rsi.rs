use crate::domain::Bar;
use crate::error::{Result, ensure_period};

use super::closes;

/// Relative Strength Index with Wilder smoothing.
///
/// The first `period` close-to-close changes seed the average gain/loss with a
/// simple mean; the first reading lands on index `period`. A window with no
/// losses reads 100, including a perfectly flat series.
pub fn rsi(bars: &[Bar], period: usize) -> Result<Vec<Option<f64>>> {
    ensure_period("RSI", period)?;
    let closes = closes(bars);
    let n = closes.len();
    let mut out = vec![None; n];
    if n <= period {
        return Ok(out);
    }

    let p = period as f64;
    let (mut avg_gain, mut avg_loss) = (0.0, 0.0);
    for i in 1..=period {
        let (gain, loss) = split_change(closes[i] - closes[i - 1]);
        avg_gain += gain;
        avg_loss += loss;
    }
    avg_gain /= p;
    avg_loss /= p;
    out[period] = Some(rsi_value(avg_gain, avg_loss));

    for i in (period + 1)..n {
        let (gain, loss) = split_change(closes[i] - closes[i - 1]);
        avg_gain = (avg_gain * (p - 1.0) + gain) / p;
        avg_loss = (avg_loss * (p - 1.0) + loss) / p;
        out[i] = Some(rsi_value(avg_gain, avg_loss));
    }
    Ok(out)
}

fn split_change(change: f64) -> (f64, f64) {
    if change > 0.0 {
        (change, 0.0)
    } else {
        (0.0, -change)
    }
}

fn rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        return 100.0;
    }
    (100.0 - 100.0 / (1.0 + avg_gain / avg_loss)).clamp(0.0, 100.0)
}
