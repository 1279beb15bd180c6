use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarType {
    Bullish,
    Bearish,
    Doji,
}

/// One OHLC candle. `time` is the open timestamp in epoch milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
}

impl Bar {
    pub fn new(time: i64, open: f64, high: f64, low: f64, close: f64) -> Self {
        Bar {
            time,
            open,
            high,
            low,
            close,
            volume: None,
        }
    }

    pub fn with_volume(mut self, volume: f64) -> Self {
        self.volume = Some(volume);
        self
    }

    pub fn get_type(&self) -> BarType {
        if self.close > self.open {
            BarType::Bullish
        } else if self.close < self.open {
            BarType::Bearish
        } else {
            BarType::Doji
        }
    }

    pub fn is_bullish(&self) -> bool {
        self.get_type() == BarType::Bullish
    }

    pub fn is_bearish(&self) -> bool {
        self.get_type() == BarType::Bearish
    }

    // Returns the low and high of the candle body as a tuple
    pub fn body_range(&self) -> (f64, f64) {
        (self.open.min(self.close), self.open.max(self.close))
    }

    /// `high >= max(open, close)` and `low <= min(open, close)`, all finite.
    pub fn is_well_formed(&self) -> bool {
        let (body_low, body_high) = self.body_range();
        [self.open, self.high, self.low, self.close]
            .iter()
            .all(|v| v.is_finite())
            && self.high >= body_high
            && self.low <= body_low
    }
}

/// Checks the ordering and OHLC invariants of a bar series.
/// Providers run this before handing bars to the core.
pub fn validate_series(bars: &[Bar]) -> Result<()> {
    for (idx, bar) in bars.iter().enumerate() {
        if !bar.is_well_formed() {
            return Err(AnalysisError::malformed(format!(
                "bar {} at {} violates OHLC invariant (o={}, h={}, l={}, c={})",
                idx, bar.time, bar.open, bar.high, bar.low, bar.close
            )));
        }
    }
    if let Some(pos) = bars.windows(2).position(|w| w[1].time <= w[0].time) {
        return Err(AnalysisError::malformed(format!(
            "bar timestamps must be strictly ascending (index {} -> {})",
            pos,
            pos + 1
        )));
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::Bar;
    use crate::utils::TimeUtils;

    /// Bars whose open/close sit on `mids` with a fixed wick either side.
    pub fn bars_from_mids(mids: &[f64], wick: f64) -> Vec<Bar> {
        mids.iter()
            .enumerate()
            .map(|(i, &m)| Bar::new(i as i64 * TimeUtils::MS_IN_H, m, m + wick, m - wick, m))
            .collect()
    }

    /// Flat-bodied bars built from a close series.
    pub fn bars_from_closes(closes: &[f64]) -> Vec<Bar> {
        bars_from_mids(closes, 0.0)
    }

    /// A steadily rising series with small alternating pullbacks.
    pub fn rising_bars(len: usize, start: f64, step: f64) -> Vec<Bar> {
        (0..len)
            .map(|i| {
                let base = start + i as f64 * step;
                let wobble = if i % 3 == 2 { -step * 1.5 } else { 0.0 };
                let close = base + wobble;
                let open = close - step * 0.4;
                Bar::new(
                    i as i64 * TimeUtils::MS_IN_H,
                    open,
                    close + step * 0.3,
                    open - step * 0.3,
                    close,
                )
            })
            .collect()
    }

    pub fn falling_bars(len: usize, start: f64, step: f64) -> Vec<Bar> {
        (0..len)
            .map(|i| {
                let base = start - i as f64 * step;
                let wobble = if i % 3 == 2 { step * 1.5 } else { 0.0 };
                let close = base + wobble;
                let open = close + step * 0.4;
                Bar::new(
                    i as i64 * TimeUtils::MS_IN_H,
                    open,
                    open + step * 0.3,
                    close - step * 0.3,
                    close,
                )
            })
            .collect()
    }
}
