use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

use crate::utils::TimeUtils;

/// Supported chart timeframes.
///
/// Declaration order is the canonical order used for sorting: higher
/// timeframes compare as *smaller*, so an ascending sort lists `1M` first.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
pub enum Timeframe {
    #[serde(rename = "1M")]
    #[strum(to_string = "1M")]
    Mo1,
    #[serde(rename = "1W")]
    #[strum(to_string = "1W")]
    W1,
    #[serde(rename = "1D")]
    #[strum(to_string = "1D")]
    D1,
    #[serde(rename = "4H")]
    #[strum(to_string = "4H")]
    H4,
    #[serde(rename = "1H")]
    #[strum(to_string = "1H")]
    H1,
    #[serde(rename = "15m")]
    #[strum(to_string = "15m")]
    M15,
    #[serde(rename = "5m")]
    #[strum(to_string = "5m")]
    M5,
    #[serde(rename = "3m")]
    #[strum(to_string = "3m")]
    M3,
    #[serde(rename = "1m")]
    #[strum(to_string = "1m")]
    M1,
}

pub const DEFAULT_TIMEFRAMES: [Timeframe; 4] =
    [Timeframe::W1, Timeframe::D1, Timeframe::H4, Timeframe::H1];

impl Timeframe {
    pub fn duration_ms(&self) -> i64 {
        match self {
            Timeframe::Mo1 => TimeUtils::MS_IN_1_M,
            Timeframe::W1 => TimeUtils::MS_IN_W,
            Timeframe::D1 => TimeUtils::MS_IN_D,
            Timeframe::H4 => TimeUtils::MS_IN_4_H,
            Timeframe::H1 => TimeUtils::MS_IN_H,
            Timeframe::M15 => TimeUtils::MS_IN_15_MIN,
            Timeframe::M5 => TimeUtils::MS_IN_5_MIN,
            Timeframe::M3 => TimeUtils::MS_IN_3_MIN,
            Timeframe::M1 => TimeUtils::MS_IN_MIN,
        }
    }

    /// True when `self` sits above `other` in the canonical order.
    pub fn is_higher_than(&self, other: Timeframe) -> bool {
        *self < other
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn canonical_order_puts_higher_timeframes_first() {
        let mut tfs = vec![Timeframe::H1, Timeframe::Mo1, Timeframe::M5, Timeframe::D1];
        tfs.sort();
        assert_eq!(
            tfs,
            vec![Timeframe::Mo1, Timeframe::D1, Timeframe::H1, Timeframe::M5]
        );
        assert!(Timeframe::W1.is_higher_than(Timeframe::H4));
    }

    #[test]
    fn string_forms_round_trip_through_strum_and_serde() {
        for tf in Timeframe::iter() {
            let text = tf.to_string();
            assert_eq!(Timeframe::from_str(&text).unwrap(), tf);
            assert_eq!(serde_json::to_string(&tf).unwrap(), format!("\"{}\"", text));
        }
        assert!(Timeframe::from_str("2H").is_err());
    }

    #[test]
    fn durations_decrease_along_canonical_order() {
        let durations: Vec<i64> = Timeframe::iter().map(|tf| tf.duration_ms()).collect();
        assert!(durations.windows(2).all(|w| w[0] > w[1]));
    }
}
