use crate::config::TradeActionConfig;
use crate::models::{TimeframeTrend, TradeAction, TrendAlignment, TrendDirection};

/// Higher-timeframe trend against lower-timeframe pullback.
///
/// `(UP, DOWN)` is a long entry on the dip, `(DOWN, UP)` a short into the
/// rally. Anything else stands aside at a fixed, non-zero floor confidence.
pub fn decide(
    higher_trend: &TimeframeTrend,
    lower_trend: &TimeframeTrend,
    config: &TradeActionConfig,
) -> TrendAlignment {
    let action = match (higher_trend.direction, lower_trend.direction) {
        (TrendDirection::Up, TrendDirection::Down) => TradeAction::GoLong,
        (TrendDirection::Down, TrendDirection::Up) => TradeAction::GoShort,
        _ => TradeAction::StandAside,
    };

    let confidence = match action {
        TradeAction::StandAside => config.stand_aside_confidence,
        TradeAction::GoLong | TradeAction::GoShort => {
            let average = (higher_trend.strength + lower_trend.strength) / 2.0;
            // Always opposite here, by construction of the match above
            (average + config.opposition_bonus).min(1.0)
        }
    };

    TrendAlignment {
        higher_trend: higher_trend.clone(),
        lower_trend: lower_trend.clone(),
        action,
        confidence,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Timeframe;

    fn trend(timeframe: Timeframe, direction: TrendDirection, strength: f64) -> TimeframeTrend {
        TimeframeTrend {
            direction,
            strength,
            ..TimeframeTrend::neutral(timeframe)
        }
    }

    #[test]
    fn uptrend_with_lower_pullback_goes_long() {
        let alignment = decide(
            &trend(Timeframe::D1, TrendDirection::Up, 0.8),
            &trend(Timeframe::H1, TrendDirection::Down, 0.7),
            &TradeActionConfig::default(),
        );
        assert_eq!(alignment.action, TradeAction::GoLong);
        assert!((alignment.confidence - 0.9).abs() < 1e-9);
    }

    #[test]
    fn downtrend_with_lower_rally_goes_short_and_caps_confidence() {
        let alignment = decide(
            &trend(Timeframe::W1, TrendDirection::Down, 1.0),
            &trend(Timeframe::H4, TrendDirection::Up, 0.95),
            &TradeActionConfig::default(),
        );
        assert_eq!(alignment.action, TradeAction::GoShort);
        assert_eq!(alignment.confidence, 1.0);
    }

    #[test]
    fn matching_or_neutral_directions_stand_aside() {
        let cfg = TradeActionConfig::default();
        let cases = [
            (TrendDirection::Up, TrendDirection::Up),
            (TrendDirection::Down, TrendDirection::Down),
            (TrendDirection::Neutral, TrendDirection::Down),
            (TrendDirection::Up, TrendDirection::Neutral),
            (TrendDirection::Neutral, TrendDirection::Neutral),
        ];
        for (higher, lower) in cases {
            let alignment = decide(
                &trend(Timeframe::D1, higher, 0.9),
                &trend(Timeframe::H1, lower, 0.9),
                &cfg,
            );
            assert_eq!(alignment.action, TradeAction::StandAside);
            assert_eq!(alignment.confidence, 0.3);
        }
    }
}
