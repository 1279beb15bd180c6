//! Per-timeframe trend classification by weighted indicator voting.
//!
//! Voters: pivot structure, fast/slow SMA cross, RSI vs threshold and (when
//! trending) the ADX directional lines. Weights are renormalised over the
//! voters that actually cast a vote, so UP + DOWN always sums to 1.

use crate::config::{PRINT_TREND_VOTES, TrendIndicatorConfig};
use crate::domain::{Bar, Timeframe};
use crate::error::Result;
use crate::indicators::{self, is_trending, last_value};
use crate::models::{IndicatorReading, TimeframeTrend, TrendDirection};
use crate::utils::maths_utils::pct_distance;

use super::pivots::{PivotPoint, PivotType, detect_pivots, last_of_type};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Voter {
    Pivots,
    MovingAverages,
    Rsi,
    Adx,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vote {
    pub voter: Voter,
    pub weight: f64,
    pub bullish: bool,
}

/// Normalised UP / DOWN buckets.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WeightedVote {
    pub up: f64,
    pub down: f64,
}

/// Everything the combiner looked at before settling on a direction.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendBreakdown {
    pub pivot_direction: TrendDirection,
    pub pivot_strength: f64,
    pub pivot_high: Option<f64>,
    pub pivot_low: Option<f64>,
    pub reading: IndicatorReading,
    pub votes: Vec<Vote>,
    pub tally: Option<WeightedVote>,
}

/// Classifies one timeframe's bars as UP / DOWN / NEUTRAL with a 0..1 strength.
///
/// Short history (fewer than `config.min_bars()`) short-circuits to NEUTRAL
/// with strength 0 and an empty indicator reading.
pub fn combine_trend(
    timeframe: Timeframe,
    bars: &[Bar],
    config: &TrendIndicatorConfig,
) -> Result<TimeframeTrend> {
    config.validate()?;
    if bars.len() < config.min_bars() || !config.any_enabled() {
        return Ok(TimeframeTrend::neutral(timeframe));
    }

    let breakdown = breakdown(bars, config)?;
    let (direction, strength) = if is_pivots_only(config) {
        (breakdown.pivot_direction, breakdown.pivot_strength)
    } else {
        let (direction, strength) = breakdown
            .tally
            .map(|tally| resolve(tally, config.consensus_threshold))
            .unwrap_or((TrendDirection::Neutral, 0.0));
        (direction, strength + adx_bonus(direction, &breakdown.reading, config))
    };

    if PRINT_TREND_VOTES {
        log::debug!(
            "[{}] votes {:?} -> tally {:?} -> {:?} ({:.3})",
            timeframe,
            breakdown.votes,
            breakdown.tally,
            direction,
            strength
        );
    }

    Ok(TimeframeTrend {
        timeframe,
        direction,
        strength: strength.clamp(0.0, 1.0),
        pivot_high: breakdown.pivot_high,
        pivot_low: breakdown.pivot_low,
        indicators: breakdown.reading,
    })
}

/// Runs pivots and indicators and collects the votes, without deciding.
pub fn breakdown(bars: &[Bar], config: &TrendIndicatorConfig) -> Result<TrendBreakdown> {
    let pivots = detect_pivots(bars, config.lookback)?;
    let close = bars.last().map(|b| b.close).unwrap_or_default();
    let (pivot_direction, pivot_strength) = classify_pivots(&pivots, close, config);
    let reading = read_indicators(bars, config)?;

    let mut votes = Vec::with_capacity(4);
    if config.use_pivots && pivot_direction != TrendDirection::Neutral {
        votes.push(Vote {
            voter: Voter::Pivots,
            weight: config.weights.pivot,
            bullish: pivot_direction == TrendDirection::Up,
        });
    }
    if config.use_ma
        && let (Some(fast), Some(slow)) = (reading.sma_fast, reading.sma_slow)
    {
        votes.push(Vote {
            voter: Voter::MovingAverages,
            weight: config.weights.ma,
            bullish: fast > slow,
        });
    }
    if config.use_rsi
        && let Some(rsi) = reading.rsi
    {
        votes.push(Vote {
            voter: Voter::Rsi,
            weight: config.weights.rsi,
            bullish: rsi > config.rsi_threshold,
        });
    }
    if config.use_adx
        && let (Some(adx), Some(plus), Some(minus)) = (reading.adx, reading.plus_di, reading.minus_di)
        && is_trending(adx, config.adx_threshold)
    {
        votes.push(Vote {
            voter: Voter::Adx,
            weight: config.weights.adx,
            bullish: plus > minus,
        });
    }

    Ok(TrendBreakdown {
        pivot_direction,
        pivot_strength,
        pivot_high: last_of_type(&pivots, PivotType::High, 1).first().map(|p| p.price),
        pivot_low: last_of_type(&pivots, PivotType::Low, 1).first().map(|p| p.price),
        reading,
        tally: tally(&votes),
        votes,
    })
}

/// Direction from the last two swing highs and lows.
///
/// Both higher: strong UP. Both lower: strong DOWN. A single higher (or lower)
/// leg that outvotes the other side: weak UP (or DOWN). A close within
/// `proximity_pct` of the latest pivot in the trend's direction adds a bonus.
pub fn classify_pivots(
    pivots: &[PivotPoint],
    close: f64,
    config: &TrendIndicatorConfig,
) -> (TrendDirection, f64) {
    let highs = last_of_type(pivots, PivotType::High, 2);
    let lows = last_of_type(pivots, PivotType::Low, 2);
    if highs.len() < 2 || lows.len() < 2 {
        return (TrendDirection::Neutral, 0.0);
    }

    let (mut ups, mut downs) = (0, 0);
    for pair in [&highs, &lows] {
        if pair[1].price > pair[0].price {
            ups += 1;
        } else if pair[1].price < pair[0].price {
            downs += 1;
        }
    }

    let (direction, strength) = match (ups, downs) {
        (2, _) => (TrendDirection::Up, config.pivot_strong_strength),
        (_, 2) => (TrendDirection::Down, config.pivot_strong_strength),
        (u, d) if u > d => (TrendDirection::Up, config.pivot_weak_strength),
        (u, d) if d > u => (TrendDirection::Down, config.pivot_weak_strength),
        _ => return (TrendDirection::Neutral, 0.0),
    };

    let extreme = match direction {
        TrendDirection::Up => highs[1].price,
        _ => lows[1].price,
    };
    let bonus = if pct_distance(close, extreme) <= config.proximity_pct {
        config.proximity_bonus
    } else {
        0.0
    };
    (direction, (strength + bonus).min(1.0))
}

/// Renormalises vote weights. `None` when nobody voted (or all weights are 0).
pub fn tally(votes: &[Vote]) -> Option<WeightedVote> {
    let total: f64 = votes.iter().map(|v| v.weight).sum();
    if total <= 0.0 {
        return None;
    }
    let up: f64 = votes.iter().filter(|v| v.bullish).map(|v| v.weight).sum();
    let up = up / total;
    Some(WeightedVote {
        up,
        down: 1.0 - up,
    })
}

/// Turns normalised buckets into a direction and base strength.
pub fn resolve(vote: WeightedVote, consensus_threshold: f64) -> (TrendDirection, f64) {
    if vote.up > consensus_threshold {
        (TrendDirection::Up, 0.5 + vote.up * 0.5)
    } else if vote.down > consensus_threshold {
        (TrendDirection::Down, 0.5 + vote.down * 0.5)
    } else if vote.up > vote.down {
        (TrendDirection::Up, 0.4 + (vote.up - 0.5) * 0.5)
    } else if vote.down > vote.up {
        (TrendDirection::Down, 0.4 + (vote.down - 0.5) * 0.5)
    } else {
        (TrendDirection::Neutral, 0.0)
    }
}

fn adx_bonus(
    direction: TrendDirection,
    reading: &IndicatorReading,
    config: &TrendIndicatorConfig,
) -> f64 {
    if !config.use_adx || direction == TrendDirection::Neutral {
        return 0.0;
    }
    match reading.adx {
        Some(adx) if is_trending(adx, config.adx_threshold) => {
            ((adx - config.adx_threshold) / config.adx_bonus_divisor).min(config.adx_bonus_cap)
        }
        _ => 0.0,
    }
}

fn is_pivots_only(config: &TrendIndicatorConfig) -> bool {
    config.use_pivots && !config.use_ma && !config.use_rsi && !config.use_adx
}

fn read_indicators(bars: &[Bar], config: &TrendIndicatorConfig) -> Result<IndicatorReading> {
    let mut reading = IndicatorReading::default();
    if config.use_ma {
        reading.sma_fast = last_value(&indicators::sma(bars, config.ma_fast_period)?);
        reading.sma_slow = last_value(&indicators::sma(bars, config.ma_slow_period)?);
    }
    if config.use_rsi {
        reading.rsi = last_value(&indicators::rsi(bars, config.rsi_period)?);
    }
    if config.use_adx {
        let out = indicators::adx(bars, config.adx_period)?;
        reading.adx = last_value(&out.adx);
        reading.plus_di = last_value(&out.plus_di);
        reading.minus_di = last_value(&out.minus_di);
    }
    Ok(reading)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::bar::test_support::{bars_from_mids, falling_bars, rising_bars};
    use crate::error::AnalysisError;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    const ZIGZAG_UP: [f64; 15] = [
        95.0, 93.0, 92.0, 94.0, 96.0, 98.0, 97.0, 96.0, 95.0, 97.0, 99.0, 103.0, 101.0, 100.0,
        99.0,
    ];

    fn pivot_config() -> TrendIndicatorConfig {
        TrendIndicatorConfig {
            ma_slow_period: 5,
            ..TrendIndicatorConfig::pivots_only(2)
        }
    }

    #[test]
    fn ascending_swings_with_pivots_only_is_strong_up() {
        // Highs 100 -> 105, lows 90 -> 93
        let bars = bars_from_mids(&ZIGZAG_UP, 2.0);
        let trend = combine_trend(Timeframe::H1, &bars, &pivot_config()).unwrap();
        assert_eq!(trend.direction, TrendDirection::Up);
        assert!(approx_eq(trend.strength, 0.9));
        assert_eq!(trend.pivot_high, Some(105.0));
        assert_eq!(trend.pivot_low, Some(93.0));
    }

    #[test]
    fn descending_swings_are_strong_down() {
        let mirrored: Vec<f64> = ZIGZAG_UP.iter().map(|m| 200.0 - m).collect();
        let bars = bars_from_mids(&mirrored, 2.0);
        let trend = combine_trend(Timeframe::H1, &bars, &pivot_config()).unwrap();
        assert_eq!(trend.direction, TrendDirection::Down);
        assert!(approx_eq(trend.strength, 0.9));
    }

    #[test]
    fn close_near_latest_high_earns_proximity_bonus() {
        let mut mids = ZIGZAG_UP.to_vec();
        *mids.last_mut().unwrap() = 104.6;
        let bars = bars_from_mids(&mids, 2.0);
        let trend = combine_trend(Timeframe::H1, &bars, &pivot_config()).unwrap();
        assert_eq!(trend.direction, TrendDirection::Up);
        assert!(approx_eq(trend.strength, 1.0));
    }

    #[test]
    fn short_history_is_neutral_with_empty_reading() {
        let bars = rising_bars(59, 100.0, 1.0);
        let trend =
            combine_trend(Timeframe::D1, &bars, &TrendIndicatorConfig::default()).unwrap();
        assert_eq!(trend, TimeframeTrend::neutral(Timeframe::D1));
    }

    #[test]
    fn full_config_follows_a_rising_market() {
        let bars = rising_bars(120, 100.0, 1.0);
        let trend =
            combine_trend(Timeframe::H4, &bars, &TrendIndicatorConfig::default()).unwrap();
        assert_eq!(trend.direction, TrendDirection::Up);
        assert!(trend.strength > 0.6 && trend.strength <= 1.0);
        assert!(trend.indicators.sma_fast.unwrap() > trend.indicators.sma_slow.unwrap());
    }

    #[test]
    fn full_config_follows_a_falling_market() {
        let bars = falling_bars(120, 300.0, 1.0);
        let trend =
            combine_trend(Timeframe::H4, &bars, &TrendIndicatorConfig::default()).unwrap();
        assert_eq!(trend.direction, TrendDirection::Down);
        assert!(trend.strength > 0.6);
    }

    #[test]
    fn nothing_enabled_is_neutral() {
        let cfg = TrendIndicatorConfig {
            use_pivots: false,
            use_ma: false,
            use_rsi: false,
            use_adx: false,
            ..TrendIndicatorConfig::default()
        };
        let trend = combine_trend(Timeframe::H1, &rising_bars(120, 100.0, 1.0), &cfg).unwrap();
        assert_eq!(trend.direction, TrendDirection::Neutral);
        assert_eq!(trend.strength, 0.0);
    }

    #[test]
    fn weights_renormalise_for_every_indicator_subset() {
        let bars = rising_bars(120, 100.0, 1.0);
        for mask in 0u8..16 {
            let cfg = TrendIndicatorConfig {
                use_pivots: mask & 1 != 0,
                use_ma: mask & 2 != 0,
                use_rsi: mask & 4 != 0,
                use_adx: mask & 8 != 0,
                ..TrendIndicatorConfig::default()
            };
            let bd = breakdown(&bars, &cfg).unwrap();
            match bd.tally {
                Some(t) => assert!(approx_eq(t.up + t.down, 1.0), "mask {mask}"),
                None => {
                    let trend = combine_trend(Timeframe::H1, &bars, &cfg).unwrap();
                    assert_eq!(trend.direction, TrendDirection::Neutral, "mask {mask}");
                    assert_eq!(trend.strength, 0.0, "mask {mask}");
                }
            }
        }
    }

    #[test]
    fn resolve_covers_strong_weak_and_tied_consensus() {
        let (d, s) = resolve(WeightedVote { up: 0.7, down: 0.3 }, 0.6);
        assert_eq!(d, TrendDirection::Up);
        assert!(approx_eq(s, 0.85));

        let (d, s) = resolve(WeightedVote { up: 0.45, down: 0.55 }, 0.6);
        assert_eq!(d, TrendDirection::Down);
        assert!(approx_eq(s, 0.425));

        assert_eq!(
            resolve(WeightedVote { up: 0.5, down: 0.5 }, 0.6),
            (TrendDirection::Neutral, 0.0)
        );
    }

    fn swings(h1: f64, l1: f64, h2: f64, l2: f64) -> Vec<PivotPoint> {
        [
            (2, h1, PivotType::High),
            (4, l1, PivotType::Low),
            (6, h2, PivotType::High),
            (8, l2, PivotType::Low),
        ]
        .into_iter()
        .map(|(index, price, pivot_type)| PivotPoint {
            index,
            price,
            pivot_type,
        })
        .collect()
    }

    #[test]
    fn one_leg_moving_is_a_weak_trend() {
        let cfg = TrendIndicatorConfig::default();
        // Higher high, equal lows
        let (dir, strength) = classify_pivots(&swings(100.0, 90.0, 105.0, 90.0), 95.0, &cfg);
        assert_eq!(dir, TrendDirection::Up);
        assert!(approx_eq(strength, 0.6));

        // Lower high, equal lows
        let (dir, strength) = classify_pivots(&swings(105.0, 90.0, 100.0, 90.0), 95.0, &cfg);
        assert_eq!(dir, TrendDirection::Down);
        assert!(approx_eq(strength, 0.6));

        // Close sitting on the latest high earns the proximity bonus
        let (_, strength) = classify_pivots(&swings(100.0, 90.0, 105.0, 90.0), 105.0, &cfg);
        assert!(approx_eq(strength, 0.7));
    }

    #[test]
    fn opposing_legs_are_neutral() {
        let cfg = TrendIndicatorConfig::default();
        assert_eq!(
            classify_pivots(&swings(100.0, 90.0, 105.0, 85.0), 95.0, &cfg),
            (TrendDirection::Neutral, 0.0)
        );
        assert_eq!(
            classify_pivots(&swings(100.0, 90.0, 100.0, 90.0), 95.0, &cfg),
            (TrendDirection::Neutral, 0.0)
        );
    }

    #[test]
    fn adx_bonus_scales_above_threshold_and_caps() {
        let cfg = TrendIndicatorConfig::default();
        let reading = |adx| IndicatorReading {
            adx: Some(adx),
            ..IndicatorReading::default()
        };
        // (30 - 25) / 50
        assert!(approx_eq(adx_bonus(TrendDirection::Up, &reading(30.0), &cfg), 0.1));
        assert!(approx_eq(adx_bonus(TrendDirection::Down, &reading(30.0), &cfg), 0.1));
        assert!(approx_eq(adx_bonus(TrendDirection::Up, &reading(60.0), &cfg), 0.15));
        assert_eq!(adx_bonus(TrendDirection::Up, &reading(20.0), &cfg), 0.0);
        assert_eq!(adx_bonus(TrendDirection::Neutral, &reading(60.0), &cfg), 0.0);
        assert_eq!(adx_bonus(TrendDirection::Up, &IndicatorReading::default(), &cfg), 0.0);

        let no_adx = TrendIndicatorConfig {
            use_adx: false,
            ..cfg
        };
        assert_eq!(adx_bonus(TrendDirection::Up, &reading(60.0), &no_adx), 0.0);
    }

    #[test]
    fn tally_ignores_missing_voters() {
        let votes = [
            Vote { voter: Voter::MovingAverages, weight: 0.25, bullish: true },
            Vote { voter: Voter::Rsi, weight: 0.2, bullish: false },
        ];
        let t = tally(&votes).unwrap();
        assert!(approx_eq(t.up, 0.25 / 0.45));
        assert!(tally(&[]).is_none());
    }

    #[test]
    fn malformed_config_fails_fast() {
        let cfg = TrendIndicatorConfig {
            lookback: 0,
            ..TrendIndicatorConfig::default()
        };
        assert!(matches!(
            combine_trend(Timeframe::H1, &rising_bars(80, 1.0, 0.1), &cfg),
            Err(AnalysisError::MalformedInput(_))
        ));
    }
}
