//! Swing high / swing low detection with alternation enforced.

use serde::{Deserialize, Serialize};

use crate::domain::Bar;
use crate::error::{Result, ensure_period};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PivotType {
    High,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PivotPoint {
    /// Bar index of the pivot
    pub index: usize,
    pub price: f64,
    #[serde(rename = "type")]
    pub pivot_type: PivotType,
}

impl PivotPoint {
    /// True when `self` is a more extreme pivot of the same type than `other`.
    fn more_extreme_than(&self, other: &PivotPoint) -> bool {
        match self.pivot_type {
            PivotType::High => self.price > other.price,
            PivotType::Low => self.price < other.price,
        }
    }
}

/// Finds alternating swing highs and lows.
///
/// Bar `i` is a swing high when its high is strictly above every other high in
/// `[i - lookback, i + lookback]`, and a swing low symmetrically. Same-type
/// neighbours collapse onto the more extreme one, so the result alternates.
/// Fewer than `2 * lookback + 1` bars yield an empty sequence.
pub fn detect_pivots(bars: &[Bar], lookback: usize) -> Result<Vec<PivotPoint>> {
    ensure_period("pivot lookback", lookback)?;
    let n = bars.len();
    if n < 2 * lookback + 1 {
        return Ok(Vec::new());
    }

    // Candidates come out in index order; a bar can be both a high and a low
    let mut candidates = Vec::new();
    for i in lookback..(n - lookback) {
        let window = (i - lookback)..=(i + lookback);
        let is_high = window
            .clone()
            .filter(|&j| j != i)
            .all(|j| bars[i].high > bars[j].high);
        let is_low = window
            .filter(|&j| j != i)
            .all(|j| bars[i].low < bars[j].low);
        if is_high {
            candidates.push(PivotPoint {
                index: i,
                price: bars[i].high,
                pivot_type: PivotType::High,
            });
        }
        if is_low {
            candidates.push(PivotPoint {
                index: i,
                price: bars[i].low,
                pivot_type: PivotType::Low,
            });
        }
    }

    Ok(enforce_alternation(candidates))
}

fn enforce_alternation(candidates: Vec<PivotPoint>) -> Vec<PivotPoint> {
    let mut pivots: Vec<PivotPoint> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        match pivots.last_mut() {
            Some(last) if last.pivot_type == candidate.pivot_type => {
                if candidate.more_extreme_than(last) {
                    *last = candidate;
                }
            }
            _ => pivots.push(candidate),
        }
    }
    pivots
}

/// The last `count` pivots of one type, oldest first.
pub fn last_of_type(pivots: &[PivotPoint], pivot_type: PivotType, count: usize) -> Vec<PivotPoint> {
    let mut picked: Vec<PivotPoint> = pivots
        .iter()
        .rev()
        .filter(|p| p.pivot_type == pivot_type)
        .take(count)
        .copied()
        .collect();
    picked.reverse();
    picked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::bar::test_support::bars_from_mids;

    fn zigzag() -> Vec<Bar> {
        bars_from_mids(
            &[
                95.0, 93.0, 92.0, 94.0, 96.0, 98.0, 97.0, 96.0, 95.0, 97.0, 99.0, 103.0, 101.0,
                100.0, 99.0,
            ],
            2.0,
        )
    }

    #[test]
    fn finds_swings_in_a_zigzag() {
        let pivots = detect_pivots(&zigzag(), 2).unwrap();
        let summary: Vec<(usize, f64, PivotType)> = pivots
            .iter()
            .map(|p| (p.index, p.price, p.pivot_type))
            .collect();
        assert_eq!(
            summary,
            vec![
                (2, 90.0, PivotType::Low),
                (5, 100.0, PivotType::High),
                (8, 93.0, PivotType::Low),
                (11, 105.0, PivotType::High),
            ]
        );
    }

    #[test]
    fn too_few_bars_is_empty_not_error() {
        let bars = bars_from_mids(&[1.0, 2.0, 3.0, 2.0], 0.5);
        assert!(detect_pivots(&bars, 2).unwrap().is_empty());
        assert!(detect_pivots(&[], 5).unwrap().is_empty());
    }

    #[test]
    fn equal_highs_are_not_pivots() {
        let bars = bars_from_mids(&[1.0, 2.0, 5.0, 5.0, 2.0, 1.0], 0.5);
        assert!(
            detect_pivots(&bars, 2)
                .unwrap()
                .iter()
                .all(|p| p.pivot_type != PivotType::High)
        );
    }

    #[test]
    fn adjacent_same_type_keeps_most_extreme() {
        let kept = enforce_alternation(vec![
            PivotPoint { index: 3, price: 10.0, pivot_type: PivotType::High },
            PivotPoint { index: 6, price: 12.0, pivot_type: PivotType::High },
            PivotPoint { index: 9, price: 11.0, pivot_type: PivotType::High },
            PivotPoint { index: 12, price: 4.0, pivot_type: PivotType::Low },
        ]);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].index, 6);
        assert_eq!(kept[1].pivot_type, PivotType::Low);
    }

    #[test]
    fn output_always_alternates() {
        // Noisy deterministic series with plenty of local extremes
        let mids: Vec<f64> = (0..300)
            .map(|i| 100.0 + (i as f64 * 0.37).sin() * 10.0 + ((i * 7919) % 13) as f64 * 0.4)
            .collect();
        for lookback in 1..6 {
            let pivots = detect_pivots(&bars_from_mids(&mids, 1.0), lookback).unwrap();
            assert!(pivots.windows(2).all(|w| w[0].pivot_type != w[1].pivot_type));
        }
    }

    #[test]
    fn last_of_type_returns_oldest_first() {
        let pivots = detect_pivots(&zigzag(), 2).unwrap();
        let highs = last_of_type(&pivots, PivotType::High, 2);
        assert_eq!(highs.iter().map(|p| p.price).collect::<Vec<_>>(), vec![100.0, 105.0]);
    }
}
