//! Price clustering across signals from every timeframe.

use itertools::Itertools;

use crate::config::ConfluenceConfig;
use crate::error::Result;
use crate::models::{AggregatedSignal, SignalDirection, SignalType};
use crate::utils::maths_utils::{mean, pct_distance, to_confidence};

/// Signals sharing a price neighbourhood. The first member is the representative.
#[derive(Debug, Clone)]
pub struct PriceGroup<'a> {
    pub price: f64,
    pub members: Vec<&'a AggregatedSignal>,
}

impl PriceGroup<'_> {
    /// Majority vote, ties go long.
    pub fn direction(&self) -> SignalDirection {
        let long = self
            .members
            .iter()
            .filter(|s| s.direction == SignalDirection::Long)
            .count();
        if long * 2 >= self.members.len() {
            SignalDirection::Long
        } else {
            SignalDirection::Short
        }
    }
}

/// Single pass, first-fit grouping against each group's representative price.
pub fn group_by_price<'a>(
    signals: impl IntoIterator<Item = &'a AggregatedSignal>,
    tolerance_pct: f64,
) -> Vec<PriceGroup<'a>> {
    let mut groups: Vec<PriceGroup<'a>> = Vec::new();
    for signal in signals {
        match groups
            .iter_mut()
            .find(|g| pct_distance(signal.price, g.price) <= tolerance_pct)
        {
            Some(group) => group.members.push(signal),
            None => groups.push(PriceGroup {
                price: signal.price,
                members: vec![signal],
            }),
        }
    }
    groups
}

/// One `confluence` signal per group of at least `min_group_size` members.
///
/// Existing confluence signals in the input are ignored so the detector can be
/// re-run over its own output without compounding.
pub fn detect_confluence(
    signals: &[AggregatedSignal],
    config: &ConfluenceConfig,
) -> Result<Vec<AggregatedSignal>> {
    config.validate()?;
    let candidates = signals
        .iter()
        .filter(|s| s.signal_type != SignalType::Confluence);

    let confluences = group_by_price(candidates, config.tolerance_pct)
        .into_iter()
        .filter(|g| g.members.len() >= config.min_group_size)
        .filter_map(|group| {
            let confidences: Vec<f64> = group
                .members
                .iter()
                .map(|s| f64::from(s.confidence))
                .collect();
            let average = mean(&confidences)?;
            let size = group.members.len();
            let score = average + size as f64 * config.member_bonus;
            let confidence = to_confidence(score).min(config.max_confidence);

            let timeframe = group.members.iter().map(|s| s.timeframe).min()?;
            let timestamp = group.members.iter().map(|s| s.timestamp).max()?;
            let is_active = group.members.iter().any(|s| s.is_active);
            let direction = group.direction();
            let sources = group
                .members
                .iter()
                .map(|s| s.timeframe)
                .unique()
                .join("/");

            Some(AggregatedSignal {
                id: format!("{}-{}-{:.4}", SignalType::Confluence, timeframe, group.price),
                timeframe,
                direction,
                signal_type: SignalType::Confluence,
                confidence,
                price: group.price,
                description: format!(
                    "{} signals converge near {:.4} ({})",
                    size, group.price, sources
                ),
                is_active,
                timestamp,
                fib_level: None,
                fib_strategy: None,
                confluence_count: Some(size),
            })
        })
        .collect();

    Ok(confluences)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Timeframe;
    use crate::utils::time_utils::epoch_ms_to_datetime;

    fn signal(
        timeframe: Timeframe,
        direction: SignalDirection,
        price: f64,
        confidence: u8,
    ) -> AggregatedSignal {
        AggregatedSignal {
            id: format!("fib_rejection-{}-{}", timeframe, price),
            timeframe,
            direction,
            signal_type: SignalType::FibRejection,
            confidence,
            price,
            description: String::new(),
            is_active: false,
            timestamp: epoch_ms_to_datetime(0),
            fib_level: Some(0.618),
            fib_strategy: None,
            confluence_count: None,
        }
    }

    #[test]
    fn nearby_prices_form_one_confluence() {
        let signals = vec![
            signal(Timeframe::H4, SignalDirection::Long, 100.2, 70),
            signal(Timeframe::D1, SignalDirection::Long, 100.4, 80),
        ];
        let out = detect_confluence(&signals, &ConfluenceConfig::default()).unwrap();
        assert_eq!(out.len(), 1);
        let c = &out[0];
        assert_eq!(c.confluence_count, Some(2));
        assert_eq!(c.signal_type, SignalType::Confluence);
        assert_eq!(c.price, 100.2);
        // avg 75 + 2 * 5
        assert_eq!(c.confidence, 85);
        assert_eq!(c.timeframe, Timeframe::D1);
    }

    #[test]
    fn singletons_never_emit() {
        let signals = vec![
            signal(Timeframe::H4, SignalDirection::Long, 100.0, 70),
            signal(Timeframe::D1, SignalDirection::Long, 110.0, 80),
            signal(Timeframe::H1, SignalDirection::Short, 120.0, 90),
        ];
        assert!(detect_confluence(&signals, &ConfluenceConfig::default()).unwrap().is_empty());
        assert!(detect_confluence(&[], &ConfluenceConfig::default()).unwrap().is_empty());
    }

    #[test]
    fn confidence_is_capped() {
        let signals: Vec<_> = (0..4)
            .map(|i| signal(Timeframe::H1, SignalDirection::Short, 50.0 + i as f64 * 0.01, 90))
            .collect();
        let out = detect_confluence(&signals, &ConfluenceConfig::default()).unwrap();
        assert_eq!(out[0].confidence, 95);
        assert_eq!(out[0].direction, SignalDirection::Short);
    }

    #[test]
    fn majority_direction_with_ties_going_long() {
        let tie = vec![
            signal(Timeframe::H1, SignalDirection::Short, 100.0, 60),
            signal(Timeframe::H4, SignalDirection::Long, 100.1, 60),
        ];
        let out = detect_confluence(&tie, &ConfluenceConfig::default()).unwrap();
        assert_eq!(out[0].direction, SignalDirection::Long);

        let short_majority = vec![
            signal(Timeframe::H1, SignalDirection::Short, 100.0, 60),
            signal(Timeframe::H4, SignalDirection::Short, 100.1, 60),
            signal(Timeframe::D1, SignalDirection::Long, 100.2, 60),
        ];
        let out = detect_confluence(&short_majority, &ConfluenceConfig::default()).unwrap();
        assert_eq!(out[0].direction, SignalDirection::Short);
        assert_eq!(out[0].confluence_count, Some(3));
    }

    #[test]
    fn group_direction_counts_members() {
        let signals = vec![
            signal(Timeframe::H1, SignalDirection::Short, 100.0, 60),
            signal(Timeframe::H4, SignalDirection::Long, 100.0, 60),
            signal(Timeframe::D1, SignalDirection::Short, 100.0, 60),
        ];
        let groups = group_by_price(&signals, 0.005);
        assert_eq!(groups[0].direction(), SignalDirection::Short);
        let groups = group_by_price(&signals[..2], 0.005);
        assert_eq!(groups[0].direction(), SignalDirection::Long);
    }

    #[test]
    fn grouping_compares_against_the_representative_only() {
        // 100.4 is within 0.5% of 100.0; 100.8 is within 0.5% of 100.4 but not of 100.0
        let signals = vec![
            signal(Timeframe::H1, SignalDirection::Long, 100.0, 60),
            signal(Timeframe::H1, SignalDirection::Long, 100.4, 60),
            signal(Timeframe::H1, SignalDirection::Long, 100.8, 60),
        ];
        let groups = group_by_price(&signals, 0.005);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].members.len(), 2);
    }

    #[test]
    fn rerunning_over_own_output_is_stable() {
        let mut signals = vec![
            signal(Timeframe::H4, SignalDirection::Long, 100.2, 70),
            signal(Timeframe::D1, SignalDirection::Long, 100.4, 80),
        ];
        let first = detect_confluence(&signals, &ConfluenceConfig::default()).unwrap();
        signals.extend(first.clone());
        let second = detect_confluence(&signals, &ConfluenceConfig::default()).unwrap();
        assert_eq!(first, second);
    }
}
