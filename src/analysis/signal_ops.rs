//! Filtering, ordering and counting over an aggregated signal set.

use crate::models::{AggregatedSignal, SignalCounts, SignalDirection, SignalFilters, SortKey};

impl SignalFilters {
    /// Conjunction of every populated predicate. An empty filter matches all.
    pub fn matches(&self, signal: &AggregatedSignal) -> bool {
        if let Some(direction) = self.direction
            && signal.direction != direction
        {
            return false;
        }
        if let Some(timeframes) = &self.timeframes
            && !timeframes.contains(&signal.timeframe)
        {
            return false;
        }
        if let Some(min) = self.min_confidence
            && signal.confidence < min
        {
            return false;
        }
        if self.active_only && !signal.is_active {
            return false;
        }
        if let Some(types) = &self.types
            && !types.contains(&signal.signal_type)
        {
            return false;
        }
        true
    }
}

pub fn filter_signals(signals: &[AggregatedSignal], filters: &SignalFilters) -> Vec<AggregatedSignal> {
    signals
        .iter()
        .filter(|s| filters.matches(s))
        .cloned()
        .collect()
}

/// Stable sort, so equal keys keep their generation order.
pub fn sort_signals(signals: &mut [AggregatedSignal], key: SortKey) {
    match key {
        SortKey::Confidence => signals.sort_by(|a, b| b.confidence.cmp(&a.confidence)),
        SortKey::Timeframe => signals.sort_by_key(|s| s.timeframe),
        SortKey::Timestamp => signals.sort_by(|a, b| b.timestamp.cmp(&a.timestamp)),
        SortKey::Price => signals.sort_by(|a, b| b.price.total_cmp(&a.price)),
    }
}

pub fn count_signals(signals: &[AggregatedSignal]) -> SignalCounts {
    signals
        .iter()
        .fold(SignalCounts::default(), |mut counts, signal| {
            match signal.direction {
                SignalDirection::Long => counts.long += 1,
                SignalDirection::Short => counts.short += 1,
            }
            counts.total += 1;
            *counts.by_timeframe.entry(signal.timeframe).or_default() += 1;
            *counts.by_type.entry(signal.signal_type).or_default() += 1;
            counts
        })
}
