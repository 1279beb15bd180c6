// Value objects produced by the analysis core.
// Pure data, independent of any presentation layer.

pub mod signal;
pub mod trend;

// Re-export key types for convenience
pub use signal::{
    AggregatedSignal, SignalCounts, SignalDirection, SignalFilters, SignalType, SortKey,
};
pub use trend::{
    IndicatorReading, TimeframeTrend, TradeAction, TrendAlignment, TrendAssessment,
    TrendDirection,
};
