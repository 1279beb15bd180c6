//! Configuration module for the signal engine.

pub mod analysis;
pub mod debug;

// Re-export commonly used items
pub use analysis::{
    AggregatorConfig, AnalysisConfig, ConfluenceConfig, RejectionConfig, TradeActionConfig,
    TrendIndicatorConfig, TrendWeights,
};
pub use debug::{PRINT_AGGREGATION_SUMMARY, PRINT_REFRESH_EVENTS, PRINT_TREND_VOTES};
