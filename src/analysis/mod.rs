// Signal analysis algorithms over immutable bar series
pub mod confluence;
pub mod fibonacci;
pub mod pivots;
pub mod rejection;
pub mod signal_ops;
pub mod trade_action;
pub mod trend_combiner;

// Re-export commonly used types
pub use confluence::detect_confluence;
pub use fibonacci::{FibDirection, FibStrategy, FibonacciLevel, levels, projected_levels};
pub use pivots::{PivotPoint, PivotType, detect_pivots};
pub use rejection::detect_rejections;
pub use signal_ops::{count_signals, filter_signals, sort_signals};
pub use trade_action::decide;
pub use trend_combiner::combine_trend;
