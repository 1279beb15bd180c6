// Domain types and value objects
pub mod bar;
pub mod timeframe;

// Re-export commonly used types
pub use bar::{Bar, BarType, validate_series};
pub use timeframe::{DEFAULT_TIMEFRAMES, Timeframe};
