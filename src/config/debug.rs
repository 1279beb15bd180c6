//! Debugging feature flags.
//!
//! Toggle individual diagnostics here. Only the one-line aggregation summary is
//! on by default; the per-vote and per-event traces stay off.

/// Emit a one-line summary (signal counts, failures, elapsed) after each aggregation run.
pub const PRINT_AGGREGATION_SUMMARY: bool = true;

/// Emit the per-indicator UP/DOWN votes behind every trend classification.
pub const PRINT_TREND_VOTES: bool = false;

/// Emit refresh engine events (run started, superseded, discarded).
pub const PRINT_REFRESH_EVENTS: bool = false;
