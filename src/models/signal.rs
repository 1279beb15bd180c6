use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

use crate::analysis::fibonacci::FibStrategy;
use crate::domain::Timeframe;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display,
    EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SignalDirection {
    Long,
    Short,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SignalType {
    TrendAlignment,
    FibRejection,
    Confluence,
}

/// One trading signal. Regenerated on every aggregation run, never updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedSignal {
    pub id: String,
    pub timeframe: Timeframe,
    pub direction: SignalDirection,
    #[serde(rename = "type")]
    pub signal_type: SignalType,
    /// 0-100
    pub confidence: u8,
    pub price: f64,
    pub description: String,
    pub is_active: bool,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fib_level: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fib_strategy: Option<FibStrategy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confluence_count: Option<usize>,
}

/// Derived totals over a signal set; recomputed, never stored independently.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalCounts {
    pub long: usize,
    pub short: usize,
    pub total: usize,
    pub by_timeframe: BTreeMap<Timeframe, usize>,
    pub by_type: BTreeMap<SignalType, usize>,
}

/// Caller-supplied predicates; every `Some`/`true` field must hold.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SignalFilters {
    pub direction: Option<SignalDirection>,
    pub timeframes: Option<Vec<Timeframe>>,
    pub min_confidence: Option<u8>,
    pub active_only: bool,
    pub types: Option<Vec<SignalType>>,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SortKey {
    /// Highest confidence first
    #[default]
    Confidence,
    /// Higher timeframe first
    Timeframe,
    /// Newest first
    Timestamp,
    /// Highest price first
    Price,
}
