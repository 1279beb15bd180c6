//! Multi-timeframe orchestration: fetch, classify, detect, merge.
//!
//! Fetches run concurrently, one cancellation token per timeframe. Everything
//! after the fetch is pure and runs on the rayon pool, off the async executor.

use std::collections::HashMap;
use std::time::Instant;

use futures::future::join_all;
use itertools::Itertools;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::analysis::{
    combine_trend, count_signals, decide, detect_confluence, detect_rejections, filter_signals,
    sort_signals,
};
use crate::config::{AggregatorConfig, AnalysisConfig, PRINT_AGGREGATION_SUMMARY};
use crate::data::MarketDataProvider;
use crate::domain::{Bar, Timeframe};
use crate::error::{AnalysisError, Result};
use crate::models::{
    AggregatedSignal, SignalCounts, SignalDirection, SignalFilters, SignalType, SortKey,
    TimeframeTrend, TrendAlignment, TrendAssessment, TrendDirection,
};
use crate::utils::time_utils::epoch_ms_to_datetime;

/// What the caller wants from one aggregation run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AggregateRequest {
    /// Empty means the configured defaults
    pub timeframes: Vec<Timeframe>,
    pub filters: SignalFilters,
    pub sort_by: SortKey,
}

impl AggregateRequest {
    pub fn new(timeframes: Vec<Timeframe>) -> Self {
        Self {
            timeframes,
            ..Default::default()
        }
    }

    /// Requested timeframes, deduplicated, falling back to the defaults.
    pub fn resolve_timeframes(&self, config: &AggregatorConfig) -> Vec<Timeframe> {
        let source = if self.timeframes.is_empty() {
            &config.default_timeframes
        } else {
            &self.timeframes
        };
        source.iter().copied().unique().collect()
    }
}

/// Immutable result of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregationOutcome {
    /// Filtered and sorted
    pub signals: Vec<AggregatedSignal>,
    /// Over the full, unfiltered signal set
    pub counts: SignalCounts,
    pub partial_errors: Vec<Timeframe>,
    pub trends: Vec<TimeframeTrend>,
}

/// Parent token plus one child per timeframe.
///
/// Cancelling a child fails only that timeframe's fetch. Cancelling the parent
/// fails them all.
#[derive(Debug, Clone)]
pub struct FetchTokens {
    parent: CancellationToken,
    children: HashMap<Timeframe, CancellationToken>,
}

impl FetchTokens {
    pub fn new(parent: CancellationToken, timeframes: &[Timeframe]) -> Self {
        let children = timeframes
            .iter()
            .map(|tf| (*tf, parent.child_token()))
            .collect();
        Self { parent, children }
    }

    pub fn token(&self, timeframe: Timeframe) -> CancellationToken {
        self.children
            .get(&timeframe)
            .cloned()
            .unwrap_or_else(|| self.parent.child_token())
    }

    /// False when the timeframe is not part of this run.
    pub fn cancel(&self, timeframe: Timeframe) -> bool {
        match self.children.get(&timeframe) {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    pub fn cancel_all(&self) {
        self.parent.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.parent.is_cancelled()
    }
}

/// Raw inputs for one timeframe.
#[derive(Debug, Clone)]
pub struct TimeframeData {
    pub timeframe: Timeframe,
    pub bars: Vec<Bar>,
    pub assessment: Option<TrendAssessment>,
}

/// Fetches bars and the optional assessment, racing the timeframe's token.
pub async fn fetch_timeframe(
    provider: &dyn MarketDataProvider,
    symbol: &str,
    timeframe: Timeframe,
    token: CancellationToken,
) -> Result<TimeframeData> {
    let fetch = async {
        let bars = provider.fetch_bars(symbol, timeframe).await?;
        let assessment = provider.fetch_trend_assessment(symbol, timeframe).await?;
        anyhow::Ok(TimeframeData {
            timeframe,
            bars,
            assessment,
        })
    };

    tokio::select! {
        biased;
        _ = token.cancelled() => Err(AnalysisError::TimeframeFetchFailure {
            timeframe,
            reason: "cancelled".to_string(),
        }),
        result = fetch => result.map_err(|e| AnalysisError::TimeframeFetchFailure {
            timeframe,
            reason: format!("{:#}", e),
        }),
    }
}

/// The assessment oracle wins when present; otherwise classify locally.
pub fn resolve_trend(data: &TimeframeData, config: &AnalysisConfig) -> Result<TimeframeTrend> {
    match &data.assessment {
        Some(assessment) => TimeframeTrend::from_assessment(data.timeframe, assessment),
        None => combine_trend(data.timeframe, &data.bars, &config.trend),
    }
}

/// One `trend_alignment` signal when the trend is directional and confident.
pub fn trend_signal(
    trend: &TimeframeTrend,
    bars: &[Bar],
    config: &AggregatorConfig,
) -> Option<AggregatedSignal> {
    let direction = match trend.direction {
        TrendDirection::Up => SignalDirection::Long,
        TrendDirection::Down => SignalDirection::Short,
        TrendDirection::Neutral => return None,
    };
    // Gate on the unrounded score; 59.6 must not pass a 60 threshold
    let score = trend.strength * 100.0;
    if score < f64::from(config.trend_signal_min_confidence) {
        return None;
    }
    let confidence = trend.confidence();
    let last = bars.last()?;
    Some(AggregatedSignal {
        id: format!("{}-{}-{}", SignalType::TrendAlignment, trend.timeframe, direction),
        timeframe: trend.timeframe,
        direction,
        signal_type: SignalType::TrendAlignment,
        confidence,
        price: last.close,
        description: format!(
            "{} trend {:?} with {}% strength",
            trend.timeframe, trend.direction, confidence
        ),
        is_active: score >= f64::from(config.trend_signal_active_confidence),
        timestamp: epoch_ms_to_datetime(last.time),
        fib_level: None,
        fib_strategy: None,
        confluence_count: None,
    })
}

/// Trend plus every per-timeframe signal (trend alignment, then rejections).
pub fn analyze_timeframe(
    data: &TimeframeData,
    config: &AnalysisConfig,
) -> Result<(TimeframeTrend, Vec<AggregatedSignal>)> {
    let trend = resolve_trend(data, config)?;
    let mut signals: Vec<AggregatedSignal> =
        trend_signal(&trend, &data.bars, &config.aggregator).into_iter().collect();
    signals.extend(detect_rejections(
        data.timeframe,
        &data.bars,
        &trend,
        &config.rejection,
    )?);
    Ok((trend, signals))
}

/// `aggregate_with_tokens` under a fresh, uncancellable token set.
pub async fn aggregate(
    provider: &dyn MarketDataProvider,
    symbol: &str,
    request: &AggregateRequest,
    config: &AnalysisConfig,
) -> Result<AggregationOutcome> {
    let timeframes = request.resolve_timeframes(&config.aggregator);
    let tokens = FetchTokens::new(CancellationToken::new(), &timeframes);
    aggregate_with_tokens(provider, symbol, request, config, &tokens).await
}

/// Runs the whole pipeline for one symbol.
///
/// A failed or cancelled timeframe lands in `partial_errors`; the run fails
/// only when every requested timeframe failed.
pub async fn aggregate_with_tokens(
    provider: &dyn MarketDataProvider,
    symbol: &str,
    request: &AggregateRequest,
    config: &AnalysisConfig,
    tokens: &FetchTokens,
) -> Result<AggregationOutcome> {
    config.validate()?;
    let start = Instant::now();
    let timeframes = request.resolve_timeframes(&config.aggregator);

    let fetched = join_all(
        timeframes
            .iter()
            .map(|tf| fetch_timeframe(provider, symbol, *tf, tokens.token(*tf))),
    )
    .await;

    let mut failures: Vec<(Timeframe, String)> = Vec::new();
    let mut successes: Vec<TimeframeData> = Vec::with_capacity(fetched.len());
    for (tf, result) in timeframes.iter().zip(fetched) {
        match result {
            Ok(data) => successes.push(data),
            Err(e) => failures.push((*tf, e.to_string())),
        }
    }

    // par_iter keeps input order, so signals stay grouped by requested timeframe
    let analysis_config = config.clone();
    let analysed: Vec<(Timeframe, Result<(TimeframeTrend, Vec<AggregatedSignal>)>)> =
        tokio::task::spawn_blocking(move || {
            successes
                .par_iter()
                .map(|data| (data.timeframe, analyze_timeframe(data, &analysis_config)))
                .collect::<Vec<_>>()
        })
        .await
        .map_err(|e| AnalysisError::AnalysisTask(e.to_string()))?;

    let mut trends = Vec::with_capacity(analysed.len());
    let mut all_signals = Vec::new();
    for (tf, result) in analysed {
        match result {
            Ok((trend, signals)) => {
                trends.push(trend);
                all_signals.extend(signals);
            }
            Err(e) => failures.push((tf, e.to_string())),
        }
    }

    let partial_errors: Vec<Timeframe> = timeframes
        .iter()
        .copied()
        .filter(|tf| failures.iter().any(|(f, _)| f == tf))
        .collect();

    if !timeframes.is_empty() && partial_errors.len() == timeframes.len() {
        log::error!(
            "[{}] aggregation failed on every timeframe: {}",
            symbol,
            failures
                .iter()
                .map(|(tf, reason)| format!("{} ({})", tf, reason))
                .join("; ")
        );
        return Err(AnalysisError::TotalFetchFailure {
            timeframes: partial_errors,
        });
    }
    for (tf, reason) in &failures {
        log::warn!("[{}] skipping {}: {}", symbol, tf, reason);
    }

    let confluences = detect_confluence(&all_signals, &config.confluence)?;
    all_signals.extend(confluences);

    let counts = count_signals(&all_signals);
    let mut signals = filter_signals(&all_signals, &request.filters);
    sort_signals(&mut signals, request.sort_by);

    if PRINT_AGGREGATION_SUMMARY {
        log::info!(
            "[{}] {} signals ({} long / {} short), {} shown, {}/{} timeframes ok in {:.2}s",
            symbol,
            counts.total,
            counts.long,
            counts.short,
            signals.len(),
            timeframes.len() - partial_errors.len(),
            timeframes.len(),
            start.elapsed().as_secs_f64()
        );
    }

    Ok(AggregationOutcome {
        signals,
        counts,
        partial_errors,
        trends,
    })
}

/// Higher vs lower timeframe trade decision for one symbol.
pub async fn assess(
    provider: &dyn MarketDataProvider,
    symbol: &str,
    higher: Timeframe,
    lower: Timeframe,
    config: &AnalysisConfig,
) -> Result<TrendAlignment> {
    config.validate()?;
    if !higher.is_higher_than(lower) {
        return Err(AnalysisError::malformed(format!(
            "{} is not a higher timeframe than {}",
            higher, lower
        )));
    }

    let token = CancellationToken::new();
    let (higher_data, lower_data) = futures::join!(
        fetch_timeframe(provider, symbol, higher, token.child_token()),
        fetch_timeframe(provider, symbol, lower, token.child_token()),
    );
    let higher_trend = resolve_trend(&higher_data?, config)?;
    let lower_trend = resolve_trend(&lower_data?, config)?;

    let alignment = decide(&higher_trend, &lower_trend, &config.trade_action);
    log::info!(
        "[{}] {} {:?} / {} {:?} -> {:?} ({:.2})",
        symbol,
        higher,
        higher_trend.direction,
        lower,
        lower_trend.direction,
        alignment.action,
        alignment.confidence
    );
    Ok(alignment)
}
