//! The poll cycle: fetch a status snapshot, derive metrics, hand them to the
//! sinks. One cycle runs at a time; the loop awaits each cycle before the
//! next tick is taken.
//!
//! A hung server is bounded by the source's fetch timeout, not by the loop.

pub mod source;
pub mod stats;

pub use source::{MySqlStatusSource, STATUS_QUERY, StatusSnapshot, StatusSource};
pub use stats::{PollStats, PollTimer};

use crate::sampler::{OutputMetricSet, Sampler, SamplerState};
use crate::sink::registry::SinkRegistry;
use std::fmt;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, instrument, warn};

#[derive(Debug, Error)]
pub enum PollError {
    #[error("database connection failed: {0}")]
    Connection(#[source] sqlx::Error),
    #[error("status query failed: {0}")]
    Query(#[source] sqlx::Error),
    #[error("status query timed out after {0:?}")]
    Timeout(Duration),
}

impl PollError {
    /// Label used for the error counter.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Connection(_) => "connection",
            Self::Query(_) => "query",
            Self::Timeout(_) => "timeout",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PollPhase {
    #[default]
    Idle,
    Fetching,
    Processing,
    Emitting,
    Failed,
}

impl fmt::Display for PollPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Fetching => "fetching",
            Self::Processing => "processing",
            Self::Emitting => "emitting",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Rewrite every key as `prefix_key`. A missing or blank prefix leaves the
/// set unchanged.
#[must_use]
pub fn apply_prefix(metrics: OutputMetricSet, prefix: Option<&str>) -> OutputMetricSet {
    match prefix.map(str::trim).filter(|p| !p.is_empty()) {
        Some(prefix) => metrics
            .into_iter()
            .map(|(key, value)| (format!("{prefix}_{key}"), value))
            .collect(),
        None => metrics,
    }
}

/// Owns the source, the sampler state and the sinks for the whole process.
pub struct Poller<S> {
    source: S,
    sampler: Sampler,
    state: SamplerState,
    sinks: SinkRegistry,
    stats: PollStats,
    prefix: Option<String>,
    phase: PollPhase,
}

impl<S: StatusSource> Poller<S> {
    #[must_use]
    pub fn new(source: S, sampler: Sampler, sinks: SinkRegistry) -> Self {
        Self {
            source,
            sampler,
            state: SamplerState::new(),
            sinks,
            stats: PollStats::new(),
            prefix: None,
            phase: PollPhase::Idle,
        }
    }

    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    #[must_use]
    pub fn with_stats(mut self, stats: PollStats) -> Self {
        self.stats = stats;
        self
    }

    #[must_use]
    pub const fn state(&self) -> &SamplerState {
        &self.state
    }

    #[must_use]
    pub const fn phase(&self) -> PollPhase {
        self.phase
    }

    #[must_use]
    pub const fn stats(&self) -> &PollStats {
        &self.stats
    }

    /// Run one cycle. Rates are computed against the time the source stamped
    /// on the snapshot, so a slow reconnect does not skew them.
    ///
    /// Sink failures are logged and do not fail the cycle.
    ///
    /// # Errors
    ///
    /// Returns the fetch error; sampler state is unchanged in that case.
    #[instrument(skip(self), level = "info", err, fields(otel.kind = "internal"))]
    pub async fn poll(&mut self) -> Result<OutputMetricSet, PollError> {
        let timer = self.stats.start_poll();

        self.phase = PollPhase::Fetching;
        let snapshot = match self.source.fetch().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                self.phase = PollPhase::Failed;
                timer.error(e.kind());
                self.phase = PollPhase::Idle;
                return Err(e);
            }
        };

        self.phase = PollPhase::Processing;
        let (metrics, next) =
            self.sampler
                .process(&snapshot.rows, &self.state, snapshot.sampled_at_millis);
        self.state = next;

        self.phase = PollPhase::Emitting;
        let metrics = apply_prefix(metrics, self.prefix.as_deref());
        debug!(
            rows = snapshot.rows.len(),
            metrics = metrics.len(),
            sampled_at = snapshot.sampled_at_millis,
            "poll processed"
        );

        let failures = self.sinks.deliver(&metrics).await;
        if failures > 0 {
            warn!(failures, "some sinks failed to accept metrics");
        }

        timer.success(metrics.len());
        self.phase = PollPhase::Idle;

        Ok(metrics)
    }

    /// Poll every `period` until `shutdown` resolves, then release the source.
    ///
    /// Ticks missed while a slow poll was running are skipped, never queued.
    pub async fn run<F>(mut self, period: Duration, shutdown: F)
    where
        F: Future<Output = ()> + Send,
    {
        let period = period.max(Duration::from_millis(1));
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(period = ?period, sinks = ?self.sinks.names(), "poller started");

        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                () = &mut shutdown => break,
                _ = ticker.tick() => {
                    if let Err(e) = self.poll().await {
                        error!(error = %e, kind = e.kind(), "poll failed, retrying next tick");
                    }
                }
            }
        }

        self.source.close().await;
        info!("poller stopped");
    }
}
