use anyhow::Result;
use prometheus::{CounterVec, Histogram, HistogramOpts, IntGauge, Opts, Registry};
use std::time::Instant;

/// Self-monitoring of the poll loop.
#[derive(Clone)]
pub struct PollStats {
    poll_duration_seconds: Histogram,
    poll_errors_total: CounterVec,
    last_poll_timestamp: IntGauge,
    last_poll_success: IntGauge,
    polls_total: IntGauge,
    metrics_emitted: IntGauge,
}

impl Default for PollStats {
    fn default() -> Self {
        Self::new()
    }
}

impl PollStats {
    #[must_use]
    #[allow(clippy::expect_used)]
    ///
    /// # Panics
    ///
    /// Panics if metric creation fails.
    pub fn new() -> Self {
        let poll_duration_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "mariadb_poller_poll_duration_seconds",
                "Time spent fetching, processing and emitting one poll",
            )
            .buckets(vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
        )
        .expect("mariadb_poller_poll_duration_seconds");

        let poll_errors_total = CounterVec::new(
            Opts::new(
                "mariadb_poller_poll_errors_total",
                "Total number of failed polls by failure kind",
            ),
            &["stage"],
        )
        .expect("mariadb_poller_poll_errors_total");

        let last_poll_timestamp = IntGauge::with_opts(Opts::new(
            "mariadb_poller_last_poll_timestamp_seconds",
            "Unix timestamp of the last poll attempt",
        ))
        .expect("mariadb_poller_last_poll_timestamp_seconds");

        let last_poll_success = IntGauge::with_opts(Opts::new(
            "mariadb_poller_last_poll_success",
            "Whether the last poll was successful (1=success, 0=failure)",
        ))
        .expect("mariadb_poller_last_poll_success");

        let polls_total = IntGauge::with_opts(Opts::new(
            "mariadb_poller_polls_total",
            "Total number of polls attempted since start",
        ))
        .expect("mariadb_poller_polls_total");

        let metrics_emitted = IntGauge::with_opts(Opts::new(
            "mariadb_poller_metrics_emitted",
            "Number of metrics handed to the sinks by the last successful poll",
        ))
        .expect("mariadb_poller_metrics_emitted");

        Self {
            poll_duration_seconds,
            poll_errors_total,
            last_poll_timestamp,
            last_poll_success,
            polls_total,
            metrics_emitted,
        }
    }

    #[must_use]
    pub fn start_poll(&self) -> PollTimer {
        self.polls_total.inc();
        self.last_poll_timestamp.set(chrono::Utc::now().timestamp());

        PollTimer {
            start: Instant::now(),
            stats: self.clone(),
        }
    }

    ///
    /// # Errors
    ///
    /// Returns an error if metric registration fails.
    pub fn register(&self, registry: &Registry) -> Result<()> {
        registry.register(Box::new(self.poll_duration_seconds.clone()))?;
        registry.register(Box::new(self.poll_errors_total.clone()))?;
        registry.register(Box::new(self.last_poll_timestamp.clone()))?;
        registry.register(Box::new(self.last_poll_success.clone()))?;
        registry.register(Box::new(self.polls_total.clone()))?;
        registry.register(Box::new(self.metrics_emitted.clone()))?;
        Ok(())
    }

    #[must_use]
    pub fn polls(&self) -> i64 {
        self.polls_total.get()
    }

    #[must_use]
    pub fn errors(&self, stage: &str) -> f64 {
        self.poll_errors_total.with_label_values(&[stage]).get()
    }
}

/// Measures one poll; consume it with [`PollTimer::success`] or [`PollTimer::error`].
pub struct PollTimer {
    start: Instant,
    stats: PollStats,
}

impl PollTimer {
    pub fn success(self, metrics: usize) {
        let duration = self.start.elapsed().as_secs_f64();
        self.stats.poll_duration_seconds.observe(duration);
        self.stats.last_poll_success.set(1);
        self.stats
            .metrics_emitted
            .set(i64::try_from(metrics).unwrap_or(i64::MAX));
    }

    pub fn error(self, stage: &str) {
        self.stats
            .poll_errors_total
            .with_label_values(&[stage])
            .inc();
        self.stats.last_poll_success.set(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poll_stats_registers_without_error() {
        let stats = PollStats::new();
        let registry = Registry::new();
        assert!(stats.register(&registry).is_ok());
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    #[allow(clippy::expect_used)]
    fn test_poll_timer_records_success() {
        let stats = PollStats::new();
        let registry = Registry::new();
        stats.register(&registry).unwrap();

        stats.start_poll().success(7);

        assert_eq!(stats.polls(), 1);
        assert_eq!(stats.metrics_emitted.get(), 7);
        assert_eq!(stats.last_poll_success.get(), 1);

        let families = registry.gather();
        let duration = families
            .iter()
            .find(|m| m.name() == "mariadb_poller_poll_duration_seconds")
            .expect("duration metric should exist");
        assert!(!duration.get_metric().is_empty());
    }

    #[test]
    #[allow(clippy::float_cmp)]
    fn test_poll_timer_records_error() {
        let stats = PollStats::new();

        stats.start_poll().success(1);
        stats.start_poll().error("query");

        assert_eq!(stats.polls(), 2);
        assert_eq!(stats.errors("query"), 1.0);
        assert_eq!(stats.errors("connection"), 0.0);
        assert_eq!(stats.last_poll_success.get(), 0);
    }
}
