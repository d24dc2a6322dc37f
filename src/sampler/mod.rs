//! Turns raw `SHOW GLOBAL STATUS` rows into the metric set of one poll:
//! - per-second rates from cumulative counters (see [`rate`]),
//! - buffer pool usage from the page gauges of the same poll (see [`ratio`]),
//! - verbatim passthrough of explicitly enabled fields (see [`selector`]).
//!
//! The sampler itself holds no mutable state; the counters remembered
//! between polls live in a [`SamplerState`] that the caller owns.

pub mod rate;
pub mod ratio;
pub mod row;
pub mod selector;
pub mod state;

pub use rate::{ParseFailure, compute_rate, round2};
pub use ratio::{BufferPageSnapshot, compute_usage_ratio};
pub use row::{MetricValue, OutputMetricSet, StatusRow};
pub use selector::{Classification, DerivedMetric, EnabledMetrics, Route};
pub use state::SamplerState;

use rate::{compute_scaled_rate, parse_counter};
use tracing::{debug, instrument, trace};

#[derive(Clone, Debug, Default)]
pub struct Sampler {
    enabled: EnabledMetrics,
}

impl Sampler {
    #[must_use]
    pub const fn new(enabled: EnabledMetrics) -> Self {
        Self { enabled }
    }

    /// Process the rows of one successful fetch taken at `now_millis`.
    ///
    /// Returns the output metrics and the state to commit for the next poll.
    /// `previous` is never modified. An enabled counter that is missing or
    /// unparseable in `rows` comes back unset, so it bootstraps again on the
    /// next poll instead of spanning a wrong interval.
    #[must_use]
    #[instrument(skip(self, rows, previous), level = "debug", fields(rows = rows.len()))]
    pub fn process(
        &self,
        rows: &[StatusRow],
        previous: &SamplerState,
        now_millis: i64,
    ) -> (OutputMetricSet, SamplerState) {
        let mut output = OutputMetricSet::new();
        let mut next = SamplerState {
            last_sample_millis: Some(now_millis),
            ..SamplerState::default()
        };
        let mut pages = BufferPageSnapshot::default();

        for row in rows {
            let class = self.enabled.classify(&row.name);
            if class.is_ignored() {
                continue;
            }

            match class.route {
                Some(Route::Rate(metric)) => match parse_counter(&row.value) {
                    Ok(current) => {
                        if let Some(rate) = compute_scaled_rate(
                            previous.counter(metric),
                            current,
                            previous.last_sample_millis,
                            now_millis,
                            metric.divisor(),
                        ) {
                            output.insert(metric.key().to_string(), MetricValue::Float(rate));
                        } else {
                            trace!(metric = %metric, value = current, "no rate this poll");
                        }
                        next.set_counter(metric, Some(current));
                    }
                    Err(e) => {
                        debug!(metric = %metric, field = %row.name, value = %row.value, error = %e, "skipping counter");
                    }
                },
                Some(Route::BufferPages) => {
                    if let Err(e) = pages.record(&row.name, &row.value) {
                        debug!(field = %row.name, value = %row.value, error = %e, "skipping buffer pages");
                    }
                }
                None => {}
            }

            if class.passthrough {
                output.insert(row.name.clone(), MetricValue::coerce(&row.value));
            }
        }

        if self.enabled.is_derived_enabled(DerivedMetric::BufferUsage) {
            if let Some(usage) = pages.usage() {
                output.insert(
                    DerivedMetric::BufferUsage.key().to_string(),
                    MetricValue::Float(usage),
                );
            } else {
                debug!(?pages, "buffer usage not available this poll");
            }
        }

        (output, next)
    }
}
