use crate::sampler::OutputMetricSet;
use crate::sink::{Sink, SinkError};
use anyhow::Result;
use futures::future::BoxFuture;
use prometheus::{GaugeVec, Opts, Registry};
use tracing::trace;

/// Publishes the latest metric set as `mariadb_poller_metric{name="..."}`.
///
/// The family is reset on every send so keys missing from the latest poll
/// disappear. Text values have no gauge representation and are skipped.
#[derive(Clone)]
pub struct PrometheusSink {
    metric: GaugeVec,
}

impl Default for PrometheusSink {
    fn default() -> Self {
        Self::new()
    }
}

impl PrometheusSink {
    #[must_use]
    #[allow(clippy::expect_used)]
    /// # Panics
    ///
    /// Panics if metric creation fails (static names, should never happen).
    pub fn new() -> Self {
        let metric = GaugeVec::new(
            Opts::new(
                "mariadb_poller_metric",
                "Latest value of each metric produced by the poller",
            ),
            &["name"],
        )
        .expect("mariadb_poller_metric");

        Self { metric }
    }

    fn publish(&self, metrics: &OutputMetricSet) {
        self.metric.reset();

        for (name, value) in metrics {
            if let Some(v) = value.as_f64() {
                self.metric.with_label_values(&[name.as_str()]).set(v);
            } else {
                trace!(metric = %name, value = %value, "skipping non-numeric metric");
            }
        }
    }
}

impl Sink for PrometheusSink {
    fn name(&self) -> &'static str {
        "prometheus"
    }

    fn register_metrics(&self, registry: &Registry) -> Result<()> {
        registry.register(Box::new(self.metric.clone()))?;
        Ok(())
    }

    fn send<'a>(
        &'a self,
        metrics: &'a OutputMetricSet,
    ) -> BoxFuture<'a, std::result::Result<(), SinkError>> {
        Box::pin(async move {
            self.publish(metrics);
            Ok(())
        })
    }

    fn enabled_by_default(&self) -> bool {
        true
    }
}
