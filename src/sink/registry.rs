use crate::sampler::OutputMetricSet;
use crate::sink::{SINK_NAMES, SharedSink, all_factories, config::SinkConfig};
use anyhow::Result;
use futures::stream::{FuturesUnordered, StreamExt};
use prometheus::Registry;
use tracing::{debug, info_span, instrument, warn};
use tracing_futures::Instrument as _;

/// The sinks enabled for this process, in declaration order.
#[derive(Clone, Default)]
pub struct SinkRegistry {
    sinks: Vec<SharedSink>,
}

impl SinkRegistry {
    #[must_use]
    pub fn new(config: &SinkConfig) -> Self {
        let factories = all_factories();

        SINK_NAMES
            .iter()
            .filter(|name| config.is_enabled(name))
            .filter_map(|name| factories.get(name).map(|factory| factory()))
            .fold(Self::default(), Self::with_sink)
    }

    /// Append `sink` after the ones already registered.
    #[must_use]
    pub fn with_sink(mut self, sink: SharedSink) -> Self {
        self.sinks.push(sink);
        self
    }

    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.sinks.iter().map(|sink| sink.name()).collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    ///
    /// # Errors
    ///
    /// Returns an error if any sink fails to register its metrics.
    #[instrument(skip(self, registry), level = "info", err)]
    pub fn register_metrics(&self, registry: &Registry) -> Result<()> {
        for sink in &self.sinks {
            let res = sink.register_metrics(registry);
            match res {
                Ok(()) => debug!(sink = sink.name(), "registered metrics"),
                Err(ref e) => {
                    warn!(sink = sink.name(), error = %e, "failed to register metrics");
                }
            }
            res?;
        }
        Ok(())
    }

    /// Hand `metrics` to every sink concurrently.
    ///
    /// Returns the number of sinks that failed; each failure is logged.
    #[instrument(skip(self, metrics), level = "debug", fields(metrics = metrics.len()))]
    pub async fn deliver(&self, metrics: &OutputMetricSet) -> usize {
        let mut tasks = FuturesUnordered::new();

        for sink in &self.sinks {
            let span = info_span!("sink.send", sink = %sink.name(), otel.kind = "producer");
            let name = sink.name();
            tasks.push(async move { (name, sink.send(metrics).await) }.instrument(span));
        }

        let mut failures = 0;
        while let Some((name, res)) = tasks.next().await {
            if let Err(e) = res {
                failures += 1;
                warn!(sink = name, error = %e, "failed to deliver metrics");
            }
        }

        failures
    }
}
