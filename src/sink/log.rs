use crate::sampler::OutputMetricSet;
use crate::sink::{Sink, SinkError};
use futures::future::BoxFuture;
use tracing::info;

/// Writes every metric set as one structured log event.
#[derive(Clone, Default)]
pub struct LogSink;

impl LogSink {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// JSON body of the log event.
    ///
    /// # Errors
    ///
    /// Returns an error if the set cannot be serialized.
    pub fn render(metrics: &OutputMetricSet) -> Result<String, SinkError> {
        Ok(serde_json::to_string(metrics)?)
    }
}

impl Sink for LogSink {
    fn name(&self) -> &'static str {
        "log"
    }

    fn send<'a>(&'a self, metrics: &'a OutputMetricSet) -> BoxFuture<'a, Result<(), SinkError>> {
        Box::pin(async move {
            let body = Self::render(metrics)?;
            info!(target: "mariadb_poller::metrics", count = metrics.len(), metrics = %body, "poll metrics");
            Ok(())
        })
    }

    fn enabled_by_default(&self) -> bool {
        true
    }
}
