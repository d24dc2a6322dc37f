use crate::sampler::OutputMetricSet;
use crate::sink::{Sink, SinkError};
use futures::future::BoxFuture;
use tokio::io::AsyncWriteExt;

/// Prints every metric set as a single JSON line on stdout.
#[derive(Clone, Default)]
pub struct StdoutSink;

impl StdoutSink {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// One newline-terminated JSON object.
    ///
    /// # Errors
    ///
    /// Returns an error if the set cannot be serialized.
    pub fn line(metrics: &OutputMetricSet) -> Result<Vec<u8>, SinkError> {
        let mut line = serde_json::to_vec(metrics)?;
        line.push(b'\n');
        Ok(line)
    }
}

impl Sink for StdoutSink {
    fn name(&self) -> &'static str {
        "stdout"
    }

    fn send<'a>(&'a self, metrics: &'a OutputMetricSet) -> BoxFuture<'a, Result<(), SinkError>> {
        Box::pin(async move {
            let line = Self::line(metrics)?;
            let mut stdout = tokio::io::stdout();
            stdout.write_all(&line).await?;
            stdout.flush().await?;
            Ok(())
        })
    }
}
