//! Telemetry sinks receiving the metric set of every successful poll.

use crate::sampler::OutputMetricSet;
use ::prometheus::Registry;
use anyhow::Result;
use futures::future::BoxFuture;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

#[macro_use]
mod register_macro;

/// Failure to hand a metric set to a sink. Never affects sampler state.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("failed to serialize metrics: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to write metrics: {0}")]
    Io(#[from] std::io::Error),
    #[error("sink rejected metrics: {0}")]
    Rejected(String),
}

/// A sink shared between the registry and its concurrent deliveries.
pub type SharedSink = Arc<dyn Sink + Send + Sync>;

pub trait Sink {
    fn name(&self) -> &'static str;

    /// Register metrics with the prometheus registry.
    ///
    /// # Errors
    ///
    /// Returns an error if any metric fails to register.
    fn register_metrics(&self, _registry: &Registry) -> Result<()> {
        Ok(())
    }

    fn send<'a>(
        &'a self,
        metrics: &'a OutputMetricSet,
    ) -> BoxFuture<'a, std::result::Result<(), SinkError>>;

    fn enabled_by_default(&self) -> bool {
        false
    }
}

register_sinks! {
    log => LogSink,
    stdout => StdoutSink,
    prometheus => PrometheusSink,
}

pub mod config;
pub mod registry;
