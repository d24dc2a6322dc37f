//! Startup configuration: a properties file merged with CLI/env overrides.
//! Every problem found here is fatal.

pub mod dsn;
pub mod properties;

pub use properties::Properties;

use crate::sampler::{DerivedMetric, EnabledMetrics};
use secrecy::SecretString;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(10);
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed property on line {line}: {content:?}")]
    Malformed { line: usize, content: String },
    #[error("no database connection configured, set --dsn or jdbc.url")]
    MissingDsn,
    #[error("invalid DSN {0}")]
    InvalidDsn(String),
    #[error("prefix is not defined, set --prefix or pang.prefix")]
    MissingPrefix,
    #[error("invalid polling period {0:?}, expected milliseconds")]
    InvalidPeriod(String),
    #[error("polling interval must be greater than zero")]
    ZeroInterval,
}

/// Values supplied on the command line or through the environment. They
/// win over the properties file.
#[derive(Debug, Default)]
pub struct Overrides {
    pub dsn: Option<SecretString>,
    pub prefix: Option<String>,
    pub interval: Option<Duration>,
    pub query_timeout: Option<Duration>,
    pub enable: Vec<DerivedMetric>,
    pub disable: Vec<DerivedMetric>,
    pub fields: Vec<String>,
    pub sinks: Vec<String>,
}

#[derive(Debug)]
pub struct PollerConfig {
    pub dsn: SecretString,
    pub prefix: String,
    pub interval: Duration,
    pub query_timeout: Duration,
    pub enabled: EnabledMetrics,
    pub sinks: Vec<String>,
}

impl PollerConfig {
    /// Merge the optional properties file with `overrides` and validate.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` when the DSN or prefix is missing or invalid,
    /// or when the interval is zero.
    pub fn build(props: Option<&Properties>, overrides: Overrides) -> Result<Self, ConfigError> {
        let empty = Properties::default();
        let props = props.unwrap_or(&empty);

        let dsn = match overrides.dsn {
            Some(dsn) => dsn,
            None => {
                let url = props.get("jdbc.url").ok_or(ConfigError::MissingDsn)?;
                let password = props
                    .get("jdbc.password")
                    .map(|p| SecretString::from(p.to_string()));
                dsn::from_jdbc(url, props.get("jdbc.username"), password.as_ref())?
            }
        };
        // fail early on a DSN sqlx cannot use
        dsn::connect_options(&dsn)?;

        let prefix = overrides
            .prefix
            .as_deref()
            .or_else(|| props.prefix())
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .ok_or(ConfigError::MissingPrefix)?
            .to_string();

        let interval = match overrides.interval {
            Some(interval) => interval,
            None => props.period()?.unwrap_or(DEFAULT_INTERVAL),
        };
        if interval.is_zero() {
            return Err(ConfigError::ZeroInterval);
        }

        let mut enabled = props.enabled_metrics();
        for metric in &overrides.enable {
            enabled.insert(metric.key());
        }
        for metric in &overrides.disable {
            enabled.remove(metric.key());
        }
        for field in &overrides.fields {
            enabled.insert(field);
        }

        Ok(Self {
            dsn,
            prefix,
            interval,
            query_timeout: overrides.query_timeout.unwrap_or(DEFAULT_QUERY_TIMEOUT),
            enabled,
            sinks: overrides.sinks,
        })
    }
}
