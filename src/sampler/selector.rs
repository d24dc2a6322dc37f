use super::ratio::BufferPageSnapshot;
use std::collections::HashSet;
use std::fmt;

/// Metrics derived from raw status counters rather than copied verbatim.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DerivedMetric {
    QueriesPerSecond,
    TrafficIn,
    TrafficOut,
    ReadsPerSecond,
    WritesPerSecond,
    BufferUsage,
}

impl DerivedMetric {
    pub const ALL: [Self; 6] = [
        Self::QueriesPerSecond,
        Self::TrafficIn,
        Self::TrafficOut,
        Self::ReadsPerSecond,
        Self::WritesPerSecond,
        Self::BufferUsage,
    ];

    /// The rate-based metrics, in the order their counters are kept.
    pub const RATES: [Self; 5] = [
        Self::QueriesPerSecond,
        Self::TrafficIn,
        Self::TrafficOut,
        Self::ReadsPerSecond,
        Self::WritesPerSecond,
    ];

    /// Output key, also the name enabling it in configuration.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::QueriesPerSecond => "queries_per_second",
            Self::TrafficIn => "traffic_in",
            Self::TrafficOut => "traffic_out",
            Self::ReadsPerSecond => "reads_per_second",
            Self::WritesPerSecond => "writes_per_second",
            Self::BufferUsage => "buffer_usage",
        }
    }

    /// Raw counter feeding a rate metric; `None` for the buffer ratio.
    #[must_use]
    pub const fn source_field(self) -> Option<&'static str> {
        match self {
            Self::QueriesPerSecond => Some("queries"),
            Self::TrafficIn => Some("bytes_received"),
            Self::TrafficOut => Some("bytes_sent"),
            Self::ReadsPerSecond => Some("innodb_data_reads"),
            Self::WritesPerSecond => Some("innodb_data_writes"),
            Self::BufferUsage => None,
        }
    }

    /// Traffic is reported in KiB per second.
    #[must_use]
    pub const fn divisor(self) -> u64 {
        match self {
            Self::TrafficIn | Self::TrafficOut => 1024,
            _ => 1,
        }
    }

}

impl fmt::Display for DerivedMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Where a derived-metric field is routed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Route {
    Rate(DerivedMetric),
    BufferPages,
}

/// How one raw status field participates in a poll. The two parts are
/// independent: a field can feed a derived metric and be passed through.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Classification {
    pub route: Option<Route>,
    pub passthrough: bool,
}

impl Classification {
    #[must_use]
    pub const fn is_ignored(&self) -> bool {
        self.route.is_none() && !self.passthrough
    }
}

/// Metric names enabled by configuration, lowercased. Built once at startup.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EnabledMetrics {
    names: HashSet<String>,
}

impl EnabledMetrics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, name: &str) -> Self {
        self.insert(name);
        self
    }

    pub fn insert(&mut self, name: &str) {
        let name = name.trim();
        if !name.is_empty() {
            self.names.insert(name.to_ascii_lowercase());
        }
    }

    pub fn remove(&mut self, name: &str) {
        self.names.remove(&name.trim().to_ascii_lowercase());
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(&name.to_ascii_lowercase())
    }

    #[must_use]
    pub fn is_derived_enabled(&self, metric: DerivedMetric) -> bool {
        self.names.contains(metric.key())
    }

    /// Enabled derived metrics, in declaration order.
    #[must_use]
    pub fn derived(&self) -> Vec<DerivedMetric> {
        DerivedMetric::ALL
            .into_iter()
            .filter(|metric| self.is_derived_enabled(*metric))
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Classify a lowercased raw status field.
    #[must_use]
    pub fn classify(&self, field: &str) -> Classification {
        let route = if BufferPageSnapshot::tracks(field) {
            self.is_derived_enabled(DerivedMetric::BufferUsage)
                .then_some(Route::BufferPages)
        } else {
            DerivedMetric::RATES
                .into_iter()
                .find(|metric| metric.source_field() == Some(field))
                .filter(|metric| self.is_derived_enabled(*metric))
                .map(Route::Rate)
        };

        Classification {
            route,
            passthrough: self.names.contains(field),
        }
    }
}

impl<S: AsRef<str>> FromIterator<S> for EnabledMetrics {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut enabled = Self::new();
        for name in iter {
            enabled.insert(name.as_ref());
        }
        enabled
    }
}
