use super::selector::DerivedMetric;

/// Counter values and timestamp remembered between polls.
///
/// Every field starts unset. The poller owns the only instance and replaces
/// it as a whole after each successful fetch, so a failed poll never leaves
/// it half updated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SamplerState {
    pub last_queries: Option<u64>,
    pub last_bytes_in: Option<u64>,
    pub last_bytes_out: Option<u64>,
    pub last_reads: Option<u64>,
    pub last_writes: Option<u64>,
    pub last_sample_millis: Option<i64>,
}

impl SamplerState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Last value of the counter feeding `metric`.
    #[must_use]
    pub const fn counter(&self, metric: DerivedMetric) -> Option<u64> {
        match metric {
            DerivedMetric::QueriesPerSecond => self.last_queries,
            DerivedMetric::TrafficIn => self.last_bytes_in,
            DerivedMetric::TrafficOut => self.last_bytes_out,
            DerivedMetric::ReadsPerSecond => self.last_reads,
            DerivedMetric::WritesPerSecond => self.last_writes,
            DerivedMetric::BufferUsage => None,
        }
    }

    /// Store (or clear) the counter feeding `metric`. No-op for the ratio.
    pub const fn set_counter(&mut self, metric: DerivedMetric, value: Option<u64>) {
        match metric {
            DerivedMetric::QueriesPerSecond => self.last_queries = value,
            DerivedMetric::TrafficIn => self.last_bytes_in = value,
            DerivedMetric::TrafficOut => self.last_bytes_out = value,
            DerivedMetric::ReadsPerSecond => self.last_reads = value,
            DerivedMetric::WritesPerSecond => self.last_writes = value,
            DerivedMetric::BufferUsage => {}
        }
    }
}
