use std::collections::HashSet;

#[derive(Clone, Debug, Default)]
pub struct SinkConfig {
    pub enabled_sinks: HashSet<String>,
}

impl SinkConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_enabled(mut self, sinks: &[String]) -> Self {
        self.enabled_sinks = sinks.iter().cloned().collect();
        self
    }

    #[must_use]
    pub fn is_enabled(&self, name: &str) -> bool {
        self.enabled_sinks.contains(name)
    }
}
