use crate::collectors::{COLLECTOR_NAMES, Collector, all_factories};
use std::collections::HashSet;

/// Which collection steps run in a cycle.
#[derive(Clone, Debug, Default)]
pub struct CollectorConfig {
    pub enabled_collectors: HashSet<String>,
}

impl CollectorConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every collector that is enabled by default.
    #[must_use]
    pub fn defaults() -> Self {
        let factories = all_factories();
        let enabled = COLLECTOR_NAMES
            .iter()
            .filter(|name| factories.get(*name).is_some_and(|f| f().enabled_by_default()))
            .map(ToString::to_string)
            .collect();

        Self {
            enabled_collectors: enabled,
        }
    }

    #[must_use]
    pub fn with_enabled(mut self, collectors: &[String]) -> Self {
        self.enabled_collectors = collectors.iter().cloned().collect();
        self
    }

    #[must_use]
    pub fn is_enabled(&self, name: &str) -> bool {
        self.enabled_collectors.contains(name)
    }
}
