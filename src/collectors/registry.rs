use crate::collectors::{
    COLLECTOR_NAMES, Collector, CollectorType, QuerySource, all_factories,
    config::CollectorConfig,
};
use crate::snapshot::{MetricSnapshot, SnapshotBuilder};
use anyhow::{Context, Result};
use tracing::{debug, info_span, instrument};
use tracing_futures::Instrument as _;

/// Enabled collection steps, in registration order.
#[derive(Clone)]
pub struct CollectorRegistry {
    collectors: Vec<CollectorType>,
}

impl CollectorRegistry {
    #[must_use]
    pub fn new(config: &CollectorConfig) -> Self {
        let factories = all_factories();

        let collectors = COLLECTOR_NAMES
            .iter()
            .filter(|name| config.is_enabled(name))
            .filter_map(|name| factories.get(name).map(|factory| factory()))
            .collect();

        Self { collectors }
    }

    /// Names of the steps that will run, in order.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.collectors.iter().map(Collector::name).collect()
    }

    /// Run one collection cycle.
    ///
    /// Steps run one after another on a builder seeded with the defaults; the
    /// snapshot is only built once every step succeeded.
    ///
    /// # Errors
    ///
    /// Returns the first step failure; nothing collected so far is kept.
    #[instrument(skip(self, source), level = "info", err)]
    pub async fn collect(&self, source: &dyn QuerySource) -> Result<MetricSnapshot> {
        let mut builder = SnapshotBuilder::with_defaults();

        for collector in &self.collectors {
            let name = collector.name();
            let span = info_span!("collector.collect", collector = %name, otel.kind = "internal");

            builder = collector
                .collect(source, builder)
                .instrument(span)
                .await
                .with_context(|| format!("{name} collector failed"))?;

            debug!(collector = name, "collector finished");
        }

        Ok(builder.build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_keeps_step_order() {
        let registry = CollectorRegistry::new(&CollectorConfig::defaults());
        assert_eq!(registry.names(), vec!["default", "innodb", "replication"]);
    }

    #[test]
    fn test_registry_skips_disabled_steps() {
        let config = CollectorConfig::new()
            .with_enabled(&["replication".to_string(), "default".to_string()]);
        let registry = CollectorRegistry::new(&config);
        assert_eq!(registry.names(), vec!["default", "replication"]);
    }
}
