use crate::collectors::Collector;
use crate::collectors::source::{Query, QuerySource};
use crate::snapshot::SnapshotBuilder;
use anyhow::{Context, Result};
use futures::future::BoxFuture;
use tracing::{debug, instrument};

pub mod status;

/// `DefaultCollector` merges the server's global status counters and global
/// variables into the snapshot.
#[derive(Clone, Default)]
pub struct DefaultCollector;

impl DefaultCollector {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Collector for DefaultCollector {
    fn name(&self) -> &'static str {
        "default"
    }

    #[instrument(skip(self, source, builder), level = "info", fields(collector = "default", otel.kind = "internal"))]
    fn collect<'a>(
        &'a self,
        source: &'a dyn QuerySource,
        mut builder: SnapshotBuilder,
    ) -> BoxFuture<'a, Result<SnapshotBuilder>> {
        Box::pin(async move {
            for query in [Query::GlobalStatus, Query::GlobalVariables] {
                let rows = source
                    .fetch(query)
                    .await
                    .with_context(|| format!("failed to read {query}"))?;
                let merged = status::merge_rows(&rows, &mut builder);
                debug!(%query, merged, "merged server values");
            }

            Ok(builder)
        })
    }

    fn enabled_by_default(&self) -> bool {
        true
    }
}
