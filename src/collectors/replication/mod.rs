use crate::collectors::Collector;
use crate::collectors::source::{Query, QuerySource};
use crate::snapshot::{BINLOG_SIZE, SnapshotBuilder};
use anyhow::{Context, Result};
use futures::future::BoxFuture;
use tracing::{debug, info, instrument};

pub mod binlog;
pub mod replica_status;

/// Replication collector: binary log volume on a primary and the replica
/// status row on a replica. Either part may be absent on a given server.
#[derive(Clone, Default)]
pub struct ReplicationCollector;

impl ReplicationCollector {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Collector for ReplicationCollector {
    fn name(&self) -> &'static str {
        "replication"
    }

    #[instrument(skip(self, source, builder), level = "info", fields(collector = "replication", otel.kind = "internal"))]
    fn collect<'a>(
        &'a self,
        source: &'a dyn QuerySource,
        mut builder: SnapshotBuilder,
    ) -> BoxFuture<'a, Result<SnapshotBuilder>> {
        Box::pin(async move {
            match source.fetch(Query::BinaryLogs).await {
                Ok(rows) => {
                    let total = binlog::total_size(&rows);
                    debug!(logs = rows.len(), total = %total, "summed binary logs");
                    builder.set(BINLOG_SIZE, total);
                }
                Err(e) if e.is_binlog_disabled() => {
                    info!("binary logging is off");
                    builder.set(BINLOG_SIZE, 0);
                }
                Err(e) => return Err(e).context("failed to list binary logs"),
            }

            let rows = source
                .fetch(Query::ReplicaStatus)
                .await
                .context("failed to read replica status")?;

            if let Some(row) = rows.first() {
                replica_status::merge_replica_row(row, &mut builder);
            } else {
                debug!("not a replica");
            }

            Ok(builder)
        })
    }

    fn enabled_by_default(&self) -> bool {
        true
    }
}
