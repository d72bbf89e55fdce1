use crate::collectors::Collector;
use crate::collectors::source::{Query, QuerySource, Row};
use crate::snapshot::{INNODB_DISABLED, SnapshotBuilder};
use anyhow::{Context, Result};
use futures::future::BoxFuture;
use tracing::{info, instrument};

pub mod counter;
pub mod sections;
pub mod status;

/// `InnoDB` engine status collector.
///
/// Runs `SHOW ENGINE INNODB STATUS` and scans the report into `ib_*` fields:
/// - semaphores and rw-lock spins
/// - transaction id, purge progress and history length
/// - pending and completed file I/O
/// - insert buffer activity
/// - LSN, flushed LSN and checkpoint
/// - buffer pool pages
///
/// Servers running without the engine get `_innodb_disabled = 1` instead.
#[derive(Clone, Default)]
pub struct InnodbCollector;

impl InnodbCollector {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

/// The report column, `Status` on every known server; third column otherwise.
fn report_text(row: &Row) -> Option<&str> {
    row.get("Status").or_else(|| row.value_at(2))
}

impl Collector for InnodbCollector {
    fn name(&self) -> &'static str {
        "innodb"
    }

    #[instrument(skip(self, source, builder), level = "info", fields(collector = "innodb", otel.kind = "internal"))]
    fn collect<'a>(
        &'a self,
        source: &'a dyn QuerySource,
        mut builder: SnapshotBuilder,
    ) -> BoxFuture<'a, Result<SnapshotBuilder>> {
        Box::pin(async move {
            let rows = match source.fetch(Query::EngineStatus).await {
                Ok(rows) => rows,
                Err(e) if e.is_innodb_disabled() => {
                    info!(reason = %e.message, "InnoDB is not available");
                    builder.flag(INNODB_DISABLED);
                    return Ok(builder);
                }
                Err(e) => return Err(e).context("failed to read engine status"),
            };

            let Some(report) = rows.first().and_then(report_text) else {
                return Ok(builder);
            };

            status::parse_status(report, builder).context("failed to parse engine status report")
        })
    }

    fn enabled_by_default(&self) -> bool {
        true
    }
}
