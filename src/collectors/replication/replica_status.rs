use crate::collectors::source::Row;
use crate::snapshot::{MetricValue, RELAY_LOG_SPACE, SLAVE_RUNNING, SLAVE_STOPPED, SnapshotBuilder};
use tracing::debug;

/// Thread state columns rewritten so that any non-running state reads as 1.
const THREAD_COLUMNS: &[&str] = &["Slave_IO_Running", "Slave_SQL_Running"];

const LAG_COLUMN: &str = "Seconds_Behind_Master";

fn is_running(value: Option<&str>) -> bool {
    value == Some("Yes")
}

/// Merge the `SHOW SLAVE STATUS` row of a replica.
///
/// Every column is copied as reported, then:
/// - `Slave_IO_Running`/`Slave_SQL_Running` become 0 when exactly `Yes`, 1 otherwise
/// - an absent, NULL or empty `Seconds_Behind_Master` becomes 0
/// - `relay_log_space`, `slave_running` and `slave_stopped` are derived
pub fn merge_replica_row(row: &Row, builder: &mut SnapshotBuilder) {
    for (name, value) in row.columns() {
        builder.set(name, MetricValue::from_column(value));
    }

    for column in THREAD_COLUMNS {
        let stopped = !is_running(row.get(column));
        builder.set(*column, i32::from(stopped));
    }

    let lag = row.get(LAG_COLUMN).filter(|value| !value.trim().is_empty());
    builder.set(
        LAG_COLUMN,
        lag.map_or_else(|| MetricValue::from(0), |value| MetricValue::from_column(Some(value))),
    );

    if let Some(space) = row.get("Relay_Log_Space") {
        builder.set(RELAY_LOG_SPACE, MetricValue::from_column(Some(space)));
    }

    let running = is_running(row.get("Slave_SQL_Running"));
    builder.set(SLAVE_RUNNING, i32::from(running));
    builder.set(SLAVE_STOPPED, i32::from(!running));

    debug!(columns = row.len(), running, "merged replica status");
}
