//! Two-column `Variable_name`/`Value` listings (`SHOW GLOBAL STATUS`,
//! `SHOW GLOBAL VARIABLES`).

use crate::collectors::source::Row;
use crate::snapshot::{MetricValue, SnapshotBuilder};
use tracing::debug;

/// Names from old servers mapped to the name current servers use.
const LEGACY_NAMES: &[(&str, &str)] = &[("table_cache", "table_open_cache")];

fn canonical_name(name: &str) -> &str {
    LEGACY_NAMES
        .iter()
        .find(|(legacy, _)| *legacy == name)
        .map_or(name, |(_, current)| *current)
}

fn name_value(row: &Row) -> Option<(&str, Option<&str>)> {
    let name = row.get("Variable_name").or_else(|| row.value_at(0))?;
    let value = row.get("Value").or_else(|| row.value_at(1));
    Some((name, value))
}

/// Merge name/value rows verbatim; returns how many rows were merged.
pub fn merge_rows(rows: &[Row], builder: &mut SnapshotBuilder) -> usize {
    let mut merged = 0;

    for (name, value) in rows.iter().filter_map(name_value) {
        let name = canonical_name(name);
        builder.set(name, MetricValue::from_column(value));
        merged += 1;
    }

    debug!(rows = merged, "merged name/value rows");
    merged
}
