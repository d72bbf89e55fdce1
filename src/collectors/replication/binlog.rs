use crate::collectors::source::Row;
use num_bigint::BigUint;
use tracing::warn;

/// Total size of all binary log files listed by `SHOW BINARY LOGS`.
///
/// Sizes come from the `File_size` column, or the second column on servers
/// that name it differently. Rows without a usable size are skipped.
#[must_use]
pub fn total_size(rows: &[Row]) -> BigUint {
    rows.iter()
        .filter_map(|row| {
            let raw = row.get("File_size").or_else(|| row.value_at(1))?;
            let size = BigUint::parse_bytes(raw.trim().as_bytes(), 10);
            if size.is_none() {
                warn!(
                    log = row.get("Log_name").unwrap_or_default(),
                    size = raw,
                    "ignoring binary log with unreadable size"
                );
            }
            size
        })
        .sum()
}
