use super::super::common::{FakeSource, name_values};
use anyhow::Result;
use mariadb_snapshot::collectors::default::DefaultCollector;
use mariadb_snapshot::collectors::{Collector, Query};
use mariadb_snapshot::snapshot::{MetricValue, SnapshotBuilder};

#[tokio::test]
async fn test_status_and_variables_are_merged() -> Result<()> {
    let source = FakeSource::new()
        .with_rows(
            Query::GlobalStatus,
            name_values(&[("Slow_queries", "42"), ("Threads_connected", "3")]),
        )
        .with_rows(
            Query::GlobalVariables,
            name_values(&[
                ("max_connections", "151"),
                ("table_cache", "400"),
                ("version", "5.0.96-log"),
            ]),
        );

    let snapshot = DefaultCollector::new()
        .collect(&source, SnapshotBuilder::new())
        .await?
        .build();

    assert_eq!(snapshot.get("Slow_queries"), Some(&MetricValue::from(42)));
    assert_eq!(snapshot.get("Threads_connected"), Some(&MetricValue::from(3)));
    assert_eq!(snapshot.get("max_connections"), Some(&MetricValue::from(151)));
    assert_eq!(snapshot.get("table_open_cache"), Some(&MetricValue::from(400)));
    assert!(!snapshot.contains("table_cache"));
    assert_eq!(snapshot.get("version"), Some(&MetricValue::from("5.0.96-log")));
    assert_eq!(
        source.calls(),
        vec![Query::GlobalStatus, Query::GlobalVariables]
    );

    Ok(())
}

#[tokio::test]
async fn test_status_failure_is_fatal() {
    let source = FakeSource::new().with_error(Query::GlobalStatus, "Lost connection to server");

    let result = DefaultCollector::new()
        .collect(&source, SnapshotBuilder::new())
        .await;

    assert!(result.is_err());
    assert_eq!(source.calls(), vec![Query::GlobalStatus]);
}
