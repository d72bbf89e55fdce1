use super::super::common::{FakeSource, binary_logs};
use anyhow::Result;
use mariadb_snapshot::collectors::replication::ReplicationCollector;
use mariadb_snapshot::collectors::{Collector, Query, Row};
use mariadb_snapshot::snapshot::{
    BINLOG_SIZE, MetricSnapshot, MetricValue, RELAY_LOG_SPACE, SLAVE_RUNNING, SLAVE_STOPPED,
    SnapshotBuilder,
};

async fn collect(source: &FakeSource) -> Result<MetricSnapshot> {
    let builder = ReplicationCollector::new()
        .collect(source, SnapshotBuilder::with_defaults())
        .await?;
    Ok(builder.build())
}

fn int(value: u64) -> MetricValue {
    MetricValue::from(value)
}

#[tokio::test]
async fn test_primary_without_replica_row() -> Result<()> {
    let source =
        FakeSource::new().with_rows(Query::BinaryLogs, binary_logs(&["100", "50"]));
    let snapshot = collect(&source).await?;

    assert_eq!(snapshot.get(BINLOG_SIZE), Some(&int(150)));
    assert_eq!(snapshot.get(SLAVE_RUNNING), Some(&int(0)));
    assert_eq!(snapshot.get(SLAVE_STOPPED), Some(&int(0)));
    assert_eq!(snapshot.get(RELAY_LOG_SPACE), Some(&int(0)));
    assert!(!snapshot.contains("Seconds_Behind_Master"));
    assert_eq!(source.calls(), vec![Query::BinaryLogs, Query::ReplicaStatus]);

    Ok(())
}

#[tokio::test]
async fn test_binary_logging_off_is_zero() -> Result<()> {
    let source =
        FakeSource::new().with_error(Query::BinaryLogs, "You are not using binary logging");
    let snapshot = collect(&source).await?;

    assert_eq!(snapshot.get(BINLOG_SIZE), Some(&int(0)));

    Ok(())
}

#[tokio::test]
async fn test_binlog_permission_error_is_fatal() {
    let source = FakeSource::new().with_error(
        Query::BinaryLogs,
        "Access denied; you need (at least one of) the SUPER, REPLICATION CLIENT privilege(s)",
    );

    assert!(collect(&source).await.is_err());
    assert_eq!(source.calls(), vec![Query::BinaryLogs]);
}

#[tokio::test]
async fn test_broken_replica() -> Result<()> {
    let row = Row::new()
        .with("Master_Host", Some("primary.example.com"))
        .with("Slave_IO_Running", Some("Yes"))
        .with("Slave_SQL_Running", Some("No"))
        .with("Seconds_Behind_Master", None)
        .with("Relay_Log_Space", Some("8192"))
        .with("Last_SQL_Error", Some("Duplicate entry '1' for key 'PRIMARY'"));
    let source = FakeSource::new().with_rows(Query::ReplicaStatus, vec![row]);
    let snapshot = collect(&source).await?;

    assert_eq!(snapshot.get("Slave_IO_Running"), Some(&int(0)));
    assert_eq!(snapshot.get("Slave_SQL_Running"), Some(&int(1)));
    assert_eq!(snapshot.get("Seconds_Behind_Master"), Some(&int(0)));
    assert_eq!(snapshot.get(RELAY_LOG_SPACE), Some(&int(8192)));
    assert_eq!(snapshot.get(SLAVE_RUNNING), Some(&int(0)));
    assert_eq!(snapshot.get(SLAVE_STOPPED), Some(&int(1)));
    assert_eq!(
        snapshot.get("Last_SQL_Error"),
        Some(&MetricValue::from("Duplicate entry '1' for key 'PRIMARY'"))
    );

    Ok(())
}
