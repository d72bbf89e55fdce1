use super::super::common::{self, FakeSource};
use anyhow::Result;
use mariadb_snapshot::collectors::innodb::InnodbCollector;
use mariadb_snapshot::collectors::innodb::status::ParseError;
use mariadb_snapshot::collectors::{Collector, Query};
use mariadb_snapshot::snapshot::{
    INNODB_DISABLED, INNODB_TRUNCATED, MetricSnapshot, MetricValue, SnapshotBuilder,
};

async fn collect(source: &FakeSource) -> Result<MetricSnapshot> {
    let builder = InnodbCollector::new()
        .collect(source, SnapshotBuilder::new())
        .await?;
    Ok(builder.build())
}

fn int(value: u64) -> MetricValue {
    MetricValue::from(value)
}

#[tokio::test]
async fn test_full_report_extracts_every_section() -> Result<()> {
    let source = FakeSource::new().with_report(common::FULL_REPORT);
    let snapshot = collect(&source).await?;

    let expected: &[(&str, u64)] = &[
        ("ib_spin_waits", 100),
        ("ib_spin_rounds", 200),
        ("ib_os_waits", 5),
        ("ib_rw_shared_waits", 15),
        ("ib_rw_shared_os_waits", 7),
        ("ib_rw_excl_waits", 4),
        ("ib_rw_excl_os_waits", 3),
        ("ib_tnx", 0x5d3),
        ("ib_tnx_prg", 0x5d2),
        ("ib_tnx_hist", 17),
        ("ib_iop_aioread", 2),
        ("ib_iop_aiowrite", 1),
        ("ib_iop_ibuf_aio", 0),
        ("ib_iop_log", 3),
        ("ib_iop_sync", 4),
        ("ib_iop_flush_log", 5),
        ("ib_iop_flush_bpool", 6),
        ("ib_io_read", 1046),
        ("ib_io_write", 250),
        ("ib_io_fsync", 120),
        ("ib_ibuf_size", 1),
        ("ib_ibuf_free_len", 0),
        ("ib_ibuf_seg_size", 2),
        ("ib_ibuf_merges", 8),
        ("ib_ibuf_inserts", 10),
        ("ib_ibuf_merged_rec", 15),
        ("ib_log_written", (1 << 32) + 47_632_985),
        ("ib_log_flush", (1 << 32) + 47_632_985),
        ("ib_log_checkpoint", (1 << 32) + 47_632_973),
        ("ib_io_log", 28),
        ("ib_bpool_size", 8112),
        ("ib_bpool_free", 7003),
        ("ib_bpool_dbpages", 1109),
        ("ib_bpool_modpages", 12),
        ("ib_bpool_read", 1046),
        ("ib_bpool_created", 142),
        ("ib_bpool_written", 250),
    ];

    for (name, value) in expected {
        assert_eq!(snapshot.get(name), Some(&int(*value)), "{name}");
    }
    assert_eq!(snapshot.len(), expected.len());
    assert!(!snapshot.contains(INNODB_TRUNCATED));
    assert_eq!(source.calls(), vec![Query::EngineStatus]);

    Ok(())
}

#[tokio::test]
async fn test_line_order_and_unknown_lines_do_not_matter() -> Result<()> {
    let report = common::report(&[(
        "LOG",
        "Some future line 1 2 3\n\
         Last checkpoint at  1F\n\
         unrelated: 42\n\
         Log flushed up to   2F\n\
         Log sequence number 3F\n",
    )]);
    let snapshot = collect(&FakeSource::new().with_report(&report)).await?;

    assert_eq!(snapshot.get("ib_log_written"), Some(&int(0x3f)));
    assert_eq!(snapshot.get("ib_log_flush"), Some(&int(0x2f)));
    assert_eq!(snapshot.get("ib_log_checkpoint"), Some(&int(0x1f)));
    assert_eq!(snapshot.len(), 3);

    Ok(())
}

#[tokio::test]
async fn test_truncated_report_sets_flag() -> Result<()> {
    let cut = common::FULL_REPORT
        .find("Pages read 1046")
        .unwrap();
    let report = common::FULL_REPORT.get(..cut).unwrap();
    let snapshot = collect(&FakeSource::new().with_report(report)).await?;

    assert!(snapshot.flag(INNODB_TRUNCATED));
    // sections before the cut are complete
    assert_eq!(snapshot.get("ib_tnx_hist"), Some(&int(17)));
    assert!(snapshot.contains("ib_log_written"));
    // the cut section contributes nothing
    assert!(!snapshot.contains("ib_bpool_size"));

    Ok(())
}

#[tokio::test]
async fn test_unknown_section_fails_collection() {
    let report = common::report(&[
        ("LOG", "Log sequence number 0 5\n"),
        ("BRAND NEW SECTION", "value 1\n"),
    ]);
    let err = collect(&FakeSource::new().with_report(&report))
        .await
        .unwrap_err();

    assert_eq!(
        err.downcast_ref::<ParseError>(),
        Some(&ParseError::UnknownSection {
            name: "BRAND NEW SECTION".to_string()
        })
    );
}

#[tokio::test]
async fn test_disabled_engine_sets_flag() -> Result<()> {
    for message in [
        "Unknown storage engine 'InnoDB'",
        "Cannot call SHOW INNODB STATUS because skip-innodb is defined",
    ] {
        let source = FakeSource::new().with_error(Query::EngineStatus, message);
        let snapshot = collect(&source).await?;

        assert!(snapshot.flag(INNODB_DISABLED));
        assert!(snapshot.iter().all(|(name, _)| !name.starts_with("ib_")));
    }

    Ok(())
}

#[tokio::test]
async fn test_other_query_errors_are_fatal() {
    let source = FakeSource::new().with_error(
        Query::EngineStatus,
        "Access denied; you need (at least one of) the PROCESS privilege(s) for this operation",
    );

    let err = collect(&source).await.unwrap_err();
    assert!(format!("{err:#}").contains("Access denied"));
}
