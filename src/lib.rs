//! Cached `MariaDB`/`InnoDB` status snapshots.
//!
//! One collection cycle reads global status, global variables, the `InnoDB`
//! engine status report, the binary log listing and the replica status into a
//! flat [`snapshot::MetricSnapshot`]. Snapshots are cached on disk per
//! namespace so that many short-lived invocations share one collection.

pub mod cache;
pub mod cli;
pub mod collectors;
pub mod exporter;
pub mod snapshot;
