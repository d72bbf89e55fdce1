use crate::snapshot::SnapshotBuilder;
use anyhow::Result;
use futures::future::BoxFuture;
use std::collections::HashMap;

#[macro_use]
mod register_macro;

pub mod source;
pub use source::{Query, QueryError, QuerySource, Row};

/// One step of a collection cycle.
///
/// A step takes the in-progress snapshot by value and hands it back with its
/// own metrics merged in, or fails the whole cycle.
pub trait Collector {
    fn name(&self) -> &'static str;

    fn collect<'a>(
        &'a self,
        source: &'a dyn QuerySource,
        builder: SnapshotBuilder,
    ) -> BoxFuture<'a, Result<SnapshotBuilder>>;

    fn enabled_by_default(&self) -> bool {
        false
    }
}

pub mod mysql;

// Registration order is the order steps run in.
register_collectors! {
    default => DefaultCollector,
    innodb => InnodbCollector,
    replication => ReplicationCollector,
}

pub mod config;
pub mod registry;
