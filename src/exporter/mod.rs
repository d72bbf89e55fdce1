use crate::collectors::{mysql::MySqlSource, registry::CollectorRegistry};
use crate::snapshot::MetricSnapshot;
use anyhow::Result;
use secrecy::SecretString;
use tracing::instrument;

pub mod render;
pub use render::{Format, render};

/// Open a database session, run one collection cycle and close the session,
/// whether or not the cycle succeeded.
///
/// # Errors
///
/// Returns an error if the connection or any collection step fails.
#[instrument(skip(dsn, registry), level = "info", err)]
pub async fn collect(dsn: &SecretString, registry: &CollectorRegistry) -> Result<MetricSnapshot> {
    let source = MySqlSource::connect(dsn).await?;
    let result = registry.collect(&source).await;
    source.close().await;
    result
}
