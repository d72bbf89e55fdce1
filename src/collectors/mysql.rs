//! [`QuerySource`] backed by a one-connection sqlx pool.

use crate::collectors::source::{Query, QueryError, QuerySource, Row};
use anyhow::{Context, Result, anyhow};
use futures::future::BoxFuture;
use secrecy::{ExposeSecret, SecretString};
use sqlx::mysql::{MySqlConnectOptions, MySqlPoolOptions, MySqlRow};
use sqlx::{Column, MySqlPool, Row as _};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info_span, instrument};
use tracing_futures::Instrument as _;
use url::Url;

const DEFAULT_PORT: u16 = 3306;

/// Database session for one collection cycle.
pub struct MySqlSource {
    pool: MySqlPool,
}

impl MySqlSource {
    /// Open the session.
    ///
    /// # Errors
    ///
    /// Returns an error if the DSN is invalid or the server cannot be reached.
    #[instrument(skip(dsn), level = "info", err)]
    pub async fn connect(dsn: &SecretString) -> Result<Self> {
        let opts = MySqlConnectOptions::from_str(dsn.expose_secret())
            .context("invalid DSN")?;

        let pool = MySqlPoolOptions::new()
            .max_connections(1)
            .min_connections(0)
            .acquire_timeout(Duration::from_secs(5))
            .connect_with(opts)
            .await
            .context("failed to connect to database")?;

        Ok(Self { pool })
    }

    /// Round trip to the server.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn ping(&self) -> Result<()> {
        let span = info_span!(
            "db.query",
            db.system = "mysql",
            db.operation = "SELECT",
            db.statement = "SELECT 1",
            otel.kind = "client"
        );

        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .instrument(span)
            .await
            .context("ping failed")?;
        Ok(())
    }

    pub async fn close(self) {
        self.pool.close().await;
        debug!("database session closed");
    }
}

impl QuerySource for MySqlSource {
    fn fetch<'a>(&'a self, query: Query) -> BoxFuture<'a, Result<Vec<Row>, QueryError>> {
        Box::pin(async move {
            let span = info_span!(
                "db.query",
                db.system = "mysql",
                db.operation = "SHOW",
                db.statement = query.sql(),
                otel.kind = "client"
            );

            let rows = sqlx::query(query.sql())
                .fetch_all(&self.pool)
                .instrument(span)
                .await
                .map_err(|e| query_error(query, &e))?;

            debug!(%query, rows = rows.len(), "query finished");
            Ok(rows.iter().map(decode_row).collect())
        })
    }
}

fn query_error(query: Query, err: &sqlx::Error) -> QueryError {
    match err.as_database_error() {
        Some(db) => {
            let error = QueryError::new(query, db.message());
            match db.code() {
                Some(code) => error.with_code(code),
                None => error,
            }
        }
        None => QueryError::new(query, err.to_string()),
    }
}

fn decode_row(row: &MySqlRow) -> Row {
    let mut decoded = Row::new();
    for column in row.columns() {
        decoded.push(column.name(), column_text(row, column.ordinal()));
    }
    decoded
}

/// Column value as text regardless of the wire type; `None` for NULL.
fn column_text(row: &MySqlRow, index: usize) -> Option<String> {
    if let Ok(value) = row.try_get::<Option<String>, _>(index) {
        return value;
    }
    if let Ok(value) = row.try_get::<Option<u64>, _>(index) {
        return value.map(|v| v.to_string());
    }
    if let Ok(value) = row.try_get::<Option<i64>, _>(index) {
        return value.map(|v| v.to_string());
    }
    if let Ok(value) = row.try_get::<Option<f64>, _>(index) {
        return value.map(|v| v.to_string());
    }
    row.try_get::<Option<Vec<u8>>, _>(index)
        .ok()
        .flatten()
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
}

/// Default cache namespace for a DSN: `mysql_<host>_<port>`.
///
/// # Errors
///
/// Returns an error if the DSN is not a URL.
pub fn namespace_from_dsn(dsn: &SecretString) -> Result<String> {
    let url = Url::parse(dsn.expose_secret()).map_err(|e| anyhow!("invalid DSN: {e}"))?;
    let host = url
        .host_str()
        .filter(|host| !host.is_empty())
        .unwrap_or("localhost");
    let port = url.port().unwrap_or(DEFAULT_PORT);

    Ok(format!("mysql_{host}_{port}"))
}
