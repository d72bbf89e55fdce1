//! The query seam between collectors and the database connection.
//!
//! Collectors only need "run this query, get rows"; everything they consume is
//! decoded to optional text so fakes and the sqlx-backed source are
//! interchangeable.

use futures::future::BoxFuture;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

/// Queries issued during one collection cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Query {
    GlobalStatus,
    GlobalVariables,
    EngineStatus,
    BinaryLogs,
    ReplicaStatus,
}

impl Query {
    #[must_use]
    pub const fn sql(self) -> &'static str {
        match self {
            Self::GlobalStatus => "SHOW GLOBAL STATUS",
            Self::GlobalVariables => "SHOW GLOBAL VARIABLES",
            Self::EngineStatus => "SHOW ENGINE INNODB STATUS",
            Self::BinaryLogs => "SHOW BINARY LOGS",
            Self::ReplicaStatus => "SHOW SLAVE STATUS",
        }
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sql())
    }
}

/// One result row: ordered columns, each value either text or NULL.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Row {
    columns: Vec<(String, Option<String>)>,
}

impl Row {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a row from `(column, value)` pairs with no NULLs.
    #[must_use]
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        pairs
            .into_iter()
            .fold(Self::new(), |row, (name, value)| row.with(name, Some(value)))
    }

    #[must_use]
    pub fn with(mut self, name: &str, value: Option<&str>) -> Self {
        self.push(name, value.map(ToString::to_string));
        self
    }

    pub fn push(&mut self, name: impl Into<String>, value: Option<String>) {
        self.columns.push((name.into(), value));
    }

    /// Value of a named column; `None` when the column is absent or NULL.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.columns
            .iter()
            .find(|(column, _)| column == name)
            .and_then(|(_, value)| value.as_deref())
    }

    /// Value of the column at `index`; `None` when out of range or NULL.
    #[must_use]
    pub fn value_at(&self, index: usize) -> Option<&str> {
        self.columns
            .get(index)
            .and_then(|(_, value)| value.as_deref())
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.columns
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_deref()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

#[allow(clippy::expect_used)]
static INNODB_DISABLED_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)Unknown (?:storage|table) engine 'INNODB'|Cannot call SHOW INNODB STATUS because skip-innodb is defined",
    )
    .expect("valid innodb disabled regex")
});

#[allow(clippy::expect_used)]
static BINLOG_DISABLED_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)You are not using binary logging").expect("valid binlog disabled regex")
});

/// A failed query, carrying the server's message so known "feature not
/// available" signatures can be told apart from real failures.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{query} failed: {message}")]
pub struct QueryError {
    pub query: Query,
    pub code: Option<String>,
    pub message: String,
}

impl QueryError {
    #[must_use]
    pub fn new(query: Query, message: impl Into<String>) -> Self {
        Self {
            query,
            code: None,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// The storage engine is compiled out or disabled (`skip-innodb`).
    #[must_use]
    pub fn is_innodb_disabled(&self) -> bool {
        INNODB_DISABLED_RE.is_match(&self.message)
    }

    /// Binary logging is off, so there is no binlog listing.
    #[must_use]
    pub fn is_binlog_disabled(&self) -> bool {
        BINLOG_DISABLED_RE.is_match(&self.message)
    }
}

/// Something that can run a [`Query`] and hand back its rows.
pub trait QuerySource: Send + Sync {
    fn fetch<'a>(&'a self, query: Query) -> BoxFuture<'a, Result<Vec<Row>, QueryError>>;
}
