//! Flat metric snapshot produced by one collection cycle.
//!
//! A [`SnapshotBuilder`] is threaded through every collection step and turned
//! into an immutable [`MetricSnapshot`] once all steps succeeded.

use num_bigint::{BigInt, BigUint, ParseBigIntError};
use num_traits::Zero;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Synthetic key set when the engine status command reports `InnoDB` as unavailable.
pub const INNODB_DISABLED: &str = "_innodb_disabled";

/// Synthetic key set when the engine status report was cut off upstream.
pub const INNODB_TRUNCATED: &str = "_innodb_truncated";

/// Sum of all binary log file sizes (0 when binary logging is off).
pub const BINLOG_SIZE: &str = "ma_binlog_size";

pub const RELAY_LOG_SPACE: &str = "relay_log_space";
pub const SLAVE_RUNNING: &str = "slave_running";
pub const SLAVE_STOPPED: &str = "slave_stopped";

/// A single metric value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "StoredValue", try_from = "StoredValue")]
pub enum MetricValue {
    Integer(BigInt),
    Text(String),
    /// The source reported NULL.
    Unknown,
}

impl MetricValue {
    /// Interpret a raw column value: integers become [`MetricValue::Integer`],
    /// anything else is kept verbatim as text, NULL becomes unknown.
    #[must_use]
    pub fn from_column(raw: Option<&str>) -> Self {
        match raw {
            None => Self::Unknown,
            Some(text) => text
                .trim()
                .parse::<BigInt>()
                .map_or_else(|_| Self::Text(text.to_string()), Self::Integer),
        }
    }

    #[must_use]
    pub fn as_integer(&self) -> Option<&BigInt> {
        match self {
            Self::Integer(value) => Some(value),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value),
            _ => None,
        }
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
            Self::Unknown => f.write_str("U"),
        }
    }
}

impl From<i32> for MetricValue {
    fn from(value: i32) -> Self {
        Self::Integer(BigInt::from(value))
    }
}

impl From<i64> for MetricValue {
    fn from(value: i64) -> Self {
        Self::Integer(BigInt::from(value))
    }
}

impl From<u64> for MetricValue {
    fn from(value: u64) -> Self {
        Self::Integer(BigInt::from(value))
    }
}

impl From<BigUint> for MetricValue {
    fn from(value: BigUint) -> Self {
        Self::Integer(BigInt::from(value))
    }
}

impl From<BigInt> for MetricValue {
    fn from(value: BigInt) -> Self {
        Self::Integer(value)
    }
}

impl From<&str> for MetricValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// Immutable name → value mapping, the unit of caching.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricSnapshot {
    metrics: BTreeMap<String, MetricValue>,
}

impl MetricSnapshot {
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&MetricValue> {
        self.metrics.get(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.metrics.contains_key(name)
    }

    /// Metrics in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &MetricValue)> {
        self.metrics.iter().map(|(k, v)| (k.as_str(), v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    /// Whether a synthetic flag (e.g. [`INNODB_TRUNCATED`]) is set to a non-zero value.
    #[must_use]
    pub fn flag(&self, name: &str) -> bool {
        self.get(name)
            .and_then(MetricValue::as_integer)
            .is_some_and(|v| !v.is_zero())
    }
}

/// In-progress snapshot, written by each collection step in turn.
#[derive(Clone, Debug, Default)]
pub struct SnapshotBuilder {
    metrics: BTreeMap<String, MetricValue>,
}

impl SnapshotBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder seeded with values for optional subsystems absent on some
    /// servers (non-replicas, binary logging off).
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut builder = Self::new();
        builder.set(RELAY_LOG_SPACE, 0);
        builder.set(SLAVE_RUNNING, 0);
        builder.set(SLAVE_STOPPED, 0);
        builder.set(BINLOG_SIZE, 0);
        builder
    }

    /// Insert or replace a metric.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<MetricValue>) {
        self.metrics.insert(name.into(), value.into());
    }

    /// Set a synthetic flag to 1.
    pub fn flag(&mut self, name: &str) {
        self.set(name, 1);
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&MetricValue> {
        self.metrics.get(name)
    }

    pub fn extend<I>(&mut self, values: I)
    where
        I: IntoIterator<Item = (String, MetricValue)>,
    {
        self.metrics.extend(values);
    }

    #[must_use]
    pub fn build(self) -> MetricSnapshot {
        MetricSnapshot {
            metrics: self.metrics,
        }
    }
}

/// Cached form of a [`MetricValue`]. Integers are stored as decimal strings
/// so the JSON stays readable and exact for values beyond 64 bits.
#[derive(Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
enum StoredValue {
    Integer(String),
    Text(String),
    Unknown,
}

impl From<MetricValue> for StoredValue {
    fn from(value: MetricValue) -> Self {
        match value {
            MetricValue::Integer(number) => Self::Integer(number.to_string()),
            MetricValue::Text(text) => Self::Text(text),
            MetricValue::Unknown => Self::Unknown,
        }
    }
}

impl TryFrom<StoredValue> for MetricValue {
    type Error = ParseBigIntError;

    fn try_from(value: StoredValue) -> Result<Self, Self::Error> {
        Ok(match value {
            StoredValue::Integer(digits) => Self::Integer(digits.parse()?),
            StoredValue::Text(text) => Self::Text(text),
            StoredValue::Unknown => Self::Unknown,
        })
    }
}
