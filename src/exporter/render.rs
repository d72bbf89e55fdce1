//! Snapshot output formats.

use crate::snapshot::{MetricSnapshot, MetricValue};
use anyhow::{Result, anyhow};
use num_traits::ToPrimitive;
use prometheus::{Encoder, Gauge, Opts, Registry, TextEncoder};
use std::str::FromStr;
use tracing::debug;

const PROMETHEUS_PREFIX: &str = "mariadb";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Format {
    /// `name value` lines, `U` for unknown values.
    #[default]
    Plain,
    /// Prometheus text exposition format.
    Prometheus,
}

impl Format {
    pub const VALUES: [&'static str; 2] = ["plain", "prometheus"];
}

impl FromStr for Format {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "plain" => Ok(Self::Plain),
            "prometheus" => Ok(Self::Prometheus),
            other => Err(anyhow!("unknown output format: {other}")),
        }
    }
}

/// Render `snapshot`; `names` restricts the plain format to those metrics, in
/// the order given.
///
/// # Errors
///
/// Returns an error if the prometheus encoder fails.
pub fn render(snapshot: &MetricSnapshot, names: &[String], format: Format) -> Result<String> {
    match format {
        Format::Plain => Ok(render_plain(snapshot, names)),
        Format::Prometheus => render_prometheus(snapshot),
    }
}

fn plain_line(name: &str, value: &MetricValue) -> String {
    format!("{name} {value}\n")
}

#[must_use]
pub fn render_plain(snapshot: &MetricSnapshot, names: &[String]) -> String {
    if names.is_empty() {
        return snapshot
            .iter()
            .map(|(name, value)| plain_line(name, value))
            .collect();
    }

    names
        .iter()
        .map(|name| plain_line(name, snapshot.get(name).unwrap_or(&MetricValue::Unknown)))
        .collect()
}

/// `mariadb_` plus the lowercased name with anything outside `[a-z0-9_]`
/// replaced by `_`.
#[must_use]
pub fn prometheus_name(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect();
    format!("{PROMETHEUS_PREFIX}_{sanitized}")
}

/// Every integer metric as a gauge. Text and unknown values are skipped.
///
/// # Errors
///
/// Returns an error if the encoder fails.
pub fn render_prometheus(snapshot: &MetricSnapshot) -> Result<String> {
    let registry = Registry::new();

    for (name, value) in snapshot.iter() {
        let Some(number) = value.as_integer().and_then(ToPrimitive::to_f64) else {
            continue;
        };

        let gauge = Gauge::with_opts(Opts::new(prometheus_name(name), format!("{name} from MariaDB")))?;
        gauge.set(number);

        if let Err(e) = registry.register(Box::new(gauge)) {
            // Names that only differ in case collapse to the same gauge.
            debug!(metric = name, error = %e, "skipping duplicate metric");
        }
    }

    let mut buffer = Vec::new();
    TextEncoder::new().encode(&registry.gather(), &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}
