use crate::cache::{FileCache, load_or_collect};
use crate::cli::actions::Action;
use crate::collectors::{config::CollectorConfig, mysql::MySqlSource, registry::CollectorRegistry};
use crate::exporter::{self, render};
use anyhow::{Context, Result};
use secrecy::SecretString;
use std::io::Write;
use std::path::Path;
use tracing::{info, instrument};

/// Handle the action
///
/// # Errors
///
/// Returns an error if the snapshot cannot be served or written to stdout
pub async fn handle(action: Action) -> Result<()> {
    let output = match action {
        Action::Fetch {
            dsn,
            namespace,
            cache_dir,
            ttl,
            format,
            metrics,
            collectors,
        } => {
            let cache = FileCache::open(&cache_dir).context("snapshot cache is unavailable")?;
            let registry =
                CollectorRegistry::new(&CollectorConfig::new().with_enabled(&collectors));
            info!(namespace, steps = ?registry.names(), "serving snapshot");

            let snapshot =
                load_or_collect(&cache, &namespace, ttl, || exporter::collect(&dsn, &registry))
                    .await?;

            render(&snapshot, &metrics, format)?
        }
        Action::Autoconf { dsn, cache_dir } => format!("{}\n", autoconf(&dsn, &cache_dir).await),
    };

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(output.as_bytes())?;
    stdout.flush()?;

    Ok(())
}

/// `yes` when both the cache directory and the database are usable,
/// `no (<reason>)` otherwise.
#[instrument(skip(dsn), level = "info")]
pub async fn autoconf(dsn: &SecretString, cache_dir: &Path) -> String {
    if let Err(e) = FileCache::open(cache_dir) {
        return format!("no ({e})");
    }

    let source = match MySqlSource::connect(dsn).await {
        Ok(source) => source,
        Err(e) => return format!("no ({e:#})"),
    };

    let answer = match source.ping().await {
        Ok(()) => "yes".to_string(),
        Err(e) => format!("no ({e:#})"),
    };
    source.close().await;

    answer
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn unreachable_dsn() -> SecretString {
        SecretString::from("mysql://root@127.0.0.1:1/mysql".to_string())
    }

    #[tokio::test]
    async fn test_autoconf_reports_unusable_cache() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("plain-file");
        std::fs::write(&file, b"").unwrap();

        let answer = autoconf(&unreachable_dsn(), &file.join("cache")).await;
        assert!(answer.starts_with("no (cache unavailable"), "{answer}");
    }

    #[tokio::test]
    async fn test_autoconf_reports_unreachable_database() {
        let dir = tempfile::tempdir().unwrap();

        let answer = autoconf(&unreachable_dsn(), dir.path()).await;
        assert!(answer.starts_with("no ("), "{answer}");
    }

    #[tokio::test]
    async fn test_fetch_fails_without_database() {
        let dir = tempfile::tempdir().unwrap();
        let action = Action::Fetch {
            dsn: unreachable_dsn(),
            namespace: "test".to_string(),
            cache_dir: dir.path().to_path_buf(),
            ttl: 60,
            format: exporter::Format::Plain,
            metrics: vec![],
            collectors: vec!["default".to_string()],
        };

        assert!(handle(action).await.is_err());
    }
}
