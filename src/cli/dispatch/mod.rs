use crate::{
    cache::{DEFAULT_TTL_SECONDS, FileCache},
    cli::actions::Action,
    collectors::{COLLECTOR_NAMES, Collector, all_factories, mysql::namespace_from_dsn},
    exporter::Format,
};
use anyhow::{Result, anyhow};
use clap::ArgMatches;
use secrecy::SecretString;
use std::path::PathBuf;
use tracing::debug;

/// # Errors
///
/// Returns an error if required arguments are missing or the DSN cannot be parsed
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    // Get the DSN or return an error
    let dsn = SecretString::from(
        matches
            .get_one::<String>("dsn")
            .cloned()
            .ok_or_else(|| anyhow!("DSN is required. Please provide it using the --dsn flag."))?,
    );

    let cache_dir = matches
        .get_one::<PathBuf>("cache-dir")
        .cloned()
        .unwrap_or_else(FileCache::default_dir);

    if matches.subcommand_name() == Some("autoconf") {
        return Ok(Action::Autoconf { dsn, cache_dir });
    }

    let namespace = match matches.get_one::<String>("namespace") {
        Some(namespace) => namespace.clone(),
        None => namespace_from_dsn(&dsn)?,
    };

    let ttl = matches
        .get_one::<u64>("ttl")
        .copied()
        .unwrap_or(DEFAULT_TTL_SECONDS);

    let format = matches
        .get_one::<String>("format")
        .map_or(Ok(Format::default()), |format| format.parse())?;

    let metrics = matches
        .subcommand_matches("fetch")
        .and_then(|sub| sub.get_many::<String>("metrics"))
        .map(|names| names.cloned().collect())
        .unwrap_or_default();

    let collectors = get_enabled_collectors(matches);

    debug!(namespace, cache_dir = %cache_dir.display(), ttl, ?collectors, "resolved configuration");

    Ok(Action::Fetch {
        dsn,
        namespace,
        cache_dir,
        ttl,
        format,
        metrics,
        collectors,
    })
}

#[must_use]
pub fn get_enabled_collectors(matches: &ArgMatches) -> Vec<String> {
    let factories = all_factories();

    COLLECTOR_NAMES
        .iter()
        .filter(|&name| {
            let enable_flag = format!("collector.{name}");
            let disable_flag = format!("no-collector.{name}");

            // If explicitly disabled, skip it
            if matches.get_flag(&disable_flag) {
                return false;
            }

            // If explicitly enabled, include it
            if matches.get_flag(&enable_flag) {
                return true;
            }

            // Otherwise, check the collector's default setting
            factories.get(name).is_some_and(|factory| {
                let collector = factory();
                collector.enabled_by_default()
            })
        })
        .map(|&name| name.to_string())
        .collect()
}
