pub mod collectors;

use crate::exporter::Format;
use clap::{Arg, ArgAction, Command};
use std::path::PathBuf;

pub const DEFAULT_DSN: &str = "mysql://root@localhost:3306/mysql";

#[must_use]
pub fn new() -> Command {
    let cmd = Command::new(env!("CARGO_PKG_NAME"))
        .about("Cached MariaDB/InnoDB status snapshots for monitoring agent plugins")
        .version(env!("CARGO_PKG_VERSION"))
        .arg(
            Arg::new("dsn")
                .long("dsn")
                .help("Database connection string")
                .env("MARIADB_SNAPSHOT_DSN")
                .hide_env_values(true)
                .default_value(DEFAULT_DSN),
        )
        .arg(
            Arg::new("namespace")
                .long("namespace")
                .help("Cache namespace [default: mysql_<host>_<port> from the DSN]")
                .env("MARIADB_SNAPSHOT_NAMESPACE"),
        )
        .arg(
            Arg::new("cache-dir")
                .long("cache-dir")
                .help("Directory shared by all invocations for cached snapshots [default: $TMPDIR/mariadb_snapshot]")
                .env("MARIADB_SNAPSHOT_CACHE_DIR")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("ttl")
                .long("ttl")
                .help("Seconds a cached snapshot stays valid [default: 60]")
                .env("MARIADB_SNAPSHOT_TTL")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new("format")
                .long("format")
                .help("Output format")
                .env("MARIADB_SNAPSHOT_FORMAT")
                .default_value("plain")
                .value_parser(Format::VALUES),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Increase log verbosity (-v info, -vv debug, -vvv trace)")
                .action(ArgAction::Count),
        )
        .subcommand(
            Command::new("fetch")
                .about("Print metrics from the cached or a freshly collected snapshot (default)")
                .arg(
                    Arg::new("metrics")
                        .help("Metric names to print [default: all]")
                        .num_args(0..)
                        .action(ArgAction::Append),
                ),
        )
        .subcommand(
            Command::new("autoconf")
                .about("Report whether the database and cache directory are usable"),
        );

    collectors::add_collectors_args(cmd)
}
