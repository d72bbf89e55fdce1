pub mod run;

use crate::exporter::Format;
use secrecy::SecretString;
use std::path::PathBuf;

#[derive(Debug)]
pub enum Action {
    Fetch {
        dsn: SecretString,
        namespace: String,
        cache_dir: PathBuf,
        ttl: u64,
        format: Format,
        metrics: Vec<String>,
        collectors: Vec<String>,
    },
    Autoconf {
        dsn: SecretString,
        cache_dir: PathBuf,
    },
}
