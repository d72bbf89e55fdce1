#![allow(clippy::unwrap_used)]

#[path = "../common/mod.rs"]
mod common;

mod default {
    mod status;
}

mod innodb {
    mod status;
}

mod replication {
    mod replica_status;
}
