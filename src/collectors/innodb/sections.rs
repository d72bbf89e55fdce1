//! Line matchers for the sections of `SHOW ENGINE INNODB STATUS`.
//!
//! Every matcher is an ordered table of anchored patterns. The scanner offers
//! the text at its current position to each rule in turn; the first rule that
//! matches extracts its fields and consumes the matched text. Lines no rule
//! recognizes are skipped by the scanner, so the order of lines inside a
//! section does not matter and new, unmapped lines are harmless.

use super::counter::reconstruct;
use crate::snapshot::{MetricValue, SnapshotBuilder};
use num_bigint::BigUint;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tracing::debug;

/// Fields extracted from one section, committed to the snapshot only once the
/// section is known to be complete.
#[derive(Debug, Default)]
pub struct Fields {
    values: Vec<(&'static str, MetricValue)>,
}

impl Fields {
    pub fn set(&mut self, name: &'static str, value: impl Into<MetricValue>) {
        let value = value.into();
        debug!(field = name, value = %value, "parsed engine status field");

        if let Some(slot) = self.values.iter_mut().find(|(field, _)| *field == name) {
            slot.1 = value;
        } else {
            self.values.push((name, value));
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&MetricValue> {
        self.values
            .iter()
            .find(|(field, _)| *field == name)
            .map(|(_, value)| value)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn commit(self, builder: &mut SnapshotBuilder) {
        for (name, value) in self.values {
            builder.set(name, value);
        }
    }
}

/// How a rule turns its capture groups into fields.
enum Extract {
    /// Capture group `n + 1` is a decimal value for field `n`; absent optional
    /// groups are skipped.
    Decimal(&'static [&'static str]),
    /// Groups 1 and 2 form one 64-bit counter (hex, or high/low decimal halves).
    Counter(&'static str),
    Custom(fn(&Captures<'_>, &mut Fields)),
}

struct Rule {
    pattern: Regex,
    extract: Extract,
}

/// Ordered rule table for one section kind.
pub struct Matcher {
    rules: Vec<Rule>,
}

impl Matcher {
    /// Try every rule against the start of `rest`. Returns the number of bytes
    /// consumed by the first rule that matched.
    pub fn apply(&self, rest: &str, fields: &mut Fields) -> Option<usize> {
        self.rules.iter().find_map(|rule| {
            let caps = rule.pattern.captures(rest)?;
            let consumed = caps.get(0)?.end();
            rule.extract.apply(&caps, fields);
            Some(consumed)
        })
    }
}

impl Extract {
    fn apply(&self, caps: &Captures<'_>, fields: &mut Fields) {
        match self {
            Self::Decimal(names) => {
                for (index, name) in names.iter().enumerate() {
                    if let Some(value) = decimal(caps, index + 1) {
                        fields.set(*name, value);
                    }
                }
            }
            Self::Counter(name) => {
                if let Some(value) = counter(caps, 1) {
                    fields.set(*name, value);
                }
            }
            Self::Custom(extract) => extract(caps, fields),
        }
    }
}

fn decimal(caps: &Captures<'_>, group: usize) -> Option<BigUint> {
    BigUint::parse_bytes(caps.get(group)?.as_str().as_bytes(), 10)
}

/// Counter spanning `group` (hex or high half) and `group + 1` (low half).
fn counter(caps: &Captures<'_>, group: usize) -> Option<BigUint> {
    reconstruct(
        caps.get(group)?.as_str(),
        caps.get(group + 1).map(|m| m.as_str()),
    )
}

/// 5.5+ insert buffer block: inserts merged plus inserts discarded.
fn merged_operations(caps: &Captures<'_>, fields: &mut Fields) {
    let (Some(merged), Some(discarded)) = (decimal(caps, 1), decimal(caps, 2)) else {
        return;
    };
    fields.set("ib_ibuf_merged_rec", &merged + discarded);
    fields.set("ib_ibuf_inserts", merged);
}

#[allow(clippy::expect_used)]
fn rule(pattern: &str, extract: Extract) -> Rule {
    Rule {
        pattern: Regex::new(pattern).expect("valid engine status pattern"),
        extract,
    }
}

/// A 64-bit counter token: hex, or two decimal halves.
macro_rules! counter_rx {
    () => {
        r"([[:xdigit:]]+)(?: (\d+))?"
    };
}

static SEMAPHORES: Lazy<Matcher> = Lazy::new(|| Matcher {
    rules: vec![
        rule(
            r"^Mutex spin waits (\d+), rounds (\d+), OS waits (\d+)\n",
            Extract::Decimal(&["ib_spin_waits", "ib_spin_rounds", "ib_os_waits"]),
        ),
        rule(
            r"^RW-shared spins (\d+), OS waits (\d+); RW-excl spins (\d+), OS waits (\d+)\n",
            Extract::Decimal(&[
                "ib_rw_shared_waits",
                "ib_rw_shared_os_waits",
                "ib_rw_excl_waits",
                "ib_rw_excl_os_waits",
            ]),
        ),
        rule(
            r"^RW-shared spins (\d+), rounds \d+, OS waits (\d+)\n",
            Extract::Decimal(&["ib_rw_shared_waits", "ib_rw_shared_os_waits"]),
        ),
        rule(
            r"^RW-excl spins (\d+), rounds \d+, OS waits (\d+)\n",
            Extract::Decimal(&["ib_rw_excl_waits", "ib_rw_excl_os_waits"]),
        ),
    ],
});

static TRANSACTIONS: Lazy<Matcher> = Lazy::new(|| Matcher {
    rules: vec![
        rule(
            concat!(r"^Trx id counter ", counter_rx!(), r"\n"),
            Extract::Counter("ib_tnx"),
        ),
        // Old servers print both ids as two decimal halves, newer ones as a
        // single hex value each, optionally followed by the purge state.
        rule(
            concat!(
                r"^Purge done for trx's n:o < ",
                counter_rx!(),
                r" undo n:o < ",
                counter_rx!(),
                r"[^\n]*\n"
            ),
            Extract::Counter("ib_tnx_prg"),
        ),
        rule(
            r"^History list length (\d+)\n",
            Extract::Decimal(&["ib_tnx_hist"]),
        ),
    ],
});

static FILE_IO: Lazy<Matcher> = Lazy::new(|| Matcher {
    rules: vec![
        rule(
            r"^Pending normal aio reads: (\d+)(?: \[(?:\d+, )*\d+\] )?, aio writes: (\d+)(?: \[(?:\d+, )*\d+\] )?,\n\s*ibuf aio reads: (\d+), log i/o's: (\d+), sync i/o's: (\d+)\n",
            Extract::Decimal(&[
                "ib_iop_aioread",
                "ib_iop_aiowrite",
                "ib_iop_ibuf_aio",
                "ib_iop_log",
                "ib_iop_sync",
            ]),
        ),
        rule(
            r"^Pending flushes \(fsync\) log: (\d+); buffer pool: (\d+)\n",
            Extract::Decimal(&["ib_iop_flush_log", "ib_iop_flush_bpool"]),
        ),
        rule(
            r"^(\d+) OS file reads, (\d+) OS file writes, (\d+) OS fsyncs\n",
            Extract::Decimal(&["ib_io_read", "ib_io_write", "ib_io_fsync"]),
        ),
    ],
});

static INSERT_BUFFER: Lazy<Matcher> = Lazy::new(|| Matcher {
    rules: vec![
        rule(
            r"^(\d+) inserts, (\d+) merged recs, (\d+) merges\n",
            Extract::Decimal(&["ib_ibuf_inserts", "ib_ibuf_merged_rec", "ib_ibuf_merges"]),
        ),
        rule(
            r"^merged operations:\n insert (\d+), delete mark \d+, delete \d+\ndiscarded operations:\n insert (\d+), delete mark \d+, delete \d+\n",
            Extract::Custom(merged_operations),
        ),
        rule(
            r"^Ibuf: size (\d+), free list len (\d+), seg size (\d+),(?: (\d+) merges)?\n",
            Extract::Decimal(&[
                "ib_ibuf_size",
                "ib_ibuf_free_len",
                "ib_ibuf_seg_size",
                "ib_ibuf_merges",
            ]),
        ),
    ],
});

// A single-token LSN is read as hex, including the plain decimal LSN that
// 5.5+ servers print; ib_log_* carry that hex reading there.
static LOG: Lazy<Matcher> = Lazy::new(|| Matcher {
    rules: vec![
        rule(
            concat!(r"^Log sequence number[ \t]+", counter_rx!(), r"\n"),
            Extract::Counter("ib_log_written"),
        ),
        rule(
            concat!(r"^Log flushed up to[ \t]+", counter_rx!(), r"\n"),
            Extract::Counter("ib_log_flush"),
        ),
        rule(
            concat!(r"^Last checkpoint at[ \t]+", counter_rx!(), r"\n"),
            Extract::Counter("ib_log_checkpoint"),
        ),
        rule(
            r"^(\d+) log i/o's done[^\n]*\n",
            Extract::Decimal(&["ib_io_log"]),
        ),
    ],
});

static BUFFER_POOL: Lazy<Matcher> = Lazy::new(|| Matcher {
    rules: vec![
        rule(
            r"^Buffer pool size[ \t]+(\d+)\n",
            Extract::Decimal(&["ib_bpool_size"]),
        ),
        rule(
            r"^Free buffers[ \t]+(\d+)\n",
            Extract::Decimal(&["ib_bpool_free"]),
        ),
        rule(
            r"^Database pages[ \t]+(\d+)\n",
            Extract::Decimal(&["ib_bpool_dbpages"]),
        ),
        rule(
            r"^Modified db pages[ \t]+(\d+)\n",
            Extract::Decimal(&["ib_bpool_modpages"]),
        ),
        rule(
            r"^Pages read (\d+), created (\d+), written (\d+)\n",
            Extract::Decimal(&["ib_bpool_read", "ib_bpool_created", "ib_bpool_written"]),
        ),
    ],
});

#[must_use]
pub fn semaphores() -> &'static Matcher {
    &SEMAPHORES
}

#[must_use]
pub fn transactions() -> &'static Matcher {
    &TRANSACTIONS
}

#[must_use]
pub fn file_io() -> &'static Matcher {
    &FILE_IO
}

#[must_use]
pub fn insert_buffer() -> &'static Matcher {
    &INSERT_BUFFER
}

#[must_use]
pub fn log() -> &'static Matcher {
    &LOG
}

#[must_use]
pub fn buffer_pool() -> &'static Matcher {
    &BUFFER_POOL
}
