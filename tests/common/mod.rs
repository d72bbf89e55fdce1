#![allow(dead_code)]
#![allow(clippy::unwrap_used)]

use futures::future::BoxFuture;
use mariadb_snapshot::collectors::{Query, QueryError, QuerySource, Row};
use std::collections::HashMap;
use std::sync::Mutex;

/// In-memory [`QuerySource`]: canned rows or errors per query, empty result
/// for anything not configured. Records every query issued.
#[derive(Default)]
pub struct FakeSource {
    responses: HashMap<Query, Result<Vec<Row>, QueryError>>,
    calls: Mutex<Vec<Query>>,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(mut self, query: Query, rows: Vec<Row>) -> Self {
        self.responses.insert(query, Ok(rows));
        self
    }

    pub fn with_error(mut self, query: Query, message: &str) -> Self {
        self.responses
            .insert(query, Err(QueryError::new(query, message)));
        self
    }

    pub fn with_report(self, report: &str) -> Self {
        self.with_rows(
            Query::EngineStatus,
            vec![Row::from_pairs([
                ("Type", "InnoDB"),
                ("Name", ""),
                ("Status", report),
            ])],
        )
    }

    pub fn calls(&self) -> Vec<Query> {
        self.calls.lock().unwrap().clone()
    }
}

impl QuerySource for FakeSource {
    fn fetch<'a>(&'a self, query: Query) -> BoxFuture<'a, Result<Vec<Row>, QueryError>> {
        self.calls.lock().unwrap().push(query);
        let result = self
            .responses
            .get(&query)
            .cloned()
            .unwrap_or_else(|| Ok(Vec::new()));
        Box::pin(async move { result })
    }
}

/// `Variable_name`/`Value` rows.
pub fn name_values(pairs: &[(&str, &str)]) -> Vec<Row> {
    pairs
        .iter()
        .map(|(name, value)| Row::from_pairs([("Variable_name", *name), ("Value", *value)]))
        .collect()
}

/// `SHOW BINARY LOGS` rows for the given file sizes.
pub fn binary_logs(sizes: &[&str]) -> Vec<Row> {
    sizes
        .iter()
        .enumerate()
        .map(|(index, size)| {
            let name = format!("mysql-bin.{:06}", index + 1);
            Row::from_pairs([("Log_name", name.as_str()), ("File_size", *size)])
        })
        .collect()
}

pub const HEADING: &str = "
=====================================
2024-12-02 06:30:00 0x7f8b8c000700 INNODB MONITOR OUTPUT
=====================================
Per second averages calculated from the last 20 seconds
";

pub const FOOTER: &str = "----------------------------
END OF INNODB MONITOR OUTPUT
============================
";

/// Engine status report in the layout of a 5.x server: split-form LSNs,
/// hex transaction ids, every collected section present.
pub const FULL_REPORT: &str = "
=====================================
2024-12-02 06:30:00 0x7f8b8c000700 INNODB MONITOR OUTPUT
=====================================
Per second averages calculated from the last 20 seconds
-----------------
BACKGROUND THREAD
-----------------
srv_master_thread loops: 10 srv_active, 0 srv_shutdown, 4000 srv_idle
srv_master_thread log flush and writes: 4010
----------
SEMAPHORES
----------
OS WAIT ARRAY INFO: reservation count 120
OS WAIT ARRAY INFO: signal count 110
Mutex spin waits 100, rounds 200, OS waits 5
RW-shared spins 15, rounds 30, OS waits 7
RW-excl spins 4, rounds 90, OS waits 3
Spin rounds per wait: 2.00 mutex, 2.00 RW-shared, 22.50 RW-excl
------------------------
LATEST DETECTED DEADLOCK
------------------------
2024-12-01 10:00:00 0x7f8b8c000700
*** (1) TRANSACTION:
TRANSACTION 1234, ACTIVE 0 sec starting index read
Mutex spin waits 999, rounds 999, OS waits 999
*** WE ROLL BACK TRANSACTION (1)
------------
TRANSACTIONS
------------
Trx id counter 5D3
Purge done for trx's n:o < 5D2 undo n:o < 0 state: running but idle
History list length 17
LIST OF TRANSACTIONS FOR EACH SESSION:
---TRANSACTION 421623345672408, not started
0 lock struct(s), heap size 1128, 0 row lock(s)
--------
FILE I/O
--------
I/O thread 0 state: waiting for completed aio requests (insert buffer thread)
Pending normal aio reads: 2 [1, 1, 0, 0] , aio writes: 1 [0, 1, 0, 0] ,
 ibuf aio reads: 0, log i/o's: 3, sync i/o's: 4
Pending flushes (fsync) log: 5; buffer pool: 6
1046 OS file reads, 250 OS file writes, 120 OS fsyncs
0.00 reads/s, 0 avg bytes/read, 0.00 writes/s, 0.00 fsyncs/s
-------------------------------------
INSERT BUFFER AND ADAPTIVE HASH INDEX
-------------------------------------
Ibuf: size 1, free list len 0, seg size 2, 8 merges
merged operations:
 insert 10, delete mark 0, delete 0
discarded operations:
 insert 5, delete mark 0, delete 0
0.00 hash searches/s, 0.00 non-hash searches/s
---
LOG
---
Log sequence number 1 47632985
Log flushed up to   1 47632985
Pages flushed up to 1 47632985
Last checkpoint at  1 47632973
0 pending log flushes, 0 pending chkp writes
28 log i/o's done, 0.00 log i/o's/second
----------------------
BUFFER POOL AND MEMORY
----------------------
Total large memory allocated 167772160
Dictionary memory allocated 853408
Buffer pool size   8112
Free buffers       7003
Database pages     1109
Old database pages 429
Modified db pages  12
Pending reads 0
Pending writes: LRU 0, flush list 0
Pages read 1046, created 142, written 250
--------------
ROW OPERATIONS
--------------
0 read views open inside InnoDB
Number of rows inserted 0, updated 0, deleted 0, read 0
----------------------------
END OF INNODB MONITOR OUTPUT
============================
";

/// A report consisting of the given `(name, body)` sections.
pub fn report(sections: &[(&str, &str)]) -> String {
    let mut text = HEADING.to_string();
    for (name, body) in sections {
        let rule = "-".repeat(name.len());
        text.push_str(&format!("{rule}\n{name}\n{rule}\n{body}"));
    }
    text.push_str(FOOTER);
    text
}
