//! Scanner for `SHOW ENGINE INNODB STATUS` output.
//!
//! The report is a banner followed by named sections:
//!
//! ```text
//! ----------
//! SEMAPHORES
//! ----------
//! OS WAIT ARRAY INFO: reservation count 1
//! ...
//! ------------
//! TRANSACTIONS
//! ------------
//! ...
//! ----------------------------
//! END OF INNODB MONITOR OUTPUT
//! ============================
//! ```
//!
//! The dashed rule in front of a section name closes the previous section.
//! Servers cap the report at 64KB, so a sentinel section is appended before
//! scanning; reaching it means the report was truncated.

use super::sections::{self, Fields, Matcher};
use crate::snapshot::{INNODB_TRUNCATED, SnapshotBuilder};
use tracing::{debug, warn};

/// Lines before the first section name: blank line, `=====`, title, `=====`,
/// the "Per second averages" line and the rule opening the first section.
const HEADING_LINES: usize = 6;

const END_MARKER: &str = "END OF INNODB MONITOR OUTPUT";

/// Name of the section appended after the report; never produced by a server.
const SENTINEL: &str = "END OF TRUNCATED MONITOR OUTPUT";

/// Structural problems with the report. Any of them aborts the collection:
/// when the section layout is not what we expect, every extracted value is suspect.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("unknown section {name:?} in engine status report")]
    UnknownSection { name: String },

    #[error("expected a section separator after {section:?} in engine status report")]
    ExpectedSeparator { section: String },
}

/// Section kinds documented for the engine status command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Section {
    BackgroundThread,
    Semaphores,
    LatestForeignKeyError,
    LatestDetectedDeadlock,
    Transactions,
    FileIo,
    InsertBufferAndAdaptiveHashIndex,
    Log,
    BufferPoolAndMemory,
    IndividualBufferPoolInfo,
    RowOperations,
}

impl Section {
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let section = match name {
            "BACKGROUND THREAD" => Self::BackgroundThread,
            "SEMAPHORES" => Self::Semaphores,
            "LATEST FOREIGN KEY ERROR" => Self::LatestForeignKeyError,
            "LATEST DETECTED DEADLOCK" => Self::LatestDetectedDeadlock,
            "TRANSACTIONS" => Self::Transactions,
            "FILE I/O" => Self::FileIo,
            "INSERT BUFFER AND ADAPTIVE HASH INDEX" => Self::InsertBufferAndAdaptiveHashIndex,
            "LOG" => Self::Log,
            "BUFFER POOL AND MEMORY" => Self::BufferPoolAndMemory,
            "INDIVIDUAL BUFFER POOL INFO" => Self::IndividualBufferPoolInfo,
            "ROW OPERATIONS" => Self::RowOperations,
            _ => return None,
        };
        Some(section)
    }

    /// Matcher for the section; `None` for sections whose lines are not collected.
    #[must_use]
    pub fn matcher(self) -> Option<&'static Matcher> {
        match self {
            Self::Semaphores => Some(sections::semaphores()),
            Self::Transactions => Some(sections::transactions()),
            Self::FileIo => Some(sections::file_io()),
            Self::InsertBufferAndAdaptiveHashIndex => Some(sections::insert_buffer()),
            Self::Log => Some(sections::log()),
            Self::BufferPoolAndMemory => Some(sections::buffer_pool()),
            Self::BackgroundThread
            | Self::LatestForeignKeyError
            | Self::LatestDetectedDeadlock
            | Self::IndividualBufferPoolInfo
            | Self::RowOperations => None,
        }
    }
}

enum State {
    Heading,
    InSection,
    Done,
}

/// Position-tracked view over the report. `report_end` is where the server's
/// text stops and the appended sentinel begins.
struct Cursor<'a> {
    text: &'a str,
    pos: usize,
    report_end: usize,
}

impl<'a> Cursor<'a> {
    const fn new(text: &'a str, report_end: usize) -> Self {
        Self {
            text,
            pos: 0,
            report_end,
        }
    }

    const fn in_report(&self) -> bool {
        self.pos <= self.report_end
    }

    const fn past_report(&self) -> bool {
        self.pos >= self.report_end
    }

    fn rest(&self) -> &'a str {
        self.text.get(self.pos..).unwrap_or_default()
    }

    fn is_eof(&self) -> bool {
        self.pos >= self.text.len()
    }

    fn advance(&mut self, bytes: usize) {
        self.pos = (self.pos + bytes).min(self.text.len());
    }

    /// Current line without its newline, and the byte length to skip it.
    fn peek_line(&self) -> Option<(&'a str, usize)> {
        if self.is_eof() {
            return None;
        }
        let rest = self.rest();
        Some(match rest.find('\n') {
            Some(end) => (rest.get(..end).unwrap_or_default(), end + 1),
            None => (rest, rest.len()),
        })
    }

    fn next_line(&mut self) -> Option<&'a str> {
        let (line, len) = self.peek_line()?;
        self.advance(len);
        Some(line)
    }

    /// Consume a closing rule: a dash-only line whose next line does not start
    /// with a dash. Lock wait blocks inside TRANSACTIONS put a rule right before
    /// `---TRANSACTION` lines and must not end the section.
    fn closing_rule(&mut self) -> bool {
        let Some((line, len)) = self.peek_line() else {
            return false;
        };
        if !is_rule(line) {
            return false;
        }
        let next = self.rest().get(len..).unwrap_or_default();
        if next.starts_with('-') {
            return false;
        }
        self.advance(len);
        true
    }
}

fn is_rule(line: &str) -> bool {
    !line.is_empty() && line.bytes().all(|b| b == b'-')
}

/// Report text with a dangling partial line removed and the sentinel appended,
/// plus the length of the kept report text.
///
/// A report that already ends on a rule gets the sentinel name directly, so that
/// rule closes the last section instead of stacking onto the sentinel's own.
fn with_sentinel(report: &str) -> (String, usize) {
    let complete = match report.rfind('\n') {
        Some(end) => report.get(..=end).unwrap_or_default(),
        None => "",
    };
    let text = if complete.lines().last().is_some_and(is_rule) {
        format!("{complete}{SENTINEL}\n------\n")
    } else {
        format!("{complete}------\n{SENTINEL}\n------\n")
    };
    (text, complete.len())
}

/// Run the section's matcher until its closing rule (or end of input).
fn scan_section(cursor: &mut Cursor<'_>, matcher: Option<&Matcher>) -> Fields {
    let mut fields = Fields::default();

    while !cursor.is_eof() && !cursor.closing_rule() {
        if let Some(matcher) = matcher
            && let Some(consumed) = matcher.apply(cursor.rest(), &mut fields)
        {
            cursor.advance(consumed);
            continue;
        }
        // Unknown line, skip it.
        cursor.next_line();
    }

    fields
}

fn mark_truncated(builder: &mut SnapshotBuilder) {
    warn!(
        "engine status report was truncated (servers cap it at 64KB); \
         fields from the section that was cut off are missing"
    );
    builder.flag(INNODB_TRUNCATED);
}

/// Parse an engine status report into `builder`.
///
/// Fields of a section are committed once the report's own closing rule is
/// read. A section ended by the sentinel or by end of input was cut off and
/// contributes nothing.
///
/// # Errors
///
/// Returns [`ParseError`] when a section name is unknown or is not followed by
/// a dashed rule. The builder is consumed, so no partial snapshot survives.
pub fn parse_status(
    report: &str,
    mut builder: SnapshotBuilder,
) -> Result<SnapshotBuilder, ParseError> {
    let (text, report_end) = with_sentinel(report);
    let mut cursor = Cursor::new(&text, report_end);
    let mut state = State::Heading;

    loop {
        state = match state {
            State::Heading => {
                for _ in 0..HEADING_LINES {
                    if cursor.past_report() {
                        break;
                    }
                    cursor.next_line();
                }
                // banner cut short: step over the sentinel's opening rule
                if cursor.past_report()
                    && cursor.peek_line().is_some_and(|(line, _)| is_rule(line))
                {
                    cursor.next_line();
                }
                State::InSection
            }
            State::InSection => {
                let Some(name) = cursor.next_line() else {
                    mark_truncated(&mut builder);
                    break;
                };

                if name == END_MARKER {
                    State::Done
                } else if name == SENTINEL {
                    mark_truncated(&mut builder);
                    State::Done
                } else {
                    let section =
                        Section::from_name(name).ok_or_else(|| ParseError::UnknownSection {
                            name: name.to_string(),
                        })?;

                    match cursor.next_line() {
                        Some(line) if is_rule(line) => {}
                        _ => {
                            return Err(ParseError::ExpectedSeparator {
                                section: name.to_string(),
                            });
                        }
                    }

                    debug!(section = name, "parsing engine status section");
                    let fields = scan_section(&mut cursor, section.matcher());
                    if cursor.in_report() {
                        fields.commit(&mut builder);
                    }
                    State::InSection
                }
            }
            State::Done => break,
        };
    }

    Ok(builder)
}
