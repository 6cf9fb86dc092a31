//! # Statement Adapter
//!
//! Bridges the wire protocol and the embedded engine: [`Stmt::bind`]
//! consumes a parameter tuple from a message and applies it to a prepared
//! statement, and [`Stmt::query`] executes the statement, streaming column
//! metadata and rows back into a message.
//!
//! ## Bind Body Layout
//!
//! ```text
//! +-------+------------------------+------------------------+-----
//! | count | up to 7 type tags      | 8 more tags per word   | ...
//! | (u8)  | (1 byte each)          | while tags remain      |
//! +-------+------------------------+------------------------+-----
//! +------------------+------------------+-----
//! | value for param 1| value for param 2| ...   (word-aligned each)
//! +------------------+------------------+-----
//! ```
//!
//! ## Query Response Layout
//!
//! ```text
//! +--------------+--------------------+---------------------------+
//! | column count | column names       | rows                      |
//! | (u64 word)   | (padded strings)   |                           |
//! +--------------+--------------------+---------------------------+
//!
//! each row:
//! +---------------------------+------------------+-----
//! | type tags, one nibble per | value for col 0  | ...
//! | column, padded to a word  | (word-aligned)   |
//! +---------------------------+------------------+-----
//! ```
//!
//! Row header nibbles pack low-first: byte `k` holds column `2k` in its
//! low nibble and column `2k+1` in its high nibble; a trailing odd nibble
//! and the padding bytes are zero.
//!
//! ## Batching
//!
//! `query` encodes rows until the statement is exhausted or the response
//! outgrows the inline buffer: before stepping another row it returns
//! [`Step::Row`] once the overflow buffer is in use, leaving the statement
//! positioned so a later call (with a fresh message) picks up where it
//! stopped. The caller relays the partial frame and re-issues.
//!
//! ## Extended Type Mapping
//!
//! [`ValueTag`] extends the engine's five storage classes with three
//! logical types derived from a column's declared type. The mapping is
//! centralized in one case-insensitive rule keyed on storage class:
//!
//! | Storage | Declared | Tag |
//! |---------|----------|-----|
//! | INTEGER | DATETIME, TIMESTAMP, DATE, TIME | Unixtime |
//! | INTEGER | BOOLEAN, BOOL | Boolean |
//! | TEXT    | DATETIME, TIMESTAMP, DATE, TIME | Iso8601 |
//! | NULL    | DATETIME, TIMESTAMP, DATE, TIME | Iso8601 (empty string) |
//! | any other combination | | the storage class itself |

use std::fmt;

use smallvec::{smallvec, SmallVec};

use crate::config::WORD_SIZE;
use crate::engine::{ColumnType, Connection, PreparedStatement, Step};
use crate::error::{Error, ErrorKind, Result};
use crate::message::Message;
use crate::types::ValueTag;

mod registry;

pub use registry::Registry;

/// Row counts reported after driving a statement to completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExecOutcome {
    pub last_insert_id: i64,
    pub rows_affected: u64,
}

/// A prepared statement plus the connection it runs on and the text of the
/// last error, kept for hosts that report failures out of band.
pub struct Stmt<'db> {
    db: &'db Connection,
    inner: Option<PreparedStatement<'db>>,
    last_error: String,
}

impl<'db> Stmt<'db> {
    pub fn new(db: &'db Connection) -> Self {
        Self {
            db,
            inner: None,
            last_error: String::new(),
        }
    }

    /// Compiles the first statement in `sql`, releasing any previous one,
    /// and returns the unconsumed tail of the input.
    pub fn prepare<'s>(&mut self, sql: &'s str) -> Result<&'s str> {
        self.inner = None;
        match self.db.prepare(sql) {
            Ok((stmt, tail)) => {
                tracing::trace!(sql, "prepared statement");
                self.inner = Some(stmt);
                self.last_error.clear();
                Ok(tail)
            }
            Err(e) => self.record(Err(e.into())),
        }
    }

    /// The prepared statement, for hosts that drive the engine directly.
    pub fn statement(&self) -> Option<&PreparedStatement<'db>> {
        self.inner.as_ref()
    }

    /// Consumes parameters from `message` and applies them to the prepared
    /// statement. A message with no remaining body is a no-op.
    pub fn bind(&mut self, message: &mut Message) -> Result<()> {
        let outcome = bind_params(self.inner.as_ref(), message);
        self.record(outcome)
    }

    /// Executes the statement, streaming columns and rows into `message`.
    /// Returns [`Step::Done`] when the statement is exhausted, or
    /// [`Step::Row`] when the buffer filled first and the caller should
    /// re-issue with a fresh message.
    pub fn query(&mut self, message: &mut Message) -> Result<Step> {
        let outcome = query_rows(self.inner.as_ref(), message);
        self.record(outcome)
    }

    /// Steps a non-query statement to completion and reports the
    /// connection's change counters.
    pub fn exec(&mut self) -> Result<ExecOutcome> {
        let outcome = exec_statement(self.db, self.inner.as_ref());
        self.record(outcome)
    }

    /// Releases the prepared statement back to the engine.
    pub fn finalize(&mut self) {
        self.inner = None;
    }

    /// Text of the last error, empty after a successful call.
    pub fn last_error(&self) -> &str {
        &self.last_error
    }

    fn record<T>(&mut self, outcome: Result<T>) -> Result<T> {
        self.last_error.clear();
        if let Err(e) = &outcome {
            self.last_error.push_str(e.message());
        }
        outcome
    }
}

impl fmt::Debug for Stmt<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stmt")
            .field("prepared", &self.inner.is_some())
            .field("last_error", &self.last_error)
            .finish()
    }
}

/// Replaces end-of-message with the bind contract's error text; any other
/// failure passes through.
fn map_eom(e: Error, message: &str) -> Error {
    if e.kind() == ErrorKind::Eom {
        Error::new(ErrorKind::Generic, message)
    } else {
        e
    }
}

fn require<'a, 'db>(stmt: Option<&'a PreparedStatement<'db>>) -> Result<&'a PreparedStatement<'db>> {
    stmt.ok_or_else(|| Error::new(ErrorKind::Generic, "no statement was prepared"))
}

fn push_tag(tags: &mut SmallVec<[ValueTag; 16]>, byte: u8) -> Result<()> {
    let index = tags.len() + 1;
    let tag = ValueTag::from_u8(byte).ok_or_else(|| {
        Error::new(
            ErrorKind::Generic,
            format!("invalid param {index}: unknown type {byte}"),
        )
    })?;
    tags.push(tag);
    Ok(())
}

fn bind_params(stmt: Option<&PreparedStatement<'_>>, message: &mut Message) -> Result<()> {
    if message.at_end() {
        return Ok(());
    }
    let stmt = require(stmt)?;

    // The first word spends its low byte on the count; the remaining seven
    // bytes hold the first tags. Continuation words are all tags.
    let mut head = [0u8; WORD_SIZE];
    head.copy_from_slice(
        message
            .body_get_bytes(WORD_SIZE)
            .map_err(|e| map_eom(e, "incomplete param types"))?,
    );
    let count = head[0] as usize;
    let mut tags: SmallVec<[ValueTag; 16]> = SmallVec::new();
    for &byte in head[1..].iter().take(count) {
        push_tag(&mut tags, byte)?;
    }
    while tags.len() < count {
        let mut word = [0u8; WORD_SIZE];
        word.copy_from_slice(
            message
                .body_get_bytes(WORD_SIZE)
                .map_err(|e| map_eom(e, "incomplete param types"))?,
        );
        for &byte in word.iter().take(count - tags.len()) {
            push_tag(&mut tags, byte)?;
        }
    }

    for (i, tag) in tags.iter().enumerate() {
        let index = i + 1;
        match tag {
            ValueTag::Integer | ValueTag::Unixtime => {
                let value = message
                    .body_get_i64()
                    .map_err(|e| map_eom(e, "incomplete param values"))?;
                stmt.bind_int64(index, value)?;
            }
            ValueTag::Float => {
                let value = message
                    .body_get_f64()
                    .map_err(|e| map_eom(e, "incomplete param values"))?;
                stmt.bind_double(index, value)?;
            }
            ValueTag::Text | ValueTag::Iso8601 => {
                let value = message
                    .body_get_text()
                    .map_err(|e| map_eom(e, "incomplete param values"))?;
                stmt.bind_text(index, value)?;
            }
            ValueTag::Blob => {
                let value = message
                    .body_get_blob()
                    .map_err(|e| map_eom(e, "incomplete param values"))?;
                stmt.bind_blob(index, value)?;
            }
            ValueTag::Null => {
                // NULL still occupies one zero word on the wire.
                message
                    .body_get_u64()
                    .map_err(|e| map_eom(e, "incomplete param values"))?;
                stmt.bind_null(index)?;
            }
            ValueTag::Boolean => {
                let value = message
                    .body_get_u64()
                    .map_err(|e| map_eom(e, "incomplete param values"))?;
                stmt.bind_int64(index, value as i64)?;
            }
        }
    }
    Ok(())
}

fn query_rows(stmt: Option<&PreparedStatement<'_>>, message: &mut Message) -> Result<Step> {
    let stmt = require(stmt)?;
    let columns = stmt.column_count();
    if columns == 0 {
        return Err(Error::new(ErrorKind::Generic, "stmt doesn't yield any column"));
    }

    message.body_put_u64(columns as u64)?;
    for index in 0..columns {
        message.body_put_text(stmt.column_name(index)?)?;
    }

    let mut rows = 0u64;
    loop {
        // Per-row decision point: once a row has spilled into the overflow
        // buffer, stop before consuming the next one so the caller can
        // relay this batch and re-issue.
        if message.has_overflowed() {
            tracing::trace!(rows, "response batch filled, more rows pending");
            return Ok(Step::Row);
        }
        match stmt.step()? {
            Step::Done => {
                tracing::trace!(rows, "statement exhausted");
                return Ok(Step::Done);
            }
            Step::Row => {
                encode_row(stmt, message, columns)?;
                rows += 1;
            }
        }
    }
}

fn encode_row(stmt: &PreparedStatement<'_>, message: &mut Message, columns: usize) -> Result<()> {
    let mut tags: SmallVec<[ValueTag; 16]> = SmallVec::with_capacity(columns);
    for index in 0..columns {
        tags.push(column_tag(
            stmt.column_decltype(index),
            stmt.column_type(index),
        ));
    }

    let mut header: SmallVec<[u8; 16]> = smallvec![0u8; columns.div_ceil(2)];
    for (index, tag) in tags.iter().enumerate() {
        let nibble = tag.code();
        if index % 2 == 0 {
            header[index / 2] |= nibble;
        } else {
            header[index / 2] |= nibble << 4;
        }
    }
    message.body_put_bytes(&header)?;

    for (index, tag) in tags.iter().enumerate() {
        match tag {
            ValueTag::Integer | ValueTag::Unixtime => {
                message.body_put_i64(stmt.column_int64(index))?;
            }
            ValueTag::Float => message.body_put_f64(stmt.column_double(index))?,
            ValueTag::Text | ValueTag::Iso8601 => {
                message.body_put_text(stmt.column_text(index)?)?;
            }
            ValueTag::Blob => message.body_put_blob(stmt.column_blob(index))?,
            ValueTag::Null => message.body_put_u64(0)?,
            ValueTag::Boolean => message.body_put_u64(stmt.column_int64(index) as u64)?,
        }
    }
    Ok(())
}

fn exec_statement(db: &Connection, stmt: Option<&PreparedStatement<'_>>) -> Result<ExecOutcome> {
    let stmt = require(stmt)?;
    loop {
        match stmt.step()? {
            Step::Row => continue,
            Step::Done => break,
        }
    }
    Ok(ExecOutcome {
        last_insert_id: db.last_insert_rowid(),
        rows_affected: db.changes(),
    })
}

/// The authoritative (declared column type, storage class) → wire tag rule.
fn column_tag(decl: Option<&str>, storage: ColumnType) -> ValueTag {
    let datetime = decl.is_some_and(is_datetime_decl);
    match storage {
        ColumnType::Integer => {
            if datetime {
                ValueTag::Unixtime
            } else if decl.is_some_and(is_boolean_decl) {
                ValueTag::Boolean
            } else {
                ValueTag::Integer
            }
        }
        ColumnType::Float => ValueTag::Float,
        ColumnType::Text => {
            if datetime {
                ValueTag::Iso8601
            } else {
                ValueTag::Text
            }
        }
        ColumnType::Blob => ValueTag::Blob,
        ColumnType::Null => {
            if datetime {
                ValueTag::Iso8601
            } else {
                ValueTag::Null
            }
        }
    }
}

fn is_datetime_decl(decl: &str) -> bool {
    ["datetime", "timestamp", "date", "time"]
        .iter()
        .any(|name| decl.eq_ignore_ascii_case(name))
}

fn is_boolean_decl(decl: &str) -> bool {
    decl.eq_ignore_ascii_case("boolean") || decl.eq_ignore_ascii_case("bool")
}
