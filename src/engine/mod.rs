//! # Embedded Engine Interface
//!
//! A safe wrapper around the embedded SQL engine, exposing exactly the
//! surface the codec consumes: open/close a database, run plain SQL,
//! prepare statements, bind parameters by 1-based index, step through
//! result rows, and introspect columns (name, declared type, storage type,
//! typed accessors). All `unsafe` in the crate is confined to this module.
//!
//! The wrapper deliberately sits on the raw C interface rather than a
//! higher-level binding: the statement adapter resumes `step` across
//! multiple `query` calls when a response is batched, and reads each
//! column's declared type alongside its per-row storage type, neither of
//! which survives a binding that resets statements between uses.
//!
//! Engine objects are not `Send`: a connection and its statements belong
//! to one logical connection on one thread.

use std::ffi::{CStr, CString};
use std::fmt;
use std::os::raw::{c_char, c_int};
use std::ptr;

use libsqlite3_sys as ffi;

use crate::error::{Error, ErrorKind};

// `libsqlite3-sys`'s bundled prebuilt bindings omit `sqlite3_close_v2`
// (blocklisted when the bindings were generated), even though the bundled
// sqlite3 amalgamation always provides it. Declare it ourselves so the
// symbol resolves against the statically linked library.
extern "C" {
    fn sqlite3_close_v2(db: *mut ffi::sqlite3) -> c_int;
}

/// Outcome of stepping a prepared statement, and of a batched `query`:
/// `Row` means more rows remain, `Done` means the statement is exhausted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Row,
    Done,
}

/// Storage class of a column value in the current row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Float,
    Text,
    Blob,
    Null,
}

/// An error reported by the engine: the raw result code plus the
/// connection's error text.
#[derive(Debug, Clone)]
pub struct EngineError {
    pub code: i32,
    pub message: String,
}

impl EngineError {
    fn misuse(message: impl Into<String>) -> Self {
        Self {
            code: ffi::SQLITE_MISUSE,
            message: message.into(),
        }
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for EngineError {}

impl From<EngineError> for Error {
    fn from(e: EngineError) -> Self {
        let kind = match e.code {
            ffi::SQLITE_RANGE => ErrorKind::Range,
            ffi::SQLITE_NOMEM => ErrorKind::NoMem,
            _ => ErrorKind::Generic,
        };
        Error::new(kind, e.message)
    }
}

/// An open database connection.
pub struct Connection {
    db: *mut ffi::sqlite3,
}

impl Connection {
    /// Opens (creating if needed) a database at `path`.
    pub fn open(path: &str) -> Result<Self, EngineError> {
        let c_path = CString::new(path)
            .map_err(|_| EngineError::misuse("path contains an interior null byte"))?;
        let mut db: *mut ffi::sqlite3 = ptr::null_mut();
        let flags = ffi::SQLITE_OPEN_READWRITE | ffi::SQLITE_OPEN_CREATE;
        let rc = unsafe { ffi::sqlite3_open_v2(c_path.as_ptr(), &mut db, flags, ptr::null()) };
        if rc != ffi::SQLITE_OK {
            // The engine allocates a handle even on failure so the error
            // text can be read; release it before returning.
            let message = if db.is_null() {
                String::from("cannot open database")
            } else {
                let message = unsafe { errmsg(db) };
                unsafe { sqlite3_close_v2(db) };
                message
            };
            return Err(EngineError { code: rc, message });
        }
        tracing::debug!(path, "opened database connection");
        Ok(Self { db })
    }

    /// Opens a private in-memory database.
    pub fn open_in_memory() -> Result<Self, EngineError> {
        Self::open(":memory:")
    }

    /// Runs one or more SQL statements, discarding any rows.
    pub fn exec(&self, sql: &str) -> Result<(), EngineError> {
        let c_sql = CString::new(sql)
            .map_err(|_| EngineError::misuse("sql contains an interior null byte"))?;
        let mut raw_msg: *mut c_char = ptr::null_mut();
        let rc = unsafe {
            ffi::sqlite3_exec(self.db, c_sql.as_ptr(), None, ptr::null_mut(), &mut raw_msg)
        };
        if rc != ffi::SQLITE_OK {
            let message = if raw_msg.is_null() {
                self.last_error_message()
            } else {
                // SAFETY: the engine hands back a null-terminated string
                // it allocated; copy it out and free it.
                unsafe {
                    let message = CStr::from_ptr(raw_msg).to_string_lossy().into_owned();
                    ffi::sqlite3_free(raw_msg.cast());
                    message
                }
            };
            return Err(EngineError { code: rc, message });
        }
        Ok(())
    }

    /// Compiles the first statement in `sql`, returning it together with
    /// the unconsumed tail of the input.
    pub fn prepare<'s>(&self, sql: &'s str) -> Result<(PreparedStatement<'_>, &'s str), EngineError> {
        let c_sql = CString::new(sql)
            .map_err(|_| EngineError::misuse("sql contains an interior null byte"))?;
        let mut stmt: *mut ffi::sqlite3_stmt = ptr::null_mut();
        let mut tail: *const c_char = ptr::null();
        let rc = unsafe {
            ffi::sqlite3_prepare_v2(self.db, c_sql.as_ptr(), -1, &mut stmt, &mut tail)
        };
        if rc != ffi::SQLITE_OK {
            return Err(self.error(rc));
        }
        if stmt.is_null() {
            return Err(EngineError {
                code: ffi::SQLITE_ERROR,
                message: String::from("sql does not contain a statement"),
            });
        }
        let consumed = if tail.is_null() {
            sql.len()
        } else {
            // SAFETY: on success the tail points into c_sql's buffer, at
            // the first byte the compiler did not consume.
            (unsafe { tail.offset_from(c_sql.as_ptr()) }) as usize
        };
        let tail = sql.get(consumed..).unwrap_or("");
        Ok((PreparedStatement { stmt, conn: self }, tail))
    }

    /// Error text of the most recent failed call on this connection.
    pub fn last_error_message(&self) -> String {
        unsafe { errmsg(self.db) }
    }

    /// Result code of the most recent failed call on this connection.
    pub fn last_error_code(&self) -> i32 {
        unsafe { ffi::sqlite3_errcode(self.db) }
    }

    /// Rowid of the most recent successful insert on this connection.
    pub fn last_insert_rowid(&self) -> i64 {
        unsafe { ffi::sqlite3_last_insert_rowid(self.db) }
    }

    /// Number of rows changed by the most recent statement.
    pub fn changes(&self) -> u64 {
        (unsafe { ffi::sqlite3_changes(self.db) }) as u64
    }

    fn error(&self, code: c_int) -> EngineError {
        EngineError {
            code,
            message: self.last_error_message(),
        }
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        unsafe {
            sqlite3_close_v2(self.db);
        }
    }
}

/// Reads the connection's current error text.
///
/// # Safety
///
/// `db` must be a live engine handle.
unsafe fn errmsg(db: *mut ffi::sqlite3) -> String {
    let ptr = ffi::sqlite3_errmsg(db);
    if ptr.is_null() {
        String::new()
    } else {
        CStr::from_ptr(ptr).to_string_lossy().into_owned()
    }
}

/// A compiled statement bound to its connection.
///
/// Column accessors are only meaningful after [`PreparedStatement::step`]
/// has returned [`Step::Row`]; the references they hand out are valid
/// until the next step.
pub struct PreparedStatement<'conn> {
    stmt: *mut ffi::sqlite3_stmt,
    conn: &'conn Connection,
}

impl PreparedStatement<'_> {
    fn check(&self, rc: c_int) -> Result<(), EngineError> {
        if rc == ffi::SQLITE_OK {
            Ok(())
        } else {
            Err(self.conn.error(rc))
        }
    }

    /// Binds a 64-bit signed integer at the 1-based `index`.
    pub fn bind_int64(&self, index: usize, value: i64) -> Result<(), EngineError> {
        self.check(unsafe { ffi::sqlite3_bind_int64(self.stmt, index as c_int, value) })
    }

    /// Binds a double at the 1-based `index`.
    pub fn bind_double(&self, index: usize, value: f64) -> Result<(), EngineError> {
        self.check(unsafe { ffi::sqlite3_bind_double(self.stmt, index as c_int, value) })
    }

    /// Binds UTF-8 text at the 1-based `index`. The engine takes its own
    /// copy, so the borrow ends with this call.
    pub fn bind_text(&self, index: usize, value: &str) -> Result<(), EngineError> {
        self.check(unsafe {
            ffi::sqlite3_bind_text(
                self.stmt,
                index as c_int,
                value.as_ptr().cast::<c_char>(),
                value.len() as c_int,
                ffi::SQLITE_TRANSIENT(),
            )
        })
    }

    /// Binds a byte slice at the 1-based `index`. The engine takes its own
    /// copy.
    pub fn bind_blob(&self, index: usize, value: &[u8]) -> Result<(), EngineError> {
        self.check(unsafe {
            ffi::sqlite3_bind_blob(
                self.stmt,
                index as c_int,
                value.as_ptr().cast(),
                value.len() as c_int,
                ffi::SQLITE_TRANSIENT(),
            )
        })
    }

    /// Binds NULL at the 1-based `index`.
    pub fn bind_null(&self, index: usize) -> Result<(), EngineError> {
        self.check(unsafe { ffi::sqlite3_bind_null(self.stmt, index as c_int) })
    }

    /// Advances to the next result row.
    pub fn step(&self) -> Result<Step, EngineError> {
        match unsafe { ffi::sqlite3_step(self.stmt) } {
            ffi::SQLITE_ROW => Ok(Step::Row),
            ffi::SQLITE_DONE => Ok(Step::Done),
            rc => Err(self.conn.error(rc)),
        }
    }

    /// Rewinds the statement so it can be stepped again. Bindings are
    /// retained.
    pub fn reset(&self) -> Result<(), EngineError> {
        self.check(unsafe { ffi::sqlite3_reset(self.stmt) })
    }

    /// Number of `?` slots in the statement.
    pub fn parameter_count(&self) -> usize {
        (unsafe { ffi::sqlite3_bind_parameter_count(self.stmt) }) as usize
    }

    /// Number of columns the statement yields. Zero for statements that
    /// return no data.
    pub fn column_count(&self) -> usize {
        (unsafe { ffi::sqlite3_column_count(self.stmt) }) as usize
    }

    /// Name of the 0-based column `index`, as reported by the engine: for
    /// expressions without an alias this is the expression text itself.
    pub fn column_name(&self, index: usize) -> Result<&str, EngineError> {
        let ptr = unsafe { ffi::sqlite3_column_name(self.stmt, index as c_int) };
        if ptr.is_null() {
            return Err(EngineError {
                code: ffi::SQLITE_NOMEM,
                message: format!("cannot read name of column {index}"),
            });
        }
        // SAFETY: column names are null-terminated UTF-8 owned by the
        // statement.
        unsafe { CStr::from_ptr(ptr) }.to_str().map_err(|_| EngineError {
            code: ffi::SQLITE_MISMATCH,
            message: format!("name of column {index} is not valid UTF-8"),
        })
    }

    /// Declared type of the 0-based column `index`, when the column maps
    /// to a table column with a declaration.
    pub fn column_decltype(&self, index: usize) -> Option<&str> {
        let ptr = unsafe { ffi::sqlite3_column_decltype(self.stmt, index as c_int) };
        if ptr.is_null() {
            return None;
        }
        unsafe { CStr::from_ptr(ptr) }.to_str().ok()
    }

    /// Storage class of the 0-based column `index` in the current row.
    pub fn column_type(&self, index: usize) -> ColumnType {
        match unsafe { ffi::sqlite3_column_type(self.stmt, index as c_int) } {
            ffi::SQLITE_INTEGER => ColumnType::Integer,
            ffi::SQLITE_FLOAT => ColumnType::Float,
            ffi::SQLITE_TEXT => ColumnType::Text,
            ffi::SQLITE_BLOB => ColumnType::Blob,
            _ => ColumnType::Null,
        }
    }

    pub fn column_int64(&self, index: usize) -> i64 {
        unsafe { ffi::sqlite3_column_int64(self.stmt, index as c_int) }
    }

    pub fn column_double(&self, index: usize) -> f64 {
        unsafe { ffi::sqlite3_column_double(self.stmt, index as c_int) }
    }

    /// Text of the 0-based column `index`; NULL reads as the empty string.
    pub fn column_text(&self, index: usize) -> Result<&str, EngineError> {
        let ptr = unsafe { ffi::sqlite3_column_text(self.stmt, index as c_int) };
        if ptr.is_null() {
            return Ok("");
        }
        let len = (unsafe { ffi::sqlite3_column_bytes(self.stmt, index as c_int) }) as usize;
        // SAFETY: the engine guarantees `len` readable bytes behind the
        // pointer until the next step.
        let bytes = unsafe { std::slice::from_raw_parts(ptr, len) };
        std::str::from_utf8(bytes).map_err(|_| EngineError {
            code: ffi::SQLITE_MISMATCH,
            message: format!("column {index} is not valid UTF-8"),
        })
    }

    /// Bytes of the 0-based column `index`; NULL reads as empty.
    pub fn column_blob(&self, index: usize) -> &[u8] {
        let ptr = unsafe { ffi::sqlite3_column_blob(self.stmt, index as c_int) };
        if ptr.is_null() {
            return &[];
        }
        let len = (unsafe { ffi::sqlite3_column_bytes(self.stmt, index as c_int) }) as usize;
        // SAFETY: as for column_text.
        unsafe { std::slice::from_raw_parts(ptr.cast::<u8>(), len) }
    }
}

impl Drop for PreparedStatement<'_> {
    fn drop(&mut self) {
        unsafe {
            ffi::sqlite3_finalize(self.stmt);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_exec_prepare_and_step() {
        let db = Connection::open_in_memory().unwrap();
        db.exec("CREATE TABLE t (n INT)").unwrap();
        db.exec("INSERT INTO t VALUES(42)").unwrap();

        let (stmt, tail) = db.prepare("SELECT n FROM t").unwrap();
        assert_eq!(tail, "");
        assert_eq!(stmt.parameter_count(), 0);
        assert_eq!(stmt.column_count(), 1);
        assert_eq!(stmt.column_name(0).unwrap(), "n");
        assert_eq!(stmt.column_decltype(0), Some("INT"));

        assert_eq!(stmt.step().unwrap(), Step::Row);
        assert_eq!(stmt.column_type(0), ColumnType::Integer);
        assert_eq!(stmt.column_int64(0), 42);
        assert_eq!(stmt.step().unwrap(), Step::Done);
    }

    #[test]
    fn prepare_reports_the_unconsumed_tail() {
        let db = Connection::open_in_memory().unwrap();
        let (_stmt, tail) = db.prepare("SELECT 1; SELECT 2").unwrap();
        assert_eq!(tail.trim_start(), "SELECT 2");
    }

    #[test]
    fn bind_out_of_range_reports_the_engine_code() {
        let db = Connection::open_in_memory().unwrap();
        let (stmt, _) = db.prepare("SELECT 1").unwrap();
        let err = stmt.bind_int64(1, 7).unwrap_err();
        assert_eq!(err.code, ffi::SQLITE_RANGE);
        assert_eq!(err.message, "column index out of range");
    }

    #[test]
    fn exec_surfaces_sql_errors() {
        let db = Connection::open_in_memory().unwrap();
        let err = db.exec("NOT SQL AT ALL").unwrap_err();
        assert_eq!(err.code, ffi::SQLITE_ERROR);
        assert_eq!(db.last_error_code(), ffi::SQLITE_ERROR);
        assert!(!err.message.is_empty());
    }

    #[test]
    fn null_columns_read_as_empty() {
        let db = Connection::open_in_memory().unwrap();
        let (stmt, _) = db.prepare("SELECT NULL").unwrap();
        assert_eq!(stmt.step().unwrap(), Step::Row);
        assert_eq!(stmt.column_type(0), ColumnType::Null);
        assert_eq!(stmt.column_text(0).unwrap(), "");
        assert_eq!(stmt.column_blob(0), &[] as &[u8]);
    }
}
