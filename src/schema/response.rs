//! # Response Frames
//!
//! The server→client half of the protocol. Most responses are flat
//! records; `Rows` is the exception — its record is empty and its body is
//! streamed directly by the statement adapter (column count, names, then
//! nibble-tagged rows), so decoding a `Rows` frame leaves the cursor at
//! the start of that stream.

use crate::error::Result;
use crate::message::Message;
use crate::schema::{unknown_type, Frame, Record};

/// Wire type codes for response frames.
pub mod code {
    pub const FAILURE: u8 = 0;
    pub const DB: u8 = 1;
    pub const STMT: u8 = 2;
    pub const RESULT: u8 = 3;
    pub const ROWS: u8 = 4;
}

schema_record! {
    /// A request failed; `code` is the engine or protocol error code.
    pub struct Failure {
        code: uint64,
        message: text,
    }
}

schema_record! {
    /// A database was opened and assigned an id.
    pub struct Db {
        id: uint64,
    }
}

schema_record! {
    /// A statement was prepared: its id and the number of `?` slots.
    pub struct StmtInfo {
        db_id: uint64,
        stmt_id: uint64,
        params: uint64,
    }
}

schema_record! {
    /// A non-query statement ran to completion.
    pub struct ExecResult {
        last_insert_id: uint64,
        rows_affected: uint64,
    }
}

schema_record! {
    /// Marker for a row stream; the body is written by the statement
    /// adapter after the header is stamped.
    pub struct Rows {}
}

/// A decoded response frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    Failure(Failure),
    Db(Db),
    StmtInfo(StmtInfo),
    ExecResult(ExecResult),
    Rows(Rows),
}

impl Frame for Response {
    fn type_code(&self) -> u8 {
        match self {
            Response::Failure(_) => code::FAILURE,
            Response::Db(_) => code::DB,
            Response::StmtInfo(_) => code::STMT,
            Response::ExecResult(_) => code::RESULT,
            Response::Rows(_) => code::ROWS,
        }
    }

    fn put_body(&self, message: &mut Message) -> Result<()> {
        match self {
            Response::Failure(r) => r.put(message),
            Response::Db(r) => r.put(message),
            Response::StmtInfo(r) => r.put(message),
            Response::ExecResult(r) => r.put(message),
            Response::Rows(r) => r.put(message),
        }
    }

    fn get_body(code: u8, message: &mut Message) -> Result<Self> {
        match code {
            code::FAILURE => Failure::get(message)
                .map(Response::Failure)
                .map_err(|e| e.wrap("failed to decode 'failure'")),
            code::DB => Db::get(message)
                .map(Response::Db)
                .map_err(|e| e.wrap("failed to decode 'db'")),
            code::STMT => StmtInfo::get(message)
                .map(Response::StmtInfo)
                .map_err(|e| e.wrap("failed to decode 'stmt'")),
            code::RESULT => ExecResult::get(message)
                .map(Response::ExecResult)
                .map_err(|e| e.wrap("failed to decode 'result'")),
            code::ROWS => Rows::get(message)
                .map(Response::Rows)
                .map_err(|e| e.wrap("failed to decode 'rows'")),
            _ => Err(unknown_type(code)),
        }
    }
}
