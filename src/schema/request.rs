//! # Request Frames
//!
//! The client→server half of the protocol: a closed set of records keyed
//! by the frame header's type byte. Statement-tunnel requests identify
//! their targets by the numeric ids handed out in earlier responses
//! (`db_id` from Open, `stmt_id` from Prepare).
//!
//! Exec and Query frames carry their bind parameters *after* the record:
//! the decoder leaves the message cursor at the start of the parameter
//! tuple, where the statement adapter picks it up.

use crate::error::Result;
use crate::message::Message;
use crate::schema::{unknown_type, Frame, Record};

/// Wire type codes for request frames.
pub mod code {
    pub const HEARTBEAT: u8 = 0;
    pub const OPEN: u8 = 1;
    pub const PREPARE: u8 = 2;
    pub const EXEC: u8 = 3;
    pub const QUERY: u8 = 4;
    pub const FINALIZE: u8 = 5;
    pub const EXEC_SQL: u8 = 6;
    pub const QUERY_SQL: u8 = 7;
}

schema_record! {
    /// Keep the connection alive and report the client's clock.
    pub struct Heartbeat {
        timestamp: uint64,
    }
}

schema_record! {
    /// Open a database by name.
    pub struct Open {
        name: text,
        flags: uint64,
        vfs: text,
    }
}

schema_record! {
    /// Compile a statement against an open database.
    pub struct Prepare {
        db_id: uint64,
        sql: text,
    }
}

schema_record! {
    /// Execute a prepared statement; bind parameters follow the record.
    pub struct Exec {
        db_id: uint64,
        stmt_id: uint64,
    }
}

schema_record! {
    /// Run a prepared query; bind parameters follow the record.
    pub struct Query {
        db_id: uint64,
        stmt_id: uint64,
    }
}

schema_record! {
    /// Release a prepared statement.
    pub struct Finalize {
        db_id: uint64,
        stmt_id: uint64,
    }
}

schema_record! {
    /// One-shot execute of SQL text; bind parameters follow the record.
    pub struct ExecSql {
        db_id: uint64,
        sql: text,
    }
}

schema_record! {
    /// One-shot query of SQL text; bind parameters follow the record.
    pub struct QuerySql {
        db_id: uint64,
        sql: text,
    }
}

/// A decoded request frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    Heartbeat(Heartbeat),
    Open(Open),
    Prepare(Prepare),
    Exec(Exec),
    Query(Query),
    Finalize(Finalize),
    ExecSql(ExecSql),
    QuerySql(QuerySql),
}

impl Frame for Request {
    fn type_code(&self) -> u8 {
        match self {
            Request::Heartbeat(_) => code::HEARTBEAT,
            Request::Open(_) => code::OPEN,
            Request::Prepare(_) => code::PREPARE,
            Request::Exec(_) => code::EXEC,
            Request::Query(_) => code::QUERY,
            Request::Finalize(_) => code::FINALIZE,
            Request::ExecSql(_) => code::EXEC_SQL,
            Request::QuerySql(_) => code::QUERY_SQL,
        }
    }

    fn put_body(&self, message: &mut Message) -> Result<()> {
        match self {
            Request::Heartbeat(r) => r.put(message),
            Request::Open(r) => r.put(message),
            Request::Prepare(r) => r.put(message),
            Request::Exec(r) => r.put(message),
            Request::Query(r) => r.put(message),
            Request::Finalize(r) => r.put(message),
            Request::ExecSql(r) => r.put(message),
            Request::QuerySql(r) => r.put(message),
        }
    }

    fn get_body(code: u8, message: &mut Message) -> Result<Self> {
        match code {
            code::HEARTBEAT => Heartbeat::get(message)
                .map(Request::Heartbeat)
                .map_err(|e| e.wrap("failed to decode 'heartbeat'")),
            code::OPEN => Open::get(message)
                .map(Request::Open)
                .map_err(|e| e.wrap("failed to decode 'open'")),
            code::PREPARE => Prepare::get(message)
                .map(Request::Prepare)
                .map_err(|e| e.wrap("failed to decode 'prepare'")),
            code::EXEC => Exec::get(message)
                .map(Request::Exec)
                .map_err(|e| e.wrap("failed to decode 'exec'")),
            code::QUERY => Query::get(message)
                .map(Request::Query)
                .map_err(|e| e.wrap("failed to decode 'query'")),
            code::FINALIZE => Finalize::get(message)
                .map(Request::Finalize)
                .map_err(|e| e.wrap("failed to decode 'finalize'")),
            code::EXEC_SQL => ExecSql::get(message)
                .map(Request::ExecSql)
                .map_err(|e| e.wrap("failed to decode 'exec_sql'")),
            code::QUERY_SQL => QuerySql::get(message)
                .map(Request::QuerySql)
                .map_err(|e| e.wrap("failed to decode 'query_sql'")),
            _ => Err(unknown_type(code)),
        }
    }
}
