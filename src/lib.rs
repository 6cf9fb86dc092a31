//! # sqlwire - SQL Wire-Protocol Codec and Statement Adapter
//!
//! sqlwire is the codec layer of a distributed SQL database whose nodes
//! tunnel SQL operations between clients and an embedded relational
//! engine. It sits between a byte-oriented transport and the engine:
//! request frames decode into typed parameter bindings applied to prepared
//! statements, and result sets (column metadata plus row values) encode
//! into outbound frames using a compact, word-aligned binary layout.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │      Transport (out of scope)        │
//! ├─────────────────────────────────────┤
//! │   Message Buffer (header + body,     │
//! │   inline 4K + overflow, big-endian)  │
//! ├─────────────────────────────────────┤
//! │   Schema Codec (records, handlers)   │
//! ├─────────────────────────────────────┤
//! │   Statement Adapter (bind / query)   │
//! ├─────────────────────────────────────┤
//! │   Engine Interface (prepared stmts,  │
//! │   stepping, column accessors)        │
//! └─────────────────────────────────────┘
//! ```
//!
//! Data flow: transport → message buffer (decode header, then body) →
//! schema codec (typed parse into a request variant) → statement adapter
//! (`bind`, then `query`) → message buffer (encode response rows) →
//! transport.
//!
//! ## Wire Format
//!
//! Frames are `<4-byte big-endian word count><type><flags><2 reserved>`
//! followed by `words * 8` body bytes. Every body element starts on an
//! 8-byte boundary: 64-bit values travel big-endian, strings are
//! null-terminated and zero-padded to the next word, blobs carry a 64-bit
//! length. Result rows prefix their values with one type nibble per
//! column, packed two per byte.
//!
//! ## Quick Start
//!
//! ```ignore
//! use sqlwire::{Connection, Message, Step, Stmt};
//!
//! let db = Connection::open_in_memory()?;
//! db.exec("CREATE TABLE users (id INT, name TEXT)")?;
//!
//! let mut stmt = Stmt::new(&db);
//! stmt.prepare("SELECT id, name FROM users WHERE id = ?")?;
//!
//! let mut request = Message::new();   // filled by the transport
//! let mut response = Message::new();
//! stmt.bind(&mut request)?;
//! match stmt.query(&mut response)? {
//!     Step::Done => { /* all rows fit */ }
//!     Step::Row => { /* relay this batch, then re-issue */ }
//! }
//! ```
//!
//! ## Concurrency
//!
//! Single-threaded cooperative: messages, statements, and handlers belong
//! to one logical connection and are not shared across threads. All codec
//! operations are synchronous and bounded; the only potentially slow call
//! is the engine's step inside `query`.
//!
//! ## Module Overview
//!
//! - [`binary`]: byte-order flip and word-alignment helpers
//! - [`config`]: protocol and buffer constants
//! - [`engine`]: safe wrapper over the embedded SQL engine
//! - [`error`]: typed, bounded, chainable protocol errors
//! - [`message`]: dual-buffer framing codec
//! - [`schema`]: declarative record codecs and frame dispatch
//! - [`stmt`]: parameter binding and row streaming
//! - [`types`]: the wire value-tag table

#[macro_use]
mod macros;

pub mod binary;
pub mod config;
pub mod engine;
pub mod error;
pub mod message;
pub mod schema;
pub mod stmt;
pub mod types;

pub use binary::flip64;
pub use engine::{ColumnType, Connection, EngineError, PreparedStatement, Step};
pub use error::{Error, ErrorKind, Result};
pub use message::{FrameHeader, Message};
pub use schema::{Frame, Handler, Record, Request, Response};
pub use stmt::{ExecOutcome, Registry, Stmt};
pub use types::ValueTag;
