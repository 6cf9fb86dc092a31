//! # Schema Codec
//!
//! Declarative record definitions composed from the message buffer's
//! primitive put/get routines, plus the tagged unions that dispatch over
//! them.
//!
//! A **record** is a flat struct whose fields encode in declaration order;
//! the [`schema_record!`](crate::schema_record) macro derives the matching
//! [`Record`] implementation from a field list, wrapping any field failure
//! with the field's name. A **frame** is a closed union of records — one
//! per message type byte — with an exhaustive match for dispatch; an
//! unrecognized type byte is a `Proto` error. A [`Handler`] owns the
//! message buffer for one logical connection and runs the encode and
//! decode paths end to end.
//!
//! Encode path: stamp the header with the variant's type code, then run
//! the variant's put. Decode path: the transport has loaded the header
//! and body into the handler's message; dispatch on the header's type
//! byte to the variant's get.

use std::marker::PhantomData;

use crate::error::{Error, ErrorKind, Result};
use crate::message::Message;

pub mod request;
pub mod response;

pub use request::Request;
pub use response::Response;

/// A wire record: a fixed field list encoded in declaration order.
///
/// Implementations come from [`schema_record!`](crate::schema_record);
/// hand-written ones must keep put and get exactly symmetric.
pub trait Record: Sized {
    fn put(&self, message: &mut Message) -> Result<()>;
    fn get(message: &mut Message) -> Result<Self>;
}

/// A closed union of records keyed by the frame header's type byte.
pub trait Frame: Sized {
    /// The type byte identifying this variant on the wire.
    fn type_code(&self) -> u8;

    /// Encodes the variant's record into the message body.
    fn put_body(&self, message: &mut Message) -> Result<()>;

    /// Decodes the variant selected by `code` from the message body.
    fn get_body(code: u8, message: &mut Message) -> Result<Self>;
}

/// Encoder/decoder for one direction of a logical connection. Owns its
/// message buffer; the transport reads from and writes into it.
pub struct Handler<F> {
    message: Message,
    _frame: PhantomData<F>,
}

impl<F: Frame> Handler<F> {
    pub fn new() -> Self {
        Self {
            message: Message::new(),
            _frame: PhantomData,
        }
    }

    pub fn message(&self) -> &Message {
        &self.message
    }

    pub fn message_mut(&mut self) -> &mut Message {
        &mut self.message
    }

    /// Encodes `frame` into the owned message, replacing any previous
    /// content. The message is left unsealed so the caller may append a
    /// trailing payload (e.g. bind parameters) before sending.
    pub fn encode(&mut self, frame: &F, flags: u8) -> Result<()> {
        self.message.reset();
        self.message.header_put(frame.type_code(), flags);
        frame
            .put_body(&mut self.message)
            .map_err(|e| e.wrap("encode error"))
    }

    /// Decodes the frame the transport placed in the owned message,
    /// dispatching on the received type byte.
    pub fn decode(&mut self) -> Result<F> {
        F::get_body(self.message.mtype(), &mut self.message)
    }
}

impl<F: Frame> Default for Handler<F> {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn unknown_type(code: u8) -> Error {
    Error::new(ErrorKind::Proto, format!("unknown message type {code}"))
}
