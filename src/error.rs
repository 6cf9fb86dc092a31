//! # Protocol Error Object
//!
//! A typed error carried through every codec layer. Each error pairs a
//! [`ErrorKind`] — the contractual failure class a peer can dispatch on —
//! with a bounded, human-readable message. Layers add context by wrapping:
//! `wrap` prepends a prefix joined by `": "`, so a failure deep in the
//! codec reads like `failed to get 'sql' field: no more words in message
//! body`.
//!
//! Messages are capped at [`ERROR_MSG_CAP`] bytes; anything longer is
//! truncated at a character boundary. Formatting an error never fails and
//! never panics.

use std::fmt;

use crate::config::ERROR_MSG_CAP;

/// Contractual failure classes of the codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Generic engine or decoding failure.
    Generic,
    /// Unknown message type or malformed frame.
    Proto,
    /// Read past the end of the declared message body.
    Eom,
    /// Malformed string or tag.
    Parse,
    /// Overflow-buffer allocation failed.
    NoMem,
    /// Bind index out of range.
    Range,
}

/// An error with a failure class and a bounded message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    kind: ErrorKind,
    message: String,
}

impl Error {
    /// Creates an error of the given kind, truncating the message to
    /// [`ERROR_MSG_CAP`] bytes.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: truncate(message.into()),
        }
    }

    /// Returns the failure class.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the formatted message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Prepends `context` to the message, joined by `": "`. The kind is
    /// preserved.
    pub fn wrap(self, context: &str) -> Self {
        Self::new(self.kind, format!("{context}: {}", self.message))
    }
}

fn truncate(mut message: String) -> String {
    if message.len() > ERROR_MSG_CAP {
        let mut end = ERROR_MSG_CAP;
        while !message.is_char_boundary(end) {
            end -= 1;
        }
        message.truncate(end);
    }
    message
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for Error {}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_prepends_context_and_keeps_kind() {
        let err = Error::new(ErrorKind::Eom, "no more words in message body");
        let wrapped = err.wrap("failed to get 'sql' field");
        assert_eq!(wrapped.kind(), ErrorKind::Eom);
        assert_eq!(
            wrapped.message(),
            "failed to get 'sql' field: no more words in message body"
        );
    }

    #[test]
    fn wrap_chains_outermost_first() {
        let err = Error::new(ErrorKind::Parse, "unknown tag")
            .wrap("field")
            .wrap("record");
        assert_eq!(err.message(), "record: field: unknown tag");
    }

    #[test]
    fn overlong_messages_are_truncated() {
        let err = Error::new(ErrorKind::Generic, "x".repeat(ERROR_MSG_CAP * 2));
        assert_eq!(err.message().len(), ERROR_MSG_CAP);
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let message = "é".repeat(ERROR_MSG_CAP);
        let err = Error::new(ErrorKind::Generic, message);
        assert!(err.message().len() <= ERROR_MSG_CAP);
        assert!(err.message().chars().all(|c| c == 'é'));
    }

    #[test]
    fn display_matches_message() {
        let err = Error::new(ErrorKind::Proto, "unknown message type 99");
        assert_eq!(err.to_string(), "unknown message type 99");
    }
}
