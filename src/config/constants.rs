//! # sqlwire Configuration Constants
//!
//! This module centralizes the constants that shape the wire format and the
//! codec buffers. Constants that depend on each other are co-located to
//! prevent mismatch bugs.
//!
//! ## Dependency Graph
//!
//! ```text
//! WORD_SIZE (8 bytes)
//!       │
//!       ├─> MESSAGE_BUF_LEN (must be a multiple)
//!       │     Every put starts at a word boundary, so the inline body
//!       │     must end on one too.
//!       │
//!       ├─> FRAME_HEADER_LEN (exactly one word)
//!       │     The transport reads the header with a single word-sized
//!       │     read before sizing the body.
//!       │
//!       ├─> PARAM_TAGS_FIRST_WORD (derived: WORD_SIZE - 1)
//!       │     The first word of a bind body spends one byte on the
//!       │     parameter count, leaving the rest for tags.
//!       │
//!       └─> PARAM_TAGS_PER_WORD (derived: WORD_SIZE)
//!             Continuation words are all tags.
//! ```
//!
//! ## Critical Invariants
//!
//! These invariants are enforced by compile-time assertions:
//!
//! 1. `MESSAGE_BUF_LEN % WORD_SIZE == 0` (inline body is word-aligned end
//!    to end)
//! 2. `FRAME_HEADER_LEN == WORD_SIZE` (header occupies one word)
//! 3. `PARAM_TAGS_FIRST_WORD == WORD_SIZE - 1` and
//!    `PARAM_TAGS_PER_WORD == WORD_SIZE` (tag packing tracks the word size)
//!
//! ## Usage
//!
//! Import constants from this module rather than defining them locally:
//!
//! ```ignore
//! use crate::config::{MESSAGE_BUF_LEN, WORD_SIZE};
//! ```

/// Fundamental granularity of the wire body: 8 bytes, 64-bit aligned.
pub const WORD_SIZE: usize = 8;

/// Length of the inline (statically allocated) message body.
///
/// Writes past this length spill into the heap-allocated overflow body.
/// This is a buffer-sizing knob, not a protocol cap: resizing it moves the
/// point where query responses batch, without changing the wire format.
pub const MESSAGE_BUF_LEN: usize = 4096;

/// Length of the frame header: big-endian word count (4 bytes), message
/// type (1), flags (1), reserved (2).
pub const FRAME_HEADER_LEN: usize = 8;

/// Number of parameter type tags carried in the first word of a bind body,
/// after the leading count byte.
pub const PARAM_TAGS_FIRST_WORD: usize = 7;

/// Number of parameter type tags carried in each continuation word.
pub const PARAM_TAGS_PER_WORD: usize = 8;

/// Upper bound on a formatted error message; longer messages are truncated.
pub const ERROR_MSG_CAP: usize = 240;

const _: () = assert!(MESSAGE_BUF_LEN % WORD_SIZE == 0);
const _: () = assert!(FRAME_HEADER_LEN == WORD_SIZE);
const _: () = assert!(PARAM_TAGS_FIRST_WORD == WORD_SIZE - 1);
const _: () = assert!(PARAM_TAGS_PER_WORD == WORD_SIZE);
