//! # sqlwire Configuration Module
//!
//! This module centralizes the protocol and buffer constants for sqlwire.
//! Constants are grouped by their functional area and interdependencies are
//! documented and enforced through compile-time assertions.
//!
//! ## Why Centralization?
//!
//! The wire format couples several values: the word size fixes the alignment
//! of every body element, the inline buffer length controls when responses
//! spill into the overflow buffer, and the parameter-tag packing counts are
//! derived from the word size. Co-locating them with compile-time checks
//! keeps a change to one from silently breaking another.
//!
//! ## Module Organization
//!
//! - [`constants`]: All numeric configuration values with dependency
//!   documentation

pub mod constants;

pub use constants::{
    ERROR_MSG_CAP, FRAME_HEADER_LEN, MESSAGE_BUF_LEN, PARAM_TAGS_FIRST_WORD, PARAM_TAGS_PER_WORD,
    WORD_SIZE,
};
