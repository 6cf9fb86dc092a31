//! # Internal Macros
//!
//! This module provides internal macros for reducing boilerplate in sqlwire.
//!
//! ## wire_accessors!
//!
//! Generates getter and setter methods for zerocopy struct fields that use
//! big-endian wrapper types (U16, U32, U64). The wire format is big-endian,
//! so header structs store their multi-byte fields as
//! `zerocopy::big_endian` values and expose host-order accessors.
//!
//! ### Usage
//!
//! ```ignore
//! use zerocopy::big_endian::{U16, U32};
//!
//! #[repr(C)]
//! struct FrameHeader {
//!     words: U32,
//!     extra: U16,
//! }
//!
//! impl FrameHeader {
//!     wire_accessors! {
//!         words: u32,
//!         extra: u16,
//!     }
//! }
//!
//! // Generates:
//! // pub fn words(&self) -> u32 { self.words.get() }
//! // pub fn set_words(&mut self, val: u32) { self.words = U32::new(val); }
//! // pub fn extra(&self) -> u16 { self.extra.get() }
//! // pub fn set_extra(&mut self, val: u16) { self.extra = U16::new(val); }
//! ```
//!
//! ## schema_record!
//!
//! Defines a wire record struct from a declarative field list and implements
//! [`crate::schema::Record`] for it. Field kinds name the wire encoding, not
//! the Rust type: `uint64`, `int64`, `float64`, `text`, `blob`. Encode and
//! decode walk the fields in declaration order, and a failing field wraps
//! the underlying error with the field name.
//!
//! ### Usage
//!
//! ```ignore
//! schema_record! {
//!     /// Ask the server to prepare a statement.
//!     pub struct Prepare {
//!         db_id: uint64,
//!         sql: text,
//!     }
//! }
//! ```

/// Generates getter and setter methods for zerocopy big-endian fields.
#[macro_export]
macro_rules! wire_accessors {
    (@impl $field:ident, u16) => {
        ::paste::paste! {
            #[inline]
            pub fn $field(&self) -> u16 {
                self.$field.get()
            }

            #[inline]
            pub fn [<set_ $field>](&mut self, val: u16) {
                self.$field = ::zerocopy::big_endian::U16::new(val);
            }
        }
    };
    (@impl $field:ident, u32) => {
        ::paste::paste! {
            #[inline]
            pub fn $field(&self) -> u32 {
                self.$field.get()
            }

            #[inline]
            pub fn [<set_ $field>](&mut self, val: u32) {
                self.$field = ::zerocopy::big_endian::U32::new(val);
            }
        }
    };
    (@impl $field:ident, u64) => {
        ::paste::paste! {
            #[inline]
            pub fn $field(&self) -> u64 {
                self.$field.get()
            }

            #[inline]
            pub fn [<set_ $field>](&mut self, val: u64) {
                self.$field = ::zerocopy::big_endian::U64::new(val);
            }
        }
    };
    ($($field:ident : $ty:tt),* $(,)?) => {
        $(
            $crate::wire_accessors!(@impl $field, $ty);
        )*
    };
}

/// Defines a wire record struct and derives its put/get pair.
#[macro_export]
macro_rules! schema_record {
    (
        $(#[$meta:meta])*
        pub struct $name:ident {
            $( $(#[$fmeta:meta])* $field:ident : $kind:tt ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Default)]
        pub struct $name {
            $( $(#[$fmeta])* pub $field: $crate::schema_record!(@ty $kind) ),*
        }

        impl $crate::schema::Record for $name {
            fn put(&self, message: &mut $crate::message::Message) -> $crate::error::Result<()> {
                $(
                    $crate::schema_record!(@put message, &self.$field, $kind).map_err(|e| {
                        e.wrap(concat!("failed to put '", stringify!($field), "' field"))
                    })?;
                )*
                Ok(())
            }

            fn get(message: &mut $crate::message::Message) -> $crate::error::Result<Self> {
                Ok(Self {
                    $(
                        $field: $crate::schema_record!(@get message, $kind).map_err(|e| {
                            e.wrap(concat!("failed to get '", stringify!($field), "' field"))
                        })?,
                    )*
                })
            }
        }
    };
    (@ty uint64) => { u64 };
    (@ty int64) => { i64 };
    (@ty float64) => { f64 };
    (@ty text) => { ::std::string::String };
    (@ty blob) => { ::std::vec::Vec<u8> };
    (@put $message:ident, $value:expr, uint64) => { $message.body_put_u64(*$value) };
    (@put $message:ident, $value:expr, int64) => { $message.body_put_i64(*$value) };
    (@put $message:ident, $value:expr, float64) => { $message.body_put_f64(*$value) };
    (@put $message:ident, $value:expr, text) => { $message.body_put_text($value) };
    (@put $message:ident, $value:expr, blob) => { $message.body_put_blob($value) };
    (@get $message:ident, uint64) => { $message.body_get_u64() };
    (@get $message:ident, int64) => { $message.body_get_i64() };
    (@get $message:ident, float64) => { $message.body_get_f64() };
    (@get $message:ident, text) => { $message.body_get_text().map(str::to_owned) };
    (@get $message:ident, blob) => { $message.body_get_blob().map(<[u8]>::to_vec) };
}
