//! # Transport Value Tags
//!
//! One-byte discriminators identifying the wire representation of a
//! parameter or column value. The numeric values are contractual: peers on
//! other stacks hard-code them.
//!
//! The first five tags coincide with the engine's native storage classes,
//! so a column's storage type maps onto the wire without translation in the
//! common case. The remaining three are logical extensions: the statement
//! adapter derives them from a column's declared type and transports them
//! on top of the INTEGER and TEXT encodings.
//!
//! | Tag | Value | Wire representation |
//! |-----|-------|---------------------|
//! | Integer | 1 | 64-bit big-endian signed integer |
//! | Float | 2 | 64-bit big-endian IEEE-754 double |
//! | Text | 3 | null-terminated UTF-8, padded to word |
//! | Blob | 4 | 64-bit length, then bytes, padded to word |
//! | Null | 5 | one 64-bit zero word |
//! | Unixtime | 9 | 64-bit big-endian seconds since epoch |
//! | Iso8601 | 10 | null-terminated timestamp string, padded |
//! | Boolean | 11 | 64-bit big-endian 0 or 1 |

/// Wire type tag for a parameter or column value.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueTag {
    Integer = 1,
    Float = 2,
    Text = 3,
    Blob = 4,
    Null = 5,
    Unixtime = 9,
    Iso8601 = 10,
    Boolean = 11,
}

impl ValueTag {
    /// Decodes a tag byte, rejecting values outside the recognized set.
    #[inline]
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::Integer),
            2 => Some(Self::Float),
            3 => Some(Self::Text),
            4 => Some(Self::Blob),
            5 => Some(Self::Null),
            9 => Some(Self::Unixtime),
            10 => Some(Self::Iso8601),
            11 => Some(Self::Boolean),
            _ => None,
        }
    }

    /// The tag's wire byte. Always fits in a nibble, which the row header
    /// packing relies on.
    #[inline]
    pub fn code(self) -> u8 {
        self as u8
    }
}
