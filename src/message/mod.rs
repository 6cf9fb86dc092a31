//! # Message Framing Buffer
//!
//! A [`Message`] carries one request or response frame: an 8-byte header
//! (big-endian word count, message type, flags, two reserved bytes)
//! followed by a word-aligned body. The body lives in two buffers:
//!
//! ```text
//! +----------------+     +--------------------------+
//! | body1 (inline) | --> | body2 (overflow, heap)   |
//! | 4096 bytes     |     | allocated on demand,     |
//! | word-aligned   |     | grows by doubling        |
//! +----------------+     +--------------------------+
//! ```
//!
//! Encoding appends to `body1` until a value no longer fits; that value and
//! every later one go to `body2`. A value never straddles the two buffers,
//! and once `body2` holds a byte, `body1` is frozen. Decoding consumes
//! `body1` then `body2` in order.
//!
//! ## Alignment and Byte Order
//!
//! Every put and get starts at an 8-byte boundary. 64-bit values travel
//! big-endian; text is null-terminated and padded with explicit zero bytes
//! to the next word; blobs carry a 64-bit length before their padded bytes.
//! At the end of encoding, `words * 8 == offset1 + offset2`.
//!
//! ## Lifecycle
//!
//! A message is written with `header_put` + `body_put_*`, sealed by
//! [`Message::send_start`] (which stamps the word count and rewinds the
//! cursors), and then either handed to a transport or read back with
//! `body_get_*`. On the receive side, [`Message::header_recv`] and
//! [`Message::body_recv`] let a transport replay a frame into the buffers.
//! Creating a message allocates nothing beyond the inline body; dropping it
//! releases the overflow buffer.

use std::fmt;

use zerocopy::big_endian::{U16, U32};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

use crate::binary::{word_count, word_round_up};
use crate::config::{FRAME_HEADER_LEN, MESSAGE_BUF_LEN, WORD_SIZE};
use crate::error::{Error, ErrorKind, Result};

#[cfg(test)]
mod tests;

/// Wire frame header. All multi-byte fields are big-endian in memory, so
/// the struct can be cast to and from its wire bytes directly.
#[repr(C)]
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, FromBytes, IntoBytes, KnownLayout, Immutable,
    Unaligned,
)]
pub struct FrameHeader {
    words: U32,
    mtype: u8,
    flags: u8,
    extra: U16,
}

impl FrameHeader {
    pub fn new(words: u32, mtype: u8, flags: u8) -> Self {
        Self {
            words: U32::new(words),
            mtype,
            flags,
            extra: U16::new(0),
        }
    }

    wire_accessors! {
        words: u32,
        extra: u16,
    }

    #[inline]
    pub fn mtype(&self) -> u8 {
        self.mtype
    }

    #[inline]
    pub fn flags(&self) -> u8 {
        self.flags
    }

    /// The header as it appears on the wire.
    pub fn to_bytes(self) -> [u8; FRAME_HEADER_LEN] {
        zerocopy::transmute!(self)
    }

    /// Parses a header from its wire bytes.
    pub fn from_bytes(bytes: [u8; FRAME_HEADER_LEN]) -> Self {
        zerocopy::transmute!(bytes)
    }
}

#[repr(C, align(8))]
struct InlineBody([u8; MESSAGE_BUF_LEN]);

/// A framed buffer carrying one request or response.
pub struct Message {
    mtype: u8,
    flags: u8,
    words: u32,
    body1: InlineBody,
    body2: Vec<u8>,
    /// Valid prefix of `body1` while reading; set by `send_start`,
    /// `header_recv`, and `body_recv`.
    body1_used: usize,
    offset1: usize,
    offset2: usize,
}

impl Message {
    pub fn new() -> Self {
        Self {
            mtype: 0,
            flags: 0,
            words: 0,
            body1: InlineBody([0; MESSAGE_BUF_LEN]),
            body2: Vec::new(),
            body1_used: 0,
            offset1: 0,
            offset2: 0,
        }
    }

    /// Clears all state for reuse. The overflow buffer keeps its capacity.
    pub fn reset(&mut self) {
        self.mtype = 0;
        self.flags = 0;
        self.words = 0;
        self.body2.clear();
        self.body1_used = 0;
        self.offset1 = 0;
        self.offset2 = 0;
    }

    /// Stamps the pending header. The word count is filled in by
    /// [`Message::send_start`] once the body is complete.
    pub fn header_put(&mut self, mtype: u8, flags: u8) {
        self.mtype = mtype;
        self.flags = flags;
    }

    #[inline]
    pub fn mtype(&self) -> u8 {
        self.mtype
    }

    #[inline]
    pub fn flags(&self) -> u8 {
        self.flags
    }

    #[inline]
    pub fn words(&self) -> u32 {
        self.words
    }

    #[inline]
    pub fn offset1(&self) -> usize {
        self.offset1
    }

    #[inline]
    pub fn offset2(&self) -> usize {
        self.offset2
    }

    /// The inline body, including bytes past the current offsets.
    pub fn body1(&self) -> &[u8] {
        &self.body1.0
    }

    /// The overflow body; empty until encoding spills past the inline body.
    pub fn body2(&self) -> &[u8] {
        &self.body2
    }

    /// True once any byte has landed in the overflow body.
    #[inline]
    pub fn has_overflowed(&self) -> bool {
        !self.body2.is_empty()
    }

    /// True when the read cursor has consumed the declared body.
    #[inline]
    pub fn at_end(&self) -> bool {
        self.offset1 + self.offset2 >= self.declared_len()
    }

    #[inline]
    fn declared_len(&self) -> usize {
        self.words as usize * WORD_SIZE
    }

    /// Seals the body: stamps the word count, rewinds the cursors, and
    /// returns the header plus the two body slices for the transport.
    /// After this call the message is in the read phase.
    pub fn send_start(&mut self) -> (FrameHeader, &[u8], &[u8]) {
        debug_assert_eq!((self.offset1 + self.offset2) % WORD_SIZE, 0);
        self.words = word_count(self.offset1 + self.offset2) as u32;
        self.body1_used = self.offset1;
        self.offset1 = 0;
        self.offset2 = 0;
        let header = FrameHeader::new(self.words, self.mtype, self.flags);
        (header, &self.body1.0[..self.body1_used], &self.body2)
    }

    /// Loads a received frame header, resetting the body for the incoming
    /// payload.
    pub fn header_recv(&mut self, header: FrameHeader) {
        self.words = header.words();
        self.mtype = header.mtype();
        self.flags = header.flags();
        self.body2.clear();
        self.body1_used = 0;
        self.offset1 = 0;
        self.offset2 = 0;
    }

    /// Declares a body of `words` words and returns the zero-filled buffer
    /// the transport must fill. Bodies that fit the inline buffer land
    /// there; larger bodies are placed entirely in the overflow buffer.
    pub fn body_recv(&mut self, words: u32) -> Result<&mut [u8]> {
        let len = words as usize * WORD_SIZE;
        self.words = words;
        self.offset1 = 0;
        self.offset2 = 0;
        self.body2.clear();
        if len <= MESSAGE_BUF_LEN {
            self.body1_used = len;
            let buf = &mut self.body1.0[..len];
            buf.fill(0);
            Ok(buf)
        } else {
            self.body1_used = 0;
            self.body2
                .try_reserve_exact(len)
                .map_err(|_| Error::new(ErrorKind::NoMem, "cannot allocate overflow body"))?;
            self.body2.resize(len, 0);
            Ok(&mut self.body2)
        }
    }

    /// Returns the destination for a write of `len` bytes (a multiple of
    /// the word size), honoring the overflow policy.
    fn write_buf(&mut self, len: usize) -> Result<&mut [u8]> {
        debug_assert_eq!(len % WORD_SIZE, 0);
        if self.body2.is_empty() && self.offset1 + len <= MESSAGE_BUF_LEN {
            let start = self.offset1;
            self.offset1 += len;
            Ok(&mut self.body1.0[start..start + len])
        } else {
            self.body2
                .try_reserve(len)
                .map_err(|_| Error::new(ErrorKind::NoMem, "cannot allocate overflow body"))?;
            let start = self.offset2;
            self.body2.resize(start + len, 0);
            self.offset2 += len;
            Ok(&mut self.body2[start..start + len])
        }
    }

    /// Consumes `len` bytes (a multiple of the word size) at the read
    /// cursor.
    fn read_buf(&mut self, len: usize) -> Result<&[u8]> {
        debug_assert_eq!(len % WORD_SIZE, 0);
        if self.offset1 + self.offset2 + len > self.declared_len() {
            return Err(Error::new(ErrorKind::Eom, "no more words in message body"));
        }
        if self.offset1 < self.body1_used {
            if self.offset1 + len > self.body1_used {
                return Err(Error::new(
                    ErrorKind::Parse,
                    "read crosses the inline body boundary",
                ));
            }
            let start = self.offset1;
            self.offset1 += len;
            Ok(&self.body1.0[start..start + len])
        } else {
            if self.offset2 + len > self.body2.len() {
                return Err(Error::new(ErrorKind::Eom, "no more words in message body"));
            }
            let start = self.offset2;
            self.offset2 += len;
            Ok(&self.body2[start..start + len])
        }
    }

    pub fn body_put_u64(&mut self, value: u64) -> Result<()> {
        self.write_buf(WORD_SIZE)?.copy_from_slice(&value.to_be_bytes());
        Ok(())
    }

    pub fn body_put_i64(&mut self, value: i64) -> Result<()> {
        self.body_put_u64(value as u64)
    }

    pub fn body_put_f64(&mut self, value: f64) -> Result<()> {
        self.body_put_u64(value.to_bits())
    }

    /// Appends `text` plus a null terminator, padded with zero bytes to the
    /// next word boundary.
    pub fn body_put_text(&mut self, text: &str) -> Result<()> {
        if text.as_bytes().contains(&0) {
            return Err(Error::new(
                ErrorKind::Parse,
                "text contains an interior null byte",
            ));
        }
        let padded = word_round_up(text.len() + 1);
        let buf = self.write_buf(padded)?;
        buf[..text.len()].copy_from_slice(text.as_bytes());
        buf[text.len()..].fill(0);
        Ok(())
    }

    /// Appends a 64-bit length followed by the blob bytes, padded to the
    /// next word boundary.
    pub fn body_put_blob(&mut self, blob: &[u8]) -> Result<()> {
        self.body_put_u64(blob.len() as u64)?;
        if !blob.is_empty() {
            let padded = word_round_up(blob.len());
            let buf = self.write_buf(padded)?;
            buf[..blob.len()].copy_from_slice(blob);
            buf[blob.len()..].fill(0);
        }
        Ok(())
    }

    /// Appends raw bytes padded to the next word boundary. Row headers use
    /// this; the bytes carry no length prefix and no terminator, so the
    /// reader must know their count.
    pub fn body_put_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        if bytes.is_empty() {
            return Ok(());
        }
        let padded = word_round_up(bytes.len());
        let buf = self.write_buf(padded)?;
        buf[..bytes.len()].copy_from_slice(bytes);
        buf[bytes.len()..].fill(0);
        Ok(())
    }

    pub fn body_get_u64(&mut self) -> Result<u64> {
        let bytes = self.read_buf(WORD_SIZE)?;
        // INVARIANT: read_buf returned exactly WORD_SIZE bytes.
        Ok(u64::from_be_bytes(bytes.try_into().unwrap()))
    }

    pub fn body_get_i64(&mut self) -> Result<i64> {
        self.body_get_u64().map(|v| v as i64)
    }

    pub fn body_get_f64(&mut self) -> Result<f64> {
        self.body_get_u64().map(f64::from_bits)
    }

    /// Reads a null-terminated string at the cursor, consuming it and its
    /// padding.
    pub fn body_get_text(&mut self) -> Result<&str> {
        if self.at_end() {
            return Err(Error::new(ErrorKind::Eom, "no more words in message body"));
        }
        let in_body1 = self.offset1 < self.body1_used;
        let (start, len) = {
            let region = if in_body1 {
                &self.body1.0[self.offset1..self.body1_used]
            } else {
                &self.body2[self.offset2..]
            };
            let nul = region
                .iter()
                .position(|&b| b == 0)
                .ok_or_else(|| Error::new(ErrorKind::Parse, "text is not null-terminated"))?;
            (if in_body1 { self.offset1 } else { self.offset2 }, nul)
        };
        let advance = word_round_up(len + 1);
        let bytes = if in_body1 {
            self.offset1 += advance;
            &self.body1.0[start..start + len]
        } else {
            self.offset2 += advance;
            &self.body2[start..start + len]
        };
        std::str::from_utf8(bytes)
            .map_err(|_| Error::new(ErrorKind::Parse, "text is not valid UTF-8"))
    }

    /// Reads a length-prefixed blob at the cursor, consuming it and its
    /// padding.
    pub fn body_get_blob(&mut self) -> Result<&[u8]> {
        let len = self.body_get_u64()?;
        let remaining = (self.declared_len() - self.offset1 - self.offset2) as u64;
        if len > remaining {
            return Err(Error::new(ErrorKind::Eom, "no more words in message body"));
        }
        let len = len as usize;
        if len == 0 {
            return Ok(&[]);
        }
        let bytes = self.read_buf(word_round_up(len))?;
        Ok(&bytes[..len])
    }

    /// Reads `len` raw bytes at the cursor, consuming them and their
    /// padding.
    pub fn body_get_bytes(&mut self, len: usize) -> Result<&[u8]> {
        if len == 0 {
            return Ok(&[]);
        }
        let bytes = self.read_buf(word_round_up(len))?;
        Ok(&bytes[..len])
    }
}

impl Default for Message {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Message")
            .field("mtype", &self.mtype)
            .field("flags", &self.flags)
            .field("words", &self.words)
            .field("offset1", &self.offset1)
            .field("offset2", &self.offset2)
            .field("overflow", &self.body2.len())
            .finish()
    }
}
