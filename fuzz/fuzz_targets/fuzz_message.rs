//! Fuzz testing for the message body decoder.
//!
//! This fuzz target replays arbitrary frames through the receive path and
//! then runs arbitrary sequences of typed gets against them, to ensure
//! malformed input is always rejected with an error instead of panicking
//! or reading out of bounds.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use sqlwire::Message;

#[derive(Debug, Arbitrary)]
struct FrameInput {
    body: Vec<u8>,
    reads: Vec<ReadOp>,
}

#[derive(Debug, Arbitrary, Clone, Copy)]
enum ReadOp {
    U64,
    I64,
    F64,
    Text,
    Blob,
    Bytes(u8),
}

fuzz_target!(|input: FrameInput| {
    let mut message = Message::new();

    // Declare however many whole words the fuzzer produced.
    let words = (input.body.len() / 8) as u32;
    let len = words as usize * 8;
    let Ok(buf) = message.body_recv(words) else {
        return;
    };
    buf.copy_from_slice(&input.body[..len]);

    for op in &input.reads {
        let result = match op {
            ReadOp::U64 => message.body_get_u64().map(|_| ()),
            ReadOp::I64 => message.body_get_i64().map(|_| ()),
            ReadOp::F64 => message.body_get_f64().map(|_| ()),
            ReadOp::Text => message.body_get_text().map(|_| ()),
            ReadOp::Blob => message.body_get_blob().map(|_| ()),
            ReadOp::Bytes(n) => message.body_get_bytes(*n as usize).map(|_| ()),
        };
        // Errors are expected on malformed input; panics are not.
        let _ = result;
    }
});
