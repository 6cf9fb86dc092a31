use super::*;
use crate::binary::flip64;
use crate::types::ValueTag;

fn word_at(body: &[u8], offset: usize) -> u64 {
    u64::from_ne_bytes(body[offset..offset + WORD_SIZE].try_into().unwrap())
}

#[test]
fn frame_header_round_trips_through_wire_bytes() {
    let header = FrameHeader::new(3, 7, 1);
    let bytes = header.to_bytes();
    assert_eq!(bytes, [0, 0, 0, 3, 7, 1, 0, 0]);
    assert_eq!(FrameHeader::from_bytes(bytes), header);
}

#[test]
fn frame_header_words_are_big_endian() {
    let mut header = FrameHeader::new(0, 0, 0);
    header.set_words(0x0102_0304);
    assert_eq!(header.to_bytes()[..4], [0x01, 0x02, 0x03, 0x04]);
    assert_eq!(header.words(), 0x0102_0304);
}

#[test]
fn put_u64_is_big_endian_in_the_body() {
    let mut m = Message::new();
    m.body_put_u64(0x0102_0304_0506_0708).unwrap();
    assert_eq!(
        m.body1()[..8],
        [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08]
    );
}

#[test]
fn primitive_round_trips() {
    let mut m = Message::new();
    m.body_put_u64(u64::MAX - 1).unwrap();
    m.body_put_i64(-666).unwrap();
    m.body_put_f64(3.1415).unwrap();
    m.body_put_text("hello").unwrap();
    m.body_put_blob(&[0xDE, 0xAD, 0xBE, 0xEF]).unwrap();
    m.send_start();

    assert_eq!(m.body_get_u64().unwrap(), u64::MAX - 1);
    assert_eq!(m.body_get_i64().unwrap(), -666);
    assert_eq!(m.body_get_f64().unwrap(), 3.1415);
    assert_eq!(m.body_get_text().unwrap(), "hello");
    assert_eq!(m.body_get_blob().unwrap(), &[0xDE, 0xAD, 0xBE, 0xEF]);
    assert!(m.at_end());
}

#[test]
fn float_round_trip_is_bit_identical() {
    let mut m = Message::new();
    m.body_put_f64(3.1415).unwrap();
    m.send_start();
    assert_eq!(m.body_get_f64().unwrap().to_bits(), 3.1415f64.to_bits());
}

#[test]
fn cursor_stays_word_aligned_after_any_put_sequence() {
    let mut m = Message::new();
    for text in ["", "a", "seven77", "eight888", "a longer string value"] {
        m.body_put_text(text).unwrap();
        assert_eq!((m.offset1() + m.offset2()) % WORD_SIZE, 0);
    }
    m.body_put_blob(&[1, 2, 3]).unwrap();
    assert_eq!((m.offset1() + m.offset2()) % WORD_SIZE, 0);
    m.body_put_u64(9).unwrap();
    assert_eq!((m.offset1() + m.offset2()) % WORD_SIZE, 0);
}

#[test]
fn text_is_null_terminated_and_zero_padded() {
    let mut m = Message::new();
    m.body_put_text("hello").unwrap();
    assert_eq!(m.offset1(), 8);
    assert_eq!(&m.body1()[..8], b"hello\0\0\0");

    // Exactly one word of content forces a full word of padding for the
    // terminator.
    let mut m = Message::new();
    m.body_put_text("eight888").unwrap();
    assert_eq!(m.offset1(), 16);
    assert_eq!(&m.body1()[..16], b"eight888\0\0\0\0\0\0\0\0");
}

#[test]
fn text_with_interior_null_is_rejected() {
    let mut m = Message::new();
    let err = m.body_put_text("bad\0text").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Parse);
}

#[test]
fn blob_layout_is_length_then_padded_bytes() {
    let mut m = Message::new();
    m.body_put_blob(&[1, 2, 3]).unwrap();
    assert_eq!(m.offset1(), 16);
    assert_eq!(flip64(word_at(m.body1(), 0)), 3);
    assert_eq!(&m.body1()[8..16], &[1, 2, 3, 0, 0, 0, 0, 0]);
}

#[test]
fn empty_blob_round_trips() {
    let mut m = Message::new();
    m.body_put_blob(&[]).unwrap();
    assert_eq!(m.offset1(), 8);
    m.send_start();
    assert_eq!(m.body_get_blob().unwrap(), &[] as &[u8]);
}

#[test]
fn send_start_stamps_words_from_the_offsets() {
    let mut m = Message::new();
    m.header_put(2, 0);
    m.body_put_u64(1).unwrap();
    m.body_put_text("abc").unwrap();
    let (header, body1, body2) = m.send_start();
    assert_eq!(header.words(), 2);
    assert_eq!(header.mtype(), 2);
    assert_eq!(body1.len() + body2.len(), header.words() as usize * WORD_SIZE);
}

#[test]
fn reads_past_declared_length_fail_with_eom() {
    let mut m = Message::new();
    m.body_put_u64(42).unwrap();
    m.send_start();
    m.body_get_u64().unwrap();
    let err = m.body_get_u64().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Eom);
}

#[test]
fn unterminated_text_fails_with_parse() {
    let mut m = Message::new();
    let body = m.body_recv(1).unwrap();
    body.fill(0xFF);
    let err = m.body_get_text().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Parse);
}

#[test]
fn non_utf8_text_fails_with_parse() {
    let mut m = Message::new();
    let body = m.body_recv(1).unwrap();
    body[0] = 0xC3;
    body[1] = 0x28;
    let err = m.body_get_text().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Parse);
}

#[test]
fn fresh_message_is_at_end() {
    let m = Message::new();
    assert!(m.at_end());
}

#[test]
fn writes_spill_into_the_overflow_body() {
    let mut m = Message::new();
    let words = MESSAGE_BUF_LEN / WORD_SIZE;
    for i in 0..words {
        m.body_put_u64(i as u64).unwrap();
    }
    assert_eq!(m.offset1(), MESSAGE_BUF_LEN);
    assert!(!m.has_overflowed());

    m.body_put_u64(0xAA).unwrap();
    assert!(m.has_overflowed());
    assert_eq!(m.offset1(), MESSAGE_BUF_LEN);
    assert_eq!(m.offset2(), 8);
}

#[test]
fn overflow_is_monotone_once_engaged() {
    let mut m = Message::new();
    // Leave a word-sized tail in body1, then write something too large
    // for it.
    for _ in 0..(MESSAGE_BUF_LEN / WORD_SIZE - 1) {
        m.body_put_u64(0).unwrap();
    }
    let frozen = m.offset1();
    m.body_put_text("does not fit in one word").unwrap();
    assert!(m.has_overflowed());
    assert_eq!(m.offset1(), frozen);

    // A word-sized value would still fit body1's tail, but must follow
    // into body2.
    m.body_put_u64(7).unwrap();
    assert_eq!(m.offset1(), frozen);
}

#[test]
fn overflowed_body_round_trips() {
    let mut m = Message::new();
    let count = MESSAGE_BUF_LEN / WORD_SIZE + 100;
    for i in 0..count {
        m.body_put_u64(i as u64).unwrap();
    }
    let (header, body1, body2) = m.send_start();
    assert_eq!(header.words() as usize, count);
    assert_eq!(body1.len(), MESSAGE_BUF_LEN);
    assert!(!body2.is_empty());
    for i in 0..count {
        assert_eq!(m.body_get_u64().unwrap(), i as u64);
    }
    assert!(m.at_end());
}

#[test]
fn value_that_skips_the_inline_tail_decodes_cleanly() {
    let mut m = Message::new();
    for _ in 0..(MESSAGE_BUF_LEN / WORD_SIZE - 1) {
        m.body_put_u64(1).unwrap();
    }
    m.body_put_text("sixteen byte str").unwrap();
    m.send_start();
    for _ in 0..(MESSAGE_BUF_LEN / WORD_SIZE - 1) {
        assert_eq!(m.body_get_u64().unwrap(), 1);
    }
    assert_eq!(m.body_get_text().unwrap(), "sixteen byte str");
    assert!(m.at_end());
}

#[test]
fn large_received_body_lands_in_the_overflow_buffer() {
    let mut src = Message::new();
    let count = MESSAGE_BUF_LEN / WORD_SIZE + 3;
    for i in 0..count {
        src.body_put_u64(i as u64).unwrap();
    }
    let (header, body1, body2) = src.send_start();

    let mut dst = Message::new();
    dst.header_recv(header);
    let buf = dst.body_recv(header.words()).unwrap();
    buf[..body1.len()].copy_from_slice(body1);
    buf[body1.len()..].copy_from_slice(body2);
    assert_eq!(dst.body1_used, 0);

    for i in 0..count {
        assert_eq!(dst.body_get_u64().unwrap(), i as u64);
    }
}

#[test]
fn header_recv_sets_the_dispatch_type() {
    let mut m = Message::new();
    m.header_recv(FrameHeader::new(1, 9, 3));
    assert_eq!(m.mtype(), 9);
    assert_eq!(m.flags(), 3);
    assert_eq!(m.words(), 1);
}

#[test]
fn raw_bytes_consume_their_padding() {
    let mut m = Message::new();
    m.body_put_bytes(&[ValueTag::Integer.code(), ValueTag::Float.code()])
        .unwrap();
    m.body_put_u64(5).unwrap();
    assert_eq!(m.offset1(), 16);
    m.send_start();
    assert_eq!(
        m.body_get_bytes(2).unwrap(),
        &[ValueTag::Integer.code(), ValueTag::Float.code()]
    );
    assert_eq!(m.body_get_u64().unwrap(), 5);
}

#[test]
fn blob_with_bogus_length_fails_with_eom() {
    let mut m = Message::new();
    let body = m.body_recv(1).unwrap();
    body[..8].copy_from_slice(&u64::MAX.to_be_bytes());
    let err = m.body_get_blob().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Eom);
}

#[test]
fn reset_allows_reuse() {
    let mut m = Message::new();
    m.header_put(4, 0);
    m.body_put_text("first").unwrap();
    m.send_start();
    m.reset();
    assert_eq!(m.mtype(), 0);
    assert_eq!(m.offset1(), 0);
    m.body_put_u64(2).unwrap();
    m.send_start();
    assert_eq!(m.body_get_u64().unwrap(), 2);
}
