//! Message encoding benchmarks for sqlwire
//!
//! These benchmarks measure the hot path of the codec: word, string, and
//! blob puts, plus the row-shaped sequences the statement adapter emits
//! while streaming a result set.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use sqlwire::{flip64, Message};

fn bench_put_words(c: &mut Criterion) {
    let mut group = c.benchmark_group("put_words");

    for count in [8usize, 64, 512] {
        group.bench_with_input(BenchmarkId::new("u64", count), &count, |b, &count| {
            let mut message = Message::new();
            b.iter(|| {
                message.reset();
                for i in 0..count {
                    message.body_put_u64(black_box(i as u64)).unwrap();
                }
                black_box(message.offset1())
            });
        });
    }

    group.finish();
}

fn bench_put_text(c: &mut Criterion) {
    let mut group = c.benchmark_group("put_text");

    let samples: [(&str, &str); 3] = [
        ("short", "n"),
        ("word", "column_name"),
        ("long", "a considerably longer string that spans several words"),
    ];

    for (name, text) in samples {
        group.bench_with_input(BenchmarkId::new("text", name), &text, |b, &text| {
            let mut message = Message::new();
            b.iter(|| {
                message.reset();
                for _ in 0..64 {
                    message.body_put_text(black_box(text)).unwrap();
                }
                black_box(message.offset1())
            });
        });
    }

    group.finish();
}

fn bench_encode_rows(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode_rows");

    // The shape of a three-column (INT, TEXT, FLOAT) result row: nibble
    // header, then the word-aligned values.
    group.bench_function("three_column_row", |b| {
        let mut message = Message::new();
        b.iter(|| {
            message.reset();
            message.body_put_u64(3).unwrap();
            message.body_put_text("n").unwrap();
            message.body_put_text("t").unwrap();
            message.body_put_text("f").unwrap();
            for i in 0..100i64 {
                message.body_put_bytes(&[0x31, 0x02]).unwrap();
                message.body_put_i64(black_box(i)).unwrap();
                message.body_put_text(black_box("hello world")).unwrap();
                message.body_put_f64(black_box(3.1415)).unwrap();
            }
            black_box(message.offset1() + message.offset2())
        });
    });

    group.finish();
}

fn bench_round_trip(c: &mut Criterion) {
    let mut group = c.benchmark_group("round_trip");

    group.bench_function("flip64", |b| {
        b.iter(|| black_box(flip64(black_box(0x0102_0304_0506_0708))));
    });

    group.bench_function("u64_words", |b| {
        let mut message = Message::new();
        b.iter(|| {
            message.reset();
            for i in 0..128 {
                message.body_put_u64(i).unwrap();
            }
            message.send_start();
            let mut sum = 0u64;
            for _ in 0..128 {
                sum = sum.wrapping_add(message.body_get_u64().unwrap());
            }
            black_box(sum)
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_put_words,
    bench_put_text,
    bench_encode_rows,
    bench_round_trip
);
criterion_main!(benches);
