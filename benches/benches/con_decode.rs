//! Benchmark suite for conversation decoding
//!
//! Measures the XOR descrambling on its own and as part of a full decode.
//!
//! Run with: cargo bench --manifest-path benches/Cargo.toml --bench con_decode

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use rose_benches::generate_conversation;
use rose_types::file::{ConFile, RoseFile, con::cipher};
use std::hint::black_box;

/// Raw byte descrambling
fn bench_cipher(c: &mut Criterion) {
	let mut group = c.benchmark_group("con_cipher");

	for size in [1024usize, 64 * 1024, 1024 * 1024] {
		let mut buffer = vec![0x5Au8; size];
		group.throughput(Throughput::Bytes(size as u64));
		group.bench_with_input(BenchmarkId::new("obfuscate_bytes", size), &size, |b, _| {
			b.iter(|| cipher::obfuscate_bytes(black_box(&mut buffer), 0x1234, 0xB0));
		});
	}

	group.finish();
}

/// Whole file decode across menu sizes
fn bench_decode(c: &mut Criterion) {
	let mut group = c.benchmark_group("con_decode");

	let cases = [("small", 4, 4, 2 * 1024), ("medium", 32, 8, 32 * 1024), ("large", 128, 16, 256 * 1024)];
	for (name, menus, messages, script) in cases {
		let data = generate_conversation(menus, messages, script);
		group.throughput(Throughput::Bytes(data.len() as u64));
		group.bench_with_input(BenchmarkId::new("decode", name), &data, |b, data| {
			b.iter(|| black_box(ConFile::from_bytes(black_box(data))));
		});
	}

	group.finish();
}

criterion_group!(benches, bench_cipher, bench_decode);
criterion_main!(benches);
