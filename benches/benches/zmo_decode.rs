//! Benchmark suite for motion decoding
//!
//! Run with: cargo bench --manifest-path benches/Cargo.toml --bench zmo_decode

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use rose_benches::generate_motion;
use rose_types::file::{RoseFile, ZmoFile};
use std::hint::black_box;

fn bench_decode(c: &mut Criterion) {
	let mut group = c.benchmark_group("zmo_decode");

	for (bones, frames) in [(20u32, 30usize), (60, 120), (120, 600)] {
		let data = generate_motion(bones, frames);
		let id = format!("{bones}x{frames}");
		group.throughput(Throughput::Elements(u64::from(bones) * 2 * frames as u64));
		group.bench_with_input(BenchmarkId::new("decode", id), &data, |b, data| {
			b.iter(|| black_box(ZmoFile::from_bytes(black_box(data))));
		});
	}

	group.finish();
}

criterion_group!(benches, bench_decode);
criterion_main!(benches);
