//! Benchmark suite for heightmap summaries
//!
//! Run with: cargo bench --manifest-path benches/Cargo.toml --bench him_patches

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use rose_benches::generate_heightmap;
use rose_types::file::{HimFile, RoseFile};
use std::hint::black_box;

/// Patch grid and quad-tree generation
fn bench_generate_patches(c: &mut Criterion) {
	let mut group = c.benchmark_group("him_patches");
	let heights = generate_heightmap();

	group.throughput(Throughput::Elements(65 * 65));
	group.bench_function("generate", |b| {
		b.iter_batched_ref(
			|| heights.clone(),
			|heights| black_box(heights.generate_patches()),
			criterion::BatchSize::SmallInput,
		);
	});

	group.finish();
}

/// Full file decode and encode
fn bench_codec(c: &mut Criterion) {
	let mut group = c.benchmark_group("him_codec");
	let heights = generate_heightmap();
	let data = heights.to_bytes().expect("encode heightmap");

	group.throughput(Throughput::Bytes(data.len() as u64));
	group.bench_function("decode", |b| {
		b.iter(|| black_box(HimFile::from_bytes(black_box(&data))));
	});
	group.bench_function("encode", |b| {
		b.iter(|| black_box(black_box(&heights).to_bytes()));
	});

	group.finish();
}

criterion_group!(benches, bench_generate_patches, bench_codec);
criterion_main!(benches);
