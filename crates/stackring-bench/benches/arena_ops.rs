//! Criterion micro-benchmarks for raw arena reservations.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use stackring_arena::{Allocator, Arena, ArenaAllocator, ArenaConfig};

/// Benchmark: Fill a 64 KiB arena with 16-byte reservations.
fn bench_reserve_fill_64k(c: &mut Criterion) {
    c.bench_function("arena_reserve_fill_64k", |b| {
        b.iter(|| {
            let arena = Arena::new(ArenaConfig::default()).unwrap();
            while let Ok(ptr) = arena.reserve(16, 16) {
                black_box(ptr);
            }
            black_box(arena.reservations());
        });
    });
}

/// Benchmark: Mixed alignments, which exercise the padding path.
fn bench_reserve_mixed_align(c: &mut Criterion) {
    const ALIGNS: [usize; 4] = [1, 8, 4, 64];
    c.bench_function("arena_reserve_mixed_align", |b| {
        b.iter(|| {
            let arena = Arena::new(ArenaConfig::default()).unwrap();
            let mut i = 0;
            while let Ok(ptr) = arena.reserve(24, ALIGNS[i % ALIGNS.len()]) {
                black_box(ptr);
                i += 1;
            }
            black_box(arena.used());
        });
    });
}

/// Benchmark: Typed allocation through an ArenaAllocator handle.
fn bench_typed_allocate(c: &mut Criterion) {
    c.bench_function("arena_allocator_allocate_u64x4", |b| {
        b.iter(|| {
            let arena = Arena::new(ArenaConfig::default()).unwrap();
            let alloc = ArenaAllocator::<u64>::new(&arena);
            while let Ok(ptr) = alloc.allocate(4) {
                black_box(ptr);
            }
        });
    });
}

criterion_group!(
    benches,
    bench_reserve_fill_64k,
    bench_reserve_mixed_align,
    bench_typed_allocate
);
criterion_main!(benches);
