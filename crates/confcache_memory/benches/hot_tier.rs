// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Benchmarks for hot tier reads, writes, and eviction.

#![allow(missing_docs, reason = "Benchmark code")]

use std::hint::black_box;

use confcache_memory::{EvictionPolicy, HotTier};
use confcache_tier::KeyPattern;
use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use tick::Clock;

fn filled(max_size: usize, policy: EvictionPolicy) -> HotTier<String> {
    let hot = HotTier::builder(Clock::new_frozen())
        .max_size(max_size)
        .eviction_policy(policy)
        .build();
    for i in 0..max_size {
        let _ = hot.set(&format!("key_{i}"), format!("value_{i}"), None);
    }
    hot
}

fn bench_operations(c: &mut Criterion) {
    let mut group = c.benchmark_group("hot_tier");

    group.bench_function("get_hit", |b| {
        let hot = filled(1000, EvictionPolicy::NearestExpiry);
        let mut i = 0_usize;
        b.iter(|| {
            i = (i + 1) % 1000;
            black_box(hot.get(&format!("key_{i}")));
        });
    });

    group.bench_function("get_miss", |b| {
        let hot = filled(1000, EvictionPolicy::NearestExpiry);
        b.iter(|| black_box(hot.get("missing")));
    });

    group.bench_function("overwrite", |b| {
        let hot = filled(1000, EvictionPolicy::NearestExpiry);
        b.iter(|| black_box(hot.set("key_1", "updated".to_string(), None)));
    });

    group.finish();
}

fn bench_eviction(c: &mut Criterion) {
    let mut group = c.benchmark_group("hot_tier_eviction");

    for policy in [EvictionPolicy::NearestExpiry, EvictionPolicy::OldestInserted] {
        group.bench_function(format!("{policy:?}"), |b| {
            b.iter_batched(
                || filled(1000, policy),
                |hot| black_box(hot.set("new", "value".to_string(), None)),
                BatchSize::LargeInput,
            );
        });
    }

    group.bench_function("invalidate_prefix", |b| {
        let pattern = KeyPattern::new("^key_1").expect("valid pattern");
        b.iter_batched(
            || filled(1000, EvictionPolicy::NearestExpiry),
            |hot| black_box(hot.invalidate(&pattern)),
            BatchSize::LargeInput,
        );
    });

    group.finish();
}

criterion_group!(benches, bench_operations, bench_eviction);
criterion_main!(benches);
