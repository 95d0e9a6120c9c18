//! Benchmarks for memoizing caches and the inflector.
//!
//! Run with: `cargo bench --bench memo`

mod common;

use std::sync::Arc;
use std::time::Instant;

use common::workload::{Workload, WorkloadSpec, word};
use criterion::{BatchSize, BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use memokit::builder::MemoizingCacheBuilder;
use memokit::ds::PruneTable;
use memokit::inflector::{Inflect, Inflector, MemoizingInflector};
use memokit::memo::MemoizingCache;
use memokit::policy::prune::PruneTrigger;

// ============================================================================
// Raw inflection vs memoized inflection
// ============================================================================

fn bench_inflector_direct_vs_memo(c: &mut Criterion) {
    let words = WorkloadSpec {
        universe: 400,
        workload: Workload::Zipfian { s: 1.0 },
        seed: 42,
    }
    .words(4096);

    let mut group = c.benchmark_group("inflector");
    group.throughput(Throughput::Elements(words.len() as u64));

    group.bench_function("direct_camel", |b| {
        b.iter(|| {
            for w in &words {
                let _ = std::hint::black_box(Inflector.camel(w));
            }
        })
    });

    let memo = MemoizingInflector::new(Arc::new(Inflector));
    group.bench_function("memoized_camel", |b| {
        b.iter(|| {
            for w in &words {
                let _ = std::hint::black_box(memo.camel(w));
            }
        })
    });

    group.finish();
}

// ============================================================================
// Hit path (pure read performance)
// ============================================================================

fn bench_memo_get_hit_ns(c: &mut Criterion) {
    c.bench_function("memo_get_hit_ns", |b| {
        b.iter_custom(|iters| {
            let capacity = 500u64;
            let mut cache: MemoizingCache<String, String, _> =
                MemoizingCache::new(Arc::new(Inflector), capacity as usize);
            let words: Vec<String> = (0..capacity - 1).map(word).collect();
            for w in &words {
                let _ = cache.get("camel", w.as_str());
            }
            let start = Instant::now();
            for i in 0..iters {
                let w = &words[(i as usize) % words.len()];
                let _ = std::hint::black_box(cache.get("camel", w.as_str()));
            }
            start.elapsed()
        })
    });
}

// ============================================================================
// Prune churn (every miss lands on a full table eventually)
// ============================================================================

fn bench_memo_prune_churn(c: &mut Criterion) {
    let mut group = c.benchmark_group("memo_prune_churn");
    group.throughput(Throughput::Elements(4096));

    for trigger in [PruneTrigger::AtCapacity, PruneTrigger::AtOrAboveCapacity] {
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{:?}", trigger)),
            &trigger,
            |b, &trigger| {
                b.iter_batched(
                    || {
                        let cache: MemoizingCache<String, String, _> =
                            MemoizingCacheBuilder::new(500)
                                .trigger(trigger)
                                .build(Arc::new(Inflector));
                        (cache, (0..4096u64).map(word).collect::<Vec<_>>())
                    },
                    |(mut cache, words)| {
                        for w in &words {
                            let _ = std::hint::black_box(cache.get("snake", w.as_str()));
                        }
                    },
                    BatchSize::SmallInput,
                )
            },
        );
    }

    group.finish();
}

// ============================================================================
// PruneTable micro ops
// ============================================================================

fn bench_prune_table_insert_prune(c: &mut Criterion) {
    c.bench_function("prune_table_insert_prune", |b| {
        b.iter(|| {
            let mut table = PruneTable::new(1024);
            for i in 0..4096u64 {
                if table.needs_prune() {
                    let _ = table.prune();
                }
                table.insert(i, i);
            }
            std::hint::black_box(table.len())
        })
    });
}

// ============================================================================
// Hit rate across workloads
// ============================================================================

fn bench_memo_workload_hit_rate(c: &mut Criterion) {
    let mut group = c.benchmark_group("memo_hit_rate");
    let operations = 20_000;
    let workloads = [
        ("uniform", Workload::Uniform),
        (
            "hotset_90_10",
            Workload::Hotset {
                hot_fraction: 0.1,
                hot_prob: 0.9,
            },
        ),
        ("scan", Workload::Scan),
        ("zipfian_1.0", Workload::Zipfian { s: 1.0 }),
    ];

    for (name, workload) in workloads {
        let words = WorkloadSpec {
            universe: 2_000,
            workload,
            seed: 7,
        }
        .words(operations);
        group.throughput(Throughput::Elements(operations as u64));
        group.bench_function(name, |b| {
            b.iter(|| {
                let mut cache: MemoizingCache<String, String, _> =
                    MemoizingCache::new(Arc::new(Inflector), 500);
                for w in &words {
                    let _ = cache.get("camel", w.as_str());
                }
                std::hint::black_box(cache.len("camel"))
            })
        });
    }

    group.finish();
}

criterion_group!(inflection, bench_inflector_direct_vs_memo);
criterion_group!(micro_ops, bench_memo_get_hit_ns, bench_prune_table_insert_prune);
criterion_group!(policy_level, bench_memo_prune_churn);
criterion_group!(workloads, bench_memo_workload_hit_rate);
criterion_main!(inflection, micro_ops, policy_level, workloads);
