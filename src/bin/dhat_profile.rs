//! DHAT heap profiler for memokit.
//!
//! Run with: cargo run --bin dhat_profile --release --features dhat-heap
//! View results: Open dhat-heap.json in <https://nnethercote.github.io/dh_view/dh_view.html>

#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

use std::sync::Arc;

use memokit::builder::MemoizingCacheBuilder;
use memokit::inflector::{Inflect, Inflector, MemoizingInflector};
use memokit::policy::prune::PruneTrigger;

/// Simple XorShift64 RNG for deterministic workloads.
struct XorShift64 {
    state: u64,
}

impl XorShift64 {
    fn new(seed: u64) -> Self {
        Self { state: seed.max(1) }
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    fn next_f64(&mut self) -> f64 {
        const SCALE: f64 = 1.0 / (u64::MAX as f64);
        (self.next_u64() as f64) * SCALE
    }
}

/// Identifier-like word for index `i`, e.g. `header_name_17`.
fn word(i: u64) -> String {
    format!("header_name_{}", i)
}

/// Hotset workload: 90% of lookups hit 10% of the vocabulary.
fn hotset_words(inflector: &impl Inflect, operations: usize, universe: u64, seed: u64) {
    let mut rng = XorShift64::new(seed);
    let hot_size = (universe as f64 * 0.1) as u64;

    for _ in 0..operations {
        let i = if rng.next_f64() < 0.9 {
            rng.next_u64() % hot_size
        } else {
            hot_size + (rng.next_u64() % (universe - hot_size))
        };
        let camel = inflector.camel(&word(i));
        let _ = inflector.snake(&camel);
    }
}

/// Vocabulary far larger than capacity, so nearly every lookup prunes.
fn prune_churn(inflector: &impl Inflect, operations: usize) {
    for i in 0..operations as u64 {
        let _ = inflector.camel(&word(i));
    }
}

fn profile_memoizing_inflector() {
    println!("=== Profiling MemoizingInflector ===");
    let operations = 100_000;
    let universe = 2_000;

    let inflector = MemoizingInflector::new(Arc::new(Inflector));

    hotset_words(&inflector, operations, universe, 42);
    prune_churn(&inflector, operations / 4);

    println!("  Final snake size: {}", inflector.len("snake"));
    println!("  Final camel size: {}", inflector.len("camel"));
}

fn profile_strict_trigger() {
    println!("=== Profiling AtOrAboveCapacity ===");
    let operations = 100_000;
    let universe = 16_384;

    let cache = MemoizingCacheBuilder::new(4096)
        .trigger(PruneTrigger::AtOrAboveCapacity)
        .build(Arc::new(Inflector));
    let inflector = MemoizingInflector::from_cache(cache);

    hotset_words(&inflector, operations, universe, 7);
    prune_churn(&inflector, operations / 4);

    println!("  Final camel size: {}", inflector.len("camel"));
}

fn main() {
    let _profiler = dhat::Profiler::new_heap();

    println!("memokit DHAT Heap Profiling");
    println!("===========================\n");

    profile_memoizing_inflector();
    profile_strict_trigger();

    println!("\n===========================");
    println!("Profile written to dhat-heap.json");
}
