//! Word streams for memoization benchmarks.
//!
//! Keys are indices into a fixed vocabulary of identifier-like words, drawn
//! from a seeded RNG so runs are repeatable.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Zipf};

#[derive(Debug, Clone, Copy)]
pub enum Workload {
    /// Uniform random words in `[0, universe)`.
    Uniform,
    /// Hot/cold split with a configurable hot fraction and hot access probability.
    Hotset { hot_fraction: f64, hot_prob: f64 },
    /// Sequential scan in `[0, universe)`.
    Scan,
    /// Zipfian distribution with exponent `s`; identifier traffic is heavily skewed.
    Zipfian { s: f64 },
}

#[derive(Debug, Clone, Copy)]
pub struct WorkloadSpec {
    pub universe: u64,
    pub workload: Workload,
    pub seed: u64,
}

impl WorkloadSpec {
    pub fn generator(self) -> WorkloadGenerator {
        WorkloadGenerator::new(self.universe, self.workload, self.seed)
    }

    /// Pre-generates `operations` words so the timed loop only measures the cache.
    pub fn words(self, operations: usize) -> Vec<String> {
        let mut generator = self.generator();
        (0..operations).map(|_| word(generator.next_key())).collect()
    }
}

pub struct WorkloadGenerator {
    universe: u64,
    workload: Workload,
    rng: SmallRng,
    scan_pos: u64,
    zipf: Option<Zipf<f64>>,
}

impl WorkloadGenerator {
    pub fn new(universe: u64, workload: Workload, seed: u64) -> Self {
        let universe = universe.max(1);
        let zipf = match workload {
            Workload::Zipfian { s } => Zipf::new(universe as f64, s).ok(),
            _ => None,
        };
        Self {
            universe,
            workload,
            rng: SmallRng::seed_from_u64(seed),
            scan_pos: 0,
            zipf,
        }
    }

    pub fn next_key(&mut self) -> u64 {
        match self.workload {
            Workload::Uniform => self.rng.random_range(0..self.universe),
            Workload::Hotset {
                hot_fraction,
                hot_prob,
            } => {
                let hot_size =
                    ((self.universe as f64) * hot_fraction.clamp(0.0, 1.0)).round() as u64;
                let hot_size = hot_size.clamp(1, self.universe);
                if self.rng.random::<f64>() < hot_prob || hot_size == self.universe {
                    self.rng.random_range(0..hot_size)
                } else {
                    self.rng.random_range(hot_size..self.universe)
                }
            },
            Workload::Scan => {
                let key = self.scan_pos;
                self.scan_pos = (self.scan_pos + 1) % self.universe;
                key
            },
            Workload::Zipfian { .. } => match &self.zipf {
                // Zipf samples ranks in [1, universe].
                Some(zipf) => (zipf.sample(&mut self.rng) as u64).saturating_sub(1),
                None => self.rng.random_range(0..self.universe),
            },
        }
    }
}

/// Snake-case identifier for vocabulary index `i`.
pub fn word(i: u64) -> String {
    const PARTS: [&str; 8] = [
        "content", "type", "user", "agent", "request", "id", "cache", "control",
    ];
    let a = PARTS[(i % 8) as usize];
    let b = PARTS[((i / 8) % 8) as usize];
    format!("{}_{}_{}", a, b, i)
}
