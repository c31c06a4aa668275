// Copyright 2017-2018 Peter Williams <peter@newton.cx> and collaborators
// Licensed under the GPL version 3.

//! A tiny helper for testing convenience.

#[macro_use] extern crate slog;

use betavtx::{BeamConfig, BeamSpotRecord, GaussianSource};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256StarStar;
use slog::Drain;

/// Create a simple `slog` logger for use in test programs.
///
/// It logs to the terminal using default parameters, as per the `slog` basic
/// example. This just saves us ~8 lines of boilerplate in all of our
/// test/demo programs.
pub fn default_log() -> slog::Logger {
    let decorator = slog_term::TermDecorator::new().build();
    let drain = slog_term::FullFormat::new(decorator).build().fuse();
    let drain = slog_async::Async::new(drain)
        .overflow_strategy(slog_async::OverflowStrategy::Block)
        .build().fuse();
    slog::Logger::root(drain, o!())
}

/// A logger that throws everything away, for tests that don't care.
pub fn quiet_log() -> slog::Logger {
    slog::Logger::root(slog::Discard, o!())
}

/// A deterministic random engine.
pub fn seeded_rng(seed: u64) -> Xoshiro256StarStar {
    Xoshiro256StarStar::seed_from_u64(seed)
}


/// Beam settings resembling a typical LHC proton fill, in configuration
/// units.
pub fn nominal_config() -> BeamConfig {
    BeamConfig {
        x0: 0.0322,
        y0: 0.,
        z0: 0.,
        sigma_z: 5.3,
        beta_star: 30.,
        emittance: 1.986e-8,
        alpha: 0.,
        phi: 142.5e-6,
        time_offset: 0.,
        read_db: false,
    }
}

/// The conditions-database version of `nominal_config`.
pub fn nominal_record() -> BeamSpotRecord {
    let c = nominal_config();

    BeamSpotRecord {
        x: c.x0,
        y: c.y0,
        z: c.z0,
        sigma_z: c.sigma_z,
        time_offset: c.time_offset,
        beta_star: c.beta_star,
        emittance: c.emittance,
        alpha: c.alpha,
        phi: c.phi,
        is_gaussian: false,
    }
}


/// A simple utility for sampling random numbers.
///
/// The distribution can be uniform or log-uniform.
pub struct Sampler {
    is_log: bool,
    low: f64,
    range: f64
}

impl Sampler {
    /// Create a new Sampler.
    pub fn new(is_log: bool, mut low: f64, mut high: f64) -> Self {
        if low > high {
            std::mem::swap(&mut low, &mut high);
        }

        if is_log {
            low = low.ln();
            high = high.ln();
        }

        Sampler { is_log, low, range: high - low }
    }

    /// Sample a number from the distribution.
    pub fn get<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let n = self.low + rng.gen::<f64>() * self.range;

        if self.is_log {
            n.exp()
        } else {
            n
        }
    }
}


/// Wraps another Gaussian source and records every request made of it.
pub struct CountingSource<G> {
    inner: G,

    /// The `(mean, sigma)` of each draw, in order.
    pub requests: Vec<(f64, f64)>,
}

impl<G> CountingSource<G> {
    /// Start counting draws from `inner`.
    pub fn new(inner: G) -> Self {
        CountingSource { inner, requests: Vec::new() }
    }

    /// How many draws have been made.
    pub fn draws(&self) -> usize {
        self.requests.len()
    }
}

impl<G: GaussianSource> GaussianSource for CountingSource<G> {
    fn gauss(&mut self, mean: f64, sigma: f64) -> f64 {
        self.requests.push((mean, sigma));
        self.inner.gauss(mean, sigma)
    }
}


/// Replays a fixed list of standard-normal deviates, cycling when it runs
/// out.
pub struct ScriptedSource {
    normals: Vec<f64>,
    next: usize,
}

impl ScriptedSource {
    /// Create a source that replays `normals`, which must not be empty.
    pub fn new(normals: Vec<f64>) -> Self {
        assert!(!normals.is_empty(), "a scripted source needs at least one value");
        ScriptedSource { normals, next: 0 }
    }
}

impl GaussianSource for ScriptedSource {
    fn gauss(&mut self, mean: f64, sigma: f64) -> f64 {
        let n = self.normals[self.next % self.normals.len()];
        self.next += 1;
        mean + sigma * n
    }
}
