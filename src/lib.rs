// Copyright 2017-2018 Peter Williams <peter@newton.cx> and collaborators
// Licensed under the GPL version 3.

/*! Smear primary vertices according to a beta-function beam profile.

Simulated collisions are generated at the origin. Before they are handed to
the detector simulation, each event is shifted to a randomly sampled
interaction point. This crate samples that point for a beam whose
transverse size follows the beta function of the accelerator optics and
whose longitudinal and time profiles are Gaussian.

The transverse width of a single beam a distance *dz* away from the focal
waist is

```text
sigma(dz) = sqrt(emittance * (beta_star + dz^2 / beta_star))
```

and the luminous region of two identical counter-propagating beams is
narrower by a factor of `sqrt(2)`.

If the beams cross at an angle, generated four-momenta must be boosted
from the head-on frame back into the lab frame. The matrix for that is
built here too (see [`BoostMatrix`]), but applying it is up to the
consumer.

Lengths are carried internally in millimetres, the distance unit of the
event record. Configuration and conditions records use centimetres,
nanoseconds and radians; see the unit constants below.

*/

#![deny(missing_docs)]

#[macro_use]
extern crate slog;
#[cfg(test)]
#[macro_use]
extern crate assert_approx_eq;

use rand::Rng;
use rand_distr::StandardNormal;

pub mod beam;
pub mod boost;
pub mod conditions;
pub mod config;
pub mod errors;
pub mod generator;
pub mod sampler;
pub mod source;

pub use beam::{BeamParameters, BeamWidthModel};
pub use boost::BoostMatrix;
pub use conditions::{BeamSpotRecord, ConditionsProvider, IovConditions, LuminosityBlockId};
pub use config::BeamConfig;
pub use errors::{Error, Result};
pub use generator::BetafuncVertexGenerator;
pub use sampler::{VertexSample, VertexSampler};
pub use source::{ParameterSource, UpdateOutcome};

/// Millimetres per centimetre. Multiply a value in centimetres by this to
/// get internal units.
pub const CM: f64 = 10.;

/// Nanoseconds, the internal time unit.
pub const NS: f64 = 1.;

/// Radians, the internal angle unit.
pub const RADIAN: f64 = 1.;

/// The speed of light in millimetres per nanosecond.
pub const C_LIGHT: f64 = 299.792458;


/// A source of normally distributed random numbers.
///
/// The sampler never owns or seeds a generator; callers hand one in on every
/// call. Any `rand::Rng` is a `GaussianSource`, and tests can implement the
/// trait directly to script or count the draws.
pub trait GaussianSource {
    /// Draw one value from a normal distribution with the given mean and
    /// standard deviation.
    fn gauss(&mut self, mean: f64, sigma: f64) -> f64;
}

impl<R: Rng + ?Sized> GaussianSource for R {
    fn gauss(&mut self, mean: f64, sigma: f64) -> f64 {
        let n: f64 = self.sample(StandardNormal);
        mean + sigma * n
    }
}


#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256StarStar;

    use super::GaussianSource;

    #[test]
    fn zero_width_draw_is_the_mean() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(7);
        assert_eq!(rng.gauss(3.5, 0.), 3.5);
    }

    #[test]
    fn draws_are_scaled_and_shifted() {
        let mut a = Xoshiro256StarStar::seed_from_u64(11);
        let mut b = Xoshiro256StarStar::seed_from_u64(11);
        let unit = a.gauss(0., 1.);
        let scaled = b.gauss(2., 4.);
        assert_approx_eq!(scaled, 2. + 4. * unit, 1e-12);
    }
}
