// Copyright 2017-2018 Peter Williams <peter@newton.cx> and collaborators
// Licensed under the GPL version 3.

/*! Sampling of vertex offsets.

Each call makes exactly four Gaussian draws, in order: z, then x and y with
widths taken from the beta function at the drawn z, then t. The time is an
independent draw with the same width as z; it is not correlated with it.

No shear with z (the `dx/dz`, `dy/dz` slopes of a tilted beam) is applied.

*/

use std::f64::consts::SQRT_2;

use crate::beam::BeamParameters;
use crate::GaussianSource;


/// A sampled vertex offset, in mm. The time is expressed as a distance
/// (`c * t`).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct VertexSample {
    /// Transverse x.
    pub x: f64,

    /// Transverse y.
    pub y: f64,

    /// Longitudinal z.
    pub z: f64,

    /// Time, times the speed of light.
    pub t: f64,
}

impl VertexSample {
    /// The offset as an `(x, y, z, t)` array.
    pub fn to_array(&self) -> [f64; 4] {
        [self.x, self.y, self.z, self.t]
    }
}


/// Draws vertex offsets for one fixed set of beam parameters.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct VertexSampler {
    params: BeamParameters,
}

impl VertexSampler {
    /// Create a sampler for the given parameters.
    pub fn new(params: BeamParameters) -> Self {
        VertexSampler { params }
    }

    /// The parameters this sampler draws from.
    pub fn params(&self) -> &BeamParameters {
        &self.params
    }

    /// Width of the luminous region at `z`: the single beam width divided
    /// by `sqrt(2)`.
    #[inline]
    fn luminous_width(&self, z: f64) -> f64 {
        self.params.width_model().width(z, self.params.z0) / SQRT_2
    }

    /// Draw one vertex offset.
    pub fn sample<G: GaussianSource + ?Sized>(&self, rng: &mut G) -> VertexSample {
        let p = &self.params;

        let z = rng.gauss(0., p.sigma_z) + p.z0;

        // x and y each evaluate the width formula on their own.
        let sigma_x = self.luminous_width(z);
        let x = rng.gauss(0., sigma_x) + p.x0;

        let sigma_y = self.luminous_width(z);
        let y = rng.gauss(0., sigma_y) + p.y0;

        let t = rng.gauss(0., p.sigma_z) + p.time_offset;

        VertexSample { x, y, z, t }
    }
}
