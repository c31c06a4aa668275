// Copyright 2017-2018 Peter Williams <peter@newton.cx> and collaborators
// Licensed under the GPL version 3.

/*! Beam parameters and the beta-function width model.

The transverse envelope of a beam focused at an interaction point is set by
its emittance and by the beta function of the optics. Near the waist the
beta function is a parabola in the distance from the focus, so the single
beam width is

```text
sigma(z) = sqrt(emittance * (beta_star + (z - z0)^2 / beta_star))
```

which is smallest, `sqrt(emittance * beta_star)`, at the waist itself.

*/

use crate::conditions::BeamSpotRecord;
use crate::config::BeamConfig;
use crate::errors::{Error, Result};
use crate::{CM, C_LIGHT, NS, RADIAN};


/// One complete, validated set of beam parameters, in internal units.
///
/// A set is never edited in place. New conditions or a new longitudinal
/// width always produce a fresh value that replaces the old one wholesale.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BeamParameters {
    /// Nominal interaction point, x coordinate (mm).
    pub x0: f64,

    /// Nominal interaction point, y coordinate (mm).
    pub y0: f64,

    /// Nominal interaction point, z coordinate (mm).
    pub z0: f64,

    /// Longitudinal width of the luminous region (mm). Always positive for a
    /// validated set.
    pub sigma_z: f64,

    /// Beta function at the waist (mm).
    pub beta_star: f64,

    /// Non-normalized emittance (mm).
    pub emittance: f64,

    /// Time offset, expressed as a distance travelled at the speed of light
    /// (mm).
    pub time_offset: f64,

    /// Angle of the crossing plane with respect to the x axis (rad).
    pub alpha: f64,

    /// Half crossing angle (rad).
    pub phi: f64,
}


impl BeamParameters {
    /// Convert a static configuration into internal units and validate it.
    pub fn from_config(cfg: &BeamConfig) -> Result<Self> {
        BeamParameters {
            x0: cfg.x0 * CM,
            y0: cfg.y0 * CM,
            z0: cfg.z0 * CM,
            sigma_z: cfg.sigma_z * CM,
            beta_star: cfg.beta_star * CM,
            emittance: cfg.emittance * CM,
            time_offset: cfg.time_offset * NS * C_LIGHT,
            alpha: cfg.alpha * RADIAN,
            phi: cfg.phi * RADIAN,
        }.validated()
    }

    /// Convert a conditions-database record into internal units and
    /// validate it.
    ///
    /// The Gaussian flag is *not* examined here; deciding whether a record is
    /// acceptable at all is the business of the parameter source.
    pub fn from_record(rec: &BeamSpotRecord) -> Result<Self> {
        BeamParameters {
            x0: rec.x * CM,
            y0: rec.y * CM,
            z0: rec.z * CM,
            sigma_z: rec.sigma_z * CM,
            beta_star: rec.beta_star * CM,
            emittance: rec.emittance * CM,
            time_offset: rec.time_offset * NS * C_LIGHT,
            alpha: rec.alpha * RADIAN,
            phi: rec.phi * RADIAN,
        }.validated()
    }

    /// Check the invariants that the sampling formulas rely on.
    ///
    /// The crossing angle is checked separately, when the boost is built.
    pub fn validated(self) -> Result<Self> {
        // Written so that NaN fails too.
        if !(self.sigma_z > 0.) {
            return Err(Error::InvalidSigmaZ(self.sigma_z));
        }

        if self.beta_star == 0. {
            return Err(Error::ZeroBetaStar);
        }

        if !self.beta_star.is_finite() {
            return Err(Error::InvalidBetaStar(self.beta_star));
        }

        // The squared waist width. Same sign as the squared width anywhere
        // else along the beam.
        let waist_sq = self.emittance * self.beta_star;

        if !(waist_sq >= 0.) || !waist_sq.is_finite() {
            return Err(Error::InvalidEmittance {
                emittance: self.emittance,
                beta_star: self.beta_star,
            });
        }

        Ok(self)
    }

    /// Return a copy of these parameters with a different longitudinal width.
    ///
    /// This follows the rules of the runtime setter: zero is tolerated,
    /// negative widths are not.
    pub fn with_sigma_z(&self, sigma_z: f64) -> Result<Self> {
        if !(sigma_z >= 0.) {
            return Err(Error::NegativeSigmaZ(sigma_z));
        }

        Ok(BeamParameters { sigma_z, ..*self })
    }

    /// The transverse width model for these parameters.
    pub fn width_model(&self) -> BeamWidthModel {
        BeamWidthModel {
            emittance: self.emittance,
            beta_star: self.beta_star,
        }
    }
}


/// The beta-function envelope of a single beam.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BeamWidthModel {
    emittance: f64,
    beta_star: f64,
}

impl BeamWidthModel {
    /// Create a width model directly from an emittance and a waist beta
    /// value. Nothing is validated; a zero `beta_star` yields non-finite
    /// widths.
    pub fn new(emittance: f64, beta_star: f64) -> Self {
        BeamWidthModel { emittance, beta_star }
    }

    /// The single-beam transverse width at longitudinal position `z` for a
    /// waist located at `z0`.
    #[inline]
    pub fn width(&self, z: f64, z0: f64) -> f64 {
        let dz = z - z0;
        (self.emittance * (self.beta_star + dz * dz / self.beta_star)).sqrt()
    }

    /// The width at the waist.
    pub fn waist_width(&self) -> f64 {
        (self.emittance * self.beta_star).sqrt()
    }
}
