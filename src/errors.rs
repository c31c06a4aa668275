// Copyright 2017-2018 Peter Williams <peter@newton.cx> and collaborators
// Licensed under the GPL version 3.

//! Error types.
//!
//! Everything that can go wrong here is a configuration problem discovered
//! either when the generator is set up or when new conditions arrive. None of
//! it is recoverable: carrying on with the wrong beam geometry would quietly
//! corrupt every downstream event, so callers are expected to stop.

use crate::conditions::LuminosityBlockId;

/// The error type for this crate.
#[derive(thiserror::Error, Clone, Debug, PartialEq)]
pub enum Error {
    /// The longitudinal width was zero or negative at setup or update time.
    #[error("illegal resolution in Z: SigmaZ must be positive, got {0}")]
    InvalidSigmaZ(f64),

    /// A negative longitudinal width was passed to the runtime setter.
    #[error("illegal resolution in Z: SigmaZ cannot be negative, got {0}")]
    NegativeSigmaZ(f64),

    /// The beta function at the waist was zero, so the width formula has no
    /// finite value.
    #[error("BetaStar must be non-zero")]
    ZeroBetaStar,

    /// The beta function at the waist was not a finite number.
    #[error("BetaStar must be finite, got {0}")]
    InvalidBetaStar(f64),

    /// The emittance and beta function together give no real beam width.
    #[error("Emittance = {emittance} with BetaStar = {beta_star} gives no real beam width")]
    InvalidEmittance {
        /// The emittance, in internal units.
        emittance: f64,

        /// The beta function at the waist, in internal units.
        beta_star: f64,
    },

    /// The conditions record describes a Gaussian beam, which this generator
    /// cannot honor.
    #[error("the beam spot record valid for {0} is Gaussian; check the configuration \
             and make sure the beam spot parameters describe a beta-function beam")]
    GaussianBeamSpot(LuminosityBlockId),

    /// The half crossing angle makes the crossing-angle boost degenerate.
    #[error("half crossing angle phi = {0} rad gives a degenerate Lorentz boost")]
    DegenerateCrossingAngle(f64),

    /// Matrix inversion hit a vanishing pivot.
    #[error("the boost matrix is singular")]
    SingularMatrix,

    /// The conditions provider has nothing valid for this luminosity block.
    #[error("no beam spot conditions are valid for {0}")]
    NoConditions(LuminosityBlockId),

    /// Database mode, but no conditions record has been accepted yet.
    #[error("no beam parameters are active; no luminosity block has begun yet")]
    NoActiveParameters,

    /// A configuration option could not be understood.
    #[error("invalid value for option {name}: {reason}")]
    InvalidOption {
        /// The option name as it appears in the configuration.
        name: String,

        /// What was wrong with it.
        reason: String,
    },
}

/// A `Result` with this crate's `Error`.
pub type Result<T> = std::result::Result<T, Error>;
