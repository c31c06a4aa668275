// Copyright 2017-2018 Peter Williams <peter@newton.cx> and collaborators
// Licensed under the GPL version 3.

/*! The vertex generator as seen by an event-processing framework.

The framework builds one generator from configuration, calls
`begin_luminosity_block` at every luminosity block transition, and calls
`vertex_shift` once per event. It guarantees that those two never overlap,
which the `&mut self` / `&self` split makes explicit here. Sampling itself
only needs shared access, so events may be processed on many threads at
once, each with its own random engine.

*/

use slog::Logger;

use crate::boost::BoostMatrix;
use crate::conditions::{ConditionsProvider, LuminosityBlockId};
use crate::config::BeamConfig;
use crate::errors::Result;
use crate::sampler::VertexSample;
use crate::source::{ParameterSource, UpdateOutcome};
use crate::GaussianSource;


/// Smears vertices according to a beta-function beam.
#[derive(Clone, Debug)]
pub struct BetafuncVertexGenerator {
    source: ParameterSource,
    logger: Logger,
}


impl BetafuncVertexGenerator {
    /// Create a generator from configuration.
    ///
    /// In static mode the configured parameters must be valid or this
    /// fails. In database mode nothing can be sampled until the first
    /// luminosity block has begun.
    pub fn new(cfg: &BeamConfig, logger: Logger) -> Result<Self> {
        let source = match ParameterSource::from_config(cfg) {
            Ok(s) => s,
            Err(e) => {
                error!(logger, "invalid beam configuration"; "err" => %e, "config" => ?cfg);
                return Err(e);
            },
        };

        Ok(BetafuncVertexGenerator::with_source(source, logger))
    }

    /// Wrap an existing parameter source.
    pub fn with_source(source: ParameterSource, logger: Logger) -> Self {
        match source.params() {
            Ok(p) => info!(logger, "beta-function vertex generator ready";
                           "mode" => "static",
                           "x0" => p.x0, "y0" => p.y0, "z0" => p.z0,
                           "sigma_z" => p.sigma_z,
                           "beta_star" => p.beta_star,
                           "emittance" => p.emittance,
                           "time_offset" => p.time_offset,
                           "alpha" => p.alpha, "phi" => p.phi),
            Err(_) => info!(logger, "beta-function vertex generator ready";
                            "mode" => if source.reads_database() { "database" } else { "static" }),
        }

        BetafuncVertexGenerator { source, logger }
    }

    /// The parameter source.
    pub fn source(&self) -> &ParameterSource {
        &self.source
    }

    /// The inverse crossing-angle boost to apply to generated momenta.
    pub fn inv_lorentz_boost(&self) -> Result<&BoostMatrix> {
        self.source.inv_boost()
    }

    /// Sample the offset to apply to one event's vertex.
    pub fn vertex_shift<G: GaussianSource + ?Sized>(&self, rng: &mut G) -> Result<VertexSample> {
        let v = self.source.active()?.sampler().sample(rng);
        trace!(self.logger, "vertex shift"; "x" => v.x, "y" => v.y, "z" => v.z, "t" => v.t);
        Ok(v)
    }

    /// Replace the longitudinal width, in mm.
    pub fn set_sigma_z(&mut self, sigma_z: f64) -> Result<()> {
        if let Err(e) = self.source.set_sigma_z(sigma_z) {
            warn!(self.logger, "refusing new sigma_z"; "sigma_z" => sigma_z, "err" => %e);
            return Err(e);
        }

        debug!(self.logger, "sigma_z replaced"; "sigma_z" => sigma_z);
        Ok(())
    }

    /// Hook for the start of a luminosity block.
    pub fn begin_luminosity_block<P>(&mut self, block: LuminosityBlockId, provider: &P) -> Result<UpdateOutcome>
        where P: ConditionsProvider + ?Sized
    {
        let outcome = match self.source.begin_luminosity_block(block, provider) {
            Ok(o) => o,
            Err(e) => {
                error!(self.logger, "beam spot update failed";
                       "run" => block.run, "lumi" => block.lumi, "err" => %e);
                return Err(e);
            },
        };

        match outcome {
            UpdateOutcome::Static => {},

            UpdateOutcome::Unchanged { generation } => {
                debug!(self.logger, "beam spot conditions unchanged";
                       "run" => block.run, "lumi" => block.lumi, "generation" => generation);
            },

            UpdateOutcome::Updated { generation } => {
                let p = self.source.params()?;
                info!(self.logger, "beam spot conditions updated";
                      "run" => block.run, "lumi" => block.lumi, "generation" => generation,
                      "x0" => p.x0, "y0" => p.y0, "z0" => p.z0,
                      "sigma_z" => p.sigma_z,
                      "beta_star" => p.beta_star,
                      "emittance" => p.emittance,
                      "time_offset" => p.time_offset,
                      "alpha" => p.alpha, "phi" => p.phi);
            },
        }

        Ok(outcome)
    }
}


#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256StarStar;
    use slog::{Discard, Logger};

    use super::BetafuncVertexGenerator;
    use crate::boost::BoostMatrix;
    use crate::conditions::{BeamSpotRecord, IovConditions, LuminosityBlockId};
    use crate::config::BeamConfig;
    use crate::errors::Error;

    fn log() -> Logger {
        Logger::root(Discard, o!())
    }

    fn config() -> BeamConfig {
        BeamConfig {
            x0: 0.0322,
            sigma_z: 5.3,
            beta_star: 30.,
            emittance: 1.986e-8,
            phi: 142.5e-6,
            ..BeamConfig::default()
        }
    }

    #[test]
    fn static_generator_samples() {
        let g = BetafuncVertexGenerator::new(&config(), log()).unwrap();
        let mut rng = Xoshiro256StarStar::seed_from_u64(1);
        let v = g.vertex_shift(&mut rng).unwrap();
        assert!(v.x.is_finite() && v.y.is_finite() && v.z.is_finite() && v.t.is_finite());
        assert_eq!(*g.inv_lorentz_boost().unwrap(),
                   BoostMatrix::inverse_lorentz_boost(0., 142.5e-6).unwrap());
    }

    #[test]
    fn bad_configuration_fails_construction() {
        let cfg = BeamConfig { sigma_z: -1., ..config() };
        assert!(BetafuncVertexGenerator::new(&cfg, log()).is_err());
    }

    #[test]
    fn database_generator_waits_for_conditions() {
        let cfg = BeamConfig { read_db: true, ..BeamConfig::default() };
        let mut g = BetafuncVertexGenerator::new(&cfg, log()).unwrap();
        let mut rng = Xoshiro256StarStar::seed_from_u64(1);

        assert_eq!(g.vertex_shift(&mut rng), Err(Error::NoActiveParameters));
        assert_eq!(g.inv_lorentz_boost(), Err(Error::NoActiveParameters));

        let rec = BeamSpotRecord {
            x: 0.1,
            y: 0.,
            z: 0.,
            sigma_z: 5.,
            time_offset: 1.,
            beta_star: 30.,
            emittance: 2e-8,
            alpha: 0.,
            phi: 0.,
            is_gaussian: false,
        };
        let c = IovConditions::new().with(LuminosityBlockId::new(1, 1), rec);

        g.begin_luminosity_block(LuminosityBlockId::new(1, 1), &c).unwrap();
        assert!(g.vertex_shift(&mut rng).is_ok());
        assert_eq!(*g.inv_lorentz_boost().unwrap(), BoostMatrix::identity());
    }
}
