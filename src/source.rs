// Copyright 2017-2018 Peter Williams <peter@newton.cx> and collaborators
// Licensed under the GPL version 3.

/*! Where the active beam parameters come from.

A `ParameterSource` is either *static*, with parameters fixed by the
configuration when it is built, or *database*-driven, with parameters taken
from a conditions provider at the start of each luminosity block. The mode
is chosen once. In both cases the parameters and the inverse boost built
from them are held together and replaced together.

*/

use crate::beam::BeamParameters;
use crate::boost::BoostMatrix;
use crate::conditions::{ConditionsProvider, LuminosityBlockId};
use crate::config::BeamConfig;
use crate::errors::{Error, Result};
use crate::sampler::VertexSampler;


/// A parameter set together with the inverse boost derived from it.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ActiveParameters {
    params: BeamParameters,
    inv_boost: BoostMatrix,
}

impl ActiveParameters {
    fn new(params: BeamParameters) -> Result<Self> {
        let inv_boost = BoostMatrix::inverse_lorentz_boost(params.alpha, params.phi)?;
        Ok(ActiveParameters { params, inv_boost })
    }

    /// The beam parameters.
    pub fn params(&self) -> &BeamParameters {
        &self.params
    }

    /// The inverse crossing-angle boost for these parameters.
    pub fn inv_boost(&self) -> &BoostMatrix {
        &self.inv_boost
    }

    /// A sampler for these parameters.
    pub fn sampler(&self) -> VertexSampler {
        VertexSampler::new(self.params)
    }
}


#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum Mode {
    Static,

    /// The generation of the last accepted conditions record, if any.
    Database { accepted: Option<u64> },
}


/// What happened when a luminosity block began.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub enum UpdateOutcome {
    /// The source is static; the conditions were not consulted.
    Static,

    /// The valid record has not changed since it was last accepted.
    Unchanged {
        /// The generation of that record.
        generation: u64,
    },

    /// A new record was accepted and the parameters replaced.
    Updated {
        /// The generation of the new record.
        generation: u64,
    },
}


/// Owner of the active beam parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct ParameterSource {
    mode: Mode,
    active: Option<ActiveParameters>,
    boost_builds: u64,
}

impl ParameterSource {
    /// Build a source from configuration.
    ///
    /// If `read_db` is set, the rest of the configuration is ignored and the
    /// source waits for the first luminosity block. Otherwise the
    /// configured parameters are validated and activated immediately.
    pub fn from_config(cfg: &BeamConfig) -> Result<Self> {
        if cfg.read_db {
            Ok(ParameterSource::database())
        } else {
            ParameterSource::fixed(BeamParameters::from_config(cfg)?)
        }
    }

    /// A static source with the given parameters, which are validated here.
    pub fn fixed(params: BeamParameters) -> Result<Self> {
        let active = ActiveParameters::new(params.validated()?)?;

        Ok(ParameterSource {
            mode: Mode::Static,
            active: Some(active),
            boost_builds: 1,
        })
    }

    /// A database-driven source with nothing active yet.
    pub fn database() -> Self {
        ParameterSource {
            mode: Mode::Database { accepted: None },
            active: None,
            boost_builds: 0,
        }
    }

    /// Whether parameters come from the conditions database.
    pub fn reads_database(&self) -> bool {
        match self.mode {
            Mode::Static => false,
            Mode::Database { .. } => true,
        }
    }

    /// The active parameters.
    pub fn active(&self) -> Result<&ActiveParameters> {
        self.active.as_ref().ok_or(Error::NoActiveParameters)
    }

    /// The active beam parameters.
    pub fn params(&self) -> Result<&BeamParameters> {
        self.active().map(|a| a.params())
    }

    /// The inverse boost for the active parameters.
    pub fn inv_boost(&self) -> Result<&BoostMatrix> {
        self.active().map(|a| a.inv_boost())
    }

    /// How many times an inverse boost has been built over the life of this
    /// source.
    pub fn boost_builds(&self) -> u64 {
        self.boost_builds
    }

    /// Synchronize with the conditions at the start of a luminosity block.
    ///
    /// Nothing is fetched unless the generation of the valid record differs
    /// from the last accepted one. A record flagged as Gaussian is refused
    /// and leaves everything as it was, as does any record that fails
    /// validation.
    pub fn begin_luminosity_block<P>(&mut self, block: LuminosityBlockId, provider: &P) -> Result<UpdateOutcome>
        where P: ConditionsProvider + ?Sized
    {
        let accepted = match self.mode {
            Mode::Static => return Ok(UpdateOutcome::Static),
            Mode::Database { accepted } => accepted,
        };

        let generation = provider.generation(block)?;

        if accepted == Some(generation) {
            return Ok(UpdateOutcome::Unchanged { generation });
        }

        let record = provider.beam_spot(block)?;

        if record.is_gaussian {
            return Err(Error::GaussianBeamSpot(block));
        }

        let active = ActiveParameters::new(BeamParameters::from_record(record)?)?;

        self.active = Some(active);
        self.boost_builds += 1;
        self.mode = Mode::Database { accepted: Some(generation) };
        Ok(UpdateOutcome::Updated { generation })
    }

    /// Replace the longitudinal width of the active parameters, in mm.
    ///
    /// Zero is accepted; negative widths are an error. The crossing angle is
    /// untouched so the boost is kept as is.
    pub fn set_sigma_z(&mut self, sigma_z: f64) -> Result<()> {
        let active = self.active.as_mut().ok_or(Error::NoActiveParameters)?;
        active.params = active.params.with_sigma_z(sigma_z)?;
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256StarStar;

    use super::{ParameterSource, UpdateOutcome};
    use crate::boost::BoostMatrix;
    use crate::conditions::{BeamSpotRecord, IovConditions, LuminosityBlockId};
    use crate::config::BeamConfig;
    use crate::errors::Error;

    fn config() -> BeamConfig {
        BeamConfig {
            sigma_z: 5.,
            beta_star: 30.,
            emittance: 2e-8,
            phi: 1e-4,
            ..BeamConfig::default()
        }
    }

    fn record(z: f64, is_gaussian: bool) -> BeamSpotRecord {
        BeamSpotRecord {
            x: 0.01,
            y: 0.02,
            z,
            sigma_z: 4.,
            time_offset: 0.,
            beta_star: 40.,
            emittance: 3e-8,
            alpha: 0.2,
            phi: 2e-4,
            is_gaussian,
        }
    }

    fn lb(lumi: u32) -> LuminosityBlockId {
        LuminosityBlockId::new(1, lumi)
    }

    #[test]
    fn static_source() {
        let mut s = ParameterSource::from_config(&config()).unwrap();
        assert!(!s.reads_database());
        assert_eq!(s.params().unwrap().sigma_z, 50.);
        assert_eq!(*s.inv_boost().unwrap(), BoostMatrix::inverse_lorentz_boost(0., 1e-4).unwrap());
        assert_eq!(s.boost_builds(), 1);

        let c = IovConditions::new().with(lb(1), record(1., false));
        assert_eq!(s.begin_luminosity_block(lb(1), &c), Ok(UpdateOutcome::Static));
        assert_eq!(s.params().unwrap().sigma_z, 50.);
        assert_eq!(s.boost_builds(), 1);
    }

    #[test]
    fn static_source_validates() {
        let cfg = BeamConfig { sigma_z: -1., ..config() };
        assert_eq!(ParameterSource::from_config(&cfg), Err(Error::InvalidSigmaZ(-10.)));

        let cfg = BeamConfig { phi: ::std::f64::consts::FRAC_PI_2, ..config() };
        assert!(ParameterSource::from_config(&cfg).is_err());
    }

    #[test]
    fn database_source_starts_empty() {
        let cfg = BeamConfig { read_db: true, sigma_z: -1., ..config() };
        let s = ParameterSource::from_config(&cfg).unwrap();
        assert!(s.reads_database());
        assert_eq!(s.params(), Err(Error::NoActiveParameters));
        assert_eq!(s.boost_builds(), 0);
    }

    #[test]
    fn unchanged_record_is_skipped() {
        let c = IovConditions::new().with(lb(1), record(1., false));
        let mut s = ParameterSource::database();

        let g = match s.begin_luminosity_block(lb(1), &c).unwrap() {
            UpdateOutcome::Updated { generation } => generation,
            other => panic!("unexpected outcome {:?}", other),
        };
        assert_eq!(s.boost_builds(), 1);
        assert_eq!(s.params().unwrap().z0, 10.);

        assert_eq!(s.begin_luminosity_block(lb(2), &c), Ok(UpdateOutcome::Unchanged { generation: g }));
        assert_eq!(s.begin_luminosity_block(lb(2), &c), Ok(UpdateOutcome::Unchanged { generation: g }));
        assert_eq!(s.boost_builds(), 1);
    }

    #[test]
    fn new_record_replaces_everything() {
        let c = IovConditions::new()
            .with(lb(1), record(1., false))
            .with(lb(5), BeamSpotRecord { alpha: 0., phi: 0., ..record(2., false) });
        let mut s = ParameterSource::database();

        s.begin_luminosity_block(lb(1), &c).unwrap();
        let before = *s.active().unwrap();

        s.begin_luminosity_block(lb(5), &c).unwrap();
        let after = *s.active().unwrap();

        assert_ne!(before, after);
        assert_eq!(after.params().z0, 20.);
        assert_eq!(*after.inv_boost(), BoostMatrix::identity());
        assert_eq!(s.boost_builds(), 2);
    }

    #[test]
    fn gaussian_record_is_refused() {
        let c = IovConditions::new()
            .with(lb(1), record(1., false))
            .with(lb(2), record(2., true));
        let mut s = ParameterSource::database();

        s.begin_luminosity_block(lb(1), &c).unwrap();
        let before = *s.active().unwrap();

        assert_eq!(s.begin_luminosity_block(lb(2), &c), Err(Error::GaussianBeamSpot(lb(2))));
        assert_eq!(*s.active().unwrap(), before);
        assert_eq!(s.boost_builds(), 1);

        // Still refused on the next try.
        assert!(s.begin_luminosity_block(lb(3), &c).is_err());
    }

    #[test]
    fn invalid_record_is_refused() {
        let c = IovConditions::new().with(lb(1), BeamSpotRecord { sigma_z: 0., ..record(1., false) });
        let mut s = ParameterSource::database();
        assert_eq!(s.begin_luminosity_block(lb(1), &c), Err(Error::InvalidSigmaZ(0.)));
        assert_eq!(s.params(), Err(Error::NoActiveParameters));
    }

    #[test]
    fn record_without_a_real_width_is_refused() {
        let c = IovConditions::new()
            .with(lb(1), record(1., false))
            .with(lb(2), BeamSpotRecord { beta_star: ::std::f64::NAN, ..record(2., false) })
            .with(lb(3), BeamSpotRecord { emittance: -2e-8, ..record(3., false) });
        let mut s = ParameterSource::database();

        s.begin_luminosity_block(lb(1), &c).unwrap();
        let before = *s.active().unwrap();

        assert!(matches!(s.begin_luminosity_block(lb(2), &c), Err(Error::InvalidBetaStar(_))));
        assert_eq!(*s.active().unwrap(), before);

        assert!(matches!(s.begin_luminosity_block(lb(3), &c), Err(Error::InvalidEmittance { .. })));
        assert_eq!(*s.active().unwrap(), before);
        assert_eq!(s.boost_builds(), 1);

        let v = s.active().unwrap().sampler().sample(&mut Xoshiro256StarStar::seed_from_u64(3));
        assert!(v.x.is_finite() && v.y.is_finite());
    }

    #[test]
    fn missing_conditions() {
        let c = IovConditions::new().with(lb(5), record(1., false));
        let mut s = ParameterSource::database();
        assert_eq!(s.begin_luminosity_block(lb(1), &c), Err(Error::NoConditions(lb(1))));
    }

    #[test]
    fn sigma_z_setter() {
        let mut s = ParameterSource::from_config(&config()).unwrap();
        let boost = *s.inv_boost().unwrap();

        s.set_sigma_z(7.5).unwrap();
        assert_eq!(s.params().unwrap().sigma_z, 7.5);
        assert_eq!(*s.inv_boost().unwrap(), boost);
        assert_eq!(s.boost_builds(), 1);

        assert_eq!(s.set_sigma_z(-1.), Err(Error::NegativeSigmaZ(-1.)));
        assert_eq!(s.params().unwrap().sigma_z, 7.5);

        let mut d = ParameterSource::database();
        assert_eq!(d.set_sigma_z(1.), Err(Error::NoActiveParameters));
    }
}
