// Copyright 2017-2018 Peter Williams <peter@newton.cx> and collaborators
// Licensed under the GPL version 3.

/*! Beam spot conditions.

In database mode the beam parameters are not configured up front. Instead a
conditions provider is consulted whenever a new luminosity block begins.
The provider hands out a record along with a *generation*: an identifier
that changes exactly when the record valid for the block changes. Comparing
generations is how redundant updates are skipped.

*/

use std::fmt;

use crate::errors::{Error, Result};


/// Identifies one luminosity block within a run.
///
/// Ordering is by run first, then by block number.
#[derive(Copy, Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct LuminosityBlockId {
    /// The run number.
    pub run: u32,

    /// The luminosity block number within the run.
    pub lumi: u32,
}

impl LuminosityBlockId {
    /// Construct an identifier.
    pub fn new(run: u32, lumi: u32) -> Self {
        LuminosityBlockId { run, lumi }
    }
}

impl fmt::Display for LuminosityBlockId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "run {} lumi {}", self.run, self.lumi)
    }
}


/// A simulated beam spot as stored in the conditions database.
///
/// Lengths are in centimetres, the time offset in nanoseconds and angles in
/// radians.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BeamSpotRecord {
    /// Nominal x position of the interaction point.
    pub x: f64,

    /// Nominal y position of the interaction point.
    pub y: f64,

    /// Nominal z position of the interaction point.
    pub z: f64,

    /// Longitudinal width.
    pub sigma_z: f64,

    /// Time offset of the collisions.
    pub time_offset: f64,

    /// Beta function at the waist.
    pub beta_star: f64,

    /// Non-normalized emittance.
    pub emittance: f64,

    /// Angle of the crossing plane with respect to the x axis.
    pub alpha: f64,

    /// Half crossing angle.
    pub phi: f64,

    /// Whether this record describes a purely Gaussian beam rather than a
    /// beta-function one.
    pub is_gaussian: bool,
}


/// Something that can supply beam spot conditions for a luminosity block.
pub trait ConditionsProvider {
    /// An identifier for the record valid at `block`. Two calls return the
    /// same value if and only if they would return the same record.
    fn generation(&self, block: LuminosityBlockId) -> Result<u64>;

    /// The record valid at `block`.
    fn beam_spot(&self, block: LuminosityBlockId) -> Result<&BeamSpotRecord>;
}


/// An in-memory provider made of intervals of validity.
///
/// Each record is valid from the block it is inserted at until the next
/// inserted block. Blocks before the first interval have no conditions.
#[derive(Clone, Debug, Default)]
pub struct IovConditions {
    // Kept sorted by first valid block.
    intervals: Vec<(LuminosityBlockId, u64, BeamSpotRecord)>,
    next_generation: u64,
}

impl IovConditions {
    /// Create an empty provider.
    pub fn new() -> Self {
        IovConditions::default()
    }

    /// Make `record` valid starting at `since`, replacing any interval that
    /// starts at the same block.
    ///
    /// Every insertion gets a fresh generation, even if the record is equal
    /// to an earlier one, just as a new payload in a real database would.
    pub fn insert(&mut self, since: LuminosityBlockId, record: BeamSpotRecord) {
        let generation = self.next_generation;
        self.next_generation += 1;

        match self.intervals.binary_search_by(|iv| iv.0.cmp(&since)) {
            Ok(i) => self.intervals[i] = (since, generation, record),
            Err(i) => self.intervals.insert(i, (since, generation, record)),
        }
    }

    /// Builder-style version of `insert`.
    pub fn with(mut self, since: LuminosityBlockId, record: BeamSpotRecord) -> Self {
        self.insert(since, record);
        self
    }

    /// The number of intervals.
    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    /// Whether there are no intervals at all.
    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    fn lookup(&self, block: LuminosityBlockId) -> Result<&(LuminosityBlockId, u64, BeamSpotRecord)> {
        let n = self.intervals.partition_point(|iv| iv.0 <= block);

        if n == 0 {
            return Err(Error::NoConditions(block));
        }

        Ok(&self.intervals[n - 1])
    }
}

impl ConditionsProvider for IovConditions {
    fn generation(&self, block: LuminosityBlockId) -> Result<u64> {
        self.lookup(block).map(|iv| iv.1)
    }

    fn beam_spot(&self, block: LuminosityBlockId) -> Result<&BeamSpotRecord> {
        self.lookup(block).map(|iv| &iv.2)
    }
}


#[cfg(test)]
mod tests {
    use super::{BeamSpotRecord, ConditionsProvider, IovConditions, LuminosityBlockId};
    use crate::errors::Error;

    fn record(z: f64) -> BeamSpotRecord {
        BeamSpotRecord {
            x: 0.,
            y: 0.,
            z,
            sigma_z: 5.,
            time_offset: 0.,
            beta_star: 30.,
            emittance: 2e-8,
            alpha: 0.,
            phi: 1e-4,
            is_gaussian: false,
        }
    }

    #[test]
    fn block_ordering() {
        assert!(LuminosityBlockId::new(1, 900) < LuminosityBlockId::new(2, 1));
        assert!(LuminosityBlockId::new(2, 1) < LuminosityBlockId::new(2, 2));
        assert_eq!(format!("{}", LuminosityBlockId::new(3, 14)), "run 3 lumi 14");
    }

    #[test]
    fn intervals_of_validity() {
        let c = IovConditions::new()
            .with(LuminosityBlockId::new(1, 10), record(2.))
            .with(LuminosityBlockId::new(1, 1), record(1.));

        assert_eq!(c.len(), 2);

        let b = LuminosityBlockId::new(1, 0);
        assert_eq!(c.beam_spot(b), Err(Error::NoConditions(b)));
        assert!(c.generation(b).is_err());

        let g1 = c.generation(LuminosityBlockId::new(1, 1)).unwrap();
        assert_eq!(c.generation(LuminosityBlockId::new(1, 9)).unwrap(), g1);
        assert_eq!(c.beam_spot(LuminosityBlockId::new(1, 9)).unwrap().z, 1.);

        let g2 = c.generation(LuminosityBlockId::new(1, 10)).unwrap();
        assert_ne!(g1, g2);
        assert_eq!(c.beam_spot(LuminosityBlockId::new(7, 3)).unwrap().z, 2.);
    }

    #[test]
    fn replacing_an_interval_changes_its_generation() {
        let since = LuminosityBlockId::new(1, 1);
        let mut c = IovConditions::new().with(since, record(1.));
        let g1 = c.generation(since).unwrap();

        c.insert(since, record(1.));
        assert_eq!(c.len(), 1);
        assert_ne!(c.generation(since).unwrap(), g1);
    }
}
