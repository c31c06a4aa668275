// Copyright 2017-2018 Peter Williams <peter@newton.cx> and collaborators
// Licensed under the GPL version 3.

/*! The Lorentz boost that undoes a beam crossing angle.

Events are generated in a frame where the two beams collide head-on. When
the beams actually cross at a half angle *phi*, in a plane rotated by
*alpha* from the x axis, the generated four-momenta have to be carried back
into the lab frame. The forward matrix below takes lab-frame four-vectors
into the head-on frame; consumers want its inverse.

*/

use std::fmt;
use std::ops::{Index, Mul};

use nalgebra::{Matrix4, Vector4};

use crate::errors::{Error, Result};

/// Below this, `cos(phi)` is treated as zero and the boost as undefined.
const MIN_COS_PHI: f64 = 1e-12;


/// A real 4×4 matrix acting on four-vectors.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BoostMatrix(Matrix4<f64>);


impl BoostMatrix {
    /// The identity matrix.
    pub fn identity() -> Self {
        BoostMatrix(Matrix4::identity())
    }

    /// Build a matrix from its rows.
    pub fn from_rows(rows: [[f64; 4]; 4]) -> Self {
        BoostMatrix(Matrix4::from_fn(|i, j| rows[i][j]))
    }

    /// The underlying matrix.
    pub fn as_matrix(&self) -> &Matrix4<f64> {
        &self.0
    }

    /// The forward boost into the frame where the collision is head-on.
    ///
    /// *phi* is the half crossing angle and *alpha* the angle of the
    /// crossing plane with respect to the x axis. This fails if `cos(phi)`
    /// vanishes, since then the boost has no meaning.
    pub fn forward(alpha: f64, phi: f64) -> Result<Self> {
        let (sin_a, cos_a) = alpha.sin_cos();
        let (sin_p, cos_p) = phi.sin_cos();

        if !(cos_p.abs() >= MIN_COS_PHI) {
            return Err(Error::DegenerateCrossingAngle(phi));
        }

        let tan_p = sin_p / cos_p;

        let m = BoostMatrix(Matrix4::new(
            1. / cos_p, -cos_a * sin_p, -tan_p * sin_p, -sin_a * sin_p,
            -cos_a * tan_p, 1., cos_a * tan_p, 0.,
            0., -cos_a * sin_p, cos_p, -sin_a * sin_p,
            -sin_a * tan_p, 0., sin_a * tan_p, 1.,
        ));

        if !m.is_finite() {
            return Err(Error::DegenerateCrossingAngle(phi));
        }

        Ok(m)
    }

    /// The inverse of the forward boost: head-on frame back to the lab.
    ///
    /// This is the matrix handed to whoever corrects the generated
    /// kinematics for the crossing angle. For `alpha = phi = 0` it is the
    /// identity.
    pub fn inverse_lorentz_boost(alpha: f64, phi: f64) -> Result<Self> {
        BoostMatrix::forward(alpha, phi)?.inverse()
    }

    /// Invert this matrix.
    pub fn inverse(&self) -> Result<Self> {
        match self.0.try_inverse() {
            Some(m) => {
                let inv = BoostMatrix(m);

                if inv.is_finite() {
                    Ok(inv)
                } else {
                    Err(Error::SingularMatrix)
                }
            },
            None => Err(Error::SingularMatrix),
        }
    }

    /// Multiply a four-vector by this matrix.
    pub fn apply(&self, v: [f64; 4]) -> [f64; 4] {
        let r = self.0 * Vector4::new(v[0], v[1], v[2], v[3]);
        [r[0], r[1], r[2], r[3]]
    }

    /// Whether every entry is finite.
    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|v| v.is_finite())
    }

    /// The largest absolute difference between corresponding entries.
    pub fn max_abs_diff(&self, other: &BoostMatrix) -> f64 {
        (self.0 - other.0).amax()
    }
}


impl Index<(usize, usize)> for BoostMatrix {
    type Output = f64;

    fn index(&self, idx: (usize, usize)) -> &f64 {
        &self.0[idx]
    }
}


impl<'a> Mul<&'a BoostMatrix> for &'a BoostMatrix {
    type Output = BoostMatrix;

    fn mul(self, rhs: &'a BoostMatrix) -> BoostMatrix {
        BoostMatrix(self.0 * rhs.0)
    }
}


impl fmt::Display for BoostMatrix {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for i in 0..4 {
            if i > 0 {
                writeln!(f)?;
            }

            let m = &self.0;
            write!(f, "{:+.9e}\t{:+.9e}\t{:+.9e}\t{:+.9e}", m[(i, 0)], m[(i, 1)], m[(i, 2)], m[(i, 3)])?;
        }

        Ok(())
    }
}
