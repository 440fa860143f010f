use crate::error::{PackingError, Result};
use crate::shape::Shape;
use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Determinants below this magnitude are treated as singular.
pub const DET_EPSILON: f64 = 1e-12;

/// Why a cell failed the post-move geometry constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryViolation {
    /// `det(h) <= 0`: the basis changed handedness or collapsed.
    Inverted,
    /// A basis vector is shorter than the minimum length.
    ShortBasis,
    /// Two unit basis vectors have `|a·b|` above the projection threshold.
    Collinear,
    /// A basis vector lies too close to the plane of the other two.
    Flat,
}

/// Periodic simulation box.
///
/// The columns of `h` are the three lattice vectors. A point `v` has
/// fractional coordinates `s` with `v = h·s`; the fundamental domain is
/// `s ∈ [0,1)³`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    h: Matrix3<f64>,
}

impl Cell {
    /// Build a cell from a basis matrix (columns are lattice vectors).
    ///
    /// The basis must be right-handed: `det(h) > 0`.
    pub fn new(h: Matrix3<f64>) -> Result<Self> {
        let det = h.determinant();
        if !det.is_finite() || det.abs() <= DET_EPSILON {
            return Err(PackingError::SingularCell { det });
        }
        if det < 0.0 {
            return Err(PackingError::LeftHandedCell { det });
        }
        Ok(Self { h })
    }

    /// Cubic cell of side `side`.
    pub fn cubic(side: f64) -> Result<Self> {
        Self::new(Matrix3::identity() * side)
    }

    pub fn h(&self) -> &Matrix3<f64> {
        &self.h
    }

    /// Replace the basis without validation. Used by cell moves, whose
    /// result is checked afterwards by [`Cell::check_geometry`].
    pub(crate) fn set_h(&mut self, h: Matrix3<f64>) {
        self.h = h;
    }

    /// Lattice vector `i` (column `i` of `h`).
    pub fn basis(&self, i: usize) -> Vector3<f64> {
        self.h.column(i).into_owned()
    }

    pub fn volume(&self) -> f64 {
        self.h.determinant().abs()
    }

    /// Solve `h·s = v` for the fractional coordinates `s`.
    pub fn partial_coords(&self, v: &Vector3<f64>) -> Result<Vector3<f64>> {
        let singular = || PackingError::SingularCell {
            det: self.h.determinant(),
        };
        let s = self.h.col_piv_qr().solve(v).ok_or_else(singular)?;
        if s.iter().all(|x| x.is_finite()) {
            Ok(s)
        } else {
            Err(singular())
        }
    }

    /// Absolute coordinates of the fractional point `s`.
    pub fn to_absolute(&self, s: &Vector3<f64>) -> Vector3<f64> {
        self.h * s
    }

    /// Image of `v` inside the fundamental domain.
    pub fn periodic_image(&self, v: &Vector3<f64>) -> Result<Vector3<f64>> {
        let s = self.partial_coords(v)?.map(fold_unit);
        Ok(self.h * s)
    }

    /// Displacement that carries a body centred at `com` into the fundamental domain.
    pub fn wrap_displacement(&self, com: &Vector3<f64>) -> Result<Vector3<f64>> {
        Ok(self.periodic_image(com)? - com)
    }

    /// Rigidly translate `shape` so its centre of mass lies in the fundamental domain.
    pub fn wrap_shape(&self, shape: &mut Shape) -> Result<()> {
        let dr = self.wrap_displacement(&shape.com())?;
        shape.translate(&dr);
        Ok(())
    }

    /// Check the cell against the hard constraints applied after a cell move.
    ///
    /// Returns the first violated constraint, or `None` if the cell is acceptable.
    pub fn check_geometry(
        &self,
        min_length: f64,
        project_threshold: f64,
    ) -> Option<GeometryViolation> {
        if self.h.determinant() <= DET_EPSILON {
            return Some(GeometryViolation::Inverted);
        }

        let basis = [self.basis(0), self.basis(1), self.basis(2)];
        if basis.iter().any(|v| v.norm() < min_length) {
            return Some(GeometryViolation::ShortBasis);
        }

        let units = basis.map(|v| v.normalize());
        for (i, j) in [(0, 1), (0, 2), (1, 2)] {
            if units[i].dot(&units[j]).abs() > project_threshold {
                return Some(GeometryViolation::Collinear);
            }
        }

        for i in 0..3 {
            let normal = units[(i + 1) % 3].cross(&units[(i + 2) % 3]);
            let norm = normal.norm();
            if norm < DET_EPSILON || units[i].dot(&normal).abs() / norm < 1.0 - project_threshold {
                return Some(GeometryViolation::Flat);
            }
        }

        None
    }
}

/// Fold a fractional coordinate into `[0, 1)`.
fn fold_unit(x: f64) -> f64 {
    let f = x - x.floor();
    // x slightly below an integer can round up to exactly 1.0
    if f >= 1.0 {
        0.0
    } else {
        f
    }
}

impl fmt::Display for Cell {
    /// One line per lattice vector.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in 0..3 {
            let v = self.basis(i);
            writeln!(f, "{:.10} {:.10} {:.10}", v.x, v.y, v.z)?;
        }
        Ok(())
    }
}
