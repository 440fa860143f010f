use super::Undo;
use crate::cell::DET_EPSILON;
use crate::configuration::Configuration;
use crate::error::{PackingError, Result};
use crate::rng::UniformSource;
use nalgebra::{Matrix3, Vector3};
use std::mem;

pub(super) fn strain<R: UniformSource + ?Sized>(
    config: &mut Configuration,
    delta: f64,
    rng: &mut R,
    scratch: &mut Vec<Vector3<f64>>,
) -> Result<Undo> {
    let mut e = Matrix3::zeros();
    for i in 0..3 {
        for j in i..3 {
            let x = rng.uniform(-delta, delta);
            e[(i, j)] = x;
            e[(j, i)] = x;
        }
    }
    let h = *config.cell().h();
    config.set_cell_comoving((Matrix3::identity() + e) * h, scratch)?;
    Ok(Undo::Cell {
        h,
        fractional: mem::take(scratch),
    })
}

/// Stretch basis vector `b` along itself so that the volume changes by exactly `dv`.
pub(super) fn resize<R: UniformSource + ?Sized>(
    config: &mut Configuration,
    delta: f64,
    rng: &mut R,
    scratch: &mut Vec<Vector3<f64>>,
) -> Result<Undo> {
    let h = *config.cell().h();
    let b = rng.index(3);
    let dv = rng.uniform(-delta, delta);

    let e_b = h.column(b).into_owned();
    let area = h.column((b + 1) % 3).cross(&h.column((b + 2) % 3));
    let direction = e_b.normalize();
    // opposite face area projected onto the stretch direction, positive for det(h) > 0
    let height_area = direction.dot(&area);
    if height_area.is_nan() || height_area <= DET_EPSILON {
        return Err(PackingError::SingularCell {
            det: h.determinant(),
        });
    }

    let mut h_new = h;
    h_new.set_column(b, &(e_b + direction * (dv / height_area)));
    config.set_cell_comoving(h_new, scratch)?;
    Ok(Undo::Cell {
        h,
        fractional: mem::take(scratch),
    })
}
