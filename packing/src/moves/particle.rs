use super::Undo;
use crate::configuration::Configuration;
use crate::error::Result;
use crate::rng::UniformSource;
use nalgebra::Vector3;

pub(super) fn translate<R: UniformSource + ?Sized>(
    config: &mut Configuration,
    index: usize,
    delta: f64,
    rng: &mut R,
) -> Result<Undo> {
    let particle = config.particle_mut(index)?;
    let body = *particle.body();
    let dr = Vector3::from_fn(|_, _| rng.uniform(-delta, delta));
    particle.translate(&dr);
    Ok(Undo::Particle { index, body })
}

pub(super) fn rotate<R: UniformSource + ?Sized>(
    config: &mut Configuration,
    index: usize,
    delta: f64,
    rng: &mut R,
) -> Result<Undo> {
    let particle = config.particle_mut(index)?;
    let body = *particle.body();
    let roll = rng.uniform(-delta, delta);
    let pitch = rng.uniform(-delta, delta);
    let yaw = rng.uniform(-delta, delta);
    particle.rotate(roll, pitch, yaw);
    Ok(Undo::Particle { index, body })
}
