use nalgebra::Vector3;
use std::f64::consts::PI;

pub const SPHERE_RADIUS: f64 = 0.5;
pub const SPHERE_DIAMETER: f64 = 2.0 * SPHERE_RADIUS;
pub const SPHERE_VOLUME: f64 = 4.0 / 3.0 * PI * SPHERE_RADIUS * SPHERE_RADIUS * SPHERE_RADIUS;

/// Hard sphere of unit diameter, stored as its single centre vertex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    center: [Vector3<f64>; 1],
}

impl Sphere {
    pub fn new(center: Vector3<f64>) -> Self {
        Self { center: [center] }
    }

    pub fn center(&self) -> &Vector3<f64> {
        &self.center[0]
    }

    pub fn vertices(&self) -> &[Vector3<f64>] {
        &self.center
    }

    pub fn translate(&mut self, dr: &Vector3<f64>) {
        self.center[0] += dr;
    }

    /// Overlap with another sphere: centres closer than one diameter.
    pub fn intersects(&self, other: &Sphere) -> bool {
        (self.center() - other.center()).norm() < SPHERE_DIAMETER
    }
}
