//! Rigid convex bodies: unit-diameter spheres and unit-edge regular tetrahedra.

mod sphere;
mod tetrahedron;
mod triangle;

pub use sphere::{Sphere, SPHERE_DIAMETER, SPHERE_RADIUS, SPHERE_VOLUME};
pub use tetrahedron::{Tetrahedron, CIRCUMSPHERE_DIAMETER, INSPHERE_DIAMETER, TETRAHEDRON_VOLUME};
pub use triangle::Triangle;

use nalgebra::{Matrix3, Rotation3, Vector3};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which body a simulation is populated with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    #[default]
    Tetrahedron,
    Sphere,
}

impl ShapeKind {
    pub fn volume(self) -> f64 {
        match self {
            ShapeKind::Tetrahedron => TETRAHEDRON_VOLUME,
            ShapeKind::Sphere => SPHERE_VOLUME,
        }
    }

    /// A body of this kind centred at `origin` and oriented by the given Euler angles.
    pub fn build(self, origin: Vector3<f64>, roll: f64, pitch: f64, yaw: f64) -> Shape {
        match self {
            ShapeKind::Tetrahedron => Shape::Tetrahedron(Tetrahedron::new(origin, roll, pitch, yaw)),
            ShapeKind::Sphere => Shape::Sphere(Sphere::new(origin)),
        }
    }
}

/// Intrinsic ZYX rotation `Rz(roll)·Ry(yaw)·Rx(pitch)`.
pub fn rotation_matrix(roll: f64, pitch: f64, yaw: f64) -> Matrix3<f64> {
    let rz = Rotation3::from_axis_angle(&Vector3::z_axis(), roll);
    let ry = Rotation3::from_axis_angle(&Vector3::y_axis(), yaw);
    let rx = Rotation3::from_axis_angle(&Vector3::x_axis(), pitch);
    (rz * ry * rx).into_inner()
}

/// A rigid body in absolute coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Sphere(Sphere),
    Tetrahedron(Tetrahedron),
}

impl Shape {
    pub fn kind(&self) -> ShapeKind {
        match self {
            Shape::Sphere(_) => ShapeKind::Sphere,
            Shape::Tetrahedron(_) => ShapeKind::Tetrahedron,
        }
    }

    pub fn vertices(&self) -> &[Vector3<f64>] {
        match self {
            Shape::Sphere(s) => s.vertices(),
            Shape::Tetrahedron(t) => t.vertices(),
        }
    }

    /// Centre of mass: the unweighted mean of the vertices.
    pub fn com(&self) -> Vector3<f64> {
        match self {
            Shape::Sphere(s) => *s.center(),
            Shape::Tetrahedron(t) => t.com(),
        }
    }

    pub fn volume(&self) -> f64 {
        self.kind().volume()
    }

    pub fn translate(&mut self, dr: &Vector3<f64>) {
        match self {
            Shape::Sphere(s) => s.translate(dr),
            Shape::Tetrahedron(t) => t.translate(dr),
        }
    }

    /// Rotate about the centre of mass by Euler angles and return the matrix used.
    pub fn rotate(&mut self, roll: f64, pitch: f64, yaw: f64) -> Matrix3<f64> {
        let rotation = rotation_matrix(roll, pitch, yaw);
        self.rotate_by(&rotation);
        rotation
    }

    /// Rotate about the centre of mass by an explicit matrix.
    pub fn rotate_by(&mut self, rotation: &Matrix3<f64>) {
        match self {
            // a point is invariant under rotation about itself
            Shape::Sphere(_) => {}
            Shape::Tetrahedron(t) => t.rotate_by(rotation),
        }
    }

    /// Pairwise overlap predicate, symmetric in its arguments.
    pub fn intersects(&self, other: &Shape) -> bool {
        match (self, other) {
            (Shape::Sphere(a), Shape::Sphere(b)) => a.intersects(b),
            (Shape::Tetrahedron(a), Shape::Tetrahedron(b)) => a.intersects(b),
            (Shape::Tetrahedron(t), Shape::Sphere(s)) | (Shape::Sphere(s), Shape::Tetrahedron(t)) => {
                t.intersects_sphere(s)
            }
        }
    }
}

impl fmt::Display for Shape {
    /// All vertex components on one line.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for v in self.vertices() {
            for x in v.iter() {
                if !first {
                    write!(f, " ")?;
                }
                write!(f, "{x:.10}")?;
                first = false;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests;
