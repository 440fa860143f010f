use super::sphere::{Sphere, SPHERE_RADIUS};
use super::triangle::Triangle;
use nalgebra::{Matrix3, Vector3};
use std::f64::consts::SQRT_2;

/// Volume of a regular tetrahedron with unit edge, `1/(6√2)`.
pub const TETRAHEDRON_VOLUME: f64 = 1.0 / (6.0 * SQRT_2);
/// Diameter of the circumscribed sphere, `√6/2`.
pub const CIRCUMSPHERE_DIAMETER: f64 = 1.224_744_871_391_589;
/// Diameter of the inscribed sphere, `√6/6`.
pub const INSPHERE_DIAMETER: f64 = 0.408_248_290_463_863;

/// Vertex indices of each face; face `i` is the one opposite vertex `i`.
const FACES: [[usize; 3]; 4] = [[1, 2, 3], [0, 2, 3], [0, 1, 3], [0, 1, 2]];

/// Regular tetrahedron with unit edge length.
///
/// The four faces are a derived cache rebuilt after every translation or
/// rotation, so copies (periodic images, undo snapshots) carry consistent
/// faces with them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tetrahedron {
    vertices: [Vector3<f64>; 4],
    faces: [Triangle; 4],
}

impl Tetrahedron {
    /// The reference tetrahedron centred at the origin.
    pub fn reference() -> Self {
        let h = 0.5 / SQRT_2;
        Self::from_vertices([
            Vector3::new(0.5, 0.0, -h),
            Vector3::new(-0.5, 0.0, -h),
            Vector3::new(0.0, 0.5, h),
            Vector3::new(0.0, -0.5, h),
        ])
    }

    /// Reference tetrahedron moved to `origin`, then rotated about its centre.
    pub fn new(origin: Vector3<f64>, roll: f64, pitch: f64, yaw: f64) -> Self {
        let mut t = Self::reference();
        t.translate(&origin);
        t.rotate_by(&super::rotation_matrix(roll, pitch, yaw));
        t
    }

    pub fn from_vertices(vertices: [Vector3<f64>; 4]) -> Self {
        let mut t = Self {
            vertices,
            faces: [Triangle::new(&vertices[0], &vertices[1], &vertices[2]); 4],
        };
        t.refresh_faces();
        t
    }

    pub fn vertices(&self) -> &[Vector3<f64>] {
        &self.vertices
    }

    pub fn faces(&self) -> &[Triangle; 4] {
        &self.faces
    }

    pub fn com(&self) -> Vector3<f64> {
        self.vertices.iter().sum::<Vector3<f64>>() / 4.0
    }

    fn refresh_faces(&mut self) {
        for (face, idx) in self.faces.iter_mut().zip(FACES.iter()) {
            *face = Triangle::new(
                &self.vertices[idx[0]],
                &self.vertices[idx[1]],
                &self.vertices[idx[2]],
            );
        }
    }

    pub fn translate(&mut self, dr: &Vector3<f64>) {
        for v in self.vertices.iter_mut() {
            *v += dr;
        }
        self.refresh_faces();
    }

    /// Rotate in place about the centre of mass.
    pub fn rotate_by(&mut self, rotation: &Matrix3<f64>) {
        let com = self.com();
        for v in self.vertices.iter_mut() {
            *v = com + rotation * (*v - com);
        }
        self.refresh_faces();
    }

    /// `true` if `p` lies inside or on the boundary of the body.
    pub fn contains(&self, p: &Vector3<f64>) -> bool {
        self.faces.iter().zip(self.vertices.iter()).all(|(face, opposite)| {
            let n = face.normal();
            let side = n.dot(&(p - face.origin));
            let inner = n.dot(&(opposite - face.origin));
            side * inner >= 0.0
        })
    }

    /// Exact overlap test between two tetrahedra.
    ///
    /// Bounding spheres settle the far and the deeply overlapping cases;
    /// everything in between runs the 16 face/face triangle tests.
    pub fn intersects(&self, other: &Tetrahedron) -> bool {
        let d = (self.com() - other.com()).norm();
        if d > CIRCUMSPHERE_DIAMETER {
            return false;
        }
        if d < INSPHERE_DIAMETER {
            return true;
        }
        self.faces
            .iter()
            .any(|fa| other.faces.iter().any(|fb| fa.intersects(fb)))
    }

    /// Exact overlap test against a sphere.
    pub fn intersects_sphere(&self, sphere: &Sphere) -> bool {
        let c = sphere.center();
        if (self.com() - c).norm() > 0.5 * CIRCUMSPHERE_DIAMETER + SPHERE_RADIUS {
            return false;
        }
        if self.contains(c) {
            return true;
        }
        self.faces
            .iter()
            .any(|f| (f.closest_point(c) - c).norm() < SPHERE_RADIUS)
    }
}
