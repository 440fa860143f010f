use crate::cell::Cell;
use crate::error::Result;
use crate::shape::Shape;
use itertools::iproduct;
use nalgebra::{Matrix3, Vector3};

/// Number of cells in the first periodic shell.
pub const N_IMAGES: usize = 26;

/// Integer lattice offsets `{-1,0,1}³ \ {(0,0,0)}`, in a fixed order.
pub fn shell_offsets() -> impl Iterator<Item = Vector3<f64>> {
    iproduct!(-1i32..=1, -1i32..=1, -1i32..=1)
        .filter(|&offset| offset != (0, 0, 0))
        .map(|(j, k, l)| Vector3::new(j as f64, k as f64, l as f64))
}

/// A body together with its periodic images in the 26 neighbouring cells.
///
/// Image slots are allocated once and overwritten in place. Translation and
/// rotation move the images in lock-step with the body; any change to the
/// cell matrix requires [`Particle::refresh_images`].
#[derive(Debug, Clone)]
pub struct Particle {
    body: Shape,
    images: [Shape; N_IMAGES],
}

impl Particle {
    pub fn new(body: Shape, cell: &Cell) -> Self {
        let mut particle = Self {
            body,
            images: [body; N_IMAGES],
        };
        particle.refresh_images(cell);
        particle
    }

    pub fn body(&self) -> &Shape {
        &self.body
    }

    pub fn images(&self) -> &[Shape] {
        &self.images
    }

    pub fn com(&self) -> Vector3<f64> {
        self.body.com()
    }

    pub fn translate(&mut self, dr: &Vector3<f64>) {
        self.body.translate(dr);
        for image in self.images.iter_mut() {
            image.translate(dr);
        }
    }

    /// Rotate the body and every image about their own centres.
    pub fn rotate(&mut self, roll: f64, pitch: f64, yaw: f64) -> Matrix3<f64> {
        let rotation = self.body.rotate(roll, pitch, yaw);
        for image in self.images.iter_mut() {
            image.rotate_by(&rotation);
        }
        rotation
    }

    /// Regenerate every image as the body translated by `h·offset`.
    pub fn refresh_images(&mut self, cell: &Cell) {
        for (image, offset) in self.images.iter_mut().zip(shell_offsets()) {
            *image = self.body;
            image.translate(&(cell.h() * offset));
        }
    }

    /// Put a previously snapshotted body back and rebuild the images.
    pub(crate) fn restore(&mut self, body: Shape, cell: &Cell) {
        self.body = body;
        self.refresh_images(cell);
    }

    /// Wrap the body into the fundamental cell and rebuild the images.
    pub fn wrap(&mut self, cell: &Cell) -> Result<()> {
        cell.wrap_shape(&mut self.body)?;
        self.refresh_images(cell);
        Ok(())
    }

    /// Overlap of this body with `other`'s body or any of its images.
    pub fn touches(&self, other: &Particle) -> bool {
        self.touches_images_of(other) || self.body.intersects(&other.body)
    }

    /// Overlap of this body with any image of `other` (which may be `self`).
    pub fn touches_images_of(&self, other: &Particle) -> bool {
        other.images.iter().any(|image| self.body.intersects(image))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::{ShapeKind, Sphere};
    use approx::assert_relative_eq;
    use nalgebra::Matrix3;

    #[test]
    fn test_shell_has_26_distinct_offsets() {
        let offsets: Vec<_> = shell_offsets().collect();
        assert_eq!(offsets.len(), N_IMAGES);
        assert!(offsets.iter().all(|o| o.norm() > 0.5));
        for (i, a) in offsets.iter().enumerate() {
            for b in &offsets[i + 1..] {
                assert!((a - b).norm() > 0.5);
            }
            // the shell is symmetric under inversion
            assert!(offsets.iter().any(|b| (a + b).norm() < 1e-12));
        }
    }

    #[test]
    fn test_images_follow_the_cell() {
        let cell = Cell::new(Matrix3::new(2.0, 0.3, 0.0, 0.0, 2.0, 0.0, 0.0, 0.0, 2.5)).unwrap();
        let body = Shape::Sphere(Sphere::new(Vector3::new(1.0, 1.0, 1.0)));
        let particle = Particle::new(body, &cell);
        for (image, offset) in particle.images().iter().zip(shell_offsets()) {
            assert_relative_eq!(image.com() - body.com(), cell.h() * offset, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_lock_step_matches_refresh() {
        let cell = Cell::cubic(3.0).unwrap();
        let mut moved = Particle::new(
            ShapeKind::Tetrahedron.build(Vector3::new(1.5, 1.5, 1.5), 0.1, 0.2, 0.3),
            &cell,
        );
        moved.translate(&Vector3::new(0.2, -0.1, 0.05));
        moved.rotate(0.5, -0.4, 0.9);

        let mut rebuilt = moved.clone();
        rebuilt.refresh_images(&cell);
        for (a, b) in moved.images().iter().zip(rebuilt.images()) {
            for (va, vb) in a.vertices().iter().zip(b.vertices()) {
                assert_relative_eq!(va, vb, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_small_cell_self_overlap() {
        // a unit sphere overlaps its own image in a cell shorter than its diameter
        let body = Shape::Sphere(Sphere::new(Vector3::new(0.4, 0.4, 0.4)));
        let tight = Particle::new(body, &Cell::cubic(0.9).unwrap());
        assert!(tight.touches_images_of(&tight));
        let roomy = Particle::new(body, &Cell::cubic(1.1).unwrap());
        assert!(!roomy.touches_images_of(&roomy));
    }

    #[test]
    fn test_wrap_preserves_rigidity() {
        let cell = Cell::new(Matrix3::new(1.5, 0.2, 0.1, 0.0, 1.4, -0.2, 0.0, 0.0, 1.6)).unwrap();
        let mut particle = Particle::new(
            ShapeKind::Tetrahedron.build(Vector3::new(-7.3, 12.1, 4.4), 0.7, 1.9, -0.3),
            &cell,
        );
        let edges = |p: &Particle| {
            let v = p.body().vertices();
            let mut out = Vec::new();
            for i in 0..v.len() {
                for j in i + 1..v.len() {
                    out.push((v[i] - v[j]).norm());
                }
            }
            out
        };
        let before = edges(&particle);
        particle.wrap(&cell).unwrap();
        let s = cell.partial_coords(&particle.com()).unwrap();
        assert!(s.iter().all(|&x| (-1e-9..1.0 + 1e-9).contains(&x)));
        for (a, b) in before.iter().zip(edges(&particle)) {
            assert_relative_eq!(*a, b, epsilon = 1e-12);
        }
    }
}
