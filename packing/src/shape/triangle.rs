use nalgebra::Vector3;

/// Vertices closer than this (scaled by the face normal length) to a plane count as on it.
const PLANE_EPSILON: f64 = 1e-12;
/// Edge cross products with a squared norm below this are not used as axes.
const AXIS_EPSILON: f64 = 1e-20;

/// A triangular face stored as one vertex plus two edge vectors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub origin: Vector3<f64>,
    pub e1: Vector3<f64>,
    pub e2: Vector3<f64>,
}

impl Triangle {
    pub fn new(a: &Vector3<f64>, b: &Vector3<f64>, c: &Vector3<f64>) -> Self {
        Self {
            origin: *a,
            e1: b - a,
            e2: c - a,
        }
    }

    pub fn vertices(&self) -> [Vector3<f64>; 3] {
        [self.origin, self.origin + self.e1, self.origin + self.e2]
    }

    /// Unnormalized face normal `e1 × e2`.
    pub fn normal(&self) -> Vector3<f64> {
        self.e1.cross(&self.e2)
    }

    fn edges(&self) -> [Vector3<f64>; 3] {
        [self.e1, self.e2 - self.e1, -self.e2]
    }

    /// Exact triangle/triangle overlap by separating axes.
    ///
    /// Non-coplanar pairs are tested on both face normals and the nine edge
    /// cross products; coplanar pairs on the six in-plane edge normals.
    /// Touching triangles count as intersecting. The predicate is exactly
    /// symmetric in its arguments.
    pub fn intersects(&self, other: &Triangle) -> bool {
        let a = self.vertices();
        let b = other.vertices();
        let n1 = self.normal();
        let n2 = other.normal();

        let d_b = b.map(|q| n1.dot(&(q - a[0])));
        let d_a = a.map(|p| n2.dot(&(p - b[0])));
        let tol_a = PLANE_EPSILON * n1.norm();
        let tol_b = PLANE_EPSILON * n2.norm();
        if strictly_one_side(&d_b, tol_a) || strictly_one_side(&d_a, tol_b) {
            return false;
        }

        let coplanar = d_b.iter().all(|d| d.abs() <= tol_a) && d_a.iter().all(|d| d.abs() <= tol_b);
        if coplanar {
            let n = if n1.dot(&n2) >= 0.0 { n1 + n2 } else { n1 - n2 };
            return !self
                .edges()
                .iter()
                .chain(other.edges().iter())
                .any(|e| separated_on(&n.cross(e), &a, &b));
        }

        for ea in self.edges() {
            for eb in other.edges() {
                let axis = ea.cross(&eb);
                if axis.norm_squared() < AXIS_EPSILON {
                    continue;
                }
                if separated_on(&axis, &a, &b) {
                    return false;
                }
            }
        }
        true
    }

    /// Closest point of the (filled) triangle to `p`.
    pub fn closest_point(&self, p: &Vector3<f64>) -> Vector3<f64> {
        let a = self.origin;
        let (ab, ac) = (self.e1, self.e2);
        let ap = p - a;
        let d1 = ab.dot(&ap);
        let d2 = ac.dot(&ap);
        if d1 <= 0.0 && d2 <= 0.0 {
            return a;
        }

        let bp = p - (a + ab);
        let d3 = ab.dot(&bp);
        let d4 = ac.dot(&bp);
        if d3 >= 0.0 && d4 <= d3 {
            return a + ab;
        }

        let vc = d1 * d4 - d3 * d2;
        if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
            return a + ab * (d1 / (d1 - d3));
        }

        let cp = p - (a + ac);
        let d5 = ab.dot(&cp);
        let d6 = ac.dot(&cp);
        if d6 >= 0.0 && d5 <= d6 {
            return a + ac;
        }

        let vb = d5 * d2 - d1 * d6;
        if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
            return a + ac * (d2 / (d2 - d6));
        }

        let va = d3 * d6 - d5 * d4;
        if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
            let t = (d4 - d3) / ((d4 - d3) + (d5 - d6));
            return a + ab + (ac - ab) * t;
        }

        let denom = 1.0 / (va + vb + vc);
        a + ab * (vb * denom) + ac * (vc * denom)
    }
}

fn strictly_one_side(d: &[f64; 3], tol: f64) -> bool {
    d.iter().all(|&x| x > tol) || d.iter().all(|&x| x < -tol)
}

fn interval(axis: &Vector3<f64>, points: &[Vector3<f64>; 3]) -> (f64, f64) {
    points
        .iter()
        .map(|p| axis.dot(p))
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), x| {
            (lo.min(x), hi.max(x))
        })
}

fn separated_on(axis: &Vector3<f64>, a: &[Vector3<f64>; 3], b: &[Vector3<f64>; 3]) -> bool {
    let (a_min, a_max) = interval(axis, a);
    let (b_min, b_max) = interval(axis, b);
    a_max < b_min || b_max < a_min
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_xy() -> Triangle {
        Triangle::new(
            &Vector3::new(0.0, 0.0, 0.0),
            &Vector3::new(1.0, 0.0, 0.0),
            &Vector3::new(0.0, 1.0, 0.0),
        )
    }

    #[test]
    fn test_crossing_triangles_intersect() {
        let flat = unit_xy();
        let upright = Triangle::new(
            &Vector3::new(0.2, 0.2, -0.5),
            &Vector3::new(0.2, 0.2, 0.5),
            &Vector3::new(0.8, -0.4, 0.0),
        );
        assert!(flat.intersects(&upright));
        assert!(upright.intersects(&flat));
    }

    #[test]
    fn test_parallel_planes_do_not_intersect() {
        let flat = unit_xy();
        let mut lifted = flat;
        lifted.origin.z = 0.1;
        assert!(!flat.intersects(&lifted));
    }

    #[test]
    fn test_pierce_outside_the_face() {
        let flat = unit_xy();
        // crosses the plane z = 0 only beyond the hypotenuse
        let upright = Triangle::new(
            &Vector3::new(0.8, 0.8, -0.5),
            &Vector3::new(0.8, 0.8, 0.5),
            &Vector3::new(1.5, 1.5, 0.0),
        );
        assert!(!flat.intersects(&upright));
        assert!(!upright.intersects(&flat));
    }

    #[test]
    fn test_coplanar_cases() {
        let flat = unit_xy();
        assert!(flat.intersects(&flat));

        let mut shifted = flat;
        shifted.origin.x = 0.3;
        assert!(flat.intersects(&shifted));

        shifted.origin = Vector3::new(0.8, 0.8, 0.0);
        assert!(!flat.intersects(&shifted));
    }

    #[test]
    fn test_closest_point_regions() {
        let t = unit_xy();
        // interior projection
        let p = t.closest_point(&Vector3::new(0.25, 0.25, 3.0));
        assert_relative_eq!(p, Vector3::new(0.25, 0.25, 0.0), epsilon = 1e-12);
        // vertex region
        let p = t.closest_point(&Vector3::new(-1.0, -1.0, 0.0));
        assert_relative_eq!(p, Vector3::zeros(), epsilon = 1e-12);
        // hypotenuse region
        let p = t.closest_point(&Vector3::new(1.0, 1.0, 0.0));
        assert_relative_eq!(p, Vector3::new(0.5, 0.5, 0.0), epsilon = 1e-12);
        // edge along x
        let p = t.closest_point(&Vector3::new(0.5, -2.0, 1.0));
        assert_relative_eq!(p, Vector3::new(0.5, 0.0, 0.0), epsilon = 1e-12);
    }
}
