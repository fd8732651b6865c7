//! Axis-aligned extent computation for solids.
//!
//! Extents are conservative bounds used for structural checks, never for
//! physics. Boolean extents: a union's extent is the union of the operands'
//! transformed extents; a subtraction keeps the left operand's extent; an
//! intersection takes the box intersection.

use nalgebra::{Point3, Rotation3, Vector3};

use crate::shapes::Shape;

/// Axis-aligned bounding box in 3D, in mm.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb3 {
    /// Minimum corner.
    pub min: Point3<f64>,
    /// Maximum corner.
    pub max: Point3<f64>,
}

impl Aabb3 {
    /// Create an AABB from min and max corners.
    pub fn new(min: Point3<f64>, max: Point3<f64>) -> Self {
        Self { min, max }
    }

    /// A box centered at the origin with the given half extents.
    pub fn centered(hx: f64, hy: f64, hz: f64) -> Self {
        Self {
            min: Point3::new(-hx, -hy, -hz),
            max: Point3::new(hx, hy, hz),
        }
    }

    /// Create an empty (inverted) AABB suitable for expansion.
    pub fn empty() -> Self {
        Self {
            min: Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            max: Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    /// Expand this AABB to include a point.
    pub fn include_point(&mut self, p: &Point3<f64>) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.min.z = self.min.z.min(p.z);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
        self.max.z = self.max.z.max(p.z);
    }

    /// The union of two AABBs.
    pub fn union(&self, other: &Aabb3) -> Aabb3 {
        let mut out = *self;
        out.include_point(&other.min);
        out.include_point(&other.max);
        out
    }

    /// The box intersection of two AABBs (may be inverted when disjoint).
    pub fn intersection(&self, other: &Aabb3) -> Aabb3 {
        Aabb3 {
            min: Point3::new(
                self.min.x.max(other.min.x),
                self.min.y.max(other.min.y),
                self.min.z.max(other.min.z),
            ),
            max: Point3::new(
                self.max.x.min(other.max.x),
                self.max.y.min(other.max.y),
                self.max.z.min(other.max.z),
            ),
        }
    }

    /// Test if two AABBs overlap (touching counts as overlap).
    pub fn overlaps(&self, other: &Aabb3) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    /// The AABB of this box rotated and translated: all eight corners are
    /// transformed and re-bounded.
    pub fn transformed(&self, rotation: Option<&Rotation3<f64>>, translation: &Vector3<f64>) -> Aabb3 {
        let mut out = Aabb3::empty();
        for &x in &[self.min.x, self.max.x] {
            for &y in &[self.min.y, self.max.y] {
                for &z in &[self.min.z, self.max.z] {
                    let corner = Point3::new(x, y, z);
                    let rotated = match rotation {
                        Some(r) => r * corner,
                        None => corner,
                    };
                    out.include_point(&(rotated + translation));
                }
            }
        }
        out
    }
}

/// Conservative extent of a primitive shape, centered per the framework's
/// shape conventions.
pub fn shape_extent(shape: &Shape) -> Aabb3 {
    match shape {
        Shape::Box { hx, hy, hz } => Aabb3::centered(*hx, *hy, *hz),
        Shape::Sphere { rmax, .. } => Aabb3::centered(*rmax, *rmax, *rmax),
        Shape::Tube { rmax, hz, .. } => Aabb3::centered(*rmax, *rmax, *hz),
        Shape::Cone {
            rmax1, rmax2, hz, ..
        } => {
            let r = rmax1.max(*rmax2);
            Aabb3::centered(r, r, *hz)
        }
        Shape::Trd {
            hx1,
            hx2,
            hy1,
            hy2,
            hz,
        } => Aabb3::centered(hx1.max(*hx2), hy1.max(*hy2), *hz),
        Shape::Torus { rmax, rtor, .. } => Aabb3::centered(rtor + rmax, rtor + rmax, *rmax),
        Shape::Ellipsoid {
            ax,
            by,
            zcut1,
            zcut2,
            ..
        } => Aabb3::new(
            Point3::new(-ax, -by, *zcut1),
            Point3::new(*ax, *by, *zcut2),
        ),
        Shape::Orb { radius } => Aabb3::centered(*radius, *radius, *radius),
        Shape::EllipticalTube { dx, dy, dz } => Aabb3::centered(*dx, *dy, *dz),
        Shape::Polycone { planes, .. } | Shape::Polyhedra { planes, .. } => {
            let r = planes.iter().map(|p| p.rmax).fold(0.0, f64::max);
            // Profiles are sorted by construction.
            let z0 = planes.first().map_or(0.0, |p| p.z);
            let z1 = planes.last().map_or(0.0, |p| p.z);
            Aabb3::new(Point3::new(-r, -r, z0), Point3::new(r, r, z1))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn union_and_intersection() {
        let a = Aabb3::centered(1.0, 1.0, 1.0);
        let b = Aabb3::new(Point3::new(0.0, 0.0, 0.0), Point3::new(2.0, 2.0, 2.0));
        let u = a.union(&b);
        assert_eq!(u.min, Point3::new(-1.0, -1.0, -1.0));
        assert_eq!(u.max, Point3::new(2.0, 2.0, 2.0));
        let i = a.intersection(&b);
        assert_eq!(i.min, Point3::new(0.0, 0.0, 0.0));
        assert_eq!(i.max, Point3::new(1.0, 1.0, 1.0));
        assert!(a.overlaps(&b));
    }

    #[test]
    fn transformed_rotates_corners() {
        // A flat slab rotated 90° about x swaps its y and z extents.
        let slab = Aabb3::centered(1.0, 4.0, 2.0);
        let rot = Rotation3::from_euler_angles(FRAC_PI_2, 0.0, 0.0);
        let out = slab.transformed(Some(&rot), &Vector3::new(10.0, 0.0, 0.0));
        assert_relative_eq!(out.max.x, 11.0, epsilon = 1e-12);
        assert_relative_eq!(out.max.y, 2.0, epsilon = 1e-12);
        assert_relative_eq!(out.max.z, 4.0, epsilon = 1e-12);
    }

    #[test]
    fn torus_extent() {
        let shape = Shape::Torus {
            rmin: 0.0,
            rmax: 2.0,
            rtor: 10.0,
            start_phi: 0.0,
            delta_phi: std::f64::consts::TAU,
        };
        let ext = shape_extent(&shape);
        assert_eq!(ext.max, Point3::new(12.0, 12.0, 2.0));
    }

    #[test]
    fn polycone_extent_spans_profile() {
        let shape = Shape::Polycone {
            start_phi: 0.0,
            delta_phi: std::f64::consts::TAU,
            planes: vec![
                crate::shapes::ZPlane {
                    z: -50.0,
                    rmin: 0.0,
                    rmax: 30.0,
                },
                crate::shapes::ZPlane {
                    z: 100.0,
                    rmin: 0.0,
                    rmax: 20.0,
                },
            ],
        };
        let ext = shape_extent(&shape);
        assert_eq!(ext.min, Point3::new(-30.0, -30.0, -50.0));
        assert_eq!(ext.max, Point3::new(30.0, 30.0, 100.0));
    }
}
