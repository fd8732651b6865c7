//! Primitive shape descriptors.
//!
//! Each descriptor stores its parameters in internal units (mm, rad) with
//! every default already applied; construction from a [`Dimensions`] record
//! scales the raw numbers exactly once. Full extents in the configuration
//! (box edges, tube heights) become half-extents here, matching the transport
//! framework's conventions.

use crate::error::{Result, SolidError};
use detgeo_config::units::length_scale;
use detgeo_config::Dimensions;
use std::f64::consts::PI;

/// One z-plane of a polycone/polyhedra profile, in mm.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZPlane {
    /// Plane position along z.
    pub z: f64,
    /// Inner radius at this plane.
    pub rmin: f64,
    /// Outer radius at this plane.
    pub rmax: f64,
}

/// A parameterised primitive shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// Axis-aligned box; half extents.
    Box {
        /// Half extent along x.
        hx: f64,
        /// Half extent along y.
        hy: f64,
        /// Half extent along z.
        hz: f64,
    },
    /// Spherical shell sector.
    Sphere {
        /// Inner radius.
        rmin: f64,
        /// Outer radius.
        rmax: f64,
        /// Azimuthal window start.
        start_phi: f64,
        /// Azimuthal window width.
        delta_phi: f64,
        /// Polar window start.
        start_theta: f64,
        /// Polar window width.
        delta_theta: f64,
    },
    /// Cylindrical tube sector along z.
    Tube {
        /// Inner radius.
        rmin: f64,
        /// Outer radius.
        rmax: f64,
        /// Half height.
        hz: f64,
        /// Azimuthal window start.
        start_phi: f64,
        /// Azimuthal window width.
        delta_phi: f64,
    },
    /// Conical tube sector along z.
    Cone {
        /// Inner radius at -z.
        rmin1: f64,
        /// Outer radius at -z.
        rmax1: f64,
        /// Inner radius at +z.
        rmin2: f64,
        /// Outer radius at +z.
        rmax2: f64,
        /// Half height.
        hz: f64,
        /// Azimuthal window start.
        start_phi: f64,
        /// Azimuthal window width.
        delta_phi: f64,
    },
    /// Trapezoid with x/y extents varying linearly along z.
    Trd {
        /// Half x extent at -z.
        hx1: f64,
        /// Half x extent at +z.
        hx2: f64,
        /// Half y extent at -z.
        hy1: f64,
        /// Half y extent at +z.
        hy2: f64,
        /// Half height.
        hz: f64,
    },
    /// Torus sector about z.
    Torus {
        /// Inner tube radius.
        rmin: f64,
        /// Outer tube radius.
        rmax: f64,
        /// Swept (torus) radius.
        rtor: f64,
        /// Azimuthal window start.
        start_phi: f64,
        /// Azimuthal window width.
        delta_phi: f64,
    },
    /// Ellipsoid with optional z cuts.
    Ellipsoid {
        /// Semi-axis along x.
        ax: f64,
        /// Semi-axis along y.
        by: f64,
        /// Semi-axis along z.
        cz: f64,
        /// Lower z cut.
        zcut1: f64,
        /// Upper z cut.
        zcut2: f64,
    },
    /// Full solid sphere.
    Orb {
        /// Radius.
        radius: f64,
    },
    /// Tube of elliptical cross-section along z; all values are half extents.
    EllipticalTube {
        /// Semi-axis along x.
        dx: f64,
        /// Semi-axis along y.
        dy: f64,
        /// Half height.
        dz: f64,
    },
    /// Solid of revolution defined by a z-profile of radii.
    Polycone {
        /// Azimuthal window start.
        start_phi: f64,
        /// Azimuthal window width.
        delta_phi: f64,
        /// Profile planes, sorted by ascending z.
        planes: Vec<ZPlane>,
    },
    /// Prismatic analogue of the polycone with flat sides.
    Polyhedra {
        /// Azimuthal window start.
        start_phi: f64,
        /// Azimuthal window width.
        delta_phi: f64,
        /// Number of flat sides.
        num_sides: u32,
        /// Profile planes, sorted by ascending z.
        planes: Vec<ZPlane>,
    },
}

/// Pull a required scalar out of a dimensions record.
fn require(dims: &Dimensions, solid: &str, field: &str) -> Result<f64> {
    dims.num(field).ok_or_else(|| SolidError::MissingField {
        solid: solid.to_string(),
        field: field.to_string(),
    })
}

/// Collect the z-profile of a polycone/polyhedra from either the structured
/// `planes` list or the parallel `z`/`rmax`/`rmin` arrays, sorted by z and
/// checked against the profile invariants.
fn profile_planes(dims: &Dimensions, solid: &str, scale: f64) -> Result<Vec<ZPlane>> {
    let mut planes: Vec<ZPlane> = if let Some(records) = dims.planes() {
        records
            .iter()
            .map(|p| ZPlane {
                z: p.z * scale,
                rmin: p.rmin * scale,
                rmax: p.rmax * scale,
            })
            .collect()
    } else {
        let z = dims.array("z").ok_or_else(|| SolidError::MissingField {
            solid: solid.to_string(),
            field: "planes".to_string(),
        })?;
        let rmax = dims.array("rmax").ok_or_else(|| SolidError::MissingField {
            solid: solid.to_string(),
            field: "rmax".to_string(),
        })?;
        let rmin = dims.array("rmin").unwrap_or_else(|| vec![0.0; z.len()]);
        if rmax.len() != z.len() || rmin.len() != z.len() {
            return Err(SolidError::DegenerateShape {
                solid: solid.to_string(),
                reason: "plane arrays have mismatched lengths".to_string(),
            });
        }
        z.iter()
            .zip(rmax.iter())
            .zip(rmin.iter())
            .map(|((&z, &rmax), &rmin)| ZPlane {
                z: z * scale,
                rmin: rmin * scale,
                rmax: rmax * scale,
            })
            .collect()
    };

    // Unsorted profiles are legal input; all parallel values follow the same
    // permutation because they travel together in ZPlane.
    planes.sort_by(|a, b| a.z.total_cmp(&b.z));

    if planes.len() < 2 {
        return Err(SolidError::DegenerateShape {
            solid: solid.to_string(),
            reason: format!("profile needs at least 2 z-planes, got {}", planes.len()),
        });
    }
    for pair in planes.windows(2) {
        if pair[0].z >= pair[1].z {
            return Err(SolidError::DegenerateShape {
                solid: solid.to_string(),
                reason: format!("z-planes not strictly increasing at z={}", pair[1].z),
            });
        }
    }
    for plane in &planes {
        if plane.rmin >= plane.rmax {
            return Err(SolidError::DegenerateShape {
                solid: solid.to_string(),
                reason: format!("rmin >= rmax at z={}", plane.z),
            });
        }
    }
    Ok(planes)
}

impl Shape {
    /// Build a shape descriptor from a type tag and its dimensions record.
    ///
    /// Lengths are scaled by the record's optional `unit` (default mm);
    /// angles are radians per the schema. Unknown tags yield
    /// [`SolidError::UnknownSolidType`].
    pub fn from_dimensions(name: &str, type_tag: &str, dims: &Dimensions) -> Result<Shape> {
        let s = dims
            .0
            .get("unit")
            .and_then(serde_json::Value::as_str)
            .and_then(length_scale)
            .unwrap_or(1.0);

        match type_tag {
            "box" => Ok(Shape::Box {
                hx: require(dims, name, "x")? * s / 2.0,
                hy: require(dims, name, "y")? * s / 2.0,
                hz: require(dims, name, "z")? * s / 2.0,
            }),
            "sphere" => Ok(Shape::Sphere {
                rmin: dims.num_or("inner_radius", 0.0) * s,
                rmax: require(dims, name, "radius")? * s,
                start_phi: dims.num_or("start_phi", 0.0),
                delta_phi: dims.num_or("delta_phi", 2.0 * PI),
                start_theta: dims.num_or("start_theta", 0.0),
                delta_theta: dims.num_or("delta_theta", PI),
            }),
            "tube" | "cylinder" => Ok(Shape::Tube {
                rmin: dims.num_or("inner_radius", 0.0) * s,
                rmax: require(dims, name, "radius")? * s,
                hz: require(dims, name, "height")? * s / 2.0,
                start_phi: dims.num_or("start_phi", 0.0),
                delta_phi: dims.num_or("delta_phi", 2.0 * PI),
            }),
            "cone" => Ok(Shape::Cone {
                rmin1: dims.num_or("inner_radius1", 0.0) * s,
                rmax1: require(dims, name, "radius1")? * s,
                rmin2: dims.num_or("inner_radius2", 0.0) * s,
                rmax2: require(dims, name, "radius2")? * s,
                hz: require(dims, name, "height")? * s / 2.0,
                start_phi: dims.num_or("start_phi", 0.0),
                delta_phi: dims.num_or("delta_phi", 2.0 * PI),
            }),
            "trd" | "trapezoid" => Ok(Shape::Trd {
                hx1: require(dims, name, "x1")? * s / 2.0,
                hx2: require(dims, name, "x2")? * s / 2.0,
                hy1: require(dims, name, "y1")? * s / 2.0,
                hy2: require(dims, name, "y2")? * s / 2.0,
                hz: require(dims, name, "height")? * s / 2.0,
            }),
            "torus" => Ok(Shape::Torus {
                rmin: dims.num_or("inner_radius", 0.0) * s,
                rmax: require(dims, name, "tube_radius")? * s,
                rtor: require(dims, name, "torus_radius")? * s,
                start_phi: dims.num_or("start_phi", 0.0),
                delta_phi: dims.num_or("delta_phi", 2.0 * PI),
            }),
            "ellipsoid" => {
                let cz = require(dims, name, "cz")? * s;
                Ok(Shape::Ellipsoid {
                    ax: require(dims, name, "ax")? * s,
                    by: require(dims, name, "by")? * s,
                    cz,
                    zcut1: dims.num("zcut1").map_or(-cz, |v| v * s),
                    zcut2: dims.num("zcut2").map_or(cz, |v| v * s),
                })
            }
            "orb" => Ok(Shape::Orb {
                radius: require(dims, name, "radius")? * s,
            }),
            "elliptical_tube" => Ok(Shape::EllipticalTube {
                dx: require(dims, name, "dx")? * s,
                dy: require(dims, name, "dy")? * s,
                dz: require(dims, name, "dz")? * s,
            }),
            "polycone" => Ok(Shape::Polycone {
                start_phi: dims.num_or("start_phi", 0.0),
                delta_phi: dims.num_or("delta_phi", 2.0 * PI),
                planes: profile_planes(dims, name, s)?,
            }),
            "polyhedra" => Ok(Shape::Polyhedra {
                start_phi: dims.num_or("start_phi", 0.0),
                delta_phi: dims.num_or("delta_phi", 2.0 * PI),
                num_sides: dims.int("num_sides").unwrap_or(8).max(3) as u32,
                planes: profile_planes(dims, name, s)?,
            }),
            other => Err(SolidError::UnknownSolidType {
                solid: name.to_string(),
                type_tag: other.to_string(),
            }),
        }
    }
}
