//! Unit resolution and vector/rotation parsing.
//!
//! All conversion happens exactly once, here: downstream code only ever sees
//! millimetres and radians. Internal canonical units are mm (length), rad
//! (angle), g/cm³ (density), kelvin (temperature), MeV (energy).

use crate::document::{PlacementRecord, RotationRecord};
use nalgebra::{Rotation3, Vector3};
use std::f64::consts::PI;

/// Scale factor from a named length unit to millimetres.
pub fn length_scale(unit: &str) -> Option<f64> {
    match unit {
        "mm" => Some(1.0),
        "cm" => Some(10.0),
        "m" => Some(1000.0),
        _ => None,
    }
}

/// Scale factor from a named angle unit to radians.
pub fn angle_scale(unit: &str) -> Option<f64> {
    match unit {
        "rad" => Some(1.0),
        "deg" => Some(PI / 180.0),
        _ => None,
    }
}

/// Scale factor from a named density unit to g/cm³.
pub fn density_scale(unit: &str) -> Option<f64> {
    match unit {
        "g/cm3" => Some(1.0),
        _ => None,
    }
}

/// Scale factor from a named temperature unit to kelvin.
pub fn temperature_scale(unit: &str) -> Option<f64> {
    match unit {
        "kelvin" => Some(1.0),
        _ => None,
    }
}

/// Translation of a placement record, in millimetres.
///
/// An unrecognized or absent unit falls back to mm.
pub fn translation_mm(record: &PlacementRecord) -> Vector3<f64> {
    let scale = record
        .unit
        .as_deref()
        .and_then(length_scale)
        .unwrap_or(1.0);
    Vector3::new(record.x * scale, record.y * scale, record.z * scale)
}

/// Active rotation matrix of a rotation record.
///
/// Rotations are applied in construction order X, then Y, then Z, so the
/// composed matrix is R = Rz·Ry·Rx — exactly the composition of
/// [`Rotation3::from_euler_angles`].
pub fn rotation_matrix(record: &RotationRecord) -> Rotation3<f64> {
    let scale = record.unit.as_deref().and_then(angle_scale).unwrap_or(1.0);
    Rotation3::from_euler_angles(record.x * scale, record.y * scale, record.z * scale)
}

/// Rotation of a placement, `None` when the record carries none.
///
/// Absent rotation is distinct from the identity rotation; builders pass it
/// through so the framework boundary can elide the allocation.
pub fn placement_rotation(record: &PlacementRecord) -> Option<Rotation3<f64>> {
    record.rotation.as_ref().map(rotation_matrix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn length_table() {
        assert_eq!(length_scale("mm"), Some(1.0));
        assert_eq!(length_scale("cm"), Some(10.0));
        assert_eq!(length_scale("m"), Some(1000.0));
        assert_eq!(length_scale("ft"), None);
    }

    #[test]
    fn angle_table() {
        assert_eq!(angle_scale("rad"), Some(1.0));
        assert_relative_eq!(angle_scale("deg").unwrap() * 180.0, PI);
    }

    #[test]
    fn translation_scaling() {
        let rec = PlacementRecord {
            x: 1.0,
            y: 2.0,
            z: 3.0,
            unit: Some("cm".into()),
            rotation: None,
            parent: None,
        };
        assert_eq!(translation_mm(&rec), Vector3::new(10.0, 20.0, 30.0));

        // Defaults to mm.
        let rec = PlacementRecord {
            unit: None,
            ..rec
        };
        assert_eq!(translation_mm(&rec), Vector3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn rotation_composition_order() {
        // X then Y then Z: rotating +90° about X maps +Y to +Z, then +90°
        // about Z maps that +Z to itself and +X to +Y.
        let rec = RotationRecord {
            x: FRAC_PI_2,
            y: 0.0,
            z: FRAC_PI_2,
            unit: None,
        };
        let rot = rotation_matrix(&rec);
        let v = rot * Vector3::new(0.0, 1.0, 0.0);
        assert_relative_eq!(v.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(v.y, 0.0, epsilon = 1e-12);
        assert_relative_eq!(v.z, 1.0, epsilon = 1e-12);

        // Same record expressed in degrees.
        let deg = RotationRecord {
            x: 90.0,
            y: 0.0,
            z: 90.0,
            unit: Some("deg".into()),
        };
        assert_relative_eq!(
            (rotation_matrix(&deg).matrix() - rot.matrix()).norm(),
            0.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn absent_rotation_is_none() {
        let rec = PlacementRecord {
            x: 0.0,
            y: 0.0,
            z: 0.0,
            unit: None,
            rotation: None,
            parent: None,
        };
        assert!(placement_rotation(&rec).is_none());
    }
}
