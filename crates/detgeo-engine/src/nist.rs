//! Built-in standard materials database.
//!
//! A small table of the NIST-style materials detector configurations refer
//! to by symbolic name. Densities are g/cm³, temperatures kelvin;
//! compositions are element symbol → atom count, matching the compound
//! schema so standard and user-defined materials share one representation.

use crate::materials::{Material, MaterialState};

/// Look up a standard material by its symbolic name.
pub fn standard_material(name: &str) -> Option<Material> {
    let (density, state, temperature, composition): (f64, MaterialState, f64, &[(&str, u32)]) =
        match name {
            "G4_AIR" => (
                1.205e-3,
                MaterialState::Gas,
                293.15,
                &[("N", 78), ("O", 21), ("Ar", 1)],
            ),
            "G4_Galactic" => (1.0e-25, MaterialState::Gas, 2.73, &[("H", 1)]),
            "G4_WATER" => (1.0, MaterialState::Liquid, 293.15, &[("H", 2), ("O", 1)]),
            "G4_lXe" => (2.953, MaterialState::Liquid, 165.0, &[("Xe", 1)]),
            "G4_Pb" => (11.35, MaterialState::Solid, 293.15, &[("Pb", 1)]),
            "G4_Fe" => (7.874, MaterialState::Solid, 293.15, &[("Fe", 1)]),
            "G4_Al" => (2.699, MaterialState::Solid, 293.15, &[("Al", 1)]),
            "G4_Cu" => (8.96, MaterialState::Solid, 293.15, &[("Cu", 1)]),
            "G4_W" => (19.3, MaterialState::Solid, 293.15, &[("W", 1)]),
            "G4_Si" => (2.33, MaterialState::Solid, 293.15, &[("Si", 1)]),
            "G4_Ge" => (5.323, MaterialState::Solid, 293.15, &[("Ge", 1)]),
            "G4_CONCRETE" => (
                2.3,
                MaterialState::Solid,
                293.15,
                &[("H", 10), ("C", 1), ("O", 40), ("Si", 16), ("Ca", 2)],
            ),
            "G4_POLYETHYLENE" => (0.94, MaterialState::Solid, 293.15, &[("C", 2), ("H", 4)]),
            "G4_PLASTIC_SC_VINYLTOLUENE" => (
                1.032,
                MaterialState::Solid,
                293.15,
                &[("C", 9), ("H", 10)],
            ),
            "G4_SODIUM_IODIDE" => (3.667, MaterialState::Solid, 293.15, &[("Na", 1), ("I", 1)]),
            "G4_STAINLESS-STEEL" => (
                8.0,
                MaterialState::Solid,
                293.15,
                &[("Fe", 74), ("Cr", 18), ("Ni", 8)],
            ),
            _ => return None,
        };

    Some(Material {
        name: name.to_string(),
        density,
        state,
        temperature,
        composition: composition
            .iter()
            .map(|&(symbol, count)| (symbol.to_string(), count))
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_names_resolve() {
        let air = standard_material("G4_AIR").unwrap();
        assert_eq!(air.state, MaterialState::Gas);
        assert!(air.density < 1.0e-2);

        let lead = standard_material("G4_Pb").unwrap();
        assert_eq!(lead.density, 11.35);
        assert_eq!(lead.composition, vec![("Pb".to_string(), 1)]);
    }

    #[test]
    fn unknown_names_do_not() {
        assert!(standard_material("G4_UNOBTAINIUM").is_none());
        assert!(standard_material("").is_none());
    }
}
