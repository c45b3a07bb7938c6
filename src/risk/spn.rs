//! J1939 SPN normalization table (SPEC_FULL §4.5).
//!
//! Grounded on `original_source/fleet_command_center.py`'s `J1939_SPN_MAP`.

use crate::types::SpnEntry;

/// Fixed SPN → {component, human name, unit} lookup table.
const TABLE: &[SpnEntry] = &[
    SpnEntry { spn: 190, component: "engine", human_name: "Engine Speed", unit: "rpm" },
    SpnEntry { spn: 92, component: "engine_load", human_name: "Engine Load", unit: "%" },
    SpnEntry { spn: 110, component: "cool_temp", human_name: "Engine Coolant Temperature", unit: "\u{b0}F" },
    SpnEntry { spn: 175, component: "oil_temp", human_name: "Engine Oil Temperature", unit: "\u{b0}F" },
    SpnEntry { spn: 177, component: "trans_temp", human_name: "Transmission Oil Temperature", unit: "\u{b0}F" },
    SpnEntry { spn: 105, component: "intake_air_temp", human_name: "Intake Manifold Temperature", unit: "\u{b0}F" },
    SpnEntry { spn: 100, component: "oil_press", human_name: "Engine Oil Pressure", unit: "psi" },
    SpnEntry { spn: 5245, component: "def_level", human_name: "DEF Tank Level", unit: "%" },
    SpnEntry { spn: 5246, component: "def_temp", human_name: "DEF Temperature", unit: "\u{b0}F" },
    SpnEntry { spn: 168, component: "voltage", human_name: "Battery Voltage", unit: "V" },
    SpnEntry { spn: 96, component: "fuel_lvl", human_name: "Fuel Level", unit: "%" },
    SpnEntry { spn: 183, component: "fuel_rate", human_name: "Fuel Rate", unit: "L/h" },
];

/// Look up the full entry for a SPN, if known.
pub fn lookup(spn: u32) -> Option<SpnEntry> {
    TABLE.iter().find(|e| e.spn == spn).copied()
}

/// Look up just the normalized component name for a SPN.
pub fn component_for(spn: u32) -> Option<&'static str> {
    lookup(spn).map(|e| e.component)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_spn_resolves() {
        let entry = lookup(110).unwrap();
        assert_eq!(entry.component, "cool_temp");
        assert_eq!(component_for(110), Some("cool_temp"));
    }

    #[test]
    fn unknown_spn_is_none() {
        assert!(lookup(999_999).is_none());
    }

    #[test]
    fn table_covers_required_minimum() {
        let required = [190, 92, 110, 175, 177, 105, 100, 5245, 5246, 168, 96, 183];
        for spn in required {
            assert!(lookup(spn).is_some(), "missing SPN {spn}");
        }
    }
}
