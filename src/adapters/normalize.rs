//! Component normalization: an ordered keyword table mapping raw component
//! strings (sensor names, free-text labels from upstream detectors) onto the
//! canonical vocabulary SPEC_FULL §4.6 names, with a cache for repeat
//! lookups.
//!
//! Grounded on `original_source/fleet_command_center.py`'s
//! `COMPONENT_NORMALIZATION`/`_normalize_component`, trimmed from its
//! bilingual keyword lists to the keywords this crate's own sensor/telemetry
//! vocabulary actually produces.

use dashmap::DashMap;
use std::sync::OnceLock;

/// Canonical component vocabulary (SPEC_FULL §4.6).
const CANONICAL_TABLE: &[(&str, &[&str])] = &[
    ("oil_system", &["oil", "lubrication", "oil_press", "oil_temp", "oil pump", "oil filter"]),
    ("cooling_system", &["coolant", "cool_temp", "cooling", "radiator", "thermostat", "overheat"]),
    ("def_system", &["def", "adblue", "urea", "def_level", "scr", "nox", "emissions"]),
    ("transmission", &["transmission", "trans", "trans_temp", "gearbox", "clutch"]),
    ("electrical", &["voltage", "battery", "electrical", "alternator", "volt", "pwr_ext", "pwr_int"]),
    ("turbo_system", &["turbo", "turbocharger", "intercooler", "intake", "intake_air_temp", "boost"]),
    ("fuel_system", &["fuel", "diesel", "fuel_lvl", "fuel_rate", "injector", "refuel", "theft"]),
    ("brake_system", &["brake", "brakes", "abs", "air brake"]),
    ("gps", &["gps", "location", "satellites", "hdop"]),
    ("dtc", &["dtc", "code", "diagnostic", "fault", "spn", "fmi"]),
    ("engine", &["engine", "rpm", "engine_load", "power", "engine_hours"]),
    ("efficiency", &["efficiency", "mpg", "consumption", "idle"]),
];

fn cache() -> &'static DashMap<String, &'static str> {
    static CACHE: OnceLock<DashMap<String, &'static str>> = OnceLock::new();
    CACHE.get_or_init(DashMap::new)
}

/// Normalize a raw component/sensor string to the canonical vocabulary.
/// Unknown strings pass through lower-cased with spaces replaced by
/// underscores.
pub fn normalize(raw: &str) -> String {
    let key = raw.to_lowercase();
    if let Some(hit) = cache().get(&key) {
        return (*hit).to_string();
    }

    for (canonical, keywords) in CANONICAL_TABLE {
        if keywords.iter().any(|kw| key.contains(kw)) {
            cache().insert(key, canonical);
            return (*canonical).to_string();
        }
    }

    let fallback = key.replace(' ', "_");
    fallback
}
