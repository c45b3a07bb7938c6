//! Tank Registry entities: static, immutable-after-startup per-truck configuration.

use serde::{Deserialize, Serialize};

/// Gallons-to-liters conversion factor (US gallon).
pub const GALLONS_TO_LITERS: f64 = 3.78541;

/// Static per-truck configuration loaded once at startup from `units_map`.
///
/// Keys are unique on `truck_id` and `unit_id`; the registry enforces this at
/// load time. Immutable afterward — no field is ever mutated in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TruckConfig {
    /// Stable string identifier used throughout the system and the HTTP API.
    pub truck_id: String,
    /// Upstream numeric unit id (`units_map.unit`), used to query `sensors`.
    pub unit_id: i64,
    /// Tank capacity in US gallons.
    pub capacity_gallons: f64,
    /// Tank capacity in liters, derived as `capacity_gallons * GALLONS_TO_LITERS`.
    pub capacity_liters: f64,
    /// Fleet operator id; used as a multi-tenant partition.
    pub carrier_id: String,
    /// Per-truck multiplicative correction for pump under/over-reporting.
    /// Defaults to `1.0` when not configured.
    pub refuel_factor: f64,
}

impl TruckConfig {
    /// Build a `TruckConfig`, deriving `capacity_liters` from `capacity_gallons`.
    pub fn new(
        truck_id: impl Into<String>,
        unit_id: i64,
        capacity_gallons: f64,
        carrier_id: impl Into<String>,
        refuel_factor: Option<f64>,
    ) -> Self {
        Self {
            truck_id: truck_id.into(),
            unit_id,
            capacity_gallons,
            capacity_liters: capacity_gallons * GALLONS_TO_LITERS,
            carrier_id: carrier_id.into(),
            refuel_factor: refuel_factor.unwrap_or(1.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_liters_derived_from_gallons() {
        let truck = TruckConfig::new("T-1", 1001, 200.0, "skylord", None);
        assert!((truck.capacity_liters - 757.082).abs() < 0.01);
        assert_eq!(truck.refuel_factor, 1.0);
    }

    #[test]
    fn refuel_factor_override_respected() {
        let truck = TruckConfig::new("T-2", 1002, 150.0, "skylord", Some(1.05));
        assert_eq!(truck.refuel_factor, 1.05);
    }
}
