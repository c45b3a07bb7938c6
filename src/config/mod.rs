//! Fleet configuration: baked defaults → TOML file → `command_center_config`
//! DB-row overrides (SPEC_FULL §9, §6).
//!
//! Call [`init`] once at startup, then [`get`] anywhere for a cheap snapshot
//! of the current config (an `Arc` clone). [`refresh`] swaps in a new
//! snapshot built from DB overrides without blocking readers.

pub mod defaults;
mod fleet_config;
mod overrides;
mod validation;

pub use fleet_config::{
    CacheConfig, CorrelationConfig, CorrelationPattern, DefConfig, FleetConfig, KalmanConfig,
    PersistenceGateConfig, PersistenceWindow, PriorityWeights, RefuelConfig, SensorRange,
    SensorRangesConfig, ServerConfig, TelemetryConfig,
};
pub use overrides::{apply_overrides, ConfigRow};
pub use validation::{validate, ConfigValidationError};

use arc_swap::ArcSwap;
use std::sync::{Arc, OnceLock};

static GLOBAL_CONFIG: OnceLock<ArcSwap<FleetConfig>> = OnceLock::new();

/// Initialize the global config. Must be called exactly once before `get()`.
pub fn init(config: FleetConfig) {
    if GLOBAL_CONFIG.set(ArcSwap::from_pointee(config)).is_err() {
        tracing::warn!("config::init() called more than once — ignoring");
    }
}

/// Get a cheap snapshot (`Arc` clone) of the current config.
///
/// Panics if `init()` has not been called — a missing config is a fatal
/// startup bug, not a recoverable condition.
pub fn get() -> Arc<FleetConfig> {
    GLOBAL_CONFIG
        .get()
        .expect("config::get() called before config::init()")
        .load_full()
}

pub fn is_initialized() -> bool {
    GLOBAL_CONFIG.get().is_some()
}

/// Rebuild the config from the current base plus fresh DB override rows and
/// swap it in atomically. Never panics on a bad row — see
/// [`overrides::apply_overrides`].
pub fn refresh(base: &FleetConfig, rows: &[ConfigRow]) {
    let updated = apply_overrides(base, rows);
    if let Some(slot) = GLOBAL_CONFIG.get() {
        slot.store(Arc::new(updated));
        tracing::debug!(rows = rows.len(), "config refreshed from db overrides");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_get_roundtrip() {
        // Each test process gets its own OnceLock instance is not true —
        // guard with is_initialized to make this test order-independent.
        if !is_initialized() {
            init(FleetConfig::default());
        }
        let cfg = get();
        assert!(cfg.priority_weights.days_urgency > 0.0);
    }
}
