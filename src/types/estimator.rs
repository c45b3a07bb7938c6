//! Fuel Estimator state and refuel/theft event types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Which anchor condition, if any, currently gates the Kalman update step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnchorState {
    None,
    /// Vehicle stopped and stable for 30-45s.
    Static,
    /// Stable cruise speed within +/-2 mph for 3-6 minutes.
    Micro,
}

/// A single retained fuel-percent observation used for the refuel anti-noise
/// median check (ring of up to 5).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FuelHistoryPoint {
    pub pct: f64,
    pub timestamp: DateTime<Utc>,
}

/// A refuel candidate accumulating within the 10-minute pending window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingRefuel {
    pub start_timestamp: DateTime<Utc>,
    pub start_pct: f64,
    pub last_jump_timestamp: DateTime<Utc>,
    pub current_pct: f64,
    pub gap_aware: bool,
}

/// A suspected-level theft drop held for the recovery window before it is
/// reported, so a noise blip that recovers on the next reading never
/// finalizes as a theft event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PendingTheft {
    pub first_detected_timestamp: DateTime<Utc>,
    pub peak_drop_pct: f64,
}

/// Per-truck persistent Kalman filter + refuel/theft detection state.
///
/// Exclusively owned by the Telemetry Loop; other readers receive a cloned
/// snapshot rather than a reference into live state (see SPEC_FULL §5).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimatorState {
    pub truck_id: String,
    /// Kalman mean, percent of tank capacity, clamped to [0, 100].
    pub mean_pct: f64,
    /// Kalman variance; floored at a noise-floor constant.
    pub variance: f64,
    pub last_timestamp: Option<DateTime<Utc>>,
    pub last_ecu_total_gal: Option<f64>,
    pub ecu_failures: u32,
    pub ecu_degraded: bool,
    pub ecu_degraded_since: Option<DateTime<Utc>>,
    #[serde(default)]
    pub fuel_history_ring: VecDeque<FuelHistoryPoint>,
    pub pending_refuel: Option<PendingRefuel>,
    pub last_refuel_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub pending_theft: Option<PendingTheft>,
    pub anchor_state: AnchorState,
    /// When the current anchor condition first started holding.
    pub anchor_since: Option<DateTime<Utc>>,
    /// Speed captured when the current micro-anchor candidate began, used to
    /// test cruise stability (+/-2mph) on subsequent snapshots.
    #[serde(default)]
    pub anchor_reference_speed: Option<f64>,
    /// When sensor-vs-mean drift first exceeded the emergency-resync threshold.
    pub drift_since: Option<DateTime<Utc>>,
}

impl EstimatorState {
    /// A freshly initialized state for a truck with no prior history.
    pub fn fresh(truck_id: impl Into<String>, initial_pct: f64, initial_variance: f64) -> Self {
        Self {
            truck_id: truck_id.into(),
            mean_pct: initial_pct.clamp(0.0, 100.0),
            variance: initial_variance,
            last_timestamp: None,
            last_ecu_total_gal: None,
            ecu_failures: 0,
            ecu_degraded: false,
            ecu_degraded_since: None,
            fuel_history_ring: VecDeque::with_capacity(5),
            pending_refuel: None,
            last_refuel_time: None,
            pending_theft: None,
            anchor_state: AnchorState::None,
            anchor_since: None,
            anchor_reference_speed: None,
            drift_since: None,
        }
    }

    /// Push a validated fuel reading into the bounded (<=5) history ring.
    pub fn push_history(&mut self, pct: f64, timestamp: DateTime<Utc>) {
        if self.fuel_history_ring.len() >= 5 {
            self.fuel_history_ring.pop_front();
        }
        self.fuel_history_ring.push_back(FuelHistoryPoint { pct, timestamp });
    }

    /// Median of the retained fuel-history ring, or `None` if empty.
    pub fn history_median(&self) -> Option<f64> {
        if self.fuel_history_ring.is_empty() {
            return None;
        }
        let mut values: Vec<f64> = self.fuel_history_ring.iter().map(|p| p.pct).collect();
        values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        let mid = values.len() / 2;
        Some(if values.len() % 2 == 0 {
            (values[mid - 1] + values[mid]) / 2.0
        } else {
            values[mid]
        })
    }
}

/// Whether a finalized refuel crossed the "full tank" threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RefuelClassification {
    /// Ended above 90% of capacity.
    Full,
    Partial,
}

/// How the refuel was first detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RefuelDetectionSource {
    /// Detected across a reading gap of 5-120 minutes (engine-off refuel).
    GapAware,
    Continuous,
}

/// A finalized refuel event, ready for the Sync Writer to persist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefuelEvent {
    pub truck_id: String,
    pub start_timestamp: DateTime<Utc>,
    pub end_timestamp: DateTime<Utc>,
    pub pct_before: f64,
    pub pct_after: f64,
    pub gallons_added: f64,
    pub classification: RefuelClassification,
    pub detection_source: RefuelDetectionSource,
}

impl RefuelEvent {
    pub fn gallons_added(pct_before: f64, pct_after: f64, capacity_gallons: f64, refuel_factor: f64) -> f64 {
        ((pct_after - pct_before) / 100.0) * capacity_gallons * refuel_factor
    }
}

/// Severity of a suspected fuel drop not matched by a refuel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TheftSeverity {
    /// Drop > 10% while STOPPED, no matching refuel.
    Suspected,
    /// Drop > 25% while STOPPED, no matching refuel.
    Confirmed,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(offset_secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + offset_secs, 0).unwrap()
    }

    #[test]
    fn history_ring_bounded_at_five() {
        let mut state = EstimatorState::fresh("T-1", 50.0, 4.0);
        for i in 0..8 {
            state.push_history(50.0 + i as f64, ts(i));
        }
        assert_eq!(state.fuel_history_ring.len(), 5);
        // oldest three should have been evicted
        assert_eq!(state.fuel_history_ring.front().unwrap().pct, 53.0);
    }

    #[test]
    fn median_of_empty_ring_is_none() {
        let state = EstimatorState::fresh("T-1", 50.0, 4.0);
        assert_eq!(state.history_median(), None);
    }

    #[test]
    fn median_odd_count() {
        let mut state = EstimatorState::fresh("T-1", 50.0, 4.0);
        for (i, v) in [40.0, 10.0, 30.0].into_iter().enumerate() {
            state.push_history(v, ts(i as i64));
        }
        assert_eq!(state.history_median(), Some(30.0));
    }

    #[test]
    fn gallons_added_formula() {
        let gal = RefuelEvent::gallons_added(15.0, 85.0, 200.0, 1.0);
        assert!((gal - 140.0).abs() < 1e-9);
    }
}
