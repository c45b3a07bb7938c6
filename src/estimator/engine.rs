//! Per-truck Fuel Estimator orchestration: consumption arbitration, anchor
//! gating, refuel/theft detection, and drift-triggered emergency resync
//! (SPEC_FULL §4.2). Wraps the pure recursion in [`super::kalman`] with the
//! stateful bookkeeping a live `EstimatorState` needs across snapshots.

use super::kalman;
use crate::config::{KalmanConfig, RefuelConfig};
use crate::types::{
    AnchorState, EstimatorState, IdleMethod, PendingRefuel, PendingTheft, RefuelClassification,
    RefuelDetectionSource, RefuelEvent, SensorSnapshot, TheftSeverity, TruckConfig, TruckStatus,
};
use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EstimatorError {
    #[error("snapshot for truck {truck_id} is out of order: incoming {incoming} <= last seen {last}")]
    NonMonotonicSnapshot {
        truck_id: String,
        incoming: DateTime<Utc>,
        last: DateTime<Utc>,
    },
}

/// Everything a single `step` call produced, beyond the mutation already
/// applied to `EstimatorState` in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepOutcome {
    pub consumption_gph: Option<f64>,
    pub idle_method: Option<IdleMethod>,
    pub refuel_event: Option<RefuelEvent>,
    pub theft_severity: Option<TheftSeverity>,
    /// `|sensor_pct - mean_pct|`, 0.0 when no sensor reading was present.
    pub drift_pct: f64,
    pub drift_warning: bool,
}

/// Advance `state` by one snapshot, mutating it in place and returning the
/// derived-but-not-stored facts of this cycle (consumption source, any
/// finalized refuel or theft classification, drift status).
///
/// Snapshot timestamps double as the estimator's clock: all windows (anchor
/// hold, refuel pending/cooldown, drift duration) are measured against
/// `snapshot.timestamp`, not wall-clock time, so replay and live operation
/// behave identically.
pub fn step(
    state: &mut EstimatorState,
    snapshot: &SensorSnapshot,
    truck: &TruckConfig,
    status: TruckStatus,
    kalman_cfg: &KalmanConfig,
    refuel_cfg: &RefuelConfig,
) -> Result<StepOutcome, EstimatorError> {
    if let Some(last) = state.last_timestamp {
        if snapshot.timestamp <= last {
            return Err(EstimatorError::NonMonotonicSnapshot {
                truck_id: state.truck_id.clone(),
                incoming: snapshot.timestamp,
                last,
            });
        }
    }

    let dt_hours = state
        .last_timestamp
        .map(|last| (snapshot.timestamp - last).num_milliseconds() as f64 / 3_600_000.0)
        .unwrap_or(0.0);

    update_anchor(state, snapshot, kalman_cfg);

    let (consumption_gph, idle_method) = resolve_consumption(state, snapshot, dt_hours, kalman_cfg);

    let q = if snapshot.speed_mph.unwrap_or(0.0) > kalman_cfg.static_anchor_speed_mph {
        kalman_cfg.q_moving
    } else {
        kalman_cfg.q_static
    };
    let (mean, variance) = kalman::predict(
        state.mean_pct,
        state.variance,
        consumption_gph.unwrap_or(0.0),
        truck.capacity_gallons,
        dt_hours,
        q,
    );
    state.mean_pct = mean;
    state.variance = variance;

    let mut outcome = StepOutcome {
        consumption_gph,
        idle_method,
        ..Default::default()
    };

    if let Some(measured_pct) = snapshot.fuel_level_pct {
        outcome.refuel_event =
            detect_refuel(state, measured_pct, snapshot.timestamp, truck, refuel_cfg, kalman_cfg);

        if outcome.refuel_event.is_none() {
            outcome.theft_severity = detect_theft(state, measured_pct, snapshot.timestamp, status, refuel_cfg);
        }

        let anchor_holds = anchor_holds(state, kalman_cfg);
        if outcome.refuel_event.is_none() && anchor_holds {
            let (mean, variance) = kalman::update(
                state.mean_pct,
                state.variance,
                measured_pct,
                kalman_cfg.r_measurement_noise,
                kalman_cfg.variance_floor,
            );
            state.mean_pct = mean;
            state.variance = variance;
        }

        outcome.drift_pct = (measured_pct - state.mean_pct).abs();
        outcome.drift_warning = check_drift(state, measured_pct, snapshot.timestamp, kalman_cfg);

        state.push_history(measured_pct, snapshot.timestamp);
    }

    state.last_timestamp = Some(snapshot.timestamp);
    Ok(outcome)
}

/// Update the static/micro anchor candidate and, once it has held long
/// enough, the gate that [`step`] consults before trusting the sensor.
fn update_anchor(state: &mut EstimatorState, snapshot: &SensorSnapshot, cfg: &KalmanConfig) {
    let speed = snapshot.speed_mph;
    let rpm = snapshot.rpm;

    let is_static_candidate = speed.map(|s| s <= cfg.static_anchor_speed_mph).unwrap_or(false)
        && rpm.map(|r| r <= cfg.static_anchor_rpm).unwrap_or(true);

    let is_micro_candidate = speed
        .map(|s| s > cfg.static_anchor_speed_mph)
        .unwrap_or(false)
        && state
            .anchor_reference_speed
            .map(|reference| (speed.unwrap() - reference).abs() <= cfg.micro_anchor_speed_band_mph)
            .unwrap_or(true);

    let candidate = if is_static_candidate {
        AnchorState::Static
    } else if is_micro_candidate {
        AnchorState::Micro
    } else {
        AnchorState::None
    };

    if candidate != state.anchor_state {
        state.anchor_state = candidate;
        state.anchor_since = Some(snapshot.timestamp);
        state.anchor_reference_speed = speed;
    } else if candidate == AnchorState::Micro {
        // Re-anchor the cruise reference each cycle so a slow drift outside
        // the band is caught on the next snapshot rather than accumulating.
        state.anchor_reference_speed = speed;
    }
}

fn anchor_holds(state: &EstimatorState, cfg: &KalmanConfig) -> bool {
    let Some(since) = state.anchor_since else {
        return false;
    };
    let held_secs = state
        .last_timestamp
        .map(|last| (last - since).num_seconds())
        .unwrap_or(0);
    match state.anchor_state {
        AnchorState::Static => held_secs >= cfg.static_anchor_min_hold_secs,
        AnchorState::Micro => held_secs >= cfg.micro_anchor_min_hold_secs,
        AnchorState::None => false,
    }
}

/// ECU-vs-sensor consumption arbitration (SPEC_FULL §4.2). Preference order:
/// validated ECU total delta, then sensor `fuel_rate`, then the idle
/// fallback constant. Mutates `state`'s ECU counters/degraded-mode fields.
fn resolve_consumption(
    state: &mut EstimatorState,
    snapshot: &SensorSnapshot,
    dt_hours: f64,
    cfg: &KalmanConfig,
) -> (Option<f64>, Option<IdleMethod>) {
    let sensor_gph = snapshot
        .fuel_rate_lph
        .map(|lph| lph / crate::types::GALLONS_TO_LITERS);

    if let Some(total_gal) = snapshot.total_fuel_used_gal {
        let ecu_gph = match state.last_ecu_total_gal {
            None => {
                state.last_ecu_total_gal = Some(total_gal);
                None
            }
            Some(prior) if dt_hours > 0.0 => {
                let delta = total_gal - prior;
                if delta < 0.0 {
                    tracing::warn!(truck_id = %state.truck_id, "ECU total_fuel_used counter reset, reinitializing");
                    state.last_ecu_total_gal = Some(total_gal);
                    register_ecu_failure(state, snapshot.timestamp, cfg);
                    None
                } else {
                    let gph = delta / dt_hours;
                    if gph > cfg.ecu_max_gal_per_hour {
                        tracing::warn!(truck_id = %state.truck_id, gph, "ECU consumption delta implausible, rejecting");
                        register_ecu_failure(state, snapshot.timestamp, cfg);
                        None
                    } else {
                        state.last_ecu_total_gal = Some(total_gal);
                        // A single plausible delta doesn't prove recovery on its own: while
                        // degraded, it's only trusted once the recovery window has elapsed
                        // since entering degraded mode.
                        if state.ecu_degraded {
                            let recovered = state
                                .ecu_degraded_since
                                .is_some_and(|since| (snapshot.timestamp - since).num_seconds() >= cfg.ecu_degraded_recovery_secs);
                            if recovered {
                                clear_ecu_failure(state);
                                Some(gph)
                            } else {
                                None
                            }
                        } else {
                            clear_ecu_failure(state);
                            Some(gph)
                        }
                    }
                }
            }
            Some(_) => None,
        };

        if let Some(gph) = ecu_gph {
            if !state.ecu_degraded {
                if let Some(sensor_gph) = sensor_gph {
                    if (gph - sensor_gph).abs() > cfg.ecu_max_gal_per_hour * 0.2 {
                        tracing::warn!(
                            truck_id = %state.truck_id,
                            ecu_gph = gph,
                            sensor_gph,
                            "ECU and sensor fuel-rate diverge, trusting ECU"
                        );
                    }
                }
                return (Some(gph), Some(IdleMethod::Ecu));
            }
        }
    }

    maybe_attempt_ecu_recovery(state, snapshot.timestamp, cfg);

    if let Some(gph) = sensor_gph {
        return (Some(gph), Some(IdleMethod::SensorFuelRate));
    }

    (Some(cfg.idle_fallback_gph), Some(IdleMethod::Fallback))
}

fn register_ecu_failure(state: &mut EstimatorState, now: DateTime<Utc>, cfg: &KalmanConfig) {
    state.ecu_failures = state.ecu_failures.saturating_add(1);
    if !state.ecu_degraded && state.ecu_failures >= cfg.ecu_degraded_failure_threshold {
        state.ecu_degraded = true;
        state.ecu_degraded_since = Some(now);
        tracing::warn!(truck_id = %state.truck_id, "ECU consumption entering degraded mode");
    }
}

fn clear_ecu_failure(state: &mut EstimatorState) {
    state.ecu_failures = 0;
    if state.ecu_degraded {
        state.ecu_degraded = false;
        state.ecu_degraded_since = None;
        tracing::info!(truck_id = %state.truck_id, "ECU consumption recovered");
    }
}

fn maybe_attempt_ecu_recovery(state: &mut EstimatorState, now: DateTime<Utc>, cfg: &KalmanConfig) {
    if !state.ecu_degraded {
        return;
    }
    let Some(since) = state.ecu_degraded_since else {
        return;
    };
    if (now - since).num_seconds() >= cfg.ecu_degraded_recovery_secs {
        // Give the next valid ECU reading a clean slate to prove itself on.
        state.ecu_failures = 0;
    }
}

/// Refuel detection with gap-aware/continuous classification, pending-window
/// accumulation of consecutive jumps, the anti-noise ring-median check, and
/// the per-truck cooldown (SPEC_FULL §4.2).
fn detect_refuel(
    state: &mut EstimatorState,
    measured_pct: f64,
    now: DateTime<Utc>,
    truck: &TruckConfig,
    cfg: &RefuelConfig,
    kalman_cfg: &KalmanConfig,
) -> Option<RefuelEvent> {
    // A pending refuel gone quiet for the window duration finalizes first,
    // before this cycle's reading is considered as a new candidate.
    if let Some(pending) = state.pending_refuel.clone() {
        let quiet_minutes = (now - pending.last_jump_timestamp).num_seconds() as f64 / 60.0;
        if quiet_minutes >= cfg.pending_window_minutes as f64 {
            state.pending_refuel = None;
            if let Some(event) = finalize_refuel(state, &pending, now, truck, cfg, kalman_cfg) {
                return Some(event);
            }
        }
    }

    let last_known = state.history_median().or(Some(state.mean_pct));
    let Some(last_known) = last_known else {
        return None;
    };
    let jump_pct = measured_pct - last_known;
    let gallons = RefuelEvent::gallons_added(last_known, measured_pct, truck.capacity_gallons, truck.refuel_factor);

    if jump_pct < cfg.min_pct_jump || gallons < cfg.min_gallons {
        return None;
    }

    if let Some(median) = state.history_median() {
        if last_known < median * (1.0 - cfg.anti_noise_pct / 100.0) {
            tracing::debug!(truck_id = %state.truck_id, "refuel candidate rejected: anti-noise median check failed");
            return None;
        }
    }

    let gap_minutes = state
        .last_timestamp
        .map(|last| (now - last).num_seconds() as f64 / 60.0)
        .unwrap_or(0.0);
    let gap_aware = gap_minutes >= cfg.gap_aware_min_minutes as f64 && gap_minutes <= cfg.gap_aware_max_minutes as f64;

    match &mut state.pending_refuel {
        Some(pending) => {
            pending.current_pct = measured_pct;
            pending.last_jump_timestamp = now;
        }
        None => {
            state.pending_refuel = Some(PendingRefuel {
                start_timestamp: now,
                start_pct: last_known,
                last_jump_timestamp: now,
                current_pct: measured_pct,
                gap_aware,
            });
        }
    }
    None
}

fn finalize_refuel(
    state: &mut EstimatorState,
    pending: &PendingRefuel,
    now: DateTime<Utc>,
    truck: &TruckConfig,
    cfg: &RefuelConfig,
    kalman_cfg: &KalmanConfig,
) -> Option<RefuelEvent> {
    if let Some(last_refuel) = state.last_refuel_time {
        let since_last = (now - last_refuel).num_seconds() as f64 / 60.0;
        if since_last < cfg.cooldown_minutes as f64 {
            tracing::debug!(truck_id = %state.truck_id, "refuel finalize suppressed by cooldown");
            return None;
        }
    }

    let gallons_added = RefuelEvent::gallons_added(
        pending.start_pct,
        pending.current_pct,
        truck.capacity_gallons,
        truck.refuel_factor,
    );
    let classification = if pending.current_pct >= cfg.full_threshold_pct {
        RefuelClassification::Full
    } else {
        RefuelClassification::Partial
    };
    let detection_source = if pending.gap_aware {
        RefuelDetectionSource::GapAware
    } else {
        RefuelDetectionSource::Continuous
    };

    apply_refuel_reset(state, pending.current_pct, kalman_cfg.anchor_update_variance);
    state.last_refuel_time = Some(now);

    Some(RefuelEvent {
        truck_id: state.truck_id.clone(),
        start_timestamp: pending.start_timestamp,
        end_timestamp: now,
        pct_before: pending.start_pct,
        pct_after: pending.current_pct,
        gallons_added,
        classification,
        detection_source,
    })
}

/// Snap the filter to the post-refuel level with a tight, freshly-confident
/// variance (SPEC_FULL §4.2).
fn apply_refuel_reset(state: &mut EstimatorState, post_refuel_pct: f64, anchor_update_variance: f64) {
    state.mean_pct = post_refuel_pct.clamp(0.0, 100.0);
    state.variance = anchor_update_variance;
}

/// Suspected-level drops are held for `theft_recovery_window_minutes` before
/// being reported: a noise blip that recovers on a later reading within the
/// window is reclassified as sensor noise rather than theft (SPEC_FULL §4.2).
/// A confirmed-level drop is too large to plausibly be noise and reports
/// immediately.
fn detect_theft(
    state: &mut EstimatorState,
    measured_pct: f64,
    now: DateTime<Utc>,
    status: TruckStatus,
    cfg: &RefuelConfig,
) -> Option<TheftSeverity> {
    if status != TruckStatus::Stopped {
        state.pending_theft = None;
        return None;
    }

    let last_known = state.history_median().unwrap_or(state.mean_pct);
    let drop_pct = last_known - measured_pct;

    if drop_pct >= cfg.theft_confirmed_pct {
        state.pending_theft = None;
        return Some(TheftSeverity::Confirmed);
    }

    if drop_pct < cfg.theft_suspected_pct {
        if state.pending_theft.take().is_some() {
            tracing::debug!(truck_id = %state.truck_id, "theft-suspected drop recovered within window, reclassified as sensor noise");
        }
        return None;
    }

    match &mut state.pending_theft {
        Some(pending) => {
            pending.peak_drop_pct = pending.peak_drop_pct.max(drop_pct);
            let elapsed_minutes = (now - pending.first_detected_timestamp).num_seconds() as f64 / 60.0;
            if elapsed_minutes >= cfg.theft_recovery_window_minutes as f64 {
                let severity = if pending.peak_drop_pct >= cfg.theft_confirmed_pct {
                    TheftSeverity::Confirmed
                } else {
                    TheftSeverity::Suspected
                };
                state.pending_theft = None;
                Some(severity)
            } else {
                None
            }
        }
        None => {
            state.pending_theft = Some(PendingTheft { first_detected_timestamp: now, peak_drop_pct: drop_pct });
            None
        }
    }
}

/// Force a hard resync when sensor and estimate have diverged for too long
/// (SPEC_FULL §4.2). Returns whether a drift warning applies this cycle.
fn check_drift(state: &mut EstimatorState, measured_pct: f64, now: DateTime<Utc>, cfg: &KalmanConfig) -> bool {
    let diff_pct = (measured_pct - state.mean_pct).abs();
    if diff_pct <= cfg.drift_resync_pct {
        state.drift_since = None;
        return false;
    }

    let since = *state.drift_since.get_or_insert(now);
    let sustained_hours = (now - since).num_seconds() as f64 / 3600.0;
    if sustained_hours >= cfg.drift_resync_hours as f64 {
        tracing::warn!(truck_id = %state.truck_id, diff_pct, "sustained drift exceeded threshold, forcing emergency resync");
        state.mean_pct = measured_pct.clamp(0.0, 100.0);
        state.variance = cfg.r_measurement_noise;
        state.drift_since = None;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SensorSnapshot;
    use chrono::TimeZone;

    fn ts(offset_secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + offset_secs, 0).unwrap()
    }

    fn truck() -> TruckConfig {
        TruckConfig::new("T-1", 1001, 200.0, "skylord", None)
    }

    fn snapshot(offset_secs: i64, fuel_pct: f64, speed: Option<f64>) -> SensorSnapshot {
        let mut snap = SensorSnapshot::empty("T-1", 1001, ts(offset_secs));
        snap.fuel_level_pct = Some(fuel_pct);
        snap.speed_mph = speed;
        snap
    }

    #[test]
    fn gap_aware_refuel_emits_exactly_one_event() {
        let mut state = EstimatorState::fresh("T-1", 15.0, 4.0);
        let truck = truck();
        let kalman_cfg = KalmanConfig::default();
        let refuel_cfg = RefuelConfig::default();

        let s0 = snapshot(0, 15.0, Some(0.0));
        let out0 = step(&mut state, &s0, &truck, TruckStatus::Parked, &kalman_cfg, &refuel_cfg).unwrap();
        assert!(out0.refuel_event.is_none());

        let s1 = snapshot(1200, 85.0, Some(0.0));
        let out1 = step(&mut state, &s1, &truck, TruckStatus::Parked, &kalman_cfg, &refuel_cfg).unwrap();
        assert!(out1.refuel_event.is_none(), "event only finalizes after the pending window elapses");

        // No further jump for the pending window: the next snapshot (quiet)
        // should finalize the refuel.
        let s2 = snapshot(1200 + refuel_cfg.pending_window_minutes * 60, 84.5, Some(0.0));
        let out2 = step(&mut state, &s2, &truck, TruckStatus::Parked, &kalman_cfg, &refuel_cfg).unwrap();
        let event = out2.refuel_event.expect("refuel should finalize once pending window elapses");
        assert!((event.gallons_added - 140.0).abs() < 1.0);
        assert_eq!(event.classification, RefuelClassification::Full);
        assert_eq!(event.detection_source, RefuelDetectionSource::GapAware);
    }

    #[test]
    fn cooldown_suppresses_second_refuel() {
        let mut state = EstimatorState::fresh("T-1", 20.0, 4.0);
        state.last_refuel_time = Some(ts(0));
        state.pending_refuel = Some(PendingRefuel {
            start_timestamp: ts(1200),
            start_pct: 20.0,
            last_jump_timestamp: ts(1200),
            current_pct: 38.0,
            gap_aware: true,
        });
        let truck = truck();
        let refuel_cfg = RefuelConfig::default();
        let kalman_cfg = KalmanConfig::default();

        // Quiet snapshot 20 minutes after the last jump (inside the 30-min cooldown).
        let finalized = finalize_refuel(
            &mut state,
            &state.pending_refuel.clone().unwrap(),
            ts(1200 + refuel_cfg.pending_window_minutes * 60),
            &truck,
            &refuel_cfg,
            &kalman_cfg,
        );
        assert!(finalized.is_none());
    }

    #[test]
    fn theft_confirmed_drop_reports_immediately() {
        let mut state = EstimatorState::fresh("T-1", 50.0, 4.0);
        state.push_history(50.0, ts(0));
        let cfg = RefuelConfig::default();

        let severity = detect_theft(&mut state, 20.0, ts(1), TruckStatus::Stopped, &cfg);
        assert_eq!(severity, Some(TheftSeverity::Confirmed));
    }

    #[test]
    fn theft_ignored_while_moving() {
        let mut state = EstimatorState::fresh("T-1", 50.0, 4.0);
        state.push_history(50.0, ts(0));
        let cfg = RefuelConfig::default();

        let severity = detect_theft(&mut state, 38.0, ts(1), TruckStatus::Moving, &cfg);
        assert_eq!(severity, None);
        assert!(state.pending_theft.is_none());
    }

    #[test]
    fn theft_suspected_drop_holds_for_recovery_window_then_reports() {
        let mut state = EstimatorState::fresh("T-1", 50.0, 4.0);
        state.push_history(50.0, ts(0));
        let cfg = RefuelConfig::default();

        // First suspected-level drop: held, not yet reported.
        let severity = detect_theft(&mut state, 38.0, ts(0), TruckStatus::Stopped, &cfg);
        assert_eq!(severity, None);
        assert!(state.pending_theft.is_some());

        // Still within the window: stays pending.
        let severity = detect_theft(&mut state, 38.0, ts(300), TruckStatus::Stopped, &cfg);
        assert_eq!(severity, None);

        // Window elapsed without recovery: finalizes as suspected theft.
        let elapsed = cfg.theft_recovery_window_minutes * 60 + 1;
        let severity = detect_theft(&mut state, 38.0, ts(elapsed), TruckStatus::Stopped, &cfg);
        assert_eq!(severity, Some(TheftSeverity::Suspected));
        assert!(state.pending_theft.is_none());
    }

    #[test]
    fn theft_suspected_drop_that_recovers_is_reclassified_as_noise() {
        let mut state = EstimatorState::fresh("T-1", 50.0, 4.0);
        state.push_history(50.0, ts(0));
        let cfg = RefuelConfig::default();

        let severity = detect_theft(&mut state, 38.0, ts(0), TruckStatus::Stopped, &cfg);
        assert_eq!(severity, None);
        assert!(state.pending_theft.is_some());

        // Level recovers before the window elapses: reclassified as noise, never reported.
        let severity = detect_theft(&mut state, 49.0, ts(60), TruckStatus::Stopped, &cfg);
        assert_eq!(severity, None);
        assert!(state.pending_theft.is_none());

        let elapsed = cfg.theft_recovery_window_minutes * 60 + 1;
        let severity = detect_theft(&mut state, 49.0, ts(elapsed), TruckStatus::Stopped, &cfg);
        assert_eq!(severity, None);
    }

    #[test]
    fn ecu_degraded_mode_survives_a_single_valid_reading() {
        let mut state = EstimatorState::fresh("T-1", 50.0, 4.0);
        let cfg = KalmanConfig::default();
        state.ecu_degraded = true;
        state.ecu_degraded_since = Some(ts(0));
        state.last_ecu_total_gal = Some(1000.0);

        // A plausible delta arrives 15 seconds later, well inside the recovery window.
        let mut snap = SensorSnapshot::empty("T-1", 1001, ts(15));
        snap.total_fuel_used_gal = Some(1000.0 + 6.0 * (15.0 / 3600.0));
        let (gph, method) = resolve_consumption(&mut state, &snap, 15.0 / 3600.0, &cfg);

        assert!(state.ecu_degraded, "degraded mode must not clear on a single reading");
        assert_ne!(method, Some(IdleMethod::Ecu));
        assert!(gph.is_some(), "falls back to idle/sensor consumption while still degraded");
    }

    #[test]
    fn ecu_recovers_only_after_recovery_window_elapses() {
        let mut state = EstimatorState::fresh("T-1", 50.0, 4.0);
        let cfg = KalmanConfig::default();
        state.ecu_degraded = true;
        state.ecu_degraded_since = Some(ts(0));
        state.last_ecu_total_gal = Some(1000.0);

        let mut snap = SensorSnapshot::empty("T-1", 1001, ts(cfg.ecu_degraded_recovery_secs + 1));
        snap.total_fuel_used_gal = Some(1006.0);
        let (gph, method) = resolve_consumption(&mut state, &snap, 1.0, &cfg);

        assert!(!state.ecu_degraded, "recovery window elapsed, degraded mode should clear");
        assert_eq!(method, Some(IdleMethod::Ecu));
        assert_eq!(gph, Some(6.0));
    }

    #[test]
    fn non_monotonic_snapshot_rejected() {
        let mut state = EstimatorState::fresh("T-1", 50.0, 4.0);
        let truck = truck();
        let kalman_cfg = KalmanConfig::default();
        let refuel_cfg = RefuelConfig::default();
        let s0 = snapshot(100, 50.0, Some(0.0));
        step(&mut state, &s0, &truck, TruckStatus::Parked, &kalman_cfg, &refuel_cfg).unwrap();

        let s1 = snapshot(50, 50.0, Some(0.0));
        let result = step(&mut state, &s1, &truck, TruckStatus::Parked, &kalman_cfg, &refuel_cfg);
        assert!(matches!(result, Err(EstimatorError::NonMonotonicSnapshot { .. })));
    }

    #[test]
    fn static_anchor_gates_update_until_hold_duration_met() {
        let mut state = EstimatorState::fresh("T-1", 50.0, 4.0);
        let truck = truck();
        let kalman_cfg = KalmanConfig::default();
        let refuel_cfg = RefuelConfig::default();

        // Truck stationary; sensor disagrees with the mean by a small amount.
        let s0 = snapshot(0, 48.0, Some(0.0));
        step(&mut state, &s0, &truck, TruckStatus::Parked, &kalman_cfg, &refuel_cfg).unwrap();
        assert_eq!(state.mean_pct, 50.0, "anchor hasn't held long enough yet");

        let s1 = snapshot(40, 48.0, Some(0.0));
        step(&mut state, &s1, &truck, TruckStatus::Parked, &kalman_cfg, &refuel_cfg).unwrap();
        assert!(state.mean_pct < 50.0, "anchor now holds, update should pull mean toward sensor");
    }

    #[test]
    fn idle_fallback_used_when_no_ecu_or_sensor_fuel_rate() {
        let mut state = EstimatorState::fresh("T-1", 50.0, 4.0);
        let truck = truck();
        let kalman_cfg = KalmanConfig::default();
        let refuel_cfg = RefuelConfig::default();
        let s0 = snapshot(0, 50.0, Some(0.0));
        let out = step(&mut state, &s0, &truck, TruckStatus::Parked, &kalman_cfg, &refuel_cfg).unwrap();
        assert_eq!(out.idle_method, Some(IdleMethod::Fallback));
    }
}
