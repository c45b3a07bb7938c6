//! The 1-state Kalman predict/update recursion at the heart of the Fuel
//! Estimator (SPEC_FULL §4.2). Pure math, no I/O, no truck identity — kept
//! separate from [`super::engine`] so the recursion itself stays trivially
//! testable against hand-computed values.

/// Predict step: decay `mean_pct` by the consumption rate over `dt_hours`,
/// inflate `variance` by the process-noise term `q` scaled to elapsed time.
/// Clamps the mean to `[0, 100]`; never clamps variance beyond the floor
/// applied at update time.
pub fn predict(
    mean_pct: f64,
    variance: f64,
    consumption_gph: f64,
    capacity_gallons: f64,
    dt_hours: f64,
    q: f64,
) -> (f64, f64) {
    let pct_per_hour = if capacity_gallons > 0.0 {
        consumption_gph / capacity_gallons * 100.0
    } else {
        0.0
    };
    let mean = (mean_pct - pct_per_hour * dt_hours.max(0.0)).clamp(0.0, 100.0);
    let variance = variance + q * dt_hours.max(0.0);
    (mean, variance)
}

/// Update step: fold a trusted sensor reading into the estimate via the
/// Kalman gain `K = P/(P+R)`. Only call this while an anchor holds (or for a
/// refuel/drift hard reset, which bypasses the gain entirely).
pub fn update(mean_pct: f64, variance: f64, measured_pct: f64, r: f64, variance_floor: f64) -> (f64, f64) {
    let gain = variance / (variance + r);
    let mean = (mean_pct + gain * (measured_pct - mean_pct)).clamp(0.0, 100.0);
    let variance = ((1.0 - gain) * variance).max(variance_floor);
    (mean, variance)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predict_decays_mean_and_grows_variance() {
        let (mean, variance) = predict(80.0, 1.0, 2.0, 200.0, 1.0, 0.04);
        // 2 gal/h over 200 gal capacity = 1%/h, one hour elapsed.
        assert!((mean - 79.0).abs() < 1e-9);
        assert!((variance - 1.04).abs() < 1e-9);
    }

    #[test]
    fn predict_clamps_mean_to_valid_range() {
        let (mean, _) = predict(0.5, 1.0, 50.0, 200.0, 1.0, 0.04);
        assert_eq!(mean, 0.0);
    }

    #[test]
    fn update_moves_mean_toward_measurement() {
        let (mean, variance) = update(50.0, 1.0, 60.0, 9.0, 0.5);
        // gain = 1/(1+9) = 0.1 -> mean = 50 + 0.1*10 = 51
        assert!((mean - 51.0).abs() < 1e-9);
        assert!(variance < 1.0);
        assert!(variance >= 0.5);
    }

    #[test]
    fn update_variance_never_below_floor() {
        let (_, variance) = update(50.0, 0.01, 80.0, 9.0, 0.5);
        assert_eq!(variance, 0.5);
    }
}
