//! Priority scoring and action-type selection (SPEC_FULL §4.6).
//!
//! Grounded on `original_source/fleet_command_center.py`'s
//! `_calculate_priority_score`/`_calculate_urgency_from_days`: weighted
//! average over whatever signals are supplied, missing signals dropping out
//! of both numerator and denominator rather than being zero-filled.

use crate::config::PriorityWeights;
use crate::types::{ActionType, Priority};

/// Criticality weight in `[1.0, 3.0]`, keyed by canonical component.
fn criticality_weight(component: &str) -> f64 {
    match component {
        "transmission" | "brake_system" => 3.0,
        "electrical" => 2.8,
        "turbo_system" => 2.5,
        "cooling_system" => 2.3,
        "def_system" => 2.0,
        "fuel_system" => 1.8,
        "dtc" => 1.2,
        "oil_system" => 1.5,
        "engine" => 1.5,
        "efficiency" => 1.0,
        "gps" => 0.8,
        _ => 1.0,
    }
}

/// Average repair cost in USD, keyed by canonical component; used to derive
/// the cost factor when no explicit estimate is available.
fn average_cost_usd(component: &str) -> f64 {
    match component {
        "transmission" => 11_500.0,
        "brake_system" => 3_500.0,
        "electrical" => 2_750.0,
        "turbo_system" => 4_750.0,
        "cooling_system" => 3_500.0,
        "def_system" => 2_750.0,
        "fuel_system" => 1_650.0,
        "dtc" => 1_050.0,
        "oil_system" => 1_000.0,
        "engine" => 2_000.0,
        "efficiency" => 250.0,
        "gps" => 300.0,
        _ => 1_000.0,
    }
}

/// The signals a priority score may be computed from; any subset may be
/// `None` and will drop out of the weighted average.
#[derive(Debug, Clone, Copy, Default)]
pub struct PriorityInputs<'a> {
    pub days_to_critical: Option<f64>,
    /// Either `[0,1]` or `[0,100]` scale; normalized internally.
    pub anomaly_score: Option<f64>,
    pub component: Option<&'a str>,
    pub cost_estimate_usd: Option<f64>,
}

fn urgency_from_days(days: f64, cfg: &PriorityWeights) -> f64 {
    if days <= 0.0 {
        return 100.0;
    }
    let score = 100.0 * (-cfg.days_urgency_decay_rate * days).exp();
    score.clamp(cfg.days_urgency_floor, 100.0)
}

fn normalize_anomaly(raw: f64) -> f64 {
    if raw <= 1.0 {
        raw * 100.0
    } else {
        raw.min(100.0)
    }
}

/// Compute a weighted priority score in `[0, 100]` and its band.
pub fn score(inputs: PriorityInputs<'_>, cfg: &PriorityWeights) -> (Priority, f64) {
    let mut weighted = 0.0;
    let mut total_weight = 0.0;

    if let Some(days) = inputs.days_to_critical {
        weighted += urgency_from_days(days, cfg) * cfg.days_urgency;
        total_weight += cfg.days_urgency;
    }

    if let Some(raw) = inputs.anomaly_score {
        weighted += normalize_anomaly(raw) * cfg.anomaly;
        total_weight += cfg.anomaly;
    }

    if let Some(component) = inputs.component {
        let criticality_score = (criticality_weight(component) / 3.0) * 100.0;
        weighted += criticality_score * cfg.component_criticality;
        total_weight += cfg.component_criticality;

        let cost = inputs.cost_estimate_usd.unwrap_or_else(|| average_cost_usd(component));
        let cost_score = (cost / cfg.cost_factor_denominator * 100.0).min(100.0);
        weighted += cost_score * cfg.cost_factor;
        total_weight += cfg.cost_factor;
    } else if let Some(cost) = inputs.cost_estimate_usd {
        let cost_score = (cost / cfg.cost_factor_denominator * 100.0).min(100.0);
        weighted += cost_score * cfg.cost_factor;
        total_weight += cfg.cost_factor;
    }

    let score = if total_weight > 0.0 {
        weighted / total_weight
    } else {
        50.0
    }
    .clamp(0.0, 100.0);

    (Priority::from_score(score), (score * 10.0).round() / 10.0)
}

/// Select the recommended operator response for a priority/urgency pair,
/// before any temporal-persistence-gate downgrade (SPEC_FULL §4.4/§4.6).
pub fn select_action_type(priority: Priority, days_to_critical: Option<f64>) -> ActionType {
    ActionType::select(priority, days_to_critical)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_days_scores_maximum_urgency() {
        let inputs = PriorityInputs {
            days_to_critical: Some(0.0),
            ..Default::default()
        };
        let (priority, value) = score(inputs, &PriorityWeights::default());
        assert_eq!(priority, Priority::Critical);
        assert_eq!(value, 100.0);
    }

    #[test]
    fn no_signals_defaults_to_middle_score() {
        let (priority, value) = score(PriorityInputs::default(), &PriorityWeights::default());
        assert_eq!(value, 50.0);
        assert_eq!(priority, Priority::Medium);
    }

    #[test]
    fn transmission_component_outweighs_efficiency_at_same_days() {
        let cfg = PriorityWeights::default();
        let trans = score(
            PriorityInputs { days_to_critical: Some(10.0), component: Some("transmission"), ..Default::default() },
            &cfg,
        );
        let eff = score(
            PriorityInputs { days_to_critical: Some(10.0), component: Some("efficiency"), ..Default::default() },
            &cfg,
        );
        assert!(trans.1 > eff.1);
    }

    #[test]
    fn anomaly_score_on_unit_scale_is_normalized() {
        let cfg = PriorityWeights::default();
        let unit_scale = score(PriorityInputs { anomaly_score: Some(0.9), ..Default::default() }, &cfg);
        let pct_scale = score(PriorityInputs { anomaly_score: Some(90.0), ..Default::default() }, &cfg);
        assert_eq!(unit_scale.1, pct_scale.1);
    }
}
