//! Per-truck risk score (SPEC_FULL §4.5).
//!
//! Grounded on `original_source/fleet_command_center.py`'s
//! `calculate_truck_risk_score`: issue severity (40%), maintenance age
//! (20%), degrading-trend count (20%), active sensor alerts (20%).

use crate::types::{ActionItem, Priority, RiskLevel, TruckRiskScore};
use chrono::Utc;

/// Everything `calculate_truck_risk_score` needs beyond the truck's own
/// action items.
#[derive(Debug, Clone, Copy, Default)]
pub struct RiskInputs {
    pub days_since_maintenance: Option<f64>,
    pub active_sensor_alert_count: u32,
}

/// Compute one truck's risk score from its already-filtered action items.
///
/// `items` must already be filtered to this truck; the original iterates
/// the whole fleet's list per truck, which this split avoids.
pub fn calculate(truck_id: &str, items: &[ActionItem], inputs: RiskInputs) -> TruckRiskScore {
    let mut score = 0.0;
    let mut factors = Vec::new();

    let mut issue_score = 0.0;
    for item in items {
        match item.priority {
            Priority::Critical => {
                issue_score += 25.0;
                factors.push(format!("Critical: {}", item.component));
            }
            Priority::High => {
                issue_score += 15.0;
                factors.push(format!("High: {}", item.component));
            }
            Priority::Medium => issue_score += 5.0,
            Priority::Low => issue_score += 2.0,
            Priority::None => {}
        }
    }
    score += issue_score.min(40.0);

    if let Some(days) = inputs.days_since_maintenance {
        if days > 90.0 {
            score += 20.0;
            factors.push(format!("Overdue PM: {days:.0} days"));
        } else if days > 60.0 {
            score += 12.0;
            factors.push(format!("PM due soon: {days:.0} days"));
        } else if days > 30.0 {
            score += 5.0;
        }
    }

    // `ActionItem.trend` is written as `format!("{:?}", TrendDirection)` by the
    // adapters, so the only degrading value it ever takes is the literal "Up".
    let degrading_count = items.iter().filter(|i| i.trend.as_deref() == Some("Up")).count();
    if degrading_count > 0 {
        score += (degrading_count as f64 * 7.0).min(20.0);
        factors.push(format!("Degrading trends: {degrading_count}"));
    }

    if inputs.active_sensor_alert_count > 0 {
        score += (f64::from(inputs.active_sensor_alert_count) * 5.0).min(20.0);
        factors.push(format!(
            "Active sensor alerts: {}",
            inputs.active_sensor_alert_count
        ));
    }

    let score = score.clamp(0.0, 100.0);
    factors.truncate(5);

    let predicted_failure_days = items
        .iter()
        .filter_map(|i| i.days_to_critical)
        .fold(None, |acc: Option<f64>, d| Some(acc.map_or(d, |min: f64| min.min(d))));

    TruckRiskScore {
        truck_id: truck_id.to_string(),
        risk_score: score,
        risk_level: RiskLevel::from_score(score),
        contributing_factors: factors,
        days_since_maintenance: inputs.days_since_maintenance,
        active_issue_count: items.len() as u32,
        predicted_failure_days,
        computed_at: Utc::now(),
    }
}

/// Sort `scores` descending by `risk_score` and keep the top `n`.
pub fn top_n(mut scores: Vec<TruckRiskScore>, n: usize) -> Vec<TruckRiskScore> {
    scores.sort_by(|a, b| b.risk_score.total_cmp(&a.risk_score));
    scores.truncate(n);
    scores
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ActionSource;

    fn item(priority: Priority, component: &str) -> ActionItem {
        ActionItem::new(
            "T-1",
            priority,
            0.0,
            "mechanical",
            component,
            component,
            "title",
            "desc",
            ActionSource::PredictiveMaintenance,
        )
    }

    #[test]
    fn issue_severity_caps_at_forty() {
        let items = vec![
            item(Priority::Critical, "oil_system"),
            item(Priority::Critical, "cooling_system"),
        ];
        let result = calculate("T-1", &items, RiskInputs::default());
        assert_eq!(result.risk_score, 40.0);
    }

    #[test]
    fn overdue_maintenance_adds_twenty() {
        let inputs = RiskInputs {
            days_since_maintenance: Some(95.0),
            ..Default::default()
        };
        let result = calculate("T-1", &[], inputs);
        assert_eq!(result.risk_score, 20.0);
        assert_eq!(result.risk_level, RiskLevel::Medium);
    }

    #[test]
    fn sensor_alerts_cap_at_twenty() {
        let inputs = RiskInputs {
            active_sensor_alert_count: 10,
            ..Default::default()
        };
        let result = calculate("T-1", &[], inputs);
        assert_eq!(result.risk_score, 20.0);
    }

    #[test]
    fn degrading_trend_items_add_to_score() {
        let mut up = item(Priority::None, "oil_system");
        up.trend = Some("Up".to_string());
        let mut down = item(Priority::None, "cooling_system");
        down.trend = Some("Down".to_string());

        let result = calculate("T-1", &[up, down], RiskInputs::default());
        assert_eq!(result.risk_score, 7.0);
        assert!(result.contributing_factors.iter().any(|f| f.contains("Degrading trends: 1")));
    }

    #[test]
    fn top_n_sorts_descending_and_truncates() {
        let a = calculate("A", &[item(Priority::Critical, "x")], RiskInputs::default());
        let b = calculate("B", &[], RiskInputs::default());
        let sorted = top_n(vec![b, a], 1);
        assert_eq!(sorted.len(), 1);
        assert_eq!(sorted[0].truck_id, "A");
    }
}
