//! Fleet-wide health score and urgency summary (SPEC_FULL §4.8).
//!
//! Grounded on `original_source/fleet_command_center.py`'s
//! `_calculate_fleet_health`.

use crate::types::{ActionItem, Priority};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrgencySummary {
    pub critical: u32,
    pub high: u32,
    pub medium: u32,
    pub low: u32,
    pub none: u32,
    pub total_issues: u32,
}

pub fn urgency_summary(items: &[ActionItem]) -> UrgencySummary {
    let mut summary = UrgencySummary::default();
    for item in items {
        match item.priority {
            Priority::Critical => summary.critical += 1,
            Priority::High => summary.high += 1,
            Priority::Medium => summary.medium += 1,
            Priority::Low => summary.low += 1,
            Priority::None => summary.none += 1,
        }
    }
    summary.total_issues = items.len() as u32;
    summary
}

/// Trucks with zero action items at all, i.e. `total_trucks −
/// |trucks_with_any_issue|`, floored at zero.
pub fn ok_trucks(total_trucks: usize, items: &[ActionItem]) -> u32 {
    let with_issues: HashSet<&str> = items.iter().map(|i| i.truck_id.as_str()).collect();
    (total_trucks.saturating_sub(with_issues.len())) as u32
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Excellent,
    Good,
    Attention,
    Warning,
    Critical,
}

impl HealthStatus {
    pub fn from_score(score: u32) -> Self {
        if score >= 90 {
            HealthStatus::Excellent
        } else if score >= 75 {
            HealthStatus::Good
        } else if score >= 60 {
            HealthStatus::Attention
        } else if score >= 40 {
            HealthStatus::Warning
        } else {
            HealthStatus::Critical
        }
    }
}

/// Compute the fleet health score in `[0, 100]`. `total_trucks` must be > 0.
pub fn fleet_health_score(total_trucks: usize, items: &[ActionItem]) -> u32 {
    if total_trucks == 0 {
        return 100;
    }
    let total_trucks = total_trucks as f64;
    let summary = urgency_summary(items);

    let mut score = 100.0;
    score -= 3.0
        * (15.0 * f64::from(summary.critical) + 8.0 * f64::from(summary.high) + 3.0 * f64::from(summary.medium) + f64::from(summary.low))
        / total_trucks;

    let with_issues: HashSet<&str> = items.iter().map(|i| i.truck_id.as_str()).collect();
    let pct_with_issues = with_issues.len() as f64 / total_trucks * 100.0;
    if pct_with_issues > 20.0 {
        score -= (pct_with_issues - 20.0) * 0.4;
    }

    let critical_trucks: HashSet<&str> =
        items.iter().filter(|i| i.priority == Priority::Critical).map(|i| i.truck_id.as_str()).collect();
    if critical_trucks.len() > 1 {
        score -= (4.0 * critical_trucks.len() as f64).min(20.0);
    }

    score.clamp(0.0, 100.0).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ActionSource;

    fn item(truck: &str, priority: Priority) -> ActionItem {
        ActionItem::new(truck, priority, 0.0, "mechanical", "oil_press", "oil_system", "t", "d", ActionSource::SensorHealth)
    }

    #[test]
    fn no_issues_yields_perfect_score() {
        assert_eq!(fleet_health_score(10, &[]), 100);
    }

    #[test]
    fn multiple_critical_trucks_apply_extra_penalty() {
        let items = vec![item("A", Priority::Critical), item("B", Priority::Critical), item("C", Priority::Critical)];
        let score = fleet_health_score(10, &items);
        assert!(score < 100);
    }

    #[test]
    fn ok_trucks_excludes_any_truck_with_an_issue() {
        let items = vec![item("A", Priority::Low)];
        assert_eq!(ok_trucks(5, &items), 4);
    }

    #[test]
    fn status_bands_match_spec() {
        assert_eq!(HealthStatus::from_score(90), HealthStatus::Excellent);
        assert_eq!(HealthStatus::from_score(75), HealthStatus::Good);
        assert_eq!(HealthStatus::from_score(60), HealthStatus::Attention);
        assert_eq!(HealthStatus::from_score(40), HealthStatus::Warning);
        assert_eq!(HealthStatus::from_score(39), HealthStatus::Critical);
    }
}
