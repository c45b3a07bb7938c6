//! Fleet-wide insight generation (SPEC_FULL §4.8 step 7).
//!
//! Grounded on `original_source/fleet_command_center.py`'s
//! `_generate_insights`.

use crate::types::{ActionItem, Priority};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightSeverity {
    Info,
    Warning,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub severity: InsightSeverity,
    pub message: String,
}

fn insight(severity: InsightSeverity, message: impl Into<String>) -> Insight {
    Insight { severity, message: message.into() }
}

/// Generate fleet-wide insights from the already-deduplicated action list.
pub fn generate(total_trucks: usize, items: &[ActionItem]) -> Vec<Insight> {
    let mut insights = Vec::new();

    let critical_trucks: Vec<&str> = {
        let mut set: Vec<&str> =
            items.iter().filter(|i| i.priority == Priority::Critical).map(|i| i.truck_id.as_str()).collect();
        set.sort_unstable();
        set.dedup();
        set
    };
    match critical_trucks.len() {
        0 => {}
        1 => insights.push(insight(
            InsightSeverity::Critical,
            format!("Truck {} has a CRITICAL issue requiring immediate attention", critical_trucks[0]),
        )),
        n => insights.push(insight(InsightSeverity::Critical, format!("{n} trucks have CRITICAL issues requiring immediate attention"))),
    }

    let min_fleet_pattern_count = (total_trucks as f64 * 0.15).ceil().max(2.0) as usize;
    let mut trucks_by_component: HashMap<&str, Vec<&str>> = HashMap::new();
    for item in items {
        trucks_by_component.entry(item.normalized_component.as_str()).or_default().push(item.truck_id.as_str());
    }
    for (component, trucks) in &trucks_by_component {
        let mut unique: Vec<&str> = trucks.clone();
        unique.sort_unstable();
        unique.dedup();
        if unique.len() >= min_fleet_pattern_count {
            insights.push(insight(
                InsightSeverity::Warning,
                format!("Fleet-wide pattern: {} trucks show {component} issues", unique.len()),
            ));
        }
    }

    let escalating: Vec<&str> = items
        .iter()
        .filter(|i| i.priority == Priority::High && i.days_to_critical.is_some_and(|d| d <= 3.0))
        .map(|i| i.truck_id.as_str())
        .collect();
    if !escalating.is_empty() {
        insights.push(insight(
            InsightSeverity::Warning,
            format!("{} HIGH-priority issues are projected to become critical within 3 days", escalating.len()),
        ));
    }

    let transmission_count = items.iter().filter(|i| i.normalized_component == "transmission").count();
    if transmission_count >= min_fleet_pattern_count.min(3) && transmission_count > 0 {
        insights.push(insight(InsightSeverity::Warning, format!("{transmission_count} trucks flagged for transmission issues")));
    }

    let def_critical = items.iter().filter(|i| i.normalized_component == "def_system" && i.priority >= Priority::High).count();
    if def_critical >= 2 {
        insights.push(insight(InsightSeverity::Warning, format!("{def_critical} trucks at risk of DEF-related derate")));
    }

    if !items.iter().any(|i| matches!(i.priority, Priority::Critical | Priority::High)) {
        insights.push(insight(InsightSeverity::Info, "No critical or high-priority issues across the fleet"));
    }

    insights
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ActionSource;

    fn item(truck: &str, priority: Priority, component: &str) -> ActionItem {
        ActionItem::new(truck, priority, 0.0, "mechanical", component, component, "t", "d", ActionSource::SensorHealth)
    }

    #[test]
    fn empty_list_yields_affirmative_insight() {
        let insights = generate(10, &[]);
        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].severity, InsightSeverity::Info);
    }

    #[test]
    fn single_critical_truck_named_directly() {
        let items = vec![item("T-1", Priority::Critical, "oil_system")];
        let insights = generate(10, &items);
        assert!(insights[0].message.contains("T-1"));
    }

    #[test]
    fn fleet_wide_pattern_flagged_when_threshold_cleared() {
        let items: Vec<ActionItem> = (0..5).map(|i| item(&format!("T-{i}"), Priority::Medium, "cooling_system")).collect();
        let insights = generate(10, &items);
        assert!(insights.iter().any(|i| i.message.contains("Fleet-wide pattern")));
    }
}
