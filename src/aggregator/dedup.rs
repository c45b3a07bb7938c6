//! Deduplication & Priority Scorer (SPEC_FULL §4.7).
//!
//! Grounded on `original_source/fleet_command_center.py`'s
//! `_deduplicate_actions`: group by `(truck_id, category,
//! normalized_component)`, keep the highest-scoring member as primary, and
//! merge the rest's sources/urgency/steps/description into it.

use crate::types::{ActionItem, ActionSource};
use std::collections::HashMap;

const MAX_MERGED_STEPS: usize = 10;
const MAX_NAMED_SOURCES_IN_HINT: usize = 3;

/// Merge duplicate action items sharing a `(truck_id, category,
/// normalized_component)` key, keeping group insertion order stable.
///
/// Idempotent: running this twice on an already-deduplicated list is a no-op,
/// since every group then has exactly one member.
pub fn dedup(items: Vec<ActionItem>) -> Vec<ActionItem> {
    let mut order: Vec<(String, String, String)> = Vec::new();
    let mut groups: HashMap<(String, String, String), Vec<ActionItem>> = HashMap::new();

    for item in items {
        let key = item.dedup_key();
        if !groups.contains_key(&key) {
            order.push(key.clone());
        }
        groups.entry(key).or_default().push(item);
    }

    order.into_iter().map(|key| merge_group(groups.remove(&key).unwrap_or_default())).collect()
}

fn merge_group(mut group: Vec<ActionItem>) -> ActionItem {
    group.sort_by(|a, b| b.priority_score.total_cmp(&a.priority_score));
    let mut primary = group.remove(0);
    if group.is_empty() {
        return primary;
    }

    let mut sources = primary.sources.clone();
    let mut steps = primary.action_steps.clone();
    let mut best_weight = source_weight(&primary.sources);
    let mut min_days = primary.days_to_critical;
    let mut contributor_names: Vec<String> = Vec::new();

    for member in &group {
        for source in &member.sources {
            if !sources.contains(source) {
                sources.push(source.clone());
            }
            if !contributor_names.contains(source) {
                contributor_names.push(source.clone());
            }
        }
        for step in &member.action_steps {
            if steps.len() >= MAX_MERGED_STEPS {
                break;
            }
            if !steps.contains(step) {
                steps.push(step.clone());
            }
        }

        min_days = match (min_days, member.days_to_critical) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (None, Some(b)) => Some(b),
            (a, None) => a,
        };

        let member_weight = source_weight(&member.sources);
        if member_weight > best_weight {
            if member.current_value.is_some() {
                primary.current_value = member.current_value;
            }
            if member.trend.is_some() {
                primary.trend = member.trend.clone();
            }
            if member.threshold.is_some() {
                primary.threshold = member.threshold;
            }
            best_weight = member_weight;
        }
    }

    steps.truncate(MAX_MERGED_STEPS);
    primary.sources = sources;
    primary.action_steps = steps;
    primary.days_to_critical = min_days;

    if !contributor_names.is_empty() {
        let mut names = contributor_names;
        names.truncate(MAX_NAMED_SOURCES_IN_HINT);
        primary.description = format!("{} (confirmed by: {})", primary.description, names.join(", "));
    }

    primary
}

fn source_weight(sources: &[String]) -> u32 {
    sources
        .iter()
        .filter_map(|name| ActionSource::from_display_name(name))
        .map(ActionSource::hierarchy_weight)
        .max()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Confidence, Priority};

    fn item(truck: &str, category: &str, component: &str, score: f64, source: ActionSource, days: Option<f64>) -> ActionItem {
        let mut i = ActionItem::new(
            truck,
            Priority::from_score(score),
            score,
            category,
            component,
            component,
            "title",
            "desc",
            source,
        );
        i.days_to_critical = days;
        i.confidence = Confidence::High;
        i
    }

    #[test]
    fn distinct_keys_pass_through_unmerged() {
        let items = vec![
            item("T-1", "mechanical", "oil_system", 50.0, ActionSource::SensorHealth, None),
            item("T-1", "mechanical", "cooling_system", 50.0, ActionSource::SensorHealth, None),
        ];
        assert_eq!(dedup(items).len(), 2);
    }

    #[test]
    fn same_key_merges_sources_and_takes_min_days_to_critical() {
        let items = vec![
            item("T-1", "mechanical", "oil_system", 70.0, ActionSource::RealTimePredictive, Some(5.0)),
            item("T-1", "mechanical", "oil_system", 60.0, ActionSource::SensorHealth, Some(2.0)),
        ];
        let merged = dedup(items);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].sources.len(), 2);
        assert_eq!(merged[0].days_to_critical, Some(2.0));
    }

    #[test]
    fn dedup_is_idempotent() {
        let items = vec![
            item("T-1", "mechanical", "oil_system", 70.0, ActionSource::RealTimePredictive, Some(5.0)),
            item("T-1", "mechanical", "oil_system", 60.0, ActionSource::SensorHealth, Some(2.0)),
        ];
        let once = dedup(items);
        let twice = dedup(once.clone());
        assert_eq!(once.len(), twice.len());
    }

    #[test]
    fn higher_hierarchy_member_wins_current_value() {
        let mut low = item("T-1", "mechanical", "oil_system", 50.0, ActionSource::SensorHealth, None);
        low.current_value = Some(11.0);
        let mut high = item("T-1", "mechanical", "oil_system", 40.0, ActionSource::RealTimePredictive, None);
        high.current_value = Some(99.0);
        let merged = dedup(vec![low, high]);
        assert_eq!(merged[0].current_value, Some(99.0));
    }
}
