//! DTC Events adapter: parses J1939-style diagnostic trouble codes off the
//! latest snapshot and normalizes them to a component via the SPN table
//! (SPEC_FULL §4.5/§4.6).

use super::{action_steps_for, normalize_component, priority_score, select_action_type, ActionSourceAdapter, AdapterContext, AdapterError};
use crate::risk::spn_lookup;
use crate::types::{ActionItem, ActionSource, Confidence};
use async_trait::async_trait;

pub struct DtcEventsAdapter;

#[async_trait]
impl ActionSourceAdapter for DtcEventsAdapter {
    fn name(&self) -> &'static str {
        "DTC Events"
    }

    async fn generate(&self, ctx: &AdapterContext<'_>) -> Result<Vec<ActionItem>, AdapterError> {
        let mut items = Vec::new();
        let weights = &ctx.config.priority_weights;

        for truck in ctx.trucks {
            let Some(snapshot) = ctx.latest_snapshots.get(&truck.truck_id) else {
                continue;
            };
            let Some(codes) = snapshot.dtc_codes.as_deref() else {
                continue;
            };

            for code in parse_codes(codes) {
                let entry = spn_lookup(code.spn);
                let component = entry.map_or_else(|| "dtc".to_string(), |e| normalize_component(e.component));
                let human_name = entry.map_or("Unknown SPN", |e| e.human_name);

                let (priority, priority_score_value) = priority_score(
                    super::PriorityInputs {
                        anomaly_score: Some(0.7),
                        component: Some(component.as_str()),
                        ..Default::default()
                    },
                    weights,
                );
                let action_type = select_action_type(priority, None);
                let mut item = ActionItem::new(
                    truck.truck_id.as_str(),
                    priority,
                    priority_score_value,
                    "diagnostic",
                    format!("SPN {}.{}", code.spn, code.fmi),
                    component.clone(),
                    format!("Active DTC: {human_name}"),
                    format!("Fault code SPN {} FMI {} reported.", code.spn, code.fmi),
                    ActionSource::DtcEvents,
                );
                item.confidence = Confidence::High;
                item.action_type = action_type;
                item.action_steps = action_steps_for(&component, priority, action_type);
                items.push(item);
            }
        }

        Ok(items)
    }
}

struct DtcCode {
    spn: u32,
    fmi: u32,
}

/// Parse a `"spn.fmi,spn.fmi"`-formatted DTC string. Malformed entries are
/// skipped rather than failing the whole batch.
fn parse_codes(raw: &str) -> Vec<DtcCode> {
    raw.split(',')
        .filter_map(|entry| {
            let entry = entry.trim();
            let (spn_str, fmi_str) = entry.split_once('.')?;
            let spn = spn_str.trim().parse().ok()?;
            let fmi = fmi_str.trim().parse().ok()?;
            Some(DtcCode { spn, fmi })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FleetConfig;
    use crate::trend::SensorBuffer;
    use crate::types::{SensorSnapshot, TruckConfig};
    use chrono::Utc;
    use std::collections::HashMap;

    #[test]
    fn parses_multiple_comma_separated_codes() {
        let codes = parse_codes("110.3, 190.1");
        assert_eq!(codes.len(), 2);
        assert_eq!(codes[0].spn, 110);
        assert_eq!(codes[1].fmi, 1);
    }

    #[test]
    fn malformed_entry_is_skipped() {
        let codes = parse_codes("not-a-code, 190.1");
        assert_eq!(codes.len(), 1);
    }

    #[tokio::test]
    async fn active_code_produces_item_with_normalized_component() {
        let truck = TruckConfig::new("T-1", 1, 200.0, "carrier", None);
        let mut snap = SensorSnapshot::empty("T-1", 1, Utc::now());
        snap.dtc_codes = Some("110.3".to_string());
        let mut snapshots = HashMap::new();
        snapshots.insert("T-1".to_string(), snap);
        let config = FleetConfig::default();
        let ctx = AdapterContext {
            trucks: std::slice::from_ref(&truck),
            latest_snapshots: &snapshots,
            risk_scores: &HashMap::new(),
            trend: &SensorBuffer::new(config.sensor_ranges.clone(), config.persistence_gates.clone()),
            persistence: &config.persistence_gates,
            config: &config,
        };
        let items = DtcEventsAdapter.generate(&ctx).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].normalized_component, "cooling_system");
    }
}
