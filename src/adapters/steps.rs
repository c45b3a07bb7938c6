//! Action-step generation: an external decision table keyed by (normalized
//! component, priority), falling back to a generator that assembles a
//! header step plus component-specific hints (SPEC_FULL §4.6).
//!
//! Grounded on `original_source/fleet_command_center.py`'s
//! `ACTION_DECISION_TABLE`/`_generate_action_steps`.

use crate::types::{ActionType, Priority};

fn decision_table(component: &str, priority: Priority) -> Option<&'static [&'static str]> {
    Some(match (component, priority) {
        ("oil_system", Priority::Critical) => &[
            "Stop the truck safely as soon as possible",
            "Call for emergency service or tow",
            "Do not continue driving — engine damage is imminent",
        ],
        ("oil_system", Priority::High) => &[
            "Schedule service for today or tomorrow morning",
            "Check oil level before every trip",
            "Inspect for visible leaks",
        ],
        ("cooling_system", Priority::Critical) => &[
            "Stop — risk of catastrophic engine damage",
            "Let the engine cool 30 minutes before opening the radiator",
            "Request roadside assistance",
        ],
        ("cooling_system", Priority::High) => &[
            "Urgent service — do not run heavy loads",
            "Check coolant level",
            "Inspect hoses and radiator",
        ],
        ("def_system", Priority::Critical) => &[
            "Fill DEF immediately — derate imminent",
            "Truck will enter reduced-power mode",
            "Locate the nearest DEF station",
        ],
        ("def_system", Priority::High) => &[
            "Fill DEF today — less than 2 days remaining",
            "Schedule an SCR system check",
        ],
        ("transmission", Priority::Critical) => &[
            "Stop — do not force a damaged transmission",
            "Call a specialized tow",
        ],
        ("transmission", Priority::High) => &[
            "Schedule transmission service this week",
            "Avoid heavy loads and steep grades",
            "Check fluid level and color",
        ],
        ("electrical", Priority::Critical) => &[
            "Risk of being stranded — battery critical",
            "Keep jumper cables or service on standby",
            "Test the alternator immediately",
        ],
        ("electrical", Priority::High) => &[
            "Schedule electrical service this week",
            "Test battery with a multimeter",
            "Check connections and terminals",
        ],
        ("turbo_system", Priority::Critical) => &[
            "Stop — risk of catastrophic turbo failure",
            "Turbo fragments can enter the engine",
            "Emergency service required",
        ],
        _ => return None,
    })
}

/// Resolve action steps for a component/priority pair, preferring the fixed
/// decision table and falling back to a generated list when no entry
/// exists.
pub fn action_steps_for(component: &str, priority: Priority, action_type: ActionType) -> Vec<String> {
    if let Some(steps) = decision_table(component, priority) {
        return steps.iter().map(|s| (*s).to_string()).collect();
    }
    generate(component, action_type)
}

fn generate(component: &str, action_type: ActionType) -> Vec<String> {
    let mut steps = Vec::new();
    match action_type {
        ActionType::StopImmediately => {
            steps.push("Stop the truck safely as soon as possible".to_string());
            steps.push("Contact the shop or emergency service".to_string());
        }
        ActionType::ScheduleThisWeek => {
            steps.push("Schedule a shop appointment this week".to_string());
        }
        ActionType::ScheduleThisMonth => {
            steps.push("Include in the next scheduled service".to_string());
        }
        ActionType::Monitor | ActionType::NoAction => {}
    }

    match component {
        "oil_system" => {
            steps.push("Check oil level and quality".to_string());
            steps.push("Inspect the oil filter".to_string());
        }
        "transmission" => {
            steps.push("Check transmission fluid level".to_string());
            steps.push("Inspect the transmission cooler".to_string());
        }
        "cooling_system" => {
            steps.push("Check coolant level".to_string());
            steps.push("Inspect radiator and hoses".to_string());
        }
        "def_system" => {
            steps.push("Fill the DEF tank".to_string());
            steps.push("Check DEF quality".to_string());
        }
        "electrical" => {
            steps.push("Test the battery with a multimeter".to_string());
            steps.push("Check connections and alternator".to_string());
        }
        _ => {}
    }

    steps
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decision_table_entry_preferred_over_generator() {
        let steps = action_steps_for("oil_system", Priority::Critical, ActionType::StopImmediately);
        assert!(steps[0].contains("Stop the truck safely as soon as possible"));
        assert_eq!(steps.len(), 3);
    }

    #[test]
    fn unmatched_component_falls_back_to_generator() {
        let steps = action_steps_for("gps", Priority::Medium, ActionType::ScheduleThisMonth);
        assert_eq!(steps, vec!["Include in the next scheduled service".to_string()]);
    }

    #[test]
    fn no_action_generates_no_header_step() {
        let steps = action_steps_for("gps", Priority::None, ActionType::NoAction);
        assert!(steps.is_empty());
    }
}
