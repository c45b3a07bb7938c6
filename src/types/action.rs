//! Action items produced by the adapters and consumed by the Command-Center
//! Aggregator's HTTP responses.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Priority band, derived deterministically from `priority_score` (SPEC_FULL §4.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    None,
    Low,
    Medium,
    High,
    Critical,
}

impl Priority {
    /// Map a `[0, 100]` priority score to its band.
    pub fn from_score(score: f64) -> Self {
        if score >= 85.0 {
            Priority::Critical
        } else if score >= 65.0 {
            Priority::High
        } else if score >= 40.0 {
            Priority::Medium
        } else if score >= 20.0 {
            Priority::Low
        } else {
            Priority::None
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Critical => "CRITICAL",
            Priority::High => "HIGH",
            Priority::Medium => "MEDIUM",
            Priority::Low => "LOW",
            Priority::None => "NONE",
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Confidence in an action item's underlying detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

/// Recommended operator response, selected from `Priority` + `days_to_critical`
/// and subject to the temporal persistence gate (SPEC_FULL §4.4/§4.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionType {
    StopImmediately,
    ScheduleThisWeek,
    ScheduleThisMonth,
    Monitor,
    NoAction,
}

impl ActionType {
    /// Select the base action type before any persistence-gate downgrade.
    pub fn select(priority: Priority, days_to_critical: Option<f64>) -> Self {
        match priority {
            Priority::Critical => {
                if days_to_critical.map(|d| d <= 1.0).unwrap_or(false) {
                    ActionType::StopImmediately
                } else {
                    ActionType::ScheduleThisWeek
                }
            }
            Priority::High => ActionType::ScheduleThisWeek,
            Priority::Medium => ActionType::ScheduleThisMonth,
            Priority::Low => ActionType::Monitor,
            Priority::None => ActionType::NoAction,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ActionType::StopImmediately => "STOP_IMMEDIATELY",
            ActionType::ScheduleThisWeek => "SCHEDULE_THIS_WEEK",
            ActionType::ScheduleThisMonth => "SCHEDULE_THIS_MONTH",
            ActionType::Monitor => "MONITOR",
            ActionType::NoAction => "NO_ACTION",
        }
    }
}

impl std::fmt::Display for ActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which upstream detector produced an action item, used for the dedup
/// source-hierarchy weighting (SPEC_FULL §4.7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionSource {
    RealTimePredictive,
    PredictiveMaintenance,
    MlAnomaly,
    SensorHealth,
    DtcEvents,
    DbAlerts,
    GpsQuality,
    VoltageMonitor,
    IdleAnalysis,
}

impl ActionSource {
    /// Source-hierarchy weight; higher is more trusted.
    pub fn hierarchy_weight(self) -> u32 {
        match self {
            ActionSource::RealTimePredictive => 100,
            ActionSource::PredictiveMaintenance => 90,
            ActionSource::MlAnomaly => 80,
            ActionSource::SensorHealth => 70,
            ActionSource::DtcEvents => 60,
            ActionSource::DbAlerts => 50,
            ActionSource::GpsQuality | ActionSource::VoltageMonitor => 40,
            ActionSource::IdleAnalysis => 30,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            ActionSource::RealTimePredictive => "Real-Time Predictive",
            ActionSource::PredictiveMaintenance => "Predictive Maintenance",
            ActionSource::MlAnomaly => "ML Anomaly",
            ActionSource::SensorHealth => "Sensor Health Monitor",
            ActionSource::DtcEvents => "DTC Events",
            ActionSource::DbAlerts => "DB Alerts",
            ActionSource::GpsQuality => "GPS Quality",
            ActionSource::VoltageMonitor => "Voltage Monitor",
            ActionSource::IdleAnalysis => "Idle Analysis",
        }
    }

    /// Reverse of [`ActionSource::display_name`]; used to recover an item's
    /// source hierarchy weight from the name it was stamped with.
    pub fn from_display_name(name: &str) -> Option<Self> {
        Some(match name {
            "Real-Time Predictive" => ActionSource::RealTimePredictive,
            "Predictive Maintenance" => ActionSource::PredictiveMaintenance,
            "ML Anomaly" => ActionSource::MlAnomaly,
            "Sensor Health Monitor" => ActionSource::SensorHealth,
            "DTC Events" => ActionSource::DtcEvents,
            "DB Alerts" => ActionSource::DbAlerts,
            "GPS Quality" => ActionSource::GpsQuality,
            "Voltage Monitor" => ActionSource::VoltageMonitor,
            "Idle Analysis" => ActionSource::IdleAnalysis,
            _ => return None,
        })
    }
}

/// A single maintenance/anomaly action item.
///
/// Created by an adapter per generation cycle, possibly merged with
/// duplicates during dedup, and consumed directly by the HTTP response. Not
/// persisted as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionItem {
    pub id: Uuid,
    pub truck_id: String,
    pub priority: Priority,
    pub priority_score: f64,
    pub category: String,
    /// Raw component string as reported by the source adapter.
    pub component: String,
    /// Canonicalized component, derived via normalization.
    pub normalized_component: String,
    pub title: String,
    pub description: String,
    pub days_to_critical: Option<f64>,
    /// `"$min - $max"` formatted USD range.
    pub cost_if_ignored: Option<String>,
    pub current_value: Option<f64>,
    pub trend: Option<String>,
    pub threshold: Option<f64>,
    pub confidence: Confidence,
    pub action_type: ActionType,
    pub action_steps: Vec<String>,
    pub icon: Option<String>,
    pub sources: Vec<String>,
}

impl ActionItem {
    /// A freshly-minted action item with a new random identity.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        truck_id: impl Into<String>,
        priority: Priority,
        priority_score: f64,
        category: impl Into<String>,
        component: impl Into<String>,
        normalized_component: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        source: ActionSource,
    ) -> Self {
        let days_to_critical = None;
        Self {
            id: Uuid::new_v4(),
            truck_id: truck_id.into(),
            priority,
            priority_score,
            category: category.into(),
            component: component.into(),
            normalized_component: normalized_component.into(),
            title: title.into(),
            description: description.into(),
            days_to_critical,
            cost_if_ignored: None,
            current_value: None,
            trend: None,
            threshold: None,
            confidence: Confidence::Medium,
            action_type: ActionType::select(priority, None),
            action_steps: Vec::new(),
            icon: None,
            sources: vec![source.display_name().to_string()],
        }
    }

    /// Triple used for dedup grouping (SPEC_FULL §4.7).
    pub fn dedup_key(&self) -> (String, String, String) {
        (
            self.truck_id.clone(),
            self.category.clone(),
            self.normalized_component.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_bands_match_spec_boundaries() {
        assert_eq!(Priority::from_score(85.0), Priority::Critical);
        assert_eq!(Priority::from_score(84.999), Priority::High);
        assert_eq!(Priority::from_score(65.0), Priority::High);
        assert_eq!(Priority::from_score(40.0), Priority::Medium);
        assert_eq!(Priority::from_score(20.0), Priority::Low);
        assert_eq!(Priority::from_score(19.999), Priority::None);
    }

    #[test]
    fn display_name_round_trips_through_from_display_name() {
        for source in [
            ActionSource::RealTimePredictive,
            ActionSource::PredictiveMaintenance,
            ActionSource::MlAnomaly,
            ActionSource::SensorHealth,
            ActionSource::DtcEvents,
            ActionSource::DbAlerts,
            ActionSource::GpsQuality,
            ActionSource::VoltageMonitor,
            ActionSource::IdleAnalysis,
        ] {
            assert_eq!(ActionSource::from_display_name(source.display_name()), Some(source));
        }
        assert_eq!(ActionSource::from_display_name("Unknown"), None);
    }

    #[test]
    fn action_type_stop_immediately_requires_critical_and_imminent() {
        assert_eq!(
            ActionType::select(Priority::Critical, Some(1.0)),
            ActionType::StopImmediately
        );
        assert_eq!(
            ActionType::select(Priority::Critical, Some(2.0)),
            ActionType::ScheduleThisWeek
        );
        assert_eq!(
            ActionType::select(Priority::Critical, None),
            ActionType::ScheduleThisWeek
        );
    }

    #[test]
    fn hierarchy_weights_ordered_per_spec() {
        assert!(
            ActionSource::RealTimePredictive.hierarchy_weight()
                > ActionSource::PredictiveMaintenance.hierarchy_weight()
        );
        assert!(
            ActionSource::PredictiveMaintenance.hierarchy_weight()
                > ActionSource::MlAnomaly.hierarchy_weight()
        );
        assert_eq!(
            ActionSource::GpsQuality.hierarchy_weight(),
            ActionSource::VoltageMonitor.hierarchy_weight()
        );
    }
}
