//! Per-truck risk scoring (SPEC_FULL §4.5).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Risk band derived from `risk_score` per SPEC_FULL §3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Critical,
    High,
    Medium,
    Low,
    Healthy,
}

impl RiskLevel {
    /// Map a clamped `[0, 100]` risk score to its band.
    pub fn from_score(score: f64) -> Self {
        if score >= 75.0 {
            RiskLevel::Critical
        } else if score >= 50.0 {
            RiskLevel::High
        } else if score >= 30.0 {
            RiskLevel::Medium
        } else if score >= 10.0 {
            RiskLevel::Low
        } else {
            RiskLevel::Healthy
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RiskLevel::Critical => "critical",
            RiskLevel::High => "high",
            RiskLevel::Medium => "medium",
            RiskLevel::Low => "low",
            RiskLevel::Healthy => "healthy",
        }
    }
}

/// A truck's computed risk score, with up to 5 contributing factors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TruckRiskScore {
    pub truck_id: String,
    /// Clamped to `[0, 100]`.
    pub risk_score: f64,
    pub risk_level: RiskLevel,
    /// Up to 5 short human-readable factors, highest contribution first.
    pub contributing_factors: Vec<String>,
    pub days_since_maintenance: Option<f64>,
    pub active_issue_count: u32,
    pub predicted_failure_days: Option<f64>,
    pub computed_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn risk_level_boundaries() {
        assert_eq!(RiskLevel::from_score(75.0), RiskLevel::Critical);
        assert_eq!(RiskLevel::from_score(74.999), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(50.0), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(30.0), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(10.0), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(9.999), RiskLevel::Healthy);
    }
}
