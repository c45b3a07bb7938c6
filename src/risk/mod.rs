//! Risk & Correlation Engine: per-truck risk scoring, fixed
//! failure-correlation catalog, J1939 SPN normalization, and DEF depletion
//! prediction (SPEC_FULL §4.5).

pub mod correlation;
pub mod def_prediction;
pub mod score;
pub mod spn;

pub use correlation::detect as detect_correlations;
pub use def_prediction::{alert_for as def_alert_for, predict as predict_def_depletion, DefAlert};
pub use score::{calculate as calculate_risk_score, top_n as top_risk_trucks, RiskInputs};
pub use spn::{component_for as spn_component, lookup as spn_lookup};
