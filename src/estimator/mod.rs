//! Fuel Estimator: the per-truck Kalman core, ECU/sensor consumption
//! arbitration, refuel/theft detection, and drift-triggered resync
//! (SPEC_FULL §4.2).
//!
//! [`kalman`] holds the bare predict/update recursion; [`engine`] wires it
//! to a live [`crate::types::EstimatorState`] across a stream of
//! [`crate::types::SensorSnapshot`]s.

pub mod engine;
pub mod kalman;

pub use engine::{step, EstimatorError, StepOutcome};
