//! The long-lived background workers: the Telemetry Loop, which polls the
//! upstream sensor table and drives classification/estimation/trend
//! ingestion once per cycle, and the State Persistence Loop, which flushes
//! trend state without blocking it (SPEC_FULL §5).

mod coordinator;
mod state;

pub use coordinator::{refresh_risk_scores, run_generation_cycle, run_state_persistence_loop, run_telemetry_loop};
pub use state::AppState;
