//! Fleet Analytics Core: fuel-telemetry ingestion, per-truck Kalman fuel
//! estimation, and a predictive-maintenance command-center aggregator.
//!
//! ## Architecture
//!
//! - **Acquisition**: polls the upstream sensor database into [`types::SensorSnapshot`]s.
//! - **Estimator**: per-truck Kalman filter, refuel/theft detection, drift resync.
//! - **Classifier**: MOVING/STOPPED/PARKED/OFFLINE status rules.
//! - **Trend**: bounded sensor ring, EWMA/CUSUM, temporal persistence gate.
//! - **Risk**: per-truck risk scoring, failure correlations, DEF depletion.
//! - **Adapters**: normalizes six heterogeneous action sources into `ActionItem`s.
//! - **Aggregator**: dedup, priority sort, fleet health, insights, cost projection.
//! - **Storage**: the operational store and embedded fast-state store.
//! - **Pipeline**: the long-lived Telemetry Loop and State Persistence Loop.
//! - **Api**: the axum HTTP surface under `/api/command-center`.

pub mod config;
pub mod types;

pub mod acquisition;
pub mod adapters;
pub mod aggregator;
pub mod api;
pub mod background;
pub mod classifier;
pub mod estimator;
pub mod risk;
pub mod pipeline;
pub mod storage;
pub mod trend;
