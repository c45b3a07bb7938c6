//! Operational store and fast state store (SPEC_FULL §6, §10.5).
//!
//! - `persistence`: the `PersistenceLayer` trait over the eight MySQL
//!   tables, with an in-memory test backend and a `sqlx`-backed production
//!   backend.
//! - `lockfile`: single-instance process lock guarding the embedded store.
//!
//! This module also owns `FastStateStore`, the optional key-value store
//! abstraction (`REDIS_URL` in SPEC_FULL §6) with an embedded `sled`
//! default so the system needs zero external services to run.

#![allow(dead_code)]

pub mod lockfile;
pub mod persistence;

pub use lockfile::ProcessLock;
pub use persistence::{InMemoryDAL, MySqlPersistence, PersistenceError, PersistenceLayer};

use crate::types::{AlgorithmState, EstimatorState};
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

/// Fast-state-store errors.
#[derive(Debug, thiserror::Error)]
pub enum FastStateError {
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("storage error: {0}")]
    Storage(String),
}

/// Small key-value abstraction for the hot state this crate re-reads every
/// cycle: per-(truck, sensor) algorithm state and per-truck estimator
/// snapshots. The embedded `sled` implementation is the default so the
/// system runs with zero external services; a networked implementation
/// (e.g. against `REDIS_URL`) can be swapped in without touching callers.
#[async_trait]
pub trait FastStateStore: Send + Sync {
    async fn put_algorithm_state(&self, state: &AlgorithmState) -> Result<(), FastStateError>;
    async fn get_algorithm_state(&self, truck_id: &str, sensor_name: &str) -> Result<Option<AlgorithmState>, FastStateError>;
    async fn put_estimator_snapshot(&self, state: &EstimatorState) -> Result<(), FastStateError>;
    async fn get_estimator_snapshot(&self, truck_id: &str) -> Result<Option<EstimatorState>, FastStateError>;
    fn backend_name(&self) -> &'static str;
}

/// Embedded `sled`-backed `FastStateStore`. Keys are namespaced by prefix
/// so both record kinds share one database.
pub struct SledFastStateStore {
    db: Arc<sled::Db>,
}

impl SledFastStateStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, FastStateError> {
        let path_ref = path.as_ref();
        let db = sled::open(path_ref).map_err(|e| FastStateError::Storage(e.to_string()))?;
        tracing::info!(path = %path_ref.display(), "fast state store opened");
        Ok(Self { db: Arc::new(db) })
    }

    fn algorithm_key(truck_id: &str, sensor_name: &str) -> Vec<u8> {
        format!("algo:{truck_id}:{sensor_name}").into_bytes()
    }

    fn estimator_key(truck_id: &str) -> Vec<u8> {
        format!("estimator:{truck_id}").into_bytes()
    }
}

#[async_trait]
impl FastStateStore for SledFastStateStore {
    async fn put_algorithm_state(&self, state: &AlgorithmState) -> Result<(), FastStateError> {
        let key = Self::algorithm_key(&state.truck_id, &state.sensor_name);
        let value = serde_json::to_vec(state).map_err(|e| FastStateError::Serialization(e.to_string()))?;
        self.db.insert(key, value).map_err(|e| FastStateError::Storage(e.to_string()))?;
        self.db.flush_async().await.map_err(|e| FastStateError::Storage(e.to_string()))?;
        Ok(())
    }

    async fn get_algorithm_state(&self, truck_id: &str, sensor_name: &str) -> Result<Option<AlgorithmState>, FastStateError> {
        let key = Self::algorithm_key(truck_id, sensor_name);
        match self.db.get(key).map_err(|e| FastStateError::Storage(e.to_string()))? {
            Some(bytes) => {
                let state = serde_json::from_slice(&bytes).map_err(|e| FastStateError::Serialization(e.to_string()))?;
                Ok(Some(state))
            }
            None => Ok(None),
        }
    }

    async fn put_estimator_snapshot(&self, state: &EstimatorState) -> Result<(), FastStateError> {
        let key = Self::estimator_key(&state.truck_id);
        let value = serde_json::to_vec(state).map_err(|e| FastStateError::Serialization(e.to_string()))?;
        self.db.insert(key, value).map_err(|e| FastStateError::Storage(e.to_string()))?;
        self.db.flush_async().await.map_err(|e| FastStateError::Storage(e.to_string()))?;
        Ok(())
    }

    async fn get_estimator_snapshot(&self, truck_id: &str) -> Result<Option<EstimatorState>, FastStateError> {
        let key = Self::estimator_key(truck_id);
        match self.db.get(key).map_err(|e| FastStateError::Storage(e.to_string()))? {
            Some(bytes) => {
                let state = serde_json::from_slice(&bytes).map_err(|e| FastStateError::Serialization(e.to_string()))?;
                Ok(Some(state))
            }
            None => Ok(None),
        }
    }

    fn backend_name(&self) -> &'static str {
        "sled"
    }
}

/// Reject a loaded estimator snapshot whose `last_timestamp` is too stale
/// to trust (SPEC_FULL §4.2: "reject state whose last_timestamp is older
/// than 2h and start fresh").
pub const ESTIMATOR_STATE_MAX_AGE_HOURS: i64 = 2;

pub fn is_estimator_snapshot_fresh(state: &EstimatorState, now: chrono::DateTime<chrono::Utc>) -> bool {
    match state.last_timestamp {
        Some(ts) => (now - ts) <= chrono::Duration::hours(ESTIMATOR_STATE_MAX_AGE_HOURS),
        None => false,
    }
}
