//! Trend-Snapshot Recorder (SPEC_FULL §5): an optional periodic worker that
//! appends fleet-health snapshots to a bounded in-memory ring, backing the
//! `/trends` endpoint. Writes are serialized under a plain `std::sync::Mutex`
//! since each write is a short, non-blocking push-and-truncate.

use crate::aggregator::{AggregatorError, DashboardResponse};
use crate::config::FleetConfig;
use crate::pipeline::{run_generation_cycle, AppState};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{error, info};

/// Bound on the recorder's in-memory ring (SPEC_FULL §5).
const MAX_SNAPSHOTS: usize = 1000;

/// One fleet-wide health reading, captured from a generation cycle's
/// `DashboardResponse`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FleetHealthSnapshot {
    pub timestamp: DateTime<Utc>,
    pub fleet_health_score: u32,
    pub total_trucks: usize,
    pub ok_trucks: u32,
    pub critical_count: u32,
    pub high_count: u32,
    pub medium_count: u32,
    pub low_count: u32,
}

impl FleetHealthSnapshot {
    fn from_dashboard(dashboard: &DashboardResponse) -> Self {
        Self {
            timestamp: dashboard.generated_at,
            fleet_health_score: dashboard.fleet_health.score,
            total_trucks: dashboard.totals.total_trucks,
            ok_trucks: dashboard.totals.ok_trucks,
            critical_count: dashboard.urgency_summary.critical,
            high_count: dashboard.urgency_summary.high,
            medium_count: dashboard.urgency_summary.medium,
            low_count: dashboard.urgency_summary.low,
        }
    }
}

/// Bounded ring of recent [`FleetHealthSnapshot`]s.
pub struct TrendSnapshotRecorder {
    ring: Mutex<VecDeque<FleetHealthSnapshot>>,
}

impl TrendSnapshotRecorder {
    pub fn new() -> Self {
        Self {
            ring: Mutex::new(VecDeque::with_capacity(MAX_SNAPSHOTS)),
        }
    }

    /// Append a snapshot, evicting the oldest entry once the ring is full.
    fn push(&self, snapshot: FleetHealthSnapshot) {
        let mut ring = self.ring.lock().unwrap_or_else(|e| e.into_inner());
        if ring.len() >= MAX_SNAPSHOTS {
            ring.pop_front();
        }
        ring.push_back(snapshot);
    }

    /// Snapshots captured within the last `hours`, oldest first.
    pub fn since(&self, hours: f64) -> Vec<FleetHealthSnapshot> {
        let cutoff = Utc::now() - ChronoDuration::milliseconds((hours * 3_600_000.0) as i64);
        let ring = self.ring.lock().unwrap_or_else(|e| e.into_inner());
        ring.iter().filter(|s| s.timestamp >= cutoff).copied().collect()
    }

    pub fn len(&self) -> usize {
        self.ring.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for TrendSnapshotRecorder {
    fn default() -> Self {
        Self::new()
    }
}

/// Generate a dashboard (reusing the cache if fresh) and record its
/// fleet-health snapshot. Used both by the periodic loop and the
/// on-demand `POST /trends/record` handler.
pub async fn record_now(
    state: &AppState,
    config: &FleetConfig,
    recorder: &TrendSnapshotRecorder,
) -> Result<FleetHealthSnapshot, AggregatorError> {
    let (dashboard, _from_cache) = run_generation_cycle(state, config, false).await?;
    let snapshot = FleetHealthSnapshot::from_dashboard(&dashboard);
    recorder.push(snapshot);
    Ok(snapshot)
}

/// Run the Trend-Snapshot Recorder until the process is shut down.
pub async fn run_trend_snapshot_recorder(
    state: Arc<AppState>,
    config: Arc<FleetConfig>,
    recorder: Arc<TrendSnapshotRecorder>,
    interval_secs: u64,
) {
    let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs));
    loop {
        ticker.tick().await;
        match record_now(&state, &config, &recorder).await {
            Ok(snapshot) => info!(score = snapshot.fleet_health_score, "recorded fleet-health trend snapshot"),
            Err(e) => error!("trend snapshot recording failed: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot_at(hours_ago: f64, score: u32) -> FleetHealthSnapshot {
        FleetHealthSnapshot {
            timestamp: Utc::now() - ChronoDuration::milliseconds((hours_ago * 3_600_000.0) as i64),
            fleet_health_score: score,
            total_trucks: 10,
            ok_trucks: 8,
            critical_count: 1,
            high_count: 1,
            medium_count: 0,
            low_count: 0,
        }
    }

    #[test]
    fn ring_bounded_at_max_snapshots() {
        let recorder = TrendSnapshotRecorder::new();
        for i in 0..(MAX_SNAPSHOTS + 50) {
            recorder.push(snapshot_at(0.0, i as u32));
        }
        assert_eq!(recorder.len(), MAX_SNAPSHOTS);
    }

    #[test]
    fn since_filters_by_age() {
        let recorder = TrendSnapshotRecorder::new();
        recorder.push(snapshot_at(48.0, 90));
        recorder.push(snapshot_at(2.0, 80));
        recorder.push(snapshot_at(0.1, 70));

        let recent = recorder.since(24.0);
        assert_eq!(recent.len(), 2);
        assert!(recent.iter().all(|s| s.fleet_health_score != 90));
    }
}
