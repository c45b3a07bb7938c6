//! Sensor Buffer & Trend Engine: a bounded per-(truck, sensor) ring with
//! range validation, EWMA/CUSUM state, temporal persistence gating, and
//! least-squares trend direction (SPEC_FULL §4.4).
//!
//! The ring, EWMA/CUSUM maps, and persistence-confirmation counters are
//! accessed from multiple workers; [`SensorBuffer`] guards them behind one
//! lock per truck-sensor key, held only for the duration of a single update
//! (SPEC_FULL §5). Readers obtain a cloned [`AlgorithmState`] snapshot.

use crate::config::{PersistenceGateConfig, SensorRangesConfig};
use crate::types::{AlgorithmState, TrendDirection};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::collections::VecDeque;

const RING_SIZE: usize = crate::config::defaults::SENSOR_RING_SIZE;
const EWMA_ALPHA: f64 = crate::config::defaults::EWMA_ALPHA;
const CUSUM_THRESHOLD: f64 = crate::config::defaults::CUSUM_THRESHOLD;
/// Slope epsilon is expressed relative to a sensor's working range; a flat
/// default range width of 100 units keeps the epsilon meaningful when a
/// sensor has no configured range.
const DEFAULT_WORKING_RANGE: f64 = 100.0;
const SLOPE_EPSILON_FRACTION: f64 = 0.01;

/// One retained reading for a (truck, sensor) ring.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorReading {
    pub value: f64,
    pub timestamp: DateTime<Utc>,
}

/// One anomaly the trend engine declared, optionally persisted to
/// `cc_anomaly_history` (SPEC_FULL §4.4/§6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnomalyType {
    Ewma,
    Cusum,
    Threshold,
    Correlation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnomalySeverity {
    Warning,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnomalyRecord {
    pub anomaly_type: AnomalyType,
    pub severity: AnomalySeverity,
    pub sensor_value: f64,
    pub ewma_value: f64,
    pub cusum_value: f64,
    pub threshold: f64,
}

/// Per-(truck, sensor) mutable state: the ring, EWMA/CUSUM, and a rolling
/// count of consecutive confirming readings for the persistence gate.
#[derive(Debug, Clone)]
struct BufferEntry {
    ring: VecDeque<SensorReading>,
    algorithm: AlgorithmState,
    confirmations: Vec<DateTime<Utc>>,
}

/// Bounded per-(truck, sensor) ring buffer plus EWMA/CUSUM trend state.
pub struct SensorBuffer {
    entries: DashMap<(String, String), BufferEntry>,
    ranges: SensorRangesConfig,
    persistence: PersistenceGateConfig,
}

impl SensorBuffer {
    pub fn new(ranges: SensorRangesConfig, persistence: PersistenceGateConfig) -> Self {
        Self {
            entries: DashMap::new(),
            ranges,
            persistence,
        }
    }

    /// Ingest one reading. Returns `None` if the value fails range
    /// validation (dropped silently, ring untouched) or `Some(anomaly)` when
    /// this update crossed the CUSUM threshold.
    pub fn ingest(
        &self,
        truck_id: &str,
        sensor: &str,
        value: f64,
        timestamp: DateTime<Utc>,
    ) -> Option<AnomalyRecord> {
        if !self.ranges.is_valid(sensor, value) {
            tracing::debug!(truck_id, sensor, value, "sensor reading out of range, dropped");
            return None;
        }

        let key = (truck_id.to_string(), sensor.to_string());
        let mut entry = self.entries.entry(key).or_insert_with(|| BufferEntry {
            ring: VecDeque::with_capacity(RING_SIZE),
            algorithm: AlgorithmState::seed(truck_id, sensor, value, timestamp),
            confirmations: Vec::new(),
        });

        if entry.ring.len() >= RING_SIZE {
            entry.ring.pop_front();
        }
        entry.ring.push_back(SensorReading { value, timestamp });

        let alg = &mut entry.algorithm;
        alg.ewma_value = EWMA_ALPHA * value + (1.0 - EWMA_ALPHA) * alg.ewma_value;
        alg.cusum_high = (alg.cusum_high + (value - alg.baseline_mean)).max(0.0);
        alg.cusum_low = (alg.cusum_low + (value - alg.baseline_mean)).min(0.0);
        alg.samples_count += 1;
        alg.updated_at = timestamp;

        let ring_values: Vec<f64> = entry.ring.iter().map(|r| r.value).collect();
        let working_range = self
            .ranges
            .ranges
            .get(sensor)
            .map(|r| r.max - r.min)
            .filter(|w| *w > 0.0)
            .unwrap_or(DEFAULT_WORKING_RANGE);
        let slope = least_squares_slope(&ring_values);
        alg.trend_slope = slope;
        let epsilon = working_range * SLOPE_EPSILON_FRACTION;
        alg.trend_direction = if slope > epsilon {
            TrendDirection::Up
        } else if slope < -epsilon {
            TrendDirection::Down
        } else {
            TrendDirection::Stable
        };

        let cusum_magnitude = alg.cusum_high.max(alg.cusum_low.abs());
        if cusum_magnitude > CUSUM_THRESHOLD {
            Some(AnomalyRecord {
                anomaly_type: AnomalyType::Cusum,
                severity: if cusum_magnitude > CUSUM_THRESHOLD * 2.0 {
                    AnomalySeverity::Critical
                } else {
                    AnomalySeverity::Warning
                },
                sensor_value: value,
                ewma_value: alg.ewma_value,
                cusum_value: cusum_magnitude,
                threshold: CUSUM_THRESHOLD,
            })
        } else {
            None
        }
    }

    /// A read-only snapshot of the current algorithm state, if any readings
    /// have been ingested for this (truck, sensor) pair.
    pub fn snapshot(&self, truck_id: &str, sensor: &str) -> Option<AlgorithmState> {
        self.entries
            .get(&(truck_id.to_string(), sensor.to_string()))
            .map(|e| e.algorithm.clone())
    }

    /// Record a confirming reading toward the temporal persistence gate for
    /// `sensor`, then report whether the confirmation count within the
    /// sensor's window has now been met (SPEC_FULL §4.4).
    pub fn confirm(&self, truck_id: &str, sensor: &str, timestamp: DateTime<Utc>) -> bool {
        let Some(window) = self.persistence.windows.get(sensor) else {
            // No persistence window configured for this sensor: treat every
            // reading as immediately confirming.
            return true;
        };
        let key = (truck_id.to_string(), sensor.to_string());
        let mut entry = self.entries.entry(key).or_insert_with(|| BufferEntry {
            ring: VecDeque::with_capacity(RING_SIZE),
            algorithm: AlgorithmState::seed(truck_id, sensor, 0.0, timestamp),
            confirmations: Vec::new(),
        });

        entry.confirmations.push(timestamp);
        let cutoff = timestamp - chrono::Duration::seconds(window.window_secs);
        entry.confirmations.retain(|t| *t >= cutoff);
        entry.confirmations.len() as u32 >= window.confirmations
    }
}

/// Least-squares slope of `values` against their index (SPEC_FULL §4.4).
/// Grounded on the teacher's `calculate_slope` helper, generalized from a
/// fixed-field extractor closure to a plain `&[f64]`.
fn least_squares_slope(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let n = values.len() as f64;
    let (mut sum_x, mut sum_y, mut sum_xy, mut sum_x2) = (0.0, 0.0, 0.0, 0.0);
    for (i, &y) in values.iter().enumerate() {
        let x = i as f64;
        sum_x += x;
        sum_y += y;
        sum_xy += x * y;
        sum_x2 += x * x;
    }
    let denom = n * sum_x2 - sum_x * sum_x;
    if denom.abs() < f64::EPSILON {
        return 0.0;
    }
    let slope = (n * sum_xy - sum_x * sum_y) / denom;
    if slope.is_finite() {
        slope
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(offset_secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + offset_secs, 0).unwrap()
    }

    #[test]
    fn out_of_range_reading_dropped_without_displacing_ring() {
        let buf = SensorBuffer::new(SensorRangesConfig::default(), PersistenceGateConfig::default());
        buf.ingest("T-1", "oil_press", 50.0, ts(0));
        assert!(buf.ingest("T-1", "oil_press", 5000.0, ts(1)).is_none());
        let snap = buf.snapshot("T-1", "oil_press").unwrap();
        assert_eq!(snap.samples_count, 1);
    }

    #[test]
    fn ring_bounded_at_configured_size() {
        let buf = SensorBuffer::new(SensorRangesConfig::default(), PersistenceGateConfig::default());
        for i in 0..15 {
            buf.ingest("T-1", "rpm", 1000.0 + i as f64, ts(i));
        }
        let entry = buf.entries.get(&("T-1".to_string(), "rpm".to_string())).unwrap();
        assert_eq!(entry.ring.len(), RING_SIZE);
    }

    #[test]
    fn trend_direction_up_on_increasing_ring() {
        let buf = SensorBuffer::new(SensorRangesConfig::default(), PersistenceGateConfig::default());
        for i in 0..10 {
            buf.ingest("T-1", "oil_temp", 100.0 + 10.0 * i as f64, ts(i));
        }
        let snap = buf.snapshot("T-1", "oil_temp").unwrap();
        assert_eq!(snap.trend_direction, TrendDirection::Up);
        assert!(snap.trend_slope > 0.0);
    }

    #[test]
    fn persistence_gate_requires_confirmations_within_window() {
        let buf = SensorBuffer::new(SensorRangesConfig::default(), PersistenceGateConfig::default());
        // oil_press requires 2 confirmations within 60s.
        assert!(!buf.confirm("T-1", "oil_press", ts(0)));
        assert!(buf.confirm("T-1", "oil_press", ts(10)));
    }

    #[test]
    fn persistence_gate_resets_outside_window() {
        let buf = SensorBuffer::new(SensorRangesConfig::default(), PersistenceGateConfig::default());
        assert!(!buf.confirm("T-1", "oil_press", ts(0)));
        // 70s later: the first confirmation has aged out of the 60s window.
        assert!(!buf.confirm("T-1", "oil_press", ts(70)));
    }

    #[test]
    fn least_squares_slope_zero_for_flat_series() {
        assert_eq!(least_squares_slope(&[5.0, 5.0, 5.0, 5.0]), 0.0);
    }
}
