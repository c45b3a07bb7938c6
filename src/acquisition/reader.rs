//! Telemetry Reader: batched polling of the upstream `sensors` table.
//!
//! Grounded in `original_source/wialon_reader.py` (`ensure_connection`,
//! `get_all_trucks_data`) per SPEC_FULL §4.1: age-based reconnection,
//! ping-before-use, a windowed batched query capped per (unit, parameter),
//! a non-windowed fallback for older MySQL, and a targeted 12h deep query
//! for `fuel_lvl` when it is still missing after the freshness pass.

use crate::acquisition::TankRegistry;
use crate::types::{SensorSnapshot, WHITELISTED_PARAMETERS};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use sqlx::mysql::MySqlPoolOptions;
use sqlx::{MySqlPool, Row};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum AcquisitionError {
    #[error("database connection error: {0}")]
    Connection(String),
    #[error("query error: {0}")]
    Query(String),
}

/// Freshness budget, in seconds, for fuel level vs. every other parameter.
const FUEL_LEVEL_FRESHNESS_SECS: i64 = 4 * 3600;
const DEFAULT_FRESHNESS_SECS: i64 = 15 * 60;
const DEEP_FUEL_LOOKBACK_SECS: i64 = 12 * 3600;
const WINDOWED_ROWS_PER_PARAM: i64 = 20;
const FALLBACK_ROW_CAP: i64 = 5000;

/// Batched periodic reader over the upstream sensor table.
#[async_trait]
pub trait TelemetryReader: Send + Sync {
    /// One poll cycle: return at most one snapshot per known truck with at
    /// least one reading within `max_age_secs`.
    async fn read_all_trucks(
        &mut self,
        registry: &TankRegistry,
        max_age_secs: i64,
    ) -> Result<Vec<SensorSnapshot>, AcquisitionError>;
}

/// Production `TelemetryReader` over a MySQL-compatible upstream.
pub struct MysqlTelemetryReader {
    dsn: String,
    pool: Option<MySqlPool>,
    connection_created_at: Option<Instant>,
    max_connection_age: Duration,
    connect_timeout: Duration,
}

impl MysqlTelemetryReader {
    pub fn new(dsn: impl Into<String>) -> Self {
        Self {
            dsn: dsn.into(),
            pool: None,
            connection_created_at: None,
            max_connection_age: Duration::from_secs(3600),
            connect_timeout: Duration::from_secs(10),
        }
    }

    /// Ensure a live connection: age out connections older than 1h, else
    /// ping-before-use, reconnecting with exponential backoff on failure.
    async fn ensure_connection(&mut self) -> Result<&MySqlPool, AcquisitionError> {
        if let Some(created_at) = self.connection_created_at {
            if created_at.elapsed() > self.max_connection_age {
                info!("telemetry reader connection aged out, reconnecting");
                self.pool = None;
                self.connection_created_at = None;
            }
        }

        if let Some(pool) = &self.pool {
            if sqlx::query("SELECT 1").execute(pool).await.is_ok() {
                return Ok(self.pool.as_ref().unwrap());
            }
            warn!("telemetry reader ping failed, reconnecting");
            self.pool = None;
        }

        self.connect_with_backoff().await?;
        Ok(self.pool.as_ref().expect("connect_with_backoff sets pool on success"))
    }

    async fn connect_with_backoff(&mut self) -> Result<(), AcquisitionError> {
        let mut attempt = 0u32;
        let mut delay = Duration::from_secs(2);
        const MAX_DELAY: Duration = Duration::from_secs(60);
        const MAX_ATTEMPTS: u32 = 5;

        loop {
            attempt += 1;
            let result = MySqlPoolOptions::new()
                .max_connections(5)
                .acquire_timeout(self.connect_timeout)
                .connect(&self.dsn)
                .await;

            match result {
                Ok(pool) => {
                    self.pool = Some(pool);
                    self.connection_created_at = Some(Instant::now());
                    info!(attempt, "telemetry reader connected");
                    return Ok(());
                }
                Err(e) if attempt >= MAX_ATTEMPTS => {
                    return Err(AcquisitionError::Connection(format!(
                        "failed after {attempt} attempts: {e}"
                    )));
                }
                Err(e) => {
                    warn!(attempt, error = %e, "telemetry reader connect failed, retrying");
                    tokio::time::sleep(delay).await;
                    delay = (delay * 2).min(MAX_DELAY);
                }
            }
        }
    }
}

struct Row0 {
    unit: i64,
    param_name: String,
    value: f64,
    epoch_time: i64,
    latitude: Option<f64>,
    longitude: Option<f64>,
}

#[async_trait]
impl TelemetryReader for MysqlTelemetryReader {
    async fn read_all_trucks(
        &mut self,
        registry: &TankRegistry,
        max_age_secs: i64,
    ) -> Result<Vec<SensorSnapshot>, AcquisitionError> {
        let pool = match self.ensure_connection().await {
            Ok(pool) => pool,
            Err(e) => {
                self.pool = None;
                return Err(e);
            }
        };

        let unit_ids: Vec<i64> = registry.unit_ids().collect();
        if unit_ids.is_empty() {
            return Ok(Vec::new());
        }

        let now = Utc::now();
        let cutoff_epoch = now.timestamp() - max_age_secs;

        let rows = match query_windowed(pool, &unit_ids, cutoff_epoch).await {
            Ok(rows) => rows,
            Err(e) => {
                warn!(error = %e, "windowed query failed, falling back to ordered bulk fetch");
                match query_fallback(pool, &unit_ids, cutoff_epoch).await {
                    Ok(rows) => rows,
                    Err(e) => {
                        self.pool = None;
                        return Err(AcquisitionError::Query(e.to_string()));
                    }
                }
            }
        };

        let mut by_unit: HashMap<i64, Vec<Row0>> = HashMap::new();
        for row in rows {
            by_unit.entry(row.unit).or_default().push(row);
        }

        let mut snapshots = Vec::with_capacity(by_unit.len());
        for (unit_id, mut rows) in by_unit {
            let Some(truck) = registry.by_unit_id(unit_id) else {
                continue;
            };
            rows.sort_by(|a, b| b.epoch_time.cmp(&a.epoch_time));
            let latest_epoch = rows[0].epoch_time;
            let latest_ts = epoch_to_utc(latest_epoch);
            let mut snapshot = SensorSnapshot::empty(&truck.truck_id, unit_id, latest_ts);
            snapshot.latitude = rows[0].latitude;
            snapshot.longitude = rows[0].longitude;

            fill_snapshot_fields(&mut snapshot, &rows, latest_epoch);

            if snapshot.fuel_level_pct.is_none() {
                if let Ok(Some(fuel_pct)) = query_deep_fuel(pool, unit_id, now.timestamp()).await {
                    snapshot.fuel_level_pct = Some(fuel_pct);
                }
            }

            snapshots.push(snapshot);
        }

        debug!(trucks = snapshots.len(), "telemetry poll cycle complete");
        Ok(snapshots)
    }
}

fn fill_snapshot_fields(snapshot: &mut SensorSnapshot, rows: &[Row0], latest_epoch: i64) {
    for row in rows {
        let age = latest_epoch - row.epoch_time;
        let budget = if row.param_name == "fuel_lvl" {
            FUEL_LEVEL_FRESHNESS_SECS
        } else {
            DEFAULT_FRESHNESS_SECS
        };
        if age > budget {
            continue;
        }
        assign_param(snapshot, &row.param_name, row.value);
    }
}

fn assign_param(snapshot: &mut SensorSnapshot, param: &str, value: f64) {
    match param {
        "fuel_lvl" => snapshot.fuel_level_pct.get_or_insert(value),
        "speed" => snapshot.speed_mph.get_or_insert(value),
        "rpm" => snapshot.rpm.get_or_insert(value),
        "odom" => snapshot.odometer_miles.get_or_insert(value),
        "fuel_rate" => snapshot.fuel_rate_lph.get_or_insert(value),
        "cool_temp" => snapshot.coolant_temp_f.get_or_insert(value),
        "hdop" => snapshot.hdop.get_or_insert(value),
        "altitude" => snapshot.altitude_ft.get_or_insert(value),
        "engine_hours" => snapshot.engine_hours.get_or_insert(value),
        "pwr_ext" => snapshot.voltage_external.get_or_insert(value),
        "oil_press" => snapshot.oil_pressure_psi.get_or_insert(value),
        "total_fuel_used" => snapshot.total_fuel_used_gal.get_or_insert(value),
        "total_idle_fuel" => snapshot.total_idle_fuel_gal.get_or_insert(value),
        "engine_load" => snapshot.engine_load_pct.get_or_insert(value),
        "oil_temp" => snapshot.oil_temp_f.get_or_insert(value),
        "def_level" => snapshot.def_level_pct.get_or_insert(value),
        "intake_air_temp" => snapshot.intake_air_temp_f.get_or_insert(value),
        "idle_hours" => snapshot.idle_hours.get_or_insert(value),
        "sats" => snapshot.satellites.get_or_insert(value),
        "pwr_int" => snapshot.voltage_internal.get_or_insert(value),
        "course" => snapshot.course.get_or_insert(value),
        // obd_speed, air_temp (ambient), dtc are whitelisted upstream but
        // have no dedicated SensorSnapshot field beyond the ones above;
        // dtc is string-typed and handled separately if ever queried as text.
        _ => return,
    };
}

fn epoch_to_utc(epoch: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(epoch, 0).single().unwrap_or_else(Utc::now)
}

async fn query_windowed(
    pool: &MySqlPool,
    unit_ids: &[i64],
    cutoff_epoch: i64,
) -> Result<Vec<Row0>, sqlx::Error> {
    let unit_placeholders = placeholders(unit_ids.len());
    let param_placeholders = placeholders(WHITELISTED_PARAMETERS.len());
    let sql = format!(
        "SELECT unit, param_name, value, epoch_time, from_latitude, from_longitude FROM ( \
            SELECT unit, p as param_name, value, m as epoch_time, from_latitude, from_longitude, \
                   ROW_NUMBER() OVER (PARTITION BY unit, p ORDER BY m DESC) as rn \
            FROM sensors \
            WHERE unit IN ({unit_placeholders}) AND m >= ? AND p IN ({param_placeholders}) \
        ) ranked WHERE rn <= ? ORDER BY unit, epoch_time DESC"
    );

    let mut query = sqlx::query(&sql);
    for id in unit_ids {
        query = query.bind(id);
    }
    query = query.bind(cutoff_epoch);
    for p in WHITELISTED_PARAMETERS {
        query = query.bind(*p);
    }
    query = query.bind(WINDOWED_ROWS_PER_PARAM);

    let rows = query.fetch_all(pool).await?;
    Ok(rows.iter().map(row_to_row0).collect())
}

async fn query_fallback(
    pool: &MySqlPool,
    unit_ids: &[i64],
    cutoff_epoch: i64,
) -> Result<Vec<Row0>, sqlx::Error> {
    let unit_placeholders = placeholders(unit_ids.len());
    let param_placeholders = placeholders(WHITELISTED_PARAMETERS.len());
    let sql = format!(
        "SELECT unit, p as param_name, value, m as epoch_time, from_latitude, from_longitude \
         FROM sensors WHERE unit IN ({unit_placeholders}) AND m >= ? AND p IN ({param_placeholders}) \
         ORDER BY unit, m DESC LIMIT {FALLBACK_ROW_CAP}"
    );

    let mut query = sqlx::query(&sql);
    for id in unit_ids {
        query = query.bind(id);
    }
    query = query.bind(cutoff_epoch);
    for p in WHITELISTED_PARAMETERS {
        query = query.bind(*p);
    }

    let rows = query.fetch_all(pool).await?;
    Ok(rows.iter().map(row_to_row0).collect())
}

async fn query_deep_fuel(
    pool: &MySqlPool,
    unit_id: i64,
    now_epoch: i64,
) -> Result<Option<f64>, sqlx::Error> {
    let deep_cutoff = now_epoch - DEEP_FUEL_LOOKBACK_SECS;
    let row = sqlx::query(
        "SELECT value FROM sensors WHERE unit = ? AND m >= ? AND p = 'fuel_lvl' ORDER BY m DESC LIMIT 1",
    )
    .bind(unit_id)
    .bind(deep_cutoff)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| r.get::<f64, _>("value")))
}

fn row_to_row0(row: &sqlx::mysql::MySqlRow) -> Row0 {
    Row0 {
        unit: row.get("unit"),
        param_name: row.get("param_name"),
        value: row.get("value"),
        epoch_time: row.get("epoch_time"),
        latitude: row.try_get("from_latitude").ok(),
        longitude: row.try_get("from_longitude").ok(),
    }
}

fn placeholders(n: usize) -> String {
    std::iter::repeat("?").take(n).collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assign_param_maps_fuel_level() {
        let mut snap = SensorSnapshot::empty("T-1", 1, Utc::now());
        assign_param(&mut snap, "fuel_lvl", 62.5);
        assert_eq!(snap.fuel_level_pct, Some(62.5));
    }

    #[test]
    fn assign_param_does_not_overwrite_existing() {
        let mut snap = SensorSnapshot::empty("T-1", 1, Utc::now());
        snap.speed_mph = Some(10.0);
        assign_param(&mut snap, "speed", 99.0);
        assert_eq!(snap.speed_mph, Some(10.0));
    }

    #[test]
    fn unknown_param_ignored() {
        let mut snap = SensorSnapshot::empty("T-1", 1, Utc::now());
        assign_param(&mut snap, "dtc", 1.0);
        // no panic, no field mutated beyond default
        assert_eq!(snap.fuel_level_pct, None);
    }
}
