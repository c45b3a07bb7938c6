//! Tank Registry: startup load of `units_map` into an immutable lookup table.

use crate::types::TruckConfig;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TankRegistryError {
    #[error("duplicate truck_id in registry: {0}")]
    DuplicateTruckId(String),
    #[error("duplicate unit_id in registry: {0}")]
    DuplicateUnitId(i64),
    #[error("registry is empty — cannot start with zero configured trucks")]
    Empty,
    #[error("database error loading units_map: {0}")]
    Db(String),
}

/// Immutable-after-startup per-truck configuration, keyed on `truck_id` and `unit_id`.
#[derive(Debug, Clone, Default)]
pub struct TankRegistry {
    by_truck_id: HashMap<String, TruckConfig>,
    by_unit_id: HashMap<i64, String>,
}

impl TankRegistry {
    /// Build a registry from a list of rows, enforcing key uniqueness.
    pub fn from_trucks(trucks: Vec<TruckConfig>) -> Result<Self, TankRegistryError> {
        if trucks.is_empty() {
            return Err(TankRegistryError::Empty);
        }
        let mut by_truck_id = HashMap::with_capacity(trucks.len());
        let mut by_unit_id = HashMap::with_capacity(trucks.len());
        for truck in trucks {
            if by_truck_id.contains_key(&truck.truck_id) {
                return Err(TankRegistryError::DuplicateTruckId(truck.truck_id));
            }
            if by_unit_id.contains_key(&truck.unit_id) {
                return Err(TankRegistryError::DuplicateUnitId(truck.unit_id));
            }
            by_unit_id.insert(truck.unit_id, truck.truck_id.clone());
            by_truck_id.insert(truck.truck_id.clone(), truck);
        }
        Ok(Self { by_truck_id, by_unit_id })
    }

    /// Load the registry from the `units_map` table via an open MySQL pool.
    pub async fn load_from_db(pool: &sqlx::MySqlPool) -> Result<Self, TankRegistryError> {
        #[derive(sqlx::FromRow)]
        struct Row {
            #[sqlx(rename = "beyondId")]
            beyond_id: String,
            unit: i64,
            fuel_capacity: Option<f64>,
        }

        let rows: Vec<Row> =
            sqlx::query_as("SELECT beyondId, unit, fuel_capacity FROM units_map ORDER BY beyondId")
                .fetch_all(pool)
                .await
                .map_err(|e| TankRegistryError::Db(e.to_string()))?;

        let trucks = rows
            .into_iter()
            .map(|r| {
                let capacity_gallons = r.fuel_capacity.unwrap_or(200.0);
                TruckConfig::new(r.beyond_id, r.unit, capacity_gallons, "default", None)
            })
            .collect();

        Self::from_trucks(trucks)
    }

    pub fn by_truck_id(&self, truck_id: &str) -> Option<&TruckConfig> {
        self.by_truck_id.get(truck_id)
    }

    pub fn by_unit_id(&self, unit_id: i64) -> Option<&TruckConfig> {
        self.by_unit_id.get(&unit_id).and_then(|id| self.by_truck_id.get(id))
    }

    pub fn truck_ids(&self) -> impl Iterator<Item = &str> {
        self.by_truck_id.keys().map(String::as_str)
    }

    pub fn unit_ids(&self) -> impl Iterator<Item = i64> + '_ {
        self.by_unit_id.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.by_truck_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_truck_id.is_empty()
    }

    pub fn all(&self) -> impl Iterator<Item = &TruckConfig> {
        self.by_truck_id.values()
    }
}
