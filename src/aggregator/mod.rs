//! Command-Center Aggregator: dedup, fleet health, insights, cost
//! projection, and a TTL-cached generation cycle over the action-source
//! adapters (SPEC_FULL §4.7/§4.8).

pub mod cache;
pub mod cost;
pub mod dedup;
pub mod generator;
pub mod health;
pub mod insights;

pub use cache::TtlCache;
pub use cost::{project as project_cost, CostProjection};
pub use dedup::dedup as dedup_items;
pub use generator::{generate as generate_dashboard, status_counts, AggregatorError, DashboardResponse, FleetHealth, FleetTotals, SensorStatusCounts};
pub use health::{fleet_health_score, ok_trucks, urgency_summary, HealthStatus, UrgencySummary};
pub use insights::{generate as generate_insights, Insight, InsightSeverity};

use crate::adapters::AdapterContext;
use crate::config::CacheConfig;
use crate::types::TruckStatus;
use std::collections::HashMap;
use std::time::Duration;

/// Owns the dashboard TTL cache so concurrent HTTP requests within a cache
/// window share one generation cycle (SPEC_FULL §5). A generation failure
/// (empty fleet) is checked before the cache is touched, so the cache only
/// ever holds successful responses (SPEC_FULL §7).
pub struct CommandCenterAggregator {
    dashboard_cache: TtlCache<&'static str, DashboardResponse>,
}

impl CommandCenterAggregator {
    pub fn new(cache: &CacheConfig) -> Self {
        Self { dashboard_cache: TtlCache::new(Duration::from_secs(cache.dashboard_ttl_secs)) }
    }

    /// Fetch (generating on miss/expiry/bypass) the full dashboard response.
    /// Returns `(response, was_served_from_cache)`.
    pub async fn dashboard<'a>(
        &self,
        ctx: &AdapterContext<'a>,
        truck_statuses: &HashMap<String, TruckStatus>,
        bypass_cache: bool,
    ) -> Result<(DashboardResponse, bool), AggregatorError> {
        if ctx.trucks.is_empty() {
            return Err(AggregatorError::EmptyFleet);
        }
        Ok(self.dashboard_cache.get_or_generate("dashboard", bypass_cache, || async {
            generator::generate(ctx, truck_statuses).await.expect("trucks checked non-empty above")
        }).await)
    }
}
