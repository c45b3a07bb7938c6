//! Cost projection: parses `cost_if_ignored` ranges into numeric buckets
//! (SPEC_FULL §4.8, DESIGN.md Open Question (b)).
//!
//! The source disables cost aggregation because `cost_if_ignored` is a
//! free-text string; this crate parses the `"$min - $max"` shape it
//! actually emits instead of dropping the signal.

use crate::types::{ActionItem, Priority};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CostProjection {
    pub immediate_min: f64,
    pub immediate_max: f64,
    pub week_min: f64,
    pub week_max: f64,
    pub month_min: f64,
    pub month_max: f64,
}

fn dollar_amount_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    #[allow(clippy::unwrap_used)]
    PATTERN.get_or_init(|| Regex::new(r"\$?\s*([\d,]+(?:\.\d+)?)").unwrap())
}

/// Parse a `"$min - $max"` string into `(min, max)` USD, or `None` if the
/// shape doesn't match.
pub fn parse_cost_range(raw: &str) -> Option<(f64, f64)> {
    let pattern = dollar_amount_pattern();
    let mut matches = pattern.captures_iter(raw).filter_map(|c| c.get(1)).map(|m| m.as_str().replace(',', ""));
    let min: f64 = matches.next()?.parse().ok()?;
    let max: f64 = matches.next()?.parse().ok()?;
    if min > max {
        return None;
    }
    Some((min, max))
}

/// Sum `items`' parsed cost ranges into immediate/week/month buckets.
/// CRITICAL contributes to immediate only; HIGH to week only; everything
/// else to month only. The month bucket then absorbs the prior two, since
/// it represents "cost if nothing is addressed by month's end".
pub fn project(items: &[ActionItem]) -> CostProjection {
    let mut projection = CostProjection::default();

    for item in items {
        let Some(cost) = item.cost_if_ignored.as_deref().and_then(parse_cost_range) else {
            continue;
        };
        match item.priority {
            Priority::Critical => {
                projection.immediate_min += cost.0;
                projection.immediate_max += cost.1;
            }
            Priority::High => {
                projection.week_min += cost.0;
                projection.week_max += cost.1;
            }
            _ => {
                projection.month_min += cost.0;
                projection.month_max += cost.1;
            }
        }
    }

    projection.month_min += projection.immediate_min + projection.week_min;
    projection.month_max += projection.immediate_max + projection.week_max;

    projection
}
