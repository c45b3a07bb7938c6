//! J1939 Suspect Parameter Number (SPN) normalization entries (SPEC_FULL §4.5).

use serde::{Deserialize, Serialize};

/// One row of the fixed SPN lookup table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpnEntry {
    pub spn: u32,
    pub component: &'static str,
    pub human_name: &'static str,
    pub unit: &'static str,
}
