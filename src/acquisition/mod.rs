//! Tank Registry and Telemetry Reader (SPEC_FULL §4.1, upstream `sensors`/`units_map`).
//!
//! `TankRegistry` loads static per-truck configuration once at startup and
//! exposes pure lookups. `TelemetryReader` is the live connection to the
//! upstream sensor database; [`MysqlTelemetryReader`] is the production
//! implementation, grounded in `original_source/wialon_reader.py`'s
//! `ensure_connection`/`get_all_trucks_data` algorithm.

mod registry;
mod reader;

pub use registry::{TankRegistry, TankRegistryError};
pub use reader::{AcquisitionError, MysqlTelemetryReader, TelemetryReader};
