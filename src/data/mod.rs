//! Data structures produced by the probes and consumed by the renderer

pub mod hardware;
pub mod system;

pub use hardware::*;
pub use system::*;

/// Sentinel shown when a value could not be determined
pub const UNKNOWN: &str = "Unknown";

/// True for the sentinel or an empty value
pub fn is_unknown(value: &str) -> bool {
    let value = value.trim();
    value.is_empty() || value == UNKNOWN
}
