//! Process-wide structured logging setup.

/// Tracing configuration (filters, layers).
pub mod tracing;

pub use self::tracing::{init, init_with_default_filter, DEFAULT_FILTER};
