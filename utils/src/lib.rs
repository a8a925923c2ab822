//! Shared utilities for the election workspace.

pub mod logging;
pub mod stats;

pub use logging::{init_tracing, init_tracing_json};
pub use stats::{OperationCounts, OperationStats};
