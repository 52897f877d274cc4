//! Foundation utilities shared across the crate

/// Logging setup and re-exports
pub mod logging;
