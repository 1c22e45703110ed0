//! Pipeline configuration and the driver state machine.

/// Run settings and JSON loading.
pub mod config;
/// Load, locate, render and encode in order.
pub mod driver;
