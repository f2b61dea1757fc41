//! DMN decision table hit policy evaluation.
//!
//! Depend on this crate to get the building blocks behind feature flags:
//! table primitives are always available, while the evaluation engine,
//! configuration loading, and telemetry helpers can be switched off
//! individually.

#![warn(missing_docs, clippy::pedantic)]

/// Re-export shared primitives for convenience.
pub use dmn_primitives as primitives;

/// Hit policy evaluation (enabled by `engine` feature).
#[cfg(feature = "engine")]
pub use dmn_engine as engine;

/// Configuration management (enabled by `config` feature).
#[cfg(feature = "config")]
pub use dmn_config as config;

/// Tracing setup and audit reporting (enabled by `telemetry` feature).
#[cfg(feature = "telemetry")]
pub use dmn_telemetry as telemetry;
