//! Observability utilities for decision evaluation.
//!
//! The engine emits `tracing` spans and events on its own; this crate installs
//! a subscriber for binaries and turns audit trails into structured events.

#![warn(missing_docs, clippy::pedantic)]

pub mod audit;
pub mod tracing_support;

pub use audit::log_audit_trail;
pub use tracing_support::init;
