//! Configuration management for the decision engine.
//!
//! The engine itself never reads ambient configuration: callers load an
//! [`EngineConfig`] once and pass [`EngineConfig::strict_mode`] into each
//! evaluation request.

#![warn(missing_docs, clippy::pedantic)]

pub mod loader;
pub mod schema;

pub use loader::{apply_env, load, load_from_path};
pub use schema::EngineConfig;
