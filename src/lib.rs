//! entryfill library
//!
//! The CLI shell around the autofill crates, exposed for integration testing.

pub mod cli;
pub mod config;
pub mod engine;

pub use config::{ConfigError, EntryfillConfig};
pub use engine::AutofillEngine;
