//! Fill Engine
//!
//! Writes one value into one resolved control following its kind's rules.
//! Existing content always wins: a control that already holds a value is
//! never overwritten. Every write is followed by the notifications a manual
//! edit produces so reactive page frameworks observe it.

pub mod errors;
pub mod model;
pub mod policy;
pub mod runner;
pub mod segments;
pub mod write;

pub use errors::FillError;
pub use model::FillTally;
pub use policy::FillPolicy;
pub use runner::{apply, FillSession};
pub use segments::{phone_segments, postal_segments, segments_for};
pub use write::{preferred_path, write_checked, write_text};
