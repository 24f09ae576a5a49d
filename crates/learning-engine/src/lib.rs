//! Learning Engine
//!
//! Observes a page a person has already filled, matches every control's
//! value against the flattened profile and emits a `Pattern`: which profile
//! path lives in which control, plus every observed control verbatim.

pub mod model;
pub mod policy;
pub mod runner;

pub use model::{Binding, LearnReport, LearnStatus, LearnedField, Pattern, PatternMetadata};
pub use policy::LearnOptions;
pub use runner::learn;
