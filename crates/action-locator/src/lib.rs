//! Locator builder and resolver.
//!
//! A `Locator` records every strategy that can re-find a control, ranked by
//! durability:
//! - Id: a document-unique `id` attribute
//! - Name: the `name` attribute (shared by radio groups)
//! - Class: a tag + class signature, recorded only when unique at build time
//! - Structural: (tag, same-tag sibling index) steps from the nearest
//!   uniquely identified ancestor or the document root; always recorded
//!
//! Resolution walks that chain, skipping strategies that were not recorded
//! and falling through when one matches nothing.

pub mod builder;
pub mod errors;
pub mod resolver;
pub mod strategies;
pub mod types;

pub use builder::build;
pub use errors::LocatorError;
pub use resolver::{resolve, LocatorResolver, Resolution};
pub use strategies::Strategy;
pub use types::{ClassSignature, Locator, LocatorStrategy, PathStep, StructuralPath};
