//! Site Adapters
//!
//! A `SiteAdapter` turns a profile into writes on one kind of page. The
//! registry picks an adapter from the page's signature and falls back to
//! the keyword-driven heuristic adapter for unknown sites.

pub mod adapter;
pub mod axol;
pub mod errors;
pub mod gate;
pub mod heuristic;
pub mod keywords;
pub mod pattern;
pub mod registry;
pub mod report;
pub mod signature;

pub use adapter::{FillContext, SiteAdapter};
pub use axol::{axol_adapter, axol_gates, axol_matcher, axol_pattern, axol_school_cascade, AXOL_ADAPTER};
pub use errors::AdapterError;
pub use gate::{Condition, FieldGate, GateScope};
pub use heuristic::{HeuristicAdapter, HEURISTIC_ADAPTER};
pub use keywords::{KeywordField, KeywordTable, Section, Vocabulary};
pub use pattern::PatternAdapter;
pub use registry::AdapterRegistry;
pub use report::{FillReport, FillSummary};
pub use signature::{PageSignature, SiteMatcher};
