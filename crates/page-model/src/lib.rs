//! Page Model - the only interface between the engine and a host page.
//!
//! - `Page`: synchronous read/write/query/event port over a node tree
//! - `PageExt`: query helpers every engine component shares
//! - `MemoryPage`: arena-backed document used by the CLI and tests
//! - `PageSnapshot`: JSON form of a document

pub mod errors;
pub mod memory;
pub mod model;
pub mod port;
pub mod snapshot;

pub use errors::PageError;
pub use memory::{EventRecord, MemoryPage};
pub use model::{DomEvent, ElementView, NodeId, OptionView, RenderState, WritePath};
pub use port::{normalize_space, Page, PageExt};
pub use snapshot::{PageSnapshot, SnapshotElement, SnapshotNode};
