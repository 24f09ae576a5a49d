//! Pattern Store
//!
//! Named patterns behind an async get/set/list/delete port. The file-backed
//! store keeps the whole state in one JSON blob alongside the profile and
//! the last-used pattern name.

pub mod blob;
pub mod errors;
pub mod file;
pub mod memory;
pub mod store;

pub use blob::{SavedSettings, StoredBlob};
pub use errors::{StoreError, StoreErrorKind};
pub use file::JsonFileStore;
pub use memory::MemoryPatternStore;
pub use store::{parse_import, PatternStore};
