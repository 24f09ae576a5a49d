//! Heuristic Finder
//!
//! Locates a control from keyword sets matched against its identification
//! text (label + placeholder + name + id, lower-cased). Used as the fallback
//! for unresolvable locators and as the whole strategy on unlearned sites.

pub mod filter;
pub mod finder;
pub mod keywords;
pub mod vocabulary;

pub use filter::FinderFilter;
pub use finder::{find, find_detailed, identification_text, name_contains, Finding};
pub use keywords::KeywordSet;
pub use vocabulary::{vocabulary_overlap, MONTHS, PREFECTURES};
