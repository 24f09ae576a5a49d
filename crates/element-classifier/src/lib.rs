//! Element Classifier - what a control is and whether the engine may write it.

pub mod collect;
pub mod cosmetic;
pub mod fillable;
pub mod kind;
pub mod label;

pub use collect::{collect, ControlSummary};
pub use cosmetic::{cosmetic_wrapper, resync_cosmetic, CosmeticWrapper};
pub use fillable::{is_fillable, is_non_data_input, is_rendered};
pub use kind::{classify, is_text_like, split_group, SplitGroup};
pub use label::label_for;

#[cfg(test)]
pub(crate) mod fixtures {
    use page_model::{MemoryPage, PageSnapshot, SnapshotElement};

    pub fn page(nodes: Vec<SnapshotElement>) -> MemoryPage {
        let snapshot = nodes
            .into_iter()
            .fold(PageSnapshot::new("https://example.test/entry"), |s, n| s.node(n));
        MemoryPage::from_snapshot(&snapshot)
    }
}
