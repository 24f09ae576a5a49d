use std::fmt;
use std::sync::Arc;

use element_classifier::classify;
use entryfill_core_types::ControlKind;
use page_model::{NodeId, Page};

use crate::vocabulary::vocabulary_overlap;

type Predicate = Arc<dyn Fn(&dyn Page, NodeId) -> bool + Send + Sync>;

/// Structural constraints a keyword match must also satisfy.
#[derive(Clone, Default)]
pub struct FinderFilter {
    kinds: Vec<ControlKind>,
    vocabulary: Option<(Vec<String>, usize)>,
    exclude: Vec<NodeId>,
    predicate: Option<Predicate>,
}

impl fmt::Debug for FinderFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FinderFilter")
            .field("kinds", &self.kinds)
            .field("vocabulary", &self.vocabulary.as_ref().map(|(words, min)| (words.len(), *min)))
            .field("exclude", &self.exclude)
            .field("predicate", &self.predicate.is_some())
            .finish()
    }
}

impl FinderFilter {
    pub fn none() -> Self {
        Self::default()
    }

    /// Only controls of these kinds.
    pub fn kinds(mut self, kinds: &[ControlKind]) -> Self {
        self.kinds = kinds.to_vec();
        self
    }

    /// Only selects with at least `min` options drawn from `words`.
    pub fn vocabulary<S: AsRef<str>>(mut self, words: &[S], min: usize) -> Self {
        self.vocabulary = Some((words.iter().map(|w| w.as_ref().to_string()).collect(), min));
        self
    }

    /// Never these controls (e.g. ones already claimed by another field).
    pub fn exclude(mut self, nodes: impl IntoIterator<Item = NodeId>) -> Self {
        self.exclude.extend(nodes);
        self
    }

    pub fn predicate<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&dyn Page, NodeId) -> bool + Send + Sync + 'static,
    {
        self.predicate = Some(Arc::new(predicate));
        self
    }

    pub fn accepts(&self, page: &dyn Page, node: NodeId) -> bool {
        if self.exclude.contains(&node) {
            return false;
        }
        if !self.kinds.is_empty() {
            match classify(page, node) {
                Some(kind) if self.kinds.contains(&kind) => {}
                _ => return false,
            }
        }
        if let Some((words, min)) = &self.vocabulary {
            if vocabulary_overlap(page, node, words) < *min {
                return false;
            }
        }
        self.predicate
            .as_ref()
            .map(|predicate| predicate(page, node))
            .unwrap_or(true)
    }
}
