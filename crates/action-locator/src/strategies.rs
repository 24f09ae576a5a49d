//! Element resolution strategies
//!
//! Four strategies in fallback order:
//! 1. Id - `id` attribute equality
//! 2. Name - `name` attribute equality
//! 3. Class - tag + class subset match
//! 4. Structural - tag/index walk from an anchor

use page_model::{NodeId, Page, PageExt};
use tracing::debug;

use crate::types::{ClassSignature, Locator, LocatorStrategy, StructuralPath};

/// One way of turning a locator back into controls.
pub trait Strategy: Send + Sync {
    /// `None` when the locator did not record this strategy.
    fn resolve(&self, page: &dyn Page, locator: &Locator) -> Option<Vec<NodeId>>;

    fn strategy_type(&self) -> LocatorStrategy;

    fn name(&self) -> &'static str {
        self.strategy_type().name()
    }
}

pub struct IdStrategy;

impl Strategy for IdStrategy {
    fn resolve(&self, page: &dyn Page, locator: &Locator) -> Option<Vec<NodeId>> {
        let id = locator.id.as_deref()?;
        Some(page.by_attr("id", id))
    }

    fn strategy_type(&self) -> LocatorStrategy {
        LocatorStrategy::Id
    }
}

pub struct NameStrategy;

impl Strategy for NameStrategy {
    fn resolve(&self, page: &dyn Page, locator: &Locator) -> Option<Vec<NodeId>> {
        let name = locator.name.as_deref()?;
        Some(page.by_attr("name", name))
    }

    fn strategy_type(&self) -> LocatorStrategy {
        LocatorStrategy::Name
    }
}

pub struct ClassStrategy;

impl ClassStrategy {
    pub(crate) fn matches(page: &dyn Page, signature: &ClassSignature) -> Vec<NodeId> {
        page.elements_where(|el| {
            signature.tag.as_deref().map(|tag| el.is_tag(tag)).unwrap_or(true)
                && signature.classes.iter().all(|class| el.has_class(class))
        })
    }
}

impl Strategy for ClassStrategy {
    fn resolve(&self, page: &dyn Page, locator: &Locator) -> Option<Vec<NodeId>> {
        let signature = locator.class.as_ref()?;
        Some(Self::matches(page, signature))
    }

    fn strategy_type(&self) -> LocatorStrategy {
        LocatorStrategy::Class
    }
}

pub struct StructuralStrategy;

impl StructuralStrategy {
    fn walk(page: &dyn Page, path: &StructuralPath) -> Option<NodeId> {
        let mut current = match &path.anchor {
            Some(anchor) => match page.by_attr("id", anchor).as_slice() {
                [single] => *single,
                other => {
                    debug!(anchor = %anchor, found = other.len(), "structural anchor not unique");
                    return None;
                }
            },
            None => page.root(),
        };
        for step in &path.steps {
            current = page
                .element_children(current)
                .into_iter()
                .filter(|child| page.element(*child).map(|el| el.is_tag(&step.tag)).unwrap_or(false))
                .nth(step.index)?;
        }
        Some(current)
    }
}

impl Strategy for StructuralStrategy {
    fn resolve(&self, page: &dyn Page, locator: &Locator) -> Option<Vec<NodeId>> {
        let path = locator.path.as_ref()?;
        Some(Self::walk(page, path).into_iter().collect())
    }

    fn strategy_type(&self) -> LocatorStrategy {
        LocatorStrategy::Structural
    }
}
