use page_model::{NodeId, Page, PageExt};

use crate::errors::LocatorError;
use crate::strategies::ClassStrategy;
use crate::types::{ClassSignature, Locator, PathStep, StructuralPath};

/// Derives a locator for `node`, recording every strategy that applies.
///
/// The structural path is always present, so the result is never empty.
pub fn build(page: &dyn Page, node: NodeId) -> Result<Locator, LocatorError> {
    let element = page.element(node).ok_or(LocatorError::NotAnElement(node))?;

    let id = element
        .id()
        .filter(|id| is_unique_id(page, id))
        .map(str::to_string);
    let name = element.name().map(str::to_string);
    let class = {
        let classes: Vec<String> = element.classes().into_iter().map(str::to_string).collect();
        let signature = ClassSignature {
            tag: Some(element.tag.to_ascii_lowercase()),
            classes,
        };
        (!signature.classes.is_empty() && ClassStrategy::matches(page, &signature) == vec![node])
            .then_some(signature)
    };

    Ok(Locator {
        id,
        name,
        class,
        path: Some(structural_path(page, node)),
    })
}

fn is_unique_id(page: &dyn Page, id: &str) -> bool {
    page.by_attr("id", id).len() == 1
}

fn structural_path(page: &dyn Page, node: NodeId) -> StructuralPath {
    let mut steps = Vec::new();
    let mut anchor = None;
    let mut current = node;

    while let Some(parent) = page.parent(current) {
        let Some(element) = page.element(current) else { break };
        let index = page
            .element_children(parent)
            .into_iter()
            .filter(|sibling| {
                page.element(*sibling)
                    .map(|el| el.is_tag(&element.tag))
                    .unwrap_or(false)
            })
            .position(|sibling| sibling == current)
            .unwrap_or(0);
        steps.push(PathStep {
            tag: element.tag.to_ascii_lowercase(),
            index,
        });

        let parent_id = page
            .element(parent)
            .and_then(|el| el.id().map(str::to_string))
            .filter(|id| is_unique_id(page, id));
        if let Some(id) = parent_id {
            anchor = Some(id);
            break;
        }
        current = parent;
    }

    steps.reverse();
    StructuralPath { anchor, steps }
}
