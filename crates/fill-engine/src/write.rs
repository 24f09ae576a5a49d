//! The write path: value first, then the notifications a person's edit fires.

use page_model::{DomEvent, NodeId, Page, PageError, WritePath};
use tracing::debug;

use crate::policy::FillPolicy;

/// The prototype's own setter when the page exposes one, plain assignment otherwise.
pub fn preferred_path(page: &dyn Page, node: NodeId) -> WritePath {
    if page.has_native_setter(node) {
        WritePath::Native
    } else {
        WritePath::Assignment
    }
}

/// Writes `value`, then dispatches input, change and (per policy) blur.
pub fn write_text(page: &dyn Page, node: NodeId, value: &str, policy: &FillPolicy) -> Result<(), PageError> {
    let path = preferred_path(page, node);
    page.write_value(node, value, path)?;
    debug!(?node, ?path, "value written");
    page.dispatch(node, DomEvent::Input)?;
    page.dispatch(node, DomEvent::Change)?;
    if policy.dispatch_blur {
        page.dispatch(node, DomEvent::Blur)?;
    }
    Ok(())
}

/// Sets a radio or checkbox state, then dispatches change and click.
pub fn write_checked(page: &dyn Page, node: NodeId, checked: bool) -> Result<(), PageError> {
    page.set_checked(node, checked)?;
    debug!(?node, checked, "check state written");
    page.dispatch(node, DomEvent::Change)?;
    page.dispatch(node, DomEvent::Click)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use page_model::{MemoryPage, PageSnapshot, SnapshotElement};

    #[test]
    fn framework_managed_control_is_written_through_native_setter() {
        let page = MemoryPage::from_snapshot(
            &PageSnapshot::new("https://example.test/")
                .node(SnapshotElement::input("text").attr("name", "sei").framework_managed()),
        );
        let node = page.by_name("sei").unwrap();
        write_text(&page, node, "山田", &FillPolicy::default()).unwrap();
        assert_eq!(page.value_of(node).as_deref(), Some("山田"));
        assert_eq!(
            page.events_for(node),
            vec![DomEvent::Input, DomEvent::Change, DomEvent::Blur]
        );
    }

    #[test]
    fn falls_back_to_assignment_without_native_setter() {
        let page = MemoryPage::from_snapshot(
            &PageSnapshot::new("https://example.test/")
                .node(SnapshotElement::input("text").attr("name", "sei").without_native_setter()),
        );
        let node = page.by_name("sei").unwrap();
        assert_eq!(preferred_path(&page, node), WritePath::Assignment);
        let policy = FillPolicy {
            dispatch_blur: false,
            ..FillPolicy::default()
        };
        write_text(&page, node, "山田", &policy).unwrap();
        assert_eq!(page.value_of(node).as_deref(), Some("山田"));
        assert_eq!(page.events_for(node), vec![DomEvent::Input, DomEvent::Change]);
    }
}
