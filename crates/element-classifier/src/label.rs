use page_model::{normalize_space, NodeId, Page, PageExt};

/// Human-readable label of a control.
///
/// Priority: `label[for=id]`, enclosing `label`, leading sibling text (or the
/// header cell of a `th`/`td` row), placeholder, `aria-label`.
pub fn label_for(page: &dyn Page, node: NodeId) -> Option<String> {
    let element = page.element(node)?;

    if let Some(id) = element.id() {
        let by_for = page
            .by_attr("for", id)
            .into_iter()
            .filter(|n| page.element(*n).map(|el| el.is_tag("label")).unwrap_or(false))
            .map(|n| visible_text(page, n))
            .find(|text| !text.is_empty());
        if by_for.is_some() {
            return by_for;
        }
    }

    let enclosing = page
        .ancestors(node)
        .into_iter()
        .find(|n| page.element(*n).map(|el| el.is_tag("label")).unwrap_or(false))
        .map(|n| visible_text(page, n))
        .filter(|text| !text.is_empty());
    if enclosing.is_some() {
        return enclosing;
    }

    if let Some(text) = leading_text(page, node) {
        return Some(text);
    }

    element
        .placeholder()
        .or_else(|| element.attr("aria-label"))
        .map(normalize_space)
        .filter(|text| !text.is_empty())
}

/// Text of `node` without the option lists or values of nested controls.
fn visible_text(page: &dyn Page, node: NodeId) -> String {
    fn walk(page: &dyn Page, node: NodeId, out: &mut String) {
        if let Some(text) = page.text_node(node) {
            out.push_str(&text);
            out.push(' ');
            return;
        }
        if page.element(node).map(|el| el.is_form_control()).unwrap_or(false) {
            return;
        }
        for child in page.children(node) {
            walk(page, child, out);
        }
    }
    let mut out = String::new();
    walk(page, node, &mut out);
    normalize_space(&out)
}

fn contains_control(page: &dyn Page, node: NodeId) -> bool {
    page.element(node).map(|el| el.is_form_control()).unwrap_or(false)
        || page
            .descendants(node)
            .into_iter()
            .any(|n| page.element(n).map(|el| el.is_form_control()).unwrap_or(false))
}

fn leading_text(page: &dyn Page, node: NodeId) -> Option<String> {
    let parent = page.parent(node)?;
    let siblings = page.children(parent);
    let position = siblings.iter().position(|n| *n == node)?;

    for sibling in siblings[..position].iter().rev() {
        if page.element(*sibling).is_some() && contains_control(page, *sibling) {
            break;
        }
        let text = visible_text(page, *sibling);
        if !text.is_empty() {
            return Some(text);
        }
    }

    // <tr><th>Name</th><td><input></td></tr>
    let cell = page.element(parent)?;
    if cell.is_tag("td") || cell.is_tag("dd") {
        let row = page.parent(parent)?;
        let cells = page.element_children(row);
        let index = cells.iter().position(|n| *n == parent)?;
        return cells[..index]
            .iter()
            .rev()
            .find(|n| {
                page.element(**n)
                    .map(|el| el.is_tag("th") || el.is_tag("dt"))
                    .unwrap_or(false)
            })
            .map(|n| visible_text(page, *n))
            .filter(|text| !text.is_empty());
    }
    None
}
