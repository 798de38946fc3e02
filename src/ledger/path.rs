use std::collections::HashMap;

use markup5ever_rcdom::{Handle, RcDom};

use crate::dom;

/// An element paired with its positional path.
#[derive(Clone)]
pub struct IndexedElement {
    pub path: String,
    pub tag: String,
    pub handle: Handle,
}

/// Assign a `/tag[n]` path to every element below the top-level `<html>`.
///
/// `n` is the 1-based position among same-tag siblings, so two parses of
/// structurally identical documents yield identical paths. Output is in
/// document order; the `<html>` wrapper itself is not indexed.
pub fn index_elements(dom: &RcDom) -> Vec<IndexedElement> {
    let Some(root) = dom::document_element(dom) else {
        return Vec::new();
    };

    let mut out = Vec::new();
    let mut stack = indexed_children(&root, "");
    stack.reverse();
    while let Some(element) = stack.pop() {
        let mut children = indexed_children(&element.handle, &element.path);
        children.reverse();
        stack.extend(children);
        out.push(element);
    }
    out
}

fn indexed_children(parent: &Handle, prefix: &str) -> Vec<IndexedElement> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    dom::child_elements(parent)
        .into_iter()
        .filter_map(|handle| {
            let tag = dom::tag_name(&handle)?;
            let n = seen.entry(tag.clone()).or_insert(0);
            *n += 1;
            Some(IndexedElement {
                path: format!("{prefix}/{tag}[{n}]"),
                tag,
                handle,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(html: &str) -> Vec<String> {
        index_elements(&dom::parse(html))
            .into_iter()
            .map(|e| e.path)
            .collect()
    }

    #[test]
    fn test_same_tag_siblings_are_counted_per_tag() {
        let got = paths("<div></div><p></p><div><span></span><span></span></div>");
        assert_eq!(
            got,
            vec![
                "/head[1]",
                "/body[1]",
                "/body[1]/div[1]",
                "/body[1]/p[1]",
                "/body[1]/div[2]",
                "/body[1]/div[2]/span[1]",
                "/body[1]/div[2]/span[2]",
            ]
        );
    }

    #[test]
    fn test_paths_stable_across_parses() {
        let html = "<ul><li>a</li><li>b</li></ul><script>x()</script>";
        assert_eq!(paths(html), paths(html));
        assert!(paths(html).contains(&"/body[1]/script[1]".to_string()));
    }

    #[test]
    fn test_text_changes_do_not_move_paths() {
        assert_eq!(
            paths("<p>Jane Doe</p><p>123456789012</p>"),
            paths("<p>PERSON_001</p><p>CID_001</p>")
        );
    }
}
