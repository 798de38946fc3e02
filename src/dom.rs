//! Thin helpers over an html5ever `RcDom`: parse, walk, mutate in place, serialize.

use html5ever::serialize::{serialize, SerializeOpts};
use html5ever::tendril::{StrTendril, TendrilSink};
use html5ever::{parse_document, ParseOpts};
use markup5ever_rcdom::{Handle, NodeData, RcDom, SerializableHandle};

use crate::error::{Result, ScrubError};

/// Parse a document with the tolerant HTML5 tree builder.
pub fn parse(html: &str) -> RcDom {
    parse_document(RcDom::default(), ParseOpts::default()).one(html)
}

/// Serialize the whole document (doctype included) back to text.
pub fn to_html(dom: &RcDom) -> Result<String> {
    let mut bytes = Vec::new();
    let document: SerializableHandle = dom.document.clone().into();
    serialize(&mut bytes, &document, SerializeOpts::default())?;
    String::from_utf8(bytes).map_err(|e| ScrubError::Sanitize {
        reason: format!("serializer produced invalid utf-8: {e}"),
    })
}

/// The top-level `<html>` element, if the parser produced one.
pub fn document_element(dom: &RcDom) -> Option<Handle> {
    dom.document
        .children
        .borrow()
        .iter()
        .find(|child| tag_name(child).is_some())
        .cloned()
}

/// Lower-case local tag name of an element node.
pub fn tag_name(handle: &Handle) -> Option<String> {
    match handle.data {
        NodeData::Element { ref name, .. } => Some(name.local.to_string()),
        _ => None,
    }
}

/// Element children of `handle`, in document order.
pub fn child_elements(handle: &Handle) -> Vec<Handle> {
    handle
        .children
        .borrow()
        .iter()
        .filter(|child| matches!(child.data, NodeData::Element { .. }))
        .cloned()
        .collect()
}

/// Every element in the document, pre-order, `<html>` included.
pub fn elements(dom: &RcDom) -> Vec<Handle> {
    let mut out = Vec::new();
    let mut stack: Vec<Handle> = dom.document.children.borrow().iter().rev().cloned().collect();
    while let Some(node) = stack.pop() {
        if !matches!(node.data, NodeData::Element { .. }) {
            continue;
        }
        stack.extend(node.children.borrow().iter().rev().cloned());
        out.push(node);
    }
    out
}

/// Attribute `(key, value)` pairs in source order. Namespaced keys keep their prefix.
pub fn attributes(handle: &Handle) -> Vec<(String, String)> {
    match handle.data {
        NodeData::Element { ref attrs, .. } => attrs
            .borrow()
            .iter()
            .map(|attr| {
                let key = match attr.name.prefix {
                    Some(ref prefix) => format!("{}:{}", prefix, attr.name.local),
                    None => attr.name.local.to_string(),
                };
                (key, attr.value.to_string())
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// Overwrite the value of the attribute at `index` (as returned by [`attributes`]).
pub fn set_attribute_value(handle: &Handle, index: usize, value: String) {
    if let NodeData::Element { ref attrs, .. } = handle.data {
        if let Some(attr) = attrs.borrow_mut().get_mut(index) {
            attr.value = StrTendril::from(value);
        }
    }
}

/// Concatenated text of every descendant text node.
pub fn text_content(handle: &Handle) -> String {
    let mut text = String::new();
    let mut stack = vec![handle.clone()];
    while let Some(node) = stack.pop() {
        if let NodeData::Text { ref contents } = node.data {
            text.push_str(&contents.borrow());
        }
        stack.extend(node.children.borrow().iter().rev().cloned());
    }
    text
}

/// Descendant text nodes of `handle` in document order, not entering elements
/// whose tag is in `skip`.
pub fn descendant_texts(handle: &Handle, skip: &[&str]) -> Vec<Handle> {
    let mut out = Vec::new();
    let mut stack: Vec<Handle> = handle.children.borrow().iter().rev().cloned().collect();
    while let Some(node) = stack.pop() {
        match node.data {
            NodeData::Text { .. } => out.push(node),
            NodeData::Element { ref name, .. } => {
                if skip.contains(&&*name.local) {
                    continue;
                }
                stack.extend(node.children.borrow().iter().rev().cloned());
            }
            _ => {}
        }
    }
    out
}

pub fn text_of(handle: &Handle) -> Option<String> {
    match handle.data {
        NodeData::Text { ref contents } => Some(contents.borrow().to_string()),
        _ => None,
    }
}

pub fn set_text(handle: &Handle, value: String) {
    if let NodeData::Text { ref contents } = handle.data {
        *contents.borrow_mut() = StrTendril::from(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_wraps_fragment_in_html_body() {
        let dom = parse("<p>hi</p>");
        let html = document_element(&dom).unwrap();
        assert_eq!(tag_name(&html).as_deref(), Some("html"));
        let names: Vec<String> = child_elements(&html)
            .iter()
            .filter_map(tag_name)
            .collect();
        assert_eq!(names, vec!["head", "body"]);
    }

    #[test]
    fn test_elements_are_preorder() {
        let dom = parse("<div><p>a</p><span>b</span></div><ul><li>c</li></ul>");
        let names: Vec<String> = elements(&dom).iter().filter_map(tag_name).collect();
        assert_eq!(
            names,
            vec!["html", "head", "body", "div", "p", "span", "ul", "li"]
        );
    }

    #[test]
    fn test_text_content_includes_descendants() {
        let dom = parse("<div>Hello <b>big</b> world</div>");
        let div = elements(&dom)
            .into_iter()
            .find(|h| tag_name(h).as_deref() == Some("div"))
            .unwrap();
        assert_eq!(text_content(&div), "Hello big world");
        assert_eq!(descendant_texts(&div, &[]).len(), 3);
    }

    #[test]
    fn test_descendant_texts_skip_tags() {
        let dom = parse("<p>a<script>x()</script><em>b<style>i{}</style></em>c</p>");
        let p = elements(&dom)
            .into_iter()
            .find(|h| tag_name(h).as_deref() == Some("p"))
            .unwrap();
        let texts: Vec<String> = descendant_texts(&p, &["script", "style"])
            .iter()
            .filter_map(text_of)
            .collect();
        assert_eq!(texts, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_mutation_round_trips_through_serializer() {
        let dom = parse(r#"<a href="https://example.com/x">old</a>"#);
        let anchor = elements(&dom)
            .into_iter()
            .find(|h| tag_name(h).as_deref() == Some("a"))
            .unwrap();
        set_attribute_value(&anchor, 0, "https://example.com/y".into());
        set_text(&descendant_texts(&anchor, &[])[0], "new".into());
        let out = to_html(&dom).unwrap();
        assert!(out.contains(r#"<a href="https://example.com/y">new</a>"#));
    }
}
