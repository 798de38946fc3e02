pub mod diff;
pub mod path;

use std::collections::BTreeMap;

use markup5ever_rcdom::RcDom;
use serde::{Deserialize, Serialize};

use crate::classify::{classify, ValueClass};
use crate::dom;

pub use diff::{diff, LedgerDiff, Violation, Warning};

/// Structural fingerprint of one element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerNode {
    pub node_path: String,
    pub tag_name: String,
    /// Attribute keys, lexically sorted.
    pub attributes_present: Vec<String>,
    pub attribute_value_class: BTreeMap<String, ValueClass>,
    /// Class of the element's trimmed text (descendants included). Absent when empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_class: Option<ValueClass>,
}

/// Every element of one document, sorted by `node_path`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructureLedger {
    pub policy_version: String,
    pub nodes: Vec<LedgerNode>,
}

impl StructureLedger {
    /// Build the ledger of a parsed document.
    pub fn build(dom: &RcDom, policy_version: &str) -> Self {
        let mut nodes: Vec<LedgerNode> = path::index_elements(dom)
            .into_iter()
            .map(|element| {
                let attributes = dom::attributes(&element.handle);
                let attribute_value_class: BTreeMap<String, ValueClass> = attributes
                    .iter()
                    .map(|(key, value)| (key.clone(), classify(value)))
                    .collect();
                let attributes_present = attribute_value_class.keys().cloned().collect();
                let text = dom::text_content(&element.handle);
                let text = text.trim();
                LedgerNode {
                    node_path: element.path,
                    tag_name: element.tag,
                    attributes_present,
                    attribute_value_class,
                    text_class: (!text.is_empty()).then(|| classify(text)),
                }
            })
            .collect();
        nodes.sort_by(|a, b| a.node_path.cmp(&b.node_path));

        Self {
            policy_version: policy_version.to_string(),
            nodes,
        }
    }

    /// Parse `html` and build its ledger.
    pub fn from_html(html: &str, policy_version: &str) -> Self {
        Self::build(&dom::parse(html), policy_version)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Look up a node by path. Nodes are sorted, so this is a binary search.
    pub fn get(&self, node_path: &str) -> Option<&LedgerNode> {
        self.nodes
            .binary_search_by(|node| node.node_path.as_str().cmp(node_path))
            .ok()
            .map(|idx| &self.nodes[idx])
    }
}
