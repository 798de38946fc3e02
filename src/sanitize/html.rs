use std::collections::{BTreeSet, HashSet};
use std::rc::Rc;
use std::sync::LazyLock;

use markup5ever_rcdom::{Handle, Node, RcDom};
use regex::Regex;
use serde::Serialize;

use crate::config::SanitizePolicy;
use crate::dom;
use crate::error::{Result, ScrubError};
use crate::ledger::StructureLedger;
use crate::placeholder::{PlaceholderRecord, PlaceholderStore, SourceTypeMode};

use super::{ScalarPipeline, ScrubContext};

/// Elements whose descendant text nodes are rewritten.
const TEXT_CONTAINERS: &[&str] = &[
    "body", "article", "main", "div", "p", "span", "li", "h1", "h2", "h3", "h4",
];

/// Never rewritten, even under a container.
const RAW_TEXT_TAGS: &[&str] = &["script", "style"];

/// Attribute-key fragments that mark a value as sensitive or id/url-bearing.
const SENSITIVE_KEY_FRAGMENTS: &[&str] = &[
    "token", "cookie", "auth", "session", "secret", "url", "href", "src", "content", "value",
];
const EXACT_KEYS: &[&str] = &["alt", "title"];
const PERSON_KEY_FRAGMENTS: &[&str] = &["author", "person", "user", "nickname"];
const PERSON_ITEMPROP_FRAGMENTS: &[&str] = &["author", "person", "user", "name"];

static NAME_HINT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:name|author|user)s?\b").expect("valid name-hint pattern")
});

/// Output of one sanitization run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SanitizationResult {
    pub sanitized_html: String,
    pub placeholders: Vec<PlaceholderRecord>,
    pub raw_ledger: StructureLedger,
    pub sanitized_ledger: StructureLedger,
}

/// Walks a parsed page and rewrites eligible attribute values and container text.
pub struct HtmlSanitizer {
    pipeline: ScalarPipeline,
    containers: BTreeSet<String>,
}

impl HtmlSanitizer {
    pub fn new(policy: &SanitizePolicy) -> Self {
        let containers = TEXT_CONTAINERS
            .iter()
            .map(|tag| tag.to_string())
            .chain(
                policy
                    .extra_text_containers
                    .iter()
                    .map(|tag| tag.to_ascii_lowercase()),
            )
            .collect();
        Self {
            pipeline: ScalarPipeline::from_policy(policy),
            containers,
        }
    }

    /// Redact `html`. Fails before touching the document if `source_url` is not a URL.
    pub fn sanitize(
        &self,
        html: &str,
        source_url: &str,
        policy_version: &str,
    ) -> Result<SanitizationResult> {
        url::Url::parse(source_url).map_err(|e| ScrubError::InvalidSourceUrl {
            url: source_url.to_string(),
            reason: e.to_string(),
        })?;

        let document = dom::parse(html);
        let raw_ledger = StructureLedger::build(&document, policy_version);

        let mut store = PlaceholderStore::new();
        let attrs_changed = self.scrub_attributes(&document, &mut store);
        let texts_changed = self.scrub_text(&document, &mut store);
        tracing::debug!(
            attrs_changed,
            texts_changed,
            placeholders = store.len(),
            "sanitizer passes complete"
        );

        let sanitized_html = dom::to_html(&document)?;
        let sanitized_ledger = StructureLedger::from_html(&sanitized_html, policy_version);

        Ok(SanitizationResult {
            sanitized_html,
            placeholders: store.records(SourceTypeMode::for_policy(policy_version)),
            raw_ledger,
            sanitized_ledger,
        })
    }

    fn scrub_attributes(&self, document: &RcDom, store: &mut PlaceholderStore) -> usize {
        let mut changed = 0;
        for element in dom::elements(document) {
            let attributes = dom::attributes(&element);
            let person_itemprop = attributes.iter().any(|(key, value)| {
                key == "itemprop" && contains_any(&value.to_ascii_lowercase(), PERSON_ITEMPROP_FRAGMENTS)
            });

            for (index, (key, value)) in attributes.iter().enumerate() {
                if !is_eligible_key(key) {
                    continue;
                }
                let personish = person_itemprop || is_person_key(key);
                let mut ctx = ScrubContext::attr(store, personish);
                let scrubbed = self.pipeline.scrub(value, &mut ctx);
                if scrubbed != *value {
                    dom::set_attribute_value(&element, index, scrubbed);
                    changed += 1;
                }
            }
        }
        changed
    }

    fn scrub_text(&self, document: &RcDom, store: &mut PlaceholderStore) -> usize {
        let mut changed = 0;
        let mut visited: HashSet<*const Node> = HashSet::new();
        for element in dom::elements(document) {
            let is_container = dom::tag_name(&element)
                .map(|tag| self.containers.contains(&tag))
                .unwrap_or(false);
            if !is_container || !self.should_rewrite(&element) {
                continue;
            }
            for leaf in dom::descendant_texts(&element, RAW_TEXT_TAGS) {
                if !visited.insert(Rc::as_ptr(&leaf)) {
                    continue;
                }
                let Some(text) = dom::text_of(&leaf) else {
                    continue;
                };
                if text.trim().is_empty() {
                    continue;
                }
                let mut ctx = ScrubContext::text(store, true);
                let scrubbed = self.pipeline.scrub(&text, &mut ctx);
                if scrubbed != text {
                    dom::set_text(&leaf, scrubbed);
                    changed += 1;
                }
            }
        }
        changed
    }

    /// A container is rewritten when its full text would change, or when it
    /// mentions a name/author/user.
    fn should_rewrite(&self, element: &Handle) -> bool {
        let text: String = dom::descendant_texts(element, RAW_TEXT_TAGS)
            .iter()
            .filter_map(dom::text_of)
            .collect();
        let text = text.trim();
        if text.is_empty() {
            return false;
        }
        NAME_HINT.is_match(text) || self.pipeline.would_change(text, false)
    }
}

impl Default for HtmlSanitizer {
    fn default() -> Self {
        Self::new(&SanitizePolicy::default())
    }
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}

/// Whether an attribute's value goes through the scalar pipeline.
pub fn is_eligible_key(key: &str) -> bool {
    let key = key.to_ascii_lowercase();
    contains_any(&key, SENSITIVE_KEY_FRAGMENTS)
        || key.starts_with("data-")
        || EXACT_KEYS.contains(&key.as_str())
}

fn is_person_key(key: &str) -> bool {
    contains_any(&key.to_ascii_lowercase(), PERSON_KEY_FRAGMENTS)
}
