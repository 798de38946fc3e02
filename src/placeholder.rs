use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// What kind of value a placeholder stands in for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Person,
    ContentId,
    Token,
    Cookie,
    Tracking,
}

impl Category {
    pub fn prefix(&self) -> &'static str {
        match self {
            Category::Person => "PERSON",
            Category::ContentId => "CID",
            Category::Token => "TOKEN",
            Category::Cookie => "COOKIE",
            Category::Tracking => "TRACK",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Person => "person",
            Category::ContentId => "content_id",
            Category::Token => "token",
            Category::Cookie => "cookie",
            Category::Tracking => "tracking",
        }
    }
}

/// Where in the document a placeholder was first substituted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    Text,
    Attr,
    UrlPart,
    Query,
}

/// One entry of the persisted placeholder map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceholderRecord {
    pub placeholder: String,
    pub category: Category,
    pub source_type: SourceType,
}

/// How `sourceType` is reported in the persisted map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceTypeMode {
    /// `query` for tracking placeholders, `attr` for everything else.
    Legacy,
    /// The source recorded at first assignment.
    Recorded,
}

impl SourceTypeMode {
    /// Policy `v1` keeps the legacy tagging; later versions report provenance.
    pub fn for_policy(policy_version: &str) -> Self {
        if policy_version == "v1" {
            SourceTypeMode::Legacy
        } else {
            SourceTypeMode::Recorded
        }
    }
}

const COUNTER_WIDTH: usize = 3;

#[derive(Debug, Clone)]
struct Assigned {
    placeholder: String,
    category: Category,
    source: SourceType,
}

/// Per-run placeholder allocator.
///
/// The same `(category, raw)` pair always maps to the same token; counters are
/// per category and only ever grow. Build a fresh store for every run.
#[derive(Debug, Clone, Default)]
pub struct PlaceholderStore {
    memo: BTreeMap<String, Assigned>,
    counters: BTreeMap<Category, usize>,
}

impl PlaceholderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Placeholder for `raw` in `category`, allocating one on first sight.
    pub fn next(&mut self, category: Category, raw: &str, source: SourceType) -> String {
        let key = format!("{}::{}", category.as_str(), raw);
        if let Some(existing) = self.memo.get(&key) {
            return existing.placeholder.clone();
        }
        let counter = self.counters.entry(category).or_insert(0);
        *counter += 1;
        let placeholder = format!(
            "{}_{:0width$}",
            category.prefix(),
            *counter,
            width = COUNTER_WIDTH
        );
        self.memo.insert(
            key,
            Assigned {
                placeholder: placeholder.clone(),
                category,
                source,
            },
        );
        placeholder
    }

    pub fn len(&self) -> usize {
        self.memo.len()
    }

    pub fn is_empty(&self) -> bool {
        self.memo.is_empty()
    }

    /// Deduplicated records sorted by placeholder token.
    pub fn records(&self, mode: SourceTypeMode) -> Vec<PlaceholderRecord> {
        let mut records: Vec<PlaceholderRecord> = self
            .memo
            .values()
            .map(|assigned| PlaceholderRecord {
                placeholder: assigned.placeholder.clone(),
                category: assigned.category,
                source_type: match mode {
                    SourceTypeMode::Recorded => assigned.source,
                    SourceTypeMode::Legacy if assigned.category == Category::Tracking => {
                        SourceType::Query
                    }
                    SourceTypeMode::Legacy => SourceType::Attr,
                },
            })
            .collect();
        records.sort_by(|a, b| a.placeholder.cmp(&b.placeholder));
        records.dedup_by(|a, b| a.placeholder == b.placeholder);
        records
    }
}
