use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Coarse shape of an attribute value or text run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueClass {
    Empty,
    PlainText,
    Url,
    LongNumericId,
    TokenLike,
    TimestampLike,
    EmailLike,
    PathLike,
}

impl ValueClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueClass::Empty => "empty",
            ValueClass::PlainText => "plain_text",
            ValueClass::Url => "url",
            ValueClass::LongNumericId => "long_numeric_id",
            ValueClass::TokenLike => "token_like",
            ValueClass::TimestampLike => "timestamp_like",
            ValueClass::EmailLike => "email_like",
            ValueClass::PathLike => "path_like",
        }
    }
}

impl std::fmt::Display for ValueClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered (pattern, class) rules. First match wins; `PlainText` is the fallback.
static RULES: LazyLock<Vec<(Regex, ValueClass)>> = LazyLock::new(|| {
    [
        // Drive-letter path or a single leading slash (`//host` is protocol-relative).
        (r"^(?:[A-Za-z]:\\|/(?:[^/]|$))", ValueClass::PathLike),
        (r"^(?:https?:)?//", ValueClass::Url),
        (r"^[0-9]{9,}$", ValueClass::LongNumericId),
        (
            r"^\d{4}-\d{2}-\d{2}(?:[T ]\d{2}:\d{2}(?::\d{2}(?:\.\d+)?)?(?:Z|[+-]\d{2}:?\d{2})?)?$",
            ValueClass::TimestampLike,
        ),
        (r"^[^\s@]+@[^\s@]+\.[^\s@]+$", ValueClass::EmailLike),
        (r"ntn_[A-Za-z0-9]{8,}|[A-Za-z0-9._\-]{24,}", ValueClass::TokenLike),
    ]
    .into_iter()
    .map(|(pattern, class)| {
        (
            Regex::new(pattern).expect("classifier patterns should compile"),
            class,
        )
    })
    .collect()
});

/// Classify a value. Total and deterministic.
pub fn classify(value: &str) -> ValueClass {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return ValueClass::Empty;
    }
    RULES
        .iter()
        .find(|(re, _)| re.is_match(trimmed))
        .map(|(_, class)| *class)
        .unwrap_or(ValueClass::PlainText)
}
