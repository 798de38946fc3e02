use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::placeholder::Category;

use super::{ScalarLayer, ScrubContext};

static CAPITALIZED_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\p{Lu}\p{Ll}+\b").expect("valid capitalized-word pattern"));

/// Longest run of capitalized words still treated as a name.
const MAX_NAME_WORDS: usize = 4;

/// Capitalized words that are never part of a name.
const STOPWORDS: &[&str] = &[
    "A", "About", "All", "An", "And", "Answer", "Answers", "Article", "At", "Author", "By",
    "Comment", "Comments", "Edit", "Follow", "For", "From", "Home", "In", "Like", "Login", "More",
    "Name", "New", "Next", "Of", "On", "Or", "Posted", "Previous", "Question", "Read", "Reply",
    "Search", "Share", "Sign", "The", "This", "To", "Updated", "User", "Username", "With",
];

/// Layers d/e: replace capitalized name-like runs in person/author/user values.
///
/// Only active when the context is marked personish. A run is 1 to
/// [`MAX_NAME_WORDS`] consecutive capitalized words separated by spaces;
/// stopwords and words glued to `.`, `_`, `-` or alphanumerics break runs
/// and are never replaced.
pub struct PersonLayer {
    stopwords: HashSet<String>,
}

impl PersonLayer {
    pub fn new(extra_stopwords: &[String]) -> Self {
        let stopwords = STOPWORDS
            .iter()
            .map(|word| word.to_string())
            .chain(extra_stopwords.iter().cloned())
            .collect();
        Self { stopwords }
    }

    /// Byte spans of name-like runs in `input`.
    fn name_spans(&self, input: &str) -> Vec<(usize, usize)> {
        let mut spans = Vec::new();
        let mut current: Option<(usize, usize, usize)> = None;

        for word in CAPITALIZED_WORD.find_iter(input) {
            if self.stopwords.contains(word.as_str())
                || is_embedded(input, word.start(), word.end())
            {
                if let Some(run) = current.take() {
                    spans.push(run);
                }
                continue;
            }
            current = match current {
                Some((start, end, count)) if is_space_gap(&input[end..word.start()]) => {
                    Some((start, word.end(), count + 1))
                }
                Some(run) => {
                    spans.push(run);
                    Some((word.start(), word.end(), 1))
                }
                None => Some((word.start(), word.end(), 1)),
            };
        }
        spans.extend(current);

        spans
            .into_iter()
            .filter(|&(_, _, count)| count <= MAX_NAME_WORDS)
            .map(|(start, end, _)| (start, end))
            .collect()
    }
}

impl Default for PersonLayer {
    fn default() -> Self {
        Self::new(&[])
    }
}

/// A word glued to a slug or identifier (`Jane-doe`, `Jane.Doe`) is not a name.
fn is_embedded(input: &str, start: usize, end: usize) -> bool {
    let glued = |c: char| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-');
    input[..start].chars().next_back().is_some_and(glued)
        || input[end..].chars().next().is_some_and(glued)
}

fn is_space_gap(gap: &str) -> bool {
    !gap.is_empty() && gap.chars().all(|c| c == ' ' || c == '\t')
}

impl ScalarLayer for PersonLayer {
    fn apply(&self, input: &str, ctx: &mut ScrubContext<'_>) -> String {
        if !ctx.personish {
            return input.to_string();
        }
        let spans = self.name_spans(input);
        if spans.is_empty() {
            return input.to_string();
        }

        let mut out = String::with_capacity(input.len());
        let mut last = 0;
        for (start, end) in spans {
            out.push_str(&input[last..start]);
            out.push_str(&ctx.store.next(Category::Person, &input[start..end], ctx.origin));
            last = end;
        }
        out.push_str(&input[last..]);
        out
    }

    fn name(&self) -> &str {
        "person"
    }
}
