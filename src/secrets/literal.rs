use aho_corasick::AhoCorasick;

use super::Detector;

/// Literal needle matching via aho-corasick.
pub struct LiteralDetector {
    automaton: Option<AhoCorasick>,
    literals: Vec<(String, String)>,
}

impl LiteralDetector {
    /// Build from `(description, literal)` pairs.
    pub fn new(literals: Vec<(String, String)>) -> Self {
        let automaton = AhoCorasick::new(literals.iter().map(|(_, needle)| needle)).ok();
        Self {
            automaton,
            literals,
        }
    }

    /// Secret-config filenames and key literals that must never reach a fixture.
    pub fn default_literals() -> Vec<(String, String)> {
        [
            ("notionToken key literal", r#""notionToken":"#),
            ("secret config filename .env.local", ".env.local"),
            ("secret config filename secrets.local.json", "secrets.local.json"),
            ("secret config filename notion.secrets.json", "notion.secrets.json"),
            ("secret config filename credentials.json", "credentials.json"),
        ]
        .into_iter()
        .map(|(description, needle)| (description.to_string(), needle.to_string()))
        .collect()
    }
}

impl Detector for LiteralDetector {
    fn detect(&self, text: &str) -> Vec<String> {
        let Some(automaton) = &self.automaton else {
            return Vec::new();
        };
        let mut hit = vec![false; self.literals.len()];
        for mat in automaton.find_overlapping_iter(text) {
            hit[mat.pattern().as_usize()] = true;
        }
        self.literals
            .iter()
            .zip(hit)
            .filter(|(_, hit)| *hit)
            .map(|((description, _), _)| description.clone())
            .collect()
    }

    fn name(&self) -> &str {
        "literal"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notion_token_literal() {
        let detector = LiteralDetector::new(LiteralDetector::default_literals());
        assert_eq!(
            detector.detect(r#"{"notionToken": "x"}"#),
            vec!["notionToken key literal".to_string()]
        );
    }

    #[test]
    fn test_filenames() {
        let detector = LiteralDetector::new(LiteralDetector::default_literals());
        let found = detector.detect("see .env.local and credentials.json");
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn test_no_match() {
        let detector = LiteralDetector::new(LiteralDetector::default_literals());
        assert!(detector.detect("notionToken without quotes").is_empty());
    }

    #[test]
    fn test_empty_table() {
        let detector = LiteralDetector::new(Vec::new());
        assert!(detector.detect("anything").is_empty());
    }
}
