//! Pre-write gate: refuses artifacts that still look like they carry credentials.

pub mod literal;
pub mod pattern;

use crate::error::Result;

/// A single detection layer.
pub trait Detector: Send + Sync {
    /// Descriptions of every pattern that matched `text`, in table order.
    fn detect(&self, text: &str) -> Vec<String>;

    /// Name of this detector (for logging/debugging).
    fn name(&self) -> &str;
}

/// Runs every detector and reports each matched pattern once.
pub struct SecretScanner {
    detectors: Vec<Box<dyn Detector>>,
}

impl SecretScanner {
    /// Built-in literal and regex tables.
    pub fn default_scanner() -> Self {
        Self {
            detectors: vec![
                Box::new(literal::LiteralDetector::new(
                    literal::LiteralDetector::default_literals(),
                )),
                Box::new(
                    pattern::PatternDetector::new(pattern::PatternDetector::default_patterns())
                        .expect("default secret patterns should compile"),
                ),
            ],
        }
    }

    /// Built-in tables plus extra regex patterns (described by their source text).
    pub fn with_extra_patterns(extra: &[String]) -> Result<Self> {
        let mut scanner = Self::default_scanner();
        if !extra.is_empty() {
            let patterns = extra
                .iter()
                .map(|p| (format!("custom pattern {p}"), p.clone()))
                .collect();
            scanner
                .detectors
                .push(Box::new(pattern::PatternDetector::new(patterns)?));
        }
        Ok(scanner)
    }

    /// Create a scanner from custom detectors.
    pub fn new(detectors: Vec<Box<dyn Detector>>) -> Self {
        Self { detectors }
    }

    pub fn scan(&self, text: &str) -> Vec<String> {
        let mut found: Vec<String> = Vec::new();
        for detector in &self.detectors {
            for description in detector.detect(text) {
                if !found.contains(&description) {
                    found.push(description);
                }
            }
        }
        found
    }
}

impl Default for SecretScanner {
    fn default() -> Self {
        Self::default_scanner()
    }
}
