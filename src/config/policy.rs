use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Result, ScrubError};

/// Top-level fixture-scrub configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrubConfig {
    /// Tracked destination for sanitized fixtures. Default: `fixtures`.
    #[serde(default = "default_fixtures_dir")]
    pub fixtures_dir: PathBuf,

    /// Untracked root for raw archives. Default: `.local/raw-imports`.
    #[serde(default = "default_raw_imports_root")]
    pub raw_imports_root: PathBuf,

    /// Policy version stamped on ledgers. Default: `v1`.
    #[serde(default = "default_policy_version")]
    pub policy_version: String,

    /// Write `<fixture>.ledger.json` next to the fixture.
    #[serde(default)]
    pub debug_ledger: bool,

    #[serde(default)]
    pub sanitize: SanitizePolicy,

    #[serde(default)]
    pub secrets: SecretsPolicy,
}

fn default_fixtures_dir() -> PathBuf {
    PathBuf::from("fixtures")
}
fn default_raw_imports_root() -> PathBuf {
    PathBuf::from(".local").join("raw-imports")
}
fn default_policy_version() -> String {
    "v1".into()
}

impl Default for ScrubConfig {
    fn default() -> Self {
        Self {
            fixtures_dir: default_fixtures_dir(),
            raw_imports_root: default_raw_imports_root(),
            policy_version: default_policy_version(),
            debug_ledger: false,
            sanitize: SanitizePolicy::default(),
            secrets: SecretsPolicy::default(),
        }
    }
}

impl ScrubConfig {
    /// Load config from a YAML file. Returns default if file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        serde_yaml::from_str(&contents).map_err(|e| ScrubError::ConfigParse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Load config from the project root. Checks `.fixture-scrub/policy.yml`.
    pub fn load_project(project_root: &Path) -> Result<Self> {
        Self::load_from(&super::project_config_path(project_root))
    }
}

/// Additions to the built-in redaction tables. Entries only extend them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SanitizePolicy {
    /// Query keys replaced as tracking parameters, on top of `utm_*`, `spm`, ...
    #[serde(default)]
    pub extra_tracking_keys: Vec<String>,

    /// Capitalized words never treated as part of a person name.
    #[serde(default)]
    pub extra_person_stopwords: Vec<String>,

    /// Tags whose literal text nodes are rewritten, on top of `p`, `div`, ...
    #[serde(default)]
    pub extra_text_containers: Vec<String>,
}

/// Additions to the secret gate.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SecretsPolicy {
    /// Extra regex patterns; a match blocks the write.
    #[serde(default)]
    pub extra_patterns: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_yields_defaults() {
        let tmp = tempfile::TempDir::new().unwrap();
        let config = ScrubConfig::load_project(tmp.path()).unwrap();
        assert_eq!(config.fixtures_dir, PathBuf::from("fixtures"));
        assert_eq!(config.policy_version, "v1");
        assert!(!config.debug_ledger);
    }

    #[test]
    fn test_partial_yaml() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("policy.yml");
        std::fs::write(
            &path,
            "policy_version: v2\nsanitize:\n  extra_tracking_keys: [share_id]\n",
        )
        .unwrap();
        let config = ScrubConfig::load_from(&path).unwrap();
        assert_eq!(config.policy_version, "v2");
        assert_eq!(config.sanitize.extra_tracking_keys, vec!["share_id"]);
        assert!(config.secrets.extra_patterns.is_empty());
        assert_eq!(config.raw_imports_root, PathBuf::from(".local/raw-imports"));
    }

    #[test]
    fn test_bad_yaml_is_config_parse_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("policy.yml");
        std::fs::write(&path, "debug_ledger: [not, a, bool]\n").unwrap();
        let err = ScrubConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, ScrubError::ConfigParse { .. }));
    }
}
