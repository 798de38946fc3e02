//! Fixture capture: validate, sanitize, verify, gate, then write artifacts.

pub mod artifacts;

use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::config::ScrubConfig;
use crate::error::{Result, ScrubError};
use crate::ledger;
use crate::sanitize::{HtmlSanitizer, SanitizationResult};
use crate::secrets::SecretScanner;

use artifacts::{FixturePaths, LedgerDebug, TrackedWriter};

static FIXTURE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_-]*$").expect("valid fixture-name pattern"));

/// Where the raw page comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    /// A saved HTML snapshot on disk.
    HtmlFile(PathBuf),
    /// Fetch the page live. Never supported by this engine.
    FetchUrl(String),
}

/// One fixture-capture request.
#[derive(Debug, Clone)]
pub struct IngestRequest {
    pub source: InputSource,
    pub source_url: String,
    pub fixture: String,
    pub out_fixtures_dir: PathBuf,
    pub raw_imports_root: PathBuf,
    pub policy_version: String,
    pub debug_ledger: bool,
}

impl IngestRequest {
    /// Request with output locations, policy version and debug flag taken from `config`.
    pub fn from_config(
        config: &ScrubConfig,
        source: InputSource,
        source_url: impl Into<String>,
        fixture: impl Into<String>,
    ) -> Self {
        Self {
            source,
            source_url: source_url.into(),
            fixture: fixture.into(),
            out_fixtures_dir: config.fixtures_dir.clone(),
            raw_imports_root: config.raw_imports_root.clone(),
            policy_version: config.policy_version.clone(),
            debug_ledger: config.debug_ledger,
        }
    }
}

/// Orchestrator states. `Aborted` is reachable from every non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestStage {
    Validating,
    Sanitizing,
    DiffChecking,
    SecretScanning,
    Writing,
    Done,
    Aborted,
}

impl std::fmt::Display for IngestStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IngestStage::Validating => write!(f, "validating"),
            IngestStage::Sanitizing => write!(f, "sanitizing"),
            IngestStage::DiffChecking => write!(f, "diff-checking"),
            IngestStage::SecretScanning => write!(f, "secret-scanning"),
            IngestStage::Writing => write!(f, "writing"),
            IngestStage::Done => write!(f, "done"),
            IngestStage::Aborted => write!(f, "aborted"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InputSummary {
    pub html_path: PathBuf,
    pub source_url: String,
    pub fixture: String,
    pub raw_sha256: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactPaths {
    pub raw_archive_path: PathBuf,
    pub sanitized_html_path: PathBuf,
    pub map_path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ledger_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestStats {
    pub replacements: usize,
    pub ledger_nodes_raw: usize,
    pub ledger_nodes_sanitized: usize,
    pub diff_warnings: usize,
}

/// Summary of a successful ingest.
#[derive(Debug, Clone, Serialize)]
pub struct IngestReport {
    pub ok: bool,
    pub input: InputSummary,
    pub artifacts: ArtifactPaths,
    pub stats: IngestStats,
}

type Clock = Box<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Runs one request end to end. Holds no state between runs.
pub struct Ingestor {
    sanitizer: HtmlSanitizer,
    scanner: SecretScanner,
    clock: Clock,
}

impl Ingestor {
    pub fn new(config: &ScrubConfig) -> Result<Self> {
        Ok(Self {
            sanitizer: HtmlSanitizer::new(&config.sanitize),
            scanner: SecretScanner::with_extra_patterns(&config.secrets.extra_patterns)?,
            clock: Box::new(Utc::now),
        })
    }

    /// Pin the clock used for raw-archive timestamps.
    pub fn with_clock(mut self, clock: impl Fn() -> DateTime<Utc> + Send + Sync + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn ingest(&self, request: &IngestRequest) -> Result<IngestReport> {
        let mut stage = IngestStage::Validating;
        let outcome = self.run(request, &mut stage);
        match &outcome {
            Ok(report) => tracing::info!(
                fixture = %request.fixture,
                replacements = report.stats.replacements,
                nodes = report.stats.ledger_nodes_raw,
                "fixture written"
            ),
            Err(e) => tracing::warn!(
                fixture = %request.fixture,
                stage = %stage,
                kind = %e.kind(),
                "ingest {}: {}",
                IngestStage::Aborted,
                e
            ),
        }
        outcome
    }

    fn run(&self, request: &IngestRequest, stage: &mut IngestStage) -> Result<IngestReport> {
        let advance = |stage: &mut IngestStage, next: IngestStage| {
            tracing::debug!(fixture = %request.fixture, from = %stage, to = %next, "ingest stage");
            *stage = next;
        };

        validate_source_url(&request.source_url)?;
        validate_fixture_name(&request.fixture)?;
        let html_path = match &request.source {
            InputSource::HtmlFile(path) => path.clone(),
            InputSource::FetchUrl(_) => {
                return Err(ScrubError::UnsupportedInputMode {
                    mode: "url".into(),
                })
            }
        };
        let raw_html = read_html(&html_path)?;

        advance(stage, IngestStage::Sanitizing);
        let result = self.sanitize_guarded(&raw_html, request)?;

        advance(stage, IngestStage::DiffChecking);
        let diff = ledger::diff(&result.raw_ledger, &result.sanitized_ledger);
        for warning in &diff.warnings {
            tracing::warn!(fixture = %request.fixture, "{warning}");
        }
        if !diff.ok {
            return Err(ScrubError::LedgerDiff {
                violations: diff.violation_messages(),
            });
        }

        advance(stage, IngestStage::SecretScanning);
        let map_json = format!("{}\n", serde_json::to_string_pretty(&result.placeholders)?);
        self.gate("sanitized html", &result.sanitized_html)?;
        self.gate("placeholder map", &map_json)?;

        advance(stage, IngestStage::Writing);
        let paths = FixturePaths::new(&request.out_fixtures_dir, &request.fixture);
        paths.preflight(request.debug_ledger)?;

        let timestamp = artifacts::archive_timestamp((self.clock)());
        let raw_archive_path = artifacts::write_raw_archive(
            &request.raw_imports_root,
            &timestamp,
            &request.fixture,
            &raw_html,
        )?;

        let ledger_json = if request.debug_ledger {
            let dump = LedgerDebug {
                policy_version: &request.policy_version,
                raw: &result.raw_ledger,
                sanitized: &result.sanitized_ledger,
                diff: &diff,
            };
            Some(format!("{}\n", serde_json::to_string_pretty(&dump)?))
        } else {
            None
        };

        let mut files: Vec<(&Path, &str)> = vec![
            (paths.html.as_path(), result.sanitized_html.as_str()),
            (paths.map.as_path(), map_json.as_str()),
        ];
        if let Some(json) = &ledger_json {
            files.push((paths.ledger.as_path(), json.as_str()));
        }
        TrackedWriter::new().write_all(&files)?;

        advance(stage, IngestStage::Done);
        Ok(IngestReport {
            ok: true,
            input: InputSummary {
                html_path,
                source_url: request.source_url.clone(),
                fixture: request.fixture.clone(),
                raw_sha256: format!("{:x}", Sha256::digest(raw_html.as_bytes())),
            },
            artifacts: ArtifactPaths {
                raw_archive_path,
                sanitized_html_path: paths.html.clone(),
                map_path: paths.map.clone(),
                ledger_path: request.debug_ledger.then(|| paths.ledger.clone()),
            },
            stats: IngestStats {
                replacements: result.placeholders.len(),
                ledger_nodes_raw: result.raw_ledger.len(),
                ledger_nodes_sanitized: result.sanitized_ledger.len(),
                diff_warnings: diff.warnings.len(),
            },
        })
    }

    /// Run the sanitizer, re-tagging anything unexpected (panics included) as a
    /// sanitize failure. URL errors keep their own tag.
    fn sanitize_guarded(&self, raw_html: &str, request: &IngestRequest) -> Result<SanitizationResult> {
        let attempt = panic::catch_unwind(AssertUnwindSafe(|| {
            self.sanitizer
                .sanitize(raw_html, &request.source_url, &request.policy_version)
        }));
        match attempt {
            Ok(Ok(result)) => Ok(result),
            Ok(Err(e @ ScrubError::InvalidSourceUrl { .. })) => Err(e),
            Ok(Err(e)) => Err(ScrubError::Sanitize {
                reason: e.to_string(),
            }),
            Err(payload) => {
                let reason = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "sanitizer panicked".to_string());
                Err(ScrubError::Sanitize { reason })
            }
        }
    }

    fn gate(&self, artifact: &str, text: &str) -> Result<()> {
        let patterns = self.scanner.scan(text);
        if patterns.is_empty() {
            return Ok(());
        }
        Err(ScrubError::SecretPattern {
            artifact: artifact.to_string(),
            patterns,
        })
    }
}

pub fn validate_source_url(source_url: &str) -> Result<()> {
    url::Url::parse(source_url)
        .map(|_| ())
        .map_err(|e| ScrubError::InvalidSourceUrl {
            url: source_url.to_string(),
            reason: e.to_string(),
        })
}

pub fn validate_fixture_name(name: &str) -> Result<()> {
    if FIXTURE_NAME.is_match(name) {
        Ok(())
    } else {
        Err(ScrubError::InvalidFixtureName {
            name: name.to_string(),
        })
    }
}

fn read_html(path: &Path) -> Result<String> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ScrubError::HtmlNotFound {
                path: path.to_path_buf(),
            })
        }
        Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
            return Err(ScrubError::InvalidHtml {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })
        }
        Err(e) => return Err(e.into()),
    };
    if contents.trim().is_empty() {
        return Err(ScrubError::HtmlEmpty {
            path: path.to_path_buf(),
        });
    }
    Ok(contents)
}
