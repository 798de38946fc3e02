use std::path::PathBuf;

use clap::Args;

use crate::config::ScrubConfig;
use crate::error::Result;
use crate::ingest::{IngestRequest, Ingestor, InputSource};

#[derive(Args, Debug)]
pub struct IngestArgs {
    /// Saved HTML snapshot to sanitize
    #[arg(long, conflicts_with = "url", required_unless_present = "url")]
    pub html: Option<PathBuf>,

    /// Fetch the page instead of reading a file (not supported)
    #[arg(long)]
    pub url: Option<String>,

    /// URL the snapshot was captured from
    #[arg(long)]
    pub source_url: String,

    /// Fixture name (letters, digits, `_`, `-`; must start alphanumeric)
    #[arg(long)]
    pub fixture: String,

    /// Tracked fixtures directory (default from config: fixtures)
    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    /// Untracked raw archive root (default from config: .local/raw-imports)
    #[arg(long)]
    pub raw_root: Option<PathBuf>,

    /// Policy version stamped on ledgers (default from config: v1)
    #[arg(long)]
    pub policy_version: Option<String>,

    /// Also write <fixture>.ledger.json
    #[arg(long)]
    pub debug_ledger: bool,
}

impl IngestArgs {
    /// Merge flags over config values.
    pub fn to_request(&self, config: &ScrubConfig) -> IngestRequest {
        let source = match (&self.html, &self.url) {
            (Some(path), _) => InputSource::HtmlFile(path.clone()),
            (None, Some(url)) => InputSource::FetchUrl(url.clone()),
            (None, None) => InputSource::HtmlFile(PathBuf::new()),
        };
        let mut request =
            IngestRequest::from_config(config, source, &self.source_url, &self.fixture);
        if let Some(dir) = &self.out_dir {
            request.out_fixtures_dir = dir.clone();
        }
        if let Some(root) = &self.raw_root {
            request.raw_imports_root = root.clone();
        }
        if let Some(version) = &self.policy_version {
            request.policy_version = version.clone();
        }
        request.debug_ledger |= self.debug_ledger;
        request
    }
}

/// Run one ingest and print the summary as JSON on stdout.
pub fn run(args: &IngestArgs, config: &ScrubConfig) -> Result<()> {
    let request = args.to_request(config);
    let report = Ingestor::new(config)?.ingest(&request)?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    eprintln!(
        "fixture-scrub: wrote {} ({} placeholder(s), {} ledger node(s), {} warning(s))",
        report.artifacts.sanitized_html_path.display(),
        report.stats.replacements,
        report.stats.ledger_nodes_raw,
        report.stats.diff_warnings,
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::parse_from([
            "fixture-scrub",
            "ingest",
            "--html",
            "page.html",
            "--source-url",
            "https://example.com/",
            "--fixture",
            "page",
            "--out-dir",
            "out",
            "--policy-version",
            "v2",
        ]);
        let Commands::Ingest(args) = cli.command else {
            panic!("expected ingest");
        };
        let request = args.to_request(&ScrubConfig::default());
        assert_eq!(request.source, InputSource::HtmlFile(PathBuf::from("page.html")));
        assert_eq!(request.out_fixtures_dir, PathBuf::from("out"));
        assert_eq!(request.raw_imports_root, PathBuf::from(".local/raw-imports"));
        assert_eq!(request.policy_version, "v2");
        assert!(!request.debug_ledger);
    }

    #[test]
    fn test_url_mode_maps_to_fetch_source() {
        let cli = Cli::parse_from([
            "fixture-scrub",
            "ingest",
            "--url",
            "https://example.com/",
            "--source-url",
            "https://example.com/",
            "--fixture",
            "page",
        ]);
        let Commands::Ingest(args) = cli.command else {
            panic!("expected ingest");
        };
        let request = args.to_request(&ScrubConfig::default());
        assert!(matches!(request.source, InputSource::FetchUrl(_)));
    }

    #[test]
    fn test_html_and_url_conflict() {
        let parsed = Cli::try_parse_from([
            "fixture-scrub",
            "ingest",
            "--html",
            "a.html",
            "--url",
            "https://example.com/",
            "--source-url",
            "https://example.com/",
            "--fixture",
            "page",
        ]);
        assert!(parsed.is_err());
    }
}
