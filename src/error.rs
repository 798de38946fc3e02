use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ScrubError {
    #[error("html input not found: {path}")]
    HtmlNotFound { path: PathBuf },

    #[error("html input is empty: {path}")]
    HtmlEmpty { path: PathBuf },

    #[error("html input is not readable text: {path}: {reason}")]
    InvalidHtml { path: PathBuf, reason: String },

    #[error("invalid source url: {url}: {reason}")]
    InvalidSourceUrl { url: String, reason: String },

    #[error("invalid fixture name: {name}")]
    InvalidFixtureName { name: String },

    #[error("unsupported input mode: {mode}")]
    UnsupportedInputMode { mode: String },

    #[error("sanitize pipeline failed: {reason}")]
    Sanitize { reason: String },

    #[error("ledger diff failed: {}", violations.join("; "))]
    LedgerDiff { violations: Vec<String> },

    #[error("secret pattern detected in {artifact}: {}", patterns.join(", "))]
    SecretPattern {
        artifact: String,
        patterns: Vec<String>,
    },

    #[error("target already exists: {path}")]
    TargetExists { path: PathBuf },

    #[error("invalid policy: {reason}")]
    InvalidPolicy { reason: String },

    #[error("config parse error in {path}: {reason}")]
    ConfigParse { path: PathBuf, reason: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Stable, string-tagged error classes callers can branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    HtmlNotFound,
    InvalidHtmlInput,
    InvalidSourceUrl,
    InvalidFixtureName,
    UnsupportedInputMode,
    SanitizeFailed,
    LedgerDiffFailed,
    SecretPatternDetected,
    TargetExists,
    InvalidPolicy,
    ConfigParse,
    Io,
    Json,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::HtmlNotFound => "html_not_found",
            ErrorKind::InvalidHtmlInput => "invalid_html_input",
            ErrorKind::InvalidSourceUrl => "invalid_source_url",
            ErrorKind::InvalidFixtureName => "invalid_fixture_name",
            ErrorKind::UnsupportedInputMode => "unsupported_input_mode",
            ErrorKind::SanitizeFailed => "sanitize_failed",
            ErrorKind::LedgerDiffFailed => "ledger_diff_failed",
            ErrorKind::SecretPatternDetected => "secret_pattern_detected",
            ErrorKind::TargetExists => "target_exists",
            ErrorKind::InvalidPolicy => "invalid_policy",
            ErrorKind::ConfigParse => "config_parse",
            ErrorKind::Io => "io",
            ErrorKind::Json => "json",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ScrubError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ScrubError::HtmlNotFound { .. } => ErrorKind::HtmlNotFound,
            ScrubError::HtmlEmpty { .. } | ScrubError::InvalidHtml { .. } => {
                ErrorKind::InvalidHtmlInput
            }
            ScrubError::InvalidSourceUrl { .. } => ErrorKind::InvalidSourceUrl,
            ScrubError::InvalidFixtureName { .. } => ErrorKind::InvalidFixtureName,
            ScrubError::UnsupportedInputMode { .. } => ErrorKind::UnsupportedInputMode,
            ScrubError::Sanitize { .. } => ErrorKind::SanitizeFailed,
            ScrubError::LedgerDiff { .. } => ErrorKind::LedgerDiffFailed,
            ScrubError::SecretPattern { .. } => ErrorKind::SecretPatternDetected,
            ScrubError::TargetExists { .. } => ErrorKind::TargetExists,
            ScrubError::InvalidPolicy { .. } => ErrorKind::InvalidPolicy,
            ScrubError::ConfigParse { .. } => ErrorKind::ConfigParse,
            ScrubError::Io(_) => ErrorKind::Io,
            ScrubError::Json(_) => ErrorKind::Json,
        }
    }
}

pub type Result<T> = std::result::Result<T, ScrubError>;
