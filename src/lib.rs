//! Structure-preserving anonymization of captured HTML pages.
//!
//! A raw snapshot goes in; a redacted copy, a placeholder map and a pair of
//! structure ledgers come out. The ledgers prove redaction left the tag and
//! attribute skeleton intact, and a secret-pattern gate blocks any artifact
//! that still looks like it carries credentials.

pub mod classify;
pub mod cli;
pub mod config;
pub mod dom;
pub mod error;
pub mod ingest;
pub mod ledger;
pub mod placeholder;
pub mod sanitize;
pub mod secrets;

pub use classify::{classify, ValueClass};
pub use error::{ErrorKind, Result, ScrubError};
pub use ingest::{IngestReport, IngestRequest, Ingestor, InputSource};
pub use ledger::{LedgerDiff, StructureLedger};
pub use placeholder::{Category, PlaceholderRecord, PlaceholderStore, SourceType};
pub use sanitize::{HtmlSanitizer, SanitizationResult};
pub use secrets::SecretScanner;
