use std::path::Path;

use crate::error::{Result, ScrubError};
use crate::ledger::StructureLedger;

/// Print the structure ledger of an HTML file as JSON.
pub fn run(html: &Path, policy_version: &str) -> Result<()> {
    let contents = std::fs::read_to_string(html).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ScrubError::HtmlNotFound {
            path: html.to_path_buf(),
        },
        std::io::ErrorKind::InvalidData => ScrubError::InvalidHtml {
            path: html.to_path_buf(),
            reason: e.to_string(),
        },
        _ => e.into(),
    })?;
    let ledger = StructureLedger::from_html(&contents, policy_version);
    println!("{}", serde_json::to_string_pretty(&ledger)?);
    eprintln!("fixture-scrub: {} node(s)", ledger.len());
    Ok(())
}
