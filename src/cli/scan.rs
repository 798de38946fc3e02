use std::path::Path;

use crate::error::Result;
use crate::secrets::SecretScanner;

/// Secret scan over files and directories. Returns the number of findings.
pub fn run(scanner: &SecretScanner, paths: &[impl AsRef<Path>]) -> Result<usize> {
    let mut total_findings = 0;

    for path in paths {
        let path = path.as_ref();
        if path.is_dir() {
            eprintln!("fixture-scrub: scanning directory {}...", path.display());
            total_findings += scan_dir(scanner, path)?;
        } else if path.is_file() {
            eprintln!("fixture-scrub: scanning file {}...", path.display());
            total_findings += scan_file(scanner, path)?;
        } else {
            eprintln!("fixture-scrub: path not found: {}", path.display());
            total_findings += 1;
        }
    }

    if total_findings > 0 {
        eprintln!(
            "\nfixture-scrub: {} potential secret(s) found.",
            total_findings
        );
    } else {
        eprintln!("fixture-scrub: scan clean -- no secrets detected.");
    }

    Ok(total_findings)
}

/// Scan a single file. Returns the number of findings.
fn scan_file(scanner: &SecretScanner, path: &Path) -> Result<usize> {
    let contents = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(_) => return Ok(0), // Skip binary/unreadable files
    };

    let mut findings = 0;

    for (line_num, line) in contents.lines().enumerate() {
        for description in scanner.scan(line) {
            findings += 1;
            eprintln!("  {}:{}: {}", path.display(), line_num + 1, description);
        }
    }

    Ok(findings)
}

/// Scan a directory recursively. Returns the number of findings.
fn scan_dir(scanner: &SecretScanner, dir: &Path) -> Result<usize> {
    let mut total = 0;

    let mut entries: Vec<_> = std::fs::read_dir(dir)?.collect::<std::io::Result<_>>()?;
    entries.sort_by_key(|entry| entry.path());

    for entry in entries {
        let path = entry.path();

        if path.is_dir() {
            // Skip hidden directories
            if path
                .file_name()
                .is_some_and(|n| n.to_string_lossy().starts_with('.'))
            {
                continue;
            }
            total += scan_dir(scanner, &path)?;
        } else if path.is_file() {
            total += scan_file(scanner, &path)?;
        }
    }

    Ok(total)
}
