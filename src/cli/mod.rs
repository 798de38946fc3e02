pub mod ingest;
pub mod ledger;
pub mod scan;

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

use crate::config::ScrubConfig;
use crate::error::Result;

#[derive(Parser)]
#[command(name = "fixture-scrub")]
#[command(about = "Turn captured web pages into redacted, structure-checked test fixtures", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Config file (default: .fixture-scrub/policy.yml in the current directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sanitize a raw HTML snapshot into a fixture
    Ingest(ingest::IngestArgs),

    /// Scan files or directories for secret-shaped strings
    Scan {
        /// Files or directories to scan
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Print the structure ledger of an HTML file
    Ledger {
        /// HTML file to index
        #[arg(long)]
        html: PathBuf,

        /// Policy version stamped on the ledger
        #[arg(long)]
        policy_version: Option<String>,
    },
}

impl Cli {
    /// Explicit `--config` if given, else the project config under the current directory.
    pub fn load_config(&self) -> Result<ScrubConfig> {
        match &self.config {
            Some(path) => ScrubConfig::load_from(path),
            None => {
                let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
                ScrubConfig::load_project(&cwd)
            }
        }
    }
}
