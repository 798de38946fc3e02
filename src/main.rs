use std::process::ExitCode;

use clap::Parser;
use tracing::Level;

use fixture_scrub::cli::{self, Cli, Commands};
use fixture_scrub::secrets::SecretScanner;
use fixture_scrub::ScrubError;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            match e.downcast_ref::<ScrubError>() {
                Some(scrub) => eprintln!("fixture-scrub: [{}] {}", scrub.kind(), scrub),
                None => eprintln!("fixture-scrub: {e:#}"),
            }
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: &Cli) -> anyhow::Result<ExitCode> {
    let config = cli.load_config()?;

    match &cli.command {
        Commands::Ingest(args) => {
            cli::ingest::run(args, &config)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Scan { paths } => {
            let scanner = SecretScanner::with_extra_patterns(&config.secrets.extra_patterns)?;
            let findings = cli::scan::run(&scanner, paths)?;
            Ok(if findings > 0 {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            })
        }
        Commands::Ledger {
            html,
            policy_version,
        } => {
            let version = policy_version.as_deref().unwrap_or(&config.policy_version);
            cli::ledger::run(html, version)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
