//! bibdesk2zotero CLI
//!
//! Reads a BibDesk `.bib` file and writes a copy Zotero 7 can import with
//! attachments linked.

use std::error::Error;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use bibdesk2zotero::{migrate_file, ErrorPolicy, MigrateOptions};
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Migrate a BibDesk BibTeX library to Zotero 7 compatible BibTeX.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory BibDesk attachment paths are relative to.
    #[arg(short = 'd', long, value_name = "DIR")]
    basedir: PathBuf,

    /// Remove `file` fields already present in the source before converting.
    #[arg(long)]
    strip_existing_file: bool,

    /// Write records with undecodable attachments unchanged instead of aborting.
    #[arg(long)]
    keep_going: bool,

    /// Write a JSON summary of the run to this path.
    #[arg(long, value_name = "PATH")]
    report: Option<PathBuf>,

    /// Log every change made to each record.
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors.
    #[arg(short, long)]
    quiet: bool,

    /// BibDesk .bib file to read.
    source: PathBuf,

    /// Where to write the migrated .bib file.
    destination: PathBuf,
}

fn init_logging(cli: &Cli) {
    let default_level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let options = MigrateOptions {
        base_dir: std::path::absolute(&cli.basedir)?,
        strip_existing_file: cli.strip_existing_file,
        on_error: if cli.keep_going {
            ErrorPolicy::SkipRecord
        } else {
            ErrorPolicy::Abort
        },
    };

    let report = migrate_file(&cli.source, &cli.destination, &options)?;

    if let Some(path) = &cli.report {
        fs::write(path, serde_json::to_string_pretty(&report)?)?;
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("bibdesk2zotero: {}", e);
            ExitCode::FAILURE
        }
    }
}
