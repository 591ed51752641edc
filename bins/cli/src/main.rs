//! Rejournal command line tool
//!
//! Moves ledger entries of a books snapshot to another journal.
//!
//! # Usage
//!
//! ```bash
//! rejournal <destination-ledger-id> <entry-id>... [--force] [--keep-sequence] [--dry-run]
//! ```
//!
//! Warnings go to stderr, the batch result is printed as JSON on stdout and the
//! snapshot file is rewritten unless `--dry-run` is given.
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: overrides `logging.filter`
//! - `REJOURNAL__SNAPSHOT__PATH`: snapshot file to operate on

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::str::FromStr;

use anyhow::{Context, bail};
use rejournal_core::reassignment::{
    BooksSnapshot, ChangeJournalRequest, JournalChangeService, MemoryBooks, Severity,
};
use rejournal_shared::AppConfig;
use rejournal_shared::types::{LedgerEntryId, LedgerId};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Parsed command line.
struct Args {
    destination: LedgerId,
    entries: Vec<LedgerEntryId>,
    force: bool,
    keep_sequence: bool,
    dry_run: bool,
}

impl Args {
    fn parse(args: impl IntoIterator<Item = String>) -> anyhow::Result<Self> {
        let mut positional = Vec::new();
        let (mut force, mut keep_sequence, mut dry_run) = (false, false, false);

        for arg in args {
            match arg.as_str() {
                "--force" => force = true,
                "--keep-sequence" => keep_sequence = true,
                "--dry-run" => dry_run = true,
                flag if flag.starts_with("--") => bail!("Unknown option: {flag}"),
                _ => positional.push(arg),
            }
        }

        let mut positional = positional.into_iter();
        let Some(destination) = positional.next() else {
            bail!("Usage: rejournal <destination-ledger-id> <entry-id>... [--force] [--keep-sequence] [--dry-run]");
        };
        let destination = LedgerId::from_str(&destination)
            .with_context(|| format!("Invalid ledger id: {destination}"))?;
        let entries = positional
            .map(|id| {
                LedgerEntryId::from_str(&id).with_context(|| format!("Invalid entry id: {id}"))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        Ok(Self {
            destination,
            entries,
            force,
            keep_sequence,
            dry_run,
        })
    }
}

fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;

    // Initialize tracing on stderr; stdout carries the result
    let json = config.logging.json;
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.filter)),
        )
        .with(json.then(|| fmt::layer().json().with_writer(std::io::stderr)))
        .with((!json).then(|| fmt::layer().with_writer(std::io::stderr)))
        .init();

    let args = Args::parse(std::env::args().skip(1))?;

    let path = &config.snapshot.path;
    let file = File::open(path).with_context(|| format!("Failed to open snapshot {path}"))?;
    let snapshot: BooksSnapshot = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse snapshot {path}"))?;
    let books = MemoryBooks::new(snapshot);
    info!(path = %path, "Loaded books snapshot");

    let service = JournalChangeService::over(&books);

    let mut request =
        ChangeJournalRequest::with_defaults(args.entries, Some(args.destination), &config.defaults);
    request.force_change |= args.force;
    if args.keep_sequence {
        request.reset_sequence = false;
    }

    let warnings = service.preview_warnings(
        &request.entry_ids,
        request.destination_ledger_id,
        request.force_change,
    )?;
    for warning in &warnings {
        let label = match warning.severity {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        eprintln!("[{label}] {}", warning.message);
    }

    if args.dry_run {
        return Ok(());
    }

    let result = service.submit(&request)?;
    println!("{}", serde_json::to_string_pretty(&result)?);

    let file = File::create(path).with_context(|| format!("Failed to write snapshot {path}"))?;
    serde_json::to_writer_pretty(BufWriter::new(file), &books.snapshot())?;
    info!(
        path = %path,
        success = result.is_success(),
        "Saved books snapshot"
    );

    Ok(())
}
