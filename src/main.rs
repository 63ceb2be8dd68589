//! target-postgres: read tap messages from stdin, load rows into
//! PostgreSQL.

use std::io::{self, BufRead};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};

use target_postgres::{logging, Config, Message, Target, TargetError, WriteOutcome};

#[derive(Parser, Debug)]
#[command(
    name = "target-postgres",
    version,
    about = "Load tap SCHEMA/RECORD messages into PostgreSQL"
)]
struct Cli {
    /// Path to the JSON connection config; defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level when RUST_LOG is not set.
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(&cli.log_level);

    let config = match &cli.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => Config::default(),
    };

    let mut target = Target::connect(&config).context("connecting to postgres")?;
    run(&mut target, io::stdin().lock())
}

/// Drive the message loop. Message-scoped errors (bad shape, unknown
/// type, record before schema) are logged and skipped; store errors
/// abort the run.
fn run(target: &mut Target, input: impl BufRead) -> anyhow::Result<()> {
    let mut inserted = 0u64;
    let mut updated = 0u64;
    let mut skipped = 0u64;

    for (index, line) in input.lines().enumerate() {
        let line = line.context("reading stdin")?;
        if line.trim().is_empty() {
            continue;
        }

        let outcome = Message::parse(&line).and_then(|message| target.handle_message(message));
        match outcome {
            Ok(Some(WriteOutcome::Inserted)) => inserted += 1,
            Ok(Some(WriteOutcome::Updated)) => updated += 1,
            Ok(None) => {}
            Err(err @ (TargetError::Connection(_) | TargetError::Store { .. })) => {
                return Err(err).with_context(|| format!("message {}", index + 1));
            }
            Err(err) => {
                error!(line = index + 1, %err, "skipping message");
                skipped += 1;
            }
        }
    }

    info!(inserted, updated, skipped, "stream complete");
    Ok(())
}
