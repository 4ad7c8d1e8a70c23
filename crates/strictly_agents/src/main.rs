//! Strictly Agents - CLI
//!
//! Runs chess sessions through the umpire: a scripted demo, or an
//! interactive game fed from stdin.

#![warn(missing_docs)]

use anyhow::Result;
use clap::Parser;
use std::path::Path;
use std::sync::Arc;
use strictly_agents::cli::{Cli, Command, DEMO_SCRIPT, ends_game, parse_submission};
use strictly_agents::{DEFAULT_MAILBOX_CAPACITY, DriverHandle, SessionDriver, UmpireConfig};
use strictly_chess::{Chess, MoveLogSink, render_board};
use strictly_umpire::{Participant, Session, SubmitError, Submission};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinHandle;
use tracing::{info, instrument, warn};
use tracing_subscriber::EnvFilter;

type DriverTask = JoinHandle<Session<Chess>>;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Demo { config } => run_demo(config.as_deref()).await,
        Command::Play { config } => run_play(config.as_deref()).await,
    }
}

/// Prints the ruling for one proposal.
fn report(proposer: Participant, text: &str, ruling: &Result<Submission, SubmitError>) {
    match ruling {
        Ok(submission) => println!(
            "{}: {} -> {} ({})",
            proposer,
            text,
            submission.token(),
            submission.status()
        ),
        Err(e) => println!("{}: {} -> rejected: {}", proposer, text, e),
    }
}

/// Starts a driver for a configured umpire that keeps a move log.
fn start(config: Option<&Path>) -> Result<(DriverHandle, DriverTask, Arc<MoveLogSink>)> {
    let config = UmpireConfig::load(config)?;
    let log = Arc::new(MoveLogSink::new());
    let umpire = config.build_umpire()?.with_sink(log.clone());
    let (handle, join) = SessionDriver::spawn(Arc::new(umpire), DEFAULT_MAILBOX_CAPACITY);
    Ok((handle, join, log))
}

/// Prints the final board, move log and result.
async fn finish(handle: DriverHandle, join: DriverTask, log: Arc<MoveLogSink>) -> Result<()> {
    drop(handle);
    let session = join.await?;

    println!();
    println!("{}", render_board(session.state()));
    println!();
    for line in log.lines(session.id()) {
        println!("{}", line);
    }
    println!("Status: {}", session.status());
    Ok(())
}

/// Runs the scripted opening exchange.
#[instrument(skip(config))]
async fn run_demo(config: Option<&Path>) -> Result<()> {
    info!("Starting demo game");
    let (handle, join, log) = start(config)?;

    for (proposer, text) in DEMO_SCRIPT {
        let ruling = handle.submit(proposer, text).await?;
        report(proposer, text, &ruling);
    }

    finish(handle, join, log).await
}

/// Runs a game fed line by line from stdin.
#[instrument(skip(config))]
async fn run_play(config: Option<&Path>) -> Result<()> {
    info!("Starting interactive game");
    let (handle, join, log) = start(config)?;
    println!("Enter moves as \"A: text\" or \"B: text\"; end with EOF.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let Some((proposer, text)) = parse_submission(&line) else {
            warn!(line = %line, "Unrecognized input");
            println!("Expected \"A: text\" or \"B: text\"");
            continue;
        };
        let ruling = handle.submit(proposer, text).await?;
        report(proposer, text, &ruling);

        if ends_game(&ruling) {
            info!("Game over");
            break;
        }
    }

    finish(handle, join, log).await
}
