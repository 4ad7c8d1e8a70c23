//! Command-line interface for strictly_agents.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use strictly_umpire::{Participant, SubmitError, Submission};

/// Strictly Agents - chess umpire for two participants
#[derive(Parser, Debug)]
#[command(name = "strictly_agents")]
#[command(about = "Adjudicates free-form chess moves between two participants", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Play the scripted opening exchange and print the result
    Demo {
        /// Path to umpire config file (defaults apply when omitted)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Read submissions from stdin, one per line, as "A: text" or "B: text"
    Play {
        /// Path to umpire config file (defaults apply when omitted)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

/// Proposals the demo submits, in order.
pub const DEMO_SCRIPT: [(Participant, &str); 4] = [
    (Participant::A, "Play e2e4"),
    (Participant::B, "Play e7e5"),
    (Participant::A, "Play g1f3"),
    (Participant::B, "Play b8c6"),
];

/// Splits an input line of the form `A: text` into proposer and text.
///
/// Returns `None` for lines without a known participant prefix or with no
/// text after it.
pub fn parse_submission(line: &str) -> Option<(Participant, &str)> {
    let (who, text) = line.split_once(':')?;
    let proposer = who.trim().parse::<Participant>().ok()?;
    let text = text.trim();
    (!text.is_empty()).then_some((proposer, text))
}

/// Returns true once a ruling means no further submissions can succeed.
///
/// A terminal commit carries its status, so no extra round-trip to the
/// driver is needed.
pub fn ends_game(ruling: &Result<Submission, SubmitError>) -> bool {
    match ruling {
        Ok(submission) => submission.status().is_terminal(),
        Err(SubmitError::SessionTerminated { .. }) => true,
        Err(e) => !e.is_recoverable(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strictly_chess::{ChessOracle, NotationResolver};
    use strictly_umpire::{GameStatus, Umpire};

    #[test]
    fn test_parse_submission() {
        assert_eq!(
            parse_submission("A: Play e2e4"),
            Some((Participant::A, "Play e2e4"))
        );
        assert_eq!(
            parse_submission("  b :knight to f6 "),
            Some((Participant::B, "knight to f6"))
        );
        assert_eq!(parse_submission("C: e2e4"), None);
        assert_eq!(parse_submission("e2e4"), None);
        assert_eq!(parse_submission("A:   "), None);
    }

    #[test]
    fn test_cli_parses_play_with_config() {
        let cli = Cli::try_parse_from(["strictly_agents", "play", "--config", "umpire.toml"])
            .unwrap();
        match cli.command {
            Command::Play { config } => assert_eq!(config, Some(PathBuf::from("umpire.toml"))),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_ends_game_follows_the_ruling() {
        let umpire = Umpire::new(ChessOracle::new(), NotationResolver);
        let mut session = umpire.new_session();

        let mut rulings = Vec::new();
        for (proposer, text) in [
            (Participant::A, "f2f3"),
            (Participant::B, "e7e5"),
            (Participant::A, "g2g4"),
        ] {
            rulings.push(umpire.submit_move(&mut session, proposer, text).await);
        }
        assert!(rulings.iter().all(|ruling| !ends_game(ruling)));

        let illegal = umpire.submit_move(&mut session, Participant::B, "e8e2").await;
        assert!(!ends_game(&illegal));

        let mate = umpire.submit_move(&mut session, Participant::B, "Qh4#").await;
        assert!(ends_game(&mate));

        let after = umpire.submit_move(&mut session, Participant::A, "e2e4").await;
        assert!(ends_game(&after));

        assert!(ends_game(&Err(SubmitError::InvalidApplication {
            token: "e2e4".into(),
            reason: "lost transition".to_string(),
        })));
        assert_eq!(
            session.status(),
            GameStatus::Checkmate {
                loser: Participant::A
            }
        );
    }
}
