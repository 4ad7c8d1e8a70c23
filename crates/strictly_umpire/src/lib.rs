//! Strictly Umpire - turn-based move adjudication
//!
//! Two participants take turns proposing moves as free-form text. The
//! umpire resolves each proposal into a move token, asks a rules oracle
//! whether it is legal, and commits or rejects it. Committed moves land in
//! an append-only history; terminal positions freeze the session.
//!
//! # Architecture
//!
//! - **Session**: owned value holding state, turn-holder, history, status
//! - **Umpire**: the single entry point that mutates a session
//! - **RulesOracle**: legality, transitions and terminal facts for a game
//! - **MoveResolver**: free-form text to move token (advisory only)
//! - **EventSink**: fire-and-forget observers of commits
//!
//! The umpire is game-agnostic; `strictly_chess` provides the chess oracle.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod engine;
mod error;
mod events;
mod history;
mod oracle;
mod participant;
mod resolver;
mod session;
mod status;
mod token;

pub mod contracts;
pub mod invariants;

// Crate-level exports - Engine
pub use engine::{Submission, Umpire};

// Crate-level exports - Errors
pub use error::{OracleError, ResolveError, SequenceViolation, SubmitError};

// Crate-level exports - Observers
pub use events::{BroadcastSink, EventSink, SessionEvent, SinkError};

// Crate-level exports - Session data
pub use history::{HistoryEntry, MoveHistory};
pub use participant::Participant;
pub use session::{Session, SessionId};
pub use status::{GameStatus, TerminalFacts, classify};
pub use token::MoveToken;

// Crate-level exports - Collaborator contracts
pub use oracle::RulesOracle;
pub use resolver::MoveResolver;
