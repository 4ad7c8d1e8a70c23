//! Error types for adjudication.

use crate::{GameStatus, MoveToken, Participant};
use derive_more::{Display, Error};
use std::time::Duration;
use tracing::{error, instrument};

/// Why a submission was not committed.
///
/// Every variant leaves the session exactly as it was. All variants except
/// [`SubmitError::SequenceViolation`] and [`SubmitError::InvalidApplication`]
/// are ordinary rejections: the same or a corrected submission may be
/// retried without resetting the session.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum SubmitError {
    /// The session already ended.
    #[display("Session is over ({status})")]
    SessionTerminated {
        /// The terminal status the session ended with.
        status: GameStatus,
    },

    /// The proposer does not hold the turn.
    #[display("It's not {got}'s turn, waiting for {expected}")]
    OutOfTurn {
        /// Current turn-holder.
        expected: Participant,
        /// Participant who proposed.
        got: Participant,
    },

    /// The resolver could not turn the text into a move.
    #[display("Could not resolve a move: {reason}")]
    UnresolvableMove {
        /// Resolver failure description.
        reason: String,
    },

    /// The resolver did not answer in time, or was cancelled.
    #[display("Move resolver timed out after {after:?}")]
    ResolverTimeout {
        /// How long the umpire waited.
        after: Duration,
    },

    /// The rules oracle rejected the resolved move.
    #[display("Illegal move: {token}")]
    IllegalMove {
        /// The rejected token.
        token: MoveToken,
    },

    /// History numbering or turn alternation broke. Signals a bug in the umpire.
    #[display("Session invariant violated: {detail}")]
    SequenceViolation {
        /// Which invariant failed.
        detail: String,
    },

    /// The oracle refused to apply a move it had declared legal.
    #[display("Oracle could not apply {token}: {reason}")]
    InvalidApplication {
        /// The token the oracle refused.
        token: MoveToken,
        /// Oracle explanation.
        reason: String,
    },
}

impl SubmitError {
    /// Returns true if the caller may simply retry.
    ///
    /// Fatal errors indicate a programming error in the umpire or the
    /// oracle and should abort the session rather than be absorbed.
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            SubmitError::SequenceViolation { .. } | SubmitError::InvalidApplication { .. }
        )
    }
}

impl From<SequenceViolation> for SubmitError {
    fn from(err: SequenceViolation) -> Self {
        SubmitError::SequenceViolation {
            detail: err.to_string(),
        }
    }
}

impl From<OracleError> for SubmitError {
    fn from(err: OracleError) -> Self {
        match err {
            OracleError::InvalidApplication { token, reason } => {
                SubmitError::InvalidApplication { token, reason }
            }
        }
    }
}

/// Attempt to append a history entry out of order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
#[display("Expected sequence number {expected}, got {found}")]
pub struct SequenceViolation {
    /// The only acceptable next sequence number.
    pub expected: usize,
    /// The sequence number offered.
    pub found: usize,
}

/// Errors a rules oracle may report.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum OracleError {
    /// `apply` was called with a token that is not legal in the state.
    #[display("Cannot apply {token}: {reason}")]
    InvalidApplication {
        /// Offending token.
        token: MoveToken,
        /// Why the oracle refused.
        reason: String,
    },
}

/// Move resolver failure.
#[derive(Debug, Clone, Display, Error)]
#[display("Resolve error: {} at {}:{}", message, file, line)]
pub struct ResolveError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ResolveError {
    /// Creates a new resolver error with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        let message = message.into();
        error!(error_message = %message, "Resolve error created");
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
