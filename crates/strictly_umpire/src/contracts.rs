//! Preconditions a submission must meet before any collaborator is consulted.
//!
//! Both checks are cheap and need no resolver or oracle call, so the
//! umpire runs them first and fails fast.

use crate::{Participant, Session, SubmitError};
use tracing::{instrument, warn};

/// Precondition: the session has not ended.
pub struct SessionOpen;

impl SessionOpen {
    /// Fails with [`SubmitError::SessionTerminated`] once the session is over.
    #[instrument(skip(session), fields(session_id = %session.id()))]
    pub fn check<S>(session: &Session<S>) -> Result<(), SubmitError> {
        if session.is_over() {
            warn!(status = %session.status(), "Submission after game end");
            Err(SubmitError::SessionTerminated {
                status: session.status(),
            })
        } else {
            Ok(())
        }
    }
}

/// Precondition: the proposer holds the turn.
pub struct ProposersTurn;

impl ProposersTurn {
    /// Fails with [`SubmitError::OutOfTurn`] if someone else is on move.
    #[instrument(skip(session), fields(session_id = %session.id()))]
    pub fn check<S>(session: &Session<S>, proposer: Participant) -> Result<(), SubmitError> {
        let expected = session.turn_holder();
        if proposer != expected {
            warn!(%expected, got = %proposer, "Participant tried to move out of turn");
            Err(SubmitError::OutOfTurn {
                expected,
                got: proposer,
            })
        } else {
            Ok(())
        }
    }
}

/// Composite precondition: the session is open and the proposer is on move.
pub struct MayPropose;

impl MayPropose {
    /// Validates all preconditions, terminal status first.
    #[instrument(skip(session))]
    pub fn check<S>(session: &Session<S>, proposer: Participant) -> Result<(), SubmitError> {
        SessionOpen::check(session)?;
        ProposersTurn::check(session, proposer)?;
        Ok(())
    }
}
