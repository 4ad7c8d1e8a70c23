//! First-class session invariants.
//!
//! Invariants are logical properties that must hold after every commit.
//! They are testable independently and the umpire checks them on the
//! candidate session before installing it.

use crate::{Participant, Session};

/// A logical property that must hold for a given state.
pub trait Invariant<S> {
    /// Checks if the invariant holds for the given state.
    fn holds(state: &S) -> bool;

    /// Human-readable description of the invariant.
    fn description() -> &'static str;
}

/// Violation of an invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub description: String,
}

impl InvariantViolation {
    /// Creates a new invariant violation.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
        }
    }
}

/// A set of invariants that can be checked together.
///
/// Implemented for tuples so sets compose at the type level.
pub trait InvariantSet<S> {
    /// Checks all invariants in the set, collecting every violation.
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>>;
}

impl<S, I1, I2> InvariantSet<S> for (I1, I2)
where
    I1: Invariant<S>,
    I2: Invariant<S>,
{
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>> {
        let mut violations = Vec::new();

        if !I1::holds(state) {
            violations.push(InvariantViolation::new(I1::description()));
        }

        if !I2::holds(state) {
            violations.push(InvariantViolation::new(I2::description()));
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }
}

/// Invariant: movers alternate A, B, A, B, ... and the turn-holder follows.
///
/// The first committed move is always by `A`. The turn-holder is whoever
/// the parity of the history length says, including after a game-ending
/// move.
pub struct AlternatingTurnInvariant;

impl<S> Invariant<Session<S>> for AlternatingTurnInvariant {
    fn holds(session: &Session<S>) -> bool {
        let entries = session.history().entries();

        let movers_alternate = entries
            .iter()
            .enumerate()
            .all(|(i, e)| *e.mover() == Participant::after_plies(i));

        movers_alternate && session.turn_holder() == Participant::after_plies(entries.len())
    }

    fn description() -> &'static str {
        "Participants alternate turns (A, B, A, B, ...)"
    }
}

/// Invariant: history entry `i` carries sequence number `i + 1`.
pub struct SequentialHistoryInvariant;

impl<S> Invariant<Session<S>> for SequentialHistoryInvariant {
    fn holds(session: &Session<S>) -> bool {
        session
            .history()
            .entries()
            .iter()
            .enumerate()
            .all(|(i, e)| *e.sequence() == i + 1)
    }

    fn description() -> &'static str {
        "History sequence numbers are 1, 2, 3, ... with no gaps"
    }
}

/// Every invariant a session must satisfy.
pub type SessionInvariants = (AlternatingTurnInvariant, SequentialHistoryInvariant);
