//! Session values: one game instance each.

use crate::{GameStatus, HistoryEntry, MoveHistory, Participant, SequenceViolation};
use derive_more::{Display, From};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

/// Unique identifier for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, From, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Generates a fresh random id.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }
}

/// One complete game: state, turn, history and status.
///
/// A session is an ordinary owned value. Nothing outside the umpire's
/// commit step can change it: all fields are private and only readable
/// here, while mutation goes through [`crate::Umpire::submit_move`], which
/// needs `&mut Session` for the whole submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session<S> {
    id: SessionId,
    state: S,
    turn_holder: Participant,
    history: MoveHistory,
    status: GameStatus,
}

impl<S> Session<S> {
    /// Creates a session in its initial position with `A` to move.
    #[instrument(skip(initial_state))]
    pub fn new(initial_state: S) -> Self {
        Self::with_id(SessionId::random(), initial_state)
    }

    /// Creates a session with a caller-chosen id.
    #[instrument(skip(initial_state))]
    pub fn with_id(id: SessionId, initial_state: S) -> Self {
        info!(session_id = %id, "Creating new session");
        Self {
            id,
            state: initial_state,
            turn_holder: Participant::A,
            history: MoveHistory::new(),
            status: GameStatus::InProgress,
        }
    }

    /// Returns the session id.
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Returns the current position.
    pub fn state(&self) -> &S {
        &self.state
    }

    /// Returns the participant authorized to move next.
    ///
    /// After a game-ending move this still flips to the other side; use
    /// [`Session::status`] to find out whether moves are accepted.
    pub fn turn_holder(&self) -> Participant {
        self.turn_holder
    }

    /// Returns the move history.
    pub fn history(&self) -> &MoveHistory {
        &self.history
    }

    /// Returns the session status.
    pub fn status(&self) -> GameStatus {
        self.status
    }

    /// Returns true once the session has reached a terminal status.
    pub fn is_over(&self) -> bool {
        self.status.is_terminal()
    }

    /// Installs a transition: new state, one history entry, flipped turn.
    ///
    /// The history check runs before any field is written, so a failed
    /// commit leaves the session untouched.
    pub(crate) fn commit(
        &mut self,
        next_state: S,
        entry: HistoryEntry,
        status: GameStatus,
    ) -> Result<(), SequenceViolation> {
        self.history.append(entry)?;
        self.state = next_state;
        self.turn_holder = self.turn_holder.opponent();
        self.status = status;
        Ok(())
    }

    /// Returns the last committed entry.
    pub fn last_entry(&self) -> Option<&HistoryEntry> {
        self.history.last()
    }
}
