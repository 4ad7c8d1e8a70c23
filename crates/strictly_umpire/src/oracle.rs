//! Rules oracle contract.

use crate::{MoveToken, OracleError, TerminalFacts};
use std::fmt::Debug;

/// The authority on legality, state transitions and game end.
///
/// The umpire treats the game state as opaque and relies on the oracle for
/// every question about it. Oracles hold no per-session data, so a single
/// oracle can serve any number of concurrent sessions.
///
/// Contract:
/// - `apply` is only called after `is_legal` returned true for the same
///   state and token. Implementations still reject illegal tokens with
///   [`OracleError::InvalidApplication`].
/// - `terminal_facts` describes the position from the point of view of the
///   side to move.
pub trait RulesOracle: Send + Sync {
    /// Game position type.
    type State: Clone + Debug + Send + Sync;

    /// Starting position for a fresh session.
    fn initial_state(&self) -> Self::State;

    /// Returns true if `token` is a legal move in `state`.
    fn is_legal(&self, state: &Self::State, token: &MoveToken) -> bool;

    /// Produces the position after playing `token`.
    fn apply(&self, state: &Self::State, token: &MoveToken) -> Result<Self::State, OracleError>;

    /// Reports terminal facts about `state`.
    fn terminal_facts(&self, state: &Self::State) -> TerminalFacts;

    /// Serializes `state` for history snapshots and observers.
    fn snapshot(&self, state: &Self::State) -> String;
}
