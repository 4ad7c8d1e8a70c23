//! Session status and the terminal-condition classifier.

use crate::Participant;
use derive_more::Display;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Status of a session.
///
/// Every variant except `InProgress` is terminal: a session in a terminal
/// status accepts no further moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
pub enum GameStatus {
    /// Moves are still accepted.
    #[display("in progress")]
    InProgress,
    /// The side to move is mated.
    #[display("checkmate, {loser} loses")]
    Checkmate {
        /// Participant who was mated.
        loser: Participant,
    },
    /// The side to move has no legal move and is not in check.
    #[display("stalemate")]
    Stalemate,
    /// Neither side can possibly mate.
    #[display("draw by insufficient material")]
    DrawInsufficientMaterial,
    /// The move-count limit was reached.
    #[display("draw by move limit")]
    DrawMoveLimit,
}

impl GameStatus {
    /// Returns true if the session is over.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, GameStatus::InProgress)
    }

    /// Returns the winner, if the game ended decisively.
    pub fn winner(&self) -> Option<Participant> {
        match self {
            GameStatus::Checkmate { loser } => Some(loser.opponent()),
            _ => None,
        }
    }

    /// Returns true for the drawn outcomes.
    pub fn is_draw(&self) -> bool {
        matches!(
            self,
            GameStatus::Stalemate | GameStatus::DrawInsufficientMaterial | GameStatus::DrawMoveLimit
        )
    }
}

/// Raw facts a rules oracle reports about a position.
///
/// Several facts may hold at once; [`classify`] resolves them into a
/// single [`GameStatus`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminalFacts {
    /// The side to move is in check and has no legal move.
    pub checkmate: bool,
    /// The side to move is not in check and has no legal move.
    pub stalemate: bool,
    /// No sequence of legal moves can lead to mate.
    pub insufficient_material: bool,
    /// The move-count draw boundary has been reached.
    pub move_limit: bool,
}

impl TerminalFacts {
    /// Facts for a position where play continues.
    pub fn none() -> Self {
        Self::default()
    }

    /// Returns true if any terminal fact holds.
    pub fn any(&self) -> bool {
        self.checkmate || self.stalemate || self.insufficient_material || self.move_limit
    }
}

/// Maps oracle facts onto the closed status set.
///
/// Priority: checkmate, stalemate, insufficient material, move limit.
/// King-safety outcomes win over the move-count draw when both hold.
/// `side_to_move` is the participant on move in the classified position,
/// which is the loser if the position is mate.
#[instrument(level = "debug")]
pub fn classify(facts: TerminalFacts, side_to_move: Participant) -> GameStatus {
    let status = if facts.checkmate {
        GameStatus::Checkmate {
            loser: side_to_move,
        }
    } else if facts.stalemate {
        GameStatus::Stalemate
    } else if facts.insufficient_material {
        GameStatus::DrawInsufficientMaterial
    } else if facts.move_limit {
        GameStatus::DrawMoveLimit
    } else {
        GameStatus::InProgress
    };
    debug!(%status, "Classified position");
    status
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_facts_is_in_progress() {
        assert_eq!(
            classify(TerminalFacts::none(), Participant::A),
            GameStatus::InProgress
        );
    }

    #[test]
    fn test_checkmate_beats_move_limit() {
        let facts = TerminalFacts {
            checkmate: true,
            move_limit: true,
            ..TerminalFacts::none()
        };
        assert_eq!(
            classify(facts, Participant::B),
            GameStatus::Checkmate {
                loser: Participant::B
            }
        );
    }

    #[test]
    fn test_stalemate_beats_draws() {
        let facts = TerminalFacts {
            stalemate: true,
            insufficient_material: true,
            move_limit: true,
            ..TerminalFacts::none()
        };
        assert_eq!(classify(facts, Participant::A), GameStatus::Stalemate);
    }

    #[test]
    fn test_insufficient_material_beats_move_limit() {
        let facts = TerminalFacts {
            insufficient_material: true,
            move_limit: true,
            ..TerminalFacts::none()
        };
        assert_eq!(
            classify(facts, Participant::A),
            GameStatus::DrawInsufficientMaterial
        );
    }

    #[test]
    fn test_move_limit_alone() {
        let facts = TerminalFacts {
            move_limit: true,
            ..TerminalFacts::none()
        };
        assert_eq!(classify(facts, Participant::A), GameStatus::DrawMoveLimit);
    }

    #[test]
    fn test_winner_and_draw_helpers() {
        let mate = GameStatus::Checkmate {
            loser: Participant::A,
        };
        assert_eq!(mate.winner(), Some(Participant::B));
        assert!(!mate.is_draw());
        assert!(GameStatus::Stalemate.is_draw());
        assert!(!GameStatus::InProgress.is_terminal());
        assert_eq!(mate.to_string(), "checkmate, A loses");
    }
}
