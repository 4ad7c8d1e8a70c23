//! Standard chess rules oracle backed by shakmaty.

use crate::ChessError;
use shakmaty::fen::Fen;
use shakmaty::uci::Uci;
use shakmaty::{CastlingMode, Chess, EnPassantMode, Move, Position};
use strictly_umpire::{MoveToken, OracleError, RulesOracle, TerminalFacts};
use tracing::{debug, instrument};

/// Plies without capture or pawn move after which the game is drawn
/// (the 75-move rule).
pub const DEFAULT_MOVE_LIMIT_PLIES: u32 = 150;

/// Parses a FEN string into a playable position.
#[instrument]
pub fn position_from_fen(fen: &str) -> Result<Chess, ChessError> {
    let setup: Fen = fen.trim().parse()?;
    let position: Chess = setup.into_position(CastlingMode::Standard)?;
    Ok(position)
}

/// Serializes a position as FEN.
pub fn position_to_fen(position: &Chess) -> String {
    Fen::from_position(position.clone(), EnPassantMode::Legal).to_string()
}

/// Rules oracle for standard chess with UCI move tokens.
#[derive(Debug, Clone)]
pub struct ChessOracle {
    start: Chess,
    move_limit_plies: u32,
}

impl ChessOracle {
    /// Oracle starting from the standard initial position.
    #[instrument]
    pub fn new() -> Self {
        Self {
            start: Chess::default(),
            move_limit_plies: DEFAULT_MOVE_LIMIT_PLIES,
        }
    }

    /// Oracle starting from a custom position.
    #[instrument]
    pub fn from_fen(fen: &str) -> Result<Self, ChessError> {
        Ok(Self {
            start: position_from_fen(fen)?,
            move_limit_plies: DEFAULT_MOVE_LIMIT_PLIES,
        })
    }

    /// Sets the halfmove-clock value at which the game is drawn.
    pub fn with_move_limit(mut self, plies: u32) -> Self {
        self.move_limit_plies = plies;
        self
    }

    /// Returns the configured move limit in plies.
    pub fn move_limit_plies(&self) -> u32 {
        self.move_limit_plies
    }

    /// Resolves a UCI token into a legal move, if it is one.
    #[instrument(level = "debug", skip(self, state, token), fields(token = %token))]
    pub fn legal_move(&self, state: &Chess, token: &MoveToken) -> Option<Move> {
        let uci: Uci = match token.as_str().parse() {
            Ok(uci) => uci,
            Err(_) => {
                debug!("Token is not UCI");
                return None;
            }
        };
        match uci.to_move(state) {
            Ok(m) => Some(m),
            Err(_) => {
                debug!("UCI move is not legal in this position");
                None
            }
        }
    }
}

impl Default for ChessOracle {
    fn default() -> Self {
        Self::new()
    }
}

impl RulesOracle for ChessOracle {
    type State = Chess;

    fn initial_state(&self) -> Chess {
        self.start.clone()
    }

    fn is_legal(&self, state: &Chess, token: &MoveToken) -> bool {
        self.legal_move(state, token).is_some()
    }

    #[instrument(skip(self, state, token), fields(token = %token))]
    fn apply(&self, state: &Chess, token: &MoveToken) -> Result<Chess, OracleError> {
        let m = self
            .legal_move(state, token)
            .ok_or_else(|| OracleError::InvalidApplication {
                token: token.clone(),
                reason: format!("not a legal move in {}", position_to_fen(state)),
            })?;
        let mut next = state.clone();
        next.play_unchecked(&m);
        Ok(next)
    }

    fn terminal_facts(&self, state: &Chess) -> TerminalFacts {
        TerminalFacts {
            checkmate: state.is_checkmate(),
            stalemate: state.is_stalemate(),
            insufficient_material: state.is_insufficient_material(),
            move_limit: state.halfmoves() >= self.move_limit_plies,
        }
    }

    fn snapshot(&self, state: &Chess) -> String {
        position_to_fen(state)
    }
}
