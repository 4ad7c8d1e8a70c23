//! Strictly Chess - chess adapters for the strictly umpire
//!
//! Provides the chess [`ChessOracle`] (standard rules via shakmaty, UCI
//! move tokens, FEN snapshots), deterministic resolvers that read move
//! notation out of text, and text rendering for boards and move logs.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod notation;
mod oracle;
mod render;

// Crate-level exports - Errors
pub use error::ChessError;

// Crate-level exports - Rules
pub use oracle::{ChessOracle, DEFAULT_MOVE_LIMIT_PLIES, position_from_fen, position_to_fen};

// Crate-level exports - Resolvers
pub use notation::{NotationResolver, ScriptedResolver, looks_like_uci, normalize_token};

// Crate-level exports - Rendering
pub use render::{DEFAULT_RETAINED_GAMES, MoveLogSink, render_board};

pub use shakmaty::Chess;
