//! Chess adapter errors.

use derive_more::{Display, Error};
use tracing::{error, instrument};

/// Chess setup error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Chess error: {} at {}:{}", message, file, line)]
pub struct ChessError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ChessError {
    /// Creates a new chess error with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        let message = message.into();
        error!(error_message = %message, "Chess error created");
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}

impl From<shakmaty::fen::ParseFenError> for ChessError {
    #[track_caller]
    fn from(err: shakmaty::fen::ParseFenError) -> Self {
        Self::new(format!("Invalid FEN: {}", err))
    }
}

impl From<shakmaty::PositionError<shakmaty::Chess>> for ChessError {
    #[track_caller]
    fn from(err: shakmaty::PositionError<shakmaty::Chess>) -> Self {
        Self::new(format!("Illegal position: {}", err))
    }
}
