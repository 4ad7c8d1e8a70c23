//! Text rendering of positions and the running move log.

use shakmaty::{Chess, File, Position, Rank, Square};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use strictly_umpire::{EventSink, SessionEvent, SessionId, SinkError};
use tracing::{debug, info};

/// Renders a position as an 8x8 text board, rank 8 at the top.
///
/// White pieces are uppercase, black lowercase, empty squares `.`:
///
/// ```text
/// 8 r n b q k b n r
/// ...
/// 1 R N B Q K B N R
///   a b c d e f g h
/// ```
pub fn render_board(position: &Chess) -> String {
    let board = position.board();
    let mut out = String::new();
    for rank in Rank::ALL.iter().rev() {
        out.push(rank.char());
        for file in File::ALL {
            out.push(' ');
            let square = Square::from_coords(file, *rank);
            out.push(board.piece_at(square).map_or('.', |piece| piece.char()));
        }
        out.push('\n');
    }
    out.push_str("  a b c d e f g h");
    out
}

/// Finished games whose logs a [`MoveLogSink`] keeps by default.
pub const DEFAULT_RETAINED_GAMES: usize = 16;

#[derive(Debug, Default)]
struct MoveLogs {
    lines: HashMap<SessionId, Vec<String>>,
    finished: VecDeque<SessionId>,
}

/// Event sink that keeps a numbered move log per session and logs it.
///
/// Each commit is logged as `1. e2e4`; the end of a game logs the result.
/// Logs of live games are kept until the game ends. Only the most recent
/// finished games are retained, so a long-running process does not grow
/// without bound.
#[derive(Debug)]
pub struct MoveLogSink {
    logs: Mutex<MoveLogs>,
    retained_games: usize,
}

impl Default for MoveLogSink {
    fn default() -> Self {
        Self::new()
    }
}

impl MoveLogSink {
    /// Creates an empty move log.
    pub fn new() -> Self {
        Self::with_retained_games(DEFAULT_RETAINED_GAMES)
    }

    /// Creates an empty move log keeping at most `games` finished logs.
    pub fn with_retained_games(games: usize) -> Self {
        Self {
            logs: Mutex::new(MoveLogs::default()),
            retained_games: games,
        }
    }

    /// Returns the logged lines for a session, oldest first.
    pub fn lines(&self, session_id: SessionId) -> Vec<String> {
        self.logs
            .lock()
            .map(|logs| logs.lines.get(&session_id).cloned().unwrap_or_default())
            .unwrap_or_default()
    }

    /// Removes and returns the log of a session.
    pub fn take(&self, session_id: SessionId) -> Vec<String> {
        self.logs
            .lock()
            .map(|mut logs| {
                logs.finished.retain(|id| *id != session_id);
                logs.lines.remove(&session_id).unwrap_or_default()
            })
            .unwrap_or_default()
    }

    /// Number of sessions with a log in memory.
    pub fn session_count(&self) -> usize {
        self.logs.lock().map(|logs| logs.lines.len()).unwrap_or(0)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, MoveLogs>, SinkError> {
        self.logs
            .lock()
            .map_err(|_| SinkError::new("Move log lock poisoned"))
    }
}

impl EventSink for MoveLogSink {
    fn emit(&self, event: &SessionEvent) -> Result<(), SinkError> {
        match event {
            SessionEvent::MoveCommitted {
                session_id, entry, ..
            } => {
                let line = format!("{}. {}", entry.sequence(), entry.token());
                info!(session_id = %session_id, "{}", line);
                self.lock()?
                    .lines
                    .entry(*session_id)
                    .or_default()
                    .push(line);
            }
            SessionEvent::SessionEnded {
                session_id, status, ..
            } => {
                let result = match status.winner() {
                    Some(winner) => format!("Game over: {}, {} wins", status, winner),
                    None => format!("Game over: {}", status),
                };
                info!(session_id = %session_id, "{}", result);

                let mut logs = self.lock()?;
                logs.finished.push_back(*session_id);
                while logs.finished.len() > self.retained_games {
                    if let Some(evicted) = logs.finished.pop_front() {
                        debug!(session_id = %evicted, "Dropping finished move log");
                        logs.lines.remove(&evicted);
                    }
                }
            }
        }
        Ok(())
    }
}
