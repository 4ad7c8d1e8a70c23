//! Fire-and-forget notifications for observers of a session.
//!
//! Renderers, loggers and recorders subscribe through [`EventSink`]. A sink
//! that fails is logged and otherwise ignored: observers never influence
//! adjudication.

use crate::{GameStatus, HistoryEntry, SessionId};
use chrono::{DateTime, Utc};
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, instrument};

/// Something observable happened in a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SessionEvent {
    /// A move was committed.
    MoveCommitted {
        /// Session the move belongs to.
        session_id: SessionId,
        /// The new history entry.
        entry: HistoryEntry,
        /// Status after the move.
        status: GameStatus,
        /// When the commit happened.
        at: DateTime<Utc>,
    },
    /// The committed move ended the game.
    SessionEnded {
        /// Session that ended.
        session_id: SessionId,
        /// The final history entry.
        entry: HistoryEntry,
        /// Terminal status.
        status: GameStatus,
        /// When the game ended.
        at: DateTime<Utc>,
    },
}

impl SessionEvent {
    /// Session this event belongs to.
    pub fn session_id(&self) -> SessionId {
        match self {
            SessionEvent::MoveCommitted { session_id, .. }
            | SessionEvent::SessionEnded { session_id, .. } => *session_id,
        }
    }

    /// History entry carried by this event.
    pub fn entry(&self) -> &HistoryEntry {
        match self {
            SessionEvent::MoveCommitted { entry, .. } | SessionEvent::SessionEnded { entry, .. } => {
                entry
            }
        }
    }

    /// Session status at the time of the event.
    pub fn status(&self) -> GameStatus {
        match self {
            SessionEvent::MoveCommitted { status, .. }
            | SessionEvent::SessionEnded { status, .. } => *status,
        }
    }
}

/// Observer failure.
#[derive(Debug, Clone, Display, Error)]
#[display("Event sink error: {} at {}:{}", message, file, line)]
pub struct SinkError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl SinkError {
    /// Creates a new sink error with caller location tracking.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

/// Receives session events.
pub trait EventSink: Send + Sync {
    /// Handles one event. Errors are logged by the umpire and dropped.
    fn emit(&self, event: &SessionEvent) -> Result<(), SinkError>;
}

/// Fans events out over a tokio broadcast channel.
///
/// Having no subscribers is not an error.
#[derive(Debug, Clone)]
pub struct BroadcastSink {
    tx: broadcast::Sender<SessionEvent>,
}

impl BroadcastSink {
    /// Creates a sink buffering up to `capacity` events per lagging subscriber.
    #[instrument]
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Subscribes to subsequent events.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.tx.subscribe()
    }
}

impl EventSink for BroadcastSink {
    fn emit(&self, event: &SessionEvent) -> Result<(), SinkError> {
        match self.tx.send(event.clone()) {
            Ok(receivers) => debug!(receivers, "Broadcast session event"),
            Err(_) => debug!("No subscribers for session event"),
        }
        Ok(())
    }
}
