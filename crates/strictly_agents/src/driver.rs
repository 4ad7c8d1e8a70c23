//! Session driver: one task owns a session and serializes submissions.
//!
//! ```text
//! DriverHandle (A) ──┐
//!                    ├──► mpsc::Sender<DriverRequest> ──► SessionDriver
//! DriverHandle (B) ──┘                                        │
//!                                                             ▼
//!                                         Umpire::submit_move(&mut session)
//! ```
//!
//! Requests are handled strictly one at a time, so at most one submission
//! is ever in flight against the session. Each request carries a oneshot
//! reply channel.

use derive_getters::Getters;
use derive_more::{Display, Error};
use derive_new::new;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use strictly_umpire::{
    GameStatus, MoveHistory, MoveResolver, Participant, RulesOracle, Session, SessionId,
    SubmitError, Submission, Umpire,
};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

/// Default mailbox capacity.
pub const DEFAULT_MAILBOX_CAPACITY: usize = 32;

/// Read-only copy of a session at one point in time.
#[derive(Debug, Clone, PartialEq, Getters, Serialize, Deserialize, new)]
pub struct SessionView {
    /// Session id.
    id: SessionId,
    /// Participant on move.
    turn_holder: Participant,
    /// Current status.
    status: GameStatus,
    /// Committed moves.
    history: MoveHistory,
    /// Oracle snapshot of the current state.
    snapshot: String,
}

/// Requests understood by the driver.
#[derive(Debug)]
enum DriverRequest {
    /// Adjudicate one proposal.
    Submit {
        proposer: Participant,
        text: String,
        reply: oneshot::Sender<Result<Submission, SubmitError>>,
    },
    /// Report the current session.
    View { reply: oneshot::Sender<SessionView> },
}

/// Actor owning one session.
pub struct SessionDriver<O: RulesOracle, R> {
    umpire: Arc<Umpire<O, R>>,
    session: Session<O::State>,
    mailbox: mpsc::Receiver<DriverRequest>,
}

impl<O, R> SessionDriver<O, R>
where
    O: RulesOracle + 'static,
    O::State: 'static,
    R: MoveResolver<O::State> + 'static,
{
    /// Starts a driver for a fresh session on the current tokio runtime.
    ///
    /// The join handle yields the final session once every handle has
    /// been dropped or a fatal error stopped the driver.
    #[instrument(skip(umpire))]
    pub fn spawn(
        umpire: Arc<Umpire<O, R>>,
        capacity: usize,
    ) -> (DriverHandle, JoinHandle<Session<O::State>>) {
        let session = umpire.new_session();
        Self::spawn_with_session(umpire, session, capacity)
    }

    /// Starts a driver for an existing session.
    #[instrument(skip(umpire, session), fields(session_id = %session.id()))]
    pub fn spawn_with_session(
        umpire: Arc<Umpire<O, R>>,
        session: Session<O::State>,
        capacity: usize,
    ) -> (DriverHandle, JoinHandle<Session<O::State>>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let handle = DriverHandle {
            session_id: session.id(),
            tx,
        };
        let driver = Self {
            umpire,
            session,
            mailbox: rx,
        };
        info!("Spawning session driver");
        (handle, tokio::spawn(driver.run()))
    }

    fn view(&self) -> SessionView {
        SessionView::new(
            self.session.id(),
            self.session.turn_holder(),
            self.session.status(),
            self.session.history().clone(),
            self.umpire.oracle().snapshot(self.session.state()),
        )
    }

    #[instrument(skip(self), fields(session_id = %self.session.id()))]
    async fn run(mut self) -> Session<O::State> {
        while let Some(request) = self.mailbox.recv().await {
            match request {
                DriverRequest::Submit {
                    proposer,
                    text,
                    reply,
                } => {
                    let result = self
                        .umpire
                        .submit_move(&mut self.session, proposer, &text)
                        .await;
                    let fatal = matches!(&result, Err(e) if !e.is_recoverable());
                    if let Err(e) = &result {
                        debug!(error = %e, "Submission rejected");
                    }
                    if reply.send(result).is_err() {
                        debug!("Submitter went away before the reply");
                    }
                    if fatal {
                        error!("Fatal adjudication fault, stopping driver");
                        break;
                    }
                }
                DriverRequest::View { reply } => {
                    if reply.send(self.view()).is_err() {
                        debug!("Viewer went away before the reply");
                    }
                }
            }
        }
        info!(
            moves = self.session.history().len(),
            status = %self.session.status(),
            "Session driver stopped"
        );
        self.session
    }
}

/// Cloneable handle for talking to a running driver.
#[derive(Debug, Clone)]
pub struct DriverHandle {
    session_id: SessionId,
    tx: mpsc::Sender<DriverRequest>,
}

impl DriverHandle {
    /// Id of the driven session.
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    /// Submits a proposal and waits for the umpire's ruling.
    ///
    /// The outer error means the driver is gone; the inner result is the
    /// adjudication outcome.
    #[instrument(skip(self, text), fields(session_id = %self.session_id))]
    pub async fn submit(
        &self,
        proposer: Participant,
        text: impl Into<String>,
    ) -> Result<Result<Submission, SubmitError>, DriverError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(DriverRequest::Submit {
                proposer,
                text: text.into(),
                reply,
            })
            .await
            .map_err(|_| {
                warn!("Driver mailbox closed");
                DriverError::new("Session driver has stopped")
            })?;
        rx.await
            .map_err(|_| DriverError::new("Session driver dropped the submission"))
    }

    /// Returns a view of the session after all earlier requests.
    #[instrument(skip(self), fields(session_id = %self.session_id))]
    pub async fn view(&self) -> Result<SessionView, DriverError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(DriverRequest::View { reply })
            .await
            .map_err(|_| DriverError::new("Session driver has stopped"))?;
        rx.await
            .map_err(|_| DriverError::new("Session driver dropped the view request"))
    }
}

/// The driver is no longer running.
#[derive(Debug, Clone, Display, Error)]
#[display("Driver error: {} at {}:{}", message, file, line)]
pub struct DriverError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl DriverError {
    /// Creates a new driver error with caller location tracking.
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
