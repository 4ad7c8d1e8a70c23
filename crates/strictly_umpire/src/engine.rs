//! The umpire: the only authority allowed to mutate a session.

use crate::contracts::MayPropose;
use crate::invariants::{InvariantSet, SessionInvariants};
use crate::{
    EventSink, GameStatus, HistoryEntry, MoveResolver, MoveToken, Participant, RulesOracle,
    Session, SessionEvent, SessionId, SubmitError, classify,
};
use chrono::Utc;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

/// Outcome of a committed submission.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct Submission {
    /// The token that was committed.
    token: MoveToken,
    /// The entry appended to the history.
    entry: HistoryEntry,
    /// Session status after the move.
    status: GameStatus,
}

/// Drives submissions through the resolver and the rules oracle.
///
/// The umpire holds no session. Callers pass the session they own into
/// [`Umpire::submit_move`]; the `&mut` borrow gives the umpire exclusive
/// access for the whole submission. One umpire can serve any number of
/// independent sessions, including concurrently.
pub struct Umpire<O, R> {
    oracle: O,
    resolver: R,
    resolver_timeout: Option<Duration>,
    sinks: Vec<Arc<dyn EventSink>>,
}

impl<O, R> std::fmt::Debug for Umpire<O, R>
where
    O: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Umpire")
            .field("oracle", &self.oracle)
            .field("resolver_timeout", &self.resolver_timeout)
            .field("sinks", &self.sinks.len())
            .finish()
    }
}

impl<O, R> Umpire<O, R>
where
    O: RulesOracle,
    R: MoveResolver<O::State>,
{
    /// Creates an umpire with no resolver timeout and no observers.
    pub fn new(oracle: O, resolver: R) -> Self {
        Self {
            oracle,
            resolver,
            resolver_timeout: None,
            sinks: Vec::new(),
        }
    }

    /// Bounds how long a single resolution may take.
    pub fn with_resolver_timeout(mut self, timeout: Duration) -> Self {
        self.resolver_timeout = Some(timeout);
        self
    }

    /// Adds an observer notified after every commit.
    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    /// Returns the rules oracle.
    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    /// Returns the resolver timeout, if any.
    pub fn resolver_timeout(&self) -> Option<Duration> {
        self.resolver_timeout
    }

    /// Starts a session from the oracle's initial position.
    #[instrument(skip(self))]
    pub fn new_session(&self) -> Session<O::State> {
        Session::new(self.oracle.initial_state())
    }

    /// Adjudicates one proposal.
    ///
    /// Runs, in order: terminal check, turn check, resolution, legality
    /// check, commit, terminal classification. On any error the session is
    /// left exactly as it was. The resolver call is the only await point and
    /// every write to the session happens after it, so dropping the returned
    /// future before completion is also safe.
    ///
    /// # Errors
    ///
    /// - [`SubmitError::SessionTerminated`] if the game is over
    /// - [`SubmitError::OutOfTurn`] if `proposer` is not on move
    /// - [`SubmitError::UnresolvableMove`] if the resolver fails
    /// - [`SubmitError::ResolverTimeout`] if the resolver exceeds the timeout
    /// - [`SubmitError::IllegalMove`] if the oracle rejects the token
    /// - [`SubmitError::SequenceViolation`] or [`SubmitError::InvalidApplication`]
    ///   on internal faults
    #[instrument(skip(self, session, text), fields(session_id = %session.id()))]
    pub async fn submit_move(
        &self,
        session: &mut Session<O::State>,
        proposer: Participant,
        text: &str,
    ) -> Result<Submission, SubmitError> {
        MayPropose::check(session, proposer)?;

        let token = self.resolve(text, session.state()).await?;
        debug!(%token, "Resolved move");

        if !self.oracle.is_legal(session.state(), &token) {
            warn!(%token, "Oracle rejected move");
            return Err(SubmitError::IllegalMove { token });
        }

        let next_state = self.oracle.apply(session.state(), &token).map_err(|e| {
            error!(%token, error = %e, "Oracle failed to apply a legal move");
            SubmitError::from(e)
        })?;
        let entry = HistoryEntry::new(
            session.history().next_sequence(),
            proposer,
            token.clone(),
            self.oracle.snapshot(&next_state),
        );
        let status = classify(self.oracle.terminal_facts(&next_state), proposer.opponent());

        let mut candidate = session.clone();
        candidate
            .commit(next_state, entry.clone(), status)
            .map_err(|e| {
                error!(error = %e, "History rejected commit");
                SubmitError::from(e)
            })?;
        <SessionInvariants as InvariantSet<Session<O::State>>>::check_all(&candidate).map_err(
            |violations| {
                let detail = violations
                    .iter()
                    .map(|v| v.description.as_str())
                    .collect::<Vec<_>>()
                    .join("; ");
                error!(%detail, "Session invariants violated after commit");
                SubmitError::SequenceViolation { detail }
            },
        )?;
        *session = candidate;

        info!(
            %token,
            sequence = *entry.sequence(),
            %status,
            next = %session.turn_holder(),
            "Move committed"
        );

        self.publish(session.id(), &entry, status);

        Ok(Submission {
            token,
            entry,
            status,
        })
    }

    /// Runs the resolver, bounded by the timeout if one is set.
    async fn resolve(&self, text: &str, state: &O::State) -> Result<MoveToken, SubmitError> {
        let pending = self.resolver.resolve(text, state);
        let outcome = match self.resolver_timeout {
            Some(after) => tokio::time::timeout(after, pending).await.map_err(|_| {
                warn!(?after, "Move resolver timed out");
                SubmitError::ResolverTimeout { after }
            })?,
            None => pending.await,
        };

        outcome.map_err(|e| {
            warn!(reason = %e.message, "Move could not be resolved");
            SubmitError::UnresolvableMove { reason: e.message }
        })
    }

    /// Notifies observers; their failures and panics never reach the caller.
    fn publish(&self, session_id: SessionId, entry: &HistoryEntry, status: GameStatus) {
        let at = Utc::now();
        let mut events = vec![SessionEvent::MoveCommitted {
            session_id,
            entry: entry.clone(),
            status,
            at,
        }];
        if status.is_terminal() {
            info!(%session_id, %status, "Session ended");
            events.push(SessionEvent::SessionEnded {
                session_id,
                entry: entry.clone(),
                status,
                at,
            });
        }

        for event in &events {
            for sink in &self.sinks {
                // A panicking sink must not unwind past a committed move.
                match catch_unwind(AssertUnwindSafe(|| sink.emit(event))) {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => warn!(error = %e, "Event sink failed, ignoring"),
                    Err(_) => warn!("Event sink panicked, ignoring"),
                }
            }
        }
    }
}
