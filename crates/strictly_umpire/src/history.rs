//! Append-only move history.

use crate::{MoveToken, Participant, SequenceViolation};
use derive_getters::Getters;
use derive_new::new;
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

/// One committed move.
///
/// Entries are immutable once appended.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize, new)]
pub struct HistoryEntry {
    /// 1-based position in the history.
    sequence: usize,
    /// Who moved.
    mover: Participant,
    /// The committed token.
    token: MoveToken,
    /// Serialized state after the move, as produced by the oracle.
    snapshot: String,
}

impl std::fmt::Display for HistoryEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}. {} ({})", self.sequence, self.token, self.mover)
    }
}

/// Ordered log of committed moves.
///
/// Only the umpire's commit step appends; everyone else gets a read-only view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveHistory {
    entries: Vec<HistoryEntry>,
}

impl MoveHistory {
    /// Creates an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sequence number the next entry must carry.
    pub fn next_sequence(&self) -> usize {
        self.entries.len() + 1
    }

    /// Appends an entry, enforcing gap-free numbering.
    #[instrument(skip(self, entry), fields(sequence = entry.sequence, token = %entry.token))]
    pub(crate) fn append(&mut self, entry: HistoryEntry) -> Result<(), SequenceViolation> {
        let expected = self.next_sequence();
        if entry.sequence != expected {
            warn!(expected, found = entry.sequence, "Rejected out-of-order history entry");
            return Err(SequenceViolation {
                expected,
                found: entry.sequence,
            });
        }
        self.entries.push(entry);
        Ok(())
    }

    /// Returns all entries in commit order.
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// Returns the most recent entry.
    pub fn last(&self) -> Option<&HistoryEntry> {
        self.entries.last()
    }

    /// Number of committed moves.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing has been committed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the committed tokens in order.
    pub fn tokens(&self) -> Vec<&MoveToken> {
        self.entries.iter().map(|e| &e.token).collect()
    }
}
