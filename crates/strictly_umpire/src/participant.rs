//! The two participants of a session.

use serde::{Deserialize, Serialize};

/// One of the two seats at the table.
///
/// `A` always moves first. The umpire never authenticates a participant,
/// it only compares the proposer against the current turn-holder.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum Participant {
    /// First mover.
    A,
    /// Second mover.
    B,
}

impl Participant {
    /// Returns the other participant.
    pub fn opponent(self) -> Self {
        match self {
            Participant::A => Participant::B,
            Participant::B => Participant::A,
        }
    }

    /// Returns who holds the turn after `plies` committed moves.
    pub fn after_plies(plies: usize) -> Self {
        if plies % 2 == 0 {
            Participant::A
        } else {
            Participant::B
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn test_opponent_is_involution() {
        for p in Participant::iter() {
            assert_ne!(p, p.opponent());
            assert_eq!(p, p.opponent().opponent());
        }
    }

    #[test]
    fn test_after_plies_alternates() {
        assert_eq!(Participant::after_plies(0), Participant::A);
        assert_eq!(Participant::after_plies(1), Participant::B);
        assert_eq!(Participant::after_plies(6), Participant::A);
    }

    #[test]
    fn test_parse_case_insensitive() {
        assert_eq!(Participant::from_str("a").unwrap(), Participant::A);
        assert_eq!(Participant::from_str("B").unwrap(), Participant::B);
        assert!(Participant::from_str("C").is_err());
    }
}
