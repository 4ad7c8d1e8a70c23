//! Opaque move tokens.

use derive_more::{Display, From};
use serde::{Deserialize, Serialize};

/// A move in whatever notation the rules oracle understands.
///
/// The umpire never looks inside a token; resolvers produce them and
/// oracles consume them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, From, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MoveToken(String);

impl MoveToken {
    /// Wraps a token string.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the token text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for MoveToken {
    fn from(token: &str) -> Self {
        Self(token.to_string())
    }
}

impl AsRef<str> for MoveToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
