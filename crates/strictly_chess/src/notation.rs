//! Deterministic move resolvers that read chess notation out of text.

use async_trait::async_trait;
use shakmaty::san::San;
use shakmaty::uci::Uci;
use shakmaty::{CastlingMode, Chess};
use std::collections::HashMap;
use strictly_umpire::{MoveResolver, MoveToken, ResolveError};
use tracing::{debug, instrument};

/// Normalizes a raw move string: trims, drops `-` and lowercases.
///
/// `"E2-E4 "` becomes `"e2e4"`.
pub fn normalize_token(raw: &str) -> String {
    raw.trim()
        .chars()
        .filter(|c| *c != '-')
        .collect::<String>()
        .to_lowercase()
}

/// Returns true if the token is a plain UCI board move such as `e2e4` or `e7e8q`.
pub fn looks_like_uci(token: &str) -> bool {
    (4..=5).contains(&token.len())
        && matches!(token.parse::<Uci>(), Ok(Uci::Normal { .. }))
}

fn strip_punctuation(word: &str) -> &str {
    word.trim_matches(|c: char| !c.is_ascii_alphanumeric())
}

/// Resolver that picks move notation out of a sentence.
///
/// The first UCI-shaped word wins. Failing that, the first word that is
/// valid SAN in the current position is converted to UCI. The resolver
/// never checks UCI words for legality; that is the oracle's call.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotationResolver;

impl NotationResolver {
    /// Creates a notation resolver.
    pub fn new() -> Self {
        Self
    }

    fn find_uci(text: &str) -> Option<MoveToken> {
        text.split_whitespace()
            .map(|word| normalize_token(strip_punctuation(word)))
            .find(|word| looks_like_uci(word))
            .map(MoveToken::new)
    }

    fn find_san(text: &str, state: &Chess) -> Option<MoveToken> {
        text.split_whitespace().find_map(|word| {
            let san: San = strip_punctuation(word).parse().ok()?;
            let m = san.to_move(state).ok()?;
            Some(MoveToken::new(m.to_uci(CastlingMode::Standard).to_string()))
        })
    }
}

#[async_trait]
impl MoveResolver<Chess> for NotationResolver {
    #[instrument(skip(self, state))]
    async fn resolve(&self, text: &str, state: &Chess) -> Result<MoveToken, ResolveError> {
        if let Some(token) = Self::find_uci(text) {
            debug!(token = %token, "Found UCI notation");
            return Ok(token);
        }
        if let Some(token) = Self::find_san(text, state) {
            debug!(token = %token, "Converted SAN notation");
            return Ok(token);
        }
        Err(ResolveError::new(format!(
            "No move notation found in '{}'",
            text.trim()
        )))
    }
}

/// Resolver backed by a fixed phrase table.
///
/// Phrases match exactly after trimming, ignoring case. Stands in for an
/// LLM when a deterministic interpretation is needed.
#[derive(Debug, Clone, Default)]
pub struct ScriptedResolver {
    phrases: HashMap<String, MoveToken>,
}

impl ScriptedResolver {
    /// Creates an empty phrase table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a phrase and the token it resolves to.
    pub fn with_phrase(mut self, phrase: &str, token: impl Into<MoveToken>) -> Self {
        self.phrases.insert(Self::key(phrase), token.into());
        self
    }

    /// Number of known phrases.
    pub fn len(&self) -> usize {
        self.phrases.len()
    }

    /// Returns true if no phrases are known.
    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }

    fn key(phrase: &str) -> String {
        phrase.trim().to_lowercase()
    }
}

#[async_trait]
impl<S: Sync> MoveResolver<S> for ScriptedResolver {
    #[instrument(skip(self, _state))]
    async fn resolve(&self, text: &str, _state: &S) -> Result<MoveToken, ResolveError> {
        self.phrases
            .get(&Self::key(text))
            .cloned()
            .ok_or_else(|| ResolveError::new(format!("No scripted move for '{}'", text.trim())))
    }
}
