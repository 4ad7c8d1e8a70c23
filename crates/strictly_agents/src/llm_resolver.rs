//! Move resolver that asks an LLM to translate text into UCI.

use crate::llm_client::LlmClient;
use async_trait::async_trait;
use shakmaty::{Chess, Color, Position};
use strictly_chess::{looks_like_uci, normalize_token, position_to_fen};
use strictly_umpire::{MoveResolver, MoveToken, ResolveError};
use tracing::{debug, instrument, warn};

const SYSTEM_PROMPT: &str = "You translate a chess player's natural language move \
into UCI notation for the given position. Reply with the move only: four or five \
characters such as e2e4 or e7e8q. No explanation, no punctuation.";

/// Builds the user message sent for one proposal.
pub fn build_user_prompt(text: &str, state: &Chess) -> String {
    let side = match state.turn() {
        Color::White => "White",
        Color::Black => "Black",
    };
    format!(
        "Position (FEN): {}\nSide to move: {}\nPlayer says: {}",
        position_to_fen(state),
        side,
        text.trim()
    )
}

/// Turns a raw model reply into a move token.
///
/// The reply is normalized; anything that is not a UCI board move is
/// rejected. Legality is left to the rules oracle.
pub fn interpret_reply(reply: &str) -> Result<MoveToken, ResolveError> {
    let token = normalize_token(reply.trim().trim_end_matches('.'));
    if looks_like_uci(&token) {
        Ok(MoveToken::new(token))
    } else {
        Err(ResolveError::new(format!(
            "Model reply '{}' is not a UCI move",
            reply.trim()
        )))
    }
}

/// LLM-backed resolver for chess proposals.
#[derive(Debug, Clone)]
pub struct LlmResolver {
    client: LlmClient,
}

impl LlmResolver {
    /// Creates a resolver over the given client.
    pub fn new(client: LlmClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl MoveResolver<Chess> for LlmResolver {
    #[instrument(skip(self, state), fields(model = %self.client.config().model()))]
    async fn resolve(&self, text: &str, state: &Chess) -> Result<MoveToken, ResolveError> {
        let prompt = build_user_prompt(text, state);
        let reply = self
            .client
            .generate(SYSTEM_PROMPT, &prompt)
            .await
            .map_err(|e| {
                warn!(error = %e, "LLM request failed");
                ResolveError::new(format!("LLM request failed: {}", e.message))
            })?;
        debug!(reply = %reply, "Model replied");
        interpret_reply(&reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interpret_reply_normalizes() {
        assert_eq!(interpret_reply(" E2-E4\n").unwrap().as_str(), "e2e4");
        assert_eq!(interpret_reply("e7e8q.").unwrap().as_str(), "e7e8q");
    }

    #[test]
    fn test_interpret_reply_rejects_prose() {
        assert!(interpret_reply("I would play e4").is_err());
        assert!(interpret_reply("").is_err());
        assert!(interpret_reply("0000").is_err());
    }

    #[test]
    fn test_user_prompt_carries_position() {
        let prompt = build_user_prompt("  push the king pawn ", &Chess::default());
        assert!(prompt.contains("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"));
        assert!(prompt.contains("Side to move: White"));
        assert!(prompt.ends_with("Player says: push the king pawn"));
    }
}
