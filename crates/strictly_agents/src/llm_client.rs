//! Chat completion client used to translate proposals into moves.
//!
//! OpenAI goes through async-openai; Anthropic is spoken directly over
//! reqwest with typed request and reply bodies.

use async_openai::{
    Client as OpenAIClient,
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
};
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument};

const ANTHROPIC_MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Reply budget for a single move: a UCI token plus slack for stray words.
pub const MOVE_REPLY_MAX_TOKENS: u32 = 16;

/// LLM provider selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LlmProvider {
    /// OpenAI (GPT models) or any OpenAI-compatible endpoint.
    OpenAI,
    /// Anthropic (Claude models).
    Anthropic,
}

/// Configuration for LLM client.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    provider: LlmProvider,
    api_key: String,
    model: String,
    max_tokens: u32,
    base_url: Option<String>,
}

impl LlmConfig {
    /// Creates a new LLM configuration.
    #[instrument(skip(api_key), fields(provider = ?provider, model = %model))]
    pub fn new(provider: LlmProvider, api_key: String, model: String, max_tokens: u32) -> Self {
        debug!("Creating LLM config");
        Self {
            provider,
            api_key,
            model,
            max_tokens,
            base_url: None,
        }
    }

    /// Creates a configuration sized for one-move replies.
    pub fn for_moves(provider: LlmProvider, api_key: String, model: String) -> Self {
        Self::new(provider, api_key, model, MOVE_REPLY_MAX_TOKENS)
    }

    /// Points the client at a different API base (OpenAI-compatible servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Gets the provider.
    pub fn provider(&self) -> LlmProvider {
        self.provider
    }

    /// Gets the API key.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Gets the model name.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Gets the max tokens.
    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
    }

    /// Gets the custom API base, if any.
    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }
}

/// Body of an Anthropic messages request.
#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: [UserTurn<'a>; 1],
}

/// The single user turn a move request carries.
#[derive(Debug, Serialize)]
struct UserTurn<'a> {
    role: &'static str,
    content: &'a str,
}

/// The part of an Anthropic messages reply the umpire reads.
#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

/// One block of reply content. Only text blocks carry a move.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text { text: String },
    #[serde(other)]
    Other,
}

impl MessagesResponse {
    /// Returns the first text block, skipping thinking and tool blocks.
    fn into_text(self) -> Option<String> {
        self.content.into_iter().find_map(|block| match block {
            ContentBlock::Text { text } => Some(text),
            ContentBlock::Other => None,
        })
    }
}

/// Logs a provider failure and wraps it with context.
#[track_caller]
fn failure(context: &str, e: impl std::fmt::Display) -> LlmError {
    error!(error = %e, context, "LLM call failed");
    LlmError::new(format!("{}: {}", context, e))
}

/// Chat completion client for the move resolver.
///
/// One call sends one system prompt and one user turn and returns the
/// reply text, which is all a move translation needs.
#[derive(Debug, Clone)]
pub struct LlmClient {
    config: LlmConfig,
    http: reqwest::Client,
}

impl LlmClient {
    /// Creates a new LLM client.
    #[instrument(skip(config), fields(provider = %config.provider()))]
    pub fn new(config: LlmConfig) -> Self {
        info!("Creating LLM client");
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    /// Returns the client configuration.
    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    /// Sends one system prompt and user message, returning the reply text.
    #[instrument(skip(self, system_prompt, user_message), fields(provider = %self.config.provider, model = %self.config.model))]
    pub async fn generate(
        &self,
        system_prompt: &str,
        user_message: &str,
    ) -> Result<String, LlmError> {
        let reply = match self.config.provider {
            LlmProvider::OpenAI => self.ask_openai(system_prompt, user_message).await?,
            LlmProvider::Anthropic => self.ask_anthropic(system_prompt, user_message).await?,
        };
        info!(reply_length = reply.len(), "Model replied");
        Ok(reply)
    }

    async fn ask_anthropic(&self, system: &str, user: &str) -> Result<String, LlmError> {
        let url = self.config.base_url().unwrap_or(ANTHROPIC_MESSAGES_URL);
        let body = MessagesRequest {
            model: &self.config.model,
            max_tokens: self.config.max_tokens,
            system,
            messages: [UserTurn {
                role: "user",
                content: user,
            }],
        };

        debug!(url, "Sending request to Anthropic");
        let response = self
            .http
            .post(url)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| failure("Anthropic request failed", e))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| failure("Failed to read Anthropic reply", e))?;
        if !status.is_success() {
            return Err(failure("Anthropic API error", format!("{} {}", status, text)));
        }

        serde_json::from_str::<MessagesResponse>(&text)
            .map_err(|e| failure("Malformed Anthropic reply", e))?
            .into_text()
            .ok_or_else(|| failure("Anthropic reply", "no text content"))
    }

    async fn ask_openai(&self, system: &str, user: &str) -> Result<String, LlmError> {
        let mut openai_config = OpenAIConfig::new().with_api_key(self.config.api_key.clone());
        if let Some(base_url) = self.config.base_url() {
            debug!(base_url, "Using custom OpenAI API base");
            openai_config = openai_config.with_api_base(base_url);
        }
        let client = OpenAIClient::with_config(openai_config);

        let messages = vec![
            ChatCompletionRequestMessage::System(
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(system)
                    .build()
                    .map_err(|e| failure("Failed to build system message", e))?,
            ),
            ChatCompletionRequestMessage::User(
                ChatCompletionRequestUserMessageArgs::default()
                    .content(user)
                    .build()
                    .map_err(|e| failure("Failed to build user message", e))?,
            ),
        ];
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.config.model)
            .messages(messages)
            .max_completion_tokens(self.config.max_tokens)
            .build()
            .map_err(|e| failure("Failed to build OpenAI request", e))?;

        debug!("Sending request to OpenAI");
        let response = client
            .chat()
            .create(request)
            .await
            .map_err(|e| failure("OpenAI API error", e))?;

        response
            .choices
            .into_iter()
            .find_map(|choice| choice.message.content)
            .ok_or_else(|| failure("OpenAI reply", "no text content"))
    }
}

/// LLM client error.
#[derive(Debug, Clone, Display, Error)]
#[display("LLM error: {} at {}:{}", message, file, line)]
pub struct LlmError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl LlmError {
    /// Creates a new LLM error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        let message = message.into();
        error!(error_message = %message, "LLM error created");
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
