//! Umpire configuration loaded from TOML.

use crate::llm_client::{LlmClient, LlmConfig, LlmProvider, MOVE_REPLY_MAX_TOKENS};
use crate::llm_resolver::LlmResolver;
use derive_getters::Getters;
use derive_more::{Display, Error};
use derive_setters::Setters;
use serde::{Deserialize, Serialize};
use shakmaty::Chess;
use std::path::Path;
use std::time::Duration;
use strictly_chess::{ChessError, ChessOracle, DEFAULT_MOVE_LIMIT_PLIES, NotationResolver};
use strictly_umpire::{MoveResolver, Umpire};
use tracing::{debug, info, instrument};

/// Umpire over standard chess with a resolver picked at runtime.
pub type ChessUmpire = Umpire<ChessOracle, Box<dyn MoveResolver<Chess>>>;

/// Which move resolver turns proposals into tokens.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ResolverKind {
    /// Reads UCI or SAN straight out of the text.
    Notation,
    /// Asks an LLM to translate the text.
    Llm,
}

/// Configuration for an umpire session.
#[derive(Debug, Clone, PartialEq, Getters, Setters, Serialize, Deserialize)]
#[setters(prefix = "with_", strip_option)]
pub struct UmpireConfig {
    /// Resolver used for proposals.
    #[serde(default = "default_resolver")]
    resolver: ResolverKind,

    /// LLM provider (openai or anthropic).
    #[serde(default = "default_provider")]
    llm_provider: LlmProvider,

    /// LLM model name (e.g., "gpt-4o-mini", "claude-3-5-haiku-20241022").
    #[serde(default = "default_model")]
    llm_model: String,

    /// Maximum tokens for LLM replies. A UCI move needs very few.
    #[serde(default = "default_max_tokens")]
    llm_max_tokens: u32,

    /// Custom API base for OpenAI-compatible servers.
    #[serde(default)]
    llm_base_url: Option<String>,

    /// Seconds a resolver may take before the proposal is rejected; 0 disables.
    #[serde(default = "default_resolver_timeout_secs")]
    resolver_timeout_secs: u64,

    /// Halfmove-clock value at which the game is drawn.
    #[serde(default = "default_move_limit_plies")]
    move_limit_plies: u32,

    /// Starting position; the standard one when absent.
    #[serde(default)]
    initial_fen: Option<String>,
}

fn default_resolver() -> ResolverKind {
    ResolverKind::Notation
}

fn default_provider() -> LlmProvider {
    LlmProvider::OpenAI
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_max_tokens() -> u32 {
    MOVE_REPLY_MAX_TOKENS
}

fn default_resolver_timeout_secs() -> u64 {
    30
}

fn default_move_limit_plies() -> u32 {
    DEFAULT_MOVE_LIMIT_PLIES
}

impl Default for UmpireConfig {
    fn default() -> Self {
        Self {
            resolver: default_resolver(),
            llm_provider: default_provider(),
            llm_model: default_model(),
            llm_max_tokens: default_max_tokens(),
            llm_base_url: None,
            resolver_timeout_secs: default_resolver_timeout_secs(),
            move_limit_plies: default_move_limit_plies(),
            initial_fen: None,
        }
    }
}

impl UmpireConfig {
    /// Loads configuration from TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;

        info!(resolver = %config.resolver, "Config loaded successfully");
        Ok(config)
    }

    /// Loads from `path` when given, otherwise returns the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                debug!("No config file given, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Resolver deadline, or `None` when disabled.
    pub fn resolver_timeout(&self) -> Option<Duration> {
        (self.resolver_timeout_secs > 0).then(|| Duration::from_secs(self.resolver_timeout_secs))
    }

    /// Creates LLM configuration from this config.
    ///
    /// Requires OPENAI_API_KEY or ANTHROPIC_API_KEY, unless a custom base
    /// URL is set, in which case a missing key is sent as empty.
    #[instrument(skip(self), fields(provider = %self.llm_provider, model = %self.llm_model))]
    pub fn create_llm_config(&self) -> Result<LlmConfig, ConfigError> {
        debug!("Creating LLM config");

        let var = match self.llm_provider {
            LlmProvider::OpenAI => "OPENAI_API_KEY",
            LlmProvider::Anthropic => "ANTHROPIC_API_KEY",
        };
        let api_key = match (std::env::var(var), &self.llm_base_url) {
            (Ok(key), _) => key,
            (Err(_), Some(_)) => String::new(),
            (Err(_), None) => {
                return Err(ConfigError::new(format!(
                    "{} environment variable not set",
                    var
                )));
            }
        };

        let config = LlmConfig::new(
            self.llm_provider,
            api_key,
            self.llm_model.clone(),
            self.llm_max_tokens,
        );
        Ok(match &self.llm_base_url {
            Some(base_url) => config.with_base_url(base_url.clone()),
            None => config,
        })
    }

    /// Builds the chess oracle for the configured start and move limit.
    #[instrument(skip(self))]
    pub fn build_oracle(&self) -> Result<ChessOracle, ConfigError> {
        let oracle = match &self.initial_fen {
            Some(fen) => ChessOracle::from_fen(fen)?,
            None => ChessOracle::new(),
        };
        Ok(oracle.with_move_limit(self.move_limit_plies))
    }

    /// Builds the configured move resolver.
    #[instrument(skip(self), fields(resolver = %self.resolver))]
    pub fn build_resolver(&self) -> Result<Box<dyn MoveResolver<Chess>>, ConfigError> {
        Ok(match self.resolver {
            ResolverKind::Notation => Box::new(NotationResolver::new()),
            ResolverKind::Llm => {
                let client = LlmClient::new(self.create_llm_config()?);
                Box::new(LlmResolver::new(client))
            }
        })
    }

    /// Builds an umpire wired up as configured.
    #[instrument(skip(self))]
    pub fn build_umpire(&self) -> Result<ChessUmpire, ConfigError> {
        let umpire = Umpire::new(self.build_oracle()?, self.build_resolver()?);
        Ok(match self.resolver_timeout() {
            Some(timeout) => umpire.with_resolver_timeout(timeout),
            None => umpire,
        })
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

impl From<ChessError> for ConfigError {
    #[track_caller]
    fn from(err: ChessError) -> Self {
        Self::new(format!("Invalid starting position: {}", err.message))
    }
}
