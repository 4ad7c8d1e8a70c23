//! Strictly Agents - the moving parts around the umpire
//!
//! Resolves free-form proposals with an LLM, loads umpire configuration,
//! and drives sessions from a single task so that submissions against one
//! session never overlap.
//!
//! # Architecture
//!
//! - **LlmClient**: OpenAI and Anthropic chat completion
//! - **LlmResolver**: free-form text to UCI through the LLM
//! - **UmpireConfig**: TOML configuration and umpire wiring
//! - **SessionDriver**: mailbox actor that owns one session

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod driver;
mod llm_client;
mod llm_resolver;

pub mod cli;

// Crate-level exports - Configuration
pub use config::{ChessUmpire, ConfigError, ResolverKind, UmpireConfig};

// Crate-level exports - Session driver
pub use driver::{DEFAULT_MAILBOX_CAPACITY, DriverError, DriverHandle, SessionDriver, SessionView};

// Crate-level exports - LLM
pub use llm_client::{LlmClient, LlmConfig, LlmError, LlmProvider, MOVE_REPLY_MAX_TOKENS};
pub use llm_resolver::{LlmResolver, build_user_prompt, interpret_reply};
