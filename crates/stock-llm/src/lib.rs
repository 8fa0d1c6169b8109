//! LLM access for the stock client
//!
//! - [`ChatProvider`]: single-turn chat completion behind a trait
//! - [`providers::OpenAIProvider`]: any OpenAI-compatible `/chat/completions`
//!   endpoint (Groq by default)
//! - [`ToolSelector`]: asks the model which MCP tool answers a query

pub mod error;
pub mod messages;
pub mod provider;
pub mod providers;
pub mod selector;

pub use error::{LLMError, Result};
pub use messages::{ChatMessage, ChatRequest, Role};
pub use provider::ChatProvider;
pub use selector::{ToolDecision, ToolDescriptor, ToolSelector};
