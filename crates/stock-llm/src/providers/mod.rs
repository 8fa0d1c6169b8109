//! Concrete chat providers

pub mod openai;

pub use openai::{OpenAIConfig, OpenAIProvider};
