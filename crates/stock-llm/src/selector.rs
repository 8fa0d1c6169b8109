//! LLM-driven tool selection
//!
//! The model sees the user's query and the available tools as JSON and must
//! answer with `{"tool_name": ..., "arguments": {...}}`.

use crate::{ChatMessage, ChatProvider, ChatRequest, LLMError, Result};
use minijinja::{Environment, context};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Sampling temperature for tool selection
pub const SELECTION_TEMPERATURE: f32 = 0.1;

const SELECTION_TEMPLATE: &str = r#"Given this user query: "{{ query }}"

Available tools:
{{ tools }}

Identify which tool to use and what parameters to provide.
Respond ONLY with JSON in this format:
{"tool_name": "tool_name", "arguments": {"param": "value"}}"#;

/// Tool as presented to the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// The model's choice of tool and arguments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDecision {
    pub tool_name: String,
    #[serde(default = "empty_arguments")]
    pub arguments: Value,
}

fn empty_arguments() -> Value {
    Value::Object(Map::new())
}

/// Chooses a tool for a natural-language query
pub struct ToolSelector {
    provider: Arc<dyn ChatProvider>,
    model: String,
}

impl ToolSelector {
    pub fn new(provider: Arc<dyn ChatProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    #[instrument(skip(self, tools), fields(model = %self.model))]
    pub async fn select(&self, query: &str, tools: &[ToolDescriptor]) -> Result<ToolDecision> {
        let prompt = render_prompt(query, tools)?;

        let request = ChatRequest::new(self.model.clone())
            .message(ChatMessage::user(prompt))
            .temperature(SELECTION_TEMPERATURE);

        let reply = self.provider.complete(request).await?;
        debug!("Selector reply: {reply}");

        parse_decision(&reply)
    }
}

/// Render the selection prompt
pub fn render_prompt(query: &str, tools: &[ToolDescriptor]) -> Result<String> {
    let tools = serde_json::to_string_pretty(tools)?;
    let env = Environment::new();
    Ok(env.render_str(SELECTION_TEMPLATE, context! { query, tools })?)
}

/// Parse a model reply into a decision
///
/// Markdown code fences are stripped and the outermost `{...}` span is
/// decoded. A missing or blank `tool_name` is rejected; a missing or `null`
/// `arguments` becomes `{}`.
pub fn parse_decision(reply: &str) -> Result<ToolDecision> {
    let fence = regex::Regex::new(r"```(?:json|JSON)?")
        .map_err(|e| LLMError::InvalidDecision(e.to_string()))?;
    let unfenced = fence.replace_all(reply, "");

    let object = regex::Regex::new(r"(?s)\{.*\}")
        .map_err(|e| LLMError::InvalidDecision(e.to_string()))?;
    let json = object
        .find(&unfenced)
        .map(|m| m.as_str())
        .ok_or_else(|| LLMError::InvalidDecision(format!("no JSON object in reply: {reply}")))?;

    let mut decision: ToolDecision = serde_json::from_str(json)
        .map_err(|e| LLMError::InvalidDecision(format!("{e}: {json}")))?;

    decision.tool_name = decision.tool_name.trim().to_string();
    if decision.tool_name.is_empty() {
        return Err(LLMError::InvalidDecision("tool_name is empty".to_string()));
    }
    if decision.arguments.is_null() {
        decision.arguments = empty_arguments();
    }

    Ok(decision)
}
