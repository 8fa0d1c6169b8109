//! Tool trait definition

use crate::{Result, ToolError};
use async_trait::async_trait;
use serde_json::Value;

/// Trait for tools exposed to MCP clients
///
/// Each tool must provide a name, description, and JSON schema for its input.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Execute the tool with the given arguments
    ///
    /// # Arguments
    ///
    /// * `params` - Tool input as JSON value (should match `input_schema`)
    ///
    /// # Returns
    ///
    /// Human-readable text result
    async fn execute(&self, params: Value) -> Result<String>;

    /// Get the tool's name
    ///
    /// Must be unique within a ToolRegistry
    fn name(&self) -> &str;

    /// Get the tool's description
    ///
    /// This description helps the language model decide when to use this tool
    fn description(&self) -> &str;

    /// Get the tool's input schema (JSON Schema format)
    ///
    /// # Example
    ///
    /// ```
    /// use serde_json::json;
    ///
    /// let schema = json!({
    ///     "type": "object",
    ///     "properties": {
    ///         "symbol": { "type": "string" }
    ///     },
    ///     "required": ["symbol"]
    /// });
    /// ```
    fn input_schema(&self) -> Value;
}

/// Deserialize tool arguments into a typed parameter struct
///
/// A missing or `null` argument object is treated as `{}` so that
/// parameterless tools accept calls without arguments.
pub fn parse_params<T>(params: Value) -> Result<T>
where
    T: serde::de::DeserializeOwned,
{
    let params = if params.is_null() {
        Value::Object(serde_json::Map::new())
    } else {
        params
    };
    serde_json::from_value(params).map_err(|e| ToolError::InvalidParameters(e.to_string()))
}
