//! Tool registry for managing available tools

use crate::{Result, Tool, ToolError};
use serde_json::Value;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::debug;

/// Registry for managing tools
///
/// Tools are listed in registration order. Registering a tool under an
/// existing name replaces the previous entry in place.
#[derive(Default)]
pub struct ToolRegistry {
    tools: RwLock<Vec<Arc<dyn Tool>>>,
}

impl ToolRegistry {
    /// Create a new tool registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool
    pub fn register(&self, tool: Arc<dyn Tool>) {
        let mut tools = self.tools.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(slot) = tools.iter_mut().find(|t| t.name() == tool.name()) {
            *slot = tool;
        } else {
            tools.push(tool);
        }
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        let tools = self.tools.read().unwrap_or_else(PoisonError::into_inner);
        tools.iter().find(|t| t.name() == name).cloned()
    }

    /// List all registered tools
    pub fn list_tools(&self) -> Vec<Arc<dyn Tool>> {
        let tools = self.tools.read().unwrap_or_else(PoisonError::into_inner);
        tools.clone()
    }

    /// Execute a tool by name
    pub async fn call(&self, name: &str, params: Value) -> Result<String> {
        let tool = self
            .get(name)
            .ok_or_else(|| ToolError::NotFound(name.to_string()))?;
        debug!("Dispatching tool call: {name}");
        tool.execute(params).await
    }

    /// Get the number of registered tools
    pub fn len(&self) -> usize {
        let tools = self.tools.read().unwrap_or_else(PoisonError::into_inner);
        tools.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
