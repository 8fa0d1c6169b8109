//! Client session: one MCP server connection plus a tool selector

use anyhow::{Context, Result};
use comfy_table::{Table, presets::UTF8_FULL};
use stock_llm::{ToolDecision, ToolDescriptor, ToolSelector};
use stock_mcp::McpToolDefinition;
use stock_mcp::client::ArcMcpClient;
use tracing::{debug, info};

/// What the REPL should do with a line of input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Quit,
    Empty,
    Query(String),
}

impl Input {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return Self::Empty;
        }
        match line.to_lowercase().as_str() {
            "quit" | "exit" | "q" => Self::Quit,
            _ => Self::Query(line.to_string()),
        }
    }
}

/// Result of answering one query
#[derive(Debug, Clone, PartialEq)]
pub struct QueryOutcome {
    pub decision: ToolDecision,
    pub text: String,
    pub is_error: bool,
}

pub struct ClientSession {
    client: ArcMcpClient,
    selector: ToolSelector,
    tools: Vec<ToolDescriptor>,
}

impl ClientSession {
    /// Connect to the server and fetch its tool list
    pub async fn start(client: ArcMcpClient, selector: ToolSelector) -> Result<Self> {
        client
            .connect()
            .await
            .context("Failed to connect to MCP server")?;

        let tools: Vec<ToolDescriptor> = client
            .list_tools()
            .await
            .context("Failed to list tools")?
            .into_iter()
            .map(descriptor)
            .collect();

        info!("Connected; {} tools available", tools.len());

        Ok(Self {
            client,
            selector,
            tools,
        })
    }

    pub fn tools(&self) -> &[ToolDescriptor] {
        &self.tools
    }

    /// Table of the server's tools for display
    pub fn tool_table(&self) -> Table {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        table.set_header(vec!["Tool", "Description"]);
        for tool in &self.tools {
            table.add_row(vec![tool.name.as_str(), tool.description.as_str()]);
        }
        table
    }

    /// Let the model choose a tool for `query`, then call it
    pub async fn ask(&self, query: &str) -> Result<QueryOutcome> {
        let decision = self
            .selector
            .select(query, &self.tools)
            .await
            .context("Tool selection failed")?;

        debug!("Calling {} with {}", decision.tool_name, decision.arguments);

        let result = self
            .client
            .call_tool(&decision.tool_name, decision.arguments.clone())
            .await
            .with_context(|| format!("Tool call '{}' failed", decision.tool_name))?;

        let text = result
            .first_text()
            .unwrap_or("(no text content)")
            .to_string();

        Ok(QueryOutcome {
            is_error: result.is_error(),
            decision,
            text,
        })
    }

    pub async fn close(&self) -> Result<()> {
        self.client.disconnect().await?;
        Ok(())
    }
}

fn descriptor(tool: McpToolDefinition) -> ToolDescriptor {
    ToolDescriptor {
        name: tool.name,
        description: tool.description.unwrap_or_default(),
        parameters: tool.input_schema,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::{Value, json};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};
    use stock_llm::{ChatProvider, ChatRequest, LLMError};
    use stock_mcp::{McpError, McpServerInfo, McpToolResult};

    #[derive(Default)]
    struct FakeServer {
        connected: AtomicBool,
        calls: Mutex<Vec<(String, Value)>>,
    }

    #[async_trait]
    impl stock_mcp::McpClient for FakeServer {
        async fn connect(&self) -> stock_mcp::Result<()> {
            self.connected.store(true, Ordering::SeqCst);
            Ok(())
        }

        fn is_connected(&self) -> bool {
            self.connected.load(Ordering::SeqCst)
        }

        async fn disconnect(&self) -> stock_mcp::Result<()> {
            self.connected.store(false, Ordering::SeqCst);
            Ok(())
        }

        async fn list_tools(&self) -> stock_mcp::Result<Vec<McpToolDefinition>> {
            Ok(vec![McpToolDefinition {
                name: "get_stock_price".to_string(),
                description: Some("Retrieve the current stock price".to_string()),
                input_schema: json!({"type": "object"}),
            }])
        }

        async fn call_tool(&self, name: &str, arguments: Value) -> stock_mcp::Result<McpToolResult> {
            self.calls
                .lock()
                .unwrap()
                .push((name.to_string(), arguments.clone()));
            match name {
                "get_stock_price" => Ok(McpToolResult::text(format!(
                    "Current price of {} is $175.64 (from local data)",
                    arguments["symbol"].as_str().unwrap_or_default()
                ))),
                other => Err(McpError::RequestFailed {
                    method: "tools/call".to_string(),
                    code: -32602,
                    message: format!("Unknown tool: {other}"),
                }),
            }
        }

        async fn server_info(&self) -> Option<McpServerInfo> {
            None
        }
    }

    struct ScriptedModel(&'static str);

    #[async_trait]
    impl ChatProvider for ScriptedModel {
        async fn complete(&self, _request: ChatRequest) -> stock_llm::Result<String> {
            Ok(self.0.to_string())
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    struct BrokenModel;

    #[async_trait]
    impl ChatProvider for BrokenModel {
        async fn complete(&self, _request: ChatRequest) -> stock_llm::Result<String> {
            Err(LLMError::AuthenticationFailed)
        }

        fn name(&self) -> &str {
            "broken"
        }
    }

    async fn session(
        server: &Arc<FakeServer>,
        model: Arc<dyn ChatProvider>,
    ) -> ClientSession {
        let client: ArcMcpClient = Arc::clone(server) as ArcMcpClient;
        ClientSession::start(client, ToolSelector::new(model, "test-model"))
            .await
            .unwrap()
    }

    #[test]
    fn test_input_parsing() {
        assert_eq!(Input::parse("quit"), Input::Quit);
        assert_eq!(Input::parse("  EXIT "), Input::Quit);
        assert_eq!(Input::parse("q"), Input::Quit);
        assert_eq!(Input::parse("   "), Input::Empty);
        assert_eq!(
            Input::parse(" price of aapl "),
            Input::Query("price of aapl".to_string())
        );
    }

    #[tokio::test]
    async fn test_start_lists_tools() {
        let server = Arc::new(FakeServer::default());
        let s = session(&server, Arc::new(ScriptedModel("{}"))).await;

        assert!(server.connected.load(Ordering::SeqCst));
        assert_eq!(s.tools().len(), 1);
        assert_eq!(s.tools()[0].name, "get_stock_price");

        let table = s.tool_table().to_string();
        assert!(table.contains("get_stock_price"));
        assert!(table.contains("Retrieve the current stock price"));

        s.close().await.unwrap();
        assert!(!server.connected.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_ask_routes_to_chosen_tool() {
        let server = Arc::new(FakeServer::default());
        let model = Arc::new(ScriptedModel(
            "```json\n{\"tool_name\": \"get_stock_price\", \"arguments\": {\"symbol\": \"AAPL\"}}\n```",
        ));
        let s = session(&server, model).await;

        let outcome = s.ask("what is apple trading at?").await.unwrap();
        assert_eq!(outcome.decision.tool_name, "get_stock_price");
        assert_eq!(outcome.text, "Current price of AAPL is $175.64 (from local data)");
        assert!(!outcome.is_error);

        let calls = server.calls.lock().unwrap();
        assert_eq!(calls.as_slice(), [("get_stock_price".to_string(), json!({"symbol": "AAPL"}))]);
    }

    #[tokio::test]
    async fn test_ask_reports_unknown_tool() {
        let server = Arc::new(FakeServer::default());
        let model = Arc::new(ScriptedModel(r#"{"tool_name": "buy_stock", "arguments": {}}"#));
        let s = session(&server, model).await;

        let err = s.ask("buy me some apple").await.unwrap_err();
        assert!(format!("{err:#}").contains("Unknown tool: buy_stock"));
    }

    #[tokio::test]
    async fn test_ask_reports_selection_failure() {
        let server = Arc::new(FakeServer::default());
        let s = session(&server, Arc::new(BrokenModel)).await;

        let err = s.ask("anything").await.unwrap_err();
        assert!(err.to_string().contains("Tool selection failed"));
        assert!(server.calls.lock().unwrap().is_empty());
    }
}
