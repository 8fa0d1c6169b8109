//! Stdio transport MCP server
//!
//! Reads one JSON-RPC message per line from the input stream and writes one
//! response per line to the output stream. Requests are handled strictly in
//! order; a tool call completes before the next line is read.

use crate::protocol::{
    JsonRpcRequest, JsonRpcResponse, McpToolDefinition, McpToolResult, PROTOCOL_VERSION,
    SUPPORTED_PROTOCOL_VERSIONS, error_codes, methods,
};
use crate::Result;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use stock_tools::{ToolError, ToolRegistry};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, info, warn};

/// MCP server exposing the tools of a registry
pub struct McpServer {
    name: String,
    version: String,
    registry: Arc<ToolRegistry>,
}

#[derive(Debug, Deserialize)]
struct CallToolParams {
    name: String,
    #[serde(default)]
    arguments: Value,
}

impl McpServer {
    /// Create a new server
    ///
    /// # Arguments
    ///
    /// * `name` - Server name reported in `serverInfo`
    /// * `version` - Server version reported in `serverInfo`
    /// * `registry` - Tools to advertise and dispatch
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        registry: Arc<ToolRegistry>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            registry,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Serve requests on the process's stdin/stdout until stdin closes
    pub async fn serve_stdio(&self) -> Result<()> {
        let stdin = BufReader::new(tokio::io::stdin());
        let stdout = tokio::io::stdout();
        self.serve(stdin, stdout).await
    }

    /// Serve requests from `reader`, writing responses to `writer`
    pub async fn serve<R, W>(&self, reader: R, mut writer: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        info!("MCP server '{}' listening on stdio", self.name);

        let mut lines = reader.lines();
        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }

            if let Some(response) = self.handle_line(&line).await {
                let mut out = serde_json::to_string(&response)?;
                out.push('\n');
                writer.write_all(out.as_bytes()).await?;
                writer.flush().await?;
            }
        }

        info!("Input closed, MCP server '{}' stopping", self.name);
        Ok(())
    }

    /// Handle one raw line; returns the response to send, if any
    pub async fn handle_line(&self, line: &str) -> Option<JsonRpcResponse> {
        let value: Value = match serde_json::from_str(line) {
            Ok(value) => value,
            Err(e) => {
                warn!("Unparsable message: {e}");
                return Some(JsonRpcResponse::failure(
                    Value::Null,
                    error_codes::PARSE_ERROR,
                    format!("Parse error: {e}"),
                ));
            }
        };

        // Responses from the peer (we never send requests) are ignored
        if value.get("method").is_none()
            && (value.get("result").is_some() || value.get("error").is_some())
        {
            debug!("Ignoring response message from client");
            return None;
        }

        let id = value.get("id").cloned();
        match serde_json::from_value::<JsonRpcRequest>(value) {
            Ok(request) => self.handle_request(request).await,
            Err(e) => id.map(|id| {
                JsonRpcResponse::failure(
                    id,
                    error_codes::INVALID_REQUEST,
                    format!("Invalid request: {e}"),
                )
            }),
        }
    }

    /// Handle a parsed request or notification
    pub async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        let Some(id) = request.id.clone() else {
            debug!("Received notification: {}", request.method);
            return None;
        };

        debug!("Handling request: {}", request.method);

        let response = match request.method.as_str() {
            methods::INITIALIZE => JsonRpcResponse::success(id, self.initialize(&request.params)),
            methods::PING => JsonRpcResponse::success(id, json!({})),
            methods::TOOLS_LIST => JsonRpcResponse::success(id, self.list_tools()),
            methods::TOOLS_CALL => self.call_tool(id, request.params).await,
            other => JsonRpcResponse::failure(
                id,
                error_codes::METHOD_NOT_FOUND,
                format!("Method not found: {other}"),
            ),
        };

        Some(response)
    }

    fn initialize(&self, params: &Value) -> Value {
        let requested = params
            .get("protocolVersion")
            .and_then(Value::as_str)
            .unwrap_or(PROTOCOL_VERSION);

        let protocol_version = if SUPPORTED_PROTOCOL_VERSIONS.contains(&requested) {
            requested
        } else {
            PROTOCOL_VERSION
        };

        if let Some(client) = params.get("clientInfo") {
            info!("Client connected: {client}");
        }

        json!({
            "protocolVersion": protocol_version,
            "capabilities": {
                "tools": { "listChanged": false }
            },
            "serverInfo": {
                "name": self.name,
                "version": self.version
            }
        })
    }

    fn list_tools(&self) -> Value {
        let tools: Vec<McpToolDefinition> = self
            .registry
            .list_tools()
            .iter()
            .map(|tool| McpToolDefinition {
                name: tool.name().to_string(),
                description: Some(tool.description().to_string()),
                input_schema: tool.input_schema(),
            })
            .collect();

        json!({ "tools": tools })
    }

    async fn call_tool(&self, id: Value, params: Value) -> JsonRpcResponse {
        let params: CallToolParams = match serde_json::from_value(params) {
            Ok(params) => params,
            Err(e) => {
                return JsonRpcResponse::failure(
                    id,
                    error_codes::INVALID_PARAMS,
                    format!("Invalid tools/call params: {e}"),
                );
            }
        };

        let result = match self.registry.call(&params.name, params.arguments).await {
            Ok(text) => McpToolResult::text(text),
            Err(ToolError::NotFound(name)) => {
                return JsonRpcResponse::failure(
                    id,
                    error_codes::INVALID_PARAMS,
                    format!("Unknown tool: {name}"),
                );
            }
            Err(e) => {
                warn!("Tool '{}' failed: {e}", params.name);
                McpToolResult::error(e.to_string())
            }
        };

        match serde_json::to_value(result) {
            Ok(value) => JsonRpcResponse::success(id, value),
            Err(e) => JsonRpcResponse::failure(id, error_codes::INTERNAL_ERROR, e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use stock_tools::{Tool, parse_params};

    struct GreetTool;

    #[derive(Deserialize)]
    struct GreetParams {
        who: String,
    }

    #[async_trait]
    impl Tool for GreetTool {
        async fn execute(&self, params: Value) -> stock_tools::Result<String> {
            let params: GreetParams = parse_params(params)?;
            Ok(format!("hello {}", params.who))
        }

        fn name(&self) -> &str {
            "greet"
        }

        fn description(&self) -> &str {
            "Say hello"
        }

        fn input_schema(&self) -> Value {
            json!({
                "type": "object",
                "properties": { "who": { "type": "string" } },
                "required": ["who"]
            })
        }
    }

    fn server() -> McpServer {
        let registry = Arc::new(ToolRegistry::new());
        registry.register(Arc::new(GreetTool));
        McpServer::new("Test Server", "1.2.3", registry)
    }

    #[tokio::test]
    async fn test_initialize() {
        let response = server()
            .handle_line(r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2024-11-05","capabilities":{},"clientInfo":{"name":"t","version":"0"}}}"#)
            .await
            .unwrap();

        let result = response.result.unwrap();
        assert_eq!(result["protocolVersion"], "2024-11-05");
        assert_eq!(result["serverInfo"]["name"], "Test Server");
        assert!(result["capabilities"]["tools"].is_object());
    }

    #[tokio::test]
    async fn test_initialize_unknown_version_falls_back() {
        let response = server()
            .handle_line(r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"1999-01-01"}}"#)
            .await
            .unwrap();
        assert_eq!(response.result.unwrap()["protocolVersion"], PROTOCOL_VERSION);
    }

    #[tokio::test]
    async fn test_notification_gets_no_reply() {
        let response = server()
            .handle_line(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
            .await;
        assert!(response.is_none());
    }

    #[tokio::test]
    async fn test_list_tools() {
        let response = server()
            .handle_line(r#"{"jsonrpc":"2.0","id":"a","method":"tools/list"}"#)
            .await
            .unwrap();

        assert_eq!(response.id, json!("a"));
        let tools = &response.result.unwrap()["tools"];
        assert_eq!(tools[0]["name"], "greet");
        assert_eq!(tools[0]["inputSchema"]["required"][0], "who");
    }

    #[tokio::test]
    async fn test_call_tool() {
        let response = server()
            .handle_line(r#"{"jsonrpc":"2.0","id":2,"method":"tools/call","params":{"name":"greet","arguments":{"who":"world"}}}"#)
            .await
            .unwrap();

        let result = response.result.unwrap();
        assert_eq!(result["content"][0]["text"], "hello world");
        assert_eq!(result["isError"], false);
    }

    #[tokio::test]
    async fn test_call_tool_bad_arguments_is_tool_error() {
        let response = server()
            .handle_line(r#"{"jsonrpc":"2.0","id":3,"method":"tools/call","params":{"name":"greet","arguments":{}}}"#)
            .await
            .unwrap();

        let result = response.result.unwrap();
        assert_eq!(result["isError"], true);
        assert!(result["content"][0]["text"].as_str().unwrap().contains("who"));
    }

    #[tokio::test]
    async fn test_unknown_tool_and_method() {
        let s = server();

        let response = s
            .handle_line(r#"{"jsonrpc":"2.0","id":4,"method":"tools/call","params":{"name":"nope"}}"#)
            .await
            .unwrap();
        assert_eq!(response.error.unwrap().code, error_codes::INVALID_PARAMS);

        let response = s
            .handle_line(r#"{"jsonrpc":"2.0","id":5,"method":"resources/list"}"#)
            .await
            .unwrap();
        assert_eq!(response.error.unwrap().code, error_codes::METHOD_NOT_FOUND);
    }

    #[tokio::test]
    async fn test_parse_error() {
        let response = server().handle_line("{not json").await.unwrap();
        assert_eq!(response.id, Value::Null);
        assert_eq!(response.error.unwrap().code, error_codes::PARSE_ERROR);
    }

    #[tokio::test]
    async fn test_serve_writes_one_line_per_response() {
        let input = concat!(
            r#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#,
            "\n",
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
            "\n\n",
            r#"{"jsonrpc":"2.0","id":2,"method":"tools/call","params":{"name":"greet","arguments":{"who":"x"}}}"#,
            "\n",
        );

        let mut output = Vec::new();
        server().serve(input.as_bytes(), &mut output).await.unwrap();

        let output = String::from_utf8(output).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 2);

        let second: JsonRpcResponse = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second.id, json!(2));
        assert_eq!(second.result.unwrap()["content"][0]["text"], "hello x");
    }
}
