//! Stdio transport MCP client
//!
//! Communicates with an MCP server via standard input/output by spawning
//! the server as a child process.

use super::McpClient;
use crate::error::McpError;
use crate::protocol::{
    JsonRpcRequest, JsonRpcResponse, McpServerInfo, McpToolDefinition, McpToolResult,
    PROTOCOL_VERSION, methods,
};
use crate::Result;
use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::Mutex;
use tracing::{debug, info};

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// MCP client using stdio transport
///
/// Spawns the server as a child process and exchanges newline-delimited
/// JSON-RPC 2.0 messages over its stdin/stdout. The server's stderr is
/// inherited so its logs stay visible.
pub struct StdioMcpClient {
    command: String,
    args: Vec<String>,
    env: HashMap<String, String>,
    cwd: Option<PathBuf>,
    request_timeout: Duration,

    child: Arc<Mutex<Option<Child>>>,
    stdin: Arc<Mutex<Option<ChildStdin>>>,
    stdout: Arc<Mutex<Option<BufReader<ChildStdout>>>>,
    server_info: Arc<Mutex<Option<McpServerInfo>>>,
    connected: AtomicBool,
    request_id: AtomicU64,
}

impl StdioMcpClient {
    /// Create a new stdio MCP client
    ///
    /// # Arguments
    ///
    /// * `command` - Server command to execute
    /// * `args` - Command arguments
    pub fn new(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
            env: HashMap::new(),
            cwd: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            child: Arc::new(Mutex::new(None)),
            stdin: Arc::new(Mutex::new(None)),
            stdout: Arc::new(Mutex::new(None)),
            server_info: Arc::new(Mutex::new(None)),
            connected: AtomicBool::new(false),
            request_id: AtomicU64::new(0),
        }
    }

    /// Set an environment variable for the server process
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Set the server's working directory
    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    /// Set the per-request timeout
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    fn next_request_id(&self) -> u64 {
        self.request_id.fetch_add(1, Ordering::SeqCst) + 1
    }

    async fn write_message(&self, message: &JsonRpcRequest) -> Result<()> {
        let mut stdin = self.stdin.lock().await;
        let stdin = stdin.as_mut().ok_or(McpError::NotConnected)?;

        let mut line = serde_json::to_string(message)?;
        line.push('\n');
        stdin
            .write_all(line.as_bytes())
            .await
            .map_err(|e| McpError::ConnectionFailed(e.to_string()))?;
        stdin
            .flush()
            .await
            .map_err(|e| McpError::ConnectionFailed(e.to_string()))?;
        Ok(())
    }

    /// Read lines until the response carrying `id` arrives
    async fn read_response(&self, id: u64) -> Result<JsonRpcResponse> {
        let mut stdout = self.stdout.lock().await;
        let stdout = stdout.as_mut().ok_or(McpError::NotConnected)?;

        loop {
            let mut line = String::new();
            let read = stdout
                .read_line(&mut line)
                .await
                .map_err(|e| McpError::ConnectionFailed(e.to_string()))?;

            if read == 0 {
                return Err(McpError::ConnectionFailed(
                    "Server closed connection".to_string(),
                ));
            }

            let Ok(value) = serde_json::from_str::<Value>(&line) else {
                debug!("Skipping non-JSON line from server: {}", line.trim_end());
                continue;
            };

            if value.get("id") != Some(&Value::from(id)) || value.get("method").is_some() {
                debug!("Skipping unrelated message from server");
                continue;
            }

            return Ok(serde_json::from_value(value)?);
        }
    }

    /// Send a JSON-RPC request and wait for its result
    async fn send_request(&self, method: &str, params: Value) -> Result<Value> {
        let id = self.next_request_id();
        let request = JsonRpcRequest::new(id, method, params);

        debug!("Sending request: {}", method);

        let exchange = async {
            self.write_message(&request).await?;
            self.read_response(id).await
        };

        let response = tokio::time::timeout(self.request_timeout, exchange)
            .await
            .map_err(|_| McpError::Timeout(method.to_string()))??;

        debug!("Received response for: {}", method);

        if let Some(error) = response.error {
            return Err(McpError::RequestFailed {
                method: method.to_string(),
                code: error.code,
                message: error.message,
            });
        }

        response
            .result
            .ok_or_else(|| McpError::InvalidResponse(format!("No result for {method}")))
    }

    /// Send initialize request followed by the initialized notification
    async fn initialize(&self) -> Result<McpServerInfo> {
        let params = json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {},
            "clientInfo": {
                "name": "stock-client",
                "version": env!("CARGO_PKG_VERSION")
            }
        });

        let result = self
            .send_request(methods::INITIALIZE, params)
            .await
            .map_err(|e| McpError::InitializationFailed(e.to_string()))?;

        let server_info = McpServerInfo {
            name: result["serverInfo"]["name"]
                .as_str()
                .unwrap_or("unknown")
                .to_string(),
            version: result["serverInfo"]["version"]
                .as_str()
                .unwrap_or("unknown")
                .to_string(),
            protocol_version: result["protocolVersion"]
                .as_str()
                .unwrap_or(PROTOCOL_VERSION)
                .to_string(),
        };

        info!(
            "Connected to MCP server: {} v{}",
            server_info.name, server_info.version
        );

        self.write_message(&JsonRpcRequest::notification(methods::INITIALIZED))
            .await?;

        Ok(server_info)
    }

    fn ensure_connected(&self) -> Result<()> {
        if self.is_connected() {
            Ok(())
        } else {
            Err(McpError::NotConnected)
        }
    }
}

#[async_trait]
impl McpClient for StdioMcpClient {
    async fn connect(&self) -> Result<()> {
        debug!("Starting MCP server: {} {:?}", self.command, self.args);

        let mut command = Command::new(&self.command);
        command.args(&self.args);
        command.stdin(Stdio::piped());
        command.stdout(Stdio::piped());
        command.stderr(Stdio::inherit());
        command.kill_on_drop(true);

        for (key, value) in &self.env {
            command.env(key, value);
        }

        if let Some(cwd) = &self.cwd {
            command.current_dir(cwd);
        }

        let mut child = command.spawn().map_err(|e| {
            McpError::ConnectionFailed(format!("Failed to spawn '{}': {e}", self.command))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| McpError::ConnectionFailed("Failed to get stdin".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| McpError::ConnectionFailed("Failed to get stdout".to_string()))?;

        *self.stdin.lock().await = Some(stdin);
        *self.stdout.lock().await = Some(BufReader::new(stdout));
        *self.child.lock().await = Some(child);

        let server_info = self.initialize().await?;
        *self.server_info.lock().await = Some(server_info);
        self.connected.store(true, Ordering::SeqCst);

        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    async fn disconnect(&self) -> Result<()> {
        debug!("Disconnecting from MCP server");

        self.connected.store(false, Ordering::SeqCst);

        // Closing stdin lets a well-behaved server exit on EOF
        *self.stdin.lock().await = None;
        *self.stdout.lock().await = None;

        let mut child = self.child.lock().await;
        if let Some(child) = child.as_mut() {
            let _ = child.kill().await;
        }
        *child = None;

        Ok(())
    }

    async fn list_tools(&self) -> Result<Vec<McpToolDefinition>> {
        self.ensure_connected()?;

        let result = self.send_request(methods::TOOLS_LIST, json!({})).await?;

        serde_json::from_value(result["tools"].clone())
            .map_err(|e| McpError::InvalidResponse(format!("Failed to parse tools: {e}")))
    }

    async fn call_tool(&self, name: &str, arguments: Value) -> Result<McpToolResult> {
        self.ensure_connected()?;

        let params = json!({
            "name": name,
            "arguments": arguments
        });

        let result = self.send_request(methods::TOOLS_CALL, params).await?;

        serde_json::from_value(result)
            .map_err(|e| McpError::InvalidResponse(format!("Failed to parse result: {e}")))
    }

    async fn server_info(&self) -> Option<McpServerInfo> {
        self.server_info.lock().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stdio_client_creation() {
        let client = StdioMcpClient::new("stock-server", vec!["--csv-path".to_string()])
            .with_env("STOCK_CSV_PATH", "/tmp/x.csv")
            .with_request_timeout(Duration::from_secs(5));

        assert_eq!(client.command(), "stock-server");
        assert_eq!(client.args, vec!["--csv-path"]);
        assert_eq!(client.env.get("STOCK_CSV_PATH").unwrap(), "/tmp/x.csv");
        assert_eq!(client.request_timeout, Duration::from_secs(5));
        assert!(!client.is_connected());
    }

    #[test]
    fn test_request_ids_increase() {
        let client = StdioMcpClient::new("x", vec![]);
        assert_eq!(client.next_request_id(), 1);
        assert_eq!(client.next_request_id(), 2);
    }

    #[tokio::test]
    async fn test_calls_require_connection() {
        let client = StdioMcpClient::new("x", vec![]);
        assert!(matches!(
            client.list_tools().await,
            Err(McpError::NotConnected)
        ));
        assert!(matches!(
            client.call_tool("get_market_summary", json!({})).await,
            Err(McpError::NotConnected)
        ));
    }

    #[tokio::test]
    async fn test_spawn_failure() {
        let client = StdioMcpClient::new("definitely-not-a-real-binary-4821", vec![]);
        let err = client.connect().await.unwrap_err();
        assert!(matches!(err, McpError::ConnectionFailed(_)));
        assert!(!client.is_connected());
    }
}
