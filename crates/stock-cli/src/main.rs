//! Stock client
//!
//! Launches the stock MCP server as a child process and answers
//! natural-language questions by letting an LLM pick one of its tools.
//!
//! # Usage
//!
//! ```bash
//! export GROQ_API_KEY=gsk-...
//! stock-client --server stock-server
//! stock-client --query "How does AAPL compare to MSFT?"
//! ```

mod session;

use clap::Parser;
use session::{ClientSession, Input};
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use stock_llm::ToolSelector;
use stock_llm::providers::{OpenAIConfig, OpenAIProvider};
use stock_mcp::StdioMcpClient;
use stock_mcp::client::ArcMcpClient;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "stock-client")]
#[command(about = "Ask stock questions; an LLM routes them to MCP tools", long_about = None)]
struct Args {
    /// Server command to launch
    #[arg(long, default_value = "stock-server")]
    server: String,

    /// Argument passed to the server command (repeatable)
    #[arg(long = "server-arg", allow_hyphen_values = true)]
    server_args: Vec<String>,

    /// Answer one query and exit instead of starting the prompt
    #[arg(short, long)]
    query: Option<String>,

    /// Model used for tool selection (overrides LLM_MODEL)
    #[arg(long)]
    model: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Warning: could not load .env: {e}");
        }
    }

    stock_utils::init_tracing("warn,stock_cli=info");

    let args = Args::parse();

    let mut llm_config = OpenAIConfig::from_env()?;
    if let Some(model) = args.model {
        llm_config = llm_config.with_model(model);
    }
    let model = llm_config.model.clone();
    let provider = Arc::new(OpenAIProvider::with_config(llm_config)?);
    let selector = ToolSelector::new(provider, model);

    info!("Launching MCP server: {} {:?}", args.server, args.server_args);
    let client: ArcMcpClient = Arc::new(StdioMcpClient::new(args.server, args.server_args));
    let session = ClientSession::start(client, selector).await?;

    if let Some(query) = args.query {
        let result = answer(&session, &query).await;
        session.close().await?;
        return result;
    }

    println!("MCP Client connected. Available tools:");
    println!("{}", session.tool_table());
    println!("\nEnter your query (or 'quit' to exit):");

    repl(&session).await?;

    if let Err(e) = session.close().await {
        warn!("Error while disconnecting: {e}");
    }
    Ok(())
}

async fn repl(session: &ClientSession) -> anyhow::Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("\n> ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            println!();
            break;
        }

        match Input::parse(&line) {
            Input::Quit => break,
            Input::Empty => {}
            Input::Query(query) => {
                if let Err(e) = answer(session, &query).await {
                    println!("Error: {e:#}");
                }
            }
        }
    }

    Ok(())
}

async fn answer(session: &ClientSession, query: &str) -> anyhow::Result<()> {
    let outcome = session.ask(query).await?;

    println!(
        "\nSelected tool: {} with args: {}",
        outcome.decision.tool_name, outcome.decision.arguments
    );
    if outcome.is_error {
        println!("\nTool error: {}", outcome.text);
    } else {
        println!("\nResult: {}", outcome.text);
    }
    Ok(())
}
