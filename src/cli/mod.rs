//! Command-line interface for Miki.

use std::net::IpAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::agent::Agent;
use crate::config::AppConfig;
use crate::error::Result;
use crate::tools::Context;

/// Conversation id used by the interactive path so turns accumulate.
pub const CLI_CONVERSATION_ID: &str = "1";
/// User id handed to tools from the interactive path.
pub const CLI_USER_ID: &str = "1";

/// Miki weather agent
#[derive(Parser, Debug)]
#[command(name = "miki", version, about = "Miki weather agent and HTTP API")]
pub struct Cli {
    /// Path to a TOML config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Top-level CLI commands. `serve` runs when none is given.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP API
    Serve(ServeArgs),
    /// Talk to the agent from the terminal
    Chat(ChatArgs),
}

#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    /// Address to bind
    #[arg(long)]
    pub host: Option<IpAddr>,
    /// Port to listen on
    #[arg(short, long)]
    pub port: Option<u16>,
}

impl ServeArgs {
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(host) = self.host {
            config.server.host = host.to_string();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
    }
}

#[derive(Args, Debug, Default)]
pub struct ChatArgs {
    /// Single prompt to send. Reads stdin line by line when omitted.
    pub prompt: Option<String>,
}

/// Send one message in the CLI conversation and return the answer text.
pub async fn ask(agent: &Agent, prompt: &str) -> Result<Option<String>> {
    let context = Context::new(CLI_USER_ID);
    let outcome = agent.invoke(CLI_CONVERSATION_ID, prompt, &context).await?;
    Ok(outcome.answer_text())
}

/// Read prompts from `input` until EOF, writing each answer to `output`.
///
/// Blank lines are skipped. A failed turn is reported and the loop keeps going.
pub async fn run_chat<R, W>(agent: &Agent, input: R, mut output: W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        let prompt = line.trim();
        if prompt.is_empty() {
            continue;
        }
        let reply = match ask(agent, prompt).await {
            Ok(Some(text)) => text,
            Ok(None) => "(no response)".to_string(),
            Err(e) => format!("error: {e}"),
        };
        output.write_all(reply.as_bytes()).await?;
        output.write_all(b"\n").await?;
        output.flush().await?;
    }
    Ok(())
}
