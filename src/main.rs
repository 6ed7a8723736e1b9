//! Miki binary entry point.

use std::sync::Arc;

use clap::Parser;
use miki::agent::Agent;
use miki::cli::{ChatArgs, Cli, Commands, ServeArgs};
use miki::config::AppConfig;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    let result = run(cli).await;

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = AppConfig::load(cli.config.as_deref())?;
    if !config.model.has_credentials() {
        warn!("KIMI_API_KEY is not set; model calls will fail to authenticate");
    }

    match cli.command.unwrap_or(Commands::Serve(ServeArgs::default())) {
        Commands::Serve(args) => {
            args.apply(&mut config);
            info!(model = ?config.model, "loaded configuration");
            let agent = Arc::new(Agent::from_config(&config.model)?);
            miki::server::serve(&config.server, agent).await?;
        }
        Commands::Chat(args) => handle_chat(&config, args).await?,
    }
    Ok(())
}

async fn handle_chat(config: &AppConfig, args: ChatArgs) -> Result<(), Box<dyn std::error::Error>> {
    let agent = Agent::from_config(&config.model)?;

    match args.prompt {
        Some(prompt) => {
            let reply = miki::cli::ask(&agent, &prompt).await?;
            println!("{}", reply.as_deref().unwrap_or("(no response)"));
        }
        None => {
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            miki::cli::run_chat(&agent, stdin, tokio::io::stdout()).await?;
        }
    }
    Ok(())
}
