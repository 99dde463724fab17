mod cli;
mod commands;
mod config;
mod process;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "jak2_ap=debug,jak2_client=debug"
    } else {
        "jak2_ap=info,jak2_client=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::Run {
            auto_connect,
            repl_port,
            tick_ms,
        } => {
            commands::run::handle(auto_connect, repl_port, tick_ms).await?;
        }

        Commands::Layout { version, json } => {
            commands::layout::handle(version, json)?;
        }

        Commands::Configure {
            repl_port,
            game_process,
            show,
        } => {
            commands::configure::handle(repl_port, game_process, show)?;
        }
    }

    Ok(())
}
