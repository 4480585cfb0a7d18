use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use geography_trivia::{
    cli::{Cli, Command, ServeArgs},
    client,
    server::Server,
    source::RestCountries,
};

/// Logs go to stderr. `RUST_LOG` overrides `default_directive`.
fn init_tracing(default_directive: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Serve(args) => {
            init_tracing("info");
            serve(args).await
        }
        Command::Play(args) => {
            // The game board owns the terminal.
            init_tracing("warn");
            client::run(args).await
        }
    }
}

async fn serve(args: ServeArgs) -> Result<()> {
    let listener = TcpListener::bind(args.listen)
        .await
        .with_context(|| format!("failed to bind {}", args.listen))?;
    let config = args.game_config();
    let source = Arc::new(RestCountries::new(args.countries_url));

    let server = Server::new(listener, source, config);
    info!(
        addr = %server.local_addr()?,
        rounds = config.rounds,
        max_sessions = config.max_sessions,
        "trivia server listening"
    );

    server
        .run_until_ctrl_c()
        .await
        .inspect_err(|err| error!("server stopped: {err:#}"))
}
