use std::{net::SocketAddr, path::PathBuf, time::Duration};

use clap::{value_parser, Args, Parser, Subcommand, ValueHint};

use crate::{server::GameConfig, source::DEFAULT_COUNTRIES_URL};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the trivia round API over HTTP.
    Serve(ServeArgs),
    /// Play a game in the terminal against a running server.
    Play(PlayArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Socket address the server should bind to. Use port 0 for an ephemeral port.
    #[arg(long, env = "TRIVIA_LISTEN", default_value = "127.0.0.1:3001")]
    pub listen: SocketAddr,

    /// REST Countries compatible endpoint returning the country dataset.
    #[arg(long, env = "TRIVIA_COUNTRIES_URL", default_value = DEFAULT_COUNTRIES_URL, value_hint = ValueHint::Url)]
    pub countries_url: String,

    /// Questions per game.
    #[arg(long, env = "TRIVIA_ROUNDS", default_value_t = 10, value_parser = value_parser!(u16).range(1..))]
    pub rounds: u16,

    /// Games kept in memory before the oldest is dropped.
    #[arg(long, env = "TRIVIA_MAX_SESSIONS", default_value_t = 64, value_parser = value_parser!(u16).range(1..))]
    pub max_sessions: u16,
}

impl ServeArgs {
    pub fn game_config(&self) -> GameConfig {
        GameConfig {
            rounds: usize::from(self.rounds),
            max_sessions: usize::from(self.max_sessions),
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct PlayArgs {
    /// Base URL of the trivia server.
    #[arg(long, env = "TRIVIA_SERVER", default_value = "http://127.0.0.1:3001", value_hint = ValueHint::Url)]
    pub server: String,

    /// Seconds allowed per question before an empty answer is sent.
    #[arg(long, default_value_t = 10, value_parser = value_parser!(u16).range(1..))]
    pub time_limit: u16,

    /// Where high score and achievements are kept. Defaults to the user data directory.
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub profile: Option<PathBuf>,
}

impl PlayArgs {
    pub fn time_limit(&self) -> Duration {
        Duration::from_secs(u64::from(self.time_limit))
    }
}
