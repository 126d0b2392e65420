//! Command-line and environment configuration.

use clap::Parser;
use quizbank_core::default_log_level;
use std::net::SocketAddr;
use std::path::PathBuf;

const DEFAULT_LOG_DIR: &str = "logs";

#[derive(Parser, Debug, Clone)]
#[command(version, about)]
pub struct ServerConfig {
    /// SQLite database file holding the quiz collection.
    #[arg(long, env = "QUIZBANK_DB_PATH", default_value = "quizbank.sqlite3")]
    pub db_path: PathBuf,

    /// The address to bind to.
    #[arg(short, long, env = "QUIZBANK_ADDRESS", default_value = "127.0.0.1:8080")]
    pub address: SocketAddr,

    /// trace|debug|info|warn|error; defaults to debug in debug builds.
    #[arg(long, env = "QUIZBANK_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Directory for rolling log files; relative paths resolve against cwd.
    #[arg(long, env = "QUIZBANK_LOG_DIR")]
    pub log_dir: Option<PathBuf>,
}

impl ServerConfig {
    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or_else(|| default_log_level())
    }

    /// Absolute log directory, as required by `init_logging`.
    pub fn log_dir(&self) -> std::io::Result<PathBuf> {
        let dir = self
            .log_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_DIR));
        if dir.is_absolute() {
            return Ok(dir);
        }
        Ok(std::env::current_dir()?.join(dir))
    }
}
