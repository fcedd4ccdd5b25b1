//! Configuration and CLI argument handling

use std::path::PathBuf;
use clap::Parser;

/// CLI argument parsing structure
#[derive(Parser)]
#[command(name = "focus-flow")]
#[command(about = "Background service for a focus timer, site blocking and site time tracking")]
#[command(version)]
pub struct Config {
    /// Port to bind the bridge to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Directory holding the persisted store files
    #[arg(short, long)]
    pub data_dir: Option<PathBuf>,

    /// Keep all state in memory only
    #[arg(long)]
    pub in_memory: bool,

    /// Page blocked tabs are redirected to, resolved by the extension
    #[arg(long, default_value = "blocked.html")]
    pub block_page: String,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Explicit data directory, else the platform's local data directory
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir
            .clone()
            .or_else(|| dirs::data_local_dir().map(|dir| dir.join("focus-flow")))
            .unwrap_or_else(|| PathBuf::from(".focus-flow"))
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::try_parse_from(["focus-flow"]).unwrap();
        assert_eq!(config.address(), "127.0.0.1:20554");
        assert_eq!(config.block_page, "blocked.html");
        assert_eq!(config.log_level(), "info");
        assert!(!config.in_memory);
    }

    #[test]
    fn test_explicit_data_dir() {
        let config = Config::try_parse_from(["focus-flow", "--data-dir", "/tmp/ff", "-v"]).unwrap();
        assert_eq!(config.data_dir(), PathBuf::from("/tmp/ff"));
        assert_eq!(config.log_level(), "debug");
    }
}
