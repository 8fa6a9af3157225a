//! Command-line interface for the game server.

use clap::Parser;

/// Gridduel - two-player grid game server
#[derive(Parser, Debug)]
#[command(name = "gridduel_server")]
#[command(about = "HTTP server for two-player grid games", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Port to bind to
    #[arg(short, long, default_value = "3000")]
    pub port: u16,

    /// Host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Path to a TOML board configuration; the classic 3x3 board if omitted
    #[arg(short, long)]
    pub config: Option<std::path::PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["gridduel_server"]).unwrap();
        assert_eq!(cli.port, 3000);
        assert_eq!(cli.host, "127.0.0.1");
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_flags() {
        let cli =
            Cli::try_parse_from(["gridduel_server", "-p", "8080", "--config", "board.toml"])
                .unwrap();
        assert_eq!(cli.port, 8080);
        assert_eq!(cli.config.as_deref(), Some(std::path::Path::new("board.toml")));
    }
}
