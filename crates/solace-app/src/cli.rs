//! CLI argument definitions for the Solace server.
//!
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::Parser;
use std::path::PathBuf;

/// Solace - a supportive chat service with sentiment tracking.
#[derive(Parser, Debug)]
#[command(name = "solace", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Address to bind.
    #[arg(long = "host")]
    pub host: Option<String>,

    /// HTTP server port.
    #[arg(short = 'p', long = "port")]
    pub port: Option<u16>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > SOLACE_CONFIG env var > ~/.solace/config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        self.resolve_config_path_with(std::env::var("SOLACE_CONFIG").ok())
    }

    fn resolve_config_path_with(&self, env: Option<String>) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Some(p) = env {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Resolve the server port.
    ///
    /// Priority: --port flag > SOLACE_PORT env var > config file value > 5000.
    pub fn resolve_port(&self, config_port: u16) -> u16 {
        self.resolve_port_with(std::env::var("SOLACE_PORT").ok(), config_port)
    }

    fn resolve_port_with(&self, env: Option<String>, config_port: u16) -> u16 {
        if let Some(p) = self.port {
            return p;
        }
        if let Some(p) = env.and_then(|val| val.parse::<u16>().ok()) {
            return p;
        }
        if config_port != 0 {
            return config_port;
        }
        5000
    }

    /// Resolve the bind host: --host flag > config file value.
    pub fn resolve_host(&self, config_host: &str) -> String {
        self.host
            .clone()
            .unwrap_or_else(|| config_host.to_string())
    }

    /// Resolve the log level: --log-level flag > config file value.
    pub fn resolve_log_level(&self, config_level: &str) -> String {
        self.log_level
            .clone()
            .unwrap_or_else(|| config_level.to_string())
    }
}

/// Default config file path for the current platform.
fn default_config_path() -> PathBuf {
    let home = if cfg!(target_os = "windows") {
        std::env::var("USERPROFILE")
    } else {
        std::env::var("HOME")
    };
    match home {
        Ok(home) => PathBuf::from(home).join(".solace").join("config.toml"),
        Err(_) => PathBuf::from("config.toml"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(argv: &[&str]) -> CliArgs {
        CliArgs::parse_from(std::iter::once("solace").chain(argv.iter().copied()))
    }

    #[test]
    fn test_parse_all_flags() {
        let cli = args(&["-c", "/tmp/s.toml", "--host", "0.0.0.0", "-p", "8080", "-l", "debug"]);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/s.toml")));
        assert_eq!(cli.host.as_deref(), Some("0.0.0.0"));
        assert_eq!(cli.port, Some(8080));
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_config_path_priority() {
        let cli = args(&["--config", "/etc/solace.toml"]);
        assert_eq!(
            cli.resolve_config_path_with(Some("/env/solace.toml".to_string())),
            PathBuf::from("/etc/solace.toml")
        );

        let cli = args(&[]);
        assert_eq!(
            cli.resolve_config_path_with(Some("/env/solace.toml".to_string())),
            PathBuf::from("/env/solace.toml")
        );
        assert!(cli
            .resolve_config_path_with(None)
            .ends_with("config.toml"));
    }

    #[test]
    fn test_port_priority() {
        let cli = args(&["--port", "9000"]);
        assert_eq!(cli.resolve_port_with(Some("7000".to_string()), 6000), 9000);

        let cli = args(&[]);
        assert_eq!(cli.resolve_port_with(Some("7000".to_string()), 6000), 7000);
        assert_eq!(cli.resolve_port_with(Some("not-a-port".to_string()), 6000), 6000);
        assert_eq!(cli.resolve_port_with(None, 6000), 6000);
        assert_eq!(cli.resolve_port_with(None, 0), 5000);
    }

    #[test]
    fn test_host_and_log_level_fall_back_to_config() {
        let cli = args(&[]);
        assert_eq!(cli.resolve_host("127.0.0.1"), "127.0.0.1");
        assert_eq!(cli.resolve_log_level("info"), "info");

        let cli = args(&["--host", "0.0.0.0", "--log-level", "trace"]);
        assert_eq!(cli.resolve_host("127.0.0.1"), "0.0.0.0");
        assert_eq!(cli.resolve_log_level("info"), "trace");
    }
}
