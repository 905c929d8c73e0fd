use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::discovery::ScanOptions;

/// Shared text buffer with real-time sync between browsers
#[derive(Parser, Debug)]
#[command(name = "collabo")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Run the sync server (the default)
    Serve,

    /// Probe the local /24 for other instances
    Scan {
        /// WebSocket URL of a sync server, used to learn our own address
        #[arg(long, default_value = "ws://127.0.0.1:9999/ws")]
        server: String,

        /// Port probed on each host (defaults to DISCOVERY_PORT)
        #[arg(long)]
        port: Option<u16>,

        /// Probes in flight at once (defaults to DISCOVERY_CONCURRENCY)
        #[arg(long)]
        concurrency: Option<usize>,

        /// Per-probe timeout in milliseconds (defaults to DISCOVERY_TIMEOUT_MS)
        #[arg(long)]
        timeout_ms: Option<u64>,
    },
}

impl Command {
    /// Scan options with command line values layered over the configuration.
    pub fn scan_options(&self, config: &Config) -> ScanOptions {
        let mut options = ScanOptions::from(config);
        if let Command::Scan { port, concurrency, timeout_ms, .. } = self {
            if let Some(port) = port {
                options.port = *port;
            }
            if let Some(concurrency) = concurrency {
                options.concurrency = *concurrency;
            }
            if let Some(ms) = timeout_ms {
                options.timeout = std::time::Duration::from_millis(*ms);
            }
        }
        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn no_subcommand_means_serve() {
        let cli = Cli::try_parse_from(["collabo"]).unwrap();
        assert_eq!(cli.command, None);
    }

    #[test]
    fn scan_flags_override_config() {
        let cli = Cli::try_parse_from(["collabo", "scan", "--concurrency", "8", "--timeout-ms", "250"]).unwrap();
        let command = cli.command.unwrap();
        let options = command.scan_options(&Config::default());

        assert_eq!(options.concurrency, 8);
        assert_eq!(options.timeout, Duration::from_millis(250));
        assert_eq!(options.port, 5000);
        assert!(matches!(command, Command::Scan { ref server, .. } if server == "ws://127.0.0.1:9999/ws"));
    }
}
