use crate::error::EXIT_STARTUP;
use clap::Parser;
use clap::error::ErrorKind;
use ied_domain::config::AppConfig;
use std::path::PathBuf;

/// IEC 61850 server with generic control bindings and a stdin attribute bridge.
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "ied-server", version, about)]
pub struct Cli {
    /// TCP port for the protocol server; overrides configuration.
    pub port: Option<u16>,

    /// Configuration file (TOML, YAML or JSON by extension).
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// JSON device model served instead of the built-in one.
    #[arg(short, long, value_name = "FILE")]
    pub model: Option<PathBuf>,

    /// Serve without reading bridge commands from stdin.
    #[arg(long)]
    pub no_bridge: bool,
}

impl Cli {
    /// Process exit code for a failed parse: 0 for `--help`/`--version`, the
    /// startup failure code for any usage error.
    #[must_use]
    pub fn exit_code(err: &clap::Error) -> u8 {
        match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
            _ => EXIT_STARTUP,
        }
    }

    /// Overlays command-line values on loaded configuration.
    pub fn apply(&self, cfg: &mut AppConfig) {
        if let Some(port) = self.port {
            cfg.server.port = port;
        }
        if let Some(model) = &self.model {
            cfg.model.path = Some(model.clone());
        }
        if self.no_bridge {
            cfg.bridge.enabled = false;
        }
    }
}
