use clap::Parser;
use ied_domain::config::{AppConfig, LoggingConfig};
use ied_kernel::config::load_config;
use ied_logger::{LevelFilter, Logger, LoggerError};
use ied_server::{Cli, LaunchError, RuntimeContext};
use std::process::ExitCode;
use tracing::error;

#[ied_runtime::main(high_performance)]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return Ok(ExitCode::from(Cli::exit_code(&err)));
        },
    };

    let code = match bootstrap(&cli) {
        Ok((cfg, _log)) => match RuntimeContext::builder().config(cfg).build() {
            Ok(ctx) => match ctx.run().await {
                Ok(()) => ExitCode::SUCCESS,
                Err(err) => fail(&err),
            },
            Err(err) => fail(&err),
        },
        // No subscriber yet, so the error goes straight to stderr.
        #[allow(clippy::print_stderr)]
        Err(err) => {
            eprintln!("ied-server: {err}");
            ExitCode::from(err.exit_code())
        },
    };

    Ok(code)
}

/// Configuration file and `IED__*` overrides, then command-line values, then logging.
fn bootstrap(cli: &Cli) -> Result<(AppConfig, Logger), LaunchError> {
    let mut cfg: AppConfig = load_config(cli.config.as_deref())?;
    cli.apply(&mut cfg);
    let log = init_logger(&cfg.logging)?;
    Ok((cfg, log))
}

/// A bare level (`debug`) yields to `RUST_LOG`; a directive list is used as is.
fn init_logger(logging: &LoggingConfig) -> Result<Logger, LoggerError> {
    let builder = Logger::builder().name(env!("CARGO_PKG_NAME"));
    let builder = match logging.level.parse::<LevelFilter>() {
        Ok(level) => builder.level(level),
        Err(_) => builder.env_filter(logging.level.as_str()),
    };

    match &logging.directory {
        Some(dir) => builder.path(dir).json(logging.json).init(),
        None => builder.init(),
    }
}

fn fail(err: &LaunchError) -> ExitCode {
    error!(error = %err, code = err.exit_code(), "Server terminated");
    ExitCode::from(err.exit_code())
}
