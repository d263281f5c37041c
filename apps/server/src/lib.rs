//! # IED Server
//!
//! Process wiring for the IEC 61850 server: loads a device model, installs a
//! control binding on every controllable data object, serves the model over TCP
//! and feeds `path=value` lines from stdin into it until a shutdown signal.
//!
//! Everything the process owns lives in one [`RuntimeContext`], built once and
//! torn down once.
//!
//! ## Example
//! ```no_run
//! use ied_server::RuntimeContext;
//!
//! # async fn example() -> Result<(), ied_server::LaunchError> {
//! RuntimeContext::builder()
//!     .port(10102)
//!     .build()?
//!     .run()
//!     .await
//! # }
//! ```

mod cli;
mod error;

pub use crate::cli::Cli;
pub use crate::error::{EXIT_LISTEN, EXIT_STARTUP, LaunchError, LaunchErrorExt};

use crate::error::Result;
use ied_bridge::Bridge;
use ied_control::BindingRegistry;
use ied_domain::config::AppConfig;
use ied_kernel::Shutdown;
use ied_kernel::diagnostics::{Diagnostic, DiagnosticSink, StdoutSink};
use ied_model::{IedModel, IedServer};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, BufReader};
use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Device model served when no model file is configured.
pub const DEFAULT_MODEL: &str = include_str!("../models/default.json");

/// A fluent builder for the [`RuntimeContext`].
#[must_use = "builders do nothing unless you call .build()"]
#[derive(Default)]
pub struct RuntimeContextBuilder {
    cfg: AppConfig,
    sink: Option<Arc<dyn DiagnosticSink>>,
}

impl std::fmt::Debug for RuntimeContextBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuntimeContextBuilder")
            .field("cfg", &self.cfg)
            .field("custom_sink", &self.sink.is_some())
            .finish()
    }
}

impl RuntimeContextBuilder {
    pub fn config(mut self, cfg: AppConfig) -> Self {
        self.cfg = cfg;
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.cfg.server.port = port;
        self
    }

    pub fn model_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.cfg.model.path = Some(path.into());
        self
    }

    /// Diagnostic destination; stdout by default.
    pub fn sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    fn load_model(&self) -> Result<IedModel> {
        let model = match &self.cfg.model.path {
            Some(path) => IedModel::from_path(path)?,
            None => IedModel::from_json_str(DEFAULT_MODEL).context("embedded default model")?,
        };
        Ok(model)
    }

    /// Loads the model, creates the server and registers control bindings.
    ///
    /// Nothing is bound to the network yet; see [`RuntimeContext::start`].
    ///
    /// # Errors
    /// * [`LaunchError::Model`] if the model file is unreadable or invalid.
    /// * [`LaunchError::Server`] if the model has no logical device.
    /// * [`LaunchError::Control`] if a binding cannot be allocated or installed.
    pub fn build(mut self) -> Result<RuntimeContext> {
        let sink: Arc<dyn DiagnosticSink> = match self.sink.take() {
            Some(sink) => sink,
            None => Arc::new(StdoutSink),
        };
        let model = Arc::new(self.load_model()?);

        info!(
            ied = %model.name(),
            nodes = model.len(),
            logical_devices = model.logical_devices().len(),
            "Device model loaded"
        );

        let server = IedServer::new(model)?;
        let registry = BindingRegistry::build(&server, sink.clone())?;

        Ok(RuntimeContext { cfg: self.cfg, server, registry, shutdown: Shutdown::new(), sink })
    }
}

/// Model, server, control bindings, shutdown token and diagnostic sink of one
/// server process.
#[must_use = "call .run().await to serve"]
pub struct RuntimeContext {
    cfg: AppConfig,
    server: IedServer,
    registry: BindingRegistry,
    shutdown: Shutdown,
    sink: Arc<dyn DiagnosticSink>,
}

impl std::fmt::Debug for RuntimeContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuntimeContext")
            .field("ied", &self.server.model().name())
            .field("bindings", &self.registry.len())
            .field("running", &self.server.is_running())
            .field("shutdown", &self.shutdown.is_triggered())
            .finish_non_exhaustive()
    }
}

impl RuntimeContext {
    /// Returns a new [`RuntimeContextBuilder`].
    pub fn builder() -> RuntimeContextBuilder {
        RuntimeContextBuilder::default()
    }

    #[must_use]
    pub const fn config(&self) -> &AppConfig {
        &self.cfg
    }

    #[must_use]
    pub const fn server(&self) -> &IedServer {
        &self.server
    }

    #[must_use]
    pub const fn registry(&self) -> &BindingRegistry {
        &self.registry
    }

    /// Token that ends [`RuntimeContext::run`] when triggered.
    #[must_use]
    pub fn shutdown(&self) -> Shutdown {
        self.shutdown.clone()
    }

    /// Binds the listen socket and announces the port.
    ///
    /// # Errors
    /// [`LaunchError::Listen`] when the socket cannot be bound.
    pub async fn start(&self) -> Result<SocketAddr> {
        let address = self.cfg.server.address.to_string();
        let local = self
            .server
            .start(&address, self.cfg.server.port)
            .await
            .map_err(LaunchError::from_start)?;

        self.sink.emit(Diagnostic::ServerStarted { port: local.port() });
        Ok(local)
    }

    /// Serves with bridge commands read from stdin.
    ///
    /// # Errors
    /// See [`RuntimeContext::run_with_input`].
    pub async fn run(self) -> Result<()> {
        self.run_with_input(BufReader::new(tokio::io::stdin())).await
    }

    /// Starts the server and serves until SIGINT, SIGTERM or
    /// [`Shutdown::trigger`]. End of `input` stops the bridge only.
    ///
    /// # Errors
    /// [`LaunchError::Listen`] when the socket cannot be bound. Failures after
    /// startup are logged, not returned.
    pub async fn run_with_input<R>(self, input: R) -> Result<()>
    where
        R: AsyncBufRead + Unpin + Send + 'static,
    {
        if let Err(err) = self.start().await {
            self.teardown(None).await;
            return Err(err);
        }

        let signals = {
            let shutdown = self.shutdown.clone();
            tokio::spawn(async move {
                match shutdown_signal().await {
                    Ok(()) => {
                        info!("Shutdown signal received, stopping server...");
                        shutdown.trigger();
                    },
                    Err(e) => error!("Error while waiting for shutdown signal: {e}"),
                }
            })
        };

        let bridge = self.cfg.bridge.enabled.then(|| self.spawn_bridge(input));
        if bridge.is_none() {
            info!("Bridge disabled, stdin is not read");
        }

        self.shutdown.triggered().await;
        signals.abort();
        self.teardown(bridge).await;
        Ok(())
    }

    fn spawn_bridge<R>(&self, input: R) -> JoinHandle<()>
    where
        R: AsyncBufRead + Unpin + Send + 'static,
    {
        let bridge = Bridge::new(self.server.updater(), self.sink.clone(), self.shutdown.clone())
            .with_config(&self.cfg.bridge);

        tokio::spawn(async move {
            match bridge.run(input).await {
                Ok(stats) => info!(updated = stats.updated, "Bridge stopped"),
                Err(err) => error!(error = %err, "Bridge input failed, bridge stopped"),
            }
        })
    }

    /// Joins the bridge, stops the server, then releases the bindings.
    async fn teardown(self, bridge: Option<JoinHandle<()>>) {
        self.shutdown.trigger();

        if let Some(bridge) = bridge
            && let Err(err) = bridge.await
        {
            warn!(error = %err, "Bridge task ended abnormally");
        }

        self.server.stop().await;
        self.registry.release();
        info!("Server shutdown complete");
    }
}

/// Listens for shutdown signals (Ctrl+C, SIGTERM).
///
/// This function waits for either:
/// * SIGINT (Ctrl+C)
/// * SIGTERM (sent by process managers like systemd)
async fn shutdown_signal() -> std::io::Result<()> {
    let ctrl_c = signal::ctrl_c();

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())?.recv().await;
        Ok::<_, std::io::Error>(())
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<std::io::Result<()>>();

    tokio::select! {
        res = ctrl_c => res,
        res = terminate => res,
    }
}
