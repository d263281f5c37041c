//! Line-oriented diagnostic protocol.
//!
//! Supervising processes parse these lines from stdout, so their text is part of
//! the external interface. Operational logging goes through `tracing` instead.

use parking_lot::Mutex;
use std::fmt;
use std::io::Write;
use std::sync::Arc;
use tracing::warn;

/// One protocol line, rendered by [`fmt::Display`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Diagnostic<'a> {
    /// A control binding was created.
    Registered { path: &'a str },
    /// Registration pass finished.
    RegisteredTotal { count: usize },
    ServerStarted { port: u16 },
    /// An operate request changed a status value.
    ControlUpdate { path: &'a str },
    BridgeOk { path: &'a str, value: &'a str },
    BridgeErr { path: &'a str },
}

impl fmt::Display for Diagnostic<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Registered { path } => write!(f, "Registered control handler for {path}"),
            Self::RegisteredTotal { count } => {
                write!(f, "Registered {count} controllable data object handlers")
            },
            Self::ServerStarted { port } => write!(f, "IEC 61850 server started on port {port}"),
            Self::ControlUpdate { path } => write!(f, "CONTROL_UPDATE {path}"),
            Self::BridgeOk { path, value } => write!(f, "BRIDGE_OK: Updated {path} = {value}"),
            Self::BridgeErr { path } => {
                write!(f, "BRIDGE_ERR: Node not found or not attribute: {path}")
            },
        }
    }
}

/// Destination of diagnostic lines.
pub trait DiagnosticSink: Send + Sync {
    fn emit(&self, diagnostic: Diagnostic<'_>);
}

impl<T: DiagnosticSink + ?Sized> DiagnosticSink for Arc<T> {
    fn emit(&self, diagnostic: Diagnostic<'_>) {
        (**self).emit(diagnostic);
    }
}

/// Writes each line to stdout and flushes immediately.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutSink;

impl DiagnosticSink for StdoutSink {
    fn emit(&self, diagnostic: Diagnostic<'_>) {
        let mut out = std::io::stdout().lock();
        if let Err(err) = writeln!(out, "{diagnostic}").and_then(|()| out.flush()) {
            warn!(error = %err, line = %diagnostic, "Failed to write diagnostic line");
        }
    }
}

/// Collects lines in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<String>>,
}

impl MemorySink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every line emitted so far.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }

    /// Drains the collected lines.
    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.lines.lock())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.lock().is_empty()
    }
}

impl DiagnosticSink for MemorySink {
    fn emit(&self, diagnostic: Diagnostic<'_>) {
        self.lines.lock().push(diagnostic.to_string());
    }
}
