//! Kernel utilities shared across slices.
//! Keep this crate lightweight: configuration loading, the stdout diagnostic
//! protocol and the cooperative shutdown token.
//!
//! ## Diagnostics
//! ```rust
//! use ied_kernel::diagnostics::{Diagnostic, DiagnosticSink, MemorySink};
//!
//! let sink = MemorySink::new();
//! sink.emit(Diagnostic::ServerStarted { port: 8102 });
//! assert_eq!(sink.lines(), ["IEC 61850 server started on port 8102"]);
//! ```
//!
//! ## Config loading
//! ```rust,ignore
//! use ied_kernel::config::load_config;
//! let cfg: ied_kernel::domain::config::AppConfig = load_config(Some("ied-server.toml"))?;
//! ```
pub mod config;
pub mod diagnostics;
pub mod shutdown;

pub use ied_domain as domain;
pub use shutdown::Shutdown;
