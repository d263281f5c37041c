//! # Runtime
//!
//! Tokio runtime presets for the IED server process.
//!
//! ## Profiles
//! * **High Performance**: long-running server with control dispatch and the bridge task.
//! * **Memory Efficient**: constrained gateways and edge boxes.
//!
//! ## Example
//!
//! ```rust,ignore
//! #[ied_runtime::main(high_performance)]
//! async fn main() -> anyhow::Result<()> {
//!     Ok(())
//! }
//! ```

pub use anyhow::Result;
pub use ied_derive::main;

use anyhow::anyhow;
use std::{sync::OnceLock, thread::available_parallelism, time::Duration};
use tokio::runtime::{Builder, Runtime};
use tracing::debug;

/// How long the runtime waits for blocking tasks (stdin readers) on shutdown.
pub const SHUTDOWN_GRACE: Duration = Duration::from_millis(500);

const DEFAULT_WORKER_THREADS: usize = 4;
/// 3 `MiB`.
const DEFAULT_STACK_SIZE: usize = 3 * 1024 * 1024;
const MIN_STACK_SIZE: usize = 1024 * 1024;
const MAX_STACK_SIZE: usize = 16 * 1024 * 1024;
const MAX_WORKER_THREADS: usize = 1024;
const THREAD_KEEP_ALIVE: Duration = Duration::from_secs(60);
const DEFAULT_THREAD_NAME: &str = "ied-worker";

static WORKER_THREADS: OnceLock<usize> = OnceLock::new();

/// Detects the worker count from `TOKIO_WORKER_THREADS` or the hardware.
fn get_worker_threads() -> usize {
    *WORKER_THREADS.get_or_init(|| {
        std::env::var("TOKIO_WORKER_THREADS")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .filter(|&n| n > 0 && n <= MAX_WORKER_THREADS)
            .unwrap_or_else(|| {
                available_parallelism()
                    .map(std::num::NonZero::get)
                    .unwrap_or(DEFAULT_WORKER_THREADS)
            })
    })
}

const fn clamp_stack_size(stack_size: usize) -> usize {
    if stack_size < MIN_STACK_SIZE {
        MIN_STACK_SIZE
    } else if stack_size > MAX_STACK_SIZE {
        MAX_STACK_SIZE
    } else {
        stack_size
    }
}

fn thread_name_or_default(name: String) -> String {
    if name.trim().is_empty() { DEFAULT_THREAD_NAME.to_owned() } else { name }
}

/// Configuration for the Tokio runtime.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub worker_threads: usize,
    pub stack_size: usize,
    pub thread_name: String,
    pub thread_keep_alive: Duration,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            worker_threads: get_worker_threads(),
            stack_size: DEFAULT_STACK_SIZE,
            thread_name: DEFAULT_THREAD_NAME.to_owned(),
            thread_keep_alive: THREAD_KEEP_ALIVE,
        }
    }
}

impl RuntimeConfig {
    /// Preset for the long-running server process.
    #[must_use = "Use this configuration for the server process"]
    pub fn high_performance() -> Self {
        Self {
            worker_threads: get_worker_threads(),
            stack_size: 4 * 1024 * 1024,
            thread_name: "ied-hp".to_owned(),
            thread_keep_alive: Duration::from_secs(300),
        }
    }

    /// Preset for constrained gateways.
    #[must_use = "Use this configuration for constrained deployments"]
    pub fn memory_efficient() -> Self {
        Self {
            worker_threads: (get_worker_threads() / 2).max(1),
            stack_size: 2 * 1024 * 1024,
            thread_name: "ied-mem".to_owned(),
            thread_keep_alive: Duration::from_secs(30),
        }
    }

    #[must_use = "Customize the number of worker threads for the runtime"]
    pub fn with_worker_threads(mut self, threads: usize) -> Self {
        self.worker_threads = threads.clamp(1, MAX_WORKER_THREADS);
        self
    }

    #[must_use = "Customize the stack size for worker threads"]
    pub const fn with_stack_size(mut self, size: usize) -> Self {
        self.stack_size = clamp_stack_size(size);
        self
    }

    #[must_use = "Customize the thread name"]
    pub fn with_thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = thread_name_or_default(name.into());
        self
    }
}

/// Creates a multi-threaded Tokio runtime from `config`.
///
/// Values are re-normalized (worker count `1..=1024`, stack size `1..=16 MiB`,
/// non-empty thread name) so hand-built configs cannot produce a broken runtime.
///
/// # Errors
///
/// Returns an [`anyhow::Error`] if the OS refuses to create the runtime threads.
pub fn build_runtime_with_config(config: &RuntimeConfig) -> Result<Runtime> {
    let worker_threads = config.worker_threads.clamp(1, MAX_WORKER_THREADS);
    let stack_size = clamp_stack_size(config.stack_size);
    let thread_name = thread_name_or_default(config.thread_name.clone());

    debug!(worker_threads, stack_size, thread_name = %thread_name, "Building tokio runtime");

    Builder::new_multi_thread()
        .worker_threads(worker_threads)
        .thread_name(thread_name)
        .thread_stack_size(stack_size)
        .thread_keep_alive(config.thread_keep_alive)
        .enable_all()
        .build()
        .map_err(|e| anyhow!("Failed to initialize runtime: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worker_threads_validation() {
        let config = RuntimeConfig::default().with_worker_threads(0);
        assert_eq!(config.worker_threads, 1);

        let config = RuntimeConfig::default().with_worker_threads(2000);
        assert_eq!(config.worker_threads, MAX_WORKER_THREADS);
    }

    #[test]
    fn test_stack_size_validation() {
        let config = RuntimeConfig::default().with_stack_size(100);
        assert_eq!(config.stack_size, MIN_STACK_SIZE);

        let config = RuntimeConfig::default().with_stack_size(100 * 1024 * 1024);
        assert_eq!(config.stack_size, MAX_STACK_SIZE);
    }

    #[test]
    fn test_blank_thread_name_falls_back() {
        let config = RuntimeConfig::memory_efficient().with_thread_name("  ");
        assert_eq!(config.thread_name, DEFAULT_THREAD_NAME);
        assert!(config.worker_threads >= 1);
    }

    #[test]
    fn test_runtime_builds_from_unnormalized_config() -> Result<()> {
        let config = RuntimeConfig {
            worker_threads: 0,
            stack_size: 0,
            thread_name: String::new(),
            thread_keep_alive: Duration::from_secs(1),
        };

        let rt = build_runtime_with_config(&config)?;
        assert_eq!(rt.block_on(async { 21 * 2 }), 42);
        Ok(())
    }
}
