use crate::command::{PendingCommand, parse_line};
use crate::error::{BridgeErrorExt, Result};
use crate::inference::{self, HeuristicInference, ValueInference};
use chrono::Utc;
use ied_domain::config::BridgeConfig;
use ied_domain::constants::{STATUS_SUFFIX, TIMESTAMP};
use ied_kernel::Shutdown;
use ied_kernel::diagnostics::{Diagnostic, DiagnosticSink};
use ied_model::{AttributeUpdater, IedModel, NodeId};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, info, warn};

/// What became of one input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOutcome {
    /// Empty or without `=`.
    Ignored,
    /// The path matched no data attribute.
    Unresolved,
    /// The inference strategy produced no value.
    Declined,
    /// The attribute could not be written (constructed attributes hold no value).
    Failed,
    Updated,
}

/// Counters reported when the ingest loop ends.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BridgeStats {
    pub lines: u64,
    pub updated: u64,
    pub unresolved: u64,
    pub ignored: u64,
    pub declined: u64,
    pub failed: u64,
}

impl BridgeStats {
    const fn record(&mut self, outcome: LineOutcome) {
        self.lines += 1;
        match outcome {
            LineOutcome::Ignored => self.ignored += 1,
            LineOutcome::Unresolved => self.unresolved += 1,
            LineOutcome::Declined => self.declined += 1,
            LineOutcome::Failed => self.failed += 1,
            LineOutcome::Updated => self.updated += 1,
        }
    }
}

/// Applies `path=value` commands to a served model.
pub struct Bridge {
    updater: AttributeUpdater,
    sink: Arc<dyn DiagnosticSink>,
    shutdown: Shutdown,
    inference: Box<dyn ValueInference>,
    status_suffix: String,
    timestamp_attribute: String,
}

impl std::fmt::Debug for Bridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bridge")
            .field("ied", &self.updater.model().name())
            .field("status_suffix", &self.status_suffix)
            .field("timestamp_attribute", &self.timestamp_attribute)
            .finish_non_exhaustive()
    }
}

impl Bridge {
    /// A bridge with the heuristic strategy, `.stVal` suffix and `t` timestamp.
    #[must_use]
    pub fn new(updater: AttributeUpdater, sink: Arc<dyn DiagnosticSink>, shutdown: Shutdown) -> Self {
        Self {
            updater,
            sink,
            shutdown,
            inference: Box::new(HeuristicInference),
            status_suffix: STATUS_SUFFIX.to_owned(),
            timestamp_attribute: TIMESTAMP.to_owned(),
        }
    }

    /// Applies suffix, timestamp attribute and inference mode from configuration.
    #[must_use]
    pub fn with_config(mut self, config: &BridgeConfig) -> Self {
        self.status_suffix.clone_from(&config.status_suffix);
        self.timestamp_attribute.clone_from(&config.timestamp_attribute);
        self.inference = inference::for_mode(config.inference);
        self
    }

    #[must_use]
    pub fn with_inference(mut self, inference: impl ValueInference + 'static) -> Self {
        self.inference = Box::new(inference);
        self
    }

    fn model(&self) -> &IedModel {
        self.updater.model()
    }

    /// Processes one input line.
    pub fn handle_line(&self, line: &str) -> LineOutcome {
        let Some(PendingCommand { path, raw }) = parse_line(line) else {
            return LineOutcome::Ignored;
        };

        let Some(target) = self.resolve(path) else {
            if self.shutdown.is_triggered() {
                debug!(path, "Unresolved path during shutdown");
            } else {
                self.sink.emit(Diagnostic::BridgeErr { path });
            }
            return LineOutcome::Unresolved;
        };

        let declared = self.model().node(target).and_then(|n| n.data_type());
        let Some(value) = self.inference.infer(raw, declared) else {
            debug!(path, raw, "No value inferred");
            return LineOutcome::Declined;
        };

        if let Err(err) = self.updater.update_attribute_value(target, value) {
            warn!(path, error = %err, "Bridge update rejected");
            return LineOutcome::Failed;
        }

        if let Some(stamp) = self.timestamp_of(target)
            && let Err(err) = self.updater.update_utc_time(stamp, Utc::now())
        {
            warn!(path, error = %err, "Failed to stamp update time");
        }

        self.sink.emit(Diagnostic::BridgeOk { path, value: raw });
        LineOutcome::Updated
    }

    /// Reads commands until end of input or shutdown.
    ///
    /// The read is raced against the shutdown token, so a blocked read does not
    /// delay shutdown.
    pub async fn run<R>(&self, reader: R) -> Result<BridgeStats>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut reader = reader;
        let mut buf = Vec::new();
        let mut stats = BridgeStats::default();

        info!(suffix = %self.status_suffix, "Bridge ingest loop started");
        loop {
            buf.clear();
            let read = tokio::select! {
                biased;
                () = self.shutdown.triggered() => break,
                read = reader.read_until(b'\n', &mut buf) => read.context("reading bridge input")?,
            };
            if read == 0 {
                debug!("Bridge input closed");
                break;
            }

            let line = String::from_utf8_lossy(&buf);
            stats.record(self.handle_line(&line));

            if self.shutdown.is_triggered() {
                break;
            }
        }

        info!(
            lines = stats.lines,
            updated = stats.updated,
            unresolved = stats.unresolved,
            ignored = stats.ignored,
            "Bridge ingest loop finished"
        );
        Ok(stats)
    }

    /// Direct lookup first, then the path with the status suffix appended.
    fn resolve(&self, path: &str) -> Option<NodeId> {
        let model = self.model();
        model
            .resolve_attribute(path)
            .or_else(|| model.resolve_attribute(&format!("{path}{}", self.status_suffix)))
    }

    /// The timestamp sibling of an attribute, unless it is the attribute itself.
    fn timestamp_of(&self, target: NodeId) -> Option<NodeId> {
        let model = self.model();
        let parent = model.node(target)?.parent()?;
        model
            .child(parent, &self.timestamp_attribute)
            .filter(|id| *id != target && model.node(*id).is_some_and(|n| n.is_data_attribute()))
    }
}
