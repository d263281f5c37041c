//! # Attribute Bridge
//!
//! Reads newline-delimited `path=value` commands (usually from stdin) and
//! pushes them into a served model as typed attribute updates.
//!
//! * `path` is an object reference to a data attribute, or to a data object
//!   whose status value (`<path>.stVal` by default) is meant.
//! * `value` is turned into a typed value by a [`ValueInference`] strategy.
//! * A sibling timestamp attribute (`t`) is stamped with every update.
//!
//! Each applied command produces a `BRIDGE_OK` diagnostic line, each unknown
//! path a `BRIDGE_ERR` line; malformed lines are dropped silently.
//!
//! ```rust
//! use ied_bridge::{Bridge, LineOutcome};
//! use ied_kernel::{Shutdown, diagnostics::MemorySink};
//! use ied_model::{DataType, FunctionalConstraint, IedModel, IedServer, MmsValue};
//! use std::sync::Arc;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut b = IedModel::builder("demo");
//! let ld = b.logical_device("Device")?;
//! let ln = b.logical_node(ld, "GGIO1")?;
//! let ind = b.data_object(ln, "Ind1")?;
//! let st = b.data_attribute(ind, "stVal", FunctionalConstraint::St, DataType::Boolean)?;
//! let server = IedServer::new(Arc::new(b.build()))?;
//!
//! let sink = Arc::new(MemorySink::new());
//! let bridge = Bridge::new(server.updater(), sink.clone(), Shutdown::new());
//!
//! assert_eq!(bridge.handle_line("Device/GGIO1.Ind1=true\n"), LineOutcome::Updated);
//! assert_eq!(server.model().value(st), Some(MmsValue::Boolean(true)));
//! assert_eq!(sink.lines(), ["BRIDGE_OK: Updated Device/GGIO1.Ind1 = true"]);
//! # Ok(())
//! # }
//! ```

mod bridge;
pub mod command;
mod error;
pub mod inference;

pub use bridge::{Bridge, BridgeStats, LineOutcome};
pub use command::{PendingCommand, parse_line};
pub use error::{BridgeError, BridgeErrorExt};
pub use inference::{HeuristicInference, SchemaInference, ValueInference};
