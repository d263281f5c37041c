//! # IED Model
//!
//! In-process IEC 61850 device model and server handle.
//!
//! ## Overview
//!
//! * [`IedModel`]: an arena-backed tree of logical devices, logical nodes, data
//!   objects and data attributes, built through [`ModelBuilder`] or loaded from
//!   a JSON [`ModelDescription`]. The tree shape is immutable; attribute values
//!   sit behind per-attribute `parking_lot` locks.
//! * [`IedServer`]: control-handler table, serialised control dispatch and the
//!   TCP listen socket.
//! * [`AttributeUpdater`]: the thread-safe attribute update API.
//!
//! # Example
//!
//! ```rust
//! use ied_model::{DataType, FunctionalConstraint, IedModel, MmsValue};
//!
//! # fn main() -> Result<(), ied_model::ModelError> {
//! let mut builder = IedModel::builder("demo");
//! let ld = builder.logical_device("Device")?;
//! let ln = builder.logical_node(ld, "LLN0")?;
//! let modd = builder.data_object(ln, "Mod")?;
//! let st = builder.data_attribute(modd, "stVal", FunctionalConstraint::St, DataType::Int32)?;
//! let model = builder.build();
//!
//! assert_eq!(model.object_reference(st).as_deref(), Some("Device/LLN0.Mod.stVal"));
//! assert_eq!(model.value(st), Some(MmsValue::Int32(0)));
//! # Ok(())
//! # }
//! ```

mod builder;
mod description;
mod error;
mod model;
mod node;
mod server;
mod value;

pub use builder::ModelBuilder;
pub use description::{
    DataAttributeDescription, DataObjectDescription, LogicalDeviceDescription,
    LogicalNodeDescription, ModelDescription,
};
pub use error::{ModelError, ModelErrorExt};
pub use model::IedModel;
pub use node::{FunctionalConstraint, ModelNode, ModelNodeKind, NodeId};
pub use server::{
    AttributeUpdater, CheckHandler, CheckHandlerResult, ControlAction, ControlActionKind,
    ControlHandler, ControlHandlerResult, ControlOutcome, IedServer,
    ServerError, ServerErrorExt,
};
pub use value::{DataType, MmsValue};
