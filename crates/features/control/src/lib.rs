//! # Control Bindings
//!
//! Discovers every controllable data object of a served IEC 61850 model and
//! attaches one uniform check/operate behaviour to it, without hardcoding any
//! logical node or data object names.
//!
//! A data object is controllable when it has both an operate element (`Oper`,
//! FC=CO) and a status value (`stVal`, FC=ST). An optional `t` attribute is
//! stamped whenever an operate request changes the status.
//!
//! ## Modules
//!
//! * [`walker`]: explicit-stack pre-order traversal of the model tree.
//! * [`registry`]: the one-shot [`BindingRegistry::build`] pass.
//! * [`adapter`]: the check and operate handlers.

pub mod adapter;
mod binding;
mod error;
pub mod registry;
pub mod walker;

pub use adapter::ControlAdapter;
pub use binding::ControlBinding;
pub use error::{ControlError, ControlErrorExt};
pub use registry::BindingRegistry;
pub use walker::ModelWalker;
