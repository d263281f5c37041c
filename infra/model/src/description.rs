//! JSON model descriptions.
//!
//! A description mirrors the model hierarchy directly:
//!
//! ```json
//! {
//!   "name": "simpleIO",
//!   "logical_devices": [{
//!     "name": "Device",
//!     "logical_nodes": [{
//!       "name": "LLN0",
//!       "data_objects": [{
//!         "name": "Mod",
//!         "data_attributes": [
//!           { "name": "stVal", "fc": "ST", "type": "INT32", "value": 1 },
//!           { "name": "t", "fc": "ST", "type": "UTC_TIME" },
//!           { "name": "Oper", "fc": "CO", "type": "CONSTRUCTED" }
//!         ]
//!       }]
//!     }]
//!   }]
//! }
//! ```
//!
//! Within a data object, attributes are inserted before sub data objects.

use crate::builder::ModelBuilder;
use crate::error::{ModelError, ModelErrorExt, Result};
use crate::model::IedModel;
use crate::node::{FunctionalConstraint, NodeId};
use crate::value::DataType;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelDescription {
    pub name: String,
    #[serde(default)]
    pub logical_devices: Vec<LogicalDeviceDescription>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogicalDeviceDescription {
    pub name: String,
    #[serde(default)]
    pub logical_nodes: Vec<LogicalNodeDescription>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogicalNodeDescription {
    pub name: String,
    #[serde(default)]
    pub data_objects: Vec<DataObjectDescription>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DataObjectDescription {
    pub name: String,
    #[serde(default)]
    pub data_attributes: Vec<DataAttributeDescription>,
    #[serde(default)]
    pub data_objects: Vec<DataObjectDescription>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DataAttributeDescription {
    pub name: String,
    pub fc: FunctionalConstraint,
    #[serde(rename = "type")]
    pub data_type: DataType,
    /// Initial value; the type's default when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub data_attributes: Vec<DataAttributeDescription>,
}

impl ModelDescription {
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("parsing model description")
    }

    /// Validates the description and builds the model tree.
    pub fn build(&self) -> Result<IedModel> {
        let mut builder = IedModel::builder(self.name.as_str());

        for device in &self.logical_devices {
            let ld = builder.logical_device(&device.name)?;
            for node in &device.logical_nodes {
                let ln = builder.logical_node(ld, &node.name)?;
                for object in &node.data_objects {
                    add_data_object(&mut builder, ln, object)?;
                }
            }
        }

        Ok(builder.build())
    }
}

impl IedModel {
    /// Builds a model from a JSON description held in memory.
    pub fn from_json_str(json: &str) -> Result<Self> {
        ModelDescription::from_json_str(json)?.build()
    }

    /// Reads and builds a model from a JSON description file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .context(format!("reading model file {}", path.display()))?;

        let model = Self::from_json_str(&json).context(path.display().to_string())?;
        info!(path = %path.display(), ied = %model.name(), nodes = model.len(), "Loaded device model");
        Ok(model)
    }
}

fn add_data_object(
    builder: &mut ModelBuilder,
    parent: NodeId,
    description: &DataObjectDescription,
) -> Result<()> {
    let id = builder.data_object(parent, &description.name)?;
    for attribute in &description.data_attributes {
        add_data_attribute(builder, id, attribute)?;
    }
    for object in &description.data_objects {
        add_data_object(builder, id, object)?;
    }
    Ok(())
}

fn add_data_attribute(
    builder: &mut ModelBuilder,
    parent: NodeId,
    description: &DataAttributeDescription,
) -> Result<()> {
    let id =
        builder.data_attribute(parent, &description.name, description.fc, description.data_type)?;

    if let Some(raw) = &description.value {
        let value = description.data_type.value_from_json(raw).ok_or_else(|| {
            ModelError::InvalidValue {
                message: format!("{raw} is not a valid {}", description.data_type).into(),
                context: Some(description.name.clone().into()),
            }
        })?;
        builder.initial_value(id, value)?;
    }

    for attribute in &description.data_attributes {
        add_data_attribute(builder, id, attribute)?;
    }
    Ok(())
}
