use super::error::{Result, ServerErrorExt};
use crate::model::IedModel;
use crate::node::NodeId;
use crate::value::MmsValue;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{trace, warn};

/// Thread-safe write access to attribute values of a served model.
///
/// Cheap to clone; holds the model, not the server, so handlers installed on
/// the server can carry one without forming a reference cycle.
#[derive(Debug, Clone)]
pub struct AttributeUpdater {
    model: Arc<IedModel>,
}

impl AttributeUpdater {
    pub(crate) const fn new(model: Arc<IedModel>) -> Self {
        Self { model }
    }

    #[must_use]
    pub fn model(&self) -> &IedModel {
        &self.model
    }

    /// Writes `value` into a data attribute.
    ///
    /// A value whose type differs from the declared one is still stored; the
    /// mismatch is reported as a warning.
    pub fn update_attribute_value(&self, id: NodeId, value: MmsValue) -> Result<()> {
        if let Some(declared) = self.model.node(id).and_then(|node| node.data_type())
            && declared != value.data_type()
        {
            warn!(
                attribute = %self.model.object_reference(id).unwrap_or_default(),
                declared = %declared,
                written = %value.data_type(),
                "Attribute written with a value of a different type"
            );
        }

        let previous = self.model.replace_value(id, value).context("updating attribute")?;
        trace!(node = %id, previous = %previous, "Attribute updated");
        Ok(())
    }

    /// Stamps a timestamp attribute.
    pub fn update_utc_time(&self, id: NodeId, time: DateTime<Utc>) -> Result<()> {
        self.update_attribute_value(id, MmsValue::UtcTime(time))
    }
}
