use crate::builder::ModelBuilder;
use crate::error::{ModelError, Result};
use crate::node::{FunctionalConstraint, ModelNode, ModelNodeKind, NodeId};
use crate::value::MmsValue;

/// An immutable device-model tree with interior-mutable attribute values.
///
/// The shape (names, kinds, parent/child links) is fixed once built; only the
/// values of data attributes change, each behind its own lock, so a model can be
/// shared between the control dispatch and the bridge through an `Arc`.
#[derive(Debug)]
pub struct IedModel {
    pub(crate) name: String,
    pub(crate) nodes: Vec<ModelNode>,
    pub(crate) devices: Vec<NodeId>,
}

impl IedModel {
    /// Starts a new model named after the IED.
    pub fn builder(name: impl Into<String>) -> ModelBuilder {
        ModelBuilder::new(name)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Logical device roots in definition order.
    #[must_use]
    pub fn logical_devices(&self) -> &[NodeId] {
        &self.devices
    }

    /// Total number of nodes across all logical devices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&ModelNode> {
        self.nodes.get(id.index())
    }

    /// First child of `id` named `name`.
    #[must_use]
    pub fn child(&self, id: NodeId, name: &str) -> Option<NodeId> {
        let parent = self.node(id)?;
        parent.children.iter().copied().find(|c| self.nodes[c.index()].name == name)
    }

    /// First child of `id` named `name` that carries functional constraint `fc`.
    #[must_use]
    pub fn child_with_fc(&self, id: NodeId, name: &str, fc: FunctionalConstraint) -> Option<NodeId> {
        let parent = self.node(id)?;
        parent.children.iter().copied().find(|c| {
            let child = &self.nodes[c.index()];
            child.name == name && child.fc == Some(fc)
        })
    }

    /// Computes the IEC 61850 object reference (`LD/LN.DO.DA`) of a node.
    ///
    /// Returns `None` for unknown ids and for nodes that are not rooted in a
    /// logical device.
    #[must_use]
    pub fn object_reference(&self, id: NodeId) -> Option<String> {
        let mut names = Vec::new();
        let mut cursor = self.node(id)?;
        while cursor.kind != ModelNodeKind::LogicalDevice {
            names.push(cursor.name.as_str());
            cursor = self.node(cursor.parent?)?;
        }

        let device = &cursor.name;
        if names.is_empty() {
            return Some(device.clone());
        }
        names.reverse();
        Some(format!("{device}/{}", names.join(".")))
    }

    /// Resolves an object reference such as `Device/LLN0.Mod.stVal` to a node.
    #[must_use]
    pub fn resolve(&self, reference: &str) -> Option<NodeId> {
        let (device, path) = match reference.split_once('/') {
            Some((device, path)) => (device, Some(path)),
            None => (reference, None),
        };

        let mut cursor =
            self.devices.iter().copied().find(|d| self.nodes[d.index()].name == device)?;

        if let Some(path) = path {
            for segment in path.split('.') {
                cursor = self.child(cursor, segment)?;
            }
        }
        Some(cursor)
    }

    /// Resolves a reference and requires the target to be a data attribute.
    #[must_use]
    pub fn resolve_attribute(&self, reference: &str) -> Option<NodeId> {
        self.resolve(reference).filter(|id| self.nodes[id.index()].is_data_attribute())
    }

    /// Snapshot of a data attribute's current value.
    #[must_use]
    pub fn value(&self, id: NodeId) -> Option<MmsValue> {
        let slot = self.node(id)?.attribute.as_ref()?;
        slot.value.as_ref().map(|lock| lock.read().clone())
    }

    /// Replaces a data attribute's value; returns the previous one.
    pub(crate) fn replace_value(&self, id: NodeId, value: MmsValue) -> Result<MmsValue> {
        let node = self.node(id).ok_or_else(|| ModelError::NodeNotFound {
            message: id.to_string().into(),
            context: None,
        })?;

        let lock = node.attribute.as_ref().and_then(|slot| slot.value.as_ref()).ok_or_else(|| {
            ModelError::NotAttribute { message: node.name.clone().into(), context: None }
        })?;

        Ok(std::mem::replace(&mut *lock.write(), value))
    }
}
