use crate::error::{ModelError, Result};
use crate::model::IedModel;
use crate::node::{AttributeSlot, FunctionalConstraint, ModelNode, ModelNodeKind, NodeId};
use crate::value::{DataType, MmsValue};
use parking_lot::RwLock;
use tracing::debug;

/// Incremental, validating constructor for an [`IedModel`].
///
/// Every insertion checks the IEC 61850 level rules (LD → LN → DO → DA, with
/// sub-DOs and constructed DAs allowed) and sibling-name uniqueness, so the
/// built tree is always walkable and addressable.
#[must_use = "builders do nothing unless you call .build()"]
#[derive(Debug)]
pub struct ModelBuilder {
    name: String,
    nodes: Vec<ModelNode>,
    devices: Vec<NodeId>,
}

impl ModelBuilder {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), nodes: Vec::new(), devices: Vec::new() }
    }

    /// Adds a logical device root.
    pub fn logical_device(&mut self, name: &str) -> Result<NodeId> {
        validate_name(name)?;
        if self.devices.iter().any(|d| self.nodes[d.index()].name == name) {
            return Err(ModelError::DuplicateName {
                message: name.to_owned().into(),
                context: Some("logical device".into()),
            });
        }

        let id = self.push(name, ModelNodeKind::LogicalDevice, None, None, None);
        self.devices.push(id);
        Ok(id)
    }

    pub fn logical_node(&mut self, parent: NodeId, name: &str) -> Result<NodeId> {
        self.insert_child(parent, name, ModelNodeKind::LogicalNode, None, None)
    }

    /// Adds a data object under a logical node, or a sub data object under a data object.
    pub fn data_object(&mut self, parent: NodeId, name: &str) -> Result<NodeId> {
        self.insert_child(parent, name, ModelNodeKind::DataObject, None, None)
    }

    /// Adds a data attribute holding the type's default value.
    pub fn data_attribute(
        &mut self,
        parent: NodeId,
        name: &str,
        fc: FunctionalConstraint,
        data_type: DataType,
    ) -> Result<NodeId> {
        let slot = AttributeSlot { data_type, value: data_type.default_value().map(RwLock::new) };
        self.insert_child(parent, name, ModelNodeKind::DataAttribute, Some(fc), Some(slot))
    }

    /// Overrides the initial value of a previously added data attribute.
    pub fn initial_value(&mut self, id: NodeId, value: MmsValue) -> Result<()> {
        let node = self.nodes.get_mut(id.index()).ok_or_else(|| ModelError::NodeNotFound {
            message: id.to_string().into(),
            context: Some("initial value".into()),
        })?;

        match node.attribute.as_mut().and_then(|slot| slot.value.as_mut()) {
            Some(lock) => {
                *lock.get_mut() = value;
                Ok(())
            },
            None => Err(ModelError::NotAttribute {
                message: node.name.clone().into(),
                context: Some("initial value".into()),
            }),
        }
    }

    /// Freezes the tree.
    pub fn build(self) -> IedModel {
        debug!(ied = %self.name, nodes = self.nodes.len(), devices = self.devices.len(), "Model built");
        IedModel { name: self.name, nodes: self.nodes, devices: self.devices }
    }

    fn insert_child(
        &mut self,
        parent: NodeId,
        name: &str,
        kind: ModelNodeKind,
        fc: Option<FunctionalConstraint>,
        attribute: Option<AttributeSlot>,
    ) -> Result<NodeId> {
        validate_name(name)?;

        let owner = self.nodes.get(parent.index()).ok_or_else(|| ModelError::NodeNotFound {
            message: parent.to_string().into(),
            context: Some(format!("parent of {name}").into()),
        })?;

        if !owner.kind.accepts(kind) {
            return Err(ModelError::InvalidHierarchy {
                message: format!("{kind} '{name}' cannot be placed under {} '{}'", owner.kind, owner.name)
                    .into(),
                context: None,
            });
        }

        if owner.children.iter().any(|c| self.nodes[c.index()].name == name) {
            return Err(ModelError::DuplicateName {
                message: format!("{}.{name}", owner.name).into(),
                context: None,
            });
        }

        let id = self.push(name, kind, fc, Some(parent), attribute);
        self.nodes[parent.index()].children.push(id);
        Ok(id)
    }

    fn push(
        &mut self,
        name: &str,
        kind: ModelNodeKind,
        fc: Option<FunctionalConstraint>,
        parent: Option<NodeId>,
        attribute: Option<AttributeSlot>,
    ) -> NodeId {
        let id = NodeId::from_index(self.nodes.len());
        self.nodes.push(ModelNode {
            name: name.to_owned(),
            kind,
            fc,
            parent,
            children: Vec::new(),
            attribute,
        });
        id
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() || name.contains(['/', '.', '=']) || name.chars().any(char::is_whitespace) {
        return Err(ModelError::InvalidName { message: format!("'{name}'").into(), context: None });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_misplaced_levels() -> Result<()> {
        let mut b = IedModel::builder("ied");
        let ld = b.logical_device("LD0")?;

        assert!(matches!(b.data_object(ld, "Pos"), Err(ModelError::InvalidHierarchy { .. })));

        let ln = b.logical_node(ld, "XCBR1")?;
        assert!(matches!(
            b.logical_node(ln, "Nested"),
            Err(ModelError::InvalidHierarchy { .. })
        ));
        Ok(())
    }

    #[test]
    fn rejects_duplicate_siblings_and_bad_names() -> Result<()> {
        let mut b = IedModel::builder("ied");
        let ld = b.logical_device("LD0")?;
        let ln = b.logical_node(ld, "GGIO1")?;
        b.data_object(ln, "SPCSO1")?;

        assert!(matches!(b.data_object(ln, "SPCSO1"), Err(ModelError::DuplicateName { .. })));
        assert!(matches!(b.logical_device("LD0"), Err(ModelError::DuplicateName { .. })));
        assert!(matches!(b.data_object(ln, "a.b"), Err(ModelError::InvalidName { .. })));
        assert!(matches!(b.data_object(ln, ""), Err(ModelError::InvalidName { .. })));
        assert!(matches!(b.data_object(ln, "with space"), Err(ModelError::InvalidName { .. })));
        Ok(())
    }

    #[test]
    fn initial_values_replace_defaults() -> Result<()> {
        let mut b = IedModel::builder("ied");
        let ld = b.logical_device("LD0")?;
        let ln = b.logical_node(ld, "GGIO1")?;
        let spc = b.data_object(ln, "SPCSO1")?;
        let st = b.data_attribute(spc, "stVal", FunctionalConstraint::St, DataType::Boolean)?;
        let oper = b.data_attribute(spc, "Oper", FunctionalConstraint::Co, DataType::Constructed)?;

        b.initial_value(st, MmsValue::Boolean(true))?;
        assert!(matches!(
            b.initial_value(oper, MmsValue::Boolean(true)),
            Err(ModelError::NotAttribute { .. })
        ));

        let model = b.build();
        assert_eq!(model.value(st), Some(MmsValue::Boolean(true)));
        assert_eq!(model.node(oper).and_then(|n| n.data_type()), Some(DataType::Constructed));
        Ok(())
    }
}
