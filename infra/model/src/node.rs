use crate::value::{DataType, MmsValue};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable handle of a node inside one [`crate::IedModel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub(crate) fn from_index(index: usize) -> Self {
        // Arena indices are bounded by the builder to u32::MAX nodes.
        Self(u32::try_from(index).unwrap_or(u32::MAX))
    }

    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The four levels of the IEC 61850 object hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display)]
pub enum ModelNodeKind {
    LogicalDevice,
    LogicalNode,
    DataObject,
    DataAttribute,
}

impl ModelNodeKind {
    /// Whether a node of this kind may own a child of `child` kind.
    #[must_use]
    pub const fn accepts(self, child: Self) -> bool {
        matches!(
            (self, child),
            (Self::LogicalDevice, Self::LogicalNode)
                | (Self::LogicalNode | Self::DataObject, Self::DataObject)
                | (Self::DataObject | Self::DataAttribute, Self::DataAttribute)
        )
    }
}

/// Functional constraint of a data attribute.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum_macros::Display,
    strum_macros::EnumString,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum FunctionalConstraint {
    /// Status information.
    St,
    /// Measurands (analogue values).
    Mx,
    /// Setpoints.
    Sp,
    /// Substitution.
    Sv,
    /// Configuration.
    Cf,
    /// Description.
    Dc,
    /// Setting group.
    Sg,
    /// Editable setting group.
    Se,
    /// Service response.
    Sr,
    /// Operate received.
    Or,
    /// Blocking.
    Bl,
    /// Extended definition.
    Ex,
    /// Control.
    Co,
}

/// Value storage of a data attribute; constructed attributes have none.
#[derive(Debug)]
pub(crate) struct AttributeSlot {
    pub(crate) data_type: DataType,
    pub(crate) value: Option<RwLock<MmsValue>>,
}

/// One node of the device model tree.
#[derive(Debug)]
pub struct ModelNode {
    pub(crate) name: String,
    pub(crate) kind: ModelNodeKind,
    pub(crate) fc: Option<FunctionalConstraint>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) attribute: Option<AttributeSlot>,
}

impl ModelNode {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn kind(&self) -> ModelNodeKind {
        self.kind
    }

    #[must_use]
    pub const fn fc(&self) -> Option<FunctionalConstraint> {
        self.fc
    }

    #[must_use]
    pub const fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Children in definition order.
    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Declared type, for data attributes only.
    #[must_use]
    pub fn data_type(&self) -> Option<DataType> {
        self.attribute.as_ref().map(|slot| slot.data_type)
    }

    #[must_use]
    pub const fn is_data_object(&self) -> bool {
        matches!(self.kind, ModelNodeKind::DataObject)
    }

    #[must_use]
    pub const fn is_data_attribute(&self) -> bool {
        matches!(self.kind, ModelNodeKind::DataAttribute)
    }
}
