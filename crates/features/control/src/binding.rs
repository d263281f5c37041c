use ied_domain::constants::MAX_OBJECT_REFERENCE_LEN;
use ied_model::NodeId;

/// Everything the operate handler needs about one controllable data object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlBinding {
    control_point: NodeId,
    status: NodeId,
    timestamp: Option<NodeId>,
    path: String,
}

impl ControlBinding {
    pub(crate) fn new(
        control_point: NodeId,
        status: NodeId,
        timestamp: Option<NodeId>,
        path: &str,
    ) -> Self {
        Self { control_point, status, timestamp, path: truncate_reference(path).to_owned() }
    }

    /// The controllable data object.
    #[must_use]
    pub const fn control_point(&self) -> NodeId {
        self.control_point
    }

    /// The `stVal` attribute.
    #[must_use]
    pub const fn status(&self) -> NodeId {
        self.status
    }

    /// The `t` attribute, if the data object has one.
    #[must_use]
    pub const fn timestamp(&self) -> Option<NodeId> {
        self.timestamp
    }

    /// Object reference of the control point, cut to the protocol limit.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }
}

fn truncate_reference(path: &str) -> &str {
    path.char_indices().nth(MAX_OBJECT_REFERENCE_LEN).map_or(path, |(end, _)| &path[..end])
}
