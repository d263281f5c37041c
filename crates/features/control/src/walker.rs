use ied_model::{IedModel, ModelNode, ModelNodeKind, NodeId};

/// Depth-first, pre-order traversal of a device-model subtree.
///
/// Children are visited in definition order. The walk keeps its own stack, so
/// arbitrarily deep chains do not grow the thread stack.
#[derive(Debug, Clone, Copy)]
pub struct ModelWalker<'m> {
    model: &'m IedModel,
}

impl<'m> ModelWalker<'m> {
    #[must_use]
    pub const fn new(model: &'m IedModel) -> Self {
        Self { model }
    }

    /// Pre-order iterator over `root` and all its descendants.
    #[must_use]
    pub fn iter(&self, root: NodeId) -> PreOrder<'m> {
        let stack = if self.model.node(root).is_some() { vec![root] } else { Vec::new() };
        PreOrder { model: self.model, stack }
    }

    /// Visits every node under `root` and hands each data object to `on_data_object`.
    ///
    /// Returns the number of nodes visited; the first callback error aborts the walk.
    pub fn traverse<E>(
        &self,
        root: NodeId,
        mut on_data_object: impl FnMut(NodeId) -> Result<(), E>,
    ) -> Result<usize, E> {
        let mut visited = 0;
        for (id, node) in self.iter(root) {
            visited += 1;
            if node.kind() == ModelNodeKind::DataObject {
                on_data_object(id)?;
            }
        }
        Ok(visited)
    }
}

/// Iterator returned by [`ModelWalker::iter`].
#[derive(Debug, Clone)]
pub struct PreOrder<'m> {
    model: &'m IedModel,
    stack: Vec<NodeId>,
}

impl<'m> Iterator for PreOrder<'m> {
    type Item = (NodeId, &'m ModelNode);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let node = self.model.node(id)?;
        self.stack.extend(node.children().iter().rev().copied());
        Some((id, node))
    }
}
