use serde::Serialize;

use crate::domain::utils::id::NodeId;

/// Role of a node inside the distribution tree.
///
/// Every node starts as `Unassigned`; the role is written exactly once by
/// [`NetworkModel::assign_roles`](crate::domain::network::network_model::NetworkModel::assign_roles).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum NodeRole {
    Unassigned,
    Sink,
    Relay,
    Leaf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub id: NodeId,
    pub role: NodeRole,
}

impl Node {
    pub fn new(id: NodeId) -> Self {
        Node { id, role: NodeRole::Unassigned }
    }
}
