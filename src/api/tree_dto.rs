use serde::{Deserialize, Serialize};

use crate::domain::utils::id::NodeId;

/// Distribution tree as produced by the external tree builder.
#[derive(Debug, Deserialize, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeDto {
    pub sink: u16,
    pub parents: Vec<ParentDto>,
}

#[derive(Debug, Deserialize, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParentDto {
    pub node: u16,
    pub parent: u16,
}

impl TreeDto {
    pub fn sink_id(&self) -> NodeId {
        NodeId::new(self.sink)
    }

    /// `(child, parent)` pairs in file order.
    pub fn parent_pairs(&self) -> Vec<(NodeId, NodeId)> {
        self.parents.iter().map(|p| (NodeId::new(p.node), NodeId::new(p.parent))).collect()
    }
}
