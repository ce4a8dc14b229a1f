use std::collections::{HashMap, VecDeque};
use union_find::{QuickUnionUf, UnionBySize, UnionFind};

use crate::domain::network::network_model::NetworkModel;
use crate::domain::network::node::NodeRole;
use crate::domain::utils::id::NodeId;
use crate::error::{Error, Result};

/// A node of the distribution tree arena. Parent and children are arena indices.
#[derive(Debug, Clone)]
pub struct TreeNode {
    pub id: NodeId,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
    pub depth: usize,
    pub subtree_size: usize,
    pub role: NodeRole,
}

/// Directed tree edge `sender -> receiver` (child to parent).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TreeEdge {
    pub sender: NodeId,
    pub receiver: NodeId,

    /// Depth of the sender; the sink sits at depth 0.
    pub depth: usize,
}

impl TreeEdge {
    /// Shared tie-break order: shallower edges first, then lower sender id.
    pub fn priority_key(&self) -> (usize, NodeId) {
        (self.depth, self.sender)
    }
}

/// Read-only convergecast tree rooted at the sink.
///
/// Built once from parent pointers supplied by an external tree builder.
/// Nodes are kept in an arena ordered by id and referenced by index.
#[derive(Debug, Clone)]
pub struct DistributionTree {
    sink: NodeId,
    arena: Vec<TreeNode>,
    positions: HashMap<NodeId, usize>,
}

impl DistributionTree {
    /// Builds the tree from `(child, parent)` pairs.
    ///
    /// Every referenced node must exist in the network model, each child has
    /// exactly one parent, and every member must reach the sink.
    pub fn from_parents(sink: NodeId, parents: &[(NodeId, NodeId)], network: &NetworkModel) -> Result<Self> {
        if !network.contains(sink) {
            return Err(Error::InconsistentInput(format!("sink {} is not part of the network model", sink)));
        }

        // 1. Collect members and parent pointers
        let mut parent_of: HashMap<NodeId, NodeId> = HashMap::new();
        let mut member_ids: Vec<NodeId> = vec![sink];

        for &(child, parent) in parents {
            for id in [child, parent] {
                if !network.contains(id) {
                    return Err(Error::InconsistentInput(format!("tree node {} is not part of the network model", id)));
                }
            }

            if child == sink {
                return Err(Error::InconsistentInput(format!("the sink {} cannot have a parent", sink)));
            }

            if child == parent {
                return Err(Error::InconsistentInput(format!("node {} is its own parent", child)));
            }

            match parent_of.insert(child, parent) {
                Some(previous) if previous != parent => {
                    return Err(Error::InconsistentInput(format!("node {} has two parents ({} and {})", child, previous, parent)));
                }
                Some(_) => continue,
                None => {}
            }

            member_ids.push(child);
            member_ids.push(parent);
        }

        member_ids.sort();
        member_ids.dedup();

        let positions: HashMap<NodeId, usize> = member_ids.iter().enumerate().map(|(position, id)| (*id, position)).collect();

        // 2. Detect cycles and disconnected members with a disjoint set
        let mut dsu = QuickUnionUf::<UnionBySize>::new(member_ids.len());
        let mut sorted_pairs: Vec<(&NodeId, &NodeId)> = parent_of.iter().collect();
        sorted_pairs.sort();

        for (child, parent) in sorted_pairs {
            if !dsu.union(positions[child], positions[parent]) {
                return Err(Error::InconsistentInput(format!("the parent pointer {} -> {} closes a cycle", child, parent)));
            }
        }

        let sink_set = dsu.find(positions[&sink]);
        if let Some(orphan) = member_ids.iter().find(|id| dsu.find(positions[*id]) != sink_set) {
            return Err(Error::InconsistentInput(format!("tree node {} is not connected to the sink {}", orphan, sink)));
        }

        // 3. Build the arena
        let mut arena: Vec<TreeNode> = member_ids
            .iter()
            .map(|id| TreeNode {
                id: *id,
                parent: parent_of.get(id).map(|parent| positions[parent]),
                children: Vec::new(),
                depth: 0,
                subtree_size: 1,
                role: NodeRole::Leaf,
            })
            .collect();

        for position in 0..arena.len() {
            if let Some(parent) = arena[position].parent {
                arena[parent].children.push(position);
            }
        }

        // 4. Depths top-down, subtree sizes bottom-up
        let sink_position = positions[&sink];
        let mut order: Vec<usize> = Vec::with_capacity(arena.len());
        let mut queue: VecDeque<usize> = VecDeque::from([sink_position]);

        while let Some(position) = queue.pop_front() {
            order.push(position);
            let depth = arena[position].depth;
            for child in arena[position].children.clone() {
                arena[child].depth = depth + 1;
                queue.push_back(child);
            }
        }

        for &position in order.iter().rev() {
            let size: usize = 1 + arena[position].children.iter().map(|child| arena[*child].subtree_size).sum::<usize>();
            arena[position].subtree_size = size;
        }

        for tree_node in arena.iter_mut() {
            tree_node.role = if tree_node.id == sink {
                NodeRole::Sink
            } else if tree_node.children.is_empty() {
                NodeRole::Leaf
            } else {
                NodeRole::Relay
            };
        }

        log::info!("Distribution tree rooted at {} created with {} nodes.", sink, arena.len());

        Ok(DistributionTree { sink, arena, positions })
    }

    pub fn sink(&self) -> NodeId {
        self.sink
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.positions.contains_key(&id)
    }

    fn node(&self, id: NodeId) -> Option<&TreeNode> {
        self.positions.get(&id).map(|position| &self.arena[*position])
    }

    /// Tree members in ascending id order.
    pub fn members(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.arena.iter().map(|tree_node| tree_node.id)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|tree_node| tree_node.parent).map(|position| self.arena[position].id)
    }

    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        match self.node(id) {
            Some(tree_node) => tree_node.children.iter().map(|position| self.arena[*position].id).collect(),
            None => Vec::new(),
        }
    }

    pub fn depth(&self, id: NodeId) -> Option<usize> {
        self.node(id).map(|tree_node| tree_node.depth)
    }

    /// Number of nodes in the subtree rooted at `id`, the node itself included.
    pub fn subtree_size(&self, id: NodeId) -> usize {
        self.node(id).map(|tree_node| tree_node.subtree_size).unwrap_or(0)
    }

    pub fn role(&self, id: NodeId) -> Option<NodeRole> {
        self.node(id).map(|tree_node| tree_node.role)
    }

    /// `true` if one node is the parent of the other.
    pub fn is_adjacent(&self, a: NodeId, b: NodeId) -> bool {
        self.parent(a) == Some(b) || self.parent(b) == Some(a)
    }

    /// All child-to-parent edges in tie-break order (depth, then sender id).
    pub fn edges(&self) -> Vec<TreeEdge> {
        let mut edges: Vec<TreeEdge> = self
            .arena
            .iter()
            .filter_map(|tree_node| {
                tree_node.parent.map(|parent| TreeEdge { sender: tree_node.id, receiver: self.arena[parent].id, depth: tree_node.depth })
            })
            .collect();

        edges.sort_by_key(TreeEdge::priority_key);
        edges
    }
}
