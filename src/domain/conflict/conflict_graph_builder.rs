use std::collections::HashMap;

use crate::domain::conflict::conflict_graph::ConflictGraph;
use crate::domain::network::network_model::NetworkModel;
use crate::domain::network::tree::DistributionTree;
use crate::domain::utils::matrix::NodeMatrix;
use crate::error::{Error, Result};

/// Default PRR threshold for a usable link (ETX below 2).
pub const DEFAULT_ETX_THRESHOLD: f64 = 0.5;

/// Derives the [`ConflictGraph`] from a network model.
///
/// ```text
/// etx[i][j][c]          = 1 / prr(i -> j, c)            (infinite when prr = 0)
/// connectivity[i][j][c] = etx[i][j][c] < 1 / etx_threshold
/// interference[i][j][c] = prr(i -> j, c) > 0
/// conflict[i][j][c]     = i != j && (interference[i][j][c] || interference[j][i][c] || tree_adjacent(i, j))
/// ```
pub struct ConflictGraphBuilder<'a> {
    network: &'a NetworkModel,
    etx_threshold: f64,
    tree: Option<&'a DistributionTree>,
}

impl<'a> ConflictGraphBuilder<'a> {
    pub fn new(network: &'a NetworkModel) -> Self {
        Self { network, etx_threshold: DEFAULT_ETX_THRESHOLD, tree: None }
    }

    /// Minimum PRR in `[0, 1]` for a link to count as connected.
    pub fn etx_threshold(mut self, etx_threshold: f64) -> Self {
        self.etx_threshold = etx_threshold;
        self
    }

    /// Tree whose parent/child pairs are always in conflict.
    pub fn tree(mut self, tree: &'a DistributionTree) -> Self {
        self.tree = Some(tree);
        self
    }

    pub fn build(self) -> Result<ConflictGraph> {
        if !(0.0..=1.0).contains(&self.etx_threshold) {
            return Err(Error::InvalidConfiguration(format!("ETX threshold {} is outside [0, 1]", self.etx_threshold)));
        }

        if let Some(tree) = self.tree {
            if let Some(stranger) = tree.members().find(|id| !self.network.contains(*id)) {
                return Err(Error::InconsistentInput(format!("tree node {} is not part of the network model", stranger)));
            }
        }

        let num_nodes = self.network.num_nodes();
        let num_channels = self.network.num_channels();
        let prr = self.network.prr_matrix();

        // A threshold of 0 accepts any link with a non-zero PRR
        let connectivity_bound = if self.etx_threshold > 0.0 { 1.0 / self.etx_threshold } else { f64::INFINITY };

        let mut etx = NodeMatrix::new(num_nodes, num_channels, f64::INFINITY);
        let mut connectivity = NodeMatrix::new(num_nodes, num_channels, false);
        let mut interference = NodeMatrix::new(num_nodes, num_channels, false);

        for i in 0..num_nodes {
            for j in 0..num_nodes {
                if i == j {
                    continue;
                }
                for c in 0..num_channels {
                    let link_prr = prr.get(i, j, c).unwrap_or(0.0);
                    if link_prr <= 0.0 {
                        continue;
                    }

                    let link_etx = 1.0 / link_prr;
                    etx.set(i, j, c, link_etx);
                    interference.set(i, j, c, true);
                    connectivity.set(i, j, c, link_etx < connectivity_bound);
                }
            }
        }

        let mut conflict = NodeMatrix::new(num_nodes, num_channels, false);

        for i in 0..num_nodes {
            for j in (i + 1)..num_nodes {
                let tree_adjacent = match (self.tree, self.network.node_id(i), self.network.node_id(j)) {
                    (Some(tree), Some(a), Some(b)) => tree.is_adjacent(a, b),
                    _ => false,
                };

                for c in 0..num_channels {
                    let in_conflict = tree_adjacent || interference.is_set(i, j, c) || interference.is_set(j, i, c);
                    conflict.set(i, j, c, in_conflict);
                    conflict.set(j, i, c, in_conflict);
                }
            }
        }

        let index: HashMap<_, _> = self.network.nodes().iter().filter_map(|node| self.network.node_index(node.id).map(|i| (node.id, i))).collect();

        log::debug!("Conflict graph built for {} nodes on {} channels (connectivity bound ETX < {}).", num_nodes, num_channels, connectivity_bound);

        Ok(ConflictGraph { index, num_channels, etx, connectivity, interference, conflict })
    }
}
