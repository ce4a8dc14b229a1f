use bimap::BiMap;
use std::collections::BTreeSet;

use crate::domain::network::link::{Link, PrrRecord};
use crate::domain::network::node::{Node, NodeRole};
use crate::domain::network::tree::DistributionTree;
use crate::domain::utils::id::{ChannelId, NodeId};
use crate::domain::utils::matrix::NodeMatrix;
use crate::error::{Error, Result};

/// Number of IEEE 802.15.4 channels in the 2.4 GHz band (channels 11 to 26).
pub const DEFAULT_NUM_CHANNELS: usize = 16;

/// Nodes and per-channel links of the measured network.
///
/// Node ids are sparse integers taken from the traces; internally every node
/// gets a dense index so that all derived matrices are sized to the real
/// node count. The mapping is kept in a bidirectional map.
#[derive(Debug, Clone)]
pub struct NetworkModel {
    nodes: Vec<Node>,
    index: BiMap<NodeId, usize>,

    /// One link list per channel.
    links: Vec<Vec<Link>>,

    /// Dense `[from][to][channel]` PRR lookup, 0.0 for unmeasured links.
    prr: NodeMatrix<f64>,
    num_channels: usize,
}

impl NetworkModel {
    /// Builds the model from PRR trace rows. The node set is every id seen as a link endpoint.
    pub fn from_records(records: &[PrrRecord], num_channels: usize) -> Result<Self> {
        let mut links = Vec::with_capacity(records.len());

        for record in records {
            let link = Link::try_from(record).map_err(Error::InconsistentInput)?;
            links.push(link);
        }

        let node_ids: BTreeSet<NodeId> = links.iter().flat_map(|link| [link.from, link.to]).collect();
        let node_ids: Vec<NodeId> = node_ids.into_iter().collect();

        NetworkModel::new(&node_ids, links, num_channels)
    }

    /// Builds the model from an explicit node list and links.
    ///
    /// Fails with `InconsistentInput` on duplicate nodes, links to unknown nodes
    /// or links on a channel outside `0..num_channels`.
    pub fn new(node_ids: &[NodeId], links: Vec<Link>, num_channels: usize) -> Result<Self> {
        if num_channels == 0 {
            return Err(Error::InconsistentInput("the network needs at least one channel".to_string()));
        }

        let mut sorted_ids = node_ids.to_vec();
        sorted_ids.sort();

        let mut index: BiMap<NodeId, usize> = BiMap::new();
        let mut nodes = Vec::with_capacity(sorted_ids.len());

        for id in sorted_ids {
            if index.contains_left(&id) {
                return Err(Error::InconsistentInput(format!("node {} is declared twice", id)));
            }
            index.insert(id, nodes.len());
            nodes.push(Node::new(id));
        }

        let mut prr = NodeMatrix::new(nodes.len(), num_channels, 0.0);
        let mut per_channel: Vec<Vec<Link>> = vec![Vec::new(); num_channels];

        for link in links {
            let (Some(&from), Some(&to)) = (index.get_by_left(&link.from), index.get_by_left(&link.to)) else {
                return Err(Error::InconsistentInput(format!("link {} -> {} references an unknown node", link.from, link.to)));
            };

            if link.channel.index() >= num_channels {
                return Err(Error::InconsistentInput(format!(
                    "link {} -> {} uses channel {} but the network only has {} channels",
                    link.from, link.to, link.channel, num_channels
                )));
            }

            if !(0.0..=1.0).contains(&link.prr) {
                return Err(Error::InconsistentInput(format!("PRR {} of link {} -> {} is outside [0, 1]", link.prr, link.from, link.to)));
            }

            if from == to {
                log::warn!("Ignoring self link of node {} on channel {}.", link.from, link.channel);
                continue;
            }

            let channel_links = &mut per_channel[link.channel.index()];
            if let Some(existing) = channel_links.iter_mut().find(|l| l.from == link.from && l.to == link.to) {
                log::debug!("Duplicate link {} -> {} on channel {}, keeping the last measurement.", link.from, link.to, link.channel);
                *existing = link;
            } else {
                channel_links.push(link);
            }

            prr.set(from, to, link.channel.index(), link.prr);
        }

        log::info!(
            "Network model created with {} nodes and {} links on {} channels.",
            nodes.len(),
            per_channel.iter().map(Vec::len).sum::<usize>(),
            num_channels
        );

        Ok(NetworkModel { nodes, index, links: per_channel, prr, num_channels })
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn num_channels(&self) -> usize {
        self.num_channels
    }

    pub fn channels(&self) -> impl Iterator<Item = ChannelId> + use<> {
        (0..self.num_channels as u16).map(ChannelId::new)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.index.contains_left(&id)
    }

    /// Dense matrix index of a node id.
    pub fn node_index(&self, id: NodeId) -> Option<usize> {
        self.index.get_by_left(&id).copied()
    }

    pub fn node_id(&self, index: usize) -> Option<NodeId> {
        self.index.get_by_right(&index).copied()
    }

    /// Links measured on one channel; empty for an unknown channel.
    pub fn links(&self, channel: ChannelId) -> &[Link] {
        self.links.get(channel.index()).map(Vec::as_slice).unwrap_or(&[])
    }

    /// PRR of `from -> to` on `channel`, 0.0 when never measured.
    pub fn prr(&self, from: NodeId, to: NodeId, channel: ChannelId) -> f64 {
        match (self.node_index(from), self.node_index(to)) {
            (Some(from), Some(to)) => self.prr.get(from, to, channel.index()).unwrap_or(0.0),
            _ => 0.0,
        }
    }

    pub fn prr_matrix(&self) -> &NodeMatrix<f64> {
        &self.prr
    }

    pub fn role(&self, id: NodeId) -> Option<NodeRole> {
        self.node_index(id).map(|index| self.nodes[index].role)
    }

    /// Initialization pass that tags every tree member with its tree role.
    ///
    /// Roles are written once; calling it again with a different tree is rejected.
    pub fn assign_roles(&mut self, tree: &DistributionTree) -> Result<()> {
        if self.nodes.iter().any(|node| node.role != NodeRole::Unassigned) {
            return Err(Error::InconsistentInput("node roles have already been assigned".to_string()));
        }

        for node in self.nodes.iter_mut() {
            if let Some(role) = tree.role(node.id) {
                node.role = role;
            }
        }

        Ok(())
    }
}
