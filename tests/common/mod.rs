#![allow(dead_code)]

use tsch_scheduling::domain::conflict::conflict_graph::ConflictGraph;
use tsch_scheduling::domain::conflict::conflict_graph_builder::ConflictGraphBuilder;
use tsch_scheduling::domain::network::link::PrrRecord;
use tsch_scheduling::domain::network::network_model::NetworkModel;
use tsch_scheduling::domain::network::tree::DistributionTree;
use tsch_scheduling::domain::utils::id::NodeId;

pub const NUM_CHANNELS: usize = 4;

pub struct Testbed {
    pub network: NetworkModel,
    pub tree: DistributionTree,
    pub graph: ConflictGraph,
}

pub fn n(id: u16) -> NodeId {
    NodeId::new(id)
}

/// Symmetric links; channel `c` loses `fade * c` percent of the base PRR.
pub fn records(links: &[(u32, u32, f64)], num_channels: usize, fade: f64) -> Vec<PrrRecord> {
    let mut records = Vec::new();
    for &(a, b, prr) in links {
        for channel in 0..num_channels as u32 {
            let value = (prr - fade * channel as f64).max(0.0);
            records.push(PrrRecord { from: a, to: b, channel, prr: value });
            records.push(PrrRecord { from: b, to: a, channel, prr: value });
        }
    }
    records
}

/// Seven nodes in two branches below sink 0, with some cross-branch interference.
///
/// ```text
///          0
///        /   \
///       1     2
///      / \   / \
///     3   4 5   6
/// ```
pub fn two_branch_links() -> Vec<(u32, u32, f64)> {
    vec![
        (0, 1, 95.0),
        (0, 2, 90.0),
        (1, 3, 85.0),
        (1, 4, 80.0),
        (2, 5, 85.0),
        (2, 6, 75.0),
        // Overheard, not part of the tree
        (3, 5, 20.0),
        (4, 2, 15.0),
        (1, 2, 30.0),
    ]
}

pub fn two_branch_parents() -> Vec<(NodeId, NodeId)> {
    [(1, 0), (2, 0), (3, 1), (4, 1), (5, 2), (6, 2)].iter().map(|(c, p)| (n(*c), n(*p))).collect()
}

pub fn two_branch() -> Testbed {
    testbed(&records(&two_branch_links(), NUM_CHANNELS, 10.0), &two_branch_parents(), NUM_CHANNELS, 0.5)
}

pub fn testbed(records: &[PrrRecord], parents: &[(NodeId, NodeId)], num_channels: usize, etx_threshold: f64) -> Testbed {
    let mut network = NetworkModel::from_records(records, num_channels).unwrap();
    let tree = DistributionTree::from_parents(n(0), parents, &network).unwrap();
    network.assign_roles(&tree).unwrap();
    let graph = ConflictGraphBuilder::new(&network).etx_threshold(etx_threshold).tree(&tree).build().unwrap();

    Testbed { network, tree, graph }
}

/// Writes `content` to a fresh file in the temp directory and returns its path.
pub fn temp_file(dir: &std::path::Path, name: &str, content: &str) -> std::path::PathBuf {
    std::fs::create_dir_all(dir).unwrap();
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

pub fn temp_dir(label: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("tsch_{}_{}", label, std::process::id()))
}
