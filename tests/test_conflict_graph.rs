mod common;

use common::*;
use tsch_scheduling::domain::conflict::conflict_graph_builder::ConflictGraphBuilder;
use tsch_scheduling::domain::network::network_model::NetworkModel;
use tsch_scheduling::domain::utils::id::ChannelId;
use tsch_scheduling::error::Error;

#[test]
fn test_conflict_is_symmetric_and_irreflexive() {
    let bed = two_branch();
    let nodes: Vec<_> = bed.network.nodes().iter().map(|node| node.id).collect();

    for channel in bed.network.channels() {
        for &a in &nodes {
            assert!(!bed.graph.in_conflict(a, a, channel), "node {} conflicts with itself on {}", a, channel);
            for &b in &nodes {
                assert_eq!(bed.graph.in_conflict(a, b, channel), bed.graph.in_conflict(b, a, channel));
            }
        }
    }
}

#[test]
fn test_overheard_links_interfere_but_do_not_connect() {
    let bed = two_branch();
    let ch0 = ChannelId::new(0);

    // 3 <-> 5 at 20% PRR: ETX 5 is above the connectivity bound of 2
    assert!(bed.graph.interferes(n(3), n(5), ch0));
    assert!(!bed.graph.is_connected(n(3), n(5), ch0));
    assert!(bed.graph.in_conflict(n(3), n(5), ch0));

    // 3 and 6 never hear each other
    assert!(!bed.graph.in_conflict(n(3), n(6), ch0));
}

#[test]
fn test_connectivity_follows_channel_quality() {
    let bed = two_branch();

    // 2 -> 6 fades from 75% on channel 0 to 45% on channel 3
    assert!(bed.graph.is_connected(n(6), n(2), ChannelId::new(0)));
    assert!(!bed.graph.is_connected(n(6), n(2), ChannelId::new(3)));
    assert_eq!(bed.graph.ranked_channels(n(6), n(2)), vec![ChannelId::new(0), ChannelId::new(1), ChannelId::new(2)]);
    assert_eq!(bed.graph.best_channel(n(6), n(2)), Some(ChannelId::new(0)));
}

#[test]
fn test_links_sharing_a_node_always_conflict() {
    let bed = two_branch();

    assert!(bed.graph.links_conflict((n(3), n(1)), (n(4), n(1)), None));
    assert!(bed.graph.links_conflict((n(3), n(1)), (n(1), n(0)), None));
    assert!(!bed.graph.links_conflict((n(3), n(1)), (n(6), n(2)), Some(ChannelId::new(0))));

    // 1 overhears 2 at 30%, so 2 -> 0 spoils 4 -> 1 unless they use different channels
    assert!(bed.graph.links_conflict((n(4), n(1)), (n(2), n(0)), Some(ChannelId::new(0))));
    assert!(!bed.graph.links_conflict((n(4), n(1)), (n(2), n(0)), None));
}

#[test]
fn test_tree_nodes_must_exist_in_the_network() {
    let bed = two_branch();
    let small = NetworkModel::from_records(&records(&[(0, 1, 90.0)], NUM_CHANNELS, 0.0), NUM_CHANNELS).unwrap();

    let result = ConflictGraphBuilder::new(&small).tree(&bed.tree).build();

    assert!(matches!(result, Err(Error::InconsistentInput(_))));
}

#[test]
fn test_threshold_outside_unit_interval_is_rejected() {
    let bed = two_branch();

    assert!(matches!(ConflictGraphBuilder::new(&bed.network).etx_threshold(1.5).build(), Err(Error::InvalidConfiguration(_))));
}
