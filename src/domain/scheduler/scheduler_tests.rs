/// Unit tests for the scheduler family on small hand-built topologies.
///
/// The integration tests in `tests/test_schedulers.rs` cover the same
/// algorithms on loaded trace data; here we pin down exact slot layouts.
#[cfg(test)]
mod tests {
    use crate::domain::conflict::conflict_graph::ConflictGraph;
    use crate::domain::conflict::conflict_graph_builder::ConflictGraphBuilder;
    use crate::domain::network::link::PrrRecord;
    use crate::domain::network::network_model::NetworkModel;
    use crate::domain::network::tree::DistributionTree;
    use crate::domain::schedule::slot::Slot;
    use crate::domain::schedule::transmission::{ChannelAssignment, Transmission};
    use crate::domain::scheduler::convergecast::{ConvergecastState, schedule_round};
    use crate::domain::scheduler::mcc::branch_and_bound::EdgeColoring;
    use crate::domain::scheduler::mcc::repetitions_for;
    use crate::domain::scheduler::scheduler_type::SchedulerType;
    use crate::domain::scheduler::scheduling_context::SchedulingContext;
    use crate::domain::utils::id::{ChannelId, NodeId};
    use crate::error::Error;

    struct Fixture {
        network: NetworkModel,
        tree: DistributionTree,
        graph: ConflictGraph,
    }

    /// Symmetric links with the same PRR (in percent) on every channel.
    fn fixture(links: &[(u32, u32, f64)], parents: &[(u16, u16)], num_channels: usize, etx_threshold: f64) -> Fixture {
        let mut records = Vec::new();
        for &(a, b, prr) in links {
            for channel in 0..num_channels as u32 {
                records.push(PrrRecord { from: a, to: b, channel, prr });
                records.push(PrrRecord { from: b, to: a, channel, prr });
            }
        }

        let network = NetworkModel::from_records(&records, num_channels).unwrap();
        let parents: Vec<(NodeId, NodeId)> = parents.iter().map(|(c, p)| (NodeId::new(*c), NodeId::new(*p))).collect();
        let tree = DistributionTree::from_parents(NodeId::new(0), &parents, &network).unwrap();
        let graph = ConflictGraphBuilder::new(&network).etx_threshold(etx_threshold).tree(&tree).build().unwrap();

        Fixture { network, tree, graph }
    }

    fn line() -> Fixture {
        fixture(&[(0, 1, 100.0), (1, 2, 100.0)], &[(1, 0), (2, 1)], 1, 0.5)
    }

    fn star() -> Fixture {
        fixture(&[(0, 1, 100.0), (0, 2, 100.0), (0, 3, 100.0)], &[(1, 0), (2, 0), (3, 0)], 2, 0.5)
    }

    fn n(id: u16) -> NodeId {
        NodeId::new(id)
    }

    #[test]
    fn test_line_heuristic_places_edges_in_tree_order() {
        let f = line();
        let ctx = SchedulingContext::new(&f.network, &f.tree, &f.graph).channel(Some(ChannelId::new(0)));

        let schedule = SchedulerType::McIcraNonOptimal.get_instance().schedule(&ctx).unwrap();

        assert_eq!(schedule.slotframe_length(), 2);
        assert_eq!(schedule.slots()[0].transmissions, vec![Transmission::fixed(n(1), n(0), ChannelId::new(0))]);
        assert_eq!(schedule.slots()[1].transmissions, vec![Transmission::fixed(n(2), n(1), ChannelId::new(0))]);
        assert!(schedule.verify(&f.graph, &f.tree).is_ok());
    }

    #[test]
    fn test_optimal_never_longer_than_heuristic() {
        // Two branches hanging off the sink; the leaves do not hear each other
        let f = fixture(
            &[(0, 1, 100.0), (0, 2, 100.0), (1, 3, 100.0), (2, 4, 100.0), (3, 4, 0.0)],
            &[(1, 0), (2, 0), (3, 1), (4, 2)],
            1,
            0.5,
        );
        let ctx = SchedulingContext::new(&f.network, &f.tree, &f.graph).channel(Some(ChannelId::new(0)));

        let greedy = SchedulerType::McIcraNonOptimal.get_instance().schedule(&ctx).unwrap();
        let optimal = SchedulerType::McIcra.get_instance().schedule(&ctx).unwrap();

        assert!(optimal.slotframe_length() <= greedy.slotframe_length());
        assert!(optimal.verify(&f.graph, &f.tree).is_ok());
        assert_eq!(optimal.num_transmissions(), 4);
    }

    /// Node 4 overhears node 2, so first fit in tree order wastes a slot on 3 -> 1.
    fn greedy_trap() -> Fixture {
        fixture(
            &[(0, 1, 100.0), (0, 2, 100.0), (1, 3, 100.0), (1, 4, 100.0), (4, 5, 100.0), (2, 4, 30.0)],
            &[(1, 0), (2, 0), (3, 1), (4, 1), (5, 4)],
            1,
            0.5,
        )
    }

    #[test]
    fn test_optimal_beats_first_fit_when_tree_order_misleads() {
        let f = greedy_trap();
        let ctx = SchedulingContext::new(&f.network, &f.tree, &f.graph).channel(Some(ChannelId::new(0)));

        let greedy = SchedulerType::McIcraNonOptimal.get_instance().schedule(&ctx).unwrap();
        let optimal = SchedulerType::McIcra.get_instance().schedule(&ctx).unwrap();

        // First fit: 1->0 | 2->0, 3->1 | 4->1 | 5->4
        assert_eq!(greedy.slotframe_length(), 4);
        assert_eq!(greedy.slots()[1].transmissions.len(), 2);

        // 1->0, 3->1 and 4->1 are pairwise in conflict, so three slots are the minimum
        assert_eq!(optimal.slotframe_length(), 3);
        assert_eq!(optimal.num_transmissions(), 5);
        assert!(optimal.verify(&f.graph, &f.tree).is_ok());
    }

    #[test]
    fn test_coloring_proves_its_result_optimal() {
        let f = greedy_trap();
        let ctx = SchedulingContext::new(&f.network, &f.tree, &f.graph).channel(Some(ChannelId::new(0)));
        let transmissions: Vec<Transmission> = f.tree.edges().iter().map(|e| Transmission::fixed(e.sender, e.receiver, ChannelId::new(0))).collect();

        let result = EdgeColoring::new(&transmissions, &f.graph, &ctx.placement_rules(SchedulerType::McIcra)).solve();

        assert_eq!(result.num_colors, 3);
        assert_eq!(result.lower_bound, 3);
        assert!(result.proven_optimal);
        assert!(result.explored > 0);
        assert_eq!(result.colors[0], 0);
    }

    #[test]
    fn test_exhausted_search_limit_keeps_the_first_fit_schedule() {
        let f = greedy_trap();
        let ctx = SchedulingContext::new(&f.network, &f.tree, &f.graph).channel(Some(ChannelId::new(0))).optimal_search_limit(0);

        let schedule = SchedulerType::McIcra.get_instance().schedule(&ctx).unwrap();

        assert_eq!(schedule.slotframe_length(), 4);
        assert!(schedule.verify(&f.graph, &f.tree).is_ok());
    }

    #[test]
    fn test_optimal_star_needs_one_slot_per_child() {
        let f = star();
        let ctx = SchedulingContext::new(&f.network, &f.tree, &f.graph).channel(Some(ChannelId::new(1)));

        let schedule = SchedulerType::McIcra.get_instance().schedule(&ctx).unwrap();

        assert_eq!(schedule.slotframe_length(), 3);
        assert!(schedule.transmissions().all(|(_, t)| t.channel == ChannelAssignment::Fixed { channel: ChannelId::new(1) }));
    }

    #[test]
    fn test_bounded_slotframe_reports_unschedulable_edge() {
        let f = star();
        let ctx = SchedulingContext::new(&f.network, &f.tree, &f.graph).channel(Some(ChannelId::new(0))).slotframe_bound(Some(2));

        let result = SchedulerType::McIcraNonOptimal.get_instance().schedule(&ctx);

        match result {
            Err(Error::UnschedulableEdge { sender, receiver, slotframe_length }) => {
                assert_eq!(sender, n(3));
                assert_eq!(receiver, n(0));
                assert_eq!(slotframe_length, 2);
            }
            other => panic!("expected UnschedulableEdge, got {:?}", other.map(|s| s.slotframe_length())),
        }
    }

    #[test]
    fn test_single_channel_variant_requires_channel() {
        let f = line();
        let ctx = SchedulingContext::new(&f.network, &f.tree, &f.graph);

        let result = SchedulerType::McIcra.get_instance().schedule(&ctx);

        assert!(matches!(result, Err(Error::InvalidConfiguration(_))));
    }

    #[test]
    fn test_repetitions_follow_etx() {
        assert_eq!(repetitions_for(1.0), 1);
        assert_eq!(repetitions_for(2.5), 3);
        assert_eq!(repetitions_for(f64::INFINITY), 16);
        assert_eq!(repetitions_for(400.0), 16);
    }

    #[test]
    fn test_rate_adaptive_grants_extra_cells_to_lossy_links() {
        let f = fixture(&[(0, 1, 40.0), (1, 2, 100.0)], &[(1, 0), (2, 1)], 2, 0.3);
        let ctx = SchedulingContext::new(&f.network, &f.tree, &f.graph);

        let schedule = SchedulerType::McCqara.get_instance().schedule(&ctx).unwrap();

        assert_eq!(schedule.cells_of(n(1), n(0)), 3);
        assert_eq!(schedule.cells_of(n(2), n(1)), 1);
        assert!(schedule.verify(&f.graph, &f.tree).is_ok());
    }

    #[test]
    fn test_convergecast_demand_is_subtree_size() {
        let f = line();
        let state = ConvergecastState::new(&f.tree);

        assert_eq!(state.total_demand(), 3);
        assert_eq!(state.candidates().len(), 2);
    }

    #[test]
    fn test_tasa_forwards_only_buffered_packets() {
        let f = line();
        let ctx = SchedulingContext::new(&f.network, &f.tree, &f.graph);

        let schedule = SchedulerType::Tasa.get_instance().schedule(&ctx).unwrap();

        assert_eq!(schedule.slotframe_length(), 3);
        assert_eq!(schedule.cells_of(n(1), n(0)), 2);
        assert_eq!(schedule.cells_of(n(2), n(1)), 1);
        assert_eq!(schedule.slots()[0].transmissions, vec![Transmission::hopping(n(1), n(0), 0)]);
        assert_eq!(schedule.slots()[1].transmissions, vec![Transmission::hopping(n(2), n(1), 0)]);
    }

    #[test]
    fn test_convergecast_round_ignores_the_slotframe_bound() {
        let f = star();
        let ctx = SchedulingContext::new(&f.network, &f.tree, &f.graph).slotframe_bound(Some(1));

        for algorithm in [SchedulerType::Tasa, SchedulerType::Modesa] {
            let schedule = algorithm.get_instance().schedule(&ctx).unwrap();

            assert_eq!(schedule.slotframe_length(), 3, "{}", algorithm);
            assert_eq!(schedule.slotframe_bound(), None);
            assert_eq!(schedule.algorithm(), algorithm);
        }
    }

    #[test]
    fn test_convergecast_round_stops_when_a_slot_stays_empty() {
        let f = line();
        let ctx = SchedulingContext::new(&f.network, &f.tree, &f.graph);

        let result = schedule_round(&ctx, SchedulerType::Tasa, |_, _| Slot::new());

        assert!(matches!(result, Err(Error::InconsistentInput(_))));
    }

    #[test]
    fn test_modesa_uses_sink_interfaces() {
        let f = fixture(&[(0, 1, 100.0), (0, 2, 100.0)], &[(1, 0), (2, 0)], 2, 0.5);

        let single = SchedulingContext::new(&f.network, &f.tree, &f.graph).sink_interfaces(1);
        let dual = SchedulingContext::new(&f.network, &f.tree, &f.graph).sink_interfaces(2);

        let single_schedule = SchedulerType::Modesa.get_instance().schedule(&single).unwrap();
        let dual_schedule = SchedulerType::Modesa.get_instance().schedule(&dual).unwrap();

        assert_eq!(single_schedule.slotframe_length(), 2);
        assert_eq!(dual_schedule.slotframe_length(), 1);
        assert_eq!(
            dual_schedule.slots()[0].transmissions,
            vec![Transmission::hopping(n(1), n(0), 0), Transmission::hopping(n(2), n(0), 1)]
        );
        assert!(dual_schedule.verify(&f.graph, &f.tree).is_ok());
    }
}
