mod common;

use common::*;
use tsch_scheduling::domain::schedule::transmission::ChannelAssignment;
use tsch_scheduling::domain::scheduler::mcc::repetitions_for;
use tsch_scheduling::domain::scheduler::scheduler_type::SchedulerType;
use tsch_scheduling::domain::scheduler::scheduling_context::SchedulingContext;
use tsch_scheduling::domain::utils::id::ChannelId;
use tsch_scheduling::error::Error;

fn context(bed: &Testbed) -> SchedulingContext<'_> {
    SchedulingContext::new(&bed.network, &bed.tree, &bed.graph).channel(Some(ChannelId::new(0)))
}

#[test]
fn test_every_algorithm_yields_a_conflict_free_complete_schedule() {
    let bed = two_branch();

    for algorithm in SchedulerType::ALL {
        let schedule = algorithm.get_instance().schedule(&context(&bed)).unwrap();

        assert_eq!(schedule.algorithm(), algorithm);
        assert!(schedule.verify(&bed.graph, &bed.tree).is_ok(), "{} produced an invalid schedule", algorithm);
        for edge in bed.tree.edges() {
            assert!(schedule.cells_of(edge.sender, edge.receiver) > 0, "{} skipped {} -> {}", algorithm, edge.sender, edge.receiver);
        }
    }
}

#[test]
fn test_scheduling_is_deterministic() {
    let bed = two_branch();

    for algorithm in SchedulerType::ALL {
        let first = algorithm.get_instance().schedule(&context(&bed)).unwrap();
        let second = algorithm.get_instance().schedule(&context(&bed)).unwrap();
        assert_eq!(first, second, "{} is not deterministic", algorithm);
    }
}

#[test]
fn test_optimal_is_never_longer_than_greedy() {
    let bed = two_branch();

    let optimal = SchedulerType::McIcra.get_instance().schedule(&context(&bed)).unwrap();
    let greedy = SchedulerType::McIcraNonOptimal.get_instance().schedule(&context(&bed)).unwrap();

    // Node 1 takes part in three transmissions, so no schedule is shorter than 3
    assert!(optimal.slotframe_length() >= 3);
    assert!(optimal.slotframe_length() <= greedy.slotframe_length());
}

#[test]
fn test_single_channel_variants_stay_on_the_configured_channel() {
    let bed = two_branch();
    let ctx = SchedulingContext::new(&bed.network, &bed.tree, &bed.graph).channel(Some(ChannelId::new(2)));

    for algorithm in [SchedulerType::McIcra, SchedulerType::McIcraNonOptimal] {
        let schedule = algorithm.get_instance().schedule(&ctx).unwrap();
        assert!(schedule.transmissions().all(|(_, t)| t.channel == ChannelAssignment::Fixed { channel: ChannelId::new(2) }));
        assert_eq!(schedule.num_transmissions(), bed.tree.edges().len());
    }
}

#[test]
fn test_bounded_slotframe_too_short_is_reported() {
    let bed = two_branch();
    let ctx = context(&bed).slotframe_bound(Some(2));

    for algorithm in [SchedulerType::McIcraNonOptimal, SchedulerType::McIcra, SchedulerType::McCqaa] {
        let result = algorithm.get_instance().schedule(&ctx);
        assert!(matches!(result, Err(Error::UnschedulableEdge { slotframe_length: 2, .. })), "{} accepted a 2-slot frame", algorithm);
    }
}

#[test]
fn test_cqaa_uses_connected_channels_once_per_edge() {
    let bed = two_branch();
    let schedule = SchedulerType::McCqaa.get_instance().schedule(&SchedulingContext::new(&bed.network, &bed.tree, &bed.graph)).unwrap();

    assert_eq!(schedule.num_transmissions(), bed.tree.edges().len());
    for (_, transmission) in schedule.transmissions() {
        let ChannelAssignment::Fixed { channel } = transmission.channel else {
            panic!("CQAA produced a hopping cell");
        };
        assert!(bed.graph.is_connected(transmission.sender, transmission.receiver, channel));
    }
}

#[test]
fn test_cqara_grants_cells_proportional_to_etx() {
    let bed = two_branch();
    let schedule = SchedulerType::McCqara.get_instance().schedule(&SchedulingContext::new(&bed.network, &bed.tree, &bed.graph)).unwrap();

    for edge in bed.tree.edges() {
        let best = bed.graph.ranked_channels(edge.sender, edge.receiver)[0];
        let expected = repetitions_for(bed.graph.etx(edge.sender, edge.receiver, best));
        assert_eq!(schedule.cells_of(edge.sender, edge.receiver), expected, "edge {} -> {}", edge.sender, edge.receiver);
    }
}

#[test]
fn test_convergecast_schedulers_forward_every_packet() {
    let bed = two_branch();

    for algorithm in [SchedulerType::Tasa, SchedulerType::Modesa] {
        let schedule = algorithm.get_instance().schedule(&context(&bed)).unwrap();

        for edge in bed.tree.edges() {
            assert_eq!(schedule.cells_of(edge.sender, edge.receiver), bed.tree.subtree_size(edge.sender));
        }
        assert_eq!(schedule.num_transmissions(), 10);
        assert!(schedule.transmissions().all(|(_, t)| matches!(t.channel, ChannelAssignment::Hopping { .. })));

        // One sink radio receives the six packets one at a time
        assert!(schedule.slotframe_length() >= 6);
    }
}

#[test]
fn test_extra_sink_interfaces_shorten_modesa() {
    let bed = two_branch();

    let single = SchedulerType::Modesa.get_instance().schedule(&context(&bed)).unwrap();
    let dual = SchedulerType::Modesa.get_instance().schedule(&context(&bed).sink_interfaces(2)).unwrap();

    assert!(dual.slotframe_length() <= single.slotframe_length());
    assert!(dual.verify(&bed.graph, &bed.tree).is_ok());
}

#[test]
fn test_context_rejects_a_foreign_sink() {
    let bed = two_branch();

    let result = SchedulerType::Tasa.get_instance().schedule(&context(&bed).sink(n(3)));

    assert!(matches!(result, Err(Error::InconsistentInput(_))));
}
