#[cfg(test)]
mod tests {
    use tracing_test::traced_test;

    use crate::domain::fhss::blacklist::DistributedOptimalBlacklist;
    use crate::domain::fhss::fhss_config::FhssConfig;
    use crate::domain::fhss::fhss_type::FhssType;
    use crate::domain::network::link::PrrRecord;
    use crate::domain::network::network_model::NetworkModel;
    use crate::domain::network::tree::DistributionTree;
    use crate::domain::schedule::slot::Slot;
    use crate::domain::schedule::transmission::Transmission;
    use crate::domain::schedule::tsch_schedule::{PlacementRules, Schedule};
    use crate::domain::scheduler::scheduler_type::SchedulerType;
    use crate::domain::simulator::draws::ReceptionDraws;
    use crate::domain::simulator::log_record::LogRecord;
    use crate::domain::simulator::schedule_simulator::ScheduleSimulator;
    use crate::domain::simulator::simulation_config::{SimulationConfig, SimulationMode};
    use crate::domain::simulator::trace::{LinkTrace, TraceSet};
    use crate::domain::utils::id::{ChannelId, NodeId};
    use crate::error::Error;

    fn n(id: u16) -> NodeId {
        NodeId::new(id)
    }

    fn rules() -> PlacementRules {
        PlacementRules { sink: n(0), reference_channel: ChannelId::new(0), sink_interfaces: 1 }
    }

    /// Single edge 1 -> 0 in a one-slot slotframe.
    fn single_edge(transmission: Transmission) -> Schedule {
        let mut schedule = Schedule::new(SchedulerType::McIcraNonOptimal, rules(), None);
        schedule.push_slot(Slot { transmissions: vec![transmission] });
        schedule
    }

    /// Line 2 -> 1 -> 0; the hops share node 1 and take one slot each.
    fn line() -> Schedule {
        let mut schedule = Schedule::new(SchedulerType::McIcraNonOptimal, rules(), None);
        schedule.push_slot(Slot { transmissions: vec![Transmission::fixed(n(2), n(1), ChannelId::new(0))] });
        schedule.push_slot(Slot { transmissions: vec![Transmission::fixed(n(1), n(0), ChannelId::new(0))] });
        schedule
    }

    fn config(pkt_prob: u8, timeslots: u64, timeslots_log: u64) -> SimulationConfig {
        SimulationConfig {
            mode: SimulationMode::ScheduleExecution,
            pkt_prob,
            timeslots_per_file: timeslots,
            timeslots_log,
            max_files: 1,
            seed: Some(7),
        }
    }

    fn run(schedule: &Schedule, config: &SimulationConfig, draws: &ReceptionDraws) -> Result<Vec<LogRecord>, Error> {
        let mut records: Vec<LogRecord> = Vec::new();
        ScheduleSimulator::new(schedule, config, draws, 1).run(&mut records)?;
        Ok(records)
    }

    #[test]
    fn test_certain_reception_delivers_every_packet() {
        let schedule = single_edge(Transmission::fixed(n(1), n(0), ChannelId::new(0)));
        let config = config(100, 100, 10);
        let draws = ReceptionDraws::for_horizon(&config, &schedule).unwrap();

        let mut records: Vec<LogRecord> = Vec::new();
        let report = ScheduleSimulator::new(&schedule, &config, &draws, 1).run(&mut records).unwrap();

        assert_eq!(report.total.attempted, 100);
        assert_eq!(report.total.delivered, 100);
        assert_eq!(report.delivered_to_sink, 100);
        assert_eq!(report.draws_consumed, 100);
        assert_eq!(records.len(), 10);
        assert!(records.iter().all(|r| r.total.attempted == 10 && r.channel_usage == vec![10]));
    }

    #[test]
    fn test_zero_probability_delivers_nothing() {
        let schedule = single_edge(Transmission::fixed(n(1), n(0), ChannelId::new(0)));
        let config = config(0, 50, 50);
        let draws = ReceptionDraws::for_horizon(&config, &schedule).unwrap();

        let records = run(&schedule, &config, &draws).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].total.attempted, 50);
        assert_eq!(records[0].total.delivered, 0);
        assert_eq!(records[0].delivered_to_sink, 0);
    }

    #[test]
    fn test_draw_threshold_is_strict() {
        let schedule = single_edge(Transmission::fixed(n(1), n(0), ChannelId::new(0)));
        let config = config(50, 4, 4);
        let draws = ReceptionDraws::from_values(vec![49, 50, 0, 99]);

        let records = run(&schedule, &config, &draws).unwrap();

        assert_eq!(records[0].total.delivered, 2);
    }

    #[test]
    fn test_same_draws_give_identical_records() {
        let schedule = line();
        let config = config(60, 200, 25);
        let draws = ReceptionDraws::for_horizon(&config, &schedule).unwrap();

        let first = run(&schedule, &config, &draws).unwrap();
        let second = run(&schedule, &config, &draws).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_short_draw_sequence_is_rejected() {
        let schedule = single_edge(Transmission::fixed(n(1), n(0), ChannelId::new(0)));
        let config = config(100, 100, 10);
        let draws = ReceptionDraws::from_values(vec![0; 50]);

        let result = run(&schedule, &config, &draws);

        assert!(matches!(result, Err(Error::InsufficientRandomness { required: 100, available: 50 })));
    }

    #[test]
    fn test_trailing_partial_window_is_flushed() {
        let schedule = line();
        let config = config(100, 25, 10);
        let draws = ReceptionDraws::for_horizon(&config, &schedule).unwrap();

        let records = run(&schedule, &config, &draws).unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!((records[2].first_slot, records[2].last_slot), (20, 24));
        assert_eq!(records[2].window, 2);

        // Slots 20..=24 alternate 2->1, 1->0, 2->1, 1->0, 2->1
        assert_eq!(records[2].link(n(2), n(1)).map(|c| c.attempted), Some(3));
        assert_eq!(records[2].link(n(1), n(0)).map(|c| c.attempted), Some(2));
        assert_eq!(records[2].delivered_to_sink, 2);
    }

    #[test]
    fn test_hopping_cells_need_a_policy() {
        let schedule = single_edge(Transmission::hopping(n(1), n(0), 0));
        let config = config(100, 10, 10);
        let draws = ReceptionDraws::for_horizon(&config, &schedule).unwrap();

        assert!(matches!(run(&schedule, &config, &draws), Err(Error::InvalidConfiguration(_))));
    }

    #[test]
    fn test_trace_replay_follows_refreshed_blacklist() {
        // The network model claims both channels work, the trace says only channel 1 does.
        let mut records = Vec::new();
        for channel in 0..2 {
            records.push(PrrRecord { from: 1, to: 0, channel, prr: 90.0 });
            records.push(PrrRecord { from: 0, to: 1, channel, prr: 90.0 });
        }
        let network = NetworkModel::from_records(&records, 2).unwrap();
        let tree = DistributionTree::from_parents(n(0), &[(n(1), n(0))], &network).unwrap();

        let trace = LinkTrace::from_records(
            1,
            &[PrrRecord { from: 1, to: 0, channel: 0, prr: 0.0 }, PrrRecord { from: 1, to: 0, channel: 1, prr: 100.0 }],
        )
        .unwrap();
        let traces = TraceSet::new(vec![trace]);

        let schedule = single_edge(Transmission::hopping(n(1), n(0), 0));
        let config = SimulationConfig { mode: SimulationMode::TraceReplay, ..config(0, 20, 20) };
        let draws = ReceptionDraws::for_horizon(&config, &schedule).unwrap();
        let fhss = FhssConfig { num_channels: 2, blacklist_size: 1, first_best_arms: 2, ..FhssConfig::default() };

        let mut log: Vec<LogRecord> = Vec::new();
        let report = ScheduleSimulator::new(&schedule, &config, &draws, 2)
            .traces(&traces)
            .policy(Box::new(DistributedOptimalBlacklist::new(&fhss, &network, &tree)))
            .run(&mut log)
            .unwrap();

        assert_eq!(report.fhss_type, Some(FhssType::DistributedBlacklistOptimal));
        assert_eq!(report.total.delivered, 20);
        assert_eq!(log[0].channel_usage, vec![0, 20]);

        let state = report.fhss_state.unwrap();
        assert_eq!(state.link(n(1), n(0)).map(|l| l.blacklist.clone()), Some(vec![ChannelId::new(0)]));
    }

    #[test]
    fn test_trace_replay_needs_every_file() {
        let schedule = single_edge(Transmission::fixed(n(1), n(0), ChannelId::new(0)));
        let config = SimulationConfig { mode: SimulationMode::TraceReplay, max_files: 2, ..config(0, 10, 10) };
        let draws = ReceptionDraws::for_horizon(&config, &schedule).unwrap();
        let traces = TraceSet::new(vec![LinkTrace::default()]);

        let mut records: Vec<LogRecord> = Vec::new();
        let result = ScheduleSimulator::new(&schedule, &config, &draws, 1).traces(&traces).run(&mut records);

        assert!(matches!(result, Err(Error::InconsistentInput(_))));
    }

    #[test]
    #[traced_test]
    fn test_windows_are_reported_as_analytics_events() {
        let schedule = single_edge(Transmission::fixed(n(1), n(0), ChannelId::new(0)));
        let config = config(100, 20, 10);
        let draws = ReceptionDraws::for_horizon(&config, &schedule).unwrap();

        run(&schedule, &config, &draws).unwrap();

        assert!(logs_contain("Log window flushed"));
        assert!(logs_contain("Simulation finished"));
    }
}
