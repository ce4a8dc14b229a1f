use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::api::config_dto::RunConfigDto;
use crate::api::tree_dto::TreeDto;
use crate::domain::conflict::conflict_graph_builder::ConflictGraphBuilder;
use crate::domain::fhss::fhss_type::FhssType;
use crate::domain::network::network_model::NetworkModel;
use crate::domain::network::tree::DistributionTree;
use crate::domain::run_config::RunConfig;
use crate::domain::schedule::tsch_schedule::Schedule;
use crate::domain::scheduler::scheduler_type::SchedulerType;
use crate::domain::scheduler::scheduling_context::SchedulingContext;
use crate::domain::simulator::draws::ReceptionDraws;
use crate::domain::simulator::log_record::LogRecord;
use crate::domain::simulator::schedule_simulator::{ScheduleSimulator, SimulationReport};
use crate::domain::simulator::simulation_config::{SimulationConfig, SimulationMode};
use crate::domain::simulator::trace::TraceSet;
use crate::error::{Error, Result};
use crate::loader::parser::parse_json_file;
use crate::loader::trace_reader::{read_prr_file, read_trace_set};

pub mod api;
pub mod domain;
pub mod error;
pub mod loader;
pub mod logger;

/// One simulated run of the schedule under one hopping variant.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationRun {
    pub report: SimulationReport,
    pub records: Vec<LogRecord>,
}

/// Everything an experiment produced.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperimentReport {
    pub algorithm: SchedulerType,
    pub schedule: Schedule,

    /// One entry per simulated hopping variant, in configuration order; empty without simulation.
    pub runs: Vec<SimulationRun>,
}

impl ExperimentReport {
    /// Summaries of all runs as pretty-printed JSON, including the final hopping state of each run.
    pub fn run_reports_json(&self) -> Result<String> {
        let reports: Vec<&SimulationReport> = self.runs.iter().map(|run| &run.report).collect();
        Ok(serde_json::to_string_pretty(&reports)?)
    }
}

/// Schedules the tree with the configured algorithm and, if configured, simulates the schedule.
///
/// With several hopping variants the runs execute in parallel on the rayon
/// pool over the same read-only schedule and reception draws.
pub fn run_experiment(config: &RunConfig, network: &NetworkModel, tree: &DistributionTree, traces: Option<&TraceSet>) -> Result<ExperimentReport> {
    // 1. Conflict graph
    let graph = ConflictGraphBuilder::new(network).etx_threshold(config.etx_threshold).tree(tree).build()?;

    // 2. Schedule
    let ctx = SchedulingContext::new(network, tree, &graph)
        .sink(config.sink)
        .channel(config.channel)
        .slotframe_bound(config.slotframe_bound)
        .optimal_search_limit(config.optimal_search_limit)
        .channel_offsets(config.channel_offsets)
        .sink_interfaces(config.sink_interfaces);

    let schedule = config.algorithm.get_instance().schedule(&ctx)?;
    schedule.verify(&graph, tree)?;

    // 3. Simulation
    let Some(simulation) = config.simulation.as_ref() else {
        return Ok(ExperimentReport { algorithm: config.algorithm, schedule, runs: Vec::new() });
    };

    let draws = ReceptionDraws::for_horizon(simulation, &schedule)?;
    let uses_hopping = schedule.transmissions().any(|(_, t)| !t.channel.is_resolved());

    let runs = if uses_hopping {
        config
            .fhss
            .par_iter()
            .map(|fhss_type| simulate(config, simulation, network, tree, traces, &schedule, &draws, Some(*fhss_type)))
            .collect::<Result<Vec<_>>>()?
    } else {
        log::info!("{} pins every cell to a channel, hopping variants are not simulated.", config.algorithm);
        vec![simulate(config, simulation, network, tree, traces, &schedule, &draws, None)?]
    };

    Ok(ExperimentReport { algorithm: config.algorithm, schedule, runs })
}

#[allow(clippy::too_many_arguments)]
fn simulate(
    config: &RunConfig,
    simulation: &SimulationConfig,
    network: &NetworkModel,
    tree: &DistributionTree,
    traces: Option<&TraceSet>,
    schedule: &Schedule,
    draws: &ReceptionDraws,
    fhss_type: Option<FhssType>,
) -> Result<SimulationRun> {
    let mut simulator = ScheduleSimulator::new(schedule, simulation, draws, network.num_channels());

    if let Some(traces) = traces {
        simulator = simulator.traces(traces);
    }
    if let Some(fhss_type) = fhss_type {
        simulator = simulator.policy(fhss_type.get_instance(&config.fhss_config, network, tree));
    }

    let mut records: Vec<LogRecord> = Vec::new();
    let report = simulator.run(&mut records)?;

    log::info!(
        "Run {} / {} finished: {} of {} transmissions delivered, {} packets reached the sink.",
        schedule.algorithm(),
        fhss_type.map(|t| t.as_str()).unwrap_or("FIXED_CELLS"),
        report.total.delivered,
        report.total.attempted,
        report.delivered_to_sink
    );

    Ok(SimulationRun { report, records })
}

/// Resolves `file` against the directory of the configuration file.
fn resolve(base: &Path, file: &str) -> PathBuf {
    let path = Path::new(file);
    if path.is_absolute() { path.to_path_buf() } else { base.join(path) }
}

/// Loads configuration, network, tree and traces, then runs the experiment.
///
/// Relative paths in the configuration are taken relative to the configuration file.
pub fn run_from_config_file(file_path: &str) -> Result<ExperimentReport> {
    let dto: RunConfigDto = parse_json_file::<RunConfigDto>(file_path)?;
    let config = RunConfig::try_from(dto)?;
    log::info!("Configuration {} parsed: {} on sink {}.", file_path, config.algorithm, config.sink);

    let base = Path::new(file_path).parent().map(Path::to_path_buf).unwrap_or_default();

    let records = read_prr_file(resolve(&base, &config.network_file))?;
    let mut network = NetworkModel::from_records(&records, config.num_channels)?;

    let tree_dto: TreeDto = parse_json_file::<TreeDto>(resolve(&base, &config.tree_file))?;
    if tree_dto.sink_id() != config.sink {
        return Err(Error::InconsistentInput(format!("the tree is rooted at {} but the configured sink is {}", tree_dto.sink, config.sink)));
    }
    let tree = DistributionTree::from_parents(tree_dto.sink_id(), &tree_dto.parent_pairs(), &network)?;
    network.assign_roles(&tree)?;

    let traces = match (&config.simulation, &config.trace_prefix) {
        (Some(simulation), Some(prefix)) if simulation.mode == SimulationMode::TraceReplay => {
            let prefix = resolve(&base, prefix);
            Some(read_trace_set(&prefix.to_string_lossy(), simulation.max_files)?)
        }
        _ => None,
    };

    run_experiment(&config, &network, &tree, traces.as_ref())
}
