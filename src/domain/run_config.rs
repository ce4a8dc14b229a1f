use crate::api::config_dto::RunConfigDto;
use crate::domain::fhss::fhss_config::FhssConfig;
use crate::domain::fhss::fhss_type::FhssType;
use crate::domain::network::network_model::DEFAULT_NUM_CHANNELS;
use crate::domain::scheduler::scheduler_type::SchedulerType;
use crate::domain::scheduler::scheduling_context::DEFAULT_OPTIMAL_SEARCH_LIMIT;
use crate::domain::simulator::simulation_config::{SimulationConfig, SimulationMode};
use crate::domain::utils::id::{ChannelId, NodeId};
use crate::error::{Error, Result};

/// Validated, immutable configuration of one experiment.
///
/// Every `InvalidConfiguration` check happens while converting the DTO, so
/// nothing is scheduled or simulated with a bad configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub algorithm: SchedulerType,
    pub sink: NodeId,
    pub channel: Option<ChannelId>,
    pub etx_threshold: f64,
    pub slotframe_bound: Option<usize>,
    pub optimal_search_limit: u64,
    pub channel_offsets: u8,
    pub sink_interfaces: usize,
    pub num_channels: usize,
    pub network_file: String,
    pub tree_file: String,
    pub trace_prefix: Option<String>,

    /// `None` when only the schedule is computed.
    pub simulation: Option<SimulationConfig>,

    /// Hopping variants to simulate, one run each.
    pub fhss: Vec<FhssType>,
    pub fhss_config: FhssConfig,
}

impl TryFrom<RunConfigDto> for RunConfig {
    type Error = Error;

    fn try_from(dto: RunConfigDto) -> Result<Self> {
        let algorithm: SchedulerType = dto.algorithm.parse()?;
        let num_channels = dto.num_channels.unwrap_or(DEFAULT_NUM_CHANNELS);

        if num_channels == 0 || num_channels > u8::MAX as usize {
            return Err(Error::InvalidConfiguration(format!("numChannels {} is outside 1..=255", num_channels)));
        }

        if !(0.0..=1.0).contains(&dto.etx_threshold) {
            return Err(Error::InvalidConfiguration(format!("etxThreshold {} is outside [0, 1]", dto.etx_threshold)));
        }

        let channel = match dto.channel {
            Some(channel) if channel as usize >= num_channels => {
                return Err(Error::InvalidConfiguration(format!("channel {} is outside 0..{}", channel, num_channels)));
            }
            Some(channel) => Some(ChannelId::new(channel)),
            None if algorithm.needs_fixed_channel() => {
                return Err(Error::InvalidConfiguration(format!("{} needs a fixed channel", algorithm)));
            }
            None => None,
        };

        if dto.slotframe_length == Some(0) {
            return Err(Error::InvalidConfiguration("slotframeLength must be positive".to_string()));
        }

        let channel_offsets = dto.channel_offsets.unwrap_or(num_channels as u8);
        if channel_offsets == 0 || channel_offsets as usize > num_channels {
            return Err(Error::InvalidConfiguration(format!("channelOffsets {} is outside 1..={}", channel_offsets, num_channels)));
        }

        let sink_interfaces = dto.sink_interfaces.unwrap_or(1);
        if sink_interfaces == 0 {
            return Err(Error::InvalidConfiguration("sinkInterfaces must be positive".to_string()));
        }

        let simulation = match dto.simulation {
            Some(sim) if sim.execute => {
                let mode: SimulationMode = sim.mode.parse()?;
                let pkt_prob = match (mode, sim.pkt_prob) {
                    (_, Some(pkt_prob)) => pkt_prob,
                    // Trace replay takes the success probability from the traces
                    (SimulationMode::TraceReplay, None) => 0,
                    (SimulationMode::ScheduleExecution, None) => {
                        return Err(Error::InvalidConfiguration("ScheduleExecution needs a pktProb".to_string()));
                    }
                };

                let config = SimulationConfig {
                    mode,
                    pkt_prob,
                    timeslots_per_file: sim.timeslots_per_file,
                    timeslots_log: sim.timeslots_log,
                    max_files: sim.max_files,
                    seed: sim.seed,
                };
                config.validate()?;

                if config.mode == SimulationMode::TraceReplay && dto.trace_prefix.is_none() {
                    return Err(Error::InvalidConfiguration("TraceReplay needs a tracePrefix".to_string()));
                }
                Some(config)
            }
            _ => None,
        };

        let defaults = FhssConfig::default();
        let (fhss, fhss_config) = match dto.fhss {
            Some(f) => {
                let config = FhssConfig {
                    fixed_channel: channel.unwrap_or(defaults.fixed_channel),
                    num_channels,
                    blacklist_size: f.blacklist_size.unwrap_or(defaults.blacklist_size.min(num_channels - 1)),
                    prr_threshold: dto.etx_threshold,
                    epsilon_init: f.epsilon_init.unwrap_or(defaults.epsilon_init),
                    epsilon_increment: f.epsilon_increment.unwrap_or(defaults.epsilon_increment),
                    epsilon_max: f.epsilon_max.unwrap_or(defaults.epsilon_max),
                    first_best_arms: f.first_best_arms.unwrap_or(defaults.first_best_arms.min(num_channels)),
                    good_arm_threshold: f.good_arm_threshold.unwrap_or(defaults.good_arm_threshold),
                    seed: f.seed.unwrap_or(defaults.seed),
                };
                (FhssType::parse_selection(&f.typ)?, config)
            }
            None => (
                vec![FhssType::OpenWsn],
                FhssConfig {
                    fixed_channel: channel.unwrap_or(defaults.fixed_channel),
                    num_channels,
                    blacklist_size: defaults.blacklist_size.min(num_channels - 1),
                    prr_threshold: dto.etx_threshold,
                    first_best_arms: defaults.first_best_arms.min(num_channels),
                    ..defaults
                },
            ),
        };
        fhss_config.validate()?;

        Ok(RunConfig {
            algorithm,
            sink: NodeId::new(dto.sink_id),
            channel,
            etx_threshold: dto.etx_threshold,
            slotframe_bound: dto.slotframe_length,
            optimal_search_limit: dto.optimal_search_limit.unwrap_or(DEFAULT_OPTIMAL_SEARCH_LIMIT),
            channel_offsets,
            sink_interfaces,
            num_channels,
            network_file: dto.network_file,
            tree_file: dto.tree_file,
            trace_prefix: dto.trace_prefix,
            simulation,
            fhss,
            fhss_config,
        })
    }
}
