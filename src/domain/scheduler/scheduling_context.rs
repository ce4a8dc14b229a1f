use crate::domain::conflict::conflict_graph::ConflictGraph;
use crate::domain::network::network_model::NetworkModel;
use crate::domain::network::tree::DistributionTree;
use crate::domain::schedule::tsch_schedule::PlacementRules;
use crate::domain::scheduler::scheduler_type::SchedulerType;
use crate::domain::utils::id::{ChannelId, NodeId};
use crate::error::{Error, Result};

/// Default budget of search nodes for the exact ICRA search.
pub const DEFAULT_OPTIMAL_SEARCH_LIMIT: u64 = 1_000_000;

/// Read-only inputs shared by every scheduler variant.
pub struct SchedulingContext<'a> {
    pub network: &'a NetworkModel,
    pub tree: &'a DistributionTree,
    pub graph: &'a ConflictGraph,
    pub sink: NodeId,

    /// Fixed channel for single-channel variants; `None` means "any channel".
    pub channel: Option<ChannelId>,

    /// Hard slotframe bound for the bounded variants.
    pub slotframe_bound: Option<usize>,
    pub optimal_search_limit: u64,

    /// Number of channel offsets available to multichannel-offset scheduling.
    pub channel_offsets: u8,

    /// Number of radios at the sink.
    pub sink_interfaces: usize,
}

impl<'a> SchedulingContext<'a> {
    pub fn new(network: &'a NetworkModel, tree: &'a DistributionTree, graph: &'a ConflictGraph) -> Self {
        SchedulingContext {
            network,
            tree,
            graph,
            sink: tree.sink(),
            channel: None,
            slotframe_bound: None,
            optimal_search_limit: DEFAULT_OPTIMAL_SEARCH_LIMIT,
            channel_offsets: u8::try_from(network.num_channels()).unwrap_or(u8::MAX),
            sink_interfaces: 1,
        }
    }

    /// Configured sink; must match the tree root.
    pub fn sink(mut self, sink: NodeId) -> Self {
        self.sink = sink;
        self
    }

    pub fn channel(mut self, channel: Option<ChannelId>) -> Self {
        self.channel = channel;
        self
    }

    pub fn slotframe_bound(mut self, slotframe_bound: Option<usize>) -> Self {
        self.slotframe_bound = slotframe_bound;
        self
    }

    pub fn optimal_search_limit(mut self, limit: u64) -> Self {
        self.optimal_search_limit = limit;
        self
    }

    pub fn channel_offsets(mut self, channel_offsets: u8) -> Self {
        self.channel_offsets = channel_offsets;
        self
    }

    pub fn sink_interfaces(mut self, sink_interfaces: usize) -> Self {
        self.sink_interfaces = sink_interfaces;
        self
    }

    /// Checks the context before any scheduling work starts.
    pub fn validate(&self, algorithm: SchedulerType) -> Result<()> {
        if self.sink != self.tree.sink() {
            return Err(Error::InconsistentInput(format!("configured sink {} is not the tree root {}", self.sink, self.tree.sink())));
        }

        if let Some(channel) = self.channel {
            if channel.index() >= self.network.num_channels() {
                return Err(Error::InvalidConfiguration(format!(
                    "channel {} is outside the {} channels of the network",
                    channel,
                    self.network.num_channels()
                )));
            }
        } else if algorithm.needs_fixed_channel() {
            return Err(Error::InvalidConfiguration(format!("{} needs a fixed channel", algorithm)));
        }

        if self.slotframe_bound == Some(0) {
            return Err(Error::InvalidConfiguration("the slotframe bound must be positive".to_string()));
        }

        if self.channel_offsets == 0 || self.channel_offsets as usize > self.network.num_channels() {
            return Err(Error::InvalidConfiguration(format!(
                "{} channel offsets requested but the network has {} channels",
                self.channel_offsets,
                self.network.num_channels()
            )));
        }

        if self.sink_interfaces == 0 {
            return Err(Error::InvalidConfiguration("the sink needs at least one interface".to_string()));
        }

        Ok(())
    }

    /// Placement rules for a schedule built by `algorithm`.
    pub fn placement_rules(&self, algorithm: SchedulerType) -> PlacementRules {
        let sink_interfaces = if algorithm == SchedulerType::Modesa { self.sink_interfaces } else { 1 };

        PlacementRules { sink: self.sink, reference_channel: self.channel.unwrap_or(ChannelId::new(0)), sink_interfaces }
    }
}
