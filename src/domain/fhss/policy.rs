use serde::Serialize;

use crate::domain::fhss::fhss_type::FhssType;
use crate::domain::simulator::trace::LinkTrace;
use crate::domain::utils::id::{ChannelId, NodeId};

/// Selects the physical channel of cells scheduled with a channel offset.
///
/// The simulator calls `select_channel` exactly once per slot and unresolved
/// transmission, in slot order, and reports the outcome right after. A policy
/// owns its state exclusively; two instances never share anything.
pub trait ChannelHoppingPolicy: Send {
    fn fhss_type(&self) -> FhssType;

    /// Channel for the cell `link` with `offset` in absolute slot `asn`.
    fn select_channel(&mut self, asn: u64, link: (NodeId, NodeId), offset: u8) -> ChannelId;

    /// Reception outcome of a transmission on `channel`.
    fn report(&mut self, _asn: u64, _link: (NodeId, NodeId), _channel: ChannelId, _delivered: bool) {}

    /// Called when the replay moves on to a new trace file.
    fn on_trace_file(&mut self, _trace: &LinkTrace) {}

    fn final_state(&self) -> FhssFinalState;
}

/// Per-link view of a policy at the end of a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkChannelState {
    pub sender: NodeId,
    pub receiver: NodeId,
    pub blacklist: Vec<ChannelId>,

    /// Channels from best to worst according to the policy.
    pub ranking: Vec<ChannelId>,

    /// Reward estimate per channel index (bandit variants only).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub estimates: Vec<f64>,
}

/// Blacklist contents and learned rankings reported after a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FhssFinalState {
    pub fhss_type: FhssType,
    pub global_blacklist: Vec<ChannelId>,
    pub links: Vec<LinkChannelState>,
}

impl FhssFinalState {
    pub fn new(fhss_type: FhssType) -> Self {
        FhssFinalState { fhss_type, global_blacklist: Vec::new(), links: Vec::new() }
    }

    pub fn link(&self, sender: NodeId, receiver: NodeId) -> Option<&LinkChannelState> {
        self.links.iter().find(|l| l.sender == sender && l.receiver == receiver)
    }
}
