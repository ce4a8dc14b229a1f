use serde::Serialize;
use std::fmt;

use crate::domain::utils::id::{ChannelId, NodeId};

/// Channel of a scheduled cell: pinned by the scheduler, or a channel offset
/// that the hopping policy resolves slot by slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ChannelAssignment {
    Fixed { channel: ChannelId },
    Hopping { offset: u8 },
}

impl ChannelAssignment {
    pub fn is_resolved(&self) -> bool {
        matches!(self, ChannelAssignment::Fixed { .. })
    }
}

/// One scheduled transmission `sender -> receiver`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Transmission {
    pub sender: NodeId,
    pub receiver: NodeId,
    pub channel: ChannelAssignment,
}

impl Transmission {
    pub fn fixed(sender: NodeId, receiver: NodeId, channel: ChannelId) -> Self {
        Transmission { sender, receiver, channel: ChannelAssignment::Fixed { channel } }
    }

    pub fn hopping(sender: NodeId, receiver: NodeId, offset: u8) -> Self {
        Transmission { sender, receiver, channel: ChannelAssignment::Hopping { offset } }
    }

    pub fn link(&self) -> (NodeId, NodeId) {
        (self.sender, self.receiver)
    }

    /// The channel both transmissions end up on, if they are guaranteed to share one.
    ///
    /// Hopping cells with equal offsets always land on the same channel; their
    /// conflicts are evaluated on `reference_channel`.
    pub fn shared_channel(&self, other: &Transmission, reference_channel: ChannelId) -> Option<ChannelId> {
        match (self.channel, other.channel) {
            (ChannelAssignment::Fixed { channel: a }, ChannelAssignment::Fixed { channel: b }) if a == b => Some(a),
            (ChannelAssignment::Hopping { offset: a }, ChannelAssignment::Hopping { offset: b }) if a == b => Some(reference_channel),
            _ => None,
        }
    }
}

impl fmt::Display for Transmission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.channel {
            ChannelAssignment::Fixed { channel } => write!(f, "{} -> {} @ch{}", self.sender, self.receiver, channel),
            ChannelAssignment::Hopping { offset } => write!(f, "{} -> {} @offset{}", self.sender, self.receiver, offset),
        }
    }
}
