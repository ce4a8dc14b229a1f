use serde::Serialize;
use std::collections::BTreeMap;

use crate::domain::fhss::fhss_type::FhssType;
use crate::domain::utils::id::{ChannelId, NodeId};

/// Attempted and delivered transmission counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryCount {
    pub attempted: u64,
    pub delivered: u64,
}

impl DeliveryCount {
    pub fn record(&mut self, delivered: bool) {
        self.attempted += 1;
        if delivered {
            self.delivered += 1;
        }
    }

    pub fn add(&mut self, other: &DeliveryCount) {
        self.attempted += other.attempted;
        self.delivered += other.delivered;
    }

    /// Delivered fraction, 0 when nothing was attempted.
    pub fn ratio(&self) -> f64 {
        if self.attempted == 0 { 0.0 } else { self.delivered as f64 / self.attempted as f64 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkStats {
    pub sender: NodeId,
    pub receiver: NodeId,
    #[serde(flatten)]
    pub count: DeliveryCount,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeStats {
    pub node: NodeId,
    #[serde(flatten)]
    pub count: DeliveryCount,
}

/// Statistics of one log window of `timeslots_log` slots (the last window may be shorter).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogRecord {
    /// `None` when every cell had a fixed channel and no hopping policy was involved.
    pub fhss_type: Option<FhssType>,
    pub window: u64,
    pub first_slot: u64,
    pub last_slot: u64,

    /// 1-based trace file the window ended in.
    pub file_number: usize,

    /// Per link, ordered by (sender, receiver).
    pub links: Vec<LinkStats>,

    /// Per sending node, ordered by id.
    pub nodes: Vec<NodeStats>,
    pub total: DeliveryCount,
    pub delivered_to_sink: u64,

    /// Transmissions per channel index.
    pub channel_usage: Vec<u64>,
}

impl LogRecord {
    pub fn link(&self, sender: NodeId, receiver: NodeId) -> Option<&DeliveryCount> {
        self.links.iter().find(|l| l.sender == sender && l.receiver == receiver).map(|l| &l.count)
    }

    pub fn node(&self, node: NodeId) -> Option<&DeliveryCount> {
        self.nodes.iter().find(|n| n.node == node).map(|n| &n.count)
    }
}

/// Accumulates counts until the window is flushed.
#[derive(Debug, Clone)]
pub(crate) struct WindowAccumulator {
    sink: NodeId,
    first_slot: u64,
    slots: u64,
    links: BTreeMap<(NodeId, NodeId), DeliveryCount>,
    nodes: BTreeMap<NodeId, DeliveryCount>,
    total: DeliveryCount,
    delivered_to_sink: u64,
    channel_usage: Vec<u64>,
}

impl WindowAccumulator {
    pub(crate) fn new(sink: NodeId, num_channels: usize, first_slot: u64) -> Self {
        WindowAccumulator {
            sink,
            first_slot,
            slots: 0,
            links: BTreeMap::new(),
            nodes: BTreeMap::new(),
            total: DeliveryCount::default(),
            delivered_to_sink: 0,
            channel_usage: vec![0; num_channels],
        }
    }

    pub(crate) fn record(&mut self, sender: NodeId, receiver: NodeId, channel: ChannelId, delivered: bool) {
        self.links.entry((sender, receiver)).or_default().record(delivered);
        self.nodes.entry(sender).or_default().record(delivered);
        self.total.record(delivered);

        if delivered && receiver == self.sink {
            self.delivered_to_sink += 1;
        }

        if let Some(usage) = self.channel_usage.get_mut(channel.index()) {
            *usage += 1;
        }
    }

    pub(crate) fn close_slot(&mut self) {
        self.slots += 1;
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.slots == 0
    }

    /// Turns the window into a record and starts the next one right after it.
    pub(crate) fn flush(&mut self, fhss_type: Option<FhssType>, window: u64, file_number: usize) -> LogRecord {
        let next_first_slot = self.first_slot + self.slots;
        let next = WindowAccumulator::new(self.sink, self.channel_usage.len(), next_first_slot);
        let finished = std::mem::replace(self, next);

        LogRecord {
            fhss_type,
            window,
            first_slot: finished.first_slot,
            last_slot: next_first_slot.saturating_sub(1),
            file_number,
            links: finished.links.into_iter().map(|((sender, receiver), count)| LinkStats { sender, receiver, count }).collect(),
            nodes: finished.nodes.into_iter().map(|(node, count)| NodeStats { node, count }).collect(),
            total: finished.total,
            delivered_to_sink: finished.delivered_to_sink,
            channel_usage: finished.channel_usage,
        }
    }
}
