use std::collections::HashMap;

use crate::domain::utils::id::{ChannelId, NodeId};
use crate::domain::utils::matrix::NodeMatrix;

/// Connectivity, interference and conflict relations derived from the measured links.
///
/// All matrices are `[node][node][channel]` over dense node indices.
/// `conflict` is symmetric and irreflexive. Read-only after construction.
#[derive(Debug, Clone)]
pub struct ConflictGraph {
    pub(super) index: HashMap<NodeId, usize>,
    pub(super) num_channels: usize,

    pub(super) etx: NodeMatrix<f64>,
    pub(super) connectivity: NodeMatrix<bool>,
    pub(super) interference: NodeMatrix<bool>,
    pub(super) conflict: NodeMatrix<bool>,
}

impl ConflictGraph {
    pub fn num_channels(&self) -> usize {
        self.num_channels
    }

    fn cell(&self, a: NodeId, b: NodeId) -> Option<(usize, usize)> {
        Some((*self.index.get(&a)?, *self.index.get(&b)?))
    }

    /// ETX of `from -> to`; infinite for dead, unmeasured or unknown links.
    pub fn etx(&self, from: NodeId, to: NodeId, channel: ChannelId) -> f64 {
        self.cell(from, to).and_then(|(i, j)| self.etx.get(i, j, channel.index())).unwrap_or(f64::INFINITY)
    }

    pub fn is_connected(&self, from: NodeId, to: NodeId, channel: ChannelId) -> bool {
        self.cell(from, to).is_some_and(|(i, j)| self.connectivity.is_set(i, j, channel.index()))
    }

    pub fn interferes(&self, from: NodeId, to: NodeId, channel: ChannelId) -> bool {
        self.cell(from, to).is_some_and(|(i, j)| self.interference.is_set(i, j, channel.index()))
    }

    pub fn in_conflict(&self, a: NodeId, b: NodeId, channel: ChannelId) -> bool {
        self.cell(a, b).is_some_and(|(i, j)| self.conflict.is_set(i, j, channel.index()))
    }

    /// Whether links `a.0 -> a.1` and `b.0 -> b.1` may not share a slot.
    ///
    /// Sharing an endpoint always conflicts (half-duplex radios). `shared_channel`
    /// is the channel both transmissions use, or `None` when they are on
    /// different channels, in which case only the half-duplex rule applies.
    pub fn links_conflict(&self, a: (NodeId, NodeId), b: (NodeId, NodeId), shared_channel: Option<ChannelId>) -> bool {
        let (a_sender, a_receiver) = a;
        let (b_sender, b_receiver) = b;

        if a_sender == b_sender || a_sender == b_receiver || a_receiver == b_sender || a_receiver == b_receiver {
            return true;
        }

        match shared_channel {
            Some(channel) => self.in_conflict(a_sender, b_receiver, channel) || self.in_conflict(b_sender, a_receiver, channel),
            None => false,
        }
    }

    /// Channels on which `from -> to` is connected, cheapest first (ties: lower channel index).
    pub fn ranked_channels(&self, from: NodeId, to: NodeId) -> Vec<ChannelId> {
        let mut channels: Vec<ChannelId> =
            (0..self.num_channels as u16).map(ChannelId::new).filter(|channel| self.is_connected(from, to, *channel)).collect();

        channels.sort_by(|a, b| self.etx(from, to, *a).total_cmp(&self.etx(from, to, *b)).then(a.cmp(b)));
        channels
    }

    /// Channel with the lowest finite ETX for `from -> to`, ignoring the connectivity threshold.
    pub fn best_channel(&self, from: NodeId, to: NodeId) -> Option<ChannelId> {
        (0..self.num_channels as u16)
            .map(ChannelId::new)
            .filter(|channel| self.etx(from, to, *channel).is_finite())
            .min_by(|a, b| self.etx(from, to, *a).total_cmp(&self.etx(from, to, *b)).then(a.cmp(b)))
    }
}
