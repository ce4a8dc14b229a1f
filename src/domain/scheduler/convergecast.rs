use std::collections::BTreeMap;

use crate::domain::network::tree::{DistributionTree, TreeEdge};
use crate::domain::schedule::slot::Slot;
use crate::domain::schedule::tsch_schedule::Schedule;
use crate::domain::scheduler::scheduler_type::SchedulerType;
use crate::domain::scheduler::scheduling_context::SchedulingContext;
use crate::domain::utils::id::NodeId;
use crate::error::{Error, Result};

/// Tree edge that can forward a packet in the next slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    pub edge: TreeEdge,

    /// Packets currently buffered at the sender.
    pub queue: usize,

    /// Packets that still have to cross this edge in the current round.
    pub remaining: usize,
}

/// Packet bookkeeping of one convergecast round.
///
/// Every non-sink node generates one packet, so the edge `u -> parent(u)`
/// carries `subtree_size(u)` packets. A node only forwards packets it holds.
#[derive(Debug, Clone)]
pub struct ConvergecastState {
    sink: NodeId,
    edges: Vec<TreeEdge>,
    queue: BTreeMap<NodeId, usize>,
    remaining: BTreeMap<NodeId, usize>,
}

impl ConvergecastState {
    pub fn new(tree: &DistributionTree) -> Self {
        let edges = tree.edges();
        let queue = edges.iter().map(|edge| (edge.sender, 1)).collect();
        let remaining = edges.iter().map(|edge| (edge.sender, tree.subtree_size(edge.sender))).collect();

        ConvergecastState { sink: tree.sink(), edges, queue, remaining }
    }

    /// Cells needed to finish the round.
    pub fn total_demand(&self) -> usize {
        self.remaining.values().sum()
    }

    pub fn is_done(&self) -> bool {
        self.remaining.values().all(|r| *r == 0)
    }

    /// Edges whose sender holds a packet, in tree priority order.
    pub fn candidates(&self) -> Vec<Candidate> {
        self.edges
            .iter()
            .filter_map(|edge| {
                let queue = self.queue.get(&edge.sender).copied().unwrap_or(0);
                let remaining = self.remaining.get(&edge.sender).copied().unwrap_or(0);
                (queue > 0 && remaining > 0).then_some(Candidate { edge: *edge, queue, remaining })
            })
            .collect()
    }

    /// Moves one packet across `edge`; the sink absorbs what it receives.
    pub fn forward(&mut self, edge: &TreeEdge) {
        if let Some(queue) = self.queue.get_mut(&edge.sender) {
            *queue = queue.saturating_sub(1);
        }
        if let Some(remaining) = self.remaining.get_mut(&edge.sender) {
            *remaining = remaining.saturating_sub(1);
        }
        if edge.receiver != self.sink {
            *self.queue.entry(edge.receiver).or_insert(0) += 1;
        }
    }
}

/// Runs one convergecast round, asking `fill_slot` for the content of every slot.
///
/// The slotframe grows until every packet has reached the sink; the configured
/// bound is ignored. Returns the schedule and the number of cells it holds.
pub fn schedule_round<F>(ctx: &SchedulingContext, algorithm: SchedulerType, mut fill_slot: F) -> Result<(Schedule, usize)>
where
    F: FnMut(&mut [Candidate], &Schedule) -> Slot,
{
    ctx.validate(algorithm)?;

    if let Some(bound) = ctx.slotframe_bound {
        log::warn!("{} grows the slotframe on demand, the configured bound of {} slots is ignored.", algorithm, bound);
    }

    let mut schedule = Schedule::new(algorithm, ctx.placement_rules(algorithm), None);
    let mut state = ConvergecastState::new(ctx.tree);
    let demand = state.total_demand();

    while !state.is_done() {
        let mut candidates = state.candidates();
        let slot = fill_slot(&mut candidates, &schedule);

        if slot.is_idle() {
            return Err(Error::InconsistentInput(format!("convergecast stalled after {} slots", schedule.slotframe_length())));
        }

        for transmission in slot.transmissions.iter() {
            if let Some(candidate) = candidates.iter().find(|c| c.edge.sender == transmission.sender) {
                state.forward(&candidate.edge);
            }
        }
        schedule.push_slot(slot);
    }

    Ok((schedule, demand))
}
