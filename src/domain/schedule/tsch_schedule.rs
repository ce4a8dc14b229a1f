use serde::Serialize;

use crate::domain::conflict::conflict_graph::ConflictGraph;
use crate::domain::network::tree::DistributionTree;
use crate::domain::schedule::slot::Slot;
use crate::domain::schedule::transmission::Transmission;
use crate::domain::scheduler::scheduler_type::SchedulerType;
use crate::domain::utils::id::{ChannelId, NodeId};
use crate::error::{Error, Result};

/// Rules every slot of a schedule has to respect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacementRules {
    pub sink: NodeId,

    /// Channel on which conflicts between hopping cells are evaluated.
    pub reference_channel: ChannelId,

    /// Number of radios at the sink; above 1 the sink may receive on several offsets at once.
    pub sink_interfaces: usize,
}

/// Slotframe produced by a scheduler: slot index -> concurrently active transmissions.
///
/// Write-once by the scheduler, read-only afterwards. The slotframe repeats
/// with period [`Schedule::slotframe_length`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    algorithm: SchedulerType,

    /// Hard upper bound on the slotframe length; `None` lets the schedule grow.
    slotframe_bound: Option<usize>,
    rules: PlacementRules,
    slots: Vec<Slot>,
}

impl Schedule {
    pub fn new(algorithm: SchedulerType, rules: PlacementRules, slotframe_bound: Option<usize>) -> Self {
        Schedule { algorithm, slotframe_bound, rules, slots: Vec::new() }
    }

    pub fn algorithm(&self) -> SchedulerType {
        self.algorithm
    }

    pub fn rules(&self) -> &PlacementRules {
        &self.rules
    }

    pub fn slotframe_bound(&self) -> Option<usize> {
        self.slotframe_bound
    }

    pub fn slotframe_length(&self) -> usize {
        self.slots.len()
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn slot(&self, index: usize) -> Option<&Slot> {
        self.slots.get(index)
    }

    fn within_bound(&self, index: usize) -> bool {
        self.slotframe_bound.is_none_or(|bound| index < bound)
    }

    /// Whether `transmission` could be placed into slot `index` (which may not exist yet).
    pub fn fits(&self, index: usize, transmission: &Transmission, graph: &ConflictGraph) -> bool {
        if !self.within_bound(index) {
            return false;
        }

        match self.slots.get(index) {
            Some(slot) => slot.can_host(transmission, graph, &self.rules),
            None => true,
        }
    }

    /// Earliest slot at or after `start` that can host `transmission`, opening a new slot if allowed.
    pub fn first_fit(&self, transmission: &Transmission, graph: &ConflictGraph, start: usize) -> Option<usize> {
        let existing = (start..self.slots.len()).find(|index| self.slots[*index].can_host(transmission, graph, &self.rules));

        existing.or_else(|| {
            let fresh = start.max(self.slots.len());
            if self.within_bound(fresh) { Some(fresh) } else { None }
        })
    }

    /// Places `transmission` into slot `index`, appending idle slots as needed.
    ///
    /// # Returns
    /// `false` if the index lies beyond the slotframe bound or the transmission is a duplicate.
    pub fn place(&mut self, index: usize, transmission: Transmission) -> bool {
        if !self.within_bound(index) {
            log::error!("Slot {} lies beyond the slotframe bound {:?}, {} was not placed.", index, self.slotframe_bound, transmission);
            return false;
        }

        if self.slots.len() <= index {
            self.slots.resize_with(index + 1, Slot::new);
        }

        self.slots[index].insert_transmission(transmission)
    }

    /// Appends a fully built slot at the end of the slotframe.
    pub fn push_slot(&mut self, slot: Slot) -> bool {
        if !self.within_bound(self.slots.len()) {
            return false;
        }
        self.slots.push(slot);
        true
    }

    /// Every transmission with its slot index, in slot order.
    pub fn transmissions(&self) -> impl Iterator<Item = (usize, &Transmission)> + '_ {
        self.slots.iter().enumerate().flat_map(|(index, slot)| slot.transmissions.iter().map(move |t| (index, t)))
    }

    pub fn num_transmissions(&self) -> usize {
        self.slots.iter().map(Slot::len).sum()
    }

    pub fn max_transmissions_per_slot(&self) -> usize {
        self.slots.iter().map(Slot::len).max().unwrap_or(0)
    }

    /// Number of cells granted to the link `sender -> receiver` per slotframe.
    pub fn cells_of(&self, sender: NodeId, receiver: NodeId) -> usize {
        self.transmissions().filter(|(_, t)| t.sender == sender && t.receiver == receiver).count()
    }

    /// Checks that no slot holds two conflicting transmissions and that every tree edge is scheduled.
    pub fn verify(&self, graph: &ConflictGraph, tree: &DistributionTree) -> Result<()> {
        for (index, slot) in self.slots.iter().enumerate() {
            for (i, a) in slot.transmissions.iter().enumerate() {
                for b in slot.transmissions.iter().skip(i + 1) {
                    if Slot::pair_conflicts(a, b, graph, &self.rules) {
                        return Err(Error::InconsistentInput(format!("slot {} holds conflicting transmissions {} and {}", index, a, b)));
                    }
                }
            }
        }

        if let Some(edge) = tree.edges().into_iter().find(|edge| self.cells_of(edge.sender, edge.receiver) == 0) {
            return Err(Error::InconsistentInput(format!("tree edge {} -> {} is missing from the schedule", edge.sender, edge.receiver)));
        }

        Ok(())
    }
}
