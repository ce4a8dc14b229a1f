use serde::Serialize;

use crate::domain::conflict::conflict_graph::ConflictGraph;
use crate::domain::schedule::transmission::Transmission;
use crate::domain::schedule::tsch_schedule::PlacementRules;

/// Set of transmissions that are active in the same timeslot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Slot {
    pub transmissions: Vec<Transmission>,
}

impl Slot {
    pub fn new() -> Self {
        Slot { transmissions: Vec::new() }
    }

    pub fn is_idle(&self) -> bool {
        self.transmissions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.transmissions.len()
    }

    /// Whether two transmissions may not share this slot under `rules`.
    pub fn pair_conflicts(a: &Transmission, b: &Transmission, graph: &ConflictGraph, rules: &PlacementRules) -> bool {
        let shared_channel = a.shared_channel(b, rules.reference_channel);

        // A multi-radio sink receives several packets at once on distinct channels
        if rules.sink_interfaces > 1 && a.receiver == rules.sink && b.receiver == rules.sink && a.sender != b.sender && shared_channel.is_none() {
            return false;
        }

        graph.links_conflict(a.link(), b.link(), shared_channel)
    }

    /// Checks whether `candidate` can be added without conflicting with any transmission in the slot.
    pub fn can_host(&self, candidate: &Transmission, graph: &ConflictGraph, rules: &PlacementRules) -> bool {
        if candidate.receiver == rules.sink {
            let sink_receptions = self.transmissions.iter().filter(|t| t.receiver == rules.sink).count();
            if sink_receptions >= rules.sink_interfaces.max(1) {
                return false;
            }
        }

        !self.transmissions.iter().any(|placed| Slot::pair_conflicts(candidate, placed, graph, rules))
    }

    /// Inserts a transmission into the slot.
    ///
    /// # Returns
    /// `true` if it was inserted; `false` if the identical transmission is already present.
    pub fn insert_transmission(&mut self, transmission: Transmission) -> bool {
        if self.transmissions.contains(&transmission) {
            log::warn!("Attempted to insert duplicate transmission {} into a slot.", transmission);
            return false;
        }

        self.transmissions.push(transmission);
        true
    }
}
