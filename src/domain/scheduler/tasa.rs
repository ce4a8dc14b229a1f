use crate::domain::schedule::slot::Slot;
use crate::domain::schedule::transmission::Transmission;
use crate::domain::schedule::tsch_schedule::Schedule;
use crate::domain::scheduler::convergecast::{Candidate, schedule_round};
use crate::domain::scheduler::scheduler_trait::TschScheduler;
use crate::domain::scheduler::scheduler_type::SchedulerType;
use crate::domain::scheduler::scheduling_context::SchedulingContext;
use crate::error::Result;

/**
 * Traffic-aware scheduling (TASA).
 *
 * Builds a convergecast round slot by slot: in every slot the edges whose
 * senders hold the most packets are matched greedily (heaviest queue first,
 * then the shared depth / id tie-break) as long as they do not conflict
 * with the edges already in the slot. Every cell uses channel offset 0.
 * The slotframe grows until every packet has reached the sink.
 */
pub struct TasaScheduler;

impl TasaScheduler {
    /// Greedy maximal matching of the heaviest candidates into one slot.
    fn match_slot(candidates: &mut [Candidate], ctx: &SchedulingContext, schedule: &Schedule) -> Slot {
        candidates.sort_by(|a, b| b.queue.cmp(&a.queue).then(a.edge.priority_key().cmp(&b.edge.priority_key())));

        let mut slot = Slot::new();
        for candidate in candidates.iter() {
            let transmission = Transmission::hopping(candidate.edge.sender, candidate.edge.receiver, 0);
            if slot.can_host(&transmission, ctx.graph, schedule.rules()) {
                slot.insert_transmission(transmission);
            }
        }
        slot
    }
}

impl TschScheduler for TasaScheduler {
    fn schedule(&self, ctx: &SchedulingContext) -> Result<Schedule> {
        let (schedule, demand) = schedule_round(ctx, SchedulerType::Tasa, |candidates, schedule| Self::match_slot(candidates, ctx, schedule))?;

        log::info!("TASA scheduled {} packets in a slotframe of {} slots.", demand, schedule.slotframe_length());

        Ok(schedule)
    }
}
