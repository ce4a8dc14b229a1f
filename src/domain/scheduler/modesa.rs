use crate::domain::schedule::slot::Slot;
use crate::domain::schedule::transmission::Transmission;
use crate::domain::schedule::tsch_schedule::Schedule;
use crate::domain::scheduler::convergecast::{Candidate, schedule_round};
use crate::domain::scheduler::scheduler_trait::TschScheduler;
use crate::domain::scheduler::scheduler_type::SchedulerType;
use crate::domain::scheduler::scheduling_context::SchedulingContext;
use crate::error::Result;

/// Multichannel optimized delay time slot assignment (MODESA).
///
/// Like TASA, but candidates are ranked by the traffic still to cross their
/// edge and each one takes the lowest channel offset on which it does not
/// conflict. With several sink interfaces the sink receives on distinct
/// offsets in the same slot.
pub struct ModesaScheduler;

impl ModesaScheduler {
    fn fill_slot(candidates: &mut [Candidate], ctx: &SchedulingContext, schedule: &Schedule) -> Slot {
        candidates.sort_by(|a, b| b.remaining.cmp(&a.remaining).then(a.edge.priority_key().cmp(&b.edge.priority_key())));

        let mut slot = Slot::new();
        for candidate in candidates.iter() {
            let placed = (0..ctx.channel_offsets)
                .map(|offset| Transmission::hopping(candidate.edge.sender, candidate.edge.receiver, offset))
                .find(|transmission| slot.can_host(transmission, ctx.graph, schedule.rules()));

            if let Some(transmission) = placed {
                slot.insert_transmission(transmission);
            }
        }
        slot
    }
}

impl TschScheduler for ModesaScheduler {
    fn schedule(&self, ctx: &SchedulingContext) -> Result<Schedule> {
        let (schedule, demand) = schedule_round(ctx, SchedulerType::Modesa, |candidates, schedule| Self::fill_slot(candidates, ctx, schedule))?;

        log::info!(
            "MODESA scheduled {} packets on {} channel offsets in a slotframe of {} slots.",
            demand,
            ctx.channel_offsets,
            schedule.slotframe_length()
        );

        Ok(schedule)
    }
}
