use crate::domain::schedule::tsch_schedule::Schedule;
use crate::domain::scheduler::scheduling_context::SchedulingContext;
use crate::error::Result;

/// A slot/channel assignment strategy.
///
/// Implementations are deterministic: the same context always yields the same schedule.
pub trait TschScheduler: Send + Sync {
    /// Assigns every required tree transmission a slot and a channel (or channel offset).
    ///
    /// Bounded variants fail with `UnschedulableEdge` when an edge does not fit
    /// into the configured slotframe bound; open-ended variants never do.
    fn schedule(&self, ctx: &SchedulingContext) -> Result<Schedule>;
}
