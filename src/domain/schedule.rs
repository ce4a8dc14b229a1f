pub mod slot;
pub mod transmission;
pub mod tsch_schedule;
