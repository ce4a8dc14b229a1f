pub mod draws;
pub mod log_record;
pub mod log_sink;
pub mod schedule_simulator;
pub mod simulation_config;
pub mod trace;

#[cfg(test)]
mod simulator_tests;
