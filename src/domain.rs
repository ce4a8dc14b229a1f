pub mod conflict;
pub mod fhss;
pub mod network;
pub mod run_config;
pub mod schedule;
pub mod scheduler;
pub mod simulator;
pub mod utils;
