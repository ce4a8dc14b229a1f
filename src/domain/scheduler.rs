pub mod convergecast;
pub mod mcc;
pub mod modesa;
pub mod scheduler_trait;
pub mod scheduler_type;
pub mod scheduling_context;
pub mod tasa;

#[cfg(test)]
mod scheduler_tests;
