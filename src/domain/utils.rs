pub mod id;
pub mod matrix;
pub mod statistics;
