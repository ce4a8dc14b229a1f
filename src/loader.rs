pub mod parser;
pub mod trace_reader;
