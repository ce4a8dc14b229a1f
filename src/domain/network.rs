pub mod link;
pub mod network_model;
pub mod node;
pub mod tree;
