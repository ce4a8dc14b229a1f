pub mod config_dto;
pub mod tree_dto;
