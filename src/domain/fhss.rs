pub mod bandit;
pub mod blacklist;
pub mod fhss_config;
pub mod fhss_type;
pub mod hopping_sequence;
pub mod policy;
