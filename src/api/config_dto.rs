use serde::{Deserialize, Serialize};

/// Root of the JSON run configuration.
#[derive(Debug, Deserialize, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunConfigDto {
    pub algorithm: String,
    pub sink_id: u16,

    /// Fixed channel, `null` for "any channel".
    #[serde(default)]
    pub channel: Option<u16>,

    #[serde(default = "default_etx_threshold")]
    pub etx_threshold: f64,

    #[serde(default)]
    pub slotframe_length: Option<usize>,

    #[serde(default)]
    pub optimal_search_limit: Option<u64>,

    #[serde(default)]
    pub channel_offsets: Option<u8>,

    #[serde(default)]
    pub sink_interfaces: Option<usize>,

    #[serde(default)]
    pub num_channels: Option<usize>,

    pub network_file: String,
    pub tree_file: String,

    #[serde(default)]
    pub trace_prefix: Option<String>,

    #[serde(default)]
    pub simulation: Option<SimulationDto>,

    #[serde(default)]
    pub fhss: Option<FhssDto>,
}

fn default_etx_threshold() -> f64 {
    0.5
}

#[derive(Debug, Deserialize, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationDto {
    #[serde(default = "default_execute")]
    pub execute: bool,

    #[serde(default = "default_mode")]
    pub mode: String,

    /// Success probability in percent; required in ScheduleExecution mode.
    #[serde(default)]
    pub pkt_prob: Option<u8>,

    pub timeslots_per_file: u64,
    pub timeslots_log: u64,
    pub max_files: usize,

    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_execute() -> bool {
    true
}

fn default_mode() -> String {
    "ScheduleExecution".to_string()
}

#[derive(Debug, Deserialize, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FhssDto {
    #[serde(rename = "type")]
    pub typ: String,

    #[serde(default)]
    pub blacklist_size: Option<usize>,

    #[serde(default)]
    pub epsilon_init: Option<f64>,

    #[serde(default)]
    pub epsilon_increment: Option<f64>,

    #[serde(default)]
    pub epsilon_max: Option<f64>,

    #[serde(default)]
    pub first_best_arms: Option<usize>,

    #[serde(default)]
    pub good_arm_threshold: Option<f64>,

    #[serde(default)]
    pub seed: Option<u64>,
}
