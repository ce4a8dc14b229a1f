use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::error::{ConversionError, Error, Result};

/// Where the reception probability of a transmission comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SimulationMode {
    /// Every transmission succeeds with the configured `pkt_prob`.
    ScheduleExecution,

    /// Every transmission succeeds with the PRR of its link and channel in the current trace file.
    TraceReplay,
}

impl fmt::Display for SimulationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimulationMode::ScheduleExecution => f.write_str("ScheduleExecution"),
            SimulationMode::TraceReplay => f.write_str("TraceReplay"),
        }
    }
}

impl FromStr for SimulationMode {
    type Err = ConversionError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "ScheduleExecution" => Ok(SimulationMode::ScheduleExecution),
            "TraceReplay" => Ok(SimulationMode::TraceReplay),
            _ => Err(ConversionError::UnknownSimulationMode(s.to_string())),
        }
    }
}

/// Horizon and reception model of one simulation run.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    pub mode: SimulationMode,

    /// Success probability in percent for `ScheduleExecution`.
    pub pkt_prob: u8,
    pub timeslots_per_file: u64,

    /// A log record is flushed every `timeslots_log` slots.
    pub timeslots_log: u64,
    pub max_files: usize,

    /// Seed of the reception draws; `None` draws from OS entropy.
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig { mode: SimulationMode::ScheduleExecution, pkt_prob: 100, timeslots_per_file: 1000, timeslots_log: 100, max_files: 1, seed: None }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<()> {
        if self.pkt_prob > 100 {
            return Err(Error::InvalidConfiguration(format!("pktProb {} is not a percentage", self.pkt_prob)));
        }

        if self.timeslots_per_file == 0 {
            return Err(Error::InvalidConfiguration("timeslotsPerFile must be positive".to_string()));
        }

        if self.timeslots_log == 0 {
            return Err(Error::InvalidConfiguration("timeslotsLog must be positive".to_string()));
        }

        if self.max_files == 0 {
            return Err(Error::InvalidConfiguration("maxFiles must be positive".to_string()));
        }

        if self.horizon().is_none() {
            return Err(Error::InvalidConfiguration("the simulated horizon overflows".to_string()));
        }

        Ok(())
    }

    /// Total number of simulated timeslots.
    pub fn horizon(&self) -> Option<u64> {
        self.timeslots_per_file.checked_mul(self.max_files as u64)
    }
}
