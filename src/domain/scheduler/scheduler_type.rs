use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::domain::scheduler::mcc::{MccOptions, MccScheduler};
use crate::domain::scheduler::modesa::ModesaScheduler;
use crate::domain::scheduler::scheduler_trait::TschScheduler;
use crate::domain::scheduler::tasa::TasaScheduler;
use crate::error::ConversionError;

/// The closed set of scheduling algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SchedulerType {
    /// Interference/conflict-aware allocation on one fixed channel, exact search.
    #[serde(rename = "MCC_ICRA")]
    McIcra,

    /// Interference/conflict-aware allocation on one fixed channel, greedy first fit.
    #[serde(rename = "MCC_ICRA_NONOPTIMAL")]
    McIcraNonOptimal,

    /// Channel-quality-aware allocation over all channels.
    #[serde(rename = "MCC_CQAA")]
    McCqaa,

    /// Channel-quality-aware allocation with ETX-proportional repetitions.
    #[serde(rename = "MCC_CQARA")]
    McCqara,

    /// Traffic-aware matching-based convergecast scheduling.
    #[serde(rename = "TASA")]
    Tasa,

    /// Multichannel-offset convergecast scheduling.
    #[serde(rename = "MODESA")]
    Modesa,
}

impl SchedulerType {
    pub const ALL: [SchedulerType; 6] = [
        SchedulerType::McIcra,
        SchedulerType::McCqaa,
        SchedulerType::McCqara,
        SchedulerType::Tasa,
        SchedulerType::Modesa,
        SchedulerType::McIcraNonOptimal,
    ];

    /// Factory method returning the concrete scheduler for this variant.
    pub fn get_instance(&self) -> Box<dyn TschScheduler> {
        match self {
            SchedulerType::McIcra => Box::new(MccScheduler::new(
                *self,
                MccOptions { optimal: true, channel_quality_aware: false, rate_adaptive: false },
            )),
            SchedulerType::McIcraNonOptimal => Box::new(MccScheduler::new(
                *self,
                MccOptions { optimal: false, channel_quality_aware: false, rate_adaptive: false },
            )),
            SchedulerType::McCqaa => Box::new(MccScheduler::new(
                *self,
                MccOptions { optimal: false, channel_quality_aware: true, rate_adaptive: false },
            )),
            SchedulerType::McCqara => Box::new(MccScheduler::new(
                *self,
                MccOptions { optimal: false, channel_quality_aware: true, rate_adaptive: true },
            )),
            SchedulerType::Tasa => Box::new(TasaScheduler),
            SchedulerType::Modesa => Box::new(ModesaScheduler),
        }
    }

    /// Whether the variant works on one configured channel.
    pub fn needs_fixed_channel(&self) -> bool {
        matches!(self, SchedulerType::McIcra | SchedulerType::McIcraNonOptimal)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SchedulerType::McIcra => "MCC_ICRA",
            SchedulerType::McIcraNonOptimal => "MCC_ICRA_NONOPTIMAL",
            SchedulerType::McCqaa => "MCC_CQAA",
            SchedulerType::McCqara => "MCC_CQARA",
            SchedulerType::Tasa => "TASA",
            SchedulerType::Modesa => "MODESA",
        }
    }
}

impl fmt::Display for SchedulerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SchedulerType {
    type Err = ConversionError;

    /// Accepts the algorithm name or its historical numeric selector.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MCC_ICRA" | "0" => Ok(SchedulerType::McIcra),
            "MCC_CQAA" | "1" => Ok(SchedulerType::McCqaa),
            "MCC_CQARA" | "2" => Ok(SchedulerType::McCqara),
            "TASA" | "3" => Ok(SchedulerType::Tasa),
            "MODESA" | "4" => Ok(SchedulerType::Modesa),
            "MCC_ICRA_NONOPTIMAL" | "5" => Ok(SchedulerType::McIcraNonOptimal),
            _ => Err(ConversionError::UnknownSchedulerType(s.to_string())),
        }
    }
}
