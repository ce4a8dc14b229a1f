use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::domain::fhss::bandit::{BanditPolicy, Exploration};
use crate::domain::fhss::blacklist::{CentralizedBlacklist, DistributedOptimalBlacklist};
use crate::domain::fhss::fhss_config::FhssConfig;
use crate::domain::fhss::hopping_sequence::{FixedChannel, OpenWsnHopping};
use crate::domain::fhss::policy::ChannelHoppingPolicy;
use crate::domain::network::network_model::NetworkModel;
use crate::domain::network::tree::DistributionTree;
use crate::error::ConversionError;

/// Channel-hopping variants that resolve channel offsets at simulation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum FhssType {
    #[serde(rename = "FHSS_FIXED")]
    Fixed,

    #[serde(rename = "FHSS_OPENWSN")]
    OpenWsn,

    #[serde(rename = "FHSS_CENTRALIZED_BLACKLIST")]
    CentralizedBlacklist,

    #[serde(rename = "FHSS_DISTRIBUTED_BLACKLIST_OPTIMAL")]
    DistributedBlacklistOptimal,

    #[serde(rename = "FHSS_DISTRIBUTED_BLACKLIST_MAB_BEST_ARM")]
    MabBestArm,

    #[serde(rename = "FHSS_DISTRIBUTED_BLACKLIST_MAB_FIRST_BEST_ARM")]
    MabFirstBestArms,

    #[serde(rename = "FHSS_DISTRIBUTED_BLACKLIST_MAB_FIRST_GOOD_ARM")]
    MabGoodArm,
}

impl FhssType {
    /// Every variant, in selector order.
    pub const ALL: [FhssType; 7] = [
        FhssType::Fixed,
        FhssType::OpenWsn,
        FhssType::CentralizedBlacklist,
        FhssType::DistributedBlacklistOptimal,
        FhssType::MabBestArm,
        FhssType::MabFirstBestArms,
        FhssType::MabGoodArm,
    ];

    /// Factory method returning a fresh policy instance with its own state.
    pub fn get_instance(&self, config: &FhssConfig, network: &NetworkModel, tree: &DistributionTree) -> Box<dyn ChannelHoppingPolicy> {
        match self {
            FhssType::Fixed => Box::new(FixedChannel::new(config.fixed_channel)),
            FhssType::OpenWsn => Box::new(OpenWsnHopping::new(config.num_channels)),
            FhssType::CentralizedBlacklist => Box::new(CentralizedBlacklist::new(config, network, tree)),
            FhssType::DistributedBlacklistOptimal => Box::new(DistributedOptimalBlacklist::new(config, network, tree)),
            FhssType::MabBestArm => Box::new(BanditPolicy::new(*self, Exploration::BestArm, config)),
            FhssType::MabFirstBestArms => Box::new(BanditPolicy::new(*self, Exploration::FirstBestArms(config.first_best_arms), config)),
            FhssType::MabGoodArm => Box::new(BanditPolicy::new(*self, Exploration::GoodArm(config.good_arm_threshold), config)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FhssType::Fixed => "FHSS_FIXED",
            FhssType::OpenWsn => "FHSS_OPENWSN",
            FhssType::CentralizedBlacklist => "FHSS_CENTRALIZED_BLACKLIST",
            FhssType::DistributedBlacklistOptimal => "FHSS_DISTRIBUTED_BLACKLIST_OPTIMAL",
            FhssType::MabBestArm => "FHSS_DISTRIBUTED_BLACKLIST_MAB_BEST_ARM",
            FhssType::MabFirstBestArms => "FHSS_DISTRIBUTED_BLACKLIST_MAB_FIRST_BEST_ARM",
            FhssType::MabGoodArm => "FHSS_DISTRIBUTED_BLACKLIST_MAB_FIRST_GOOD_ARM",
        }
    }

    /// Parses a configured selection, where `ALL` (or selector 7) expands to every variant.
    pub fn parse_selection(s: &str) -> Result<Vec<FhssType>, ConversionError> {
        match s {
            "ALL" | "FHSS_ALL" | "7" => Ok(FhssType::ALL.to_vec()),
            other => Ok(vec![other.parse()?]),
        }
    }
}

impl fmt::Display for FhssType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FhssType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(selector) = s.parse::<usize>() {
            return FhssType::ALL.get(selector).copied().ok_or_else(|| ConversionError::UnknownFhssType(s.to_string()));
        }

        FhssType::ALL.iter().find(|t| t.as_str() == s).copied().ok_or_else(|| ConversionError::UnknownFhssType(s.to_string()))
    }
}
