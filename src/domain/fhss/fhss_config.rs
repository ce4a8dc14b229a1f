use crate::domain::network::network_model::DEFAULT_NUM_CHANNELS;
use crate::domain::utils::id::ChannelId;
use crate::error::{Error, Result};

/// Seed of the exploration generator when none is configured, so bandit runs stay reproducible.
pub const DEFAULT_FHSS_SEED: u64 = 0x5EED;

/// Immutable parameters handed to every channel-hopping policy.
#[derive(Debug, Clone, PartialEq)]
pub struct FhssConfig {
    /// Channel used by `FHSS_FIXED`.
    pub fixed_channel: ChannelId,
    pub num_channels: usize,

    /// Number of worst channels excluded by the centralized blacklist.
    pub blacklist_size: usize,

    /// Minimum PRR a channel needs to stay off a link's distributed blacklist.
    pub prr_threshold: f64,

    pub epsilon_init: f64,

    /// Growth of epsilon per elapsed timeslot.
    pub epsilon_increment: f64,
    pub epsilon_max: f64,

    /// Size of the arm set explored by the first-best-arms variant.
    pub first_best_arms: usize,

    /// Minimum reward estimate of an arm explored by the good-arm variant.
    pub good_arm_threshold: f64,
    pub seed: u64,
}

impl Default for FhssConfig {
    fn default() -> Self {
        FhssConfig {
            fixed_channel: ChannelId::new(0),
            num_channels: DEFAULT_NUM_CHANNELS,
            blacklist_size: 4,
            prr_threshold: 0.5,
            epsilon_init: 0.05,
            epsilon_increment: 0.0,
            epsilon_max: 0.1,
            first_best_arms: 3,
            good_arm_threshold: 0.8,
            seed: DEFAULT_FHSS_SEED,
        }
    }
}

impl FhssConfig {
    pub fn validate(&self) -> Result<()> {
        if self.num_channels == 0 {
            return Err(Error::InvalidConfiguration("FHSS needs at least one channel".to_string()));
        }

        if self.fixed_channel.index() >= self.num_channels {
            return Err(Error::InvalidConfiguration(format!("fixed channel {} is outside 0..{}", self.fixed_channel, self.num_channels)));
        }

        if self.blacklist_size >= self.num_channels {
            return Err(Error::InvalidConfiguration(format!(
                "a blacklist of {} channels leaves nothing to hop on with {} channels",
                self.blacklist_size, self.num_channels
            )));
        }

        for (name, value) in [
            ("prrThreshold", self.prr_threshold),
            ("epsilonInit", self.epsilon_init),
            ("epsilonMax", self.epsilon_max),
            ("goodArmThreshold", self.good_arm_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::InvalidConfiguration(format!("{} = {} is outside [0, 1]", name, value)));
            }
        }

        if self.epsilon_increment < 0.0 || !self.epsilon_increment.is_finite() {
            return Err(Error::InvalidConfiguration(format!("epsilonIncrement = {} must be a non-negative number", self.epsilon_increment)));
        }

        if self.epsilon_init > self.epsilon_max {
            return Err(Error::InvalidConfiguration(format!("epsilonInit {} exceeds epsilonMax {}", self.epsilon_init, self.epsilon_max)));
        }

        if self.first_best_arms == 0 || self.first_best_arms > self.num_channels {
            return Err(Error::InvalidConfiguration(format!("firstBestArms = {} must lie in 1..={}", self.first_best_arms, self.num_channels)));
        }

        Ok(())
    }

    /// Exploration rate after `elapsed` timeslots: `min(epsilon_max, epsilon_init + epsilon_increment * elapsed)`.
    pub fn epsilon_at(&self, elapsed: u64) -> f64 {
        (self.epsilon_init + self.epsilon_increment * elapsed as f64).min(self.epsilon_max)
    }
}
