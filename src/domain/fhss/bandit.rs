use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;

use crate::domain::fhss::fhss_config::FhssConfig;
use crate::domain::fhss::fhss_type::FhssType;
use crate::domain::fhss::policy::{ChannelHoppingPolicy, FhssFinalState, LinkChannelState};
use crate::domain::utils::id::{ChannelId, NodeId};

/// Optimistic reward every arm starts with, so each channel gets tried early on.
const INITIAL_ESTIMATE: f64 = 1.0;

/// Arm set explored when the epsilon coin says "explore".
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Exploration {
    /// Any arm except the current best.
    BestArm,

    /// Only the given number of top-ranked arms (the best one excluded).
    FirstBestArms(usize),

    /// Arms whose estimate reaches the threshold; all non-best arms if none does.
    GoodArm(f64),
}

/// Sample-average reward estimates of one link's channels.
#[derive(Debug, Clone)]
pub struct ArmEstimates {
    estimates: Vec<f64>,
    pulls: Vec<u64>,
}

impl ArmEstimates {
    pub fn new(num_channels: usize) -> Self {
        ArmEstimates { estimates: vec![INITIAL_ESTIMATE; num_channels], pulls: vec![0; num_channels] }
    }

    /// Folds a reward into the running average; the optimistic start counts as one observation.
    pub fn update(&mut self, channel: ChannelId, reward: f64) {
        let Some(estimate) = self.estimates.get_mut(channel.index()) else {
            return;
        };
        self.pulls[channel.index()] += 1;
        *estimate += (reward - *estimate) / (self.pulls[channel.index()] + 1) as f64;
    }

    pub fn estimate(&self, channel: ChannelId) -> f64 {
        self.estimates.get(channel.index()).copied().unwrap_or(0.0)
    }

    pub fn pulls(&self, channel: ChannelId) -> u64 {
        self.pulls.get(channel.index()).copied().unwrap_or(0)
    }

    /// Arms from highest to lowest estimate, ties broken by channel index.
    pub fn ranking(&self) -> Vec<ChannelId> {
        let mut ranking: Vec<ChannelId> = (0..self.estimates.len() as u16).map(ChannelId::new).collect();
        ranking.sort_by(|a, b| self.estimates[b.index()].total_cmp(&self.estimates[a.index()]).then(a.cmp(b)));
        ranking
    }
}

/// Epsilon-greedy channel selection with one bandit per link.
///
/// Each channel is an arm rewarded with 1 on delivery and 0 on loss. With
/// probability `epsilon(t)` a non-best arm from the exploration set is drawn
/// uniformly, otherwise the best arm is exploited. Epsilon grows by
/// `epsilon_increment` per elapsed slot up to `epsilon_max`.
pub struct BanditPolicy {
    fhss_type: FhssType,
    exploration: Exploration,
    config: FhssConfig,
    links: BTreeMap<(NodeId, NodeId), ArmEstimates>,
    rng: StdRng,
    epsilon: f64,
}

impl BanditPolicy {
    pub fn new(fhss_type: FhssType, exploration: Exploration, config: &FhssConfig) -> Self {
        BanditPolicy {
            fhss_type,
            exploration,
            config: config.clone(),
            links: BTreeMap::new(),
            rng: StdRng::seed_from_u64(config.seed),
            epsilon: config.epsilon_init.min(config.epsilon_max),
        }
    }

    /// Exploration rate used for the most recent selection.
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn arms(&self, sender: NodeId, receiver: NodeId) -> Option<&ArmEstimates> {
        self.links.get(&(sender, receiver))
    }
}

/// Non-best arms eligible for exploration, in ranking order.
fn exploration_set(exploration: Exploration, arms: &ArmEstimates, ranking: &[ChannelId]) -> Vec<ChannelId> {
    let non_best = ranking.get(1..).unwrap_or(&[]);

    match exploration {
        Exploration::BestArm => non_best.to_vec(),
        Exploration::FirstBestArms(count) => non_best.iter().take(count.saturating_sub(1)).copied().collect(),
        Exploration::GoodArm(threshold) => {
            let good: Vec<ChannelId> = non_best.iter().copied().filter(|c| arms.estimate(*c) >= threshold).collect();
            if good.is_empty() { non_best.to_vec() } else { good }
        }
    }
}

impl ChannelHoppingPolicy for BanditPolicy {
    fn fhss_type(&self) -> FhssType {
        self.fhss_type
    }

    fn select_channel(&mut self, asn: u64, link: (NodeId, NodeId), _offset: u8) -> ChannelId {
        self.epsilon = self.config.epsilon_at(asn);

        let num_channels = self.config.num_channels;
        let arms = self.links.entry(link).or_insert_with(|| ArmEstimates::new(num_channels));
        let ranking = arms.ranking();
        let Some(best) = ranking.first().copied() else {
            return ChannelId::new(0);
        };

        // The coin is always thrown so the generator advances once per selection
        let explore = self.rng.random::<f64>() < self.epsilon;
        if !explore {
            return best;
        }

        let candidates = exploration_set(self.exploration, arms, &ranking);
        if candidates.is_empty() {
            return best;
        }

        candidates[self.rng.random_range(0..candidates.len())]
    }

    fn report(&mut self, _asn: u64, link: (NodeId, NodeId), channel: ChannelId, delivered: bool) {
        let num_channels = self.config.num_channels;
        let arms = self.links.entry(link).or_insert_with(|| ArmEstimates::new(num_channels));
        arms.update(channel, if delivered { 1.0 } else { 0.0 });
    }

    fn final_state(&self) -> FhssFinalState {
        let links = self
            .links
            .iter()
            .map(|((sender, receiver), arms)| {
                let ranking = arms.ranking();
                LinkChannelState {
                    sender: *sender,
                    receiver: *receiver,
                    blacklist: ranking.iter().copied().filter(|c| arms.estimate(*c) < self.config.prr_threshold).collect(),
                    ranking,
                    estimates: arms.estimates.clone(),
                }
            })
            .collect();

        FhssFinalState { links, ..FhssFinalState::new(self.fhss_type) }
    }
}
