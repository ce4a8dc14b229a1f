use std::collections::BTreeMap;

use crate::domain::fhss::fhss_config::FhssConfig;
use crate::domain::fhss::fhss_type::FhssType;
use crate::domain::fhss::hopping_sequence::round_robin;
use crate::domain::fhss::policy::{ChannelHoppingPolicy, FhssFinalState, LinkChannelState};
use crate::domain::network::network_model::NetworkModel;
use crate::domain::network::tree::DistributionTree;
use crate::domain::simulator::trace::LinkTrace;
use crate::domain::utils::id::{ChannelId, NodeId};

fn all_channels(num_channels: usize) -> Vec<ChannelId> {
    (0..num_channels as u16).map(ChannelId::new).collect()
}

/// Channels ordered from highest to lowest PRR, ties broken by channel index.
fn rank_by_prr(prr: &[f64]) -> Vec<ChannelId> {
    let mut ranking: Vec<ChannelId> = all_channels(prr.len());
    ranking.sort_by(|a, b| prr[b.index()].total_cmp(&prr[a.index()]).then(a.cmp(b)));
    ranking
}

/// One static blacklist shared by the whole network.
///
/// The `blacklist_size` channels with the lowest PRR averaged over all tree
/// links are excluded once at start-up; the remaining channels are hopped in
/// round-robin order.
pub struct CentralizedBlacklist {
    blacklist: Vec<ChannelId>,
    allowed: Vec<ChannelId>,
}

impl CentralizedBlacklist {
    pub fn new(config: &FhssConfig, network: &NetworkModel, tree: &DistributionTree) -> Self {
        let edges = tree.edges();
        let mut average = vec![0.0; config.num_channels];

        for (index, value) in average.iter_mut().enumerate() {
            let channel = ChannelId::new(index as u16);
            if !edges.is_empty() {
                *value = edges.iter().map(|edge| network.prr(edge.sender, edge.receiver, channel)).sum::<f64>() / edges.len() as f64;
            }
        }

        let mut worst_first = rank_by_prr(&average);
        worst_first.reverse();

        let mut blacklist: Vec<ChannelId> = worst_first.into_iter().take(config.blacklist_size).collect();
        blacklist.sort();

        let allowed: Vec<ChannelId> = all_channels(config.num_channels).into_iter().filter(|c| !blacklist.contains(c)).collect();

        log::info!("Centralized blacklist: {:?}, hopping over {} channels.", blacklist.iter().map(|c| c.id).collect::<Vec<_>>(), allowed.len());

        CentralizedBlacklist { blacklist, allowed }
    }

    pub fn blacklist(&self) -> &[ChannelId] {
        &self.blacklist
    }
}

impl ChannelHoppingPolicy for CentralizedBlacklist {
    fn fhss_type(&self) -> FhssType {
        FhssType::CentralizedBlacklist
    }

    fn select_channel(&mut self, asn: u64, _link: (NodeId, NodeId), offset: u8) -> ChannelId {
        round_robin(&self.allowed, asn, offset).unwrap_or(ChannelId::new(0))
    }

    fn final_state(&self) -> FhssFinalState {
        FhssFinalState { global_blacklist: self.blacklist.clone(), ..FhssFinalState::new(FhssType::CentralizedBlacklist) }
    }
}

/// Whitelist of one link: every channel with `prr >= threshold`, or the single best channel.
#[derive(Debug, Clone)]
struct LinkWhitelist {
    prr: Vec<f64>,
    allowed: Vec<ChannelId>,
}

impl LinkWhitelist {
    fn new(prr: Vec<f64>, threshold: f64) -> Self {
        let mut allowed: Vec<ChannelId> = all_channels(prr.len()).into_iter().filter(|c| prr[c.index()] >= threshold).collect();

        if allowed.is_empty() {
            allowed.extend(rank_by_prr(&prr).first().copied());
        }

        LinkWhitelist { prr, allowed }
    }
}

/// Per-link blacklists computed from the measured PRR with perfect knowledge.
///
/// Every link independently avoids the channels below the PRR threshold. In a
/// trace replay the lists are refreshed from each new trace file.
pub struct DistributedOptimalBlacklist {
    threshold: f64,
    num_channels: usize,
    links: BTreeMap<(NodeId, NodeId), LinkWhitelist>,
    fallback: Vec<ChannelId>,
}

impl DistributedOptimalBlacklist {
    pub fn new(config: &FhssConfig, network: &NetworkModel, tree: &DistributionTree) -> Self {
        let mut policy = DistributedOptimalBlacklist {
            threshold: config.prr_threshold,
            num_channels: config.num_channels,
            links: BTreeMap::new(),
            fallback: all_channels(config.num_channels),
        };

        for edge in tree.edges() {
            policy.links.insert((edge.sender, edge.receiver), LinkWhitelist::new(Vec::new(), config.prr_threshold));
        }

        policy.refresh(|from, to, channel| network.prr(from, to, channel));
        policy
    }

    fn refresh(&mut self, prr: impl Fn(NodeId, NodeId, ChannelId) -> f64) {
        let channels = all_channels(self.num_channels);

        for ((sender, receiver), whitelist) in self.links.iter_mut() {
            let values: Vec<f64> = channels.iter().map(|channel| prr(*sender, *receiver, *channel)).collect();
            *whitelist = LinkWhitelist::new(values, self.threshold);
        }
    }

    pub fn allowed(&self, sender: NodeId, receiver: NodeId) -> Option<&[ChannelId]> {
        self.links.get(&(sender, receiver)).map(|whitelist| whitelist.allowed.as_slice())
    }
}

impl ChannelHoppingPolicy for DistributedOptimalBlacklist {
    fn fhss_type(&self) -> FhssType {
        FhssType::DistributedBlacklistOptimal
    }

    fn select_channel(&mut self, asn: u64, link: (NodeId, NodeId), offset: u8) -> ChannelId {
        let allowed = self.links.get(&link).map(|whitelist| whitelist.allowed.as_slice()).unwrap_or(self.fallback.as_slice());
        round_robin(allowed, asn, offset).unwrap_or(ChannelId::new(0))
    }

    fn on_trace_file(&mut self, trace: &LinkTrace) {
        log::debug!("Refreshing distributed blacklists from trace file {}.", trace.file_number());
        self.refresh(|from, to, channel| trace.prr(from, to, channel));
    }

    fn final_state(&self) -> FhssFinalState {
        let links = self
            .links
            .iter()
            .map(|((sender, receiver), whitelist)| LinkChannelState {
                sender: *sender,
                receiver: *receiver,
                blacklist: all_channels(self.num_channels).into_iter().filter(|c| !whitelist.allowed.contains(c)).collect(),
                ranking: rank_by_prr(&whitelist.prr),
                estimates: Vec::new(),
            })
            .collect();

        FhssFinalState { links, ..FhssFinalState::new(FhssType::DistributedBlacklistOptimal) }
    }
}
