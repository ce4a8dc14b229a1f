use crate::domain::fhss::fhss_type::FhssType;
use crate::domain::fhss::policy::{ChannelHoppingPolicy, FhssFinalState};
use crate::domain::utils::id::{ChannelId, NodeId};

/// Default IEEE 802.15.4e hopping sequence used by OpenWSN (channel indices 0..16).
pub const OPENWSN_SEQUENCE: [u16; 16] = [5, 6, 12, 7, 15, 4, 14, 11, 8, 0, 1, 2, 13, 3, 9, 10];

/// Round-robin hop over an allowed channel list: `allowed[(asn + offset) % len]`.
pub fn round_robin(allowed: &[ChannelId], asn: u64, offset: u8) -> Option<ChannelId> {
    if allowed.is_empty() {
        return None;
    }
    let position = (asn.wrapping_add(offset as u64) % allowed.len() as u64) as usize;
    Some(allowed[position])
}

/// Every offset resolves to the same configured channel.
pub struct FixedChannel {
    channel: ChannelId,
}

impl FixedChannel {
    pub fn new(channel: ChannelId) -> Self {
        FixedChannel { channel }
    }
}

impl ChannelHoppingPolicy for FixedChannel {
    fn fhss_type(&self) -> FhssType {
        FhssType::Fixed
    }

    fn select_channel(&mut self, _asn: u64, _link: (NodeId, NodeId), _offset: u8) -> ChannelId {
        self.channel
    }

    fn final_state(&self) -> FhssFinalState {
        FhssFinalState::new(FhssType::Fixed)
    }
}

/// Standard TSCH hopping: `sequence[(asn + offset) % 16]`.
pub struct OpenWsnHopping {
    sequence: Vec<ChannelId>,
}

impl OpenWsnHopping {
    /// Networks with fewer than 16 channels fold the sequence onto their channel range.
    pub fn new(num_channels: usize) -> Self {
        let modulus = num_channels.clamp(1, OPENWSN_SEQUENCE.len()) as u16;
        OpenWsnHopping { sequence: OPENWSN_SEQUENCE.iter().map(|c| ChannelId::new(c % modulus)).collect() }
    }
}

impl ChannelHoppingPolicy for OpenWsnHopping {
    fn fhss_type(&self) -> FhssType {
        FhssType::OpenWsn
    }

    fn select_channel(&mut self, asn: u64, _link: (NodeId, NodeId), offset: u8) -> ChannelId {
        round_robin(&self.sequence, asn, offset).unwrap_or(ChannelId::new(0))
    }

    fn final_state(&self) -> FhssFinalState {
        FhssFinalState::new(FhssType::OpenWsn)
    }
}
