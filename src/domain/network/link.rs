use serde::Deserialize;

use crate::domain::utils::id::{ChannelId, NodeId};

/// One row of a PRR trace file: `from to channel prr`, PRR in percent.
#[derive(Debug, Clone, Deserialize)]
pub struct PrrRecord {
    pub from: u32,
    pub to: u32,
    pub channel: u32,
    pub prr: f64,
}

/// Directed link measured on one channel. Immutable once loaded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Link {
    pub from: NodeId,
    pub to: NodeId,
    pub channel: ChannelId,

    /// Packet reception ratio in `[0, 1]`.
    pub prr: f64,
}

impl TryFrom<&PrrRecord> for Link {
    type Error = String;

    fn try_from(record: &PrrRecord) -> Result<Self, Self::Error> {
        let from = u16::try_from(record.from).map_err(|_| format!("node id {} is out of range", record.from))?;
        let to = u16::try_from(record.to).map_err(|_| format!("node id {} is out of range", record.to))?;
        let channel = u16::try_from(record.channel).map_err(|_| format!("channel {} is out of range", record.channel))?;

        if !(0.0..=100.0).contains(&record.prr) {
            return Err(format!("PRR {} of link {} -> {} is not a percentage", record.prr, record.from, record.to));
        }

        Ok(Link { from: NodeId::new(from), to: NodeId::new(to), channel: ChannelId::new(channel), prr: record.prr / 100.0 })
    }
}
