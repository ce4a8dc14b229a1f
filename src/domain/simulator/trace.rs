use std::collections::HashMap;

use crate::domain::network::link::{Link, PrrRecord};
use crate::domain::network::network_model::NetworkModel;
use crate::domain::utils::id::{ChannelId, NodeId};
use crate::error::{Error, Result};

/// Per-link, per-channel PRR valid for one trace file of the replay.
#[derive(Debug, Clone, Default)]
pub struct LinkTrace {
    /// 1-based number of the trace file, 0 for the measurements of the network model.
    file_number: usize,
    prr: HashMap<(NodeId, NodeId, ChannelId), f64>,
}

impl LinkTrace {
    pub fn from_records(file_number: usize, records: &[PrrRecord]) -> Result<Self> {
        let mut prr = HashMap::with_capacity(records.len());

        for record in records {
            let link = Link::try_from(record).map_err(|e| Error::InconsistentInput(format!("trace file {}: {}", file_number, e)))?;
            prr.insert((link.from, link.to, link.channel), link.prr);
        }

        Ok(LinkTrace { file_number, prr })
    }

    /// Snapshot of the measurements the network model was built from.
    pub fn from_network(network: &NetworkModel) -> Self {
        let prr = network
            .channels()
            .flat_map(|channel| network.links(channel).iter().map(|link| ((link.from, link.to, link.channel), link.prr)))
            .collect();

        LinkTrace { file_number: 0, prr }
    }

    pub fn file_number(&self) -> usize {
        self.file_number
    }

    /// PRR in `[0, 1]`, 0.0 for links absent from the trace.
    pub fn prr(&self, from: NodeId, to: NodeId, channel: ChannelId) -> f64 {
        self.prr.get(&(from, to, channel)).copied().unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.prr.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prr.is_empty()
    }
}

/// The rolling trace files of a replay, in file order.
#[derive(Debug, Clone, Default)]
pub struct TraceSet {
    files: Vec<LinkTrace>,
}

impl TraceSet {
    pub fn new(files: Vec<LinkTrace>) -> Self {
        TraceSet { files }
    }

    /// One file per index, all repeating the network model's measurements.
    pub fn repeat_network(network: &NetworkModel, max_files: usize) -> Self {
        let snapshot = LinkTrace::from_network(network);
        TraceSet { files: (1..=max_files).map(|file_number| LinkTrace { file_number, ..snapshot.clone() }).collect() }
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Trace file for a 0-based file index.
    pub fn file(&self, index: usize) -> Option<&LinkTrace> {
        self.files.get(index)
    }
}
