use serde::Serialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::{self, Write};
use std::sync::mpsc;
use std::thread::{self, JoinHandle};

use crate::domain::simulator::log_record::{DeliveryCount, LogRecord};
use crate::domain::simulator::log_sink::LogSink;
use crate::error::{Error, Result};

/// Target of the structured analytics events emitted by the simulator.
pub const ANALYTICS_TARGET: &str = "tsch_scheduling::analytics";

/// Each row of the statistics file is a set of key-value-pairs.
/// This enum specifies all allowed keys and thus the columns of the output file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum StatParameter {
    /// Hopping policy of the run, "NONE" for pinned channels.
    FhssType,

    /// Index of the log window.
    Window,

    FirstSlot,
    LastSlot,

    /// 1-based trace file the window ended in.
    FileNumber,

    /// Sending node, "ALL" for the aggregate row of a window.
    Sender,

    /// Receiving node, "ANY" for the per-node rows and "ALL" for the aggregate row of a window.
    Receiver,

    Attempted,
    Delivered,
    DeliveryRatio,

    /// Packets delivered to the sink in the window (aggregate row only).
    DeliveredToSink,

    /// Transmissions per channel index, `|`-separated (aggregate row only).
    ChannelUsage,
}

impl StatParameter {
    /// Columns in output order.
    pub const ALL: [StatParameter; 12] = [
        StatParameter::FhssType,
        StatParameter::Window,
        StatParameter::FirstSlot,
        StatParameter::LastSlot,
        StatParameter::FileNumber,
        StatParameter::Sender,
        StatParameter::Receiver,
        StatParameter::Attempted,
        StatParameter::Delivered,
        StatParameter::DeliveryRatio,
        StatParameter::DeliveredToSink,
        StatParameter::ChannelUsage,
    ];

    pub fn header(&self) -> &'static str {
        match self {
            StatParameter::FhssType => "FhssType",
            StatParameter::Window => "Window",
            StatParameter::FirstSlot => "FirstSlot",
            StatParameter::LastSlot => "LastSlot",
            StatParameter::FileNumber => "FileNumber",
            StatParameter::Sender => "Sender",
            StatParameter::Receiver => "Receiver",
            StatParameter::Attempted => "Attempted",
            StatParameter::Delivered => "Delivered",
            StatParameter::DeliveryRatio => "DeliveryRatio",
            StatParameter::DeliveredToSink => "DeliveredToSink",
            StatParameter::ChannelUsage => "ChannelUsage",
        }
    }

    pub fn headers() -> Vec<&'static str> {
        StatParameter::ALL.iter().map(StatParameter::header).collect()
    }
}

/// Values are stored in their native format and only formatted when written.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum StatValue {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl From<u64> for StatValue {
    fn from(v: u64) -> Self {
        StatValue::Integer(i64::try_from(v).unwrap_or(i64::MAX))
    }
}

impl From<usize> for StatValue {
    fn from(v: usize) -> Self {
        StatValue::Integer(i64::try_from(v).unwrap_or(i64::MAX))
    }
}

impl From<f64> for StatValue {
    fn from(v: f64) -> Self {
        StatValue::Float(v)
    }
}

impl From<String> for StatValue {
    fn from(v: String) -> Self {
        StatValue::Text(v)
    }
}

impl From<&str> for StatValue {
    fn from(v: &str) -> Self {
        StatValue::Text(v.to_string())
    }
}

impl StatValue {
    fn render(&self) -> String {
        match self {
            StatValue::Integer(i) => i.to_string(),
            StatValue::Float(f) => format!("{:.4}", f),
            StatValue::Text(t) => t.clone(),
        }
    }
}

/// One row of the statistics file.
#[derive(Debug, Clone, Default)]
pub struct StatisticEvent {
    data: HashMap<StatParameter, StatValue>,
}

impl StatisticEvent {
    pub fn new() -> Self {
        Self { data: HashMap::new() }
    }

    pub fn set<V: Into<StatValue>>(&mut self, param: StatParameter, value: V) -> &mut Self {
        self.data.insert(param, value.into());
        self
    }

    fn row(&self) -> Vec<String> {
        StatParameter::ALL.iter().map(|param| self.data.get(param).map(StatValue::render).unwrap_or_else(|| "NA".to_string())).collect()
    }
}

/// Messages sent from the simulation to the writer thread.
enum StatsMessage {
    Log(StatisticEvent),
    Shutdown,
}

/// Writes log windows to a `;`-separated CSV file from a background thread,
/// so that no file I/O happens inside the simulation loop.
pub struct StatsCollector {
    sender: mpsc::Sender<StatsMessage>,
    worker: Option<JoinHandle<Result<()>>>,
}

impl StatsCollector {
    /// Opens the output (a file, or stdout) and spawns the writer thread.
    pub fn init(filename: Option<String>) -> Result<Self> {
        let writer: Box<dyn Write + Send> = match filename {
            Some(f) => Box::new(File::create(&f)?),
            None => Box::new(io::stdout()),
        };

        let (tx, rx) = mpsc::channel();
        let worker = thread::spawn(move || Self::worker_loop(rx, writer));

        Ok(StatsCollector { sender: tx, worker: Some(worker) })
    }

    /// The logic running in the background thread.
    fn worker_loop(rx: mpsc::Receiver<StatsMessage>, writer: Box<dyn Write + Send>) -> Result<()> {
        let mut csv_wtr = csv::WriterBuilder::new().delimiter(b';').from_writer(writer);

        csv_wtr.write_record(StatParameter::headers())?;

        for msg in rx {
            match msg {
                StatsMessage::Log(event) => {
                    if let Err(e) = csv_wtr.write_record(event.row()) {
                        log::error!("Stats Error: Failed to write record: {}", e);
                    }
                }
                StatsMessage::Shutdown => break,
            }
        }

        csv_wtr.flush()?;
        Ok(())
    }

    /// Non-blocking, just sends the event to the writer thread.
    pub fn add_event(&self, event: StatisticEvent) {
        if self.sender.send(StatsMessage::Log(event)).is_err() {
            log::error!("Statistics writer has stopped, event dropped.");
        }
    }

    /// Stops the writer thread after everything sent so far has been written.
    pub fn finish(mut self) -> Result<()> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> Result<()> {
        let Some(worker) = self.worker.take() else {
            return Ok(());
        };
        let _ = self.sender.send(StatsMessage::Shutdown);

        worker.join().map_err(|_| Error::IoError(io::Error::other("statistics writer thread panicked")))?
    }

    fn event_for(record: &LogRecord, sender: String, receiver: String, count: &DeliveryCount) -> StatisticEvent {
        let mut event = StatisticEvent::new();
        event
            .set(StatParameter::FhssType, record.fhss_type.map(|t| t.as_str()).unwrap_or("NONE"))
            .set(StatParameter::Window, record.window)
            .set(StatParameter::FirstSlot, record.first_slot)
            .set(StatParameter::LastSlot, record.last_slot)
            .set(StatParameter::FileNumber, record.file_number)
            .set(StatParameter::Sender, sender)
            .set(StatParameter::Receiver, receiver)
            .set(StatParameter::Attempted, count.attempted)
            .set(StatParameter::Delivered, count.delivered)
            .set(StatParameter::DeliveryRatio, count.ratio());
        event
    }
}

impl LogSink for StatsCollector {
    /// One row per link and one per sending node of the window, followed by the aggregate row.
    fn record(&mut self, record: &LogRecord) -> Result<()> {
        for link in record.links.iter() {
            self.add_event(Self::event_for(record, link.sender.to_string(), link.receiver.to_string(), &link.count));
        }

        for node in record.nodes.iter() {
            self.add_event(Self::event_for(record, node.node.to_string(), "ANY".to_string(), &node.count));
        }

        let usage = record.channel_usage.iter().map(u64::to_string).collect::<Vec<_>>().join("|");

        let mut aggregate = Self::event_for(record, "ALL".to_string(), "ALL".to_string(), &record.total);
        aggregate.set(StatParameter::DeliveredToSink, record.delivered_to_sink).set(StatParameter::ChannelUsage, usage);
        self.add_event(aggregate);

        Ok(())
    }
}

impl Drop for StatsCollector {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            log::error!("Statistics writer failed: {}", e);
        }
    }
}
