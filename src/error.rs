use thiserror::Error;

use crate::domain::utils::id::NodeId;

#[derive(Debug, Error)]
pub enum Error {
    #[error("File not found or could not be read: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse JSON input: {0}")]
    DeserializationError(#[from] serde_json::Error),

    #[error("Failed to read or write trace/statistics file: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A required tree edge does not fit into the bounded slotframe.
    #[error("Edge {sender} -> {receiver} cannot be placed within a slotframe of {slotframe_length} slots")]
    UnschedulableEdge { sender: NodeId, receiver: NodeId, slotframe_length: usize },

    #[error("Inconsistent input: {0}")]
    InconsistentInput(String),

    /// The reception draw sequence ran out before the simulated horizon was reached.
    #[error("Reception draw sequence exhausted: {required} draws required, only {available} available")]
    InsufficientRandomness { required: u64, available: u64 },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConversionError {
    #[error("Unknown TSCH scheduling algorithm: {0}")]
    UnknownSchedulerType(String),

    #[error("Unknown FHSS variant: {0}")]
    UnknownFhssType(String),

    #[error("Unknown simulation mode: {0}")]
    UnknownSimulationMode(String),
}

impl From<ConversionError> for Error {
    fn from(e: ConversionError) -> Self {
        Error::InvalidConfiguration(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
