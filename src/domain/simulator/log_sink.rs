use crate::domain::simulator::log_record::LogRecord;
use crate::error::Result;

/// Receives every flushed log window of a simulation run, in window order.
pub trait LogSink {
    fn record(&mut self, record: &LogRecord) -> Result<()>;
}

impl LogSink for Vec<LogRecord> {
    fn record(&mut self, record: &LogRecord) -> Result<()> {
        self.push(record.clone());
        Ok(())
    }
}
