use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::network::link::PrrRecord;
use crate::domain::simulator::trace::{LinkTrace, TraceSet};
use crate::error::{Error, Result};

/// Reads a PRR trace file of `from to channel prr` rows.
///
/// Columns may be separated by any run of whitespace; blank lines and lines
/// starting with `#` are skipped.
pub fn read_prr_file(file_path: impl AsRef<Path>) -> Result<Vec<PrrRecord>> {
    let data = fs::read_to_string(file_path.as_ref()).map_err(Error::IoError)?;
    parse_prr_records(&data)
}

pub fn parse_prr_records(data: &str) -> Result<Vec<PrrRecord>> {
    let normalized: String = data
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .collect::<Vec<_>>()
        .join("\n");

    let mut reader = csv::ReaderBuilder::new().delimiter(b' ').has_headers(false).from_reader(normalized.as_bytes());

    let records = reader.deserialize().collect::<std::result::Result<Vec<PrrRecord>, csv::Error>>()?;
    Ok(records)
}

/// Path of the `number`-th rolling trace file: `<prefix>_<number>.dat`.
pub fn trace_file_path(prefix: &str, number: usize) -> PathBuf {
    PathBuf::from(format!("{}_{}.dat", prefix, number))
}

/// Loads trace files 1..=`max_files` of a replay.
pub fn read_trace_set(prefix: &str, max_files: usize) -> Result<TraceSet> {
    let mut files = Vec::with_capacity(max_files);

    for number in 1..=max_files {
        let path = trace_file_path(prefix, number);
        let records = read_prr_file(&path)?;
        log::debug!("Loaded {} PRR measurements from {}.", records.len(), path.display());
        files.push(LinkTrace::from_records(number, &records)?);
    }

    log::info!("Loaded {} trace files with prefix '{}'.", files.len(), prefix);

    Ok(TraceSet::new(files))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tolerates_irregular_whitespace() {
        let data = "# from to channel prr\n0 1 0 100\n\n1   0\t3  87.5\n";
        let records = parse_prr_records(data).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!((records[1].from, records[1].to, records[1].channel), (1, 0, 3));
        assert_eq!(records[1].prr, 87.5);
    }

    #[test]
    fn test_parse_rejects_malformed_rows() {
        assert!(matches!(parse_prr_records("0 1 zero 50"), Err(Error::CsvError(_))));
    }

    #[test]
    fn test_trace_file_path() {
        assert_eq!(trace_file_path("traces/run", 3), PathBuf::from("traces/run_3.dat"));
    }
}
