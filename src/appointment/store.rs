use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::{AppointmentRecord, HEADER};
use crate::error::{BotError, Result};

/// Append-only CSV sink for appointment records.
///
/// The file is reopened for every append and never held open. There is no
/// locking, so only one process should write to a given path.
#[derive(Debug, Clone)]
pub struct CsvRecordStore {
    path: PathBuf,
}

impl CsvRecordStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, record: &AppointmentRecord) -> Result<()> {
        append(record, &self.path)
    }

    pub fn read_all(&self) -> Result<Vec<AppointmentRecord>> {
        read_all(&self.path)
    }
}

/// Append one row to the record file at `path`, writing the header first if
/// the file does not exist yet.
pub fn append(record: &AppointmentRecord, path: &Path) -> Result<()> {
    let is_new = !path.exists();

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| BotError::storage(path, e))?;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);

    if is_new {
        debug!("Creating record file {}", path.display());
        writer
            .write_record(HEADER)
            .map_err(|e| BotError::storage(path, e))?;
    }

    writer
        .serialize(record)
        .map_err(|e| BotError::storage(path, e))?;
    writer.flush().map_err(|e| BotError::storage(path, e))?;

    info!("Appended appointment record to {}", path.display());
    Ok(())
}

/// Read every stored record back. A missing file holds no records.
pub fn read_all(path: &Path) -> Result<Vec<AppointmentRecord>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_path(path)
        .map_err(|e| BotError::storage(path, e))?;

    reader
        .deserialize::<AppointmentRecord>()
        .map(|row| row.map_err(|e| BotError::storage(path, e)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, service: &str) -> AppointmentRecord {
        AppointmentRecord {
            name: name.to_string(),
            service: service.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_header_written_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("appointments.csv");
        let store = CsvRecordStore::new(&path);

        for i in 0..3 {
            store.append(&record(&format!("Patient {i}"), "cleaning")).unwrap();
        }

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "Name,Service,Date,Time,Notes");
        assert_eq!(lines[1], "Patient 0,cleaning,,,");
        assert_eq!(lines[3], "Patient 2,cleaning,,,");
        assert_eq!(content.matches("Name,Service").count(), 1);
        assert!(content.ends_with('\n'));
    }

    #[test]
    fn test_existing_file_is_appended_not_rewritten() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("appointments.csv");
        std::fs::write(&path, "Name,Service,Date,Time,Notes\nOld,filling,,,\n").unwrap();

        append(&record("New", "check-up"), &path).unwrap();
        append(&record("New", "check-up"), &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "Name,Service,Date,Time,Notes\nOld,filling,,,\nNew,check-up,,,\nNew,check-up,,,\n"
        );
    }

    #[test]
    fn test_fields_with_commas_are_quoted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("appointments.csv");
        let rec = AppointmentRecord {
            name: "Eve".to_string(),
            date: "March 5, 2025".to_string(),
            notes: "needs \"extra\" care".to_string(),
            ..Default::default()
        };

        append(&rec, &path).unwrap();

        assert_eq!(read_all(&path).unwrap(), vec![rec]);
    }

    #[test]
    fn test_read_all_maps_columns_by_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("appointments.csv");
        std::fs::write(
            &path,
            "Name, Service, Date, Time, Notes\nOld,filling,May 2,9:00,\nShort,check-up\n",
        )
        .unwrap();

        let records = read_all(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].service, "filling");
        assert_eq!(records[0].time, "9:00");
        assert_eq!(records[1].name, "Short");
        assert_eq!(records[1].date, "");
        assert_eq!(records[1].notes, "");
    }

    #[test]
    fn test_read_all_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_all(&dir.path().join("nope.csv")).unwrap().is_empty());
    }

    #[test]
    fn test_unopenable_path_is_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("appointments.csv");

        let err = append(&record("Bob", "cleaning"), &path).unwrap_err();
        assert!(matches!(err, BotError::Storage { .. }));
        assert!(err.to_string().contains("missing-dir"));
    }
}
