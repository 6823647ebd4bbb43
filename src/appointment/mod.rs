pub mod detector;
pub mod extractor;
pub mod store;

use serde::{Deserialize, Serialize};

pub use detector::{BookingDetector, KeywordDetector};
pub use extractor::{RegexExtractor, TextExtractor};
pub use store::CsvRecordStore;

/// Column headers of the record file, in field order. These are also the
/// serde names of the [`AppointmentRecord`] fields.
pub const HEADER: [&str; 5] = ["Name", "Service", "Date", "Time", "Notes"];

/// Appointment fields pulled out of a single assistant reply.
///
/// Every field may be empty: extraction is best-effort and nothing here is
/// validated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct AppointmentRecord {
    pub name: String,
    pub service: String,
    pub date: String,
    pub time: String,
    pub notes: String,
}

impl AppointmentRecord {
    pub fn is_empty(&self) -> bool {
        self.fields().iter().all(|f| f.is_empty())
    }

    pub fn fields(&self) -> [&str; 5] {
        [
            self.name.as_str(),
            self.service.as_str(),
            self.date.as_str(),
            self.time.as_str(),
            self.notes.as_str(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_record_is_empty() {
        assert!(AppointmentRecord::default().is_empty());

        let record = AppointmentRecord {
            time: "10:00".to_string(),
            ..Default::default()
        };
        assert!(!record.is_empty());
        assert_eq!(record.fields(), ["", "", "", "10:00", ""]);
    }
}
