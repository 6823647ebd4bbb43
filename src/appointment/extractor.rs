use regex::{Match, Regex};
use tracing::debug;

use super::AppointmentRecord;

/// Turns free text into an [`AppointmentRecord`].
///
/// Implementations must not fail: a field that cannot be found is left empty.
pub trait TextExtractor: Send + Sync {
    fn extract(&self, text: &str) -> AppointmentRecord;
}

const NAME_CLASS: &str = r"[A-Za-z\s]+";
const SERVICE_CLASS: &str = r"[A-Za-z\s]+";
const DATE_CLASS: &str = r"[A-Za-z0-9,\-/ ]+";
const TIME_CLASS: &str = r"[A-Za-z0-9: ]+";
const NOTES_CLASS: &str = r".*";

/// Markdown emphasis the model likes to wrap labels in (`**Name:**`).
const EMPHASIS: &str = r"[*_]*";

/// Gaps around the separator stay on the label's line.
const GAP: &str = r"[ \t]*";

/// One label/value pattern, in two strengths.
struct FieldPattern {
    /// `Name: Bob`, `Name - Bob`
    separated: Regex,
    /// `name Bob`, also accepts a separator
    loose: Regex,
}

impl FieldPattern {
    fn new(label: &str, value_class: &str) -> Result<Self, regex::Error> {
        let separated = format!(
            r"(?i)\b{label}\b{EMPHASIS}{GAP}[:\-]{EMPHASIS}{GAP}({value_class})"
        );
        let loose = format!(
            r"(?i)\b{label}\b{EMPHASIS}{GAP}[:\-]?{EMPHASIS}{GAP}({value_class})"
        );
        Ok(Self {
            separated: Regex::new(&separated)?,
            loose: Regex::new(&loose)?,
        })
    }
}

/// Best-effort extractor for "Label: value" confirmation summaries.
///
/// Each field is searched independently over the whole text. Occurrences
/// with an explicit separator win over bare ones, and a value never runs
/// past the end of its line or into the next labelled field.
pub struct RegexExtractor {
    name: FieldPattern,
    service: FieldPattern,
    date: FieldPattern,
    time: FieldPattern,
    notes: FieldPattern,
    next_label: Regex,
}

impl RegexExtractor {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            name: FieldPattern::new("name", NAME_CLASS)?,
            service: FieldPattern::new("service", SERVICE_CLASS)?,
            date: FieldPattern::new("date", DATE_CLASS)?,
            time: FieldPattern::new("time", TIME_CLASS)?,
            notes: FieldPattern::new("notes?", NOTES_CLASS)?,
            next_label: Regex::new(&format!(
                r"(?i){EMPHASIS}\b(?:name|service|date|time|notes?)\b{EMPHASIS}{GAP}[:\-]"
            ))?,
        })
    }

    fn find(&self, pattern: &FieldPattern, text: &str) -> String {
        [&pattern.separated, &pattern.loose]
            .into_iter()
            .flat_map(|re| re.captures_iter(text))
            .filter_map(|caps| caps.get(1))
            .map(|value| self.clip(text, value))
            .find(|value| !value.is_empty())
            .unwrap_or_default()
    }

    /// Cut a raw capture at the first line break or the next field label.
    fn clip(&self, text: &str, value: Match<'_>) -> String {
        let raw = value.as_str();
        let mut end = raw
            .find(|c: char| c == '\n' || c == '\r')
            .unwrap_or(raw.len());

        if let Some(next) = self.next_label.find(&text[value.start()..]) {
            end = end.min(next.start());
        }

        // A bare label can leave its own separator at the front of the value.
        raw[..end]
            .trim_start_matches(|c: char| c == ':' || c == '-')
            .trim_matches(|c: char| c.is_whitespace() || c == '*' || c == '_')
            .to_string()
    }
}

impl TextExtractor for RegexExtractor {
    fn extract(&self, text: &str) -> AppointmentRecord {
        let record = AppointmentRecord {
            name: self.find(&self.name, text),
            service: self.find(&self.service, text),
            date: self.find(&self.date, text),
            time: self.find(&self.time, text),
            notes: self.find(&self.notes, text),
        };
        debug!("Extracted appointment fields: {:?}", record);
        record
    }
}
