// streetimport-core/src/domain/record.rs

use serde::Serialize;

use crate::domain::error::DomainError;

/// Unique identifier of the record. Defaults to the line number.
pub const ID_KEY: &str = "id";
/// Line of the source file the record starts on.
pub const LINE_NUMBER_KEY: &str = "line_number";
/// Path of the originating file.
pub const SOURCE_KEY: &str = "source";

const METADATA_KEYS: [&str; 3] = [ID_KEY, LINE_NUMBER_KEY, SOURCE_KEY];

/// One parsed row of input data plus its identity metadata.
///
/// Fields keep the order of the source header. A record is immutable once
/// built: handlers derive enriched copies through [`Record::enriched`], which
/// refuses to touch the metadata keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record {
    fields: Vec<(String, String)>,
}

impl Record {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// True when the field exists and holds something other than whitespace.
    pub fn has_value(&self, key: &str) -> bool {
        self.get(key).is_some_and(|v| !v.trim().is_empty())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn id(&self) -> &str {
        self.get(ID_KEY).unwrap_or_default()
    }

    pub fn line_number(&self) -> Option<u64> {
        self.get(LINE_NUMBER_KEY).and_then(|v| v.parse().ok())
    }

    pub fn source(&self) -> &str {
        self.get(SOURCE_KEY).unwrap_or_default()
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns a copy carrying an additional (or replaced) business field.
    pub fn enriched(&self, key: &str, value: impl Into<String>) -> Result<Record, DomainError> {
        if METADATA_KEYS.contains(&key) {
            return Err(DomainError::ReservedField(key.to_string()));
        }
        let mut builder = RecordBuilder {
            fields: self.fields.clone(),
        };
        builder.set(key, value.into());
        Ok(Record {
            fields: builder.fields,
        })
    }
}

/// Assembles a [`Record`] column by column.
#[derive(Debug, Default)]
pub struct RecordBuilder {
    fields: Vec<(String, String)>,
}

impl RecordBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(&key.into(), value.into());
        self
    }

    pub fn push(&mut self, key: &str, value: String) {
        self.set(key, value);
    }

    fn set(&mut self, key: &str, value: String) {
        match self.fields.iter_mut().find(|(k, _)| k == key) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((key.to_string(), value)),
        }
    }

    /// Seals the record. Metadata keys already populated by a field mapping
    /// are left alone, unless the mapped value is blank.
    pub fn finish(mut self, line_number: u64, source: &str) -> Record {
        let line = line_number.to_string();
        self.fill_blank(ID_KEY, &line);
        self.fill_blank(LINE_NUMBER_KEY, &line);
        self.fill_blank(SOURCE_KEY, source);
        Record {
            fields: self.fields,
        }
    }

    fn fill_blank(&mut self, key: &str, default: &str) {
        match self.fields.iter_mut().find(|(k, _)| k == key) {
            Some(slot) if slot.1.trim().is_empty() => slot.1 = default.to_string(),
            Some(_) => {}
            None => self.fields.push((key.to_string(), default.to_string())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_finish_replaces_blank_metadata() {
        let record = RecordBuilder::new()
            .field("id", "  ")
            .field("source", "")
            .field("name", "Alice")
            .finish(7, "/tmp/in.csv");

        assert_eq!(record.id(), "7");
        assert_eq!(record.source(), "/tmp/in.csv");
        assert_eq!(record.line_number(), Some(7));
    }

    #[test]
    fn test_finish_adds_metadata_defaults() {
        let record = RecordBuilder::new()
            .field("name", "Alice")
            .finish(4, "/tmp/in.csv");

        assert_eq!(record.id(), "4");
        assert_eq!(record.line_number(), Some(4));
        assert_eq!(record.source(), "/tmp/in.csv");
        assert_eq!(record.get("name"), Some("Alice"));
    }

    #[test]
    fn test_mapped_id_is_kept() {
        let record = RecordBuilder::new()
            .field("id", "A-17")
            .field("name", "Bob")
            .finish(2, "in.csv");

        assert_eq!(record.id(), "A-17");
        assert_eq!(record.line_number(), Some(2));
    }

    #[test]
    fn test_field_order_follows_insertion() {
        let record = RecordBuilder::new()
            .field("b", "1")
            .field("a", "2")
            .finish(1, "x");
        let keys: Vec<&str> = record.fields().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["b", "a", "id", "line_number", "source"]);
    }

    #[test]
    fn test_enriched_refuses_metadata() {
        let record = RecordBuilder::new().finish(1, "x");
        assert!(matches!(
            record.enriched("id", "99"),
            Err(DomainError::ReservedField(_))
        ));

        let enriched = record.enriched("campaign", "summer").unwrap();
        assert_eq!(enriched.get("campaign"), Some("summer"));
        assert_eq!(enriched.id(), "1");
        assert!(!record.contains("campaign"));
    }

    #[test]
    fn test_has_value_ignores_blank() {
        let record = RecordBuilder::new()
            .field("name", "  ")
            .field("amount", "10")
            .finish(1, "x");
        assert!(!record.has_value("name"));
        assert!(record.has_value("amount"));
        assert!(!record.has_value("missing"));
    }
}
