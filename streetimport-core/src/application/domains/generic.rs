// streetimport-core/src/application/domains/generic.rs
//
// Reference domain: one contact per row, with optional address and phone,
// and an "Import" activity tracing where the data came from.

use std::path::Path;

use async_trait::async_trait;
use regex::Regex;
use serde_json::{Value, json};

use crate::application::dispatcher::ALLOW_MULTIPLE_HANDLERS;
use crate::domain::configuration::{DomainConfig, DomainProfile};
use crate::domain::error::DomainError;
use crate::domain::handler::{
    ActivitySpec, FileNameCache, HandlerContext, HandlerError, RecordHandler,
};
use crate::domain::outcome::Severity;
use crate::domain::record::Record;
use crate::ports::repository::Params;

pub const DOMAIN_ID: &str = "generic";

const CONTACT_FIELDS: [&str; 6] = [
    "first_name",
    "last_name",
    "email",
    "birth_date",
    "contact_type",
    "organization_name",
];

const ADDRESS_FIELDS: [&str; 5] = [
    "street_address",
    "supplemental_address_1",
    "postal_code",
    "city",
    "country_id",
];

pub struct GenericDomain;

impl DomainProfile for GenericDomain {
    fn id(&self) -> &str {
        DOMAIN_ID
    }

    fn description(&self) -> &str {
        "One contact per row with address, phone and an import activity"
    }

    fn default_settings(&self) -> Value {
        json!({
            "file_pattern": r"(?i)^.*\.csv$",
            "contact": {
                "identifier_column": "external_identifier",
                "mandatory_columns": ["last_name"],
                "location_type": "Home",
            },
            "activity": {
                "type": "Import",
                "status": "Completed",
            },
            "stop_processing_if_no_handler_found": false,
            "allow_processing_by_multiple_handlers": false,
        })
    }

    fn handlers(&self, config: &DomainConfig) -> Result<Vec<Box<dyn RecordHandler>>, DomainError> {
        let mut handlers: Vec<Box<dyn RecordHandler>> =
            vec![Box::new(ContactRecordHandler::from_config(config)?)];
        // The audit trail claims everything, so it only joins when records may go to several handlers.
        if config.setting_bool(ALLOW_MULTIPLE_HANDLERS, false) {
            handlers.push(Box::new(AuditTrailHandler));
        }
        Ok(handlers)
    }
}

/// Creates or finds the contact of each row and attaches its address, phone and activity.
pub struct ContactRecordHandler {
    files: FileNameCache,
    identifier_column: String,
    mandatory_columns: Vec<String>,
    location_type: String,
    activity_type: String,
    activity_status: String,
}

impl ContactRecordHandler {
    pub fn from_config(config: &DomainConfig) -> Result<Self, DomainError> {
        let pattern = config.setting_str("file_pattern", r"(?i)^.*\.csv$");
        let pattern = Regex::new(&pattern)
            .map_err(|e| DomainError::HandlerConfig(format!("file_pattern: {}", e)))?;

        Ok(Self {
            files: FileNameCache::new(pattern),
            identifier_column: config
                .setting_str(["contact", "identifier_column"], "external_identifier"),
            mandatory_columns: config.setting_strings(["contact", "mandatory_columns"]),
            location_type: config.setting_str(["contact", "location_type"], "Home"),
            activity_type: config.setting_str(["activity", "type"], "Import"),
            activity_status: config.setting_str(["activity", "status"], "Completed"),
        })
    }

    fn contact_params(record: &Record) -> Params {
        CONTACT_FIELDS
            .iter()
            .filter(|f| record.has_value(f))
            .filter_map(|f| record.get(f).map(|v| (f.to_string(), json!(v.trim()))))
            .collect()
    }

    fn address_params(record: &Record) -> Option<Params> {
        if !record.has_value("street_address") {
            return None;
        }
        Some(
            ADDRESS_FIELDS
                .iter()
                .filter_map(|f| record.get(f).map(|v| (f.to_string(), json!(v.trim()))))
                .collect(),
        )
    }
}

#[async_trait]
impl RecordHandler for ContactRecordHandler {
    fn name(&self) -> &str {
        "ContactRecordHandler"
    }

    fn can_process_record(&self, record: &Record, source: &Path) -> bool {
        self.files.matches(source) && record.contains(&self.identifier_column)
    }

    async fn process_record(
        &mut self,
        record: &Record,
        source: &Path,
        ctx: &mut HandlerContext<'_>,
    ) -> Result<(), HandlerError> {
        let empty: Vec<&str> = self
            .mandatory_columns
            .iter()
            .filter(|c| !record.has_value(c))
            .map(String::as_str)
            .collect();
        if !empty.is_empty() {
            return Err(HandlerError::Record(format!(
                "Mandatory field(s) empty: {}",
                empty.join(", ")
            )));
        }

        let identifier = record.get(&self.identifier_column).unwrap_or_default().trim();
        if identifier.is_empty() {
            return Err(HandlerError::Record(format!(
                "No value in '{}'",
                self.identifier_column
            )));
        }

        let Some(contact_id) = ctx
            .get_or_create_contact(&self.identifier_column, identifier, Self::contact_params(record))
            .await
        else {
            return Err(HandlerError::Record(format!(
                "Contact '{}' could not be created",
                identifier
            )));
        };

        if let Some(address) = Self::address_params(record) {
            ctx.create_address(contact_id, address, &self.location_type)
                .await?;
        }
        if record.has_value("phone") {
            let phone = record.get("phone").unwrap_or_default().trim();
            ctx.create_phone(contact_id, phone, &self.location_type, record.get("phone_type"))
                .await?;
        }

        let file_name = source
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let mut activity = ActivitySpec::new(
            &self.activity_type,
            format!("Imported from {} line {}", file_name, record.line_number().unwrap_or_default()),
        );
        activity.status = Some(self.activity_status.clone());
        activity.target_contact_ids = vec![contact_id];
        activity.details = Some(record.source().to_string());
        if ctx.create_activity(activity).await?.is_none() {
            ctx.result.log_message(
                &format!("No import activity for record {}", record.id()),
                Severity::Warning,
                self.name(),
            );
        }

        ctx.result.record_success(
            record.id(),
            self.name(),
            &format!("Contact {} imported", contact_id),
        );
        Ok(())
    }
}

/// Cross-cutting handler: notes every record it sees.
pub struct AuditTrailHandler;

#[async_trait]
impl RecordHandler for AuditTrailHandler {
    fn name(&self) -> &str {
        "AuditTrailHandler"
    }

    fn can_process_record(&self, _: &Record, _: &Path) -> bool {
        true
    }

    async fn process_record(
        &mut self,
        record: &Record,
        source: &Path,
        ctx: &mut HandlerContext<'_>,
    ) -> Result<(), HandlerError> {
        ctx.result.log_message(
            &format!(
                "Seen record {} ({} fields) from {}",
                record.id(),
                record.len(),
                source.display()
            ),
            Severity::Debug,
            self.name(),
        );
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::configuration::{DomainRegistry, ImportConfig};
    use crate::domain::outcome::ImportResult;
    use crate::domain::record::RecordBuilder;
    use crate::infrastructure::adapters::memory::InMemoryRepository;
    use crate::infrastructure::settings::MemorySettingsStore;
    use std::sync::Arc;

    fn config() -> DomainConfig {
        let registry = DomainRegistry::new().with(Arc::new(GenericDomain));
        DomainConfig::load(
            ImportConfig::default(),
            Arc::new(MemorySettingsStore::new()),
            registry,
        )
        .unwrap()
    }

    fn row(fields: &[(&str, &str)]) -> Record {
        fields
            .iter()
            .fold(RecordBuilder::new(), |b, (k, v)| b.field(*k, *v))
            .finish(2, "/in/street_2024.csv")
    }

    #[test]
    fn test_handler_set_follows_multiple_handler_setting() {
        let mut config = config();
        assert_eq!(GenericDomain.handlers(&config).unwrap().len(), 1);

        config
            .set_setting(ALLOW_MULTIPLE_HANDLERS, json!(true))
            .unwrap();
        let names: Vec<String> = GenericDomain
            .handlers(&config)
            .unwrap()
            .iter()
            .map(|h| h.name().to_string())
            .collect();
        assert_eq!(names, vec!["ContactRecordHandler", "AuditTrailHandler"]);
    }

    #[test]
    fn test_invalid_file_pattern_is_rejected() {
        let mut config = config();
        config.set_setting("file_pattern", json!("([")).unwrap();
        assert!(matches!(
            ContactRecordHandler::from_config(&config),
            Err(DomainError::HandlerConfig(_))
        ));
    }

    #[test]
    fn test_can_process_needs_pattern_and_identifier() {
        let handler = ContactRecordHandler::from_config(&config()).unwrap();
        let record = row(&[("external_identifier", "D-1")]);

        assert!(handler.can_process_record(&record, Path::new("/in/street_2024.csv")));
        assert!(!handler.can_process_record(&record, Path::new("/in/street_2024.txt")));
        assert!(!handler.can_process_record(&row(&[("name", "x")]), Path::new("/in/a.csv")));
    }

    #[tokio::test]
    async fn test_full_row_creates_contact_address_phone_activity() {
        let config = config();
        let repo = InMemoryRepository::with_reference_data();
        let mut result = ImportResult::default();
        let mut handler = ContactRecordHandler::from_config(&config).unwrap();
        let record = row(&[
            ("external_identifier", "D-1"),
            ("first_name", "Ann"),
            ("last_name", "Peeters"),
            ("street_address", "Kerkstraat 1"),
            ("postal_code", "9000"),
            ("city", "Gent"),
            ("phone", "0470 11 22 33"),
        ]);

        let mut ctx = HandlerContext::new(&repo, &config, &mut result);
        handler
            .process_record(&record, Path::new("/in/street_2024.csv"), &mut ctx)
            .await
            .unwrap();

        assert!(result.is_success("2"));
        assert_eq!(repo.entities("Contact").len(), 1);
        assert_eq!(repo.entities("Address").len(), 1);
        assert_eq!(repo.entities("Phone").len(), 1);
        let activity = &repo.entities("Activity")[0];
        assert_eq!(
            activity.get("subject"),
            Some(&json!("Imported from street_2024.csv line 2"))
        );
    }

    #[tokio::test]
    async fn test_empty_mandatory_field_fails_record() {
        let config = config();
        let repo = InMemoryRepository::with_reference_data();
        let mut result = ImportResult::default();
        let mut handler = ContactRecordHandler::from_config(&config).unwrap();
        let record = row(&[("external_identifier", "D-2"), ("last_name", " ")]);

        let mut ctx = HandlerContext::new(&repo, &config, &mut result);
        let err = handler
            .process_record(&record, Path::new("/in/a.csv"), &mut ctx)
            .await
            .unwrap_err();

        assert_eq!(err, HandlerError::Record("Mandatory field(s) empty: last_name".into()));
        assert!(repo.entities("Contact").is_empty());
    }

    #[tokio::test]
    async fn test_missing_activity_type_is_fatal() {
        let config = config();
        // No reference data at all: the "Import" activity type cannot resolve.
        let repo = InMemoryRepository::new();
        let mut result = ImportResult::default();
        let mut handler = ContactRecordHandler::from_config(&config).unwrap();
        let record = row(&[("external_identifier", "D-3"), ("last_name", "Janssens")]);

        let mut ctx = HandlerContext::new(&repo, &config, &mut result);
        let err = handler
            .process_record(&record, Path::new("/in/a.csv"), &mut ctx)
            .await
            .unwrap_err();
        assert!(matches!(err, HandlerError::Fatal(_)));
    }
}
