// streetimport-core/src/domain/handler/support.rs

// Shared helpers every handler inherits through its HandlerContext.
// Repository failures are logged on the outcome log and degrade to `None`;
// a missing reference type escalates as fatal.

use chrono::{Local, NaiveDateTime};
use serde_json::{Value, json};

use crate::domain::configuration::MetadataKind;
use crate::domain::handler::{HandlerContext, HandlerError};
use crate::domain::outcome::Severity;
use crate::ports::repository::{Params, RepositoryError};

const ADDRESS_KEYS: [&str; 5] = [
    "street_address",
    "supplemental_address_1",
    "postal_code",
    "city",
    "country_id",
];

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Description of an activity to link to contacts.
#[derive(Debug, Clone, Default)]
pub struct ActivitySpec {
    pub activity_type: String,
    pub subject: String,
    pub status: Option<String>,
    pub date: Option<NaiveDateTime>,
    pub details: Option<String>,
    pub source_contact_id: Option<i64>,
    pub target_contact_ids: Vec<i64>,
    pub assignee_contact_ids: Vec<i64>,
    /// Extra fields passed as-is, typically `custom_<n>` values.
    pub custom_fields: Params,
}

impl ActivitySpec {
    pub fn new(activity_type: impl Into<String>, subject: impl Into<String>) -> Self {
        Self {
            activity_type: activity_type.into(),
            subject: subject.into(),
            ..Self::default()
        }
    }
}

/// Outcome of a natural-key contact search.
enum ContactLookup {
    Found(i64),
    Missing,
    /// Several matches, or the repository failed.
    Unresolved,
}

impl HandlerContext<'_> {
    /// Contact id for an identifier. Ambiguous or failed lookups yield `None`.
    pub async fn find_contact(&mut self, field: &str, value: &str) -> Option<i64> {
        match self.lookup_contact(field, value).await {
            ContactLookup::Found(id) => Some(id),
            ContactLookup::Missing | ContactLookup::Unresolved => None,
        }
    }

    async fn lookup_contact(&mut self, field: &str, value: &str) -> ContactLookup {
        let mut params = Params::new();
        params.insert(field.to_string(), json!(value));

        match self.repository.get("Contact", params).await {
            Ok(response) if response.count == 1 => match response.single_id() {
                Some(id) => ContactLookup::Found(id),
                None => ContactLookup::Unresolved,
            },
            Ok(response) if response.count > 1 => {
                self.result.log_message(
                    &format!(
                        "{} contacts share {} '{}', none picked",
                        response.count, field, value
                    ),
                    Severity::Warning,
                    "contact",
                );
                ContactLookup::Unresolved
            }
            Ok(_) => ContactLookup::Missing,
            Err(e) => {
                self.repository_failed("Contact lookup", &e);
                ContactLookup::Unresolved
            }
        }
    }

    /// Looks the contact up by its natural key and creates it only when no
    /// contact carries that key. Ambiguous or failed lookups yield `None`.
    pub async fn get_or_create_contact(
        &mut self,
        key_field: &str,
        key_value: &str,
        mut params: Params,
    ) -> Option<i64> {
        match self.lookup_contact(key_field, key_value).await {
            ContactLookup::Found(id) => return Some(id),
            ContactLookup::Unresolved => return None,
            ContactLookup::Missing => {}
        }

        params.insert(key_field.to_string(), json!(key_value));
        match self.repository.create("Contact", params).await {
            Ok(response) => response.id,
            Err(e) => {
                self.repository_failed("Contact creation", &e);
                None
            }
        }
    }

    /// Adds an address, skipping exact duplicates. An existing address with
    /// the same location type is replaced.
    pub async fn create_address(
        &mut self,
        contact_id: i64,
        mut params: Params,
        location_type: &str,
    ) -> Result<Option<i64>, HandlerError> {
        let location_type_id = self
            .config
            .lookups()
            .resolve(self.repository, MetadataKind::LocationType, location_type)
            .await?;

        let mut filter = Params::new();
        filter.insert("contact_id".into(), json!(contact_id));
        let existing = match self.repository.get("Address", filter).await {
            Ok(response) => response.values,
            Err(e) => {
                self.repository_failed("Address lookup", &e);
                return Ok(None);
            }
        };

        if let Some(duplicate) = existing.iter().find(|a| same_address(a, &params)) {
            return Ok(entity_id(duplicate));
        }

        params.insert("contact_id".into(), json!(contact_id));
        params.insert("location_type_id".into(), json!(location_type_id));

        let same_type = existing
            .iter()
            .find(|a| a.get("location_type_id").and_then(Value::as_i64) == Some(location_type_id))
            .and_then(entity_id);

        let outcome = match same_type {
            Some(id) => self
                .repository
                .update("Address", id, params)
                .await
                .map(|r| r.id.or(Some(id))),
            None => self.repository.create("Address", params).await.map(|r| r.id),
        };

        match outcome {
            Ok(id) => Ok(id),
            Err(e) => {
                self.repository_failed("Address creation", &e);
                Ok(None)
            }
        }
    }

    pub async fn create_phone(
        &mut self,
        contact_id: i64,
        phone: &str,
        location_type: &str,
        phone_type: Option<&str>,
    ) -> Result<Option<i64>, HandlerError> {
        let location_type_id = self
            .config
            .lookups()
            .resolve(self.repository, MetadataKind::LocationType, location_type)
            .await?;

        let mut params = Params::new();
        params.insert("contact_id".into(), json!(contact_id));
        params.insert("phone".into(), json!(phone));

        match self.repository.get("Phone", params.clone()).await {
            Ok(response) if response.count > 0 => return Ok(response.first().and_then(entity_id)),
            Ok(_) => {}
            Err(e) => {
                self.repository_failed("Phone lookup", &e);
                return Ok(None);
            }
        }

        params.insert("location_type_id".into(), json!(location_type_id));
        if let Some(kind) = phone_type {
            params.insert("phone_type".into(), json!(kind));
        }

        match self.repository.create("Phone", params).await {
            Ok(response) => Ok(response.id),
            Err(e) => {
                self.repository_failed("Phone creation", &e);
                Ok(None)
            }
        }
    }

    pub async fn create_activity(&mut self, spec: ActivitySpec) -> Result<Option<i64>, HandlerError> {
        let config = self.config;
        let lookups = config.lookups();
        let type_id = lookups
            .resolve(self.repository, MetadataKind::ActivityType, &spec.activity_type)
            .await?;

        let mut params = Params::new();
        params.insert("activity_type_id".into(), json!(type_id));
        params.insert("subject".into(), json!(spec.subject));

        let date = spec.date.unwrap_or_else(|| Local::now().naive_local());
        params.insert("activity_date_time".into(), json!(date.format(DATE_FORMAT).to_string()));

        if let Some(status) = &spec.status {
            let status_id = lookups
                .resolve(self.repository, MetadataKind::ActivityStatus, status)
                .await?;
            params.insert("status_id".into(), json!(status_id));
        }
        if let Some(details) = spec.details {
            params.insert("details".into(), json!(details));
        }
        if let Some(source) = spec.source_contact_id {
            params.insert("source_contact_id".into(), json!(source));
        }
        if !spec.target_contact_ids.is_empty() {
            params.insert("target_contact_id".into(), json!(spec.target_contact_ids));
        }
        if !spec.assignee_contact_ids.is_empty() {
            params.insert("assignee_contact_id".into(), json!(spec.assignee_contact_ids));
        }
        params.extend(spec.custom_fields);

        match self.repository.create("Activity", params).await {
            Ok(response) => Ok(response.id),
            Err(e) => {
                self.repository_failed("Activity creation", &e);
                Ok(None)
            }
        }
    }

    fn repository_failed(&mut self, action: &str, err: &RepositoryError) {
        self.result.log_message(
            &format!("{} failed: {}", action, err),
            Severity::Error,
            "repository",
        );
    }
}

fn entity_id(values: &Params) -> Option<i64> {
    values.get("id").and_then(Value::as_i64)
}

fn field_text(values: &Params, key: &str) -> String {
    match values.get(key) {
        Some(Value::String(s)) => s.trim().to_lowercase(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

fn same_address(existing: &Params, candidate: &Params) -> bool {
    ADDRESS_KEYS
        .iter()
        .all(|key| field_text(existing, key) == field_text(candidate, key))
}
