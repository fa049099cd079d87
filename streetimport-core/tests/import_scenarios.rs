use anyhow::Result;
use async_trait::async_trait;
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

use streetimport_core::application::{builtin_registry, import_file, run_file, RunState};
use streetimport_core::domain::configuration::{
    DomainConfig, DomainProfile, DomainRegistry, ImportConfig,
};
use streetimport_core::domain::{
    DomainError, HandlerContext, HandlerError, ImportResult, Record, RecordHandler,
};
use streetimport_core::infrastructure::adapters::InMemoryRepository;
use streetimport_core::infrastructure::settings::{JsonFileSettingsStore, MemorySettingsStore};

/// Rejects rows with an empty `name`, accepts everything else. Never touches the repository.
struct NameRequired;

#[async_trait]
impl RecordHandler for NameRequired {
    fn name(&self) -> &str {
        "NameRequired"
    }

    fn can_process_record(&self, record: &Record, _: &Path) -> bool {
        record.contains("amount")
    }

    async fn process_record(
        &mut self,
        record: &Record,
        _: &Path,
        ctx: &mut HandlerContext<'_>,
    ) -> Result<(), HandlerError> {
        if !record.has_value("name") {
            return Err(HandlerError::Record("name is empty".into()));
        }
        ctx.result.record_success(record.id(), self.name(), "accepted");
        Ok(())
    }
}

struct Donations;

impl DomainProfile for Donations {
    fn id(&self) -> &str {
        "donations"
    }

    fn handlers(&self, _: &DomainConfig) -> Result<Vec<Box<dyn RecordHandler>>, DomainError> {
        Ok(vec![Box::new(NameRequired)])
    }
}

struct Workspace {
    _tmp: TempDir,
    root: PathBuf,
}

impl Workspace {
    fn new() -> Result<Self> {
        let tmp = tempfile::tempdir()?;
        let root = tmp.path().to_path_buf();
        Ok(Self { _tmp: tmp, root })
    }

    fn file(&self, name: &str, content: &str) -> Result<PathBuf> {
        let path = self.root.join(name);
        fs::write(&path, content)?;
        Ok(path)
    }
}

fn donations_config() -> Result<DomainConfig> {
    let registry = DomainRegistry::new().with(Arc::new(Donations));
    Ok(DomainConfig::load(
        ImportConfig::default(),
        Arc::new(MemorySettingsStore::new()),
        registry,
    )?)
}

#[tokio::test]
async fn test_three_rows_two_imported() -> Result<()> {
    let ws = Workspace::new()?;
    let path = ws.file("donations.csv", "id;name;amount\n1;Alice;10\n2;;20\n3;Bob;\n")?;
    let config = donations_config()?;
    let repo = InMemoryRepository::new();

    let mut result = ImportResult::new(config.log_threshold());
    let state = run_file(path, &config, &repo, &mut result).await;

    assert_eq!(state, RunState::Completed);
    assert!(result.is_success("1"));
    assert!(result.is_failure("2"));
    assert!(result.is_success("3"));

    let api = result.to_api_result();
    assert!(!api.is_error);
    assert_eq!(api.message, "2 of 3 records imported.");
    Ok(())
}

#[tokio::test]
async fn test_blank_id_column_falls_back_to_line_number() -> Result<()> {
    let ws = Workspace::new()?;
    let path = ws.file("donations.csv", "id;name;amount\n;Alice;10\n;Bob;20\n ;Carl;30\n")?;
    let config = donations_config()?;

    let mut result = ImportResult::new(config.log_threshold());
    run_file(path, &config, &InMemoryRepository::new(), &mut result).await;

    assert!(result.is_success("2"));
    assert!(result.is_success("3"));
    assert!(result.is_success("4"));
    assert_eq!(result.to_api_result().message, "3 of 3 records imported.");
    Ok(())
}

#[tokio::test]
async fn test_rerun_gives_identical_tally() -> Result<()> {
    let ws = Workspace::new()?;
    let path = ws.file("donations.csv", "id;name;amount\n1;Alice;10\n2;;20\n3;Bob;\n")?;
    let config = donations_config()?;
    let repo = InMemoryRepository::new();

    let first = import_file(&path, &config, &repo).await;
    let second = import_file(&path, &config, &repo).await;
    assert_eq!(first, second);
    Ok(())
}

#[tokio::test]
async fn test_header_only_file_is_a_success() -> Result<()> {
    let ws = Workspace::new()?;
    let path = ws.file("empty.csv", "id;name;amount\n")?;
    let config = donations_config()?;

    let api = import_file(&path, &config, &InMemoryRepository::new()).await;

    assert!(!api.is_error);
    assert_eq!(api.message, "0 of 0 records imported.");
    Ok(())
}

#[tokio::test]
async fn test_unreadable_path_is_a_fatal_summary() -> Result<()> {
    let ws = Workspace::new()?;
    let config = donations_config()?;

    let mut result = ImportResult::default();
    let state = run_file(ws.root.join("missing.csv"), &config, &InMemoryRepository::new(), &mut result).await;

    assert_eq!(state, RunState::Aborted);
    assert_eq!(result.success_count() + result.failure_count(), 0);
    let api = result.to_api_result();
    assert!(api.is_error);
    assert!(api.message.contains("Unable to open file"));
    assert!(api.message.ends_with("0 of 0 records imported."));
    Ok(())
}

#[tokio::test]
async fn test_outcomes_never_exceed_rows() -> Result<()> {
    let ws = Workspace::new()?;
    // Row 3 has no amount column at all, so no handler claims it.
    let path = ws.file("mixed.csv", "id;name;amount\n1;Alice;10\n2;Bob\n3;;5\n")?;
    let config = donations_config()?;

    let api = import_file(&path, &config, &InMemoryRepository::new()).await;

    assert_eq!(api.total, 2);
    assert_eq!(api.message, "1 of 2 records imported.");
    Ok(())
}

#[tokio::test]
async fn test_generic_domain_end_to_end() -> Result<()> {
    let ws = Workspace::new()?;
    let path = ws.file(
        "street_2024.csv",
        "external_identifier;first_name;last_name;street_address;postal_code;city;phone\n\
         D-1;Ann;Peeters;Kerkstraat 1;9000;Gent;0470 11 22 33\n\
         D-2;Bert;;Dorp 2;9300;Aalst;\n\
         D-1;Ann;Peeters;Kerkstraat 1;9000;Gent;0470 11 22 33\n",
    )?;
    let store = Arc::new(JsonFileSettingsStore::new(ws.root.join("settings.json")));
    let mut config = DomainConfig::load(ImportConfig::default(), store.clone(), builtin_registry())?;
    config.set_setting(["contact", "location_type"], json!("Work"))?;
    config.store_settings()?;

    let repo = InMemoryRepository::with_reference_data();
    let api = import_file(&path, &config, &repo).await;

    assert_eq!(api.message, "2 of 3 records imported.");
    assert_eq!(repo.entities("Contact").len(), 1);
    assert_eq!(repo.entities("Address").len(), 1);
    assert_eq!(repo.entities("Phone").len(), 1);
    assert_eq!(repo.entities("Activity").len(), 2);

    let reloaded = DomainConfig::load(ImportConfig::default(), store, builtin_registry())?;
    assert_eq!(
        reloaded.get_setting(["contact", "location_type"], json!("Home")),
        json!("Work")
    );
    Ok(())
}

#[tokio::test]
async fn test_domain_delimiter_setting_is_used() -> Result<()> {
    let ws = Workspace::new()?;
    let path = ws.file("comma.csv", "id,name,amount\n1,Alice,10\n")?;
    let mut config = donations_config()?;
    config.set_setting(["data_source", "delimiter"], json!(","))?;

    let api = import_file(&path, &config, &InMemoryRepository::new()).await;
    assert_eq!(api.message, "1 of 1 records imported.");
    Ok(())
}
