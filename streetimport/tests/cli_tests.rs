use anyhow::{Context, Result};
use assert_cmd::prelude::*;
use predicates::prelude::*;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// Copy of the street_project fixture in a scratch directory.
struct StreetImportTestEnv {
    _tmp: TempDir,
    root: PathBuf,
}

impl StreetImportTestEnv {
    fn new() -> Result<Self> {
        let tmp = tempfile::tempdir()?;
        let fixture = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/street_project");

        let dest = tmp.path().join("street_project");
        Self::copy_dir(&fixture, &dest)?;

        Ok(Self {
            _tmp: tmp,
            root: dest,
        })
    }

    fn copy_dir(src: &Path, dst: &Path) -> std::io::Result<()> {
        let mut options = fs_extra::dir::CopyOptions::new();
        options.skip_exist = true;
        options.content_only = true;

        std::fs::create_dir_all(dst)?;
        fs_extra::dir::copy(src, dst, &options)
            .map(|_| ())
            .map_err(|e| std::io::Error::other(e.to_string()))
    }

    fn streetimport(&self) -> Command {
        let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("streetimport"));
        cmd.current_dir(&self.root);
        cmd.env_remove("STREETIMPORT_DOMAIN");
        cmd.env_remove("STREETIMPORT_SETTINGS_PATH");
        cmd.env_remove("STREETIMPORT_CONFIG_DIR");
        cmd
    }

    fn inbox_file(&self, name: &str) -> PathBuf {
        self.root.join("inbox").join(name)
    }
}

#[test]
fn test_import_reports_tally() -> Result<()> {
    let env = StreetImportTestEnv::new()?;

    env.streetimport()
        .arg("import")
        .arg(env.inbox_file("street_2024_03.csv"))
        .assert()
        .success()
        .stdout(predicate::str::contains("2 of 3 records imported."))
        .stdout(predicate::str::contains("Mandatory field(s) empty: last_name"));
    Ok(())
}

#[test]
fn test_import_dump_contains_created_entities() -> Result<()> {
    let env = StreetImportTestEnv::new()?;
    let dump = env.root.join("dump.json");

    env.streetimport()
        .arg("import")
        .arg(env.inbox_file("street_2024_03.csv"))
        .arg("--dump")
        .arg(&dump)
        .assert()
        .success();

    let content = std::fs::read_to_string(&dump).context("Dump file not written")?;
    let snapshot: Value = serde_json::from_str(&content)?;

    let count = |entity: &str| {
        snapshot
            .get(entity)
            .and_then(Value::as_array)
            .map(Vec::len)
            .unwrap_or_default()
    };
    assert_eq!(count("Contact"), 2, "Dump: {}", content);
    assert_eq!(count("Address"), 1);
    assert_eq!(count("Phone"), 2);
    assert_eq!(count("Activity"), 2);
    Ok(())
}

#[test]
fn test_import_wrong_delimiter_exits_with_error() -> Result<()> {
    let env = StreetImportTestEnv::new()?;

    env.streetimport()
        .arg("import")
        .arg(env.inbox_file("street_2024_04.csv"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("0 of 0 records imported."));
    Ok(())
}

#[test]
fn test_import_missing_file_exits_with_error() -> Result<()> {
    let env = StreetImportTestEnv::new()?;

    env.streetimport()
        .arg("import")
        .arg(env.inbox_file("nope.csv"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unable to open file"));
    Ok(())
}

#[test]
fn test_import_folder_sorts_files() -> Result<()> {
    let env = StreetImportTestEnv::new()?;

    env.streetimport()
        .arg("import-folder")
        .arg("inbox")
        .assert()
        .failure()
        .stdout(predicate::str::contains("2 files, 1 failed"));

    let inbox = env.root.join("inbox");
    assert!(inbox.join("processed/street_2024_03.csv").exists());
    assert!(inbox.join("processed/street_2024_03.csv.result.json").exists());
    assert!(inbox.join("failed/street_2024_04.csv").exists());
    assert!(!inbox.join("street_2024_03.csv").exists());

    let summary: Value = serde_json::from_str(&std::fs::read_to_string(
        inbox.join("processed/street_2024_03.csv.result.json"),
    )?)?;
    assert_eq!(summary["message"], "2 of 3 records imported.");
    assert_eq!(summary["is_error"], false);
    Ok(())
}

#[test]
fn test_settings_set_then_get() -> Result<()> {
    let env = StreetImportTestEnv::new()?;

    env.streetimport()
        .args(["settings", "get", "contact.location_type"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"Home\""));

    env.streetimport()
        .args(["settings", "set", "contact.location_type", "Work"])
        .assert()
        .success();

    env.streetimport()
        .args(["settings", "get", "contact.location_type"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"Work\""));

    assert!(env.root.join("settings.json").exists());
    Ok(())
}

#[test]
fn test_set_unknown_domain_fails() -> Result<()> {
    let env = StreetImportTestEnv::new()?;

    env.streetimport()
        .args(["settings", "set-domain", "does-not-exist"])
        .assert()
        .failure();
    assert!(!env.root.join("settings.json").exists());
    Ok(())
}

#[test]
fn test_domains_lists_generic() -> Result<()> {
    let env = StreetImportTestEnv::new()?;

    env.streetimport()
        .arg("domains")
        .assert()
        .success()
        .stdout(predicate::str::contains("generic"));
    Ok(())
}
