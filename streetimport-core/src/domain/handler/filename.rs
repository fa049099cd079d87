// streetimport-core/src/domain/handler/filename.rs

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use regex::Regex;

/// Metadata encoded in an import file name, e.g. `TM_summer_20240501.csv`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileNameInfo {
    pub file_name: String,
    /// Named capture groups of the pattern.
    pub parts: BTreeMap<String, String>,
}

impl FileNameInfo {
    pub fn parse(path: &Path, pattern: &Regex) -> Option<Self> {
        let file_name = path.file_name()?.to_str()?;
        let captures = pattern.captures(file_name)?;

        let parts = pattern
            .capture_names()
            .flatten()
            .filter_map(|name| {
                captures
                    .name(name)
                    .map(|m| (name.to_string(), m.as_str().to_string()))
            })
            .collect();

        Some(Self {
            file_name: file_name.to_string(),
            parts,
        })
    }

    pub fn part(&self, name: &str) -> Option<&str> {
        self.parts.get(name).map(String::as_str)
    }
}

/// Memoizes file-name parsing per source path for the lifetime of a handler.
#[derive(Debug)]
pub struct FileNameCache {
    pattern: Regex,
    parsed: Mutex<HashMap<PathBuf, Option<FileNameInfo>>>,
}

impl FileNameCache {
    pub fn new(pattern: Regex) -> Self {
        Self {
            pattern,
            parsed: Mutex::new(HashMap::new()),
        }
    }

    pub fn pattern(&self) -> &Regex {
        &self.pattern
    }

    pub fn get(&self, path: &Path) -> Option<FileNameInfo> {
        let Ok(mut parsed) = self.parsed.lock() else {
            // Poisoned lock: parse without memoizing.
            return FileNameInfo::parse(path, &self.pattern);
        };
        parsed
            .entry(path.to_path_buf())
            .or_insert_with(|| FileNameInfo::parse(path, &self.pattern))
            .clone()
    }

    pub fn matches(&self, path: &Path) -> bool {
        self.get(path).is_some()
    }
}
