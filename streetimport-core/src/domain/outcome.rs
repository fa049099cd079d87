// streetimport-core/src/domain/outcome.rs

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ImportError;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Default)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Debug,
    #[default]
    Info,
    Warning,
    Error,
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Severity::Debug => "debug",
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Fatal => "fatal",
        };
        f.write_str(label)
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "debug" => Ok(Severity::Debug),
            "info" => Ok(Severity::Info),
            "warning" | "warn" => Ok(Severity::Warning),
            "error" => Ok(Severity::Error),
            "fatal" => Ok(Severity::Fatal),
            other => Err(format!("unknown severity '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub severity: Severity,
    /// Free-form category, usually the handler or component name.
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_id: Option<String>,
    pub message: String,
}

/// Terminal summary of one import run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResult {
    pub is_error: bool,
    pub message: String,
    pub imported: usize,
    pub failed: usize,
    pub total: usize,
}

/// Outcome log of one import run.
///
/// Bookkeeping is deliberately asymmetric: a failure for an id erases an
/// earlier success, but a later success never clears a recorded failure.
#[derive(Debug)]
pub struct ImportResult {
    threshold: Severity,
    successes: BTreeSet<String>,
    failures: BTreeMap<String, String>,
    entries: Vec<LogEntry>,
    max_severity: Option<Severity>,
}

impl Default for ImportResult {
    fn default() -> Self {
        Self::new(Severity::Info)
    }
}

impl ImportResult {
    pub fn new(threshold: Severity) -> Self {
        Self {
            threshold,
            successes: BTreeSet::new(),
            failures: BTreeMap::new(),
            entries: Vec::new(),
            max_severity: None,
        }
    }

    /// Records the terminal outcome of one record.
    pub fn log_import(&mut self, id: &str, success: bool, kind: &str, message: &str) {
        if success {
            if !self.failures.contains_key(id) {
                self.successes.insert(id.to_string());
            }
            self.push(Severity::Info, kind, Some(id), message);
        } else {
            self.successes.remove(id);
            self.failures.insert(id.to_string(), message.to_string());
            self.push(Severity::Error, kind, Some(id), message);
        }
    }

    pub fn record_success(&mut self, id: &str, kind: &str, message: &str) {
        self.log_import(id, true, kind, message);
    }

    pub fn record_failure(&mut self, id: &str, kind: &str, message: &str) {
        self.log_import(id, false, kind, message);
    }

    pub fn log_message(&mut self, message: &str, severity: Severity, kind: &str) {
        self.push(severity, kind, None, message);
    }

    /// Logs at fatal level and hands back the error that unwinds to the run boundary.
    #[must_use = "the returned error has to be propagated to end the run"]
    pub fn abort(&mut self, message: impl Into<String>) -> ImportError {
        let message = message.into();
        self.push(Severity::Fatal, "abort", None, &message);
        ImportError::Aborted(message)
    }

    fn push(&mut self, severity: Severity, kind: &str, record_id: Option<&str>, message: &str) {
        mirror_to_tracing(severity, kind, record_id, message);

        // Watermark moves even when the entry itself is filtered out.
        self.max_severity = Some(self.max_severity.map_or(severity, |m| m.max(severity)));

        // The threshold is inclusive: `log-level: warning` keeps warnings.
        if severity >= self.threshold {
            self.entries.push(LogEntry {
                timestamp: Utc::now(),
                severity,
                kind: kind.to_string(),
                record_id: record_id.map(str::to_string),
                message: message.to_string(),
            });
        }
    }

    pub fn is_success(&self, id: &str) -> bool {
        self.successes.contains(id)
    }

    pub fn is_failure(&self, id: &str) -> bool {
        self.failures.contains_key(id)
    }

    pub fn successes(&self) -> impl Iterator<Item = &str> {
        self.successes.iter().map(String::as_str)
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &str)> {
        self.failures.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn success_count(&self) -> usize {
        self.successes.len()
    }

    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn max_severity(&self) -> Option<Severity> {
        self.max_severity
    }

    pub fn is_fatal(&self) -> bool {
        self.max_severity == Some(Severity::Fatal)
    }

    pub fn tally(&self) -> String {
        format!(
            "{} of {} records imported.",
            self.success_count(),
            self.success_count() + self.failure_count()
        )
    }

    pub fn to_api_result(&self) -> ApiResult {
        let tally = self.tally();
        let message = if self.is_fatal() {
            let fatal: Vec<&str> = self
                .entries
                .iter()
                .filter(|e| e.severity == Severity::Fatal)
                .map(|e| e.message.as_str())
                .collect();
            format!("{} {}", fatal.join("; "), tally)
        } else {
            tally
        };

        ApiResult {
            is_error: self.is_fatal(),
            message,
            imported: self.success_count(),
            failed: self.failure_count(),
            total: self.success_count() + self.failure_count(),
        }
    }
}

fn mirror_to_tracing(severity: Severity, kind: &str, record_id: Option<&str>, message: &str) {
    let record = record_id.unwrap_or("-");
    match severity {
        Severity::Debug => tracing::debug!(kind, record, "{}", message),
        Severity::Info => tracing::info!(kind, record, "{}", message),
        Severity::Warning => tracing::warn!(kind, record, "{}", message),
        Severity::Error | Severity::Fatal => {
            tracing::error!(kind, record, severity = %severity, "{}", message)
        }
    }
}
