// streetimport-core/src/application/dispatcher.rs

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::domain::configuration::DomainConfig;
use crate::domain::handler::{HandlerContext, HandlerError, RecordHandler};
use crate::domain::outcome::{ApiResult, ImportResult, Severity};
use crate::domain::record::Record;
use crate::error::ImportError;
use crate::infrastructure::datasource::{CsvDataSource, CsvOptions};
use crate::ports::data_source::DataSource;
use crate::ports::repository::EntityRepository;

pub const STOP_IF_NO_HANDLER: &str = "stop_processing_if_no_handler_found";
pub const ALLOW_MULTIPLE_HANDLERS: &str = "allow_processing_by_multiple_handlers";

/// How the dispatcher treats unmatched records and records several handlers could take.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchPolicy {
    pub stop_if_no_handler: bool,
    pub allow_multiple_handlers: bool,
}

impl DispatchPolicy {
    pub fn from_config(config: &DomainConfig) -> Self {
        Self {
            stop_if_no_handler: config.setting_bool(STOP_IF_NO_HANDLER, false),
            allow_multiple_handlers: config.setting_bool(ALLOW_MULTIPLE_HANDLERS, false),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    Init,
    Open,
    Dispatching,
    Completed,
    Aborted,
}

/// Chain of responsibility over an ordered handler list.
pub struct Dispatcher<'a> {
    config: &'a DomainConfig,
    repository: &'a dyn EntityRepository,
    handlers: Vec<Box<dyn RecordHandler>>,
    policy: DispatchPolicy,
    state: RunState,
}

impl<'a> Dispatcher<'a> {
    /// Dispatcher over the active domain's handler set and policies.
    pub fn for_active_domain(
        config: &'a DomainConfig,
        repository: &'a dyn EntityRepository,
    ) -> Result<Self, ImportError> {
        let handlers = config.handlers()?;
        Ok(Self::with_handlers(config, repository, handlers))
    }

    pub fn with_handlers(
        config: &'a DomainConfig,
        repository: &'a dyn EntityRepository,
        handlers: Vec<Box<dyn RecordHandler>>,
    ) -> Self {
        Self {
            config,
            repository,
            handlers,
            policy: DispatchPolicy::from_config(config),
            state: RunState::Init,
        }
    }

    pub fn with_policy(mut self, policy: DispatchPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> DispatchPolicy {
        self.policy
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn handler_names(&self) -> Vec<&str> {
        self.handlers.iter().map(|h| h.name()).collect()
    }

    /// Runs the whole source. Never fails: aborts are recorded on `result`.
    #[instrument(skip_all, fields(uri = %source.uri().display()))]
    pub async fn run(&mut self, source: &mut dyn DataSource, result: &mut ImportResult) -> RunState {
        match self.drive(source, result).await {
            Ok(()) => {
                self.state = RunState::Completed;
                info!(summary = %result.tally(), "Import completed");
            }
            Err(e) => {
                // Errors other than aborts have not been logged yet.
                if !e.is_abort() {
                    let _ = result.abort(e.to_string());
                }
                self.state = RunState::Aborted;
                warn!(error = %e, "Import aborted");
            }
        }
        source.close();
        self.state
    }

    async fn drive(
        &mut self,
        source: &mut dyn DataSource,
        result: &mut ImportResult,
    ) -> Result<(), ImportError> {
        self.state = RunState::Open;
        source.reset(result)?;

        self.state = RunState::Dispatching;
        let path = source.uri().to_path_buf();
        while source.has_next() {
            let Some(record) = source.next(result)? else {
                break;
            };
            self.dispatch(&record, &path, result).await?;
        }
        Ok(())
    }

    async fn dispatch(
        &mut self,
        record: &Record,
        source: &Path,
        result: &mut ImportResult,
    ) -> Result<(), ImportError> {
        let mut matched = false;

        for handler in self.handlers.iter_mut() {
            if !handler.can_process_record(record, source) {
                continue;
            }
            matched = true;
            debug!(handler = handler.name(), record = record.id(), "Handler claimed record");

            let mut ctx = HandlerContext::new(self.repository, self.config, result);
            match handler.process_record(record, source, &mut ctx).await {
                Ok(()) => {}
                Err(HandlerError::Record(message)) => {
                    result.log_import(record.id(), false, handler.name(), &message);
                }
                Err(HandlerError::Fatal(message)) => {
                    return Err(result.abort(format!(
                        "{} stopped the import at record {}: {}",
                        handler.name(),
                        record.id(),
                        message
                    )));
                }
            }

            if !self.policy.allow_multiple_handlers {
                break;
            }
        }

        if !matched {
            if self.policy.stop_if_no_handler {
                return Err(result.abort(format!(
                    "No handler found for record {} (line {})",
                    record.id(),
                    record.line_number().unwrap_or_default()
                )));
            }
            // Skipped records count neither as success nor as failure.
            result.log_message(
                &format!("No handler found for record {}, skipped", record.id()),
                Severity::Debug,
                "dispatcher",
            );
        }
        Ok(())
    }
}

/// Entry point: imports one file with the active domain and returns its summary.
#[instrument(skip(config, repository))]
pub async fn import_file(
    path: &Path,
    config: &DomainConfig,
    repository: &dyn EntityRepository,
) -> ApiResult {
    let mut result = ImportResult::new(config.log_threshold());
    run_file(path.to_path_buf(), config, repository, &mut result).await;
    result.to_api_result()
}

/// Same as [`import_file`] but hands back the full outcome log.
pub async fn run_file(
    path: PathBuf,
    config: &DomainConfig,
    repository: &dyn EntityRepository,
    result: &mut ImportResult,
) -> RunState {
    let options = match CsvOptions::from_config(config) {
        Ok(options) => options,
        Err(e) => {
            let _ = result.abort(format!("Invalid data source configuration: {}", e));
            return RunState::Aborted;
        }
    };

    let mut dispatcher = match Dispatcher::for_active_domain(config, repository) {
        Ok(dispatcher) => dispatcher,
        Err(e) => {
            let _ = result.abort(e.to_string());
            return RunState::Aborted;
        }
    };

    let mut source = CsvDataSource::new(path, options);
    dispatcher.run(&mut source, result).await
}
