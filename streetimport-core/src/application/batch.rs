// streetimport-core/src/application/batch.rs

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, instrument, warn};
use walkdir::WalkDir;

use crate::application::dispatcher::import_file;
use crate::domain::configuration::DomainConfig;
use crate::domain::outcome::{ApiResult, ImportResult};
use crate::error::ImportError;
use crate::infrastructure::error::InfrastructureError;
use crate::infrastructure::fs::{atomic_write, move_into};
use crate::ports::repository::EntityRepository;

#[derive(Debug, Clone, Serialize)]
pub struct FileImport {
    /// Final location of the file (processed or failed folder).
    pub file: PathBuf,
    pub result: ApiResult,
}

/// Imports every `*.csv` directly inside `dir`, one run per file, in file-name order.
///
/// Each file goes through the processing folder and ends up in the processed
/// or failed folder, next to a `<name>.result.json` summary.
#[instrument(skip(config, repository))]
pub async fn import_folder(
    dir: &Path,
    config: &DomainConfig,
    repository: &dyn EntityRepository,
) -> Result<Vec<FileImport>, ImportError> {
    if !dir.is_dir() {
        return Err(InfrastructureError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("Import folder {:?} does not exist", dir),
        ))
        .into());
    }

    let files: Vec<PathBuf> = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("csv"))
        })
        .collect();

    info!(count = files.len(), "Files queued for import");

    let mut imports = Vec::with_capacity(files.len());
    for file in files {
        imports.push(import_one(file, dir, config, repository).await);
    }

    Ok(imports)
}

/// One file through processing into processed or failed. File-system errors
/// end up in the returned summary so the rest of the batch still runs.
async fn import_one(
    file: PathBuf,
    dir: &Path,
    config: &DomainConfig,
    repository: &dyn EntityRepository,
) -> FileImport {
    let folders = &config.import_config().folders;

    let processing = match move_into(&file, &dir.join(&folders.processing)) {
        Ok(path) => path,
        Err(e) => {
            warn!(file = ?file, error = %e, "Unable to move file to processing");
            return FileImport {
                result: aborted_summary(format!("Unable to move {} to processing: {}", file.display(), e)),
                file,
            };
        }
    };

    let mut result = import_file(&processing, config, repository).await;
    let target = if result.is_error {
        warn!(file = ?file, message = %result.message, "Import failed");
        &folders.failed
    } else {
        &folders.processed
    };

    let done = match move_into(&processing, &dir.join(target)) {
        Ok(path) => path,
        Err(e) => {
            warn!(file = ?processing, error = %e, "Unable to move file out of processing");
            mark_error(&mut result, format!("Unable to move {} to {}: {}", processing.display(), target, e));
            // Second chance: the failed folder, else the file stays in processing.
            match move_into(&processing, &dir.join(&folders.failed)) {
                Ok(path) => path,
                Err(_) => processing,
            }
        }
    };

    if let Err(e) = write_summary(&done, &result) {
        warn!(file = ?done, error = %e, "Unable to write import summary");
        mark_error(&mut result, format!("Unable to write summary for {}: {}", done.display(), e));
    }

    FileImport { file: done, result }
}

fn write_summary(file: &Path, result: &ApiResult) -> Result<(), InfrastructureError> {
    let summary = serde_json::to_string_pretty(result).map_err(InfrastructureError::JsonError)?;
    atomic_write(PathBuf::from(format!("{}.result.json", file.display())), summary)
}

fn aborted_summary(message: String) -> ApiResult {
    let mut result = ImportResult::default();
    let _aborted = result.abort(message);
    result.to_api_result()
}

fn mark_error(result: &mut ApiResult, message: String) {
    result.is_error = true;
    result.message = format!("{}; {}", message, result.message);
}
