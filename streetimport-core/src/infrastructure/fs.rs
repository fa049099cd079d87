// streetimport-core/src/infrastructure/fs.rs

use crate::infrastructure::error::InfrastructureError;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Write content to a file atomically using a temporary file.
///
/// The temporary file lives in the target directory so the final rename
/// never crosses filesystems. Readers see either the old or the new content.
pub fn atomic_write<P: AsRef<Path>, C: AsRef<[u8]>>(
    path: P,
    content: C,
) -> Result<(), InfrastructureError> {
    let path = path.as_ref();
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;

    let mut temp_file = tempfile::NamedTempFile::new_in(parent)?;
    temp_file.write_all(content.as_ref())?;
    temp_file
        .persist(path)
        .map_err(|e| InfrastructureError::Io(e.error))?;

    Ok(())
}

/// Moves `file` into `folder` (created on demand) and returns the new path.
/// An existing file of the same name gets a numeric suffix instead of being overwritten.
pub fn move_into(file: &Path, folder: &Path) -> Result<PathBuf, InfrastructureError> {
    fs::create_dir_all(folder)?;

    let name = file
        .file_name()
        .ok_or_else(|| InfrastructureError::ConfigError(format!("{:?} has no file name", file)))?;

    let mut target = folder.join(name);
    let mut i = 1;
    while target.exists() {
        let stem = file.file_stem().unwrap_or_default().to_string_lossy();
        let ext = file
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();
        target = folder.join(format!("{}_{}{}", stem, i, ext));
        i += 1;
    }

    fs::rename(file, &target)?;
    Ok(target)
}
