use crate::errors::{CheckerError, CheckerResult};
use serde::Serialize;
use std::path::Path;

pub const SOURCE_EXTENSIONS: &[&str] = &["py"];
pub const PYRE_CONFIGURATION_FILE: &str = ".pyre_configuration";

#[derive(Debug, Serialize)]
struct PyreConfiguration<'a> {
    site_package_search_strategy: &'a str,
    source_directories: Vec<&'a str>,
}

/// Removes a tool cache directory below `work_dir`. Returns `Ok(false)` when
/// there was nothing to remove.
pub fn clear_cache_dir(work_dir: &Path, name: &str) -> CheckerResult<bool> {
    let path = work_dir.join(name);
    match std::fs::remove_dir_all(&path) {
        Ok(()) => Ok(true),
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(error) => Err(CheckerError::Io(format!(
            "failed to remove {}: {}",
            path.to_string_lossy(),
            error
        ))),
    }
}

/// Writes the pyre project configuration that `pyre check` expects to find
/// in the directory it is launched from.
pub fn write_pyre_configuration(work_dir: &Path) -> CheckerResult<()> {
    let config = PyreConfiguration {
        site_package_search_strategy: "pep561",
        source_directories: vec!["."],
    };
    let mut content = serde_json::to_string(&config)?;
    content.push('\n');
    std::fs::write(work_dir.join(PYRE_CONFIGURATION_FILE), content)?;
    Ok(())
}

/// Bare names of the source files directly inside `work_dir`, sorted.
pub fn source_files(work_dir: &Path) -> CheckerResult<Vec<String>> {
    let entries = std::fs::read_dir(work_dir).map_err(|error| {
        CheckerError::Io(format!("failed to list {}: {}", work_dir.to_string_lossy(), error))
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let path = entry.path();
        let recognized = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| SOURCE_EXTENSIONS.contains(&ext))
            .unwrap_or(false);
        if recognized {
            files.push(entry.file_name().to_string_lossy().to_string());
        }
    }
    files.sort();
    Ok(files)
}
