//! Persistence of the change-record document.

use std::path::Path;

use patchscan_core::{FileChangeSet, PatchscanError};

/// Serialize `change_sets` as a JSON array of `{file_name, changes}` and
/// write it to `path`.
///
/// # Errors
///
/// Returns [`PatchscanError::Serialization`] if encoding fails, or
/// [`PatchscanError::Output`] if the file cannot be written.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
/// use patchscan_analysis::output::write_extract;
///
/// write_extract(Path::new("extract.json"), &[], false).unwrap();
/// ```
pub fn write_extract(
    path: &Path,
    change_sets: &[FileChangeSet],
    pretty: bool,
) -> Result<(), PatchscanError> {
    let json = if pretty {
        serde_json::to_string_pretty(change_sets)?
    } else {
        serde_json::to_string(change_sets)?
    };
    write_with_retry(path, json.as_bytes())
}

/// Write `contents` to `path`. If the first attempt fails, create the parent
/// directory and try once more.
pub(crate) fn write_with_retry(path: &Path, contents: &[u8]) -> Result<(), PatchscanError> {
    let first = match std::fs::write(path, contents) {
        Ok(()) => return Ok(()),
        Err(e) => e,
    };
    tracing::debug!(path = %path.display(), "write failed ({first}), creating parent and retrying");

    let output_err = |source| PatchscanError::Output {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(output_err)?;
    }
    std::fs::write(path, contents).map_err(output_err)
}
