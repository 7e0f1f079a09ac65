use std::path::PathBuf;

/// Errors that can occur while scanning patches.
///
/// Library crates use this type directly; the binary reports it through
/// `miette` at the boundary.
///
/// # Examples
///
/// ```
/// use patchscan_core::PatchscanError;
///
/// let err = PatchscanError::Config("unknown extension".into());
/// assert!(err.to_string().contains("unknown extension"));
/// ```
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum PatchscanError {
    /// Filesystem I/O failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid or missing configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// JSON serialization / deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML deserialization failure.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// A required file or directory was not found.
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// An output artifact could not be written, even after creating its directory.
    #[error("failed to write {}: {source}", .path.display())]
    #[diagnostic(help("check that the output location is writable"))]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_converts() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: PatchscanError = io_err.into();
        assert!(err.to_string().contains("gone"));
    }

    #[test]
    fn config_error_displays_message() {
        let err = PatchscanError::Config("bad value".into());
        assert_eq!(err.to_string(), "configuration error: bad value");
    }

    #[test]
    fn file_not_found_shows_path() {
        let err = PatchscanError::FileNotFound(PathBuf::from("/tmp/PR_DATA"));
        assert!(err.to_string().contains("/tmp/PR_DATA"));
    }

    #[test]
    fn output_error_names_destination() {
        let err = PatchscanError::Output {
            path: PathBuf::from("/nope/extract.json"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        let msg = err.to_string();
        assert!(msg.contains("/nope/extract.json"));
        assert!(msg.contains("denied"));
    }
}
