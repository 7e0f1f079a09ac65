//! Source-file predicate applied to diff headers.
//!
//! Only diff blocks whose path carries one of the configured extensions are
//! analyzed; READMEs, lock files, configs and other non-code artifacts are
//! ignored.

use patchscan_core::{PatchscanError, ScanConfig};

/// Decides whether a path in a diff header names a tracked source file.
///
/// # Examples
///
/// ```
/// use patchscan_difflens::filter::SourceFilter;
///
/// let filter = SourceFilter::default_filter();
/// assert!(filter.matches_path("a/pkg/module.py"));
/// assert!(!filter.matches_path("a/setup.cfg"));
/// ```
#[derive(Debug, Clone)]
pub struct SourceFilter {
    patterns: Vec<glob::Pattern>,
}

impl SourceFilter {
    /// Build a filter from bare extensions (`"py"`, `".pyi"`).
    ///
    /// # Errors
    ///
    /// Returns [`PatchscanError::Config`] if the list is empty or an
    /// extension is blank.
    ///
    /// # Examples
    ///
    /// ```
    /// use patchscan_difflens::filter::SourceFilter;
    ///
    /// let filter = SourceFilter::new(&["py", ".pyi"]).unwrap();
    /// assert!(filter.matches_path("b/stubs/os.pyi"));
    /// assert!(SourceFilter::new::<&str>(&[]).is_err());
    /// ```
    pub fn new<S: AsRef<str>>(extensions: &[S]) -> Result<Self, PatchscanError> {
        if extensions.is_empty() {
            return Err(PatchscanError::Config(
                "at least one source extension is required".into(),
            ));
        }

        let mut patterns = Vec::with_capacity(extensions.len());
        for ext in extensions {
            let ext = ext.as_ref().trim().trim_start_matches('.');
            if ext.is_empty() {
                return Err(PatchscanError::Config("empty source extension".into()));
            }
            let raw = format!("*.{}", glob::Pattern::escape(ext));
            let pattern = glob::Pattern::new(&raw).map_err(|e| {
                PatchscanError::Config(format!("invalid extension pattern {raw}: {e}"))
            })?;
            patterns.push(pattern);
        }

        Ok(Self { patterns })
    }

    /// Python-only filter.
    pub fn default_filter() -> Self {
        Self {
            patterns: vec![glob::Pattern::new("*.py").expect("static pattern")],
        }
    }

    /// Build a filter from scan configuration.
    ///
    /// # Errors
    ///
    /// Same as [`SourceFilter::new`].
    pub fn from_config(config: &ScanConfig) -> Result<Self, PatchscanError> {
        Self::new(&config.extensions)
    }

    /// Whether `path` ends in one of the tracked extensions.
    pub fn matches_path(&self, path: &str) -> bool {
        self.patterns.iter().any(|p| p.matches(path))
    }
}
