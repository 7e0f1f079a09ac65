use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::PatchscanError;

/// Top-level configuration loaded from `.patchscan.toml`.
///
/// Supports layered resolution: CLI flags > local config > defaults.
///
/// # Examples
///
/// ```
/// use patchscan_core::PatchscanConfig;
///
/// let config = PatchscanConfig::default();
/// assert_eq!(config.scan.extensions, vec!["py"]);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatchscanConfig {
    /// Which diff blocks are analyzed.
    #[serde(default)]
    pub scan: ScanConfig,
    /// Where and how results are written.
    #[serde(default)]
    pub output: OutputConfig,
}

impl PatchscanConfig {
    /// Load configuration from a TOML file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`PatchscanError::Io`] if the file cannot be read, or
    /// [`PatchscanError::Toml`] if the content is not valid TOML.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use patchscan_core::PatchscanConfig;
    /// use std::path::Path;
    ///
    /// let config = PatchscanConfig::from_file(Path::new(".patchscan.toml")).unwrap();
    /// ```
    pub fn from_file(path: &Path) -> Result<Self, PatchscanError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`PatchscanError::Toml`] if parsing fails, or
    /// [`PatchscanError::Config`] if the scan section lists no extensions.
    ///
    /// # Examples
    ///
    /// ```
    /// use patchscan_core::PatchscanConfig;
    ///
    /// let toml = r#"
    /// [scan]
    /// extensions = ["py", "pyi"]
    /// "#;
    /// let config = PatchscanConfig::from_toml(toml).unwrap();
    /// assert_eq!(config.scan.extensions.len(), 2);
    /// ```
    pub fn from_toml(content: &str) -> Result<Self, PatchscanError> {
        let config: Self = toml::from_str(content)?;
        if config.scan.extensions.is_empty() {
            return Err(PatchscanError::Config(
                "scan.extensions must name at least one extension".into(),
            ));
        }
        Ok(config)
    }
}

/// Diff block selection settings.
///
/// # Examples
///
/// ```
/// use patchscan_core::ScanConfig;
///
/// let config = ScanConfig::default();
/// assert_eq!(config.extensions, vec!["py"]);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Extensions (without the dot) of files whose diff blocks are tracked.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

fn default_extensions() -> Vec<String> {
    vec!["py".into()]
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
        }
    }
}

/// Output artifact settings.
///
/// # Examples
///
/// ```
/// use patchscan_core::OutputConfig;
/// use std::path::PathBuf;
///
/// let config = OutputConfig::default();
/// assert_eq!(config.extract_path, PathBuf::from("extract.json"));
/// assert_eq!(config.chart_path, PathBuf::from("analysis.svg"));
/// assert!(!config.pretty);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Destination of the change-record document (default: `extract.json`).
    #[serde(default = "default_extract_path")]
    pub extract_path: PathBuf,
    /// Destination of the keyword bar chart (default: `analysis.svg`).
    #[serde(default = "default_chart_path")]
    pub chart_path: PathBuf,
    /// Title rendered at the top of the chart.
    #[serde(default = "default_chart_title")]
    pub chart_title: String,
    /// Pretty-print the JSON document (default: false).
    #[serde(default)]
    pub pretty: bool,
}

fn default_extract_path() -> PathBuf {
    PathBuf::from("extract.json")
}

fn default_chart_path() -> PathBuf {
    PathBuf::from("analysis.svg")
}

fn default_chart_title() -> String {
    "Repository patch analysis".into()
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            extract_path: default_extract_path(),
            chart_path: default_chart_path(),
            chart_title: default_chart_title(),
            pretty: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let config = PatchscanConfig::default();
        assert_eq!(config.scan.extensions, vec!["py"]);
        assert_eq!(config.output.extract_path, PathBuf::from("extract.json"));
        assert_eq!(config.output.chart_path, PathBuf::from("analysis.svg"));
        assert_eq!(config.output.chart_title, "Repository patch analysis");
        assert!(!config.output.pretty);
    }

    #[test]
    fn empty_toml_gives_defaults() {
        let config = PatchscanConfig::from_toml("").unwrap();
        assert_eq!(config.scan.extensions, vec!["py"]);
        assert_eq!(config.output.extract_path, PathBuf::from("extract.json"));
    }

    #[test]
    fn parse_full_toml() {
        let toml = r#"
[scan]
extensions = ["py", "pyw"]

[output]
extract_path = "out/extract.json"
chart_path = "out/chart.svg"
chart_title = "Nightly"
pretty = true
"#;
        let config = PatchscanConfig::from_toml(toml).unwrap();
        assert_eq!(config.scan.extensions, vec!["py", "pyw"]);
        assert_eq!(
            config.output.extract_path,
            PathBuf::from("out/extract.json")
        );
        assert_eq!(config.output.chart_path, PathBuf::from("out/chart.svg"));
        assert_eq!(config.output.chart_title, "Nightly");
        assert!(config.output.pretty);
    }

    #[test]
    fn partial_output_section_keeps_other_defaults() {
        let toml = r#"
[output]
pretty = true
"#;
        let config = PatchscanConfig::from_toml(toml).unwrap();
        assert!(config.output.pretty);
        assert_eq!(config.output.chart_path, PathBuf::from("analysis.svg"));
        assert_eq!(config.scan.extensions, vec!["py"]);
    }

    #[test]
    fn empty_extension_list_is_rejected() {
        let result = PatchscanConfig::from_toml("[scan]\nextensions = []\n");
        assert!(matches!(result, Err(PatchscanError::Config(_))));
    }

    #[test]
    fn invalid_toml_returns_error() {
        let result = PatchscanConfig::from_toml("{{invalid}}");
        assert!(matches!(result, Err(PatchscanError::Toml(_))));
    }
}
