use std::path::{Path, PathBuf};

use patchscan_core::{FileChangeSet, KeywordTally, PatchscanError, ScanConfig};
use patchscan_difflens::filter::SourceFilter;
use patchscan_difflens::frequency::count_keywords;
use patchscan_difflens::parser::{changed_lines, extract_diff_blocks, DiffBlock};
use serde::Serialize;

use crate::classify::{classify_line, Classification};
use crate::record::ChangeSetBuilder;

/// Analysis of a single patch file.
///
/// # Examples
///
/// ```
/// use patchscan_analysis::pipeline::analyze_patch;
/// use patchscan_core::Keyword;
/// use patchscan_difflens::filter::SourceFilter;
///
/// let patch = "diff --git a/a.py b/a.py\n@@ -1 +1 @@\n+import os\n";
/// let report = analyze_patch("1.patch", patch, &SourceFilter::default_filter());
/// assert_eq!(report.change_set.unwrap().changes.len(), 1);
/// assert_eq!(report.tally.added(Keyword::Import), 1);
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct PatchReport {
    /// Classified records, absent when nothing matched.
    pub change_set: Option<FileChangeSet>,
    /// Keyword counts over every changed line of the patch.
    pub tally: KeywordTally,
    /// Number of tracked source-file blocks.
    pub blocks: usize,
    /// `raise`/`import` lines skipped for lacking an operand.
    pub malformed_lines: usize,
}

/// Aggregate result of analyzing a directory of patches.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    /// One entry per patch that produced records, in file-name order.
    pub change_sets: Vec<FileChangeSet>,
    /// Keyword counts summed over all patches.
    pub tally: KeywordTally,
    /// Patches read and analyzed.
    pub patches_scanned: usize,
    /// Patches that could not be read.
    pub patches_skipped: usize,
    /// `raise`/`import` lines skipped across all patches.
    pub malformed_lines: usize,
}

impl RunReport {
    /// Fold one patch into the run totals.
    pub fn absorb(&mut self, report: PatchReport) {
        self.patches_scanned += 1;
        self.malformed_lines += report.malformed_lines;
        self.tally.merge(&report.tally);
        if let Some(set) = report.change_set {
            self.change_sets.push(set);
        }
    }

    /// Total number of change records across all sets.
    pub fn record_count(&self) -> usize {
        self.change_sets.iter().map(|s| s.changes.len()).sum()
    }
}

/// Classify every line of `blocks`, producing the change set for `file_name`.
///
/// Returns the set (if any line matched) and the number of malformed lines
/// that were skipped.
pub fn classify_blocks(file_name: &str, blocks: &[DiffBlock]) -> (Option<FileChangeSet>, usize) {
    let mut builder = ChangeSetBuilder::new(file_name);
    let mut malformed = 0;

    for block in blocks {
        for line in &block.lines {
            match classify_line(line) {
                Classification::Statement(fields) => builder.push(line.polarity, fields),
                Classification::Malformed(kind) => {
                    malformed += 1;
                    tracing::warn!(
                        patch = file_name,
                        file = %block.path,
                        line = %line,
                        "skipping {kind} statement with no operand"
                    );
                }
                Classification::Unmatched => {}
            }
        }
    }

    (builder.finish(), malformed)
}

/// Run block extraction, classification, and keyword counting over one patch.
pub fn analyze_patch(file_name: &str, text: &str, filter: &SourceFilter) -> PatchReport {
    let blocks = extract_diff_blocks(text, filter);
    let (change_set, malformed_lines) = classify_blocks(file_name, &blocks);
    let tally = count_keywords(&changed_lines(text));

    tracing::debug!(
        patch = file_name,
        blocks = blocks.len(),
        records = change_set.as_ref().map_or(0, |s| s.changes.len()),
        "patch analyzed"
    );

    PatchReport {
        change_set,
        tally,
        blocks: blocks.len(),
        malformed_lines,
    }
}

/// List the patch files directly inside `dir`, sorted by file name.
///
/// Hidden files and subdirectories are skipped.
///
/// # Errors
///
/// Returns [`PatchscanError::FileNotFound`] if `dir` is not a directory.
pub fn discover_patches(dir: &Path) -> Result<Vec<PathBuf>, PatchscanError> {
    if !dir.is_dir() {
        return Err(PatchscanError::FileNotFound(dir.to_path_buf()));
    }

    let walker = ignore::WalkBuilder::new(dir)
        .standard_filters(false)
        .hidden(true)
        .max_depth(Some(1))
        .build();

    let mut patches = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                tracing::warn!("failed to list patch directory entry: {e}");
                continue;
            }
        };
        if entry.depth() == 0 || !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }
        patches.push(entry.into_path());
    }

    patches.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(patches)
}

/// Analyze every patch in `dir`, one after another.
///
/// # Errors
///
/// Returns [`PatchscanError::FileNotFound`] if `dir` is missing, or
/// [`PatchscanError::Config`] if the scan extensions are invalid.
pub fn analyze_dir<F>(
    dir: &Path,
    config: &ScanConfig,
    on_progress: F,
) -> Result<RunReport, PatchscanError>
where
    F: FnMut(&Path),
{
    let filter = SourceFilter::from_config(config)?;
    let patches = discover_patches(dir)?;
    Ok(analyze_patches(&patches, &filter, on_progress))
}

/// Analyze `patches` in order, merging their results.
///
/// `on_progress` is called after each patch, whether or not it could be
/// read. Unreadable patches are logged and counted, not fatal. Patch text
/// that is not valid UTF-8 is decoded lossily.
pub fn analyze_patches<F>(patches: &[PathBuf], filter: &SourceFilter, mut on_progress: F) -> RunReport
where
    F: FnMut(&Path),
{
    let mut run = RunReport::default();

    for path in patches {
        match read_patch(path) {
            Ok(text) => {
                let name = patch_name(path);
                run.absorb(analyze_patch(&name, &text, filter));
            }
            Err(e) => {
                run.patches_skipped += 1;
                tracing::warn!(patch = %path.display(), "failed to read patch: {e}");
            }
        }
        on_progress(path);
    }

    run
}

/// Read a patch file, replacing invalid UTF-8 sequences with U+FFFD.
///
/// # Errors
///
/// Returns [`PatchscanError::Io`] if the file cannot be read.
pub fn read_patch(path: &Path) -> Result<String, PatchscanError> {
    let bytes = std::fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// File name of `path`, used as the change set's `file_name`.
pub fn patch_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
