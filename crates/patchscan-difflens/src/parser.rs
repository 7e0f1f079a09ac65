use std::fmt;

use patchscan_core::ChangedLine;

use crate::filter::SourceFilter;

/// The changed lines of one tracked source file within a patch.
///
/// # Examples
///
/// ```
/// use patchscan_difflens::filter::SourceFilter;
/// use patchscan_difflens::parser::extract_diff_blocks;
///
/// let patch = "diff --git a/app.py b/app.py\n\
///              --- a/app.py\n\
///              +++ b/app.py\n\
///              @@ -1,2 +1,2 @@\n\
///              -    x = 1\n\
///              +    x = 2\n";
/// let blocks = extract_diff_blocks(patch, &SourceFilter::default_filter());
/// assert_eq!(blocks.len(), 1);
/// assert_eq!(blocks[0].path, "app.py");
/// assert_eq!(blocks[0].lines.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffBlock {
    /// Raw text of the `diff ...` header line that opened the block.
    pub header: String,
    /// Path from the header, without the `a/` prefix.
    pub path: String,
    /// Added and removed lines, in patch order.
    pub lines: Vec<ChangedLine>,
}

impl fmt::Display for DiffBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} changed lines)", self.path, self.lines.len())
    }
}

/// Split a patch into blocks of changed lines, one per tracked source file.
///
/// A `diff` header whose third token passes `filter` opens a block; any
/// other `diff` header closes tracking until the next qualifying one.
/// Within a block, every line starting with `+` or `-` is captured except
/// the `---`/`+++` file-name lines before the first `@@` hunk header.
/// Lines outside a tracked block are ignored.
///
/// Blocks are returned in input order. Identical headers produce separate
/// blocks.
///
/// # Examples
///
/// ```
/// use patchscan_difflens::filter::SourceFilter;
/// use patchscan_difflens::parser::extract_diff_blocks;
///
/// let blocks = extract_diff_blocks("", &SourceFilter::default_filter());
/// assert!(blocks.is_empty());
/// ```
pub fn extract_diff_blocks(input: &str, filter: &SourceFilter) -> Vec<DiffBlock> {
    let mut blocks: Vec<DiffBlock> = Vec::new();
    let mut current: Option<DiffBlock> = None;
    let mut hunks = HunkTracker::default();

    for line in input.lines() {
        if is_diff_header(line) {
            if let Some(block) = current.take() {
                blocks.push(block);
            }
            hunks = HunkTracker::default();

            current = match header_path(line) {
                Some(path) if filter.matches_path(path) => Some(DiffBlock {
                    header: line.to_string(),
                    path: strip_side_prefix(path).to_string(),
                    lines: Vec::new(),
                }),
                _ => {
                    tracing::trace!(header = line, "diff block not tracked");
                    None
                }
            };
            continue;
        }

        let Some(block) = current.as_mut() else {
            continue;
        };

        if let Some(changed) = hunks.changed_line(line) {
            block.lines.push(changed);
        }
    }

    if let Some(block) = current.take() {
        blocks.push(block);
    }

    blocks
}

/// Every added or removed line of a patch, regardless of file type.
///
/// File-name metadata (`---`/`+++` before a hunk header) is skipped.
///
/// # Examples
///
/// ```
/// use patchscan_core::Polarity;
/// use patchscan_difflens::parser::changed_lines;
///
/// let patch = "diff --git a/README.md b/README.md\n\
///              --- a/README.md\n\
///              +++ b/README.md\n\
///              @@ -1 +1 @@\n\
///              -old\n\
///              +new\n";
/// let lines = changed_lines(patch);
/// assert_eq!(lines.len(), 2);
/// assert_eq!(lines[0].polarity, Polarity::Removed);
/// ```
pub fn changed_lines(input: &str) -> Vec<ChangedLine> {
    let mut lines = Vec::new();
    let mut hunks = HunkTracker::default();

    for line in input.lines() {
        if is_diff_header(line) {
            hunks = HunkTracker::default();
            continue;
        }
        if let Some(changed) = hunks.changed_line(line) {
            lines.push(changed);
        }
    }

    lines
}

/// Tracks whether a `@@` hunk header has been seen in the current file
/// section, so `---`/`+++` file-name lines are not mistaken for changes.
#[derive(Default)]
struct HunkTracker {
    in_hunk: bool,
}

impl HunkTracker {
    fn changed_line(&mut self, line: &str) -> Option<ChangedLine> {
        if line.starts_with("@@") {
            self.in_hunk = true;
            return None;
        }
        if !self.in_hunk && (line.starts_with("--- ") || line.starts_with("+++ ")) {
            return None;
        }
        ChangedLine::parse(line)
    }
}

/// `diff` must start the line; ` diff = x` is hunk context, `+diff` a change.
fn is_diff_header(line: &str) -> bool {
    line.strip_prefix("diff")
        .is_some_and(|rest| rest.is_empty() || rest.starts_with(char::is_whitespace))
}

/// Third whitespace token of a `diff` header, or `None` if there are fewer
/// than three.
fn header_path(line: &str) -> Option<&str> {
    line.split_whitespace().nth(2)
}

fn strip_side_prefix(path: &str) -> &str {
    path.strip_prefix("a/")
        .or_else(|| path.strip_prefix("b/"))
        .unwrap_or(path)
}
