//! Naive keyword frequency analysis over changed lines.
//!
//! Every whitespace token of a line's body that exactly matches a
//! recognized keyword is counted, wherever it appears on the line. This is
//! deliberately broader than statement classification, which only looks at
//! the leading word.

use patchscan_core::{ChangedLine, Keyword, KeywordTally};

/// Count keyword tokens in `line` into `tally`.
///
/// # Examples
///
/// ```
/// use patchscan_core::{ChangedLine, Keyword, KeywordTally};
/// use patchscan_difflens::frequency::tally_line;
///
/// let mut tally = KeywordTally::new();
/// let line = ChangedLine::parse("+    x = [i for i in xs if i]").unwrap();
/// tally_line(&mut tally, &line);
/// assert_eq!(tally.added(Keyword::For), 1);
/// assert_eq!(tally.added(Keyword::If), 1);
/// ```
pub fn tally_line(tally: &mut KeywordTally, line: &ChangedLine) {
    for token in line.tokens() {
        if let Some(keyword) = Keyword::from_token(token) {
            tally.increment(keyword, line.polarity);
        }
    }
}

/// Tally every line of `lines` into a fresh [`KeywordTally`].
///
/// # Examples
///
/// ```
/// use patchscan_core::Keyword;
/// use patchscan_difflens::frequency::count_keywords;
/// use patchscan_difflens::parser::changed_lines;
///
/// let patch = "@@ -1,2 +1,2 @@\n-try:\n+while True:\n";
/// let tally = count_keywords(&changed_lines(patch));
/// assert_eq!(tally.removed(Keyword::Try), 1);
/// assert_eq!(tally.added(Keyword::While), 1);
/// ```
pub fn count_keywords<'a, I>(lines: I) -> KeywordTally
where
    I: IntoIterator<Item = &'a ChangedLine>,
{
    let mut tally = KeywordTally::new();
    for line in lines {
        tally_line(&mut tally, line);
    }
    tally
}
