use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Whether a diff line was added or removed.
///
/// # Examples
///
/// ```
/// use patchscan_core::Polarity;
///
/// assert_eq!(Polarity::from_marker('+'), Some(Polarity::Added));
/// assert_eq!(Polarity::from_marker('-'), Some(Polarity::Removed));
/// assert_eq!(Polarity::from_marker(' '), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    /// Line introduced by the patch (`+`).
    Added,
    /// Line deleted by the patch (`-`).
    Removed,
}

impl Polarity {
    /// Map a diff marker character to a polarity.
    pub fn from_marker(marker: char) -> Option<Self> {
        match marker {
            '+' => Some(Polarity::Added),
            '-' => Some(Polarity::Removed),
            _ => None,
        }
    }

    /// The diff marker for this polarity.
    pub fn marker(self) -> char {
        match self {
            Polarity::Added => '+',
            Polarity::Removed => '-',
        }
    }
}

impl fmt::Display for Polarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Polarity::Added => write!(f, "added"),
            Polarity::Removed => write!(f, "removed"),
        }
    }
}

/// One of the fifteen language keywords tallied by frequency analysis.
///
/// Matching is exact and case-sensitive. Some entries include the trailing
/// colon (`else:`, `try:`), so only the bare statement form counts.
///
/// Variant order is the canonical reporting order.
///
/// # Examples
///
/// ```
/// use patchscan_core::Keyword;
///
/// assert_eq!(Keyword::from_token("else:"), Some(Keyword::Else));
/// assert_eq!(Keyword::from_token("else"), None);
/// assert_eq!(Keyword::ALL.len(), 15);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Keyword {
    #[serde(rename = "for")]
    For,
    #[serde(rename = "if")]
    If,
    #[serde(rename = "else:")]
    Else,
    #[serde(rename = "while")]
    While,
    #[serde(rename = "try:")]
    Try,
    #[serde(rename = "except")]
    Except,
    #[serde(rename = "class")]
    Class,
    #[serde(rename = "def")]
    Def,
    #[serde(rename = "elif")]
    Elif,
    #[serde(rename = "import")]
    Import,
    #[serde(rename = "raise")]
    Raise,
    #[serde(rename = "finally")]
    Finally,
    #[serde(rename = "del")]
    Del,
    #[serde(rename = "assert")]
    Assert,
    #[serde(rename = "break")]
    Break,
}

impl Keyword {
    /// Every recognized keyword, in canonical order.
    pub const ALL: [Keyword; 15] = [
        Keyword::For,
        Keyword::If,
        Keyword::Else,
        Keyword::While,
        Keyword::Try,
        Keyword::Except,
        Keyword::Class,
        Keyword::Def,
        Keyword::Elif,
        Keyword::Import,
        Keyword::Raise,
        Keyword::Finally,
        Keyword::Del,
        Keyword::Assert,
        Keyword::Break,
    ];

    /// The token text this keyword matches.
    pub fn as_str(self) -> &'static str {
        match self {
            Keyword::For => "for",
            Keyword::If => "if",
            Keyword::Else => "else:",
            Keyword::While => "while",
            Keyword::Try => "try:",
            Keyword::Except => "except",
            Keyword::Class => "class",
            Keyword::Def => "def",
            Keyword::Elif => "elif",
            Keyword::Import => "import",
            Keyword::Raise => "raise",
            Keyword::Finally => "finally",
            Keyword::Del => "del",
            Keyword::Assert => "assert",
            Keyword::Break => "break",
        }
    }

    /// Exact, case-sensitive lookup of a whitespace-delimited token.
    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == token)
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Statement kinds that produce structured change records.
///
/// # Examples
///
/// ```
/// use patchscan_core::StatementKind;
///
/// let kind: StatementKind = "elif".parse().unwrap();
/// assert_eq!(kind, StatementKind::Elif);
/// assert_eq!(serde_json::to_string(&kind).unwrap(), "\"elif\"");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatementKind {
    If,
    Elif,
    For,
    While,
    Except,
    Raise,
    Import,
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatementKind::If => write!(f, "if"),
            StatementKind::Elif => write!(f, "elif"),
            StatementKind::For => write!(f, "for"),
            StatementKind::While => write!(f, "while"),
            StatementKind::Except => write!(f, "except"),
            StatementKind::Raise => write!(f, "raise"),
            StatementKind::Import => write!(f, "import"),
        }
    }
}

impl FromStr for StatementKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "if" => Ok(StatementKind::If),
            "elif" => Ok(StatementKind::Elif),
            "for" => Ok(StatementKind::For),
            "while" => Ok(StatementKind::While),
            "except" => Ok(StatementKind::Except),
            "raise" => Ok(StatementKind::Raise),
            "import" => Ok(StatementKind::Import),
            other => Err(format!("unknown statement kind: {other}")),
        }
    }
}

/// A single `+`/`-` line from a patch with the marker split off.
///
/// The body is trimmed; [`Display`](fmt::Display) renders the normalized
/// form `<marker> <body>`.
///
/// # Examples
///
/// ```
/// use patchscan_core::{ChangedLine, Polarity};
///
/// let line = ChangedLine::parse("+    if x > 0:").unwrap();
/// assert_eq!(line.polarity, Polarity::Added);
/// assert_eq!(line.body, "if x > 0:");
/// assert_eq!(line.to_string(), "+ if x > 0:");
/// assert!(ChangedLine::parse(" context").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangedLine {
    /// Added or removed.
    pub polarity: Polarity,
    /// Statement text without the marker, trimmed.
    pub body: String,
}

impl ChangedLine {
    /// Parse a raw diff line. Returns `None` unless it starts with `+` or `-`.
    pub fn parse(raw: &str) -> Option<Self> {
        let mut chars = raw.chars();
        let polarity = Polarity::from_marker(chars.next()?)?;
        Some(Self {
            polarity,
            body: chars.as_str().trim().to_string(),
        })
    }

    /// Whitespace-separated tokens of the body.
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.body.split_whitespace()
    }
}

impl fmt::Display for ChangedLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.polarity.marker(), self.body)
    }
}

/// A classified control-flow change, in its flat serialized shape.
///
/// Every field is always present when serialized; fields that do not apply
/// to the statement kind are `null`.
///
/// # Examples
///
/// ```
/// use patchscan_core::{ChangeRecord, Polarity, StatementKind};
///
/// let record = ChangeRecord {
///     action: Polarity::Added,
///     keyword: StatementKind::Raise,
///     condition: None,
///     value: None,
///     loop_entity: None,
///     exception_type: None,
///     raise_condition: Some("ValueError".into()),
/// };
/// let json = serde_json::to_value(&record).unwrap();
/// assert_eq!(json["keywords"], "raise");
/// assert!(json["condition"].is_null());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeRecord {
    /// Whether the statement was added or removed.
    pub action: Polarity,
    /// The statement kind.
    #[serde(rename = "keywords")]
    pub keyword: StatementKind,
    /// Boolean expression of `if`/`elif`/`while`.
    pub condition: Option<String>,
    /// Loop target of `for`, or the module of `import`.
    pub value: Option<String>,
    /// Iterable expression of `for`.
    pub loop_entity: Option<String>,
    /// Caught exception name, or `general` for a bare `except:`.
    pub exception_type: Option<String>,
    /// Raised expression of `raise`.
    pub raise_condition: Option<String>,
}

/// The change records found in one patch file.
///
/// # Examples
///
/// ```
/// use patchscan_core::FileChangeSet;
///
/// let set = FileChangeSet { file_name: "42.patch".into(), changes: vec![] };
/// let json = serde_json::to_string(&set).unwrap();
/// assert_eq!(json, r#"{"file_name":"42.patch","changes":[]}"#);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileChangeSet {
    /// Name of the patch file the records came from.
    pub file_name: String,
    /// Records in patch order.
    pub changes: Vec<ChangeRecord>,
}

/// Per-keyword counts of added and removed occurrences.
///
/// Starts with every keyword at zero. Counts only ever grow; tallies from
/// separate runs combine with [`merge`](KeywordTally::merge), which is
/// associative and commutative.
///
/// # Examples
///
/// ```
/// use patchscan_core::{Keyword, KeywordTally, Polarity};
///
/// let mut tally = KeywordTally::new();
/// tally.increment(Keyword::If, Polarity::Added);
/// assert_eq!(tally.added(Keyword::If), 1);
/// assert_eq!(tally.removed(Keyword::If), 0);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordTally {
    added: BTreeMap<Keyword, u64>,
    removed: BTreeMap<Keyword, u64>,
}

impl KeywordTally {
    /// A tally with all fifteen keywords at zero.
    pub fn new() -> Self {
        let zeroed: BTreeMap<Keyword, u64> = Keyword::ALL.into_iter().map(|k| (k, 0)).collect();
        Self {
            added: zeroed.clone(),
            removed: zeroed,
        }
    }

    /// Count one occurrence of `keyword` on a line of the given polarity.
    pub fn increment(&mut self, keyword: Keyword, polarity: Polarity) {
        let bucket = match polarity {
            Polarity::Added => &mut self.added,
            Polarity::Removed => &mut self.removed,
        };
        *bucket.entry(keyword).or_insert(0) += 1;
    }

    /// Occurrences on added lines.
    pub fn added(&self, keyword: Keyword) -> u64 {
        self.added.get(&keyword).copied().unwrap_or(0)
    }

    /// Occurrences on removed lines.
    pub fn removed(&self, keyword: Keyword) -> u64 {
        self.removed.get(&keyword).copied().unwrap_or(0)
    }

    /// Add every count from `other` into `self`.
    pub fn merge(&mut self, other: &KeywordTally) {
        for (keyword, count) in &other.added {
            *self.added.entry(*keyword).or_insert(0) += count;
        }
        for (keyword, count) in &other.removed {
            *self.removed.entry(*keyword).or_insert(0) += count;
        }
    }

    /// Sum of all counts in both buckets.
    pub fn total(&self) -> u64 {
        self.added.values().sum::<u64>() + self.removed.values().sum::<u64>()
    }

    /// `(keyword, added, removed)` rows in canonical keyword order.
    pub fn rows(&self) -> impl Iterator<Item = (Keyword, u64, u64)> + '_ {
        Keyword::ALL
            .into_iter()
            .map(|k| (k, self.added(k), self.removed(k)))
    }
}

impl Default for KeywordTally {
    fn default() -> Self {
        Self::new()
    }
}
