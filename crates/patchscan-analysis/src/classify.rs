//! Line-local recognition of control-flow statements.
//!
//! Each changed line is matched on its own: the first word of the body picks
//! a statement kind, and a lightweight pattern pulls out the kind-specific
//! fields. No attempt is made to parse the surrounding code.

use once_cell::sync::Lazy;
use regex::Regex;

use patchscan_core::{ChangedLine, StatementKind};

static RE_CONDITIONAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:elif|if)\b\s*(.*):").expect("valid regex"));
static RE_FOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^for\s+(.+?)\s+in\s+(.+):").expect("valid regex"));
static RE_WHILE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^while\b\s*(.+):").expect("valid regex"));
static RE_EXCEPT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^except(?:\s+[^:]+)?\s*:").expect("valid regex"));

/// Exception type recorded for a bare `except:`.
pub const GENERAL_EXCEPTION: &str = "general";

/// Fields extracted from a recognized statement, by kind.
///
/// # Examples
///
/// ```
/// use patchscan_analysis::classify::StatementFields;
/// use patchscan_core::StatementKind;
///
/// let fields = StatementFields::Raise { raised: "KeyError".into() };
/// assert_eq!(fields.kind(), StatementKind::Raise);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatementFields {
    /// `if <condition>:` or `elif <condition>:`.
    Conditional {
        kind: StatementKind,
        condition: String,
    },
    /// `for <target> in <iterable>:`.
    ForLoop { target: String, iterable: String },
    /// `while <condition>:`.
    WhileLoop { condition: String },
    /// `except [<type>[ as <name>]]:`.
    Except { exception_type: String },
    /// `raise <expr>`.
    Raise { raised: String },
    /// `import <module>`.
    Import { module: String },
}

impl StatementFields {
    /// The statement kind these fields belong to.
    pub fn kind(&self) -> StatementKind {
        match self {
            StatementFields::Conditional { kind, .. } => *kind,
            StatementFields::ForLoop { .. } => StatementKind::For,
            StatementFields::WhileLoop { .. } => StatementKind::While,
            StatementFields::Except { .. } => StatementKind::Except,
            StatementFields::Raise { .. } => StatementKind::Raise,
            StatementFields::Import { .. } => StatementKind::Import,
        }
    }
}

/// Outcome of classifying one changed line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// A recognized statement with its fields.
    Statement(StatementFields),
    /// `raise`/`import` followed only by colons, e.g. `raise :`.
    Malformed(StatementKind),
    /// Not a tracked statement, or it did not have the expected shape.
    Unmatched,
}

/// Classify a changed line.
///
/// The dispatch word is the first token of the body with any trailing colon
/// removed, so a bare `except:` is still seen as `except`. Lines with an
/// empty body never match.
///
/// # Examples
///
/// ```
/// use patchscan_analysis::classify::{classify_line, Classification, StatementFields};
/// use patchscan_core::ChangedLine;
///
/// let line = ChangedLine::parse("-for i in range(10):").unwrap();
/// assert_eq!(
///     classify_line(&line),
///     Classification::Statement(StatementFields::ForLoop {
///         target: "i".into(),
///         iterable: "range(10)".into(),
///     })
/// );
/// ```
pub fn classify_line(line: &ChangedLine) -> Classification {
    let body = line.body.as_str();
    let Some(first) = body.split_whitespace().next() else {
        return Classification::Unmatched;
    };
    let Ok(kind) = first.trim_end_matches(':').parse::<StatementKind>() else {
        return Classification::Unmatched;
    };

    let fields = match kind {
        StatementKind::If | StatementKind::Elif => conditional(kind, body),
        StatementKind::For => for_loop(body),
        StatementKind::While => while_loop(body),
        StatementKind::Except => except_clause(body),
        // bare `raise` / `import`: no record, no warning
        StatementKind::Raise | StatementKind::Import
            if body.split_whitespace().nth(1).is_none() =>
        {
            return Classification::Unmatched;
        }
        StatementKind::Raise => match second_token(body) {
            Some(raised) => Some(StatementFields::Raise { raised }),
            None => return Classification::Malformed(kind),
        },
        StatementKind::Import => match second_token(body) {
            Some(module) => Some(StatementFields::Import { module }),
            None => return Classification::Malformed(kind),
        },
    };

    fields.map_or(Classification::Unmatched, Classification::Statement)
}

fn conditional(kind: StatementKind, body: &str) -> Option<StatementFields> {
    let caps = RE_CONDITIONAL.captures(body)?;
    let condition = strip_bracket_artifacts(&caps[1]);
    if condition.is_empty() {
        return None;
    }
    Some(StatementFields::Conditional {
        kind,
        condition: condition.to_string(),
    })
}

fn for_loop(body: &str) -> Option<StatementFields> {
    let caps = RE_FOR.captures(body)?;
    Some(StatementFields::ForLoop {
        target: caps[1].trim().to_string(),
        iterable: caps[2].trim().to_string(),
    })
}

fn while_loop(body: &str) -> Option<StatementFields> {
    let caps = RE_WHILE.captures(body)?;
    let condition = caps[1].trim();
    if condition.is_empty() {
        return None;
    }
    Some(StatementFields::WhileLoop {
        condition: condition.to_string(),
    })
}

fn except_clause(body: &str) -> Option<StatementFields> {
    if !RE_EXCEPT.is_match(body) {
        return None;
    }
    let exception_type = second_token(body).unwrap_or_else(|| GENERAL_EXCEPTION.to_string());
    Some(StatementFields::Except { exception_type })
}

/// Second whitespace token of the body once colons are dropped.
fn second_token(body: &str) -> Option<String> {
    body.replace(':', "")
        .split_whitespace()
        .nth(1)
        .map(str::to_string)
}

/// Trim unbalanced brackets left on either end of a captured condition,
/// e.g. the `]` of `if x in seen]:` after a line-wrapped list literal.
fn strip_bracket_artifacts(text: &str) -> &str {
    let mut s = text.trim();
    loop {
        let before = s;
        for (open, close) in [('(', ')'), ('[', ']'), ('{', '}')] {
            let opens = s.matches(open).count();
            let closes = s.matches(close).count();
            if closes > opens && s.ends_with(close) {
                s = s[..s.len() - close.len_utf8()].trim_end();
            } else if opens > closes && s.starts_with(open) {
                s = s[open.len_utf8()..].trim_start();
            }
        }
        if s == before {
            return s;
        }
    }
}
