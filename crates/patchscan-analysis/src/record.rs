use patchscan_core::{ChangeRecord, FileChangeSet, Polarity};

use crate::classify::StatementFields;

/// Merge classified fields into the flat record shape, leaving every field
/// the statement kind does not use as `None`.
///
/// # Examples
///
/// ```
/// use patchscan_analysis::classify::StatementFields;
/// use patchscan_analysis::record::build_record;
/// use patchscan_core::Polarity;
///
/// let record = build_record(
///     Polarity::Added,
///     StatementFields::Import { module: "json".into() },
/// );
/// assert_eq!(record.value.as_deref(), Some("json"));
/// assert!(record.condition.is_none());
/// ```
pub fn build_record(action: Polarity, fields: StatementFields) -> ChangeRecord {
    let mut record = ChangeRecord {
        action,
        keyword: fields.kind(),
        condition: None,
        value: None,
        loop_entity: None,
        exception_type: None,
        raise_condition: None,
    };

    match fields {
        StatementFields::Conditional { condition, .. } => record.condition = Some(condition),
        StatementFields::ForLoop { target, iterable } => {
            record.value = Some(target);
            record.loop_entity = Some(iterable);
        }
        StatementFields::WhileLoop { condition } => record.condition = Some(condition),
        StatementFields::Except { exception_type } => {
            record.exception_type = Some(exception_type)
        }
        StatementFields::Raise { raised } => record.raise_condition = Some(raised),
        StatementFields::Import { module } => record.value = Some(module),
    }

    record
}

/// Accumulates the records of one patch file.
///
/// # Examples
///
/// ```
/// use patchscan_analysis::classify::StatementFields;
/// use patchscan_analysis::record::ChangeSetBuilder;
/// use patchscan_core::Polarity;
///
/// let empty = ChangeSetBuilder::new("a.patch");
/// assert!(empty.finish().is_none());
///
/// let mut builder = ChangeSetBuilder::new("b.patch");
/// builder.push(Polarity::Removed, StatementFields::Raise { raised: "E".into() });
/// let set = builder.finish().unwrap();
/// assert_eq!(set.file_name, "b.patch");
/// assert_eq!(set.changes.len(), 1);
/// ```
#[derive(Debug)]
pub struct ChangeSetBuilder {
    file_name: String,
    changes: Vec<ChangeRecord>,
}

impl ChangeSetBuilder {
    /// Start an empty set for the patch named `file_name`.
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            changes: Vec::new(),
        }
    }

    /// Append a record built from `fields`.
    pub fn push(&mut self, action: Polarity, fields: StatementFields) {
        self.changes.push(build_record(action, fields));
    }

    /// The finished set, or `None` when no records were pushed.
    pub fn finish(self) -> Option<FileChangeSet> {
        if self.changes.is_empty() {
            return None;
        }
        Some(FileChangeSet {
            file_name: self.file_name,
            changes: self.changes,
        })
    }
}
