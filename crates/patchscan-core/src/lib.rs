//! Core types, configuration, and error handling for patchscan.
//!
//! This crate provides the shared foundation used by the other patchscan crates:
//! - [`PatchscanError`] — unified error type using `thiserror`
//! - [`PatchscanConfig`] — configuration loaded from `.patchscan.toml`
//! - Shared types: [`ChangedLine`], [`ChangeRecord`], [`FileChangeSet`],
//!   [`Keyword`], [`KeywordTally`], [`Polarity`], [`StatementKind`]

mod config;
mod error;
mod types;

pub use config::{OutputConfig, PatchscanConfig, ScanConfig};
pub use error::PatchscanError;
pub use types::{
    ChangeRecord, ChangedLine, FileChangeSet, Keyword, KeywordTally, Polarity, StatementKind,
};

/// A convenience `Result` type for patchscan operations.
pub type Result<T> = std::result::Result<T, PatchscanError>;
