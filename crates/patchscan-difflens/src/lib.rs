//! Diff block extraction and keyword frequency analysis.
//!
//! Splits unified-diff patch text into per-file blocks of changed lines,
//! restricted to source files by extension, and tallies language keywords
//! across added and removed lines.
pub mod filter;
pub mod frequency;
pub mod parser;
