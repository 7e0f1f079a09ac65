//! Change classification and the patch analysis pipeline.
//!
//! Turns diff blocks into structured change records for conditionals, loops,
//! exception handling, raises and imports, runs whole directories of patches,
//! and persists the record document and keyword chart.
pub mod chart;
pub mod classify;
pub mod output;
pub mod pipeline;
pub mod record;
