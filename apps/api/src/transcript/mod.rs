//! Transcript-to-coursework extraction pipeline.
//!
//! Heuristic table parsing, generative fallback, and reconciliation, in
//! that order. See `pipeline` for the orchestration entry points.

pub mod fallback;
pub mod fill;
pub mod pipeline;
pub mod predicates;
pub mod prompts;
pub mod table_parser;
