//! Pipeline orchestration for docsnap.
//!
//! Ties retrieval, decoding, media resolution, rendering, and persistence
//! into the end-to-end parse workflow ([`pipeline::run_pipeline`]).

pub mod pipeline;

pub use pipeline::{ParseRequest, ParseResult, ProgressReporter, SilentProgress, run_pipeline};
