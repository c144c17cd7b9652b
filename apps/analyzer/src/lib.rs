//! resumatch: extracts skills, education and experience from a resume PDF and scores
//! them against a job description.

pub mod config;
pub mod errors;
pub mod extraction;
pub mod history;
pub mod matching;
pub mod models;
pub mod pipeline;

pub use errors::AnalyzeError;
pub use matching::engine::{MatchResult, Verdict};
pub use matching::requirements::JobPosting;
pub use pipeline::{analyze, Analyzer, PipelineConfig};
