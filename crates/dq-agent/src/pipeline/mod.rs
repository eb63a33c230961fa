//! Assessment pipeline orchestration.
//!
//! Runs profile then assess with the rule set's column types as profiler
//! hints, returning both the facts and the verdict.

mod builder;

pub use builder::{Assessment, AssessmentPipeline, AssessmentPipelineBuilder};
