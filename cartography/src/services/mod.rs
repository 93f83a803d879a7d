mod build;

pub use build::{normalize_core_ids, BuildPipeline, BuildReport, UserBuildOutcome, UserBuildStatus};
