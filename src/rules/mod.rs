//! Rule engine - matching, renaming and placement policies

mod condition;
mod engine;
mod policy;
mod rename;

pub use condition::{MatchRules, MatchRulesBuilder, Pattern, split_name};
pub use engine::{FileOutcome, Mover, Placement, RunSummary};
pub use policy::{CollisionAvoidance, DestinationCollision, SourceRetention};
pub use rename::{
    DEFAULT_TIMESTAMP_FORMAT, RenamePipeline, RenamePipelineBuilder, RenameRule, TimestampPolicy,
    TimestampPosition,
};
