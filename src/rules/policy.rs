//! Behavior policies - what happens around collisions and to the source file

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::MoverError;

/// Whether the source file is deleted after all destination attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceRetention {
    /// Delete unconditionally ("move")
    #[default]
    NeverKeep,
    /// Never delete ("copy")
    AlwaysKeep,
    KeepIfAnyCollide,
    KeepIfAllCollide,
    KeepIfNoneCollide,
}

/// Per-destination handling of an existing file at the target path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DestinationCollision {
    /// Leave the existing file untouched and skip that destination
    #[default]
    Ignore,
    /// Replace the existing file
    Overwrite,
}

/// Whole-file decision on whether to attempt any destination at all
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionAvoidance {
    #[default]
    None,
    CancelIfAnyCollide,
    CancelIfAllCollide,
}

impl SourceRetention {
    pub const ALL: [SourceRetention; 5] = [
        SourceRetention::NeverKeep,
        SourceRetention::AlwaysKeep,
        SourceRetention::KeepIfAnyCollide,
        SourceRetention::KeepIfAllCollide,
        SourceRetention::KeepIfNoneCollide,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceRetention::NeverKeep => "never_keep",
            SourceRetention::AlwaysKeep => "always_keep",
            SourceRetention::KeepIfAnyCollide => "keep_if_any_collide",
            SourceRetention::KeepIfAllCollide => "keep_if_all_collide",
            SourceRetention::KeepIfNoneCollide => "keep_if_none_collide",
        }
    }

    /// Decide whether to delete the source given how many of the
    /// `destinations` candidate paths already existed.
    pub fn should_delete(&self, collisions: usize, destinations: usize) -> bool {
        match self {
            SourceRetention::NeverKeep => true,
            SourceRetention::AlwaysKeep => false,
            SourceRetention::KeepIfAnyCollide => collisions == 0,
            // Collisions are a subset of destinations, so this comparison
            // never keeps the source. Kept literal until the intended rule
            // is clarified.
            SourceRetention::KeepIfAllCollide => collisions <= destinations,
            SourceRetention::KeepIfNoneCollide => collisions > 0,
        }
    }
}

impl DestinationCollision {
    pub const ALL: [DestinationCollision; 2] =
        [DestinationCollision::Ignore, DestinationCollision::Overwrite];

    pub fn as_str(&self) -> &'static str {
        match self {
            DestinationCollision::Ignore => "ignore",
            DestinationCollision::Overwrite => "overwrite",
        }
    }
}

impl CollisionAvoidance {
    pub const ALL: [CollisionAvoidance; 3] = [
        CollisionAvoidance::None,
        CollisionAvoidance::CancelIfAnyCollide,
        CollisionAvoidance::CancelIfAllCollide,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CollisionAvoidance::None => "none",
            CollisionAvoidance::CancelIfAnyCollide => "cancel_if_any_collide",
            CollisionAvoidance::CancelIfAllCollide => "cancel_if_all_collide",
        }
    }

    /// True when the whole move for a source file must be abandoned
    pub fn should_cancel(&self, collisions: usize, destinations: usize) -> bool {
        match self {
            CollisionAvoidance::None => false,
            CollisionAvoidance::CancelIfAnyCollide => collisions > 0,
            CollisionAvoidance::CancelIfAllCollide => collisions == destinations,
        }
    }
}

/// Parse `s` against the string forms of `all`, naming `what` in the error
fn parse_policy<T: Copy>(
    s: &str,
    all: &[T],
    as_str: fn(&T) -> &'static str,
    what: &str,
) -> Result<T, MoverError> {
    all.iter().find(|p| as_str(*p) == s).copied().ok_or_else(|| {
        let valid: Vec<&str> = all.iter().map(as_str).collect();
        MoverError::config(format!(
            "invalid {what} '{s}', must be one of: {}",
            valid.join(", ")
        ))
    })
}

impl FromStr for SourceRetention {
    type Err = MoverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_policy(s, &Self::ALL, Self::as_str, "keep_source_behavior")
    }
}

impl FromStr for DestinationCollision {
    type Err = MoverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_policy(s, &Self::ALL, Self::as_str, "destination_collision_behavior")
    }
}

impl FromStr for CollisionAvoidance {
    type Err = MoverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_policy(s, &Self::ALL, Self::as_str, "collision_avoidance_behavior")
    }
}

impl fmt::Display for SourceRetention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for DestinationCollision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for CollisionAvoidance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
