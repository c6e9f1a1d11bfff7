use thiserror::Error;

use crate::entity::EntityId;

/// Failures of scene graph edits.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SceneError {
    #[error("entity {0} is not part of the scene")]
    UnknownEntity(EntityId),
    #[error("cannot parent {child} under {parent}: it would create a cycle")]
    ParentCycle { parent: EntityId, child: EntityId },
}

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("audio clip path is empty")]
    EmptyPath,
    #[error("failed to decode {path}: {reason}")]
    Decode { path: String, reason: String },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be {expected}, got {value:?}")]
    InvalidValue {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}
