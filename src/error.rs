// Copyright 2024 Saptak Santra
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Error types

use std::fmt;

/// ECS error type. Every fallible operation in the crate returns `Result<T>`
/// with this as the error channel; there is no explicit `Ok` variant since
/// Rust already carries that in `Result::Ok`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EcsError {
    /// Argument failed validation (e.g. only one of a hook pair supplied).
    InvalidArgument(String),

    /// Entity, component, archetype or query handle does not exist.
    NotFound(String),

    /// Attempted to create something that already exists under the same key.
    AlreadyExists(String),

    /// A fixed-size table (entity slots, component ids) hit its hard cap.
    CapacityReached(String),

    /// The configured or default allocator returned null.
    AllocationFailed(String),

    /// An `EntityId`'s generation does not match the live slot's generation.
    StaleEntity,

    /// A requested operation would violate the scheduler's conflict rules.
    Conflict(String),

    /// Recognized but intentionally unimplemented in this build.
    NotImplemented(String),
}

impl EcsError {
    /// Short machine-stable tag for the variant, independent of the message
    /// payload. Used by callers that branch on error kind rather than text.
    pub fn status_string(&self) -> &'static str {
        match self {
            EcsError::InvalidArgument(_) => "InvalidArgument",
            EcsError::NotFound(_) => "NotFound",
            EcsError::AlreadyExists(_) => "AlreadyExists",
            EcsError::CapacityReached(_) => "CapacityReached",
            EcsError::AllocationFailed(_) => "AllocationFailed",
            EcsError::StaleEntity => "StaleEntity",
            EcsError::Conflict(_) => "Conflict",
            EcsError::NotImplemented(_) => "NotImplemented",
        }
    }
}

impl fmt::Display for EcsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EcsError::InvalidArgument(msg) => write!(f, "invalid argument: {msg}"),
            EcsError::NotFound(msg) => write!(f, "not found: {msg}"),
            EcsError::AlreadyExists(msg) => write!(f, "already exists: {msg}"),
            EcsError::CapacityReached(msg) => write!(f, "capacity reached: {msg}"),
            EcsError::AllocationFailed(msg) => write!(f, "allocation failed: {msg}"),
            EcsError::StaleEntity => write!(f, "stale entity handle"),
            EcsError::Conflict(msg) => write!(f, "conflict: {msg}"),
            EcsError::NotImplemented(msg) => write!(f, "not implemented: {msg}"),
        }
    }
}

impl std::error::Error for EcsError {}

/// Result type alias used throughout the crate.
pub type Result<T> = std::result::Result<T, EcsError>;
