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

//! Lattice - an in-process, archetype-chunked entity component system.
//!
//! Entities live in archetypes grouped by component signature, stored as
//! structure-of-arrays chunks. Structural changes (add/remove component,
//! destroy) can be applied immediately or deferred into a [`CommandBuffer`]
//! for later, FIFO application. A [`Schedule`] groups systems into batches
//! that can run concurrently when their component access doesn't conflict.

pub mod alloc;
pub mod archetype;
pub mod command;
pub mod component;
pub mod entity;
pub mod error;
pub mod executor;
pub mod query;
pub mod schedule;
pub mod system;
pub mod trace;
pub mod typed;
pub mod world;

pub mod prelude;

pub use alloc::{AllocFn, Allocator, FreeFn};
pub use archetype::Archetype;
pub use command::{Command, CommandBuffer};
pub use component::{
    ComponentDescriptor, ComponentDescriptorBuilder, ComponentFlags, ComponentId, ComponentRegistry,
};
pub use entity::EntityId;
pub use error::{EcsError, Result};
pub use executor::for_each_chunk_parallel;
pub use query::{Access, ChunkView, Query, QueryDescriptor, WithTerm};
pub use schedule::{Batch, CompiledSchedule, Schedule, ScheduleStats};
pub use system::{System, SystemAccess, SystemFn};
pub use trace::{TraceEvent, TraceHook, TraceKind};
pub use typed::Component;
pub use world::{World, WorldConfig, WorldStats};

#[cfg(test)]
mod tests;
