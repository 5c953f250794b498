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

//! Deferred command buffer.
//!
//! Structural changes made while iterating a query are recorded here
//! instead of applied immediately, then replayed in FIFO order on flush.
//! Commands are a closed sum type carrying owned, byte-copied payloads
//! rather than closures, so the buffer never holds a borrow of the world.

use crate::component::ComponentId;
use crate::entity::EntityId;
use crate::error::Result;
use crate::trace::{TraceEvent, TraceKind};
use crate::world::World;

pub enum Command {
    AddComponent {
        entity: EntityId,
        component: ComponentId,
        /// `None` for tag components, which carry no payload bytes.
        payload: Option<Box<[u8]>>,
    },
    RemoveComponent {
        entity: EntityId,
        component: ComponentId,
    },
    DestroyEntity {
        entity: EntityId,
    },
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Command::AddComponent { entity, component, .. } => f
                .debug_struct("AddComponent")
                .field("entity", entity)
                .field("component", component)
                .finish(),
            Command::RemoveComponent { entity, component } => f
                .debug_struct("RemoveComponent")
                .field("entity", entity)
                .field("component", component)
                .finish(),
            Command::DestroyEntity { entity } => {
                f.debug_struct("DestroyEntity").field("entity", entity).finish()
            }
        }
    }
}

/// FIFO queue of deferred structural changes, paired with the world's
/// `defer_depth` nesting counter.
#[derive(Default)]
pub struct CommandBuffer {
    commands: Vec<Command>,
}

impl CommandBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        CommandBuffer {
            commands: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, command: Command) {
        self.commands.push(command);
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// Apply every queued command to `world` in FIFO order. Stops at the
    /// first error without rolling back commands already applied, and
    /// drops the remaining unapplied commands from the buffer. Emits one
    /// `FlushApply` trace event per command attempted, carrying that
    /// command's outcome.
    pub fn apply(&mut self, world: &mut World) -> Result<()> {
        let pending = std::mem::take(&mut self.commands);
        for command in pending {
            let (entity, component) = match &command {
                Command::AddComponent { entity, component, .. } => (*entity, Some(*component)),
                Command::RemoveComponent { entity, component } => (*entity, Some(*component)),
                Command::DestroyEntity { entity } => (*entity, None),
            };
            let result = match command {
                Command::AddComponent {
                    entity,
                    component,
                    payload,
                } => world.add_component_raw(entity, component, payload.as_deref()),
                Command::RemoveComponent { entity, component } => {
                    world.remove_component_raw(entity, component)
                }
                Command::DestroyEntity { entity } => world.destroy_entity(entity),
            };

            let mut event = TraceEvent::new(TraceKind::FlushApply).with_entity(entity);
            if let Some(component) = component {
                event = event.with_component(component);
            }
            if let Err(ref err) = result {
                event = event.with_status(err.status_string());
            }
            world.trace().emit(event);

            result?;
        }
        Ok(())
    }
}
