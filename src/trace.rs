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

//! Synchronous trace hook for observing world activity.

use crate::component::ComponentId;
use crate::entity::EntityId;
use parking_lot::Mutex;

/// Discriminant for a [`TraceEvent`], independent of its payload fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceKind {
    DeferBegin,
    DeferEnd,
    DeferEnqueue,
    FlushBegin,
    FlushApply,
    FlushEnd,
    EntityCreate,
    EntityDestroy,
    ComponentAdd,
    ComponentRemove,
    QueryIterBegin,
    QueryIterChunk,
    QueryIterEnd,
}

/// A single emitted trace event. Fields not relevant to `kind` are left at
/// their default value rather than modeled as a per-kind enum, matching the
/// spec's flat-record trace shape.
#[derive(Debug, Clone, Copy)]
pub struct TraceEvent {
    pub kind: TraceKind,
    pub entity: EntityId,
    pub component: Option<ComponentId>,
    /// Number of rows visited, for `QueryIterChunk`; queue depth for
    /// `DeferEnqueue`/`FlushBegin`; otherwise `0`.
    pub count: u64,
    /// `None` means the operation succeeded; otherwise the failing
    /// [`crate::error::EcsError::status_string`] of a per-command
    /// `FlushApply` event.
    pub status: Option<&'static str>,
}

impl TraceEvent {
    pub fn new(kind: TraceKind) -> Self {
        TraceEvent {
            kind,
            entity: EntityId::NULL,
            component: None,
            count: 0,
            status: None,
        }
    }

    pub fn with_entity(mut self, entity: EntityId) -> Self {
        self.entity = entity;
        self
    }

    pub fn with_component(mut self, component: ComponentId) -> Self {
        self.component = Some(component);
        self
    }

    pub fn with_count(mut self, count: u64) -> Self {
        self.count = count;
        self
    }

    pub fn with_status(mut self, status: &'static str) -> Self {
        self.status = Some(status);
        self
    }
}

type Hook = Box<dyn FnMut(&TraceEvent) + Send>;

/// Holds at most one trace callback. Emission is synchronous: the hook runs
/// inline on the thread performing the traced operation. The mutex exists
/// so the hook slot is sound to hold behind `&World` rather than `&mut
/// World` even though, in practice, only one thread drives a given world at
/// a time.
#[derive(Default)]
pub struct TraceHook {
    callback: Mutex<Option<Hook>>,
}

impl TraceHook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, callback: Option<Hook>) {
        *self.callback.lock() = callback;
    }

    pub fn emit(&self, event: TraceEvent) {
        if let Some(callback) = self.callback.lock().as_mut() {
            callback(&event);
        }
    }

    pub fn is_set(&self) -> bool {
        self.callback.lock().is_some()
    }
}
