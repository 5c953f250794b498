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

//! System access declarations used by the schedule planner's conflict
//! predicate.

use crate::component::ComponentId;
use smallvec::SmallVec;

/// The set of components a system reads and writes. Two systems conflict
/// when they share a component id with at least one side writing.
#[derive(Debug, Clone, Default)]
pub struct SystemAccess {
    pub reads: SmallVec<[ComponentId; 8]>,
    pub writes: SmallVec<[ComponentId; 8]>,
}

impl SystemAccess {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn read(mut self, component: ComponentId) -> Self {
        self.reads.push(component);
        self
    }

    pub fn write(mut self, component: ComponentId) -> Self {
        self.writes.push(component);
        self
    }

    /// True if `self` and `other` cannot run concurrently: any component
    /// appearing in one's `writes` and in either of the other's `reads` or
    /// `writes`.
    pub fn conflicts_with(&self, other: &SystemAccess) -> bool {
        self.writes.iter().any(|w| {
            other.writes.contains(w) || other.reads.contains(w)
        }) || other.writes.iter().any(|w| self.reads.contains(w))
    }
}

/// A schedulable unit of work: a closure over `&World` plus the access set
/// the scheduler uses to decide what can run alongside it. Component writes
/// happen in place through raw pointers fetched from the (shared) world —
/// sound because the schedule never runs two systems with conflicting
/// access concurrently. Structural changes (add/remove/destroy) instead go
/// through the supplied [`CommandBuffer`], since those need `&mut World`.
pub type SystemFn = Box<
    dyn Fn(&crate::world::World, &mut crate::command::CommandBuffer) -> crate::error::Result<()>
        + Send
        + Sync,
>;

pub struct System {
    pub name: String,
    pub access: SystemAccess,
    pub run: SystemFn,
}

impl System {
    pub fn new(name: impl Into<String>, access: SystemAccess, run: SystemFn) -> Self {
        System {
            name: name.into(),
            access,
            run,
        }
    }
}

impl std::fmt::Debug for System {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("System").field("name", &self.name).finish()
    }
}
