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

//! Entity identifiers and the generational slot table.

use crate::error::{EcsError, Result};

/// Slot count never grows past this; the index is packed into 32 bits.
const MAX_SLOTS: u32 = u32::MAX;
const INITIAL_CAPACITY: u32 = 64;

/// Opaque entity handle: low 32 bits are the slot index, high 32 bits are
/// the slot's generation at the time the handle was issued. `NULL` (all
/// zero bits) never refers to a live entity because generations start at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u64);

impl EntityId {
    pub const NULL: EntityId = EntityId(0);

    #[inline]
    pub fn new(index: u32, generation: u32) -> Self {
        EntityId(((generation as u64) << 32) | index as u64)
    }

    #[inline]
    pub fn index(self) -> u32 {
        (self.0 & 0xFFFF_FFFF) as u32
    }

    #[inline]
    pub fn generation(self) -> u32 {
        (self.0 >> 32) as u32
    }

    #[inline]
    pub fn is_null(self) -> bool {
        self.0 == 0
    }
}

impl Default for EntityId {
    fn default() -> Self {
        EntityId::NULL
    }
}

/// Location and lifecycle state of a single entity slot.
#[derive(Debug, Clone, Copy)]
struct EntitySlot {
    generation: u32,
    alive: bool,
    archetype: u32,
    chunk: u32,
    row: u32,
    /// Next free slot index, valid only while `!alive`. `u32::MAX` marks the
    /// end of the free list.
    free_next: u32,
}

impl EntitySlot {
    const fn new() -> Self {
        EntitySlot {
            generation: 1,
            alive: false,
            archetype: u32::MAX,
            chunk: u32::MAX,
            row: u32::MAX,
            free_next: u32::MAX,
        }
    }
}

/// Location of a live entity's row inside the archetype/chunk store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityLocation {
    pub archetype: u32,
    pub chunk: u32,
    pub row: u32,
}

/// Generational free-list slot table backing entity handles.
pub struct EntityIndex {
    slots: Vec<EntitySlot>,
    free_head: u32,
    free_count: u32,
    live_count: u32,
}

impl EntityIndex {
    pub fn new() -> Self {
        EntityIndex {
            slots: Vec::new(),
            free_head: u32::MAX,
            free_count: 0,
            live_count: 0,
        }
    }

    pub fn with_capacity(capacity: u32) -> Self {
        let mut index = Self::new();
        if capacity > 0 {
            index.grow_to(capacity.min(MAX_SLOTS));
        }
        index
    }

    pub fn live_count(&self) -> u32 {
        self.live_count
    }

    pub fn capacity(&self) -> u32 {
        self.slots.len() as u32
    }

    /// Slots currently on the free list, available for reuse before the
    /// table needs to grow again.
    pub fn free_count(&self) -> u32 {
        self.free_count
    }

    /// Hard upper bound on the slot table, independent of how much of it is
    /// currently allocated.
    pub fn hard_cap(&self) -> u32 {
        MAX_SLOTS
    }

    fn grow_to(&mut self, new_capacity: u32) {
        let old_len = self.slots.len() as u32;
        if new_capacity <= old_len {
            return;
        }
        self.slots.resize(new_capacity as usize, EntitySlot::new());
        // Push new slots onto the free list, in increasing index order so
        // that allocation order stays predictable from the table's state.
        for idx in (old_len..new_capacity).rev() {
            self.slots[idx as usize].free_next = self.free_head;
            self.free_head = idx;
            self.free_count += 1;
        }
    }

    fn ensure_capacity_for_one(&mut self) -> Result<()> {
        if self.free_head != u32::MAX {
            return Ok(());
        }
        let current = self.slots.len() as u32;
        if current >= MAX_SLOTS {
            return Err(EcsError::CapacityReached("entity slot table".into()));
        }
        let target = if current == 0 {
            INITIAL_CAPACITY
        } else {
            current.saturating_mul(2)
        };
        self.grow_to(target.min(MAX_SLOTS));
        Ok(())
    }

    /// Allocate a new entity handle, reusing a free slot's index with a
    /// bumped generation when one is available.
    pub fn create(&mut self) -> Result<EntityId> {
        self.ensure_capacity_for_one()?;
        let idx = self.free_head;
        debug_assert!(idx != u32::MAX, "ensure_capacity_for_one must guarantee a free slot");
        let slot = &mut self.slots[idx as usize];
        self.free_head = slot.free_next;
        self.free_count -= 1;
        slot.alive = true;
        slot.free_next = u32::MAX;
        self.live_count += 1;
        Ok(EntityId::new(idx, slot.generation))
    }

    /// Check liveness without requiring a matching generation; used
    /// internally before location lookups.
    pub fn is_alive(&self, id: EntityId) -> bool {
        let idx = id.index() as usize;
        match self.slots.get(idx) {
            Some(slot) => slot.alive && slot.generation == id.generation(),
            None => false,
        }
    }

    fn slot_checked(&self, id: EntityId) -> Result<&EntitySlot> {
        let idx = id.index() as usize;
        let slot = self
            .slots
            .get(idx)
            .ok_or_else(|| EcsError::NotFound(format!("entity index {idx}")))?;
        if !slot.alive || slot.generation != id.generation() {
            return Err(EcsError::StaleEntity);
        }
        Ok(slot)
    }

    pub fn location(&self, id: EntityId) -> Result<EntityLocation> {
        let slot = self.slot_checked(id)?;
        Ok(EntityLocation {
            archetype: slot.archetype,
            chunk: slot.chunk,
            row: slot.row,
        })
    }

    pub fn set_location(&mut self, id: EntityId, location: EntityLocation) -> Result<()> {
        let idx = id.index() as usize;
        let slot = self
            .slots
            .get_mut(idx)
            .ok_or_else(|| EcsError::NotFound(format!("entity index {idx}")))?;
        if !slot.alive || slot.generation != id.generation() {
            return Err(EcsError::StaleEntity);
        }
        slot.archetype = location.archetype;
        slot.chunk = location.chunk;
        slot.row = location.row;
        Ok(())
    }

    /// Retire an entity: bump its generation and return its index to the
    /// free list. Returns the slot's prior location for the caller to use
    /// when removing the entity's row from its chunk.
    pub fn destroy(&mut self, id: EntityId) -> Result<EntityLocation> {
        let idx = id.index();
        let slot = self.slot_checked(id)?;
        let location = EntityLocation {
            archetype: slot.archetype,
            chunk: slot.chunk,
            row: slot.row,
        };
        let slot = &mut self.slots[idx as usize];
        slot.alive = false;
        slot.generation = slot.generation.wrapping_add(1).max(1);
        slot.archetype = u32::MAX;
        slot.chunk = u32::MAX;
        slot.row = u32::MAX;
        slot.free_next = self.free_head;
        self.free_head = idx;
        self.free_count += 1;
        self.live_count -= 1;
        Ok(location)
    }

    pub fn reserve(&mut self, additional: u32) -> Result<()> {
        let have_free = self.free_count;
        if additional <= have_free {
            return Ok(());
        }
        let short = additional - have_free;
        let target = self
            .capacity()
            .saturating_add(short)
            .min(MAX_SLOTS);
        if target > MAX_SLOTS {
            return Err(EcsError::CapacityReached("entity slot table".into()));
        }
        self.grow_to(target);
        Ok(())
    }
}

impl Default for EntityIndex {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generation_starts_at_one_for_never_used_slot() {
        let mut index = EntityIndex::new();
        let id = index.create().unwrap();
        assert_eq!(id.generation(), 1);
        assert_eq!(id.index(), 0);
    }

    #[test]
    fn destroy_then_create_reuses_index_with_bumped_generation() {
        let mut index = EntityIndex::new();
        let a = index.create().unwrap();
        index.destroy(a).unwrap();
        let b = index.create().unwrap();
        assert_eq!(a.index(), b.index());
        assert_eq!(b.generation(), a.generation() + 1);
    }

    #[test]
    fn stale_handle_is_rejected_after_reuse() {
        let mut index = EntityIndex::new();
        let a = index.create().unwrap();
        index.destroy(a).unwrap();
        let _b = index.create().unwrap();
        assert!(!index.is_alive(a));
        let err = index.location(a).unwrap_err();
        assert_eq!(err.status_string(), "StaleEntity");
    }

    #[test]
    fn null_handle_never_alive() {
        let index = EntityIndex::new();
        assert!(!index.is_alive(EntityId::NULL));
    }

    #[test]
    fn capacity_doubles_from_initial_64() {
        let mut index = EntityIndex::new();
        for _ in 0..INITIAL_CAPACITY {
            index.create().unwrap();
        }
        assert_eq!(index.capacity(), INITIAL_CAPACITY);
        index.create().unwrap();
        assert_eq!(index.capacity(), INITIAL_CAPACITY * 2);
    }

    #[test]
    fn pack_unpack_round_trip() {
        let id = EntityId::new(123, 456);
        assert_eq!(id.index(), 123);
        assert_eq!(id.generation(), 456);
    }
}
