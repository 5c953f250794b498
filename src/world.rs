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

//! The world: ties the entity index, component registry, archetype store,
//! command buffer and trace hook together behind the structural-change API.

use crate::alloc::{AllocFn, Allocator, FreeFn};
use crate::archetype::{Archetype, DEFAULT_CHUNK_BYTES};
use crate::command::{Command, CommandBuffer};
use crate::component::{ComponentDescriptor, ComponentId, ComponentRegistry};
use crate::entity::{EntityId, EntityIndex, EntityLocation};
use crate::error::{EcsError, Result};
use crate::trace::{TraceEvent, TraceHook, TraceKind};
use rustc_hash::FxHashMap;

#[cfg(feature = "profiling")]
use tracing::info_span;

/// One-shot construction parameters for a [`World`].
pub struct WorldConfig {
    pub alloc_fn: Option<AllocFn>,
    pub free_fn: Option<FreeFn>,
    pub allocator_user_data: *mut (),
    pub initial_entity_capacity: u32,
    pub initial_component_capacity: u32,
    pub chunk_byte_budget: usize,
}

impl Default for WorldConfig {
    fn default() -> Self {
        WorldConfig {
            alloc_fn: None,
            free_fn: None,
            allocator_user_data: std::ptr::null_mut(),
            initial_entity_capacity: 0,
            initial_component_capacity: 0,
            chunk_byte_budget: DEFAULT_CHUNK_BYTES,
        }
    }
}

/// Point-in-time counters, returned by [`World::stats`].
#[derive(Debug, Clone, Copy, Default)]
pub struct WorldStats {
    pub live_entities: u32,
    /// Hard upper bound on the entity slot table (`u32::MAX`), independent
    /// of how much of it is currently allocated.
    pub entity_capacity: u32,
    /// Slots currently grown into the table, live or free.
    pub allocated_entity_slots: u32,
    /// Allocated slots not currently backing a live entity.
    pub free_entity_slots: u32,
    pub registered_components: u32,
    pub archetype_count: u32,
    pub chunk_count: u32,
    pub pending_commands: u32,
    pub defer_depth: u32,
    pub structural_moves: u64,
}

/// Sorted component-id tuple identifying an archetype, used as a hash key.
type Signature = Vec<ComponentId>;

pub struct World {
    allocator: Allocator,
    entities: EntityIndex,
    components: ComponentRegistry,
    archetypes: Vec<Archetype>,
    archetype_lookup: FxHashMap<Signature, u32>,
    /// Signature of each archetype, parallel to `archetypes`, kept
    /// separately so lookups don't need to borrow `archetypes` itself.
    signatures: Vec<Signature>,
    chunk_byte_budget: usize,
    defer_depth: u32,
    pending: CommandBuffer,
    trace: TraceHook,
    /// Monotonically non-decreasing count of row-copying archetype
    /// transitions: one per cross-archetype migration and one per
    /// swap-remove that actually moves a row.
    structural_moves: u64,
}

impl World {
    pub fn new(config: WorldConfig) -> Result<Self> {
        let allocator = Allocator::from_hooks(
            config.alloc_fn,
            config.free_fn,
            config.allocator_user_data,
        )?;
        Ok(World {
            allocator,
            entities: EntityIndex::with_capacity(config.initial_entity_capacity),
            components: ComponentRegistry::new(),
            archetypes: Vec::with_capacity(config.initial_component_capacity as usize),
            archetype_lookup: FxHashMap::default(),
            signatures: Vec::new(),
            chunk_byte_budget: config.chunk_byte_budget.max(1),
            defer_depth: 0,
            pending: CommandBuffer::new(),
            trace: TraceHook::new(),
            structural_moves: 0,
        })
    }

    pub fn with_default_config() -> Result<Self> {
        Self::new(WorldConfig::default())
    }

    // -- component registry --------------------------------------------------

    pub fn register_component(&mut self, descriptor: ComponentDescriptor) -> Result<ComponentId> {
        self.components.register(descriptor)
    }

    pub fn find_component(&self, name: &str) -> Option<ComponentId> {
        self.components.find_by_name(name)
    }

    pub fn component_descriptor(&self, id: ComponentId) -> Result<&ComponentDescriptor> {
        self.components.descriptor(id)
    }

    // -- entity lifecycle -----------------------------------------------------

    pub fn create_entity(&mut self) -> Result<EntityId> {
        #[cfg(feature = "profiling")]
        let _span = info_span!("world.create_entity", live_entities = self.entities.live_count())
            .entered();

        let entity = self.entities.create()?;
        let empty_archetype = self.ensure_archetype(Vec::new())?;
        let (chunk, row) =
            self.archetypes[empty_archetype as usize].insert(&self.allocator, entity)?;
        self.entities.set_location(
            entity,
            EntityLocation {
                archetype: empty_archetype,
                chunk,
                row,
            },
        )?;
        self.trace
            .emit(TraceEvent::new(TraceKind::EntityCreate).with_entity(entity));
        Ok(entity)
    }

    pub fn is_alive(&self, entity: EntityId) -> bool {
        self.entities.is_alive(entity)
    }

    /// Destroy an entity: runs destructors for its row, swap-removes it
    /// from its chunk, bumps its generation and returns the slot to the
    /// free list. While `defer_depth > 0` this instead enqueues a command
    /// and returns `Ok` without touching storage.
    pub fn destroy_entity(&mut self, entity: EntityId) -> Result<()> {
        #[cfg(feature = "profiling")]
        let _span = info_span!("world.destroy_entity", entity = entity.0).entered();

        if self.defer_depth > 0 {
            self.enqueue(Command::DestroyEntity { entity });
            return Ok(());
        }

        let location = self.entities.destroy(entity)?;
        self.drop_row(location);
        let moved =
            self.archetypes[location.archetype as usize].remove(location.chunk, location.row);
        if moved.is_some() {
            self.structural_moves += 1;
        }
        if let Some(moved_entity) = moved {
            self.entities.set_location(moved_entity, location)?;
        }
        self.trace
            .emit(TraceEvent::new(TraceKind::EntityDestroy).with_entity(entity));
        Ok(())
    }

    fn drop_row(&self, location: EntityLocation) {
        let archetype = &self.archetypes[location.archetype as usize];
        for &component in &archetype.components {
            let Ok(desc) = self.components.descriptor(component) else {
                continue;
            };
            let Some(dtor) = desc.dtor else { continue };
            if let Some(ptr) = archetype.column_ptr(location.chunk, component) {
                let size = archetype.item_size(component).unwrap_or(0);
                let row_ptr = unsafe { ptr.as_ptr().add(location.row as usize * size) };
                dtor(row_ptr, desc.user_data);
            }
        }
    }

    // -- structural changes: add/remove component ----------------------------

    pub fn has_component(&self, entity: EntityId, component: ComponentId) -> Result<bool> {
        let location = self.entities.location(entity)?;
        Ok(self.archetypes[location.archetype as usize].has_component(component))
    }

    pub fn get_component_raw(
        &self,
        entity: EntityId,
        component: ComponentId,
    ) -> Result<Option<*const u8>> {
        let location = self.entities.location(entity)?;
        let archetype = &self.archetypes[location.archetype as usize];
        let Some(ptr) = archetype.column_ptr(location.chunk, component) else {
            return Ok(None);
        };
        let size = archetype.item_size(component).unwrap_or(0);
        Ok(Some(unsafe {
            ptr.as_ptr().add(location.row as usize * size)
        }))
    }

    pub fn get_component_mut_raw(
        &self,
        entity: EntityId,
        component: ComponentId,
    ) -> Result<Option<*mut u8>> {
        Ok(self
            .get_component_raw(entity, component)?
            .map(|p| p as *mut u8))
    }

    /// Add a component to a live entity, migrating it into the archetype
    /// for its current signature plus `component`. Returns `AlreadyExists`
    /// if the entity already carries `component`. While `defer_depth > 0`
    /// this instead enqueues a command (copying `payload`) and returns `Ok`
    /// without touching storage or checking for an existing component.
    pub fn add_component_raw(
        &mut self,
        entity: EntityId,
        component: ComponentId,
        payload: Option<&[u8]>,
    ) -> Result<()> {
        #[cfg(feature = "profiling")]
        let _span =
            info_span!("world.add_component", entity = entity.0, component = component.0).entered();

        if self.defer_depth > 0 {
            self.enqueue(Command::AddComponent {
                entity,
                component,
                payload: payload.map(Box::from),
            });
            return Ok(());
        }

        let location = self.entities.location(entity)?;
        let desc = self.components.descriptor(component)?.clone();
        if self.archetypes[location.archetype as usize].has_component(component) {
            return Err(EcsError::AlreadyExists(format!(
                "entity {} already has component {}",
                entity.0, component.0
            )));
        }
        self.migrate(entity, location, component, Some((desc, payload)))?;
        self.trace.emit(
            TraceEvent::new(TraceKind::ComponentAdd)
                .with_entity(entity)
                .with_component(component),
        );
        Ok(())
    }

    /// Remove a component from a live entity, migrating it into the
    /// archetype for its current signature minus `component`. A no-op (not
    /// an error) if the entity does not currently carry the component.
    /// While `defer_depth > 0` this instead enqueues a command and returns
    /// `Ok` without touching storage.
    pub fn remove_component_raw(&mut self, entity: EntityId, component: ComponentId) -> Result<()> {
        #[cfg(feature = "profiling")]
        let _span = info_span!("world.remove_component", entity = entity.0, component = component.0)
            .entered();

        if self.defer_depth > 0 {
            self.enqueue(Command::RemoveComponent { entity, component });
            return Ok(());
        }

        let location = self.entities.location(entity)?;
        if !self.archetypes[location.archetype as usize].has_component(component) {
            return Ok(());
        }
        self.drop_single_component(location, component);
        self.migrate_remove(entity, location, component)?;
        self.trace.emit(
            TraceEvent::new(TraceKind::ComponentRemove)
                .with_entity(entity)
                .with_component(component),
        );
        Ok(())
    }

    fn drop_single_component(&self, location: EntityLocation, component: ComponentId) {
        let archetype = &self.archetypes[location.archetype as usize];
        let Ok(desc) = self.components.descriptor(component) else {
            return;
        };
        let Some(dtor) = desc.dtor else { return };
        if let Some(ptr) = archetype.column_ptr(location.chunk, component) {
            let size = archetype.item_size(component).unwrap_or(0);
            let row_ptr = unsafe { ptr.as_ptr().add(location.row as usize * size) };
            dtor(row_ptr, desc.user_data);
        }
    }

    fn ensure_archetype(&mut self, mut signature: Signature) -> Result<u32> {
        signature.sort_unstable();
        signature.dedup();
        if let Some(&idx) = self.archetype_lookup.get(&signature) {
            return Ok(idx);
        }
        let descriptors: Result<Vec<&ComponentDescriptor>> = signature
            .iter()
            .map(|&id| self.components.descriptor(id))
            .collect();
        let descriptors = descriptors?;
        let archetype = Archetype::new(signature.clone(), &descriptors, self.chunk_byte_budget);
        let idx = self.archetypes.len() as u32;
        self.archetypes.push(archetype);
        self.signatures.push(signature.clone());
        self.archetype_lookup.insert(signature, idx);
        Ok(idx)
    }

    /// Move an entity's row from its current archetype to the archetype for
    /// `signature + added`, copying or moving every existing column and
    /// writing `added`'s payload (if any) into the new row.
    fn migrate(
        &mut self,
        entity: EntityId,
        location: EntityLocation,
        added: ComponentId,
        added_payload: Option<(ComponentDescriptor, Option<&[u8]>)>,
    ) -> Result<()> {
        let mut new_signature = self.signatures[location.archetype as usize].clone();
        new_signature.push(added);
        let new_archetype_idx = self.ensure_archetype(new_signature)?;

        let (new_chunk, new_row) =
            self.archetypes[new_archetype_idx as usize].insert(&self.allocator, entity)?;

        self.copy_shared_columns(location, new_archetype_idx, new_chunk, new_row);

        if let Some((desc, payload)) = added_payload {
            if let Some(ptr) =
                self.archetypes[new_archetype_idx as usize].column_ptr(new_chunk, added)
            {
                let size = self.archetypes[new_archetype_idx as usize]
                    .item_size(added)
                    .unwrap_or(0);
                let row_ptr = unsafe { ptr.as_ptr().add(new_row as usize * size) };
                if let Some(bytes) = payload {
                    debug_assert_eq!(bytes.len(), size);
                    unsafe { std::ptr::copy_nonoverlapping(bytes.as_ptr(), row_ptr, size) };
                } else if let Some(ctor) = desc.ctor {
                    ctor(row_ptr, desc.user_data);
                }
            }
        }

        // The cross-archetype copy itself counts as one structural move,
        // independent of whether removing the source row causes another.
        self.structural_moves += 1;

        let moved =
            self.archetypes[location.archetype as usize].remove(location.chunk, location.row);
        if moved.is_some() {
            self.structural_moves += 1;
        }
        if let Some(moved_entity) = moved {
            self.entities.set_location(moved_entity, location)?;
        }
        self.entities.set_location(
            entity,
            EntityLocation {
                archetype: new_archetype_idx,
                chunk: new_chunk,
                row: new_row,
            },
        )?;
        Ok(())
    }

    fn migrate_remove(
        &mut self,
        entity: EntityId,
        location: EntityLocation,
        removed: ComponentId,
    ) -> Result<()> {
        let new_signature: Signature = self.signatures[location.archetype as usize]
            .iter()
            .copied()
            .filter(|&c| c != removed)
            .collect();
        let new_archetype_idx = self.ensure_archetype(new_signature)?;

        let (new_chunk, new_row) =
            self.archetypes[new_archetype_idx as usize].insert(&self.allocator, entity)?;

        self.copy_shared_columns(location, new_archetype_idx, new_chunk, new_row);

        self.structural_moves += 1;

        let moved =
            self.archetypes[location.archetype as usize].remove(location.chunk, location.row);
        if moved.is_some() {
            self.structural_moves += 1;
        }
        if let Some(moved_entity) = moved {
            self.entities.set_location(moved_entity, location)?;
        }
        self.entities.set_location(
            entity,
            EntityLocation {
                archetype: new_archetype_idx,
                chunk: new_chunk,
                row: new_row,
            },
        )?;
        Ok(())
    }

    /// Copy every component column the old and new archetypes share into
    /// the new row, using the move hook when a column isn't trivially
    /// relocatable and a plain `memcpy` otherwise.
    fn copy_shared_columns(
        &self,
        old_location: EntityLocation,
        new_archetype: u32,
        new_chunk: u32,
        new_row: u32,
    ) {
        let old_archetype = &self.archetypes[old_location.archetype as usize];
        let new_arch = &self.archetypes[new_archetype as usize];
        for &component in &old_archetype.components {
            if !new_arch.has_component(component) {
                continue;
            }
            let Some(old_ptr) = old_archetype.column_ptr(old_location.chunk, component) else {
                continue;
            };
            let Some(new_ptr) = new_arch.column_ptr(new_chunk, component) else {
                continue;
            };
            let size = old_archetype.item_size(component).unwrap_or(0);
            let src = unsafe { old_ptr.as_ptr().add(old_location.row as usize * size) };
            let dst = unsafe { new_ptr.as_ptr().add(new_row as usize * size) };
            let Ok(desc) = self.components.descriptor(component) else {
                continue;
            };
            if desc.is_trivially_relocatable() || desc.move_fn.is_none() {
                unsafe { std::ptr::copy_nonoverlapping(src, dst, size) };
            } else if let Some(move_fn) = desc.move_fn {
                move_fn(dst, src, desc.user_data);
            }
        }
    }

    // -- deferred commands ----------------------------------------------------

    pub fn begin_defer(&mut self) -> Result<()> {
        self.defer_depth = self
            .defer_depth
            .checked_add(1)
            .ok_or_else(|| EcsError::CapacityReached("defer depth".into()))?;
        self.trace.emit(TraceEvent::new(TraceKind::DeferBegin));
        Ok(())
    }

    /// Ends one level of deferral. `Conflict` if called with no matching
    /// `begin_defer` (depth already `0`).
    pub fn end_defer(&mut self) -> Result<()> {
        if self.defer_depth == 0 {
            return Err(EcsError::Conflict(
                "end_defer called with no matching begin_defer".into(),
            ));
        }
        self.defer_depth -= 1;
        self.trace.emit(TraceEvent::new(TraceKind::DeferEnd));
        Ok(())
    }

    pub fn defer_depth(&self) -> u32 {
        self.defer_depth
    }

    pub fn enqueue(&mut self, command: Command) {
        self.pending.push(command);
        self.trace.emit(
            TraceEvent::new(TraceKind::DeferEnqueue).with_count(self.pending.len() as u64),
        );
    }

    /// Apply every pending command in FIFO order, stopping at the first
    /// error. The buffer is emptied regardless of whether an error occurs.
    /// `Conflict` if `defer_depth() != 0`; the queue is left untouched in
    /// that case.
    pub fn flush(&mut self) -> Result<()> {
        #[cfg(feature = "profiling")]
        let _span = info_span!("world.flush", pending = self.pending.len()).entered();

        if self.defer_depth != 0 {
            return Err(EcsError::Conflict(
                "flush cannot run while the world is still deferring".into(),
            ));
        }

        self.trace.emit(
            TraceEvent::new(TraceKind::FlushBegin).with_count(self.pending.len() as u64),
        );
        let mut buffer = std::mem::take(&mut self.pending);
        let result = buffer.apply(self);
        self.trace.emit(TraceEvent::new(TraceKind::FlushEnd));
        result
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    // -- introspection ----------------------------------------------------------

    pub fn archetypes(&self) -> &[Archetype] {
        &self.archetypes
    }

    pub fn signatures(&self) -> &[Signature] {
        &self.signatures
    }

    pub fn stats(&self) -> WorldStats {
        WorldStats {
            live_entities: self.entities.live_count(),
            entity_capacity: self.entities.hard_cap(),
            allocated_entity_slots: self.entities.capacity(),
            free_entity_slots: self.entities.free_count(),
            registered_components: self.components.len() as u32,
            archetype_count: self.archetypes.len() as u32,
            chunk_count: self.archetypes.iter().map(|a| a.chunk_count() as u32).sum(),
            pending_commands: self.pending.len() as u32,
            defer_depth: self.defer_depth,
            structural_moves: self.structural_moves,
        }
    }

    pub fn reserve_entities(&mut self, additional: u32) -> Result<()> {
        self.entities.reserve(additional)
    }

    pub fn set_trace_hook(&self, hook: Option<Box<dyn FnMut(&TraceEvent) + Send>>) {
        self.trace.set(hook);
    }

    pub fn trace(&self) -> &TraceHook {
        &self.trace
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{ComponentDescriptorBuilder, ComponentFlags};

    fn register_position(world: &mut World) -> ComponentId {
        world
            .register_component(ComponentDescriptorBuilder::new("Position", 8, 4).build())
            .unwrap()
    }

    #[test]
    fn create_entity_lands_in_empty_archetype() {
        let mut world = World::with_default_config().unwrap();
        let e = world.create_entity().unwrap();
        assert!(world.is_alive(e));
        assert_eq!(world.stats().live_entities, 1);
    }

    #[test]
    fn add_component_migrates_and_preserves_payload() {
        let mut world = World::with_default_config().unwrap();
        let position = register_position(&mut world);
        let e = world.create_entity().unwrap();
        let bytes = 42f32.to_le_bytes();
        let mut payload = [0u8; 8];
        payload[..4].copy_from_slice(&bytes);
        world.add_component_raw(e, position, Some(&payload)).unwrap();
        assert!(world.has_component(e, position).unwrap());
        let ptr = world.get_component_raw(e, position).unwrap().unwrap();
        let read_back = unsafe { std::slice::from_raw_parts(ptr, 8) };
        assert_eq!(read_back, &payload);
    }

    #[test]
    fn remove_component_migrates_back_to_empty_archetype() {
        let mut world = World::with_default_config().unwrap();
        let position = register_position(&mut world);
        let e = world.create_entity().unwrap();
        world.add_component_raw(e, position, None).unwrap();
        world.remove_component_raw(e, position).unwrap();
        assert!(!world.has_component(e, position).unwrap());
    }

    #[test]
    fn destroy_entity_frees_slot_and_invalidates_handle() {
        let mut world = World::with_default_config().unwrap();
        let e = world.create_entity().unwrap();
        world.destroy_entity(e).unwrap();
        assert!(!world.is_alive(e));
        let err = world.has_component(e, ComponentId(1)).unwrap_err();
        assert_eq!(err.status_string(), "StaleEntity");
    }

    #[test]
    fn tag_component_has_no_column_but_is_queryable() {
        let mut world = World::with_default_config().unwrap();
        let tag = world
            .register_component(
                ComponentDescriptorBuilder::new("Marker", 0, 1)
                    .flags(ComponentFlags::TAG)
                    .build(),
            )
            .unwrap();
        let e = world.create_entity().unwrap();
        world.add_component_raw(e, tag, None).unwrap();
        assert!(world.has_component(e, tag).unwrap());
        assert!(world.get_component_raw(e, tag).unwrap().is_none());
    }

    #[test]
    fn deferred_add_component_applies_on_flush() {
        let mut world = World::with_default_config().unwrap();
        let position = register_position(&mut world);
        let e = world.create_entity().unwrap();
        world.begin_defer().unwrap();
        let payload: Box<[u8]> = Box::from(&[0u8; 8][..]);
        world.enqueue(Command::AddComponent {
            entity: e,
            component: position,
            payload: Some(payload),
        });
        assert!(!world.has_component(e, position).unwrap());
        world.end_defer().unwrap();
        world.flush().unwrap();
        assert!(world.has_component(e, position).unwrap());
    }

    #[test]
    fn add_component_raw_rejects_duplicate() {
        let mut world = World::with_default_config().unwrap();
        let position = register_position(&mut world);
        let e = world.create_entity().unwrap();
        world.add_component_raw(e, position, None).unwrap();
        let err = world.add_component_raw(e, position, None).unwrap_err();
        assert_eq!(err.status_string(), "AlreadyExists");
    }

    #[test]
    fn structural_changes_while_deferring_enqueue_instead_of_mutating() {
        let mut world = World::with_default_config().unwrap();
        let position = register_position(&mut world);
        let e = world.create_entity().unwrap();
        world.begin_defer().unwrap();
        world.add_component_raw(e, position, None).unwrap();
        assert!(!world.has_component(e, position).unwrap());
        assert_eq!(world.pending_len(), 1);
        world.end_defer().unwrap();
        world.flush().unwrap();
        assert!(world.has_component(e, position).unwrap());
    }

    #[test]
    fn flush_while_deferring_is_conflict_and_leaves_queue_intact() {
        let mut world = World::with_default_config().unwrap();
        let e = world.create_entity().unwrap();
        world.begin_defer().unwrap();
        world.enqueue(Command::DestroyEntity { entity: e });
        let err = world.flush().unwrap_err();
        assert_eq!(err.status_string(), "Conflict");
        assert_eq!(world.pending_len(), 1);
    }

    #[test]
    fn end_defer_without_begin_is_conflict() {
        let mut world = World::with_default_config().unwrap();
        let err = world.end_defer().unwrap_err();
        assert_eq!(err.status_string(), "Conflict");
    }

    #[test]
    fn structural_moves_counts_migrations_and_chunk_moves() {
        let mut world = World::with_default_config().unwrap();
        let position = register_position(&mut world);
        let a = world.create_entity().unwrap();
        let b = world.create_entity().unwrap();

        // a's migration copies its row into the Position archetype (+1) and,
        // since a wasn't the last row in the shared empty archetype, swap-moves
        // b into a's old slot (+1). b's migration then copies its row too
        // (+1), but by then it's the only occupant of the empty archetype, so
        // the swap-remove is a no-op (no row left to move in).
        world.add_component_raw(a, position, None).unwrap();
        world.add_component_raw(b, position, None).unwrap();
        assert_eq!(world.stats().structural_moves, 3);

        // Removing `a` (not the last row of the Position archetype) copies its
        // row back into the empty archetype (+1) and swap-moves `b` into a's
        // vacated slot (+1).
        world.remove_component_raw(a, position).unwrap();
        assert_eq!(world.stats().structural_moves, 5);
    }

    #[test]
    fn stats_reports_all_ten_counters() {
        let mut world = World::with_default_config().unwrap();
        let position = register_position(&mut world);
        let e = world.create_entity().unwrap();
        world.add_component_raw(e, position, None).unwrap();
        let stats = world.stats();
        assert_eq!(stats.live_entities, 1);
        assert!(stats.entity_capacity > 0);
        assert!(stats.allocated_entity_slots > 0);
        assert_eq!(stats.registered_components, 1);
        assert_eq!(stats.archetype_count, 2);
        assert_eq!(stats.pending_commands, 0);
        assert_eq!(stats.defer_depth, 0);
        assert_eq!(stats.structural_moves, 1);
    }
}
