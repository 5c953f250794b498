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

//! Archetype and chunk storage: structure-of-arrays rows grouped into
//! fixed-capacity chunks.

use crate::alloc::Allocator;
use crate::component::{ComponentDescriptor, ComponentId};
use crate::entity::EntityId;
use crate::error::{EcsError, Result};
use rustc_hash::FxHashMap;
use std::alloc::Layout;
use std::ptr::NonNull;

pub const DEFAULT_CHUNK_BYTES: usize = 16 * 1024;
const MIN_ROWS_PER_CHUNK: u32 = 1;
const MAX_ROWS_PER_CHUNK: u32 = 4096;

/// A non-tag column's per-entry layout, captured once at archetype creation.
#[derive(Clone, Copy)]
struct ColumnLayout {
    component: ComponentId,
    size: usize,
    align: usize,
}

/// One fixed-capacity, columnar block of rows. The entity array and every
/// non-empty component column each get their own allocation, so that
/// columns stay independently typed and aligned rather than interleaved
/// into one block.
pub struct Chunk {
    entities: NonNull<EntityId>,
    columns: Vec<NonNull<u8>>,
    capacity: u32,
    count: u32,
}

impl Chunk {
    fn new(allocator: &Allocator, capacity: u32, layouts: &[ColumnLayout]) -> Result<Self> {
        let entities = allocator.alloc(
            capacity as usize * std::mem::size_of::<EntityId>(),
            std::mem::align_of::<EntityId>(),
        )?;
        let mut columns = Vec::with_capacity(layouts.len());
        for layout in layouts {
            let ptr = allocator.alloc(layout.size * capacity as usize, layout.align)?;
            columns.push(ptr);
        }
        Ok(Chunk {
            entities: entities.cast(),
            columns,
            capacity,
            count: 0,
        })
    }

    fn free(&mut self, allocator: &Allocator, layouts: &[ColumnLayout]) {
        unsafe {
            allocator.free(
                self.entities.cast(),
                self.capacity as usize * std::mem::size_of::<EntityId>(),
                std::mem::align_of::<EntityId>(),
            );
            for (ptr, layout) in self.columns.iter().zip(layouts) {
                allocator.free(*ptr, layout.size * self.capacity as usize, layout.align);
            }
        }
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.count == self.capacity
    }

    pub fn entities(&self) -> &[EntityId] {
        unsafe { std::slice::from_raw_parts(self.entities.as_ptr(), self.count as usize) }
    }

    /// Raw pointer to the start of a column's storage. Column index must
    /// match the archetype's `layouts` ordering, not the component id.
    pub fn column_ptr(&self, column: usize) -> NonNull<u8> {
        self.columns[column]
    }

    fn row_ptr(&self, column: usize, row: u32, item_size: usize) -> *mut u8 {
        unsafe { self.columns[column].as_ptr().add(row as usize * item_size) }
    }

    /// Append one row's entity id; caller writes component bytes separately.
    /// Returns the row index.
    fn push_entity(&mut self, entity: EntityId) -> u32 {
        let row = self.count;
        unsafe { self.entities.as_ptr().add(row as usize).write(entity) };
        self.count += 1;
        row
    }

    /// Swap-remove `row`. Destructs nothing itself; caller must run dtors
    /// for the removed row's components before (or as part of) calling
    /// this. Returns the entity id that was moved into `row`, if any.
    fn swap_remove(&mut self, row: u32, layouts: &[ColumnLayout]) -> Option<EntityId> {
        let last = self.count - 1;
        if row != last {
            unsafe {
                let e = self.entities.as_ptr().add(last as usize).read();
                self.entities.as_ptr().add(row as usize).write(e);
                for (i, layout) in layouts.iter().enumerate() {
                    let src = self.row_ptr(i, last, layout.size);
                    let dst = self.row_ptr(i, row, layout.size);
                    std::ptr::copy_nonoverlapping(src, dst, layout.size);
                }
            }
        }
        self.count -= 1;
        if row != last {
            Some(self.entities()[row as usize])
        } else {
            None
        }
    }
}

/// A set of same-shaped chunks holding every entity with a given sorted
/// set of component ids.
pub struct Archetype {
    pub components: Vec<ComponentId>,
    layouts: Vec<ColumnLayout>,
    column_index: FxHashMap<ComponentId, usize>,
    chunks: Vec<Chunk>,
    rows_per_chunk: u32,
}

impl Archetype {
    pub fn new(
        components: Vec<ComponentId>,
        descriptors: &[&ComponentDescriptor],
        chunk_byte_budget: usize,
    ) -> Self {
        debug_assert_eq!(components.len(), descriptors.len());
        let mut layouts = Vec::new();
        let mut column_index = FxHashMap::default();
        for (id, desc) in components.iter().zip(descriptors) {
            if desc.is_tag() {
                continue;
            }
            column_index.insert(*id, layouts.len());
            layouts.push(ColumnLayout {
                component: *id,
                size: desc.size,
                align: desc.align,
            });
        }
        let row_bytes: usize = std::mem::size_of::<EntityId>()
            + layouts.iter().map(|l| l.size).sum::<usize>();
        let rows_per_chunk = if row_bytes == 0 {
            MAX_ROWS_PER_CHUNK
        } else {
            ((chunk_byte_budget / row_bytes) as u32).clamp(MIN_ROWS_PER_CHUNK, MAX_ROWS_PER_CHUNK)
        };
        Archetype {
            components,
            layouts,
            column_index,
            chunks: Vec::new(),
            rows_per_chunk,
        }
    }

    pub fn rows_per_chunk(&self) -> u32 {
        self.rows_per_chunk
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub fn has_component(&self, id: ComponentId) -> bool {
        self.components.contains(&id)
    }

    pub fn column_for(&self, id: ComponentId) -> Option<usize> {
        self.column_index.get(&id).copied()
    }

    fn column_layouts(&self) -> &[ColumnLayout] {
        &self.layouts
    }

    /// Insert a new row for `entity`, allocating a fresh chunk if every
    /// existing one is full. Returns the (chunk_index, row) location.
    pub fn insert(&mut self, allocator: &Allocator, entity: EntityId) -> Result<(u32, u32)> {
        if self.chunks.last().map(|c| c.is_full()).unwrap_or(true) {
            let chunk = Chunk::new(allocator, self.rows_per_chunk, &self.layouts)?;
            self.chunks.push(chunk);
        }
        let chunk_index = self.chunks.len() as u32 - 1;
        let chunk = self.chunks.last_mut().unwrap();
        let row = chunk.push_entity(entity);
        Ok((chunk_index, row))
    }

    pub fn chunk(&self, index: u32) -> &Chunk {
        &self.chunks[index as usize]
    }

    pub fn chunk_mut(&mut self, index: u32) -> &mut Chunk {
        &mut self.chunks[index as usize]
    }

    pub fn column_ptr(&self, chunk: u32, component: ComponentId) -> Option<NonNull<u8>> {
        let col = self.column_index.get(&component)?;
        Some(self.chunks[chunk as usize].column_ptr(*col))
    }

    pub fn item_size(&self, component: ComponentId) -> Option<usize> {
        self.column_index
            .get(&component)
            .map(|&i| self.layouts[i].size)
    }

    /// Remove the row at `(chunk, row)` by swap-remove. Destructors for the
    /// removed row must already have been run by the caller. Returns the
    /// entity that got swapped into the vacated row, if any, so the caller
    /// can fix up its location in the entity index.
    pub fn remove(&mut self, chunk: u32, row: u32) -> Option<EntityId> {
        let layouts = self.layouts.clone();
        self.chunks[chunk as usize].swap_remove(row, &layouts)
    }

    /// Drop every column entry in every chunk using the descriptors' dtor
    /// hooks, then free all chunk allocations. Called when the archetype
    /// store itself is torn down.
    pub fn clear_and_free(
        &mut self,
        allocator: &Allocator,
        descriptor_for: impl Fn(ComponentId) -> Option<ComponentDescriptor>,
    ) {
        for chunk in &mut self.chunks {
            for (col_idx, layout) in self.layouts.iter().enumerate() {
                let Some(desc) = descriptor_for(layout.component) else {
                    continue;
                };
                if let Some(dtor) = desc.dtor {
                    for row in 0..chunk.count {
                        let ptr = chunk.row_ptr(col_idx, row, layout.size);
                        dtor(ptr, desc.user_data);
                    }
                }
            }
            chunk.free(allocator, &self.layouts);
        }
        self.chunks.clear();
    }
}
