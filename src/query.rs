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

//! Query compiler and chunk iterator.
//!
//! A [`QueryDescriptor`] names the component terms a query cares about; a
//! [`Query`] compiles that against the world's current archetypes into a
//! cached match list, refreshed lazily whenever the archetype count grows.

use crate::archetype::Chunk;
use crate::component::ComponentId;
use crate::entity::EntityId;
use crate::trace::{TraceEvent, TraceKind};
use crate::world::World;
use smallvec::SmallVec;
use std::ptr::NonNull;

#[cfg(feature = "profiling")]
use tracing::info_span;

/// Whether a query term is read-only or intends to write the column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read,
    Write,
}

/// A `with` term: a required component plus the access mode a system
/// declares for it, used by the scheduler's conflict predicate.
#[derive(Debug, Clone, Copy)]
pub struct WithTerm {
    pub component: ComponentId,
    pub access: Access,
}

/// Describes which archetypes a query should match: every `with` term must
/// be present, every `without` term must be absent.
#[derive(Debug, Clone, Default)]
pub struct QueryDescriptor {
    pub with: SmallVec<[WithTerm; 8]>,
    pub without: SmallVec<[ComponentId; 8]>,
}

impl QueryDescriptor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, component: ComponentId, access: Access) -> Self {
        self.with.push(WithTerm { component, access });
        self
    }

    pub fn without(mut self, component: ComponentId) -> Self {
        self.without.push(component);
        self
    }

    fn matches_signature(&self, signature: &[ComponentId]) -> bool {
        for term in &self.with {
            if !signature.contains(&term.component) {
                return false;
            }
        }
        for &excluded in &self.without {
            if signature.contains(&excluded) {
                return false;
            }
        }
        true
    }

    pub fn reads(&self) -> impl Iterator<Item = ComponentId> + '_ {
        self.with
            .iter()
            .filter(|t| t.access == Access::Read)
            .map(|t| t.component)
    }

    pub fn writes(&self) -> impl Iterator<Item = ComponentId> + '_ {
        self.with
            .iter()
            .filter(|t| t.access == Access::Write)
            .map(|t| t.component)
    }
}

/// A cached, compiled query: a list of (archetype, chunk) pairs known to
/// match the descriptor, refreshed against new archetypes as they appear.
pub struct Query {
    descriptor: QueryDescriptor,
    /// Archetype indices already scanned and matched (or rejected).
    matched_archetypes: Vec<u32>,
    archetypes_scanned: usize,
}

impl Query {
    pub fn new(descriptor: QueryDescriptor) -> Self {
        Query {
            descriptor,
            matched_archetypes: Vec::new(),
            archetypes_scanned: 0,
        }
    }

    pub fn descriptor(&self) -> &QueryDescriptor {
        &self.descriptor
    }

    /// Re-scan any archetypes created since the last refresh and extend the
    /// cached match list. Iteration order is deterministic: archetypes in
    /// creation order, chunks within an archetype in creation order.
    pub fn refresh(&mut self, world: &World) {
        #[cfg(feature = "profiling")]
        let _span = info_span!(
            "query.refresh",
            archetypes_scanned = self.archetypes_scanned,
            total_archetypes = world.signatures().len()
        )
        .entered();

        let signatures = world.signatures();
        while self.archetypes_scanned < signatures.len() {
            let idx = self.archetypes_scanned;
            if self.descriptor.matches_signature(&signatures[idx]) {
                self.matched_archetypes.push(idx as u32);
            }
            self.archetypes_scanned += 1;
        }
    }

    pub fn matched_archetype_count(&self) -> usize {
        self.matched_archetypes.len()
    }

    /// Total chunk count across every matched archetype, as of the last
    /// `refresh`.
    pub fn chunk_count(&self, world: &World) -> usize {
        self.matched_archetypes
            .iter()
            .map(|&a| world.archetypes()[a as usize].chunk_count())
            .sum()
    }

    /// Iterate every matching chunk, calling `f` with a [`ChunkView`] for
    /// each. Column pointers are resolved per `with` term, in descriptor
    /// order.
    pub fn for_each_chunk<'w>(&self, world: &'w World, mut f: impl FnMut(ChunkView<'w>)) {
        world.trace().emit(TraceEvent::new(TraceKind::QueryIterBegin));
        for &archetype_idx in &self.matched_archetypes {
            let archetype = &world.archetypes()[archetype_idx as usize];
            for chunk_idx in 0..archetype.chunk_count() as u32 {
                let view = self.view_for(archetype, chunk_idx);
                world
                    .trace()
                    .emit(TraceEvent::new(TraceKind::QueryIterChunk).with_count(view.count() as u64));
                f(view);
            }
        }
        // Emitted unconditionally, mirroring a paired begin/end even on an
        // empty match set: observers rely on always seeing both events.
        world.trace().emit(TraceEvent::new(TraceKind::QueryIterEnd));
    }

    /// Build the [`ChunkView`] for one specific `(archetype, chunk)` pair.
    /// Shared by the serial iterator above and the parallel executor, so
    /// both produce identical views for the same chunk.
    pub fn view_for<'w>(
        &self,
        archetype: &'w crate::archetype::Archetype,
        chunk_idx: u32,
    ) -> ChunkView<'w> {
        let chunk = archetype.chunk(chunk_idx);
        let columns: SmallVec<[Option<NonNull<u8>>; 8]> = self
            .descriptor
            .with
            .iter()
            .map(|term| archetype.column_ptr(chunk_idx, term.component))
            .collect();
        let item_sizes: SmallVec<[usize; 8]> = self
            .descriptor
            .with
            .iter()
            .map(|term| archetype.item_size(term.component).unwrap_or(0))
            .collect();
        ChunkView {
            chunk,
            columns,
            item_sizes,
        }
    }

    /// `(archetype_index, chunk_index)` pairs for every matched chunk, used
    /// by the parallel executor to fan work out without re-scanning.
    pub fn chunk_locations(&self, world: &World) -> Vec<(u32, u32)> {
        let mut out = Vec::new();
        for &archetype_idx in &self.matched_archetypes {
            let count = world.archetypes()[archetype_idx as usize].chunk_count() as u32;
            for chunk_idx in 0..count {
                out.push((archetype_idx, chunk_idx));
            }
        }
        out
    }
}

/// A read-only view over one chunk's rows for the columns a query asked
/// for, in descriptor order. `with_count` mirrors the descriptor's `with`
/// term count, independent of how many resolved to an actual column (tag
/// terms resolve to `None`).
pub struct ChunkView<'a> {
    chunk: &'a Chunk,
    columns: SmallVec<[Option<NonNull<u8>>; 8]>,
    item_sizes: SmallVec<[usize; 8]>,
}

impl<'a> ChunkView<'a> {
    pub fn count(&self) -> u32 {
        self.chunk.count()
    }

    pub fn entities(&self) -> &[EntityId] {
        self.chunk.entities()
    }

    pub fn with_count(&self) -> usize {
        self.columns.len()
    }

    /// Raw pointer to the start of the `term_index`-th `with` term's
    /// column, or `None` if that term is a tag.
    pub fn column(&self, term_index: usize) -> Option<NonNull<u8>> {
        self.columns.get(term_index).copied().flatten()
    }

    /// Pointer to `row`'s entry in the `term_index`-th column.
    pub fn row_ptr(&self, term_index: usize, row: u32) -> Option<*mut u8> {
        let ptr = self.column(term_index)?;
        let size = *self.item_sizes.get(term_index)?;
        Some(unsafe { ptr.as_ptr().add(row as usize * size) })
    }
}
