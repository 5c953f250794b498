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

//! Parallel chunk executor.
//!
//! `for_each_chunk_parallel` visits the same set of chunks regardless of
//! worker count; only the interleaving of which worker processes which
//! chunk varies. With the `parallel` feature off it degenerates to the same
//! serial order `Query::for_each_chunk` uses.

use crate::error::{EcsError, Result};
use crate::query::{ChunkView, Query};
use crate::world::World;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Visit every chunk matched by `query`, refreshing it first and calling
/// `callback(chunk_view, worker_index, user)` once per chunk.
///
/// `worker_index` is `chunk_position % worker_count`: a deterministic
/// partitioning of the (deterministic) chunk set, not a real thread id —
/// workers are an abstract scheduling concept here, not literal threads.
/// `worker_count == 1` always runs serially on the calling thread.
///
/// Returns `InvalidArgument` if `worker_count == 0`, `Conflict` if the
/// world is currently deferring (`defer_depth() != 0`).
pub fn for_each_chunk_parallel<'w>(
    query: &mut Query,
    world: &'w World,
    worker_count: usize,
    callback: impl Fn(ChunkView<'w>, usize, *mut ()) + Sync,
    user: *mut (),
) -> Result<()> {
    if worker_count == 0 {
        return Err(EcsError::InvalidArgument(
            "worker_count must be at least 1".into(),
        ));
    }
    if world.defer_depth() != 0 {
        return Err(EcsError::Conflict(
            "for_each_chunk_parallel cannot run while the world is deferring".into(),
        ));
    }

    query.refresh(world);
    let locations = query.chunk_locations(world);

    #[cfg(feature = "parallel")]
    {
        // `user` is an opaque handle the caller is responsible for
        // synchronizing; convert to usize to cross the thread boundary the
        // same way the scheduler's stage executor did for its raw pointers.
        let user_addr = user as usize;
        locations
            .par_iter()
            .enumerate()
            .for_each(|(i, &(archetype_idx, chunk_idx))| {
                let archetype = &world.archetypes()[archetype_idx as usize];
                let view = query.view_for(archetype, chunk_idx);
                callback(view, i % worker_count, user_addr as *mut ());
            });
    }
    #[cfg(not(feature = "parallel"))]
    {
        for (i, &(archetype_idx, chunk_idx)) in locations.iter().enumerate() {
            let archetype = &world.archetypes()[archetype_idx as usize];
            let view = query.view_for(archetype, chunk_idx);
            callback(view, i % worker_count, user);
        }
    }
    Ok(())
}
