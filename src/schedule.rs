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

//! Conflict-aware schedule planner.
//!
//! Systems are registered in a fixed order; `compile` groups them into
//! batches that can run concurrently using the same topological-batching
//! approach as a classic task scheduler: build a conflict graph (an edge
//! `i -> j` for `i < j` whenever the two systems' access sets conflict,
//! since registration order is the tie-break for ordering), then peel off
//! zero-in-degree nodes one layer at a time with Kahn's algorithm.

use crate::command::CommandBuffer;
use crate::error::Result;
use crate::system::System;
use crate::world::World;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

#[cfg(feature = "profiling")]
use tracing::info_span;

/// One layer of systems that can safely run concurrently.
pub type Batch = Vec<usize>;

/// Scheduling statistics returned alongside a compiled schedule.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScheduleStats {
    pub batch_count: usize,
    pub edge_count: usize,
    pub max_batch_size: usize,
}

/// A schedule's registered systems, in registration order.
pub struct Schedule {
    systems: Vec<System>,
}

impl Schedule {
    pub fn new() -> Self {
        Schedule { systems: Vec::new() }
    }

    pub fn add_system(&mut self, system: System) -> &mut Self {
        self.systems.push(system);
        self
    }

    pub fn len(&self) -> usize {
        self.systems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }

    /// Build the conflict graph and batch the systems via Kahn's algorithm.
    pub fn compile(&self) -> CompiledSchedule {
        let count = self.systems.len();
        // edges[i] holds every j > i that conflicts with i; registration
        // order breaks ties, so an edge only ever points forward.
        let mut edges: Vec<Vec<usize>> = vec![Vec::new(); count];
        let mut in_degree = vec![0usize; count];
        let mut edge_count = 0;
        for i in 0..count {
            for j in (i + 1)..count {
                if self.systems[i].access.conflicts_with(&self.systems[j].access) {
                    edges[i].push(j);
                    in_degree[j] += 1;
                    edge_count += 1;
                }
            }
        }

        let mut batches = Vec::new();
        let mut remaining_degree = in_degree.clone();
        let mut scheduled = vec![false; count];
        let mut scheduled_count = 0;
        while scheduled_count < count {
            let batch: Batch = (0..count)
                .filter(|&i| !scheduled[i] && remaining_degree[i] == 0)
                .collect();
            debug_assert!(
                !batch.is_empty() || scheduled_count == count,
                "conflict graph must be acyclic: forward-only edges can't cycle"
            );
            if batch.is_empty() {
                break;
            }
            for &i in &batch {
                scheduled[i] = true;
                scheduled_count += 1;
            }
            for &i in &batch {
                for &j in &edges[i] {
                    remaining_degree[j] -= 1;
                }
            }
            batches.push(batch);
        }

        let stats = ScheduleStats {
            batch_count: batches.len(),
            edge_count,
            max_batch_size: batches.iter().map(|b| b.len()).max().unwrap_or(0),
        };

        CompiledSchedule { batches, stats }
    }

    /// Compile and immediately run once, discarding the compiled plan.
    /// Convenient for schedules that don't change shape between ticks.
    pub fn execute_oneshot(&self, world: &mut World) -> Result<ScheduleStats> {
        let compiled = self.compile();
        compiled.execute(self, world)?;
        Ok(compiled.stats)
    }
}

impl Default for Schedule {
    fn default() -> Self {
        Self::new()
    }
}

/// The output of [`Schedule::compile`]: an ordered list of batches, each a
/// set of system indices into the originating `Schedule`.
pub struct CompiledSchedule {
    pub batches: Vec<Batch>,
    pub stats: ScheduleStats,
}

impl CompiledSchedule {
    /// Run every batch in order. Within a batch, systems run concurrently
    /// (via rayon under the `parallel` feature, sequentially otherwise);
    /// each system's deferred commands are collected and flushed into the
    /// world once its batch finishes, before the next batch starts.
    pub fn execute(&self, schedule: &Schedule, world: &mut World) -> Result<()> {
        #[cfg(feature = "profiling")]
        let _span = info_span!("schedule.execute", batch_count = self.stats.batch_count).entered();

        for batch in &self.batches {
            let mut buffers = run_batch(batch, &schedule.systems, world)?;
            for buffer in &mut buffers {
                buffer.apply(world)?;
            }
        }
        Ok(())
    }
}

#[cfg(feature = "parallel")]
fn run_batch(batch: &[usize], systems: &[System], world: &World) -> Result<Vec<CommandBuffer>> {
    batch
        .par_iter()
        .map(|&idx| {
            let mut buffer = CommandBuffer::new();
            (systems[idx].run)(world, &mut buffer)?;
            Ok(buffer)
        })
        .collect()
}

#[cfg(not(feature = "parallel"))]
fn run_batch(batch: &[usize], systems: &[System], world: &World) -> Result<Vec<CommandBuffer>> {
    batch
        .iter()
        .map(|&idx| {
            let mut buffer = CommandBuffer::new();
            (systems[idx].run)(world, &mut buffer)?;
            Ok(buffer)
        })
        .collect()
}
