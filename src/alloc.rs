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

//! Caller-supplied allocator hooks.
//!
//! The world can be constructed with a custom `(alloc, free)` hook pair so
//! embedders can route entity-slot and chunk memory through their own
//! allocator. Supplying only one half of the pair is a configuration error.

use crate::error::{EcsError, Result};
use std::alloc::{alloc as std_alloc, dealloc as std_dealloc, Layout};
use std::ptr::NonNull;

/// `fn(size, align, user_data) -> *mut u8`, null on failure.
pub type AllocFn = fn(usize, usize, *mut ()) -> *mut u8;
/// `fn(ptr, size, align, user_data)`.
pub type FreeFn = fn(*mut u8, usize, usize, *mut ());

fn default_alloc(size: usize, align: usize, _user_data: *mut ()) -> *mut u8 {
    if size == 0 {
        return NonNull::<u8>::dangling().as_ptr();
    }
    let layout = match Layout::from_size_align(size, align) {
        Ok(l) => l,
        Err(_) => return std::ptr::null_mut(),
    };
    // SAFETY: layout has a non-zero size, checked above.
    unsafe { std_alloc(layout) }
}

fn default_free(ptr: *mut u8, size: usize, align: usize, _user_data: *mut ()) {
    if size == 0 {
        return;
    }
    let layout = match Layout::from_size_align(size, align) {
        Ok(l) => l,
        Err(_) => return,
    };
    // SAFETY: `ptr` was returned by `default_alloc` with the same layout.
    unsafe { std_dealloc(ptr, layout) }
}

/// Validated allocator used by the entity index and archetype chunk store.
#[derive(Clone, Copy)]
pub struct Allocator {
    alloc_fn: AllocFn,
    free_fn: FreeFn,
    user_data: *mut (),
}

// The hook pair is validated at construction and the user pointer is opaque
// to us; callers accepting a custom `Allocator` are responsible for thread
// safety of whatever `user_data` points at.
unsafe impl Send for Allocator {}
unsafe impl Sync for Allocator {}

impl Allocator {
    /// Build the default allocator, backed by `std::alloc`.
    pub fn default_allocator() -> Self {
        Allocator {
            alloc_fn: default_alloc,
            free_fn: default_free,
            user_data: std::ptr::null_mut(),
        }
    }

    /// Build a custom allocator from a hook pair. Both hooks must be
    /// supplied together, or neither.
    pub fn custom(alloc_fn: AllocFn, free_fn: FreeFn, user_data: *mut ()) -> Self {
        Allocator {
            alloc_fn,
            free_fn,
            user_data,
        }
    }

    /// Validate an `(Option<AllocFn>, Option<FreeFn>)` pair from a config
    /// struct and resolve it into a concrete `Allocator`.
    pub fn from_hooks(
        alloc_fn: Option<AllocFn>,
        free_fn: Option<FreeFn>,
        user_data: *mut (),
    ) -> Result<Self> {
        match (alloc_fn, free_fn) {
            (None, None) => Ok(Self::default_allocator()),
            (Some(a), Some(f)) => Ok(Self::custom(a, f, user_data)),
            _ => Err(EcsError::InvalidArgument(
                "alloc_fn and free_fn must be supplied together".into(),
            )),
        }
    }

    /// Allocate `size` bytes aligned to `align`. Zero-size allocations never
    /// reach the underlying hook and return a dangling, non-null sentinel.
    pub fn alloc(&self, size: usize, align: usize) -> Result<NonNull<u8>> {
        if size == 0 {
            return Ok(NonNull::<u8>::dangling());
        }
        let ptr = (self.alloc_fn)(size, align, self.user_data);
        NonNull::new(ptr).ok_or_else(|| {
            EcsError::AllocationFailed(format!("alloc({size}, {align}) returned null"))
        })
    }

    /// Free a block previously returned by [`Allocator::alloc`] with the
    /// same `size`/`align`. No-op for zero-size allocations.
    ///
    /// # Safety
    /// `ptr` must have been returned by this allocator's `alloc` with the
    /// same `size` and `align`, and must not be freed twice.
    pub unsafe fn free(&self, ptr: NonNull<u8>, size: usize, align: usize) {
        if size == 0 {
            return;
        }
        (self.free_fn)(ptr.as_ptr(), size, align, self.user_data);
    }
}

impl Default for Allocator {
    fn default() -> Self {
        Self::default_allocator()
    }
}
