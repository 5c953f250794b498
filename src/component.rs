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

//! Component registry: descriptors, flags and name-based lookup.

use crate::error::{EcsError, Result};
use rustc_hash::FxHashMap;

/// 1-based dense component identifier. `0` is reserved and never issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(pub u32);

// Lightweight hand-rolled bitflags: the teacher's dependency stack has no
// `bitflags` crate anywhere in the corpus for this shape, and the type is
// three bits wide, so a small macro mirroring `bitflags!`'s surface avoids
// introducing a crate for a single-use type.
macro_rules! bitflags_like {
    (
        $(#[$meta:meta])*
        pub struct $name:ident($repr:ty) {
            $(const $flag:ident = $value:expr;)*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name($repr);

        impl $name {
            $(pub const $flag: $name = $name($value);)*

            pub const fn contains(self, other: $name) -> bool {
                (self.0 & other.0) == other.0
            }

            pub const fn union(self, other: $name) -> $name {
                $name(self.0 | other.0)
            }
        }

        impl std::ops::BitOr for $name {
            type Output = $name;
            fn bitor(self, rhs: $name) -> $name {
                self.union(rhs)
            }
        }
    };
}

bitflags_like! {
    /// Bit flags describing how a component's storage and lifetime behave.
    pub struct ComponentFlags(u32) {
        const NONE = 0;
        /// Zero-sized marker: no column allocation, no per-row storage.
        const TAG = 1 << 0;
        /// Safe to `memcpy` during archetype migration instead of calling
        /// the move hook.
        const TRIVIALLY_RELOCATABLE = 1 << 1;
    }
}

/// Constructor/destructor/move hooks operate on raw, type-erased bytes.
pub type CtorFn = fn(*mut u8, *mut ());
pub type DtorFn = fn(*mut u8, *mut ());
/// Move a single value from `src` to `dst`, leaving `src` logically empty.
pub type MoveFn = fn(dst: *mut u8, src: *mut u8, *mut ());

/// Full description of a registered component type.
#[derive(Clone)]
pub struct ComponentDescriptor {
    pub name: String,
    pub size: usize,
    pub align: usize,
    pub flags: ComponentFlags,
    pub ctor: Option<CtorFn>,
    pub dtor: Option<DtorFn>,
    pub move_fn: Option<MoveFn>,
    pub user_data: *mut (),
}

// The descriptor's raw hooks and user pointer are only ever invoked by the
// single world that owns the registry; they cross threads solely when the
// world itself is moved.
unsafe impl Send for ComponentDescriptor {}
unsafe impl Sync for ComponentDescriptor {}

impl ComponentDescriptor {
    pub fn is_tag(&self) -> bool {
        self.flags.contains(ComponentFlags::TAG)
    }

    pub fn is_trivially_relocatable(&self) -> bool {
        self.flags.contains(ComponentFlags::TRIVIALLY_RELOCATABLE)
    }
}

/// Builder for a [`ComponentDescriptor`], mirroring the spec's registration
/// call: name plus size/align/flags and optional hooks.
pub struct ComponentDescriptorBuilder {
    name: String,
    size: usize,
    align: usize,
    flags: ComponentFlags,
    ctor: Option<CtorFn>,
    dtor: Option<DtorFn>,
    move_fn: Option<MoveFn>,
    user_data: *mut (),
}

impl ComponentDescriptorBuilder {
    pub fn new(name: impl Into<String>, size: usize, align: usize) -> Self {
        ComponentDescriptorBuilder {
            name: name.into(),
            size,
            align,
            flags: ComponentFlags::NONE,
            ctor: None,
            dtor: None,
            move_fn: None,
            user_data: std::ptr::null_mut(),
        }
    }

    pub fn flags(mut self, flags: ComponentFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn ctor(mut self, ctor: CtorFn) -> Self {
        self.ctor = Some(ctor);
        self
    }

    pub fn dtor(mut self, dtor: DtorFn) -> Self {
        self.dtor = Some(dtor);
        self
    }

    pub fn move_fn(mut self, move_fn: MoveFn) -> Self {
        self.move_fn = Some(move_fn);
        self
    }

    pub fn user_data(mut self, user_data: *mut ()) -> Self {
        self.user_data = user_data;
        self
    }

    pub fn build(self) -> ComponentDescriptor {
        ComponentDescriptor {
            name: self.name,
            size: self.size,
            align: self.align,
            flags: self.flags,
            ctor: self.ctor,
            dtor: self.dtor,
            move_fn: self.move_fn,
            user_data: self.user_data,
        }
    }
}

/// Dense 1-based registry of component descriptors, name-unique.
pub struct ComponentRegistry {
    descriptors: Vec<ComponentDescriptor>,
    by_name: FxHashMap<String, ComponentId>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        ComponentRegistry {
            descriptors: Vec::new(),
            by_name: FxHashMap::default(),
        }
    }

    pub fn register(&mut self, descriptor: ComponentDescriptor) -> Result<ComponentId> {
        if self.by_name.contains_key(&descriptor.name) {
            return Err(EcsError::AlreadyExists(format!(
                "component '{}'",
                descriptor.name
            )));
        }
        if descriptor.flags.contains(ComponentFlags::TAG) && descriptor.size != 0 {
            return Err(EcsError::InvalidArgument(
                "TAG components must have size 0".into(),
            ));
        }
        let id = ComponentId(self.descriptors.len() as u32 + 1);
        self.by_name.insert(descriptor.name.clone(), id);
        self.descriptors.push(descriptor);
        Ok(id)
    }

    pub fn find_by_name(&self, name: &str) -> Option<ComponentId> {
        self.by_name.get(name).copied()
    }

    pub fn descriptor(&self, id: ComponentId) -> Result<&ComponentDescriptor> {
        id.0.checked_sub(1)
            .and_then(|idx| self.descriptors.get(idx as usize))
            .ok_or_else(|| EcsError::NotFound(format!("component id {}", id.0)))
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

impl Default for ComponentRegistry {
    fn default() -> Self {
        Self::new()
    }
}
