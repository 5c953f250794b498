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

//! Typed convenience layer over the erased component API.
//!
//! The core world only knows about byte-sized, aligned, opaque component
//! records. Most callers want `world.add(entity, Position { x, y })`
//! instead of hand-building a [`ComponentDescriptor`]; this module derives
//! one from a type's `size_of`/`align_of`/`needs_drop`.

use crate::component::{ComponentDescriptorBuilder, ComponentFlags, ComponentId};
use crate::entity::EntityId;
use crate::error::{EcsError, Result};
use crate::world::World;

/// Marker trait for types usable as component payloads. Blanket-implemented
/// for every `'static + Send + Sync` type, matching the erased core's only
/// real requirement (components must outlive no borrow and may cross
/// threads when a world is sent between them).
pub trait Component: 'static + Send + Sync {}
impl<T: 'static + Send + Sync> Component for T {}

unsafe fn drop_glue<T>(ptr: *mut u8, _user_data: *mut ()) {
    std::ptr::drop_in_place(ptr as *mut T);
}

impl World {
    /// Register `T` under `name`, deriving its descriptor from
    /// `size_of::<T>()`/`align_of::<T>()`, with a drop-glue destructor
    /// automatically supplied when `T` needs dropping. Zero-sized types are
    /// registered as `TAG` components.
    pub fn register<T: Component>(&mut self, name: impl Into<String>) -> Result<ComponentId> {
        let size = std::mem::size_of::<T>();
        let align = std::mem::align_of::<T>().max(1);
        let mut builder = ComponentDescriptorBuilder::new(name, size, align);
        if size == 0 {
            builder = builder.flags(ComponentFlags::TAG);
        } else if std::mem::needs_drop::<T>() {
            // SAFETY: the hook is only ever invoked on a pointer to a live
            // `T` written by `add::<T>`, by the world that owns the column.
            builder = builder.dtor(|ptr, user_data| unsafe { drop_glue::<T>(ptr, user_data) });
        }
        self.register_component(builder.build())
    }

    /// Add a `T` value to `entity`, registering it on first use under
    /// `std::any::type_name::<T>()` if not already registered.
    pub fn add<T: Component>(&mut self, entity: EntityId, value: T) -> Result<()> {
        let component = self.component_id_for::<T>()?;
        if std::mem::size_of::<T>() == 0 {
            std::mem::forget(value);
            return self.add_component_raw(entity, component, None);
        }
        let bytes = unsafe {
            std::slice::from_raw_parts(
                &value as *const T as *const u8,
                std::mem::size_of::<T>(),
            )
        };
        let result = self.add_component_raw(entity, component, Some(bytes));
        // The bytes were copied into the archetype column; forgetting here
        // avoids double-dropping `value`'s resources when `T` needs drop.
        std::mem::forget(value);
        result
    }

    fn component_id_for<T: Component>(&mut self) -> Result<ComponentId> {
        let name = std::any::type_name::<T>();
        match self.find_component(name) {
            Some(id) => Ok(id),
            None => self.register::<T>(name),
        }
    }

    pub fn get<T: Component>(&self, entity: EntityId) -> Result<Option<&T>> {
        let Some(component) = self.find_component(std::any::type_name::<T>()) else {
            return Ok(None);
        };
        let ptr = self.get_component_raw(entity, component)?;
        Ok(ptr.map(|p| unsafe { &*(p as *const T) }))
    }

    pub fn get_mut<T: Component>(&mut self, entity: EntityId) -> Result<Option<&mut T>> {
        let Some(component) = self.find_component(std::any::type_name::<T>()) else {
            return Ok(None);
        };
        let ptr = self.get_component_mut_raw(entity, component)?;
        Ok(ptr.map(|p| unsafe { &mut *(p as *mut T) }))
    }

    pub fn has<T: Component>(&self, entity: EntityId) -> Result<bool> {
        match self.find_component(std::any::type_name::<T>()) {
            Some(component) => self.has_component(entity, component),
            None => Ok(false),
        }
    }

    pub fn remove<T: Component>(&mut self, entity: EntityId) -> Result<()> {
        match self.find_component(std::any::type_name::<T>()) {
            Some(component) => self.remove_component_raw(entity, component),
            None => Err(EcsError::NotFound(format!(
                "component {} never registered",
                std::any::type_name::<T>()
            ))),
        }
    }
}
