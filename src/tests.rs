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

//! End-to-end scenarios exercising the public API across modules.

use crate::command::Command;
use crate::component::{ComponentDescriptorBuilder, ComponentFlags};
use crate::error::Result;
use crate::query::{Access, QueryDescriptor};
use crate::schedule::Schedule;
use crate::system::{System, SystemAccess};
use crate::world::World;

#[derive(Debug, Clone, Copy, PartialEq)]
#[repr(C)]
struct Vec3 {
    x: f32,
    y: f32,
    z: f32,
}

impl Vec3 {
    fn bytes(self) -> [u8; 12] {
        let mut out = [0u8; 12];
        out[0..4].copy_from_slice(&self.x.to_le_bytes());
        out[4..8].copy_from_slice(&self.y.to_le_bytes());
        out[8..12].copy_from_slice(&self.z.to_le_bytes());
        out
    }

    unsafe fn read(ptr: *const u8) -> Vec3 {
        let slice = std::slice::from_raw_parts(ptr, 12);
        Vec3 {
            x: f32::from_le_bytes(slice[0..4].try_into().unwrap()),
            y: f32::from_le_bytes(slice[4..8].try_into().unwrap()),
            z: f32::from_le_bytes(slice[8..12].try_into().unwrap()),
        }
    }
}

#[test]
fn lifecycle_and_staleness() -> Result<()> {
    let mut world = World::with_default_config()?;
    let e0 = world.create_entity()?;
    world.destroy_entity(e0)?;
    assert_eq!(world.destroy_entity(e0).unwrap_err().status_string(), "StaleEntity");
    let e1 = world.create_entity()?;
    assert_ne!(e0, e1);
    let stats = world.stats();
    assert_eq!(stats.live_entities, 1);
    Ok(())
}

#[test]
fn tag_visibility() -> Result<()> {
    let mut world = World::with_default_config()?;
    let tag = world.register_component(
        ComponentDescriptorBuilder::new("EnemyTag", 0, 1)
            .flags(ComponentFlags::TAG)
            .build(),
    )?;
    let e = world.create_entity()?;
    world.add_component_raw(e, tag, None)?;
    assert!(world.has_component(e, tag)?);
    assert!(world.get_component_raw(e, tag)?.is_none());
    Ok(())
}

#[test]
fn deferred_payload_is_copied_not_aliased() -> Result<()> {
    let mut world = World::with_default_config()?;
    let position = world.register_component(ComponentDescriptorBuilder::new("Position", 12, 4).build())?;
    let e = world.create_entity()?;

    let mut payload = Vec3 { x: 3.0, y: 4.0, z: 5.0 }.bytes();
    world.begin_defer()?;
    world.enqueue(Command::AddComponent {
        entity: e,
        component: position,
        payload: Some(Box::from(&payload[..])),
    });
    // Mutating the caller's buffer after enqueue must not affect the
    // queued command: the buffer owns a copy.
    payload = Vec3 { x: 99.0, y: 100.0, z: 101.0 }.bytes();
    let _ = payload;
    assert!(!world.has_component(e, position)?);
    world.end_defer()?;
    world.flush()?;

    assert!(world.has_component(e, position)?);
    let ptr = world.get_component_raw(e, position)?.unwrap();
    assert_eq!(unsafe { Vec3::read(ptr) }, Vec3 { x: 3.0, y: 4.0, z: 5.0 });
    Ok(())
}

#[test]
fn deferred_ordering_keeps_last_write_wins() -> Result<()> {
    let mut world = World::with_default_config()?;
    let position = world.register_component(ComponentDescriptorBuilder::new("Position", 12, 4).build())?;
    let e = world.create_entity()?;

    world.begin_defer()?;
    world.enqueue(Command::AddComponent {
        entity: e,
        component: position,
        payload: Some(Box::from(&Vec3 { x: 1.0, y: 1.0, z: 1.0 }.bytes()[..])),
    });
    world.enqueue(Command::RemoveComponent { entity: e, component: position });
    world.enqueue(Command::AddComponent {
        entity: e,
        component: position,
        payload: Some(Box::from(&Vec3 { x: 2.0, y: 2.0, z: 2.0 }.bytes()[..])),
    });
    world.end_defer()?;
    world.flush()?;

    assert!(world.has_component(e, position)?);
    let ptr = world.get_component_raw(e, position)?.unwrap();
    assert_eq!(unsafe { Vec3::read(ptr) }, Vec3 { x: 2.0, y: 2.0, z: 2.0 });
    Ok(())
}

#[test]
fn query_filter_tracks_structural_changes() -> Result<()> {
    let mut world = World::with_default_config()?;
    let position = world.register_component(ComponentDescriptorBuilder::new("Position", 12, 4).build())?;
    let velocity = world.register_component(ComponentDescriptorBuilder::new("Velocity", 12, 4).build())?;

    let e0 = world.create_entity()?;
    world.add_component_raw(e0, position, Some(&[0u8; 12]))?;
    let e1 = world.create_entity()?;
    world.add_component_raw(e1, position, Some(&[0u8; 12]))?;
    world.add_component_raw(e1, velocity, Some(&[0u8; 12]))?;
    let e2 = world.create_entity()?;
    world.add_component_raw(e2, velocity, Some(&[0u8; 12]))?;
    let _e3 = world.create_entity()?;

    let mut with_pos_no_vel =
        crate::query::Query::new(QueryDescriptor::new().with(position, Access::Read).without(velocity));
    with_pos_no_vel.refresh(&world);
    let mut seen = Vec::new();
    with_pos_no_vel.for_each_chunk(&world, |view| seen.extend_from_slice(view.entities()));
    assert_eq!(seen, vec![e0]);

    world.add_component_raw(e0, velocity, Some(&[0u8; 12]))?;
    with_pos_no_vel.refresh(&world);
    let mut seen = Vec::new();
    with_pos_no_vel.for_each_chunk(&world, |view| seen.extend_from_slice(view.entities()));
    assert!(seen.is_empty());

    let mut pos_write_vel_read =
        crate::query::Query::new(QueryDescriptor::new().with(position, Access::Write).with(velocity, Access::Read));
    pos_write_vel_read.refresh(&world);
    let mut seen = Vec::new();
    pos_write_vel_read.for_each_chunk(&world, |view| seen.extend_from_slice(view.entities()));
    seen.sort();
    let mut expected = vec![e0, e1];
    expected.sort();
    assert_eq!(seen, expected);
    Ok(())
}

#[test]
fn schedule_batches_conflicting_systems_apart() -> Result<()> {
    let mut world = World::with_default_config()?;
    let position = world.register_component(ComponentDescriptorBuilder::new("Position", 12, 4).build())?;
    let velocity = world.register_component(ComponentDescriptorBuilder::new("Velocity", 12, 4).build())?;
    let health = world.register_component(ComponentDescriptorBuilder::new("Health", 4, 4).build())?;

    let mut schedule = Schedule::new();
    schedule.add_system(System::new(
        "movement",
        SystemAccess::new().write(position).read(velocity),
        Box::new(|_world, _cmds| Ok(())),
    ));
    schedule.add_system(System::new(
        "regen",
        SystemAccess::new().write(health),
        Box::new(|_world, _cmds| Ok(())),
    ));
    schedule.add_system(System::new(
        "physics",
        SystemAccess::new().write(velocity),
        Box::new(|_world, _cmds| Ok(())),
    ));

    let compiled = schedule.compile();
    assert_eq!(compiled.stats.batch_count, 2);
    assert_eq!(compiled.stats.edge_count, 1);
    assert_eq!(compiled.stats.max_batch_size, 2);

    compiled.execute(&schedule, &mut world)?;
    Ok(())
}

#[test]
fn round_trip_add_then_remove_returns_entity_to_original_archetype() -> Result<()> {
    let mut world = World::with_default_config()?;
    let position = world.register_component(ComponentDescriptorBuilder::new("Position", 12, 4).build())?;
    let e = world.create_entity()?;
    let before = world.stats().archetype_count;
    world.add_component_raw(e, position, Some(&[0u8; 12]))?;
    world.remove_component_raw(e, position)?;
    assert!(!world.has_component(e, position)?);
    assert_eq!(world.stats().archetype_count, before + 1);
    Ok(())
}

#[test]
fn entity_slot_table_grows_past_initial_capacity() -> Result<()> {
    let mut world = World::with_default_config()?;
    let mut entities = Vec::new();
    for _ in 0..300 {
        entities.push(world.create_entity()?);
    }
    assert_eq!(world.stats().live_entities, 300);
    for e in entities.drain(..) {
        assert!(world.is_alive(e));
    }
    Ok(())
}

#[test]
fn destructor_runs_exactly_once_per_add_remove_pair() -> Result<()> {
    use std::sync::atomic::{AtomicU32, Ordering};
    static DROPS: AtomicU32 = AtomicU32::new(0);

    unsafe fn dtor(_ptr: *mut u8, _user_data: *mut ()) {
        DROPS.fetch_add(1, Ordering::SeqCst);
    }

    let mut world = World::with_default_config()?;
    let tracked = world.register_component(
        ComponentDescriptorBuilder::new("Tracked", 4, 4)
            .dtor(dtor)
            .build(),
    )?;
    let e = world.create_entity()?;
    world.add_component_raw(e, tracked, Some(&[1, 2, 3, 4]))?;
    assert_eq!(DROPS.load(Ordering::SeqCst), 0);
    world.remove_component_raw(e, tracked)?;
    assert_eq!(DROPS.load(Ordering::SeqCst), 1);

    world.add_component_raw(e, tracked, Some(&[1, 2, 3, 4]))?;
    world.destroy_entity(e)?;
    assert_eq!(DROPS.load(Ordering::SeqCst), 2);
    Ok(())
}
