use lattice::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq)]
struct A(i32);

#[derive(Debug, Clone, Copy, PartialEq)]
struct B(i32);

#[test]
fn system_enqueued_add_is_visible_only_after_flush() {
    let mut world = World::with_default_config().unwrap();
    let e = world.create_entity().unwrap();
    world.add(e, A(1)).unwrap();
    let a = world.find_component(std::any::type_name::<A>()).unwrap();
    let b = world.register::<B>("B").unwrap();

    let mut schedule = Schedule::new();
    schedule.add_system(System::new(
        "tag_with_b",
        SystemAccess::new().read(a),
        Box::new(move |world, commands| {
            if world.has::<A>(e).unwrap() {
                let bytes = 10i32.to_le_bytes();
                commands.push(Command::AddComponent {
                    entity: e,
                    component: b,
                    payload: Some(Box::from(&bytes[..])),
                });
            }
            Ok(())
        }),
    ));

    schedule.execute_oneshot(&mut world).unwrap();

    assert!(world.has::<B>(e).unwrap());
    assert_eq!(world.get::<B>(e).unwrap().unwrap().0, 10);
}

#[test]
fn deferred_mutation_applies_sequentially_across_flushes() {
    let mut world = World::with_default_config().unwrap();
    let e = world.create_entity().unwrap();
    world.add(e, A(1)).unwrap();

    world.begin_defer().unwrap();
    let a_id = world.find_component(std::any::type_name::<A>()).unwrap();
    world.enqueue(Command::RemoveComponent { entity: e, component: a_id });
    world.enqueue(Command::AddComponent {
        entity: e,
        component: a_id,
        payload: Some(Box::from(&2i32.to_le_bytes()[..])),
    });
    world.end_defer().unwrap();
    world.flush().unwrap();

    assert_eq!(world.get::<A>(e).unwrap().unwrap().0, 2);
}

#[test]
fn destroy_entity_via_command_buffer() {
    let mut world = World::with_default_config().unwrap();
    let e = world.create_entity().unwrap();

    world.begin_defer().unwrap();
    world.enqueue(Command::DestroyEntity { entity: e });
    world.end_defer().unwrap();
    world.flush().unwrap();

    assert!(!world.is_alive(e));
}
