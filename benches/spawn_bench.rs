#![allow(dead_code)]

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use lattice::World;

#[derive(Debug, Clone)]
struct Position(f32, f32, f32);

#[derive(Debug, Clone)]
struct Velocity(f32, f32, f32);

#[derive(Debug, Clone)]
struct Health(u32);

fn spawn_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("spawn_bench");

    group.bench_function("spawn_2_components", |b| {
        let mut world = World::with_default_config().unwrap();
        b.iter(|| {
            for _ in 0..1000 {
                let e = world.create_entity().unwrap();
                world.add(e, Position(1.0, 2.0, 3.0)).unwrap();
                world.add(e, Velocity(1.0, 0.0, 0.0)).unwrap();
                black_box(e);
            }
        });
    });

    group.bench_function("spawn_3_components", |b| {
        let mut world = World::with_default_config().unwrap();
        b.iter(|| {
            for _ in 0..1000 {
                let e = world.create_entity().unwrap();
                world.add(e, Position(1.0, 2.0, 3.0)).unwrap();
                world.add(e, Velocity(1.0, 0.0, 0.0)).unwrap();
                world.add(e, Health(100)).unwrap();
                black_box(e);
            }
        });
    });

    group.finish();
}

fn query_iteration_benchmark(c: &mut Criterion) {
    let mut world = World::with_default_config().unwrap();
    for _ in 0..10_000 {
        let e = world.create_entity().unwrap();
        world.add(e, Position(1.0, 2.0, 3.0)).unwrap();
        world.add(e, Velocity(1.0, 0.0, 0.0)).unwrap();
    }

    c.bench_function("query_iterate_10k", |b| {
        let position = world.find_component(std::any::type_name::<Position>()).unwrap();
        let mut query = lattice::Query::new(
            lattice::QueryDescriptor::new().with(position, lattice::Access::Write),
        );
        query.refresh(&world);
        b.iter(|| {
            let mut total = 0u32;
            query.for_each_chunk(&world, |view| total += view.count());
            black_box(total);
        });
    });
}

criterion_group!(benches, spawn_benchmark, query_iteration_benchmark);
criterion_main!(benches);
