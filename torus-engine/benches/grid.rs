// Copyright 2025 John Brosnihan
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
//! Benchmarks for the obstacle grid
//!
//! Measures rebuild cost and neighbourhood queries as obstacle counts grow,
//! including the saturated fallback.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::DVec2;
use torus_engine::config::GridConfig;
use torus_engine::ecs::components::{Transform, Wall};
use torus_engine::ecs::{ComponentStorage, World};
use torus_engine::grid::SpatialGrid;
use torus_engine::Domain;

fn populated_world(n_walls: usize) -> World {
    let mut world = World::default();
    for i in 0..n_walls {
        let e = world.create_entity();
        let x = (i as f64 * 37.0) % 1280.0;
        let y = (i as f64 * 53.0) % 720.0;
        let s = world.storage_mut();
        s.transforms.insert(e, Transform::at(DVec2::new(x, y)));
        s.walls.insert(e, Wall::new(40.0, i % 2 == 0));
    }
    world
}

fn bench_rebuild(c: &mut Criterion) {
    let mut group = c.benchmark_group("grid_rebuild");
    let domain = Domain::default();

    for n_walls in [10, 100, 1000].iter() {
        let world = populated_world(*n_walls);
        group.bench_with_input(BenchmarkId::new("walls", n_walls), n_walls, |b, _| {
            let mut grid = SpatialGrid::new(&domain, &GridConfig::default());
            b.iter(|| grid.rebuild(black_box(world.storage())));
        });
    }

    group.finish();
}

fn bench_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("grid_query");
    let domain = Domain::default();

    for n_walls in [10, 100, 1000].iter() {
        let world = populated_world(*n_walls);
        let mut grid = SpatialGrid::new(&domain, &GridConfig::default());
        grid.rebuild(world.storage());

        group.bench_with_input(BenchmarkId::new("walls", n_walls), n_walls, |b, _| {
            let mut out = Vec::new();
            let mut x = 0.0;
            b.iter(|| {
                x = (x + 13.0) % 1280.0;
                grid.query_into(black_box(DVec2::new(x, 360.0)), &mut out);
                black_box(out.len())
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_rebuild, bench_query);
criterion_main!(benches);
