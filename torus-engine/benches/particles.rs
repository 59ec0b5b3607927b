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
//! Benchmarks for particle pooling
//!
//! Compares steady-state bursts served from a warm pool against a pool
//! capped at zero, where every emission allocates.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::DVec2;
use torus_engine::config::ParticleConfig;
use torus_engine::ecs::components::Rgba;
use torus_engine::ecs::Entity;
use torus_engine::effects::Effects;

fn burst_and_drain(effects: &mut Effects, bursts: usize) {
    for i in 0..bursts {
        let at = DVec2::new(i as f64 * 10.0, 100.0);
        effects.shatter(Entity::new(0), at, DVec2::new(3.0, 1.0), Rgba::WHITE);
    }
    while !effects.particles().is_empty() {
        effects.update_particles();
    }
    effects.drain_events();
}

fn bench_pooled_bursts(c: &mut Criterion) {
    let mut group = c.benchmark_group("particle_bursts");

    for bursts in [1, 10, 50].iter() {
        group.bench_with_input(BenchmarkId::new("warm_pool", bursts), bursts, |b, &n| {
            let mut effects = Effects::new(ParticleConfig::default(), 1);
            burst_and_drain(&mut effects, n);
            b.iter(|| burst_and_drain(black_box(&mut effects), n));
        });

        group.bench_with_input(BenchmarkId::new("no_pool", bursts), bursts, |b, &n| {
            let config = ParticleConfig {
                max_pooled: 0,
                ..ParticleConfig::default()
            };
            let mut effects = Effects::new(config, 1);
            b.iter(|| burst_and_drain(black_box(&mut effects), n));
        });
    }

    group.finish();
}

fn bench_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("particle_update");

    for bursts in [10, 100].iter() {
        group.bench_with_input(BenchmarkId::new("live", bursts), bursts, |b, &n| {
            let mut effects = Effects::new(ParticleConfig::default(), 2);
            b.iter(|| {
                if effects.particles().len() < n * 20 {
                    effects.shatter(Entity::new(0), DVec2::ZERO, DVec2::X, Rgba::WHITE);
                }
                effects.update_particles();
                effects.drain_events();
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_pooled_bursts, bench_update);
criterion_main!(benches);
