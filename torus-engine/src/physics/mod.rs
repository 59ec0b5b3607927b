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
//! Physics system
//!
//! One tick, for every entity with a body, in ascending id order:
//!
//! 1. accumulate gravity from every well except its own (projectiles are
//!    exempt),
//! 2. integrate with semi-implicit Euler and wrap the position,
//! 3. resolve obstacle collisions against the spatial grid, rebuilt at the
//!    start of the tick.
//!
//! Walls broken and projectiles spent during the tick are destroyed once
//! every body has been processed, so ids stay stable while iterating.

pub mod collision;
pub mod gravity;
pub mod integration;

use crate::config::{PhysicsConfig, SimConfig};
use crate::ecs::components::Role;
use crate::ecs::{ComponentStorage, Entity, System, World};
use crate::grid::SpatialGrid;
use collision::CollisionContext;
use gravity::WellSample;

/// Forces, integration and collision for every body
pub struct PhysicsSystem {
    config: PhysicsConfig,
    grid: SpatialGrid,
    wells: Vec<WellSample>,
    order: Vec<Entity>,
    candidates: Vec<Entity>,
    pending_destroy: Vec<Entity>,
}

impl PhysicsSystem {
    /// Create a physics system
    pub fn new(config: PhysicsConfig, grid: SpatialGrid) -> Self {
        PhysicsSystem {
            config,
            grid,
            wells: Vec::new(),
            order: Vec::new(),
            candidates: Vec::new(),
            pending_destroy: Vec::new(),
        }
    }

    /// Create a physics system sized for `config`
    pub fn from_config(config: &SimConfig) -> Self {
        Self::new(
            config.physics.clone(),
            SpatialGrid::new(&config.domain, &config.grid),
        )
    }

    /// Spatial grid as of the last tick
    pub fn grid(&self) -> &SpatialGrid {
        &self.grid
    }

    /// Tuning
    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    /// Advance every body by one tick
    pub fn step(&mut self, world: &mut World) {
        let domain = *world.domain();
        let spectre = world.find_role(Role::Spectre);
        self.grid.rebuild(world.storage());
        gravity::collect_wells(world.storage(), &mut self.wells);

        self.order.clear();
        self.order
            .extend(world.storage().bodies.iter().map(|(entity, _)| entity));

        let (storage, effects) = world.split_mut();
        for &entity in &self.order {
            let Some(position) = storage.transforms.get(entity).map(|t| t.position) else {
                log::trace!("body {entity} has no transform, skipped");
                continue;
            };
            let exempt = self.config.projectiles_ignore_gravity
                && storage.role(entity).is_some_and(|role| role.ignores_gravity());
            let Some(body) = storage.bodies.get_mut(entity) else {
                continue;
            };

            if !exempt {
                let pull = gravity::accumulate(
                    &domain,
                    entity,
                    position,
                    body.gravity_multiplier(),
                    &self.wells,
                    &self.config,
                );
                body.apply_force(pull);
            }

            let moved = integration::integrate(body, position, &domain);
            if let Some(transform) = storage.transforms.get_mut(entity) {
                transform.position = moved;
            }

            let ctx = CollisionContext {
                domain: &domain,
                config: &self.config,
                grid: &self.grid,
                spectre,
            };
            let outcome = collision::resolve(&ctx, entity, storage, effects, &mut self.candidates);
            if let Some(wall) = outcome.broken_wall {
                self.pending_destroy.push(wall);
            }
            if outcome.projectile_spent {
                self.pending_destroy.push(entity);
            }
        }

        for entity in self.pending_destroy.drain(..) {
            world.destroy_entity(entity);
        }
    }
}

impl System for PhysicsSystem {
    fn run(&mut self, world: &mut World) {
        self.step(world);
    }

    fn name(&self) -> &str {
        "PhysicsSystem"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::components::{GravityWell, PhysicsBody, Transform, Wall};
    use glam::DVec2;

    fn system() -> PhysicsSystem {
        PhysicsSystem::from_config(&SimConfig::default())
    }

    #[test]
    fn test_body_falls_toward_well() {
        let mut world = World::default();
        let well = world.create_entity();
        let body = world.create_entity();
        {
            let s = world.storage_mut();
            s.transforms.insert(well, Transform::at(DVec2::new(640.0, 360.0)));
            s.wells.insert(well, GravityWell::new(70.0, 2.0));
            s.transforms.insert(body, Transform::at(DVec2::new(440.0, 360.0)));
            s.bodies.insert(body, PhysicsBody::new(6.0, 1.0, 1.0));
        }
        system().step(&mut world);

        let v = world.storage().bodies.get(body).unwrap().velocity();
        assert!(v.x > 0.0);
        assert!(v.y.abs() < 1e-12);
    }

    #[test]
    fn test_body_stops_at_wall() {
        let mut world = World::default();
        let wall = world.create_entity();
        let body = world.create_entity();
        {
            let s = world.storage_mut();
            s.transforms.insert(wall, Transform::at(DVec2::new(110.0, 100.0)));
            s.walls.insert(wall, Wall::new(20.0, false));
            s.transforms.insert(body, Transform::at(DVec2::new(92.0, 100.0)));
            s.bodies.insert(
                body,
                PhysicsBody::new(10.0, 1.0, 1.0).with_velocity(DVec2::new(4.0, 0.0)),
            );
        }
        system().step(&mut world);

        assert_eq!(world.storage().bodies.get(body).unwrap().velocity(), DVec2::ZERO);
        assert!(world.is_alive(wall));
    }

    #[test]
    fn test_body_without_transform_is_skipped() {
        let mut world = World::default();
        let body = world.create_entity();
        world
            .storage_mut()
            .bodies
            .insert(body, PhysicsBody::new(5.0, 1.0, 1.0).with_velocity(DVec2::X));
        system().step(&mut world);
        assert_eq!(world.storage().bodies.get(body).unwrap().velocity(), DVec2::X);
    }
}
