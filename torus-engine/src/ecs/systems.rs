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
//! Gameplay systems
//!
//! Systems for everything a tick does besides physics and scripting:
//! steering input-controlled bodies, firing emitters, expiring timed
//! entities and aging particles. Each keeps its own scratch buffers so that
//! steady-state ticks do not allocate.

use crate::config::{EmitterConfig, PlayerConfig};
use crate::ecs::components::{Lifetime, PhysicsBody, RenderHint, Rgba, Role, Transform};
use crate::ecs::{ComponentStorage, Entity, System, World};
use crate::events::SoundCue;
use glam::DVec2;

const SHOT_SHAKE: f64 = 2.0;
const PROJECTILE_SCALE: f64 = 0.5;

/// Applies the polled input to every input-controlled body
///
/// Holding boost raises the speed cap and accelerates harder, at the cost
/// of a boost cue and exhaust particles every tick.
pub struct PlayerInputSystem {
    config: PlayerConfig,
    targets: Vec<Entity>,
}

impl PlayerInputSystem {
    /// Create the system
    pub fn new(config: PlayerConfig) -> Self {
        PlayerInputSystem {
            config,
            targets: Vec::new(),
        }
    }
}

impl System for PlayerInputSystem {
    fn run(&mut self, world: &mut World) {
        let input = world.input();
        let (storage, effects) = world.split_mut();

        self.targets.clear();
        self.targets
            .extend(storage.input_controlled.iter().map(|(entity, _)| entity));

        for &entity in &self.targets {
            let (Some(transform), Some(body)) =
                (storage.transforms.get_mut(entity), storage.bodies.get_mut(entity))
            else {
                continue;
            };

            let accel = if input.boost {
                body.set_max_speed(self.config.max_speed * self.config.boost_multiplier);
                effects.play(SoundCue::Boost);
                effects.thrusters(transform.position, body.velocity());
                self.config.boost_accel
            } else {
                body.set_max_speed(self.config.max_speed);
                self.config.accel
            };

            body.apply_force(input.direction * accel);
            if input.has_direction() {
                transform.rotation = input.direction.y.atan2(input.direction.x);
            }
        }
    }

    fn name(&self) -> &str {
        "PlayerInputSystem"
    }
}

struct PendingShot {
    position: DVec2,
    rotation: f64,
    direction: DVec2,
}

/// Fires projectiles from emitters on the simulation clock
pub struct ProjectileEmitterSystem {
    config: EmitterConfig,
    shots: Vec<PendingShot>,
}

impl ProjectileEmitterSystem {
    /// Create the system
    pub fn new(config: EmitterConfig) -> Self {
        ProjectileEmitterSystem {
            config,
            shots: Vec::new(),
        }
    }

    fn spawn(&self, world: &mut World, shot: &PendingShot) -> Entity {
        let position = world
            .domain()
            .wrap_position(shot.position + shot.direction * self.config.muzzle_offset);
        let entity = world.create_entity();
        let storage = world.storage_mut();
        storage
            .transforms
            .insert(entity, Transform::new(position, shot.rotation));
        storage.bodies.insert(
            entity,
            PhysicsBody::new(self.config.projectile_max_speed, 1.0, self.config.projectile_mass)
                .with_velocity(shot.direction * self.config.projectile_speed),
        );
        storage.renders.insert(
            entity,
            RenderHint {
                color: Rgba::WHITE,
                glow: false,
                scale: PROJECTILE_SCALE,
            },
        );
        storage
            .lifetimes
            .insert(entity, Lifetime::new(self.config.projectile_lifetime));
        storage.roles.insert(entity, Role::Projectile);
        entity
    }
}

impl System for ProjectileEmitterSystem {
    fn run(&mut self, world: &mut World) {
        let now = world.clock().elapsed;
        let (storage, effects) = world.split_mut();

        self.shots.clear();
        for (entity, emitter) in storage.emitters.iter_mut() {
            if !emitter.is_due(now) {
                continue;
            }
            emitter.last_fire = now;
            effects.play(SoundCue::Shoot);
            effects.shake(SHOT_SHAKE);

            let Some(transform) = storage.transforms.get(entity) else {
                log::trace!("emitter {entity} has no transform, shot dropped");
                continue;
            };
            let direction = transform.facing();
            if let Some(body) = storage.bodies.get_mut(entity) {
                body.set_velocity(body.velocity() - direction * self.config.recoil);
            }
            self.shots.push(PendingShot {
                position: transform.position,
                rotation: transform.rotation,
                direction,
            });
        }

        let shots = std::mem::take(&mut self.shots);
        for shot in &shots {
            let projectile = self.spawn(world, shot);
            log::trace!("spawned projectile {projectile}");
        }
        self.shots = shots;
    }

    fn name(&self) -> &str {
        "ProjectileEmitterSystem"
    }
}

/// Counts down lifetimes and destroys expired entities
#[derive(Default)]
pub struct LifetimeSystem {
    expired: Vec<Entity>,
}

impl LifetimeSystem {
    /// Create the system
    pub fn new() -> Self {
        Self::default()
    }
}

impl System for LifetimeSystem {
    fn run(&mut self, world: &mut World) {
        let dt = world.clock().time_step;
        self.expired.clear();
        for (entity, lifetime) in world.storage_mut().lifetimes.iter_mut() {
            if lifetime.tick(dt) {
                self.expired.push(entity);
            }
        }
        for &entity in &self.expired {
            world.destroy_entity(entity);
        }
    }

    fn name(&self) -> &str {
        "LifetimeSystem"
    }
}

/// Ages particles and returns dead ones to the pool
#[derive(Default)]
pub struct ParticleUpdateSystem;

impl System for ParticleUpdateSystem {
    fn run(&mut self, world: &mut World) {
        world.effects_mut().update_particles();
    }

    fn name(&self) -> &str {
        "ParticleUpdateSystem"
    }
}
