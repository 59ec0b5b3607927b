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
//! Simulation driver
//!
//! Owns the world and a staged scheduler holding the built-in systems.
//! The surrounding game loop calls [`Simulation::tick`] once per frame, or
//! the individual `step_*` entry points when it needs finer control.

use crate::config::SimConfig;
use crate::ecs::components::{
    AiBinding, BehaviorScript, GravityWell, InputControlled, PhysicsBody, ProjectileEmitter,
    RenderHint, Rgba, Role, Transform, Wall,
};
use crate::ecs::scheduler::{stages, Scheduler, StageId};
use crate::ecs::systems::{
    LifetimeSystem, ParticleUpdateSystem, PlayerInputSystem, ProjectileEmitterSystem,
};
use crate::ecs::{ComponentStorage, Entity, System, World};
use crate::input::InputSource;
use crate::level::LevelDef;
use crate::physics::PhysicsSystem;
use crate::scripting::{ScriptBridge, ScriptSystem};

const WELL_COLOR: Rgba = Rgba::opaque(20, 0, 40);
const WALL_COLOR: Rgba = Rgba::opaque(120, 120, 140);
const FRAGILE_WALL_COLOR: Rgba = Rgba::opaque(200, 120, 80);
const EMITTER_COLOR: Rgba = Rgba::opaque(200, 200, 200);
const SPECTRE_COLOR: Rgba = Rgba::opaque(255, 50, 50);
const RUNNER_COLOR: Rgba = Rgba::opaque(0, 255, 255);

/// The simulation core: a world plus the systems that advance it
pub struct Simulation {
    config: SimConfig,
    world: World,
    scheduler: Scheduler,
    runner: Option<Entity>,
    spectre: Option<Entity>,
}

impl Simulation {
    /// Create a simulation with the built-in systems
    ///
    /// `scripts` should already hold both behavior scripts; entities bound
    /// to a missing script simply do not act.
    pub fn new(config: SimConfig, scripts: ScriptBridge) -> Self {
        let mut scheduler = Scheduler::new();
        scheduler.add_system(PlayerInputSystem::new(config.player.clone()), stages::INPUT);
        scheduler.add_system(
            ProjectileEmitterSystem::new(config.emitter.clone()),
            stages::INPUT,
        );
        scheduler.add_system(PhysicsSystem::from_config(&config), stages::PHYSICS);
        scheduler.add_system(LifetimeSystem::new(), stages::LIFETIME);
        scheduler.add_system(ScriptSystem::new(scripts), stages::SCRIPTING);
        scheduler.add_system(ParticleUpdateSystem, stages::PARTICLES);

        log::debug!(
            "simulation ready with {} systems: {:?}",
            scheduler.system_count(),
            scheduler.system_names()
        );

        Simulation {
            world: World::from_config(&config),
            config,
            scheduler,
            runner: None,
            spectre: None,
        }
    }

    /// Register an extra system after the built-in ones of its stage
    pub fn add_system<S: System + 'static>(&mut self, system: S, stage: StageId) {
        self.scheduler.add_system(system, stage);
    }

    /// Replace the world's contents with a level
    ///
    /// Entity ids restart from zero, particles return to the pool and the
    /// RNG is reseeded so a level always starts from the same state.
    pub fn load_level(&mut self, level: &LevelDef) {
        let world = &mut self.world;
        world.reset();
        world.effects_mut().reseed(self.config.seed);
        world.set_goal(Some(level.memory.clone()));

        for def in &level.wells {
            let entity = world.create_entity();
            let storage = world.storage_mut();
            storage.transforms.insert(entity, Transform::at(def.position));
            storage
                .wells
                .insert(entity, GravityWell::new(def.radius, def.mass));
            storage.renders.insert(entity, RenderHint::new(WELL_COLOR));
            storage.roles.insert(entity, Role::GravityWell);
        }

        for def in &level.obstacles {
            let entity = world.create_entity();
            let color = if def.destructible {
                FRAGILE_WALL_COLOR
            } else {
                WALL_COLOR
            };
            let storage = world.storage_mut();
            storage.transforms.insert(entity, Transform::at(def.position));
            storage
                .walls
                .insert(entity, Wall::new(def.size, def.destructible));
            storage.renders.insert(entity, RenderHint::new(color));
            storage.roles.insert(entity, Role::Obstacle);
        }

        for def in &level.emitters {
            let entity = world.create_entity();
            let storage = world.storage_mut();
            storage
                .transforms
                .insert(entity, Transform::new(def.position, def.rotation));
            storage
                .emitters
                .insert(entity, ProjectileEmitter::new(def.interval));
            storage.renders.insert(entity, RenderHint::new(EMITTER_COLOR));
        }

        let spectre = world.create_entity();
        let runner = world.create_entity();
        let storage = world.storage_mut();

        storage
            .transforms
            .insert(spectre, Transform::at(level.spectre_start));
        storage.bodies.insert(
            spectre,
            PhysicsBody::new(self.config.spectre.max_speed, self.config.spectre.friction, 1.0),
        );
        storage
            .renders
            .insert(spectre, RenderHint::new(SPECTRE_COLOR).glowing());
        storage.ai.insert(
            spectre,
            AiBinding::new(BehaviorScript::Spectre).with_target(runner),
        );
        storage.roles.insert(spectre, Role::Spectre);

        storage
            .transforms
            .insert(runner, Transform::at(level.runner_start));
        storage.bodies.insert(
            runner,
            PhysicsBody::new(self.config.player.max_speed, self.config.player.friction, 1.0),
        );
        storage
            .renders
            .insert(runner, RenderHint::new(RUNNER_COLOR).glowing());
        storage.input_controlled.insert(runner, InputControlled);
        storage.ai.insert(
            runner,
            AiBinding::new(BehaviorScript::Runner).with_target(spectre),
        );
        storage.roles.insert(runner, Role::Runner);

        self.runner = Some(runner);
        self.spectre = Some(spectre);
        log::info!(
            "loaded level '{}' with {} entities",
            level.name,
            world.entity_count()
        );
    }

    /// Steer input-controlled bodies and fire emitters
    pub fn step_input(&mut self) {
        self.scheduler.run_stage(stages::INPUT, &mut self.world);
    }

    /// Gravity, integration and collision
    pub fn step_physics(&mut self) {
        self.scheduler.run_stage(stages::PHYSICS, &mut self.world);
    }

    /// Expire timed entities
    pub fn step_lifetimes(&mut self) {
        self.scheduler.run_stage(stages::LIFETIME, &mut self.world);
    }

    /// Run every behavior script once
    pub fn step_scripts(&mut self) {
        self.scheduler.run_stage(stages::SCRIPTING, &mut self.world);
    }

    /// Age and recycle particles
    pub fn step_particles(&mut self) {
        self.scheduler.run_stage(stages::PARTICLES, &mut self.world);
    }

    /// Advance one full tick
    ///
    /// Input is polled once and stored in the world, then every stage runs
    /// in order and the clock advances.
    pub fn tick(&mut self, input: &mut dyn InputSource) {
        self.world.set_input(input.poll());
        self.scheduler.run(&mut self.world);
        self.world.advance_clock();
    }

    /// Whether the spectre sits in the goal zone with the runner beside her
    pub fn goal_reached(&self) -> bool {
        let (Some(goal), Some(runner), Some(spectre)) = (self.world.goal(), self.runner, self.spectre)
        else {
            return false;
        };
        let transforms = &self.world.storage().transforms;
        let (Some(runner), Some(spectre)) = (transforms.get(runner), transforms.get(spectre)) else {
            return false;
        };
        let domain = self.world.domain();
        domain.wrapped_distance(spectre.position, goal.position) < goal.radius
            && domain.wrapped_distance(runner.position, spectre.position)
                < self.config.goal.partner_range
    }

    /// The player-controlled entity of the loaded level
    pub fn runner(&self) -> Option<Entity> {
        self.runner.filter(|&e| self.world.is_alive(e))
    }

    /// The script-driven counterpart of the loaded level
    pub fn spectre(&self) -> Option<Entity> {
        self.spectre.filter(|&e| self.world.is_alive(e))
    }

    /// The world
    pub fn world(&self) -> &World {
        &self.world
    }

    /// The world, mutably
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Active configuration
    pub fn config(&self) -> &SimConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::InputState;
    use glam::DVec2;

    fn idle_simulation() -> Simulation {
        let config = SimConfig::default();
        let scripts = ScriptBridge::new(&config.scripting);
        Simulation::new(config, scripts)
    }

    #[test]
    fn test_load_level_spawns_principals() {
        let mut sim = idle_simulation();
        let level = LevelDef::event_horizon();
        sim.load_level(&level);

        let runner = sim.runner().unwrap();
        let spectre = sim.spectre().unwrap();
        let storage = sim.world().storage();
        assert_eq!(storage.role(runner), Some(Role::Runner));
        assert_eq!(storage.role(spectre), Some(Role::Spectre));
        assert_eq!(storage.ai.get(spectre).unwrap().target, Some(runner));
        assert_eq!(storage.ai.get(runner).unwrap().target, Some(spectre));
        assert!(storage.input_controlled.contains(runner));
        assert_eq!(
            sim.world().entity_count(),
            level.wells.len() + level.obstacles.len() + level.emitters.len() + 2
        );
    }

    #[test]
    fn test_reload_restarts_ids() {
        let mut sim = idle_simulation();
        sim.load_level(&LevelDef::binary_star());
        let first = sim.runner();
        for _ in 0..10 {
            sim.tick(&mut InputState::IDLE);
        }
        sim.load_level(&LevelDef::binary_star());
        assert_eq!(sim.runner(), first);
        assert_eq!(sim.world().clock().tick, 0);
    }

    #[test]
    fn test_tick_advances_clock_and_moves_runner() {
        let mut sim = idle_simulation();
        sim.load_level(&LevelDef::event_horizon());
        let runner = sim.runner().unwrap();
        let start = sim.world().storage().transforms.get(runner).unwrap().position;

        let mut input = InputState::new(DVec2::new(0.0, -1.0), false);
        sim.tick(&mut input);

        assert_eq!(sim.world().clock().tick, 1);
        let now = sim.world().storage().transforms.get(runner).unwrap().position;
        assert_ne!(start, now);
    }

    #[test]
    fn test_goal_check() {
        let mut sim = idle_simulation();
        let level = LevelDef::event_horizon();
        sim.load_level(&level);
        assert!(!sim.goal_reached());

        let runner = sim.runner().unwrap();
        let spectre = sim.spectre().unwrap();
        let storage = sim.world_mut().storage_mut();
        storage.transforms.get_mut(spectre).unwrap().position = level.memory.position;
        storage.transforms.get_mut(runner).unwrap().position =
            level.memory.position + DVec2::new(50.0, 0.0);
        assert!(sim.goal_reached());
    }
}
