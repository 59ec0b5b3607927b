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
//! World management
//!
//! The World is the central container for all simulation data: one
//! index-aligned [`Column`] per component kind, the list of live entities,
//! the domain, the effects context and the per-tick input and clock.
//!
//! Entity ids are row indices. Creating an entity appends an all-absent
//! row to every column; destroying one nulls its row and drops it from the
//! active list, but the row itself stays so no other id shifts. Only
//! [`World::reset`] shortens the columns.

use crate::config::{ParticleConfig, SimConfig};
use crate::ecs::component::{Column, ComponentStorage};
use crate::ecs::components::{
    AiBinding, GravityWell, InputControlled, Lifetime, PhysicsBody, ProjectileEmitter, RenderHint,
    Role, Transform, Wall,
};
use crate::ecs::Entity;
use crate::effects::Effects;
use crate::events::SimEvent;
use crate::input::InputState;
use crate::level::MemoryZone;
use crate::particles::ParticleSystem;
use crate::topology::Domain;

/// One column per component kind, all of the same length
#[derive(Debug, Clone, Default)]
pub struct Storage {
    /// Positions and facings
    pub transforms: Column<Transform>,
    /// Kinematic state
    pub bodies: Column<PhysicsBody>,
    /// Renderer hints
    pub renders: Column<RenderHint>,
    /// Script bindings
    pub ai: Column<AiBinding>,
    /// Entity roles
    pub roles: Column<Role>,
    /// Gravity wells
    pub wells: Column<GravityWell>,
    /// Input-steered markers
    pub input_controlled: Column<InputControlled>,
    /// Obstacles
    pub walls: Column<Wall>,
    /// Projectile emitters
    pub emitters: Column<ProjectileEmitter>,
    /// Time-to-live counters
    pub lifetimes: Column<Lifetime>,
}

impl Storage {
    fn with_capacity(capacity: usize) -> Self {
        Storage {
            transforms: Column::with_capacity(capacity),
            bodies: Column::with_capacity(capacity),
            renders: Column::with_capacity(capacity),
            ai: Column::with_capacity(capacity),
            roles: Column::with_capacity(capacity),
            wells: Column::with_capacity(capacity),
            input_controlled: Column::with_capacity(capacity),
            walls: Column::with_capacity(capacity),
            emitters: Column::with_capacity(capacity),
            lifetimes: Column::with_capacity(capacity),
        }
    }

    /// Number of rows in every column
    pub fn rows(&self) -> usize {
        self.transforms.len()
    }

    /// Role of an entity, if it has one
    pub fn role(&self, entity: Entity) -> Option<Role> {
        self.roles.get(entity).copied()
    }

    fn push_absent_row(&mut self) {
        self.transforms.push_absent();
        self.bodies.push_absent();
        self.renders.push_absent();
        self.ai.push_absent();
        self.roles.push_absent();
        self.wells.push_absent();
        self.input_controlled.push_absent();
        self.walls.push_absent();
        self.emitters.push_absent();
        self.lifetimes.push_absent();
    }

    fn clear_row(&mut self, entity: Entity) {
        self.transforms.remove(entity);
        self.bodies.remove(entity);
        self.renders.remove(entity);
        self.ai.remove(entity);
        self.roles.remove(entity);
        self.wells.remove(entity);
        self.input_controlled.remove(entity);
        self.walls.remove(entity);
        self.emitters.remove(entity);
        self.lifetimes.remove(entity);
    }

    fn truncate(&mut self) {
        self.transforms.truncate_rows();
        self.bodies.truncate_rows();
        self.renders.truncate_rows();
        self.ai.truncate_rows();
        self.roles.truncate_rows();
        self.wells.truncate_rows();
        self.input_controlled.truncate_rows();
        self.walls.truncate_rows();
        self.emitters.truncate_rows();
        self.lifetimes.truncate_rows();
    }

    fn column_lengths(&self) -> [usize; 10] {
        [
            self.transforms.len(),
            self.bodies.len(),
            self.renders.len(),
            self.ai.len(),
            self.roles.len(),
            self.wells.len(),
            self.input_controlled.len(),
            self.walls.len(),
            self.emitters.len(),
            self.lifetimes.len(),
        ]
    }

    /// Check that every column has the same number of rows
    pub fn is_aligned(&self) -> bool {
        let lengths = self.column_lengths();
        lengths.iter().all(|&len| len == lengths[0])
    }
}

/// Fixed-step simulation clock
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimClock {
    /// Ticks completed
    pub tick: u64,
    /// Simulated seconds elapsed
    pub elapsed: f64,
    /// Seconds per tick
    pub time_step: f64,
}

impl SimClock {
    /// Create a clock at time zero
    pub fn new(time_step: f64) -> Self {
        SimClock {
            tick: 0,
            elapsed: 0.0,
            time_step,
        }
    }

    /// Advance by one tick
    pub fn advance(&mut self) {
        self.tick += 1;
        self.elapsed = self.tick as f64 * self.time_step;
    }
}

impl Default for SimClock {
    fn default() -> Self {
        SimClock::new(1.0 / 60.0)
    }
}

/// The main simulation world container
pub struct World {
    next_id: u64,
    storage: Storage,
    active: Vec<Entity>,
    active_slot: Vec<Option<usize>>,
    domain: Domain,
    effects: Effects,
    input: InputState,
    goal: Option<MemoryZone>,
    clock: SimClock,
}

impl World {
    /// Create an empty world over `domain` with a seeded RNG
    pub fn new(domain: Domain, seed: u64) -> Self {
        Self::with_parts(domain, ParticleConfig::default(), seed, SimClock::default())
    }

    /// Create an empty world from a full configuration
    pub fn from_config(config: &SimConfig) -> Self {
        Self::with_parts(
            config.domain,
            config.particles.clone(),
            config.seed,
            SimClock::new(config.physics.time_step),
        )
    }

    fn with_parts(domain: Domain, particles: ParticleConfig, seed: u64, clock: SimClock) -> Self {
        let capacity = 64;
        World {
            next_id: 0,
            storage: Storage::with_capacity(capacity),
            active: Vec::with_capacity(capacity),
            active_slot: Vec::with_capacity(capacity),
            domain,
            effects: Effects::new(particles, seed),
            input: InputState::IDLE,
            goal: None,
            clock,
        }
    }

    /// Create a new entity with every component absent
    pub fn create_entity(&mut self) -> Entity {
        let entity = Entity::new(self.next_id);
        self.next_id += 1;
        self.storage.push_absent_row();
        self.active_slot.push(Some(self.active.len()));
        self.active.push(entity);
        entity
    }

    /// Destroy an entity
    ///
    /// Every component slot becomes absent and the id leaves the active
    /// list. Unknown or already destroyed ids are a no-op returning false.
    pub fn destroy_entity(&mut self, entity: Entity) -> bool {
        let Some(slot) = self.active_slot.get(entity.index()).copied().flatten() else {
            return false;
        };
        self.storage.clear_row(entity);
        self.active.swap_remove(slot);
        if let Some(&moved) = self.active.get(slot) {
            self.active_slot[moved.index()] = Some(slot);
        }
        self.active_slot[entity.index()] = None;
        true
    }

    /// Check if an entity is alive
    pub fn is_alive(&self, entity: Entity) -> bool {
        matches!(self.active_slot.get(entity.index()), Some(Some(_)))
    }

    /// Get the number of alive entities
    pub fn entity_count(&self) -> usize {
        self.active.len()
    }

    /// Alive entities in no particular order
    pub fn entities(&self) -> &[Entity] {
        &self.active
    }

    /// Clear every entity, particle and pending event
    ///
    /// Columns are truncated but keep their allocations, ids restart from
    /// zero and the clock rewinds.
    pub fn reset(&mut self) {
        self.storage.truncate();
        self.active.clear();
        self.active_slot.clear();
        self.next_id = 0;
        self.effects.reset();
        self.goal = None;
        self.input = InputState::IDLE;
        self.clock = SimClock::new(self.clock.time_step);
    }

    /// Component storage
    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    /// Mutable component storage
    pub fn storage_mut(&mut self) -> &mut Storage {
        &mut self.storage
    }

    /// Borrow storage and effects at the same time
    pub fn split_mut(&mut self) -> (&mut Storage, &mut Effects) {
        (&mut self.storage, &mut self.effects)
    }

    /// Effects context
    pub fn effects(&self) -> &Effects {
        &self.effects
    }

    /// Mutable effects context
    pub fn effects_mut(&mut self) -> &mut Effects {
        &mut self.effects
    }

    /// Live particles
    pub fn particles(&self) -> &ParticleSystem {
        self.effects.particles()
    }

    /// Take every event queued since the last drain
    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        self.effects.drain_events()
    }

    /// The wrapped plane
    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    /// Input polled for the current tick
    pub fn input(&self) -> InputState {
        self.input
    }

    /// Store the input for the current tick
    pub fn set_input(&mut self, input: InputState) {
        self.input = input;
    }

    /// Goal zone of the loaded level
    pub fn goal(&self) -> Option<&MemoryZone> {
        self.goal.as_ref()
    }

    /// Set the goal zone
    pub fn set_goal(&mut self, goal: Option<MemoryZone>) {
        self.goal = goal;
    }

    /// Simulation clock
    pub fn clock(&self) -> &SimClock {
        &self.clock
    }

    pub(crate) fn advance_clock(&mut self) {
        self.clock.advance();
    }

    /// First alive entity with the given role, by id
    pub fn find_role(&self, role: Role) -> Option<Entity> {
        self.storage
            .roles
            .iter()
            .find(|(entity, r)| **r == role && self.is_alive(*entity))
            .map(|(entity, _)| entity)
    }
}

impl Default for World {
    fn default() -> Self {
        World::new(Domain::default(), 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec2;

    #[test]
    fn test_world_entity_lifecycle() {
        let mut world = World::default();

        let e1 = world.create_entity();
        let e2 = world.create_entity();

        assert_eq!(world.entity_count(), 2);
        assert!(world.is_alive(e1));
        assert!(world.is_alive(e2));

        assert!(world.destroy_entity(e1));
        assert_eq!(world.entity_count(), 1);
        assert!(!world.is_alive(e1));
        assert!(world.is_alive(e2));
        assert_eq!(world.entities(), &[e2]);
    }

    #[test]
    fn test_destroy_nulls_every_slot() {
        let mut world = World::default();
        let e = world.create_entity();
        {
            let storage = world.storage_mut();
            storage.transforms.insert(e, Transform::at(DVec2::ONE));
            storage.bodies.insert(e, PhysicsBody::new(1.0, 1.0, 1.0));
            storage.roles.insert(e, Role::Runner);
            storage.lifetimes.insert(e, Lifetime::new(1.0));
        }
        world.destroy_entity(e);

        let storage = world.storage();
        assert!(!storage.transforms.contains(e));
        assert!(!storage.bodies.contains(e));
        assert!(!storage.roles.contains(e));
        assert!(!storage.lifetimes.contains(e));
        assert_eq!(storage.rows(), 1);
        assert!(storage.is_aligned());
    }

    #[test]
    fn test_destroy_is_idempotent_and_bounds_checked() {
        let mut world = World::default();
        let e = world.create_entity();
        assert!(world.destroy_entity(e));
        assert!(!world.destroy_entity(e));
        assert!(!world.destroy_entity(Entity::new(99)));
        assert_eq!(world.entity_count(), 0);
    }

    #[test]
    fn test_ids_are_not_reused() {
        let mut world = World::default();
        let a = world.create_entity();
        let b = world.create_entity();
        world.destroy_entity(a);
        let c = world.create_entity();
        assert_ne!(c, a);
        assert_ne!(c, b);
        assert!(!world.storage().transforms.contains(a));
    }

    #[test]
    fn test_swap_remove_keeps_slots_consistent() {
        let mut world = World::default();
        let ids: Vec<Entity> = (0..5).map(|_| world.create_entity()).collect();
        world.destroy_entity(ids[1]);
        world.destroy_entity(ids[4]);
        world.destroy_entity(ids[0]);

        let mut alive: Vec<Entity> = world.entities().to_vec();
        alive.sort();
        assert_eq!(alive, vec![ids[2], ids[3]]);
        assert!(world.destroy_entity(ids[3]));
        assert_eq!(world.entities(), &[ids[2]]);
    }

    #[test]
    fn test_reset_keeps_capacity() {
        let mut world = World::default();
        for _ in 0..200 {
            let e = world.create_entity();
            world.storage_mut().transforms.insert(e, Transform::default());
        }
        let capacity = world.storage().transforms.capacity();
        world.reset();

        assert_eq!(world.entity_count(), 0);
        assert_eq!(world.storage().rows(), 0);
        assert_eq!(world.storage().transforms.capacity(), capacity);
        assert_eq!(world.create_entity(), Entity::new(0));
    }

    #[test]
    fn test_find_role() {
        let mut world = World::default();
        let a = world.create_entity();
        let b = world.create_entity();
        world.storage_mut().roles.insert(a, Role::Obstacle);
        world.storage_mut().roles.insert(b, Role::Spectre);
        assert_eq!(world.find_role(Role::Spectre), Some(b));
        world.destroy_entity(b);
        assert_eq!(world.find_role(Role::Spectre), None);
    }
}
