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
//! Feedback effects
//!
//! [`Effects`] bundles everything a tick can emit besides component
//! changes: the particle system, the seeded RNG that drives it, and the
//! outbound event queue. It is owned by the world and handed to systems
//! alongside component storage.

use crate::config::ParticleConfig;
use crate::ecs::components::Rgba;
use crate::ecs::Entity;
use crate::events::{SimEvent, SoundCue};
use crate::particles::{Behavior, ParticleSystem};
use glam::DVec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::f64::consts::TAU;

const ORBIT_DEBRIS_COLOR: Rgba = Rgba::opaque(255, 255, 200);
const IMPACT_COLOR: Rgba = Rgba::opaque(200, 200, 255);
const THRUSTER_COLOR: Rgba = Rgba::opaque(0, 255, 255);

/// Fraction of the impact velocity inherited by debris
const DEBRIS_BIAS: f64 = 0.2;

/// Particle outputs, RNG and event outbox for one world
pub struct Effects {
    particles: ParticleSystem,
    rng: ChaCha8Rng,
    events: Vec<SimEvent>,
}

impl Effects {
    /// Create an effects context with a seeded RNG
    pub fn new(config: ParticleConfig, seed: u64) -> Self {
        Effects {
            particles: ParticleSystem::with_config(config),
            rng: ChaCha8Rng::seed_from_u64(seed),
            events: Vec::new(),
        }
    }

    /// Live particles
    pub fn particles(&self) -> &ParticleSystem {
        &self.particles
    }

    /// Shared RNG
    pub fn rng_mut(&mut self) -> &mut ChaCha8Rng {
        &mut self.rng
    }

    /// Restart the RNG stream
    pub fn reseed(&mut self, seed: u64) {
        self.rng = ChaCha8Rng::seed_from_u64(seed);
    }

    /// Emit a single particle
    pub fn emit(&mut self, position: DVec2, velocity: DVec2, color: Rgba, decay: f64, behavior: Behavior) {
        self.particles
            .emit(position, velocity, color, decay, behavior, &mut self.rng);
    }

    /// Advance every particle by one tick
    pub fn update_particles(&mut self) {
        self.particles.update(&mut self.rng);
    }

    /// Queue a sound cue
    pub fn play(&mut self, cue: SoundCue) {
        self.events.push(SimEvent::Sound(cue));
    }

    /// Queue camera shake
    pub fn shake(&mut self, amount: f64) {
        self.events.push(SimEvent::ScreenShake(amount));
    }

    /// Queue an arbitrary event
    pub fn push_event(&mut self, event: SimEvent) {
        self.events.push(event);
    }

    /// Events queued since the last drain
    pub fn events(&self) -> &[SimEvent] {
        &self.events
    }

    /// Take every queued event
    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }

    /// Burst an entity into debris
    ///
    /// Emits a core of standard debris in the entity's color, orbiting
    /// fragments and flickering sparks, all biased along the impact velocity.
    pub fn shatter(&mut self, entity: Entity, position: DVec2, impact_velocity: DVec2, color: Rgba) {
        let bias = impact_velocity * DEBRIS_BIAS;
        self.debris(position, color, 15, 4.0, bias, Behavior::Standard);
        self.debris(position, ORBIT_DEBRIS_COLOR, 6, 6.0, bias, Behavior::Orbit);
        self.debris(position, color, 10, 3.0, bias, Behavior::Flicker);
        self.events.push(SimEvent::Shatter { entity, position });
    }

    /// Sparks for a projectile glancing off an indestructible obstacle
    pub fn impact(&mut self, position: DVec2) {
        self.debris(position, IMPACT_COLOR, 5, 2.0, DVec2::ZERO, Behavior::Flicker);
        self.events.push(SimEvent::Impact { position });
    }

    /// Exhaust particle trailing a boosting body
    pub fn thrusters(&mut self, position: DVec2, velocity: DVec2) {
        let jitter = DVec2::new(self.rng.gen::<f64>() - 0.5, self.rng.gen::<f64>() - 0.5) * 2.0;
        let exhaust = -velocity * 0.5 + jitter;
        self.emit(position, exhaust, THRUSTER_COLOR, 0.05, Behavior::Standard);
    }

    fn debris(&mut self, position: DVec2, color: Rgba, count: usize, max_speed: f64, bias: DVec2, behavior: Behavior) {
        for _ in 0..count {
            let angle = self.rng.gen::<f64>() * TAU;
            let speed = self.rng.gen::<f64>() * max_speed;
            let velocity = DVec2::new(angle.cos(), angle.sin()) * speed + bias;
            let decay = 0.01 + self.rng.gen::<f64>() * 0.04;
            self.emit(position, velocity, color, decay, behavior);
        }
    }

    /// Drop live particles and pending events, keeping pool allocations
    pub fn reset(&mut self) {
        self.particles.reset();
        self.events.clear();
    }
}

impl Default for Effects {
    fn default() -> Self {
        Effects::new(ParticleConfig::default(), 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shatter_emits_debris_and_event() {
        let mut effects = Effects::default();
        effects.shatter(Entity::new(4), DVec2::new(5.0, 5.0), DVec2::new(10.0, 0.0), Rgba::WHITE);

        assert_eq!(effects.particles().len(), 31);
        let orbiting = effects
            .particles()
            .iter()
            .filter(|p| p.behavior() == Behavior::Orbit)
            .count();
        assert_eq!(orbiting, 6);
        assert_eq!(
            effects.events(),
            &[SimEvent::Shatter {
                entity: Entity::new(4),
                position: DVec2::new(5.0, 5.0)
            }]
        );
    }

    #[test]
    fn test_impact_emits_sparks() {
        let mut effects = Effects::default();
        effects.impact(DVec2::ZERO);
        assert_eq!(effects.particles().len(), 5);
        assert!(effects
            .particles()
            .iter()
            .all(|p| p.color() == IMPACT_COLOR && p.behavior() == Behavior::Flicker));
    }

    #[test]
    fn test_drain_empties_queue() {
        let mut effects = Effects::default();
        effects.play(SoundCue::Boom);
        effects.shake(2.0);
        let drained = effects.drain_events();
        assert_eq!(drained.len(), 2);
        assert!(effects.events().is_empty());
    }

    #[test]
    fn test_seeded_runs_match() {
        let mut a = Effects::new(ParticleConfig::default(), 99);
        let mut b = Effects::new(ParticleConfig::default(), 99);
        a.shatter(Entity::new(0), DVec2::ZERO, DVec2::ZERO, Rgba::WHITE);
        b.shatter(Entity::new(0), DVec2::ZERO, DVec2::ZERO, Rgba::WHITE);
        let pa: Vec<DVec2> = a.particles().iter().map(|p| p.velocity()).collect();
        let pb: Vec<DVec2> = b.particles().iter().map(|p| p.velocity()).collect();
        assert_eq!(pa, pb);
    }
}
