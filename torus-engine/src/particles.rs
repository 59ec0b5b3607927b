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
//! Pooled particle effects
//!
//! Particles are transient visual debris owned entirely by the
//! [`ParticleSystem`]; they are not entities and never touch component
//! storage. Dead particles go back to an [`ObjectPool`] so that a burst of
//! debris after a warm-up costs no heap allocation.
//!
//! Drawing is left to the embedding renderer, which reads position, size,
//! color and remaining life through [`ParticleSystem::iter`].

use crate::config::ParticleConfig;
use crate::ecs::components::Rgba;
use crate::pool::{ObjectPool, PoolConfig, PoolStats};
use glam::DVec2;
use rand::Rng;
use std::f64::consts::TAU;

/// Per-particle motion variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Behavior {
    /// Moves by its velocity
    #[default]
    Standard,
    /// Adds a rotating offset around its phase angle
    Orbit,
    /// Randomly resizes while moving
    Flicker,
}

/// A single piece of debris
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    position: DVec2,
    velocity: DVec2,
    life: f64,
    decay: f64,
    color: Rgba,
    size: f64,
    behavior: Behavior,
    phase: f64,
}

impl Particle {
    fn blank() -> Self {
        Particle {
            position: DVec2::ZERO,
            velocity: DVec2::ZERO,
            life: 0.0,
            decay: 0.0,
            color: Rgba::WHITE,
            size: 0.0,
            behavior: Behavior::Standard,
            phase: 0.0,
        }
    }

    /// Current position
    pub fn position(&self) -> DVec2 {
        self.position
    }

    /// Current velocity
    pub fn velocity(&self) -> DVec2 {
        self.velocity
    }

    /// Remaining life in `(0, 1]`
    pub fn life(&self) -> f64 {
        self.life
    }

    /// Life lost per tick
    pub fn decay(&self) -> f64 {
        self.decay
    }

    /// Tint
    pub fn color(&self) -> Rgba {
        self.color
    }

    /// Edge length in pixels
    pub fn size(&self) -> f64 {
        self.size
    }

    /// Motion variant
    pub fn behavior(&self) -> Behavior {
        self.behavior
    }

    /// Phase angle used by orbiting particles
    pub fn phase(&self) -> f64 {
        self.phase
    }

    fn advance<R: Rng + ?Sized>(&mut self, config: &ParticleConfig, rng: &mut R) {
        match self.behavior {
            Behavior::Standard => self.position += self.velocity,
            Behavior::Orbit => {
                self.phase += config.orbit_step;
                let offset = DVec2::new(self.phase.cos(), self.phase.sin()) * config.orbit_radius;
                self.position += self.velocity + offset;
            }
            Behavior::Flicker => {
                if rng.gen::<f64>() < config.flicker_chance {
                    self.size = rng.gen::<f64>() * config.flicker_max_size;
                }
                self.position += self.velocity;
            }
        }
        self.velocity *= config.drag;
    }
}

/// Emitter, ager and recycler of particles
pub struct ParticleSystem {
    active: Vec<Box<Particle>>,
    pool: ObjectPool<Box<Particle>>,
    config: ParticleConfig,
}

impl ParticleSystem {
    /// Create a system with default tuning
    pub fn new() -> Self {
        Self::with_config(ParticleConfig::default())
    }

    /// Create a system with the given tuning
    pub fn with_config(config: ParticleConfig) -> Self {
        let mut pool_config = PoolConfig::new(config.initial_capacity, config.max_pooled);
        if config.log_pool_growth {
            pool_config = pool_config.with_logging();
        }
        ParticleSystem {
            active: Vec::with_capacity(config.initial_capacity),
            pool: ObjectPool::with_config(pool_config),
            config,
        }
    }

    /// Spawn one particle with full life and a random size and phase
    ///
    /// Particles with a non-finite position or velocity, or a decay that is
    /// not a positive finite number, are dropped; returns whether the
    /// particle was emitted.
    pub fn emit<R: Rng + ?Sized>(
        &mut self,
        position: DVec2,
        velocity: DVec2,
        color: Rgba,
        decay: f64,
        behavior: Behavior,
        rng: &mut R,
    ) -> bool {
        if !position.is_finite() || !velocity.is_finite() {
            log::trace!("dropping particle with non-finite state");
            return false;
        }
        if !(decay.is_finite() && decay > 0.0) {
            log::trace!("dropping particle with decay {decay}");
            return false;
        }
        let mut particle = self.pool.acquire_with(|| Box::new(Particle::blank()));
        *particle = Particle {
            position,
            velocity,
            life: 1.0,
            decay,
            color,
            size: rng.gen_range(1.0..3.0),
            behavior,
            phase: rng.gen_range(0.0..TAU),
        };
        self.active.push(particle);
        true
    }

    /// Age every particle by one tick and recycle the dead ones
    pub fn update<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let mut i = 0;
        while i < self.active.len() {
            let particle = &mut self.active[i];
            particle.life -= particle.decay;
            if particle.life > 0.0 {
                particle.advance(&self.config, rng);
                i += 1;
            } else {
                let dead = self.active.swap_remove(i);
                self.pool.release(dead);
            }
        }
    }

    /// Return every active particle to the pool
    pub fn reset(&mut self) {
        for particle in self.active.drain(..) {
            self.pool.release(particle);
        }
    }

    /// Iterate over live particles
    pub fn iter(&self) -> impl Iterator<Item = &Particle> + '_ {
        self.active.iter().map(|p| p.as_ref())
    }

    /// Number of live particles
    pub fn len(&self) -> usize {
        self.active.len()
    }

    /// Check if there are no live particles
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Number of idle particles waiting in the pool
    pub fn pooled(&self) -> usize {
        self.pool.len()
    }

    /// Pool statistics
    pub fn pool_stats(&self) -> &PoolStats {
        self.pool.stats()
    }

    /// Motion tuning
    pub fn config(&self) -> &ParticleConfig {
        &self.config
    }
}

impl Default for ParticleSystem {
    fn default() -> Self {
        Self::new()
    }
}
