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
//! Simulation configuration
//!
//! Every tunable lives here with the defaults the game ships with. A config
//! can be built in code, or loaded from TOML where any omitted field keeps
//! its default:
//!
//! ```
//! use torus_engine::config::SimConfig;
//!
//! let config = SimConfig::from_toml_str(
//!     r#"
//!     seed = 7
//!
//!     [physics]
//!     force_cap = 3.0
//!     "#,
//! ).unwrap();
//! assert_eq!(config.seed, 7);
//! assert_eq!(config.physics.force_cap, 3.0);
//! assert_eq!(config.grid.cell_size, 100.0);
//! ```

use crate::error::{EngineError, Result};
use crate::topology::Domain;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Gravity, integration and collision constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Multiplier applied to well mass in the inverse-square law
    pub gravity_scale: f64,
    /// Distances below this are clamped before computing gravity
    pub min_gravity_distance: f64,
    /// Largest gravity force a single well can exert in one tick
    pub force_cap: f64,
    /// Projectiles skip gravity entirely
    pub projectiles_ignore_gravity: bool,
    /// Gap left between a ricocheting projectile and the obstacle face
    pub separation_epsilon: f64,
    /// Projectile to spectre hit distance
    pub spectre_hit_radius: f64,
    /// Gravity multiplier added to the spectre on every hit
    pub gravity_penalty: f64,
    /// Seconds per tick
    pub time_step: f64,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        PhysicsConfig {
            gravity_scale: 500.0,
            min_gravity_distance: 10.0,
            force_cap: 5.0,
            projectiles_ignore_gravity: true,
            separation_epsilon: 0.1,
            spectre_hit_radius: 20.0,
            gravity_penalty: 1.0,
            time_step: 1.0 / 60.0,
        }
    }
}

/// Spatial grid sizing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Cell edge length
    pub cell_size: f64,
    /// Bucket occupancy above which queries fall back to the full obstacle set
    pub max_bucket: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        GridConfig {
            cell_size: 100.0,
            max_bucket: 64,
        }
    }
}

/// Particle pool and motion tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleConfig {
    /// Pool and active-list capacity reserved up front
    pub initial_capacity: usize,
    /// Recycled particles kept beyond this count are dropped
    pub max_pooled: usize,
    /// Velocity retention per tick
    pub drag: f64,
    /// Radians added to an orbiting particle's phase per tick
    pub orbit_step: f64,
    /// Radius of the orbit offset
    pub orbit_radius: f64,
    /// Probability that a flicker particle resizes in a tick
    pub flicker_chance: f64,
    /// Upper bound for a flicker resize
    pub flicker_max_size: f64,
    /// Log at debug level whenever the pool has to allocate
    pub log_pool_growth: bool,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        ParticleConfig {
            initial_capacity: 2000,
            max_pooled: 8192,
            drag: 0.96,
            orbit_step: 0.2,
            orbit_radius: 2.0,
            flicker_chance: 0.3,
            flicker_max_size: 4.0,
            log_pool_growth: false,
        }
    }
}

/// Embedded interpreter limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptingConfig {
    /// Operation budget per routine call; zero disables the guard
    pub max_operations: u64,
    /// Maximum call-stack depth inside a script
    pub max_call_levels: usize,
    /// Routine invoked for every bound entity each tick
    pub update_routine: String,
}

impl Default for ScriptingConfig {
    fn default() -> Self {
        ScriptingConfig {
            max_operations: 50_000,
            max_call_levels: 32,
            update_routine: "update_state".to_string(),
        }
    }
}

/// Player character handling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Speed cap without boost
    pub max_speed: f64,
    /// Speed cap scale while boosting
    pub boost_multiplier: f64,
    /// Input acceleration
    pub accel: f64,
    /// Input acceleration while boosting
    pub boost_accel: f64,
    /// Velocity retention per tick
    pub friction: f64,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        PlayerConfig {
            max_speed: 7.5,
            boost_multiplier: 2.0,
            accel: 1.5,
            boost_accel: 4.5,
            friction: 0.92,
        }
    }
}

/// Counterpart character handling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpectreConfig {
    /// Initial speed cap
    pub max_speed: f64,
    /// Velocity retention per tick
    pub friction: f64,
}

impl Default for SpectreConfig {
    fn default() -> Self {
        SpectreConfig {
            max_speed: 6.0,
            friction: 0.96,
        }
    }
}

/// Projectile emitter ballistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmitterConfig {
    /// Spawn distance ahead of the emitter
    pub muzzle_offset: f64,
    /// Launch speed
    pub projectile_speed: f64,
    /// Projectile speed cap
    pub projectile_max_speed: f64,
    /// Projectile mass
    pub projectile_mass: f64,
    /// Seconds before an unresolved projectile expires
    pub projectile_lifetime: f64,
    /// Velocity kicked back into the emitter per shot
    pub recoil: f64,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        EmitterConfig {
            muzzle_offset: 20.0,
            projectile_speed: 8.0,
            projectile_max_speed: 20.0,
            projectile_mass: 5.0,
            projectile_lifetime: 2.0,
            recoil: 1.5,
        }
    }
}

/// Goal zone win check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GoalConfig {
    /// How close the runner must be to the spectre when she reaches the zone
    pub partner_range: f64,
}

impl Default for GoalConfig {
    fn default() -> Self {
        GoalConfig { partner_range: 80.0 }
    }
}

/// Complete simulation configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Wrapped plane extents
    pub domain: Domain,
    /// Physics constants
    pub physics: PhysicsConfig,
    /// Spatial grid sizing
    pub grid: GridConfig,
    /// Particle tuning
    pub particles: ParticleConfig,
    /// Interpreter limits
    pub scripting: ScriptingConfig,
    /// Player handling
    pub player: PlayerConfig,
    /// Counterpart handling
    pub spectre: SpectreConfig,
    /// Emitter ballistics
    pub emitter: EmitterConfig,
    /// Goal zone win check
    pub goal: GoalConfig,
    /// Seed for the world RNG
    pub seed: u64,
}

impl SimConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: SimConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let source = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_toml_str(&source)?;
        log::debug!("loaded configuration from {}", path.as_ref().display());
        Ok(config)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<()> {
        if !self.domain.is_valid() {
            return Err(EngineError::Config(format!(
                "domain extents must be positive, got {}x{}",
                self.domain.width(),
                self.domain.height()
            )));
        }
        if !(self.grid.cell_size > 0.0 && self.grid.cell_size.is_finite()) {
            return Err(EngineError::Config(format!(
                "grid cell size must be positive, got {}",
                self.grid.cell_size
            )));
        }
        if !(self.physics.time_step > 0.0 && self.physics.time_step.is_finite()) {
            return Err(EngineError::Config(format!(
                "time step must be positive, got {}",
                self.physics.time_step
            )));
        }
        if !(self.physics.min_gravity_distance > 0.0) {
            return Err(EngineError::Config(
                "minimum gravity distance must be positive".to_string(),
            ));
        }
        if !(self.physics.force_cap >= 0.0) {
            return Err(EngineError::Config(
                "force cap must not be negative".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.particles.drag) {
            return Err(EngineError::Config(format!(
                "particle drag must lie in [0, 1], got {}",
                self.particles.drag
            )));
        }
        if self.scripting.update_routine.is_empty() {
            return Err(EngineError::Config(
                "update routine name must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
