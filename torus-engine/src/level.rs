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
//! Level layouts
//!
//! A level is plain data handed to [`crate::Simulation::load_level`]: gravity
//! wells, obstacles, emitters, the start positions of the two characters and
//! the goal zone. Layouts can be written in TOML:
//!
//! ```
//! use torus_engine::level::LevelDef;
//!
//! let level = LevelDef::from_toml_str(
//!     r#"
//!     name = "Narrows"
//!     runner_start = [100.0, 360.0]
//!     spectre_start = [1100.0, 360.0]
//!
//!     [[wells]]
//!     position = [640.0, 360.0]
//!     radius = 60.0
//!     mass = 1.5
//!
//!     [[obstacles]]
//!     position = [640.0, 200.0]
//!     size = 40.0
//!     destructible = true
//!
//!     [memory]
//!     position = [640.0, 360.0]
//!     title = "Narrows"
//!     "#,
//! ).unwrap();
//! assert_eq!(level.wells.len(), 1);
//! assert_eq!(level.memory.radius, 70.0);
//! ```

use crate::ecs::components::Rgba;
use crate::error::Result;
use glam::DVec2;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default trigger radius of the goal zone
pub const DEFAULT_MEMORY_RADIUS: f64 = 70.0;

/// Gravity well placement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WellDef {
    /// Center
    pub position: DVec2,
    /// Event-horizon radius
    pub radius: f64,
    /// Strength
    pub mass: f64,
}

fn default_obstacle_size() -> f64 {
    40.0
}

/// Square obstacle placement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObstacleDef {
    /// Center
    pub position: DVec2,
    /// Edge length
    #[serde(default = "default_obstacle_size")]
    pub size: f64,
    /// Whether projectiles can break it
    #[serde(default)]
    pub destructible: bool,
}

/// Projectile emitter placement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmitterDef {
    /// Position
    pub position: DVec2,
    /// Firing direction in radians
    #[serde(default)]
    pub rotation: f64,
    /// Seconds between shots
    pub interval: f64,
}

fn default_memory_radius() -> f64 {
    DEFAULT_MEMORY_RADIUS
}

fn default_memory_color() -> Rgba {
    Rgba::opaque(100, 100, 255)
}

/// Goal zone the counterpart is steered toward
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryZone {
    /// Center
    pub position: DVec2,
    /// Trigger radius
    #[serde(default = "default_memory_radius")]
    pub radius: f64,
    /// Short caption shown when the zone is reached
    #[serde(default)]
    pub title: String,
    /// Longer text shown when the zone is reached
    #[serde(default)]
    pub description: String,
    /// Tint used by renderers
    #[serde(default = "default_memory_color")]
    pub color: Rgba,
}

/// Complete level layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelDef {
    /// Display name
    pub name: String,
    /// Gravity wells
    #[serde(default)]
    pub wells: Vec<WellDef>,
    /// Obstacles
    #[serde(default)]
    pub obstacles: Vec<ObstacleDef>,
    /// Projectile emitters
    #[serde(default)]
    pub emitters: Vec<EmitterDef>,
    /// Player start
    pub runner_start: DVec2,
    /// Counterpart start
    pub spectre_start: DVec2,
    /// Goal zone
    pub memory: MemoryZone,
}

impl LevelDef {
    /// Parse a level from TOML
    pub fn from_toml_str(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    /// Read and parse a level file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let source = std::fs::read_to_string(path.as_ref())?;
        let level = Self::from_toml_str(&source)?;
        log::debug!("loaded level '{}' from {}", level.name, path.as_ref().display());
        Ok(level)
    }

    /// A single well with the goal inside its horizon
    pub fn event_horizon() -> Self {
        LevelDef {
            name: "Event Horizon".to_string(),
            wells: vec![WellDef {
                position: DVec2::new(640.0, 360.0),
                radius: 70.0,
                mass: 2.0,
            }],
            obstacles: vec![
                ObstacleDef {
                    position: DVec2::new(400.0, 200.0),
                    size: 40.0,
                    destructible: true,
                },
                ObstacleDef {
                    position: DVec2::new(880.0, 520.0),
                    size: 40.0,
                    destructible: true,
                },
                ObstacleDef {
                    position: DVec2::new(640.0, 100.0),
                    size: 60.0,
                    destructible: false,
                },
            ],
            emitters: Vec::new(),
            runner_start: DVec2::new(100.0, 360.0),
            spectre_start: DVec2::new(1100.0, 360.0),
            memory: MemoryZone {
                position: DVec2::new(640.0, 360.0),
                radius: DEFAULT_MEMORY_RADIUS,
                title: "The Singularity".to_string(),
                description: "We were crushed together.\nFinally one.".to_string(),
                color: Rgba::opaque(100, 100, 255),
            },
        }
    }

    /// Two wells with the goal inside the left one
    pub fn binary_star() -> Self {
        LevelDef {
            name: "Binary Star".to_string(),
            wells: vec![
                WellDef {
                    position: DVec2::new(300.0, 360.0),
                    radius: 80.0,
                    mass: 2.0,
                },
                WellDef {
                    position: DVec2::new(980.0, 360.0),
                    radius: 80.0,
                    mass: 2.0,
                },
            ],
            obstacles: vec![
                ObstacleDef {
                    position: DVec2::new(640.0, 260.0),
                    size: 40.0,
                    destructible: true,
                },
                ObstacleDef {
                    position: DVec2::new(640.0, 460.0),
                    size: 40.0,
                    destructible: true,
                },
                ObstacleDef {
                    position: DVec2::new(640.0, 0.0),
                    size: 80.0,
                    destructible: false,
                },
            ],
            emitters: vec![EmitterDef {
                position: DVec2::new(1200.0, 80.0),
                rotation: std::f64::consts::PI,
                interval: 3.0,
            }],
            runner_start: DVec2::new(640.0, 600.0),
            spectre_start: DVec2::new(640.0, 100.0),
            memory: MemoryZone {
                position: DVec2::new(300.0, 360.0),
                radius: DEFAULT_MEMORY_RADIUS,
                title: "Orbit Decay".to_string(),
                description: "Spinning until we crash.".to_string(),
                color: Rgba::opaque(255, 50, 50),
            },
        }
    }

    /// Levels bundled with the engine, in play order
    pub fn builtin() -> Vec<LevelDef> {
        vec![Self::event_horizon(), Self::binary_star()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_levels() {
        let levels = LevelDef::builtin();
        assert_eq!(levels.len(), 2);
        assert_eq!(levels[0].name, "Event Horizon");
        assert_eq!(levels[1].wells.len(), 2);
    }

    #[test]
    fn test_toml_round_trip_of_builtin() {
        let level = LevelDef::binary_star();
        let text = toml::to_string(&level).unwrap();
        assert_eq!(LevelDef::from_toml_str(&text).unwrap(), level);
    }

    #[test]
    fn test_missing_required_field() {
        let err = LevelDef::from_toml_str("name = \"broken\"").unwrap_err();
        assert!(matches!(err, crate::error::EngineError::Parse(_)));
    }
}
