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
//! # Torus Engine
//!
//! Entity-component simulation core for gravity wells on a wrapped 2D
//! plane: two agents, one steered by input and one by a behavior script,
//! fall toward wells while projectiles ricochet off obstacles and pooled
//! particles mark every impact.
//!
//! ## Features
//!
//! - **Toroidal topology**: shortest-path deltas and distances on a plane
//!   whose edges wrap
//! - **ECS storage**: index-aligned component columns with O(1) presence
//! - **Physics**: capped gravity, semi-implicit Euler, grid-accelerated
//!   obstacle collision
//! - **Particles**: pooled standard, orbit and flicker particles
//! - **Scripting**: Rhai behavior routines behind a narrow host API
//!
//! ## Example
//!
//! ```rust
//! use torus_engine::input::InputState;
//! use torus_engine::level::LevelDef;
//! use torus_engine::scripting::ScriptBridge;
//! use torus_engine::{SimConfig, Simulation};
//!
//! let config = SimConfig::default();
//! let scripts = ScriptBridge::new(&config.scripting);
//! let mut sim = Simulation::new(config, scripts);
//! sim.load_level(&LevelDef::event_horizon());
//!
//! let mut input = InputState::IDLE;
//! for _ in 0..60 {
//!     sim.tick(&mut input);
//! }
//! assert_eq!(sim.world().clock().tick, 60);
//! ```

#![warn(missing_docs)]

/// Entity Component System implementation
pub mod ecs;

/// Wrapped-plane geometry
pub mod topology;

/// Spatial partitioning of obstacles
pub mod grid;

/// Memory pooling for reducing allocation churn
pub mod pool;

/// Pooled visual-feedback particles
pub mod particles;

/// Particles, sound cues and shake routed through one context
pub mod effects;

/// Gravity, integration and collision
pub mod physics;

/// Behavior scripts and the host API
pub mod scripting;

/// Level layouts
pub mod level;

/// Simulation configuration
pub mod config;

/// Error types
pub mod error;

/// Events for external collaborators
pub mod events;

/// Player intent
pub mod input;

/// Top-level simulation driver
pub mod simulation;

pub use config::SimConfig;
pub use ecs::{Entity, World};
pub use error::{EngineError, Result};
pub use events::{SimEvent, SoundCue};
pub use simulation::Simulation;
pub use topology::Domain;
