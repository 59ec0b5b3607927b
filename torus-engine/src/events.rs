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
//! Outbound simulation events
//!
//! The core never plays audio or shakes a camera. It appends cues to an
//! outbox owned by the world and the embedding application drains them once
//! per frame.

use crate::ecs::components::BehaviorScript;
use crate::ecs::Entity;
use glam::DVec2;

/// Named sound effect
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SoundCue {
    /// A projectile left an emitter
    Shoot,
    /// Something shattered
    Boom,
    /// The player engaged boost
    Boost,
    /// Any other name, usually issued by a script
    Named(String),
}

impl SoundCue {
    /// Map a cue name onto the closed set, falling back to `Named`
    pub fn from_name(name: &str) -> Self {
        match name {
            "shoot" => SoundCue::Shoot,
            "boom" => SoundCue::Boom,
            "boost" => SoundCue::Boost,
            other => SoundCue::Named(other.to_string()),
        }
    }

    /// Cue name as understood by the audio collaborator
    pub fn name(&self) -> &str {
        match self {
            SoundCue::Shoot => "shoot",
            SoundCue::Boom => "boom",
            SoundCue::Boost => "boost",
            SoundCue::Named(name) => name,
        }
    }
}

/// Something the outside world may want to react to
#[derive(Debug, Clone, PartialEq)]
pub enum SimEvent {
    /// Play a sound
    Sound(SoundCue),
    /// An entity burst into debris
    Shatter {
        /// Entity that shattered
        entity: Entity,
        /// Where the debris was emitted
        position: DVec2,
    },
    /// A projectile glanced off an indestructible obstacle
    Impact {
        /// Contact point
        position: DVec2,
    },
    /// Add camera shake
    ScreenShake(f64),
    /// A behavior script raised an error and was skipped for the tick
    ScriptFault {
        /// Entity whose routine failed
        entity: Entity,
        /// Script that failed
        script: BehaviorScript,
        /// Interpreter diagnostic
        message: String,
    },
}
