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
//! Entity Component System (ECS) core
//!
//! - Entity ids that double as row indices
//! - Index-aligned component columns with explicit absence
//! - Systems and a staged scheduler for the per-tick pipeline

mod component;
pub mod components;
mod entity;
pub mod scheduler;
mod system;
pub mod systems;
mod world;

pub use component::{Column, Component, ComponentStorage};
pub use entity::Entity;
pub use system::System;
pub use world::{SimClock, Storage, World};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_world_creation() {
        let world = World::default();
        assert_eq!(world.entity_count(), 0);
        assert!(world.storage().is_aligned());
    }

    #[test]
    fn test_entity_creation() {
        let mut world = World::default();
        let entity = world.create_entity();
        assert_eq!(world.entity_count(), 1);
        assert!(world.is_alive(entity));
        assert_eq!(world.storage().rows(), 1);
    }
}
