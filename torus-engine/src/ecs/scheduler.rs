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
//! Staged system scheduler
//!
//! Systems are grouped into stages that run in ascending order; systems in
//! the same stage run in registration order. A tick of the simulation is
//! INPUT, PHYSICS, LIFETIME, SCRIPTING, then PARTICLES, and each stage can
//! also be run on its own.

use crate::ecs::System;
use crate::ecs::World;

/// Stage identifier for grouping systems
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StageId(pub usize);

impl StageId {
    /// Create a new stage ID
    pub fn new(id: usize) -> Self {
        StageId(id)
    }
}

/// The fixed stages of a simulation tick
pub mod stages {
    use super::StageId;

    /// Poll input and steer input-controlled bodies, fire emitters
    pub const INPUT: StageId = StageId(0);

    /// Gravity, integration and collision
    pub const PHYSICS: StageId = StageId(1);

    /// Expire timed entities
    pub const LIFETIME: StageId = StageId(2);

    /// Run behavior scripts
    pub const SCRIPTING: StageId = StageId(3);

    /// Age and recycle particles
    pub const PARTICLES: StageId = StageId(4);

    /// Every stage in execution order
    pub const ALL: [StageId; 5] = [INPUT, PHYSICS, LIFETIME, SCRIPTING, PARTICLES];
}

struct ScheduledSystem {
    system: Box<dyn System>,
    stage: StageId,
}

/// Runs registered systems stage by stage
///
/// # Examples
///
/// ```
/// use torus_engine::ecs::scheduler::{stages, Scheduler};
/// use torus_engine::ecs::{System, World};
///
/// struct Noop;
/// impl System for Noop {
///     fn run(&mut self, _world: &mut World) {}
/// }
///
/// let mut scheduler = Scheduler::new();
/// scheduler.add_system(Noop, stages::PHYSICS);
/// scheduler.run(&mut World::default());
/// ```
pub struct Scheduler {
    systems: Vec<ScheduledSystem>,
}

impl Scheduler {
    /// Create a new scheduler
    pub fn new() -> Self {
        Scheduler {
            systems: Vec::new(),
        }
    }

    /// Add a system to a stage
    ///
    /// The list is kept sorted by stage; ties keep registration order.
    pub fn add_system<S: System + 'static>(&mut self, system: S, stage: StageId) {
        let at = self.systems.partition_point(|s| s.stage <= stage);
        self.systems.insert(
            at,
            ScheduledSystem {
                system: Box::new(system),
                stage,
            },
        );
    }

    /// Get the number of registered systems
    pub fn system_count(&self) -> usize {
        self.systems.len()
    }

    /// Get the number of stages in use
    pub fn stage_count(&self) -> usize {
        self.systems.last().map_or(0, |s| s.stage.0 + 1)
    }

    /// Names of registered systems in execution order
    pub fn system_names(&self) -> Vec<&str> {
        self.systems.iter().map(|s| s.system.name()).collect()
    }

    /// Run only the systems of one stage
    pub fn run_stage(&mut self, stage: StageId, world: &mut World) {
        for scheduled in self.systems.iter_mut().filter(|s| s.stage == stage) {
            log::trace!("running {}", scheduled.system.name());
            scheduled.system.run(world);
        }
    }

    /// Run every system in stage order
    pub fn run(&mut self, world: &mut World) {
        for scheduled in &mut self.systems {
            log::trace!("running {}", scheduled.system.name());
            scheduled.system.run(world);
        }
    }

    /// Clear all systems from the scheduler
    pub fn clear(&mut self) {
        self.systems.clear();
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}
