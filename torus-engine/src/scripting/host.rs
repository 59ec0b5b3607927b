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
//! Host function table exposed to behavior scripts
//!
//! Scripts never touch component storage. Reads are answered from a
//! snapshot taken at the start of the scripting stage, and writes are
//! queued as [`HostCommand`]s that the bridge validates and applies after
//! the routine returns successfully. Entity ids are the only handles a
//! script ever holds.
//!
//! | function                      | returns                               |
//! |-------------------------------|---------------------------------------|
//! | `apply_force(id, fx, fy)`     | `true` if queued                      |
//! | `set_max_speed(id, value)`    | `true` if queued                      |
//! | `rotate(id, delta)`           | `true` if queued                      |
//! | `get_self(id)`                | `#{x, y, vx, vy, rotation}` or `()`   |
//! | `get_vec_to(id, x, y)`        | `#{x, y, dist}` or `()`               |
//! | `get_target(id)`              | `#{id, x, y, vx, vy}` or `()`         |
//! | `get_input_dir()`             | `#{x, y, boost}`                      |
//! | `cast_ray(id, angle, range)`  | distance to the first obstacle        |
//! | `play_sound(name)`            | nothing                               |

use crate::ecs::{ComponentStorage, Entity, World};
use crate::input::InputState;
use crate::topology::Domain;
use glam::DVec2;
use rhai::{Dynamic, Engine, ImmutableString, Map, FLOAT, INT};
use std::cell::RefCell;
use std::rc::Rc;

/// Distance floor used by `get_vec_to` when normalizing
pub const MIN_SENSOR_DISTANCE: f64 = 0.01;

/// March step used by `cast_ray`
const RAY_STEP: f64 = 4.0;

/// Longest ray a script may cast
const MAX_RAY_RANGE: f64 = 2000.0;

/// A write requested by a script, applied after the routine returns
#[derive(Debug, Clone, PartialEq)]
pub enum HostCommand {
    /// Accumulate into pending acceleration
    ApplyForce {
        /// Target entity
        entity: Entity,
        /// Force to add
        force: DVec2,
    },
    /// Overwrite the speed cap
    SetMaxSpeed {
        /// Target entity
        entity: Entity,
        /// New cap
        value: f64,
    },
    /// Turn by a delta
    Rotate {
        /// Target entity
        entity: Entity,
        /// Radians to add
        delta: f64,
    },
    /// Fire a sound cue
    PlaySound(String),
}

/// Read-only view of one entity for the current tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sensor {
    /// Position
    pub position: DVec2,
    /// Velocity, zero for entities without a body
    pub velocity: DVec2,
    /// Facing
    pub rotation: f64,
    /// Bound counterpart, if any
    pub target: Option<Entity>,
}

#[derive(Debug, Clone, Copy)]
struct WallSample {
    position: DVec2,
    half_size: f64,
}

#[derive(Debug, Default)]
struct HostState {
    domain: Domain,
    input: InputState,
    sensors: Vec<Option<Sensor>>,
    walls: Vec<WallSample>,
    commands: Vec<HostCommand>,
}

impl HostState {
    fn sensor(&self, id: INT) -> Option<Sensor> {
        let entity = Entity::from_script(id)?;
        self.sensors.get(entity.index()).copied().flatten()
    }

    fn blocked(&self, point: DVec2) -> bool {
        self.walls.iter().any(|wall| {
            let d = self.domain.wrapped_delta(point, wall.position);
            d.x.abs() < wall.half_size && d.y.abs() < wall.half_size
        })
    }
}

/// Shared handle to the host state, cloned into every registered function
#[derive(Debug, Clone, Default)]
pub struct HostApi {
    state: Rc<RefCell<HostState>>,
}

impl HostApi {
    /// Create an empty host
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture sensors, walls and input for a new scripting pass
    pub fn begin_tick(&self, world: &World) {
        let mut state = self.state.borrow_mut();
        let storage = world.storage();
        state.domain = *world.domain();
        state.input = world.input();
        state.commands.clear();

        state.sensors.clear();
        state.sensors.resize(storage.rows(), None);
        for &entity in world.entities() {
            let Some(transform) = storage.transforms.get(entity) else {
                continue;
            };
            state.sensors[entity.index()] = Some(Sensor {
                position: transform.position,
                velocity: storage.bodies.get(entity).map_or(DVec2::ZERO, |b| b.velocity()),
                rotation: transform.rotation,
                target: storage.ai.get(entity).and_then(|binding| binding.target),
            });
        }

        state.walls.clear();
        for (entity, wall) in storage.walls.iter() {
            if wall.is_destroyed() {
                continue;
            }
            if let Some(transform) = storage.transforms.get(entity) {
                state.walls.push(WallSample {
                    position: transform.position,
                    half_size: wall.half_size(),
                });
            }
        }
    }

    /// Take the commands queued since the last call
    pub fn take_commands(&self) -> Vec<HostCommand> {
        std::mem::take(&mut self.state.borrow_mut().commands)
    }

    /// Drop queued commands
    pub fn discard_commands(&self) {
        self.state.borrow_mut().commands.clear();
    }

    /// Snapshot of one entity, as a script would see it
    pub fn sensor(&self, entity: Entity) -> Option<Sensor> {
        self.state.borrow().sensor(entity.to_script())
    }

    fn push(&self, command: HostCommand) {
        self.state.borrow_mut().commands.push(command);
    }

    /// Register every host function on `engine`
    pub fn register(&self, engine: &mut Engine) {
        let host = self.clone();
        engine.register_fn("apply_force", move |id: INT, fx: Dynamic, fy: Dynamic| -> bool {
            match (Entity::from_script(id), number(&fx), number(&fy)) {
                (Some(entity), Some(fx), Some(fy)) => {
                    host.push(HostCommand::ApplyForce {
                        entity,
                        force: DVec2::new(fx, fy),
                    });
                    true
                }
                _ => false,
            }
        });

        let host = self.clone();
        engine.register_fn("set_max_speed", move |id: INT, value: Dynamic| -> bool {
            match (Entity::from_script(id), number(&value)) {
                (Some(entity), Some(value)) => {
                    host.push(HostCommand::SetMaxSpeed { entity, value });
                    true
                }
                _ => false,
            }
        });

        let host = self.clone();
        engine.register_fn("rotate", move |id: INT, delta: Dynamic| -> bool {
            match (Entity::from_script(id), number(&delta)) {
                (Some(entity), Some(delta)) => {
                    host.push(HostCommand::Rotate { entity, delta });
                    true
                }
                _ => false,
            }
        });

        let host = self.clone();
        engine.register_fn("get_self", move |id: INT| -> Dynamic {
            match host.state.borrow().sensor(id) {
                Some(sensor) => Dynamic::from_map(body_map(id, &sensor)),
                None => Dynamic::UNIT,
            }
        });

        let host = self.clone();
        engine.register_fn("get_vec_to", move |id: INT, x: Dynamic, y: Dynamic| -> Dynamic {
            let state = host.state.borrow();
            let (Some(sensor), Some(x), Some(y)) = (state.sensor(id), number(&x), number(&y)) else {
                return Dynamic::UNIT;
            };
            let delta = state.domain.wrapped_delta(sensor.position, DVec2::new(x, y));
            let dist = delta.length().max(MIN_SENSOR_DISTANCE);
            let mut map = Map::new();
            map.insert("x".into(), Dynamic::from_float(delta.x / dist));
            map.insert("y".into(), Dynamic::from_float(delta.y / dist));
            map.insert("dist".into(), Dynamic::from_float(dist));
            Dynamic::from_map(map)
        });

        let host = self.clone();
        engine.register_fn("get_target", move |id: INT| -> Dynamic {
            let state = host.state.borrow();
            let Some(target) = state.sensor(id).and_then(|s| s.target) else {
                return Dynamic::UNIT;
            };
            let target_id = target.to_script();
            match state.sensor(target_id) {
                Some(sensor) => Dynamic::from_map(body_map(target_id, &sensor)),
                None => Dynamic::UNIT,
            }
        });

        let host = self.clone();
        engine.register_fn("get_input_dir", move || -> Map {
            let input = host.state.borrow().input;
            let mut map = Map::new();
            map.insert("x".into(), Dynamic::from_float(input.direction.x));
            map.insert("y".into(), Dynamic::from_float(input.direction.y));
            map.insert("boost".into(), Dynamic::from_bool(input.boost));
            map
        });

        let host = self.clone();
        engine.register_fn("cast_ray", move |id: INT, angle: Dynamic, range: Dynamic| -> FLOAT {
            let state = host.state.borrow();
            let (Some(sensor), Some(angle), Some(range)) = (state.sensor(id), number(&angle), number(&range)) else {
                return 0.0;
            };
            let range = range.clamp(0.0, MAX_RAY_RANGE);
            let direction = DVec2::new(angle.cos(), angle.sin());
            let mut travelled = RAY_STEP;
            while travelled < range {
                let point = state.domain.wrap_position(sensor.position + direction * travelled);
                if state.blocked(point) {
                    return travelled;
                }
                travelled += RAY_STEP;
            }
            range
        });

        let host = self.clone();
        engine.register_fn("play_sound", move |name: ImmutableString| {
            host.push(HostCommand::PlaySound(name.to_string()));
        });
    }
}

fn number(value: &Dynamic) -> Option<f64> {
    let n = value
        .as_float()
        .ok()
        .or_else(|| value.as_int().ok().map(|i| i as f64))?;
    n.is_finite().then_some(n)
}

fn body_map(id: INT, sensor: &Sensor) -> Map {
    let mut map = Map::new();
    map.insert("id".into(), Dynamic::from_int(id));
    map.insert("x".into(), Dynamic::from_float(sensor.position.x));
    map.insert("y".into(), Dynamic::from_float(sensor.position.y));
    map.insert("vx".into(), Dynamic::from_float(sensor.velocity.x));
    map.insert("vy".into(), Dynamic::from_float(sensor.velocity.y));
    map.insert("rotation".into(), Dynamic::from_float(sensor.rotation));
    map
}
