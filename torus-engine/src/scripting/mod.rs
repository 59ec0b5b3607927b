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
//! Behavior scripting bridge
//!
//! Two behavior scripts, one for the runner and one for the spectre, are
//! compiled once into separate ASTs and scopes. Every tick the bridge calls
//! the update routine once per AI-bound entity:
//!
//! ```text
//! fn update_state(id, well_x, well_y, mem_x, mem_y, mem_radius)
//! ```
//!
//! `well_*` is the nearest gravity well along the wrapped plane and `mem_*`
//! the level's goal zone. With no wells, or no goal, the entity's own
//! position is passed and the radius is zero.
//!
//! A routine that errors or exceeds its operation budget is logged and
//! skipped for that tick; any writes it queued are dropped.
//!
//! # Host API versioning
//!
//! A script may declare `fn required_api() { "1.0.0" }`. Loading fails if
//! the version is incompatible with [`HOST_API_VERSION`]: majors must
//! match, and the script's minor must not exceed the host's (for `0.x`,
//! minors must match exactly).

pub mod host;

use crate::config::ScriptingConfig;
use crate::ecs::components::BehaviorScript;
use crate::ecs::{ComponentStorage, Entity, Storage, System, World};
use crate::effects::Effects;
use crate::error::{EngineError, Result};
use crate::events::{SimEvent, SoundCue};
use crate::topology::Domain;
use glam::DVec2;
use host::{HostApi, HostCommand};
use rhai::{CallFnOptions, Dynamic, Engine, Scope, AST, FLOAT, INT};
use semver::Version;
use std::path::Path;

/// Version of the host function table
pub const HOST_API_VERSION: &str = "1.0.0";

/// Number of arguments the update routine takes
const UPDATE_ARITY: usize = 6;

/// Name of the optional version declaration
const REQUIRED_API_FN: &str = "required_api";

/// Check whether a script built against `required` can run on `host`
pub fn is_version_compatible(required: &str, host: &str) -> bool {
    let (Ok(required), Ok(host)) = (Version::parse(required), Version::parse(host)) else {
        return false;
    };
    if required.major != host.major {
        return false;
    }
    if required.major != 0 {
        required.minor <= host.minor
    } else {
        required.minor == host.minor
    }
}

struct LoadedScript {
    name: String,
    ast: AST,
    scope: Scope<'static>,
}

struct Invocation {
    entity: Entity,
    script: BehaviorScript,
    position: DVec2,
}

/// Owns the interpreter and both behavior scripts
pub struct ScriptBridge {
    engine: Engine,
    host: HostApi,
    scripts: [Option<LoadedScript>; 2],
    routine: String,
    pending: Vec<Invocation>,
}

impl ScriptBridge {
    /// Create a bridge with the host API registered and no scripts loaded
    pub fn new(config: &ScriptingConfig) -> Self {
        let mut engine = Engine::new();
        engine.set_max_operations(config.max_operations);
        engine.set_max_call_levels(config.max_call_levels);
        engine.on_print(|text| log::info!(target: "torus_engine::script", "{text}"));
        engine.on_debug(|text, source, pos| {
            log::debug!(
                target: "torus_engine::script",
                "{}{pos:?}: {text}",
                source.unwrap_or("script")
            )
        });

        let host = HostApi::new();
        host.register(&mut engine);

        ScriptBridge {
            engine,
            host,
            scripts: [None, None],
            routine: config.update_routine.clone(),
            pending: Vec::new(),
        }
    }

    /// Compile and initialize a script from source
    ///
    /// Top-level statements run once, here. Replaces any script already
    /// loaded into the slot.
    pub fn load_source(&mut self, script: BehaviorScript, name: &str, source: &str) -> Result<()> {
        let compile_error = |message: String| EngineError::ScriptCompile {
            name: name.to_string(),
            message,
        };

        let ast = self
            .engine
            .compile(source)
            .map_err(|err| compile_error(err.to_string()))?;

        let has_routine = ast
            .iter_functions()
            .any(|f| f.name == self.routine && f.params.len() == UPDATE_ARITY);
        if !has_routine {
            return Err(compile_error(format!(
                "missing fn {}(id, well_x, well_y, mem_x, mem_y, mem_radius)",
                self.routine
            )));
        }

        let mut scope = Scope::new();
        self.engine
            .run_ast_with_scope(&mut scope, &ast)
            .map_err(|err| compile_error(err.to_string()))?;
        self.host.discard_commands();

        if ast
            .iter_functions()
            .any(|f| f.name == REQUIRED_API_FN && f.params.is_empty())
        {
            let options = CallFnOptions::new().eval_ast(false).rewind_scope(true);
            let required = self
                .engine
                .call_fn_with_options::<Dynamic>(options, &mut scope, &ast, REQUIRED_API_FN, ())
                .map_err(|err| compile_error(err.to_string()))?
                .into_string()
                .map_err(|kind| compile_error(format!("{REQUIRED_API_FN}() returned {kind}, expected a string")))?;
            if !is_version_compatible(&required, HOST_API_VERSION) {
                return Err(EngineError::IncompatibleScriptApi {
                    name: name.to_string(),
                    required,
                    host: HOST_API_VERSION.to_string(),
                });
            }
        }

        log::debug!("loaded {} script '{name}'", script.name());
        self.scripts[slot(script)] = Some(LoadedScript {
            name: name.to_string(),
            ast,
            scope,
        });
        Ok(())
    }

    /// Read, compile and initialize a script file
    pub fn load_file(&mut self, script: BehaviorScript, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let name = path.display().to_string();
        let source = std::fs::read_to_string(path).map_err(|source| EngineError::ScriptLoad {
            name: name.clone(),
            source,
        })?;
        self.load_source(script, &name, &source)
    }

    /// Whether a script is loaded into the slot
    pub fn is_loaded(&self, script: BehaviorScript) -> bool {
        self.scripts[slot(script)].is_some()
    }

    /// Name the slot's script was loaded under
    pub fn script_name(&self, script: BehaviorScript) -> Option<&str> {
        self.scripts[slot(script)].as_ref().map(|s| s.name.as_str())
    }

    /// Host function table shared with the interpreter
    pub fn host(&self) -> &HostApi {
        &self.host
    }

    /// Run every bound entity's routine once
    pub fn run(&mut self, world: &mut World) {
        self.host.begin_tick(world);

        let storage = world.storage();
        self.pending.clear();
        for (entity, binding) in storage.ai.iter() {
            if !world.is_alive(entity) {
                continue;
            }
            match storage.transforms.get(entity) {
                Some(transform) => self.pending.push(Invocation {
                    entity,
                    script: binding.script,
                    position: transform.position,
                }),
                None => log::trace!("scripted entity {entity} has no transform, skipped"),
            }
        }

        let goal = world.goal().map(|zone| (zone.position, zone.radius));
        let domain = *world.domain();

        for invocation in &self.pending {
            let Some(loaded) = self.scripts[slot(invocation.script)].as_mut() else {
                log::trace!("no {} script loaded", invocation.script.name());
                continue;
            };

            let well = nearest_well(world.storage(), &domain, invocation.position)
                .unwrap_or(invocation.position);
            let (memory, radius) = goal.unwrap_or((invocation.position, 0.0));
            let args = (
                invocation.entity.to_script() as INT,
                well.x as FLOAT,
                well.y as FLOAT,
                memory.x as FLOAT,
                memory.y as FLOAT,
                radius as FLOAT,
            );

            let options = CallFnOptions::new().eval_ast(false).rewind_scope(true);
            let outcome = self.engine.call_fn_with_options::<Dynamic>(
                options,
                &mut loaded.scope,
                &loaded.ast,
                &self.routine,
                args,
            );

            let (storage, effects) = world.split_mut();
            match outcome {
                Ok(_) => apply_commands(self.host.take_commands(), storage, effects),
                Err(err) => {
                    self.host.discard_commands();
                    log::warn!(
                        "{} script fault for {}: {err}",
                        invocation.script.name(),
                        invocation.entity
                    );
                    effects.push_event(SimEvent::ScriptFault {
                        entity: invocation.entity,
                        script: invocation.script,
                        message: err.to_string(),
                    });
                }
            }
        }
    }
}

fn slot(script: BehaviorScript) -> usize {
    match script {
        BehaviorScript::Runner => 0,
        BehaviorScript::Spectre => 1,
    }
}

/// Nearest well position along the wrapped plane
fn nearest_well(storage: &Storage, domain: &Domain, from: DVec2) -> Option<DVec2> {
    storage
        .wells
        .iter()
        .filter_map(|(entity, _)| storage.transforms.get(entity).map(|t| t.position))
        .map(|position| (domain.wrapped_distance_sq(from, position), position))
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, position)| position)
}

/// Apply queued host writes with host-side validation
fn apply_commands(commands: Vec<HostCommand>, storage: &mut Storage, effects: &mut Effects) {
    for command in commands {
        match command {
            HostCommand::ApplyForce { entity, force } => match storage.bodies.get_mut(entity) {
                Some(body) => {
                    body.apply_force(force);
                }
                None => log::trace!("apply_force on {entity} without a body ignored"),
            },
            HostCommand::SetMaxSpeed { entity, value } => {
                if let Some(body) = storage.bodies.get_mut(entity) {
                    body.set_max_speed(value);
                }
            }
            HostCommand::Rotate { entity, delta } => {
                if let Some(transform) = storage.transforms.get_mut(entity) {
                    transform.rotate(delta);
                }
            }
            HostCommand::PlaySound(name) => effects.play(SoundCue::from_name(&name)),
        }
    }
}

/// Scheduler adapter running the bridge in the scripting stage
pub struct ScriptSystem {
    bridge: ScriptBridge,
}

impl ScriptSystem {
    /// Wrap a bridge
    pub fn new(bridge: ScriptBridge) -> Self {
        ScriptSystem { bridge }
    }

    /// The wrapped bridge
    pub fn bridge(&self) -> &ScriptBridge {
        &self.bridge
    }

    /// The wrapped bridge, mutably
    pub fn bridge_mut(&mut self) -> &mut ScriptBridge {
        &mut self.bridge
    }
}

impl System for ScriptSystem {
    fn run(&mut self, world: &mut World) {
        self.bridge.run(world);
    }

    fn name(&self) -> &str {
        "ScriptSystem"
    }
}
