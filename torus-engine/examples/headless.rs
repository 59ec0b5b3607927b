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
//! Headless run of the built-in levels
//!
//! Loads the bundled behavior scripts, plays each level for a fixed number
//! of ticks with a scripted input pattern and prints a summary. Set
//! `RUST_LOG=debug` to see what the engine is doing.
//!
//! ```text
//! cargo run --example headless [config.toml] [level.toml]
//! ```

use glam::DVec2;
use std::collections::BTreeMap;
use torus_engine::ecs::components::BehaviorScript;
use torus_engine::ecs::ComponentStorage;
use torus_engine::input::InputState;
use torus_engine::level::LevelDef;
use torus_engine::scripting::ScriptBridge;
use torus_engine::{Entity, SimConfig, SimEvent, Simulation};

const TICKS_PER_LEVEL: u64 = 1200;

/// Circles the runner around the map, boosting for a second every five
fn input_pattern(tick: u64) -> InputState {
    let angle = tick as f64 * 0.01;
    let boost = tick % 300 < 60;
    InputState::new(DVec2::new(angle.cos(), angle.sin()).round(), boost)
}

fn main() -> torus_engine::Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => SimConfig::load(path)?,
        None => SimConfig::default(),
    };
    let levels = match args.next() {
        Some(path) => vec![LevelDef::load(path)?],
        None => LevelDef::builtin(),
    };

    let scripts_dir = concat!(env!("CARGO_MANIFEST_DIR"), "/scripts");
    let mut scripts = ScriptBridge::new(&config.scripting);
    scripts.load_file(BehaviorScript::Runner, format!("{scripts_dir}/runner.rhai"))?;
    scripts.load_file(BehaviorScript::Spectre, format!("{scripts_dir}/spectre.rhai"))?;

    let mut sim = Simulation::new(config, scripts);

    println!("==========================================================");
    println!("       Torus Engine headless run");
    println!("==========================================================");

    for level in &levels {
        sim.load_level(level);
        println!();
        println!("--- {} ---", level.name);

        let mut tally: BTreeMap<&'static str, usize> = BTreeMap::new();
        let mut peak_particles = 0;
        let mut reached_at = None;

        for tick in 0..TICKS_PER_LEVEL {
            let mut input = input_pattern(tick);
            sim.tick(&mut input);
            peak_particles = peak_particles.max(sim.world().particles().len());

            for event in sim.world_mut().drain_events() {
                let kind = match event {
                    SimEvent::Sound(_) => "sound",
                    SimEvent::Shatter { .. } => "shatter",
                    SimEvent::Impact { .. } => "impact",
                    SimEvent::ScreenShake(_) => "shake",
                    SimEvent::ScriptFault { .. } => "script fault",
                };
                *tally.entry(kind).or_default() += 1;
            }

            if reached_at.is_none() && sim.goal_reached() {
                reached_at = Some(tick);
                println!("  {} reached at tick {tick}", level.memory.title);
            }

            if tick % 300 == 0 {
                let world = sim.world();
                let position = |e: Entity| world.storage().transforms.get(e).map(|t| t.position);
                println!(
                    "  t={:>5.2}s runner={:?} spectre={:?} particles={}",
                    world.clock().elapsed,
                    sim.runner().and_then(position),
                    sim.spectre().and_then(position),
                    world.particles().len(),
                );
            }
        }

        let stats = sim.world().particles().pool_stats();
        println!("  entities alive:  {}", sim.world().entity_count());
        println!("  peak particles:  {peak_particles}");
        println!(
            "  particle pool:   {} allocated, {:.1}% reuse",
            stats.live_allocations(),
            stats.hit_rate()
        );
        for (kind, count) in &tally {
            println!("  {kind:<14} {count}");
        }
        if reached_at.is_none() {
            println!("  goal not reached");
        }
    }

    Ok(())
}
