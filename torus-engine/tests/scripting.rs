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
//! Scripting bridge behavior
//!
//! Scripts report what they observed through `play_sound`, whose cue name
//! lands in the event outbox, so the tests can see the arguments and sensor
//! values a routine received.

use glam::DVec2;
use torus_engine::config::{ScriptingConfig, SimConfig};
use torus_engine::ecs::components::{
    AiBinding, BehaviorScript, GravityWell, PhysicsBody, Transform,
};
use torus_engine::ecs::{ComponentStorage, Entity, World};
use torus_engine::level::{LevelDef, MemoryZone};
use torus_engine::physics::PhysicsSystem;
use torus_engine::scripting::ScriptBridge;
use torus_engine::{EngineError, SimEvent, Simulation, SoundCue};

fn bridge_with(script: BehaviorScript, source: &str) -> ScriptBridge {
    let mut bridge = ScriptBridge::new(&ScriptingConfig::default());
    bridge.load_source(script, "test", source).unwrap();
    bridge
}

fn spawn_agent(world: &mut World, script: BehaviorScript, position: DVec2) -> Entity {
    let e = world.create_entity();
    let s = world.storage_mut();
    s.transforms.insert(e, Transform::at(position));
    s.bodies.insert(e, PhysicsBody::new(6.0, 0.96, 1.0));
    s.ai.insert(e, AiBinding::new(script));
    e
}

fn spawn_well(world: &mut World, position: DVec2) -> Entity {
    let e = world.create_entity();
    let s = world.storage_mut();
    s.transforms.insert(e, Transform::at(position));
    s.wells.insert(e, GravityWell::new(70.0, 2.0));
    e
}

fn reported(world: &mut World) -> Vec<Vec<f64>> {
    world
        .drain_events()
        .into_iter()
        .filter_map(|event| match event {
            SimEvent::Sound(SoundCue::Named(text)) => Some(
                text.split(',')
                    .map(|n| n.trim().parse::<f64>().unwrap())
                    .collect(),
            ),
            _ => None,
        })
        .collect()
}

const REPORT_ARGS: &str = r#"
    fn update_state(id, well_x, well_y, mem_x, mem_y, mem_radius) {
        play_sound(`${well_x},${well_y},${mem_x},${mem_y},${mem_radius}`);
    }
"#;

#[test]
fn test_nearest_well_uses_wrapped_distance() {
    let mut world = World::default();
    spawn_well(&mut world, DVec2::new(1270.0, 100.0));
    spawn_well(&mut world, DVec2::new(200.0, 100.0));
    spawn_agent(&mut world, BehaviorScript::Spectre, DVec2::new(20.0, 100.0));

    let mut bridge = bridge_with(BehaviorScript::Spectre, REPORT_ARGS);
    bridge.run(&mut world);

    let reports = reported(&mut world);
    assert_eq!(reports.len(), 1);
    assert_eq!(&reports[0][..2], &[1270.0, 100.0]);
}

#[test]
fn test_missing_well_and_goal_fall_back_to_self() {
    let mut world = World::default();
    spawn_agent(&mut world, BehaviorScript::Runner, DVec2::new(30.0, 40.0));

    let mut bridge = bridge_with(BehaviorScript::Runner, REPORT_ARGS);
    bridge.run(&mut world);

    let reports = reported(&mut world);
    assert_eq!(reports, vec![vec![30.0, 40.0, 30.0, 40.0, 0.0]]);
}

#[test]
fn test_goal_zone_is_passed_through() {
    let mut world = World::default();
    spawn_agent(&mut world, BehaviorScript::Runner, DVec2::new(30.0, 40.0));
    world.set_goal(Some(LevelDef::event_horizon().memory));

    let mut bridge = bridge_with(BehaviorScript::Runner, REPORT_ARGS);
    bridge.run(&mut world);

    let reports = reported(&mut world);
    assert_eq!(&reports[0][2..], &[640.0, 360.0, 70.0]);
}

#[test]
fn test_each_entity_runs_its_own_script() {
    let mut world = World::default();
    spawn_agent(&mut world, BehaviorScript::Runner, DVec2::new(1.0, 1.0));
    spawn_agent(&mut world, BehaviorScript::Spectre, DVec2::new(2.0, 2.0));
    spawn_agent(&mut world, BehaviorScript::Spectre, DVec2::new(3.0, 3.0));

    let mut bridge = ScriptBridge::new(&ScriptingConfig::default());
    bridge
        .load_source(
            BehaviorScript::Runner,
            "runner",
            "fn update_state(id, a, b, c, d, e) { play_sound(`1,${id}`); }",
        )
        .unwrap();
    bridge
        .load_source(
            BehaviorScript::Spectre,
            "spectre",
            "fn update_state(id, a, b, c, d, e) { play_sound(`2,${id}`); }",
        )
        .unwrap();
    bridge.run(&mut world);

    let reports = reported(&mut world);
    assert_eq!(
        reports,
        vec![vec![1.0, 0.0], vec![2.0, 1.0], vec![2.0, 2.0]]
    );
}

#[test]
fn test_target_sensor_sees_counterpart() {
    let mut world = World::default();
    let a = spawn_agent(&mut world, BehaviorScript::Spectre, DVec2::new(10.0, 10.0));
    let b = world.create_entity();
    world
        .storage_mut()
        .transforms
        .insert(b, Transform::at(DVec2::new(50.0, 60.0)));
    world.storage_mut().ai.get_mut(a).unwrap().target = Some(b);

    let source = r#"
        fn update_state(id, wx, wy, mx, my, mr) {
            let t = get_target(id);
            let v = get_vec_to(id, t.x, t.y);
            play_sound(`${t.x},${t.y},${v.dist}`);
        }
    "#;
    let mut bridge = bridge_with(BehaviorScript::Spectre, source);
    bridge.run(&mut world);

    let reports = reported(&mut world);
    assert_eq!(reports[0][0], 50.0);
    assert_eq!(reports[0][1], 60.0);
    assert!((reports[0][2] - DVec2::new(40.0, 50.0).length()).abs() < 1e-9);
}

#[test]
fn test_script_fault_is_contained() {
    let mut world = World::default();
    let faulty = spawn_agent(&mut world, BehaviorScript::Spectre, DVec2::new(10.0, 10.0));
    let healthy = spawn_agent(&mut world, BehaviorScript::Runner, DVec2::new(20.0, 20.0));

    let mut bridge = ScriptBridge::new(&ScriptingConfig::default());
    bridge
        .load_source(
            BehaviorScript::Spectre,
            "faulty",
            r#"fn update_state(id, a, b, c, d, e) { apply_force(id, 5.0, 0.0); throw "boom"; }"#,
        )
        .unwrap();
    bridge
        .load_source(
            BehaviorScript::Runner,
            "healthy",
            "fn update_state(id, a, b, c, d, e) { apply_force(id, 0.0, 2.0); }",
        )
        .unwrap();
    bridge.run(&mut world);

    let s = world.storage();
    assert_eq!(s.bodies.get(faulty).unwrap().acceleration(), DVec2::ZERO);
    assert_eq!(s.bodies.get(healthy).unwrap().acceleration(), DVec2::new(0.0, 2.0));

    let events = world.drain_events();
    assert_eq!(events.len(), 1);
    assert!(matches!(
        &events[0],
        SimEvent::ScriptFault { entity, script: BehaviorScript::Spectre, .. } if *entity == faulty
    ));
}

#[test]
fn test_runaway_script_is_stopped() {
    let mut world = World::default();
    let agent = spawn_agent(&mut world, BehaviorScript::Runner, DVec2::new(10.0, 10.0));

    let config = ScriptingConfig {
        max_operations: 1_000,
        ..ScriptingConfig::default()
    };
    let mut bridge = ScriptBridge::new(&config);
    bridge
        .load_source(
            BehaviorScript::Runner,
            "spin",
            "fn update_state(id, a, b, c, d, e) { apply_force(id, 1.0, 0.0); loop { } }",
        )
        .unwrap();
    bridge.run(&mut world);

    assert_eq!(
        world.storage().bodies.get(agent).unwrap().acceleration(),
        DVec2::ZERO
    );
    assert!(world
        .drain_events()
        .iter()
        .any(|e| matches!(e, SimEvent::ScriptFault { .. })));
}

#[test]
fn test_invalid_arguments_are_rejected_by_host() {
    let mut world = World::default();
    let agent = spawn_agent(&mut world, BehaviorScript::Runner, DVec2::new(10.0, 10.0));

    let source = r#"
        fn update_state(id, a, b, c, d, e) {
            let ok = apply_force(id, "left", 1.0);
            let bogus = apply_force(id + 1000, 1.0, 1.0);
            let speed = set_max_speed(id, ());
            play_sound(`${if ok { 1 } else { 0 }},${if bogus { 1 } else { 0 }},${if speed { 1 } else { 0 }}`);
        }
    "#;
    let mut bridge = bridge_with(BehaviorScript::Runner, source);
    bridge.run(&mut world);

    let body = world.storage().bodies.get(agent).unwrap();
    assert_eq!(body.acceleration(), DVec2::ZERO);
    assert_eq!(body.max_speed(), 6.0);
    assert_eq!(reported(&mut world), vec![vec![0.0, 1.0, 0.0]]);
}

#[test]
fn test_huge_scripted_forces_respect_speed_cap() {
    let mut world = World::default();
    let agent = spawn_agent(&mut world, BehaviorScript::Spectre, DVec2::new(300.0, 300.0));

    let mut bridge = bridge_with(
        BehaviorScript::Spectre,
        "fn update_state(id, a, b, c, d, e) { apply_force(id, 1.0e12, -1.0e12); }",
    );
    let mut physics = PhysicsSystem::from_config(&SimConfig::default());
    for _ in 0..100 {
        bridge.run(&mut world);
        physics.step(&mut world);
        let speed = world.storage().bodies.get(agent).unwrap().speed();
        assert!(speed <= 6.0 + 1e-9, "speed {speed}");
    }
}

#[test]
fn test_incompatible_api_rejected() {
    let mut bridge = ScriptBridge::new(&ScriptingConfig::default());
    let err = bridge
        .load_source(
            BehaviorScript::Spectre,
            "old",
            r#"
                fn required_api() { "0.9.0" }
                fn update_state(id, a, b, c, d, e) {}
            "#,
        )
        .unwrap_err();
    assert!(matches!(err, EngineError::IncompatibleScriptApi { .. }));
}

#[test]
fn test_bundled_scripts_drive_a_level() {
    let dir = concat!(env!("CARGO_MANIFEST_DIR"), "/scripts");
    let config = SimConfig::default();
    let mut bridge = ScriptBridge::new(&config.scripting);
    bridge
        .load_file(BehaviorScript::Runner, format!("{dir}/runner.rhai"))
        .unwrap();
    bridge
        .load_file(BehaviorScript::Spectre, format!("{dir}/spectre.rhai"))
        .unwrap();

    let mut sim = Simulation::new(config, bridge);
    sim.load_level(&LevelDef::binary_star());
    let spectre = sim.spectre().unwrap();
    let start = sim.world().storage().transforms.get(spectre).unwrap().position;

    let mut idle = torus_engine::input::InputState::IDLE;
    for _ in 0..120 {
        sim.tick(&mut idle);
        let faults = sim
            .world_mut()
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, SimEvent::ScriptFault { .. }))
            .count();
        assert_eq!(faults, 0);
    }

    let now = sim.world().storage().transforms.get(spectre).unwrap().position;
    assert_ne!(start, now);
}

#[test]
fn test_goal_zone_radius_from_level() {
    let mut world = World::default();
    spawn_agent(&mut world, BehaviorScript::Runner, DVec2::ZERO);
    world.set_goal(Some(MemoryZone {
        position: DVec2::new(5.0, 6.0),
        radius: 12.5,
        title: String::new(),
        description: String::new(),
        color: Default::default(),
    }));

    let mut bridge = bridge_with(BehaviorScript::Runner, REPORT_ARGS);
    bridge.run(&mut world);
    assert_eq!(&reported(&mut world)[0][2..], &[5.0, 6.0, 12.5]);
}
