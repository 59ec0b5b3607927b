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
//! Simulation components
//!
//! Plain data attached to entities: spatial state, physical state, role,
//! and the level-geometry markers the physics and scripting systems key off.
//! Vectors use `glam::DVec2` with double precision throughout.

use crate::ecs::{Component, Entity};
use glam::DVec2;
use serde::{Deserialize, Serialize};

/// Position and orientation on the wrapped plane
///
/// # Examples
///
/// ```
/// use glam::DVec2;
/// use torus_engine::ecs::components::Transform;
///
/// let t = Transform::new(DVec2::new(1.0, 2.0), 0.5);
/// assert_eq!(t.position.x, 1.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Transform {
    /// World position, kept inside the domain by the physics step
    pub position: DVec2,
    /// Facing in radians
    pub rotation: f64,
}

impl Transform {
    /// Create a transform
    pub fn new(position: DVec2, rotation: f64) -> Self {
        Transform { position, rotation }
    }

    /// Create a transform with zero rotation
    pub fn at(position: DVec2) -> Self {
        Transform::new(position, 0.0)
    }

    /// Rotate by `delta` radians, ignoring non-finite input
    pub fn rotate(&mut self, delta: f64) {
        if delta.is_finite() {
            self.rotation = (self.rotation + delta).rem_euclid(std::f64::consts::TAU);
        }
    }

    /// Unit vector along the current facing
    pub fn facing(&self) -> DVec2 {
        DVec2::new(self.rotation.cos(), self.rotation.sin())
    }
}

impl Component for Transform {}

/// Smallest friction coefficient accepted; zero would freeze a body forever
pub const MIN_FRICTION: f64 = 1e-3;

/// Default collision radius for moving bodies
pub const DEFAULT_COLLIDER_RADIUS: f64 = 5.0;

/// Kinematic state of a moving entity
///
/// Acceleration is a per-tick accumulator: forces are summed into it during
/// the tick and it is zeroed after integration. The gravity multiplier only
/// ever grows.
///
/// # Examples
///
/// ```
/// use glam::DVec2;
/// use torus_engine::ecs::components::PhysicsBody;
///
/// let mut body = PhysicsBody::new(6.0, 0.96, 1.0);
/// body.apply_force(DVec2::new(1.0, 0.0));
/// assert_eq!(body.acceleration(), DVec2::new(1.0, 0.0));
/// assert_eq!(body.gravity_multiplier(), 1.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicsBody {
    velocity: DVec2,
    acceleration: DVec2,
    max_speed: f64,
    friction: f64,
    mass: f64,
    gravity_multiplier: f64,
    collider_radius: f64,
}

impl PhysicsBody {
    /// Create a body at rest
    ///
    /// Friction is clamped into `[MIN_FRICTION, 1]` and a negative or
    /// non-finite max speed becomes zero.
    pub fn new(max_speed: f64, friction: f64, mass: f64) -> Self {
        let friction = if friction.is_finite() {
            friction.clamp(MIN_FRICTION, 1.0)
        } else {
            1.0
        };
        PhysicsBody {
            velocity: DVec2::ZERO,
            acceleration: DVec2::ZERO,
            max_speed: sanitize_speed(max_speed),
            friction,
            mass,
            gravity_multiplier: 1.0,
            collider_radius: DEFAULT_COLLIDER_RADIUS,
        }
    }

    /// Set the initial velocity
    pub fn with_velocity(mut self, velocity: DVec2) -> Self {
        if velocity.is_finite() {
            self.velocity = velocity;
        }
        self
    }

    /// Set the collision radius
    pub fn with_collider_radius(mut self, radius: f64) -> Self {
        if radius.is_finite() && radius >= 0.0 {
            self.collider_radius = radius;
        }
        self
    }

    /// Current velocity
    pub fn velocity(&self) -> DVec2 {
        self.velocity
    }

    /// Overwrite the velocity, ignoring non-finite input
    pub fn set_velocity(&mut self, velocity: DVec2) {
        if velocity.is_finite() {
            self.velocity = velocity;
        }
    }

    /// Current speed
    pub fn speed(&self) -> f64 {
        self.velocity.length()
    }

    /// Pending acceleration for this tick
    pub fn acceleration(&self) -> DVec2 {
        self.acceleration
    }

    /// Accumulate a force into the pending acceleration
    ///
    /// Non-finite forces are dropped; returns whether the force was applied.
    pub fn apply_force(&mut self, force: DVec2) -> bool {
        if !force.is_finite() {
            return false;
        }
        self.acceleration += force;
        true
    }

    pub(crate) fn integrate_velocity(&mut self) {
        self.velocity = (self.velocity + self.acceleration) * self.friction;
        let speed = self.velocity.length();
        if !speed.is_finite() {
            self.velocity = DVec2::ZERO;
        } else if speed > self.max_speed {
            self.velocity *= self.max_speed / speed;
        }
        self.acceleration = DVec2::ZERO;
    }

    /// Maximum speed after integration
    pub fn max_speed(&self) -> f64 {
        self.max_speed
    }

    /// Overwrite the speed cap
    pub fn set_max_speed(&mut self, max_speed: f64) {
        self.max_speed = sanitize_speed(max_speed);
    }

    /// Velocity retention factor per tick
    pub fn friction(&self) -> f64 {
        self.friction
    }

    /// Inertial mass
    pub fn mass(&self) -> f64 {
        self.mass
    }

    /// Scale applied to all gravity felt by this body
    pub fn gravity_multiplier(&self) -> f64 {
        self.gravity_multiplier
    }

    /// Permanently increase gravity susceptibility
    ///
    /// Non-positive or non-finite amounts are ignored: the multiplier never
    /// decreases.
    pub fn raise_gravity(&mut self, amount: f64) {
        if amount.is_finite() && amount > 0.0 {
            self.gravity_multiplier += amount;
        }
    }

    /// Collision radius used against obstacles
    pub fn collider_radius(&self) -> f64 {
        self.collider_radius
    }
}

fn sanitize_speed(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

impl Component for PhysicsBody {}

/// 8-bit RGBA color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgba {
    /// Red channel
    pub r: u8,
    /// Green channel
    pub g: u8,
    /// Blue channel
    pub b: u8,
    /// Alpha channel
    pub a: u8,
}

impl Rgba {
    /// Opaque white
    pub const WHITE: Rgba = Rgba::opaque(255, 255, 255);

    /// Create an opaque color
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Rgba { r, g, b, a: 255 }
    }
}

impl Default for Rgba {
    fn default() -> Self {
        Rgba::WHITE
    }
}

/// Presentation hints for an external renderer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderHint {
    /// Base tint, also used for debris when the entity shatters
    pub color: Rgba,
    /// Whether the renderer should add a glow pass
    pub glow: bool,
    /// Sprite scale
    pub scale: f64,
}

impl RenderHint {
    /// Create a hint with the given color and unit scale
    pub fn new(color: Rgba) -> Self {
        RenderHint {
            color,
            glow: false,
            scale: 1.0,
        }
    }

    /// Enable the glow pass
    pub fn glowing(mut self) -> Self {
        self.glow = true;
        self
    }
}

impl Component for RenderHint {}

/// The two behavior scripts the engine knows how to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BehaviorScript {
    /// Script steering the player-side character
    Runner,
    /// Script steering the counterpart
    Spectre,
}

impl BehaviorScript {
    /// All script slots, in load order
    pub const ALL: [BehaviorScript; 2] = [BehaviorScript::Runner, BehaviorScript::Spectre];

    /// Name used in logs and for the bundled script files
    pub fn name(&self) -> &'static str {
        match self {
            BehaviorScript::Runner => "runner",
            BehaviorScript::Spectre => "spectre",
        }
    }
}

/// Binds an entity to a behavior script
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AiBinding {
    /// Script invoked for this entity every tick
    pub script: BehaviorScript,
    /// Counterpart reported by `get_target`
    pub target: Option<Entity>,
}

impl AiBinding {
    /// Bind to a script with no target yet
    pub fn new(script: BehaviorScript) -> Self {
        AiBinding { script, target: None }
    }

    /// Set the counterpart entity
    pub fn with_target(mut self, target: Entity) -> Self {
        self.target = Some(target);
        self
    }
}

impl Component for AiBinding {}

/// Closed set of entity roles
///
/// Gravity exemption, collision response and target resolution branch on
/// this instead of on free-form labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Player-side character
    Runner,
    /// Script-driven counterpart
    Spectre,
    /// Fast-moving shot; ignores gravity and ricochets off obstacles
    Projectile,
    /// Entity carrying a gravity well
    GravityWell,
    /// Level obstacle
    Obstacle,
}

impl Role {
    /// Whether this role skips gravity accumulation
    pub fn ignores_gravity(&self) -> bool {
        matches!(self, Role::Projectile)
    }
}

impl Component for Role {}

/// Point source of inverse-square attraction
///
/// The well sits at its entity's transform, so wells can move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GravityWell {
    /// Event-horizon radius, used by renderers and sensors
    pub radius: f64,
    /// Strength of the pull
    pub mass: f64,
}

impl GravityWell {
    /// Create a well
    pub fn new(radius: f64, mass: f64) -> Self {
        GravityWell { radius, mass }
    }
}

impl Component for GravityWell {}

/// Marker for entities steered by the input boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InputControlled;

impl Component for InputControlled {}

/// Square obstacle
///
/// A destroyed wall stops colliding immediately; its row is nulled later by
/// an explicit destroy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Wall {
    size: f64,
    destructible: bool,
    destroyed: bool,
}

impl Wall {
    /// Create a wall with the given edge length
    pub fn new(size: f64, destructible: bool) -> Self {
        Wall {
            size: if size.is_finite() { size.max(0.0) } else { 0.0 },
            destructible,
            destroyed: false,
        }
    }

    /// Edge length
    pub fn size(&self) -> f64 {
        self.size
    }

    /// Half the edge length
    pub fn half_size(&self) -> f64 {
        self.size * 0.5
    }

    /// Whether projectiles can break it
    pub fn is_destructible(&self) -> bool {
        self.destructible
    }

    /// Whether it has been broken
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Mark as broken; no-op for indestructible walls
    pub fn mark_destroyed(&mut self) -> bool {
        if self.destructible && !self.destroyed {
            self.destroyed = true;
            true
        } else {
            false
        }
    }
}

impl Component for Wall {}

/// Periodically fires projectiles along its transform's facing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectileEmitter {
    /// Seconds between shots
    pub interval: f64,
    /// Simulation time of the last shot
    pub last_fire: f64,
}

impl ProjectileEmitter {
    /// Create an emitter that first fires one interval after time zero
    pub fn new(interval: f64) -> Self {
        ProjectileEmitter {
            interval,
            last_fire: 0.0,
        }
    }

    /// Whether a shot is due at simulation time `now`
    pub fn is_due(&self, now: f64) -> bool {
        now > self.last_fire + self.interval
    }
}

impl Component for ProjectileEmitter {}

/// Remaining time before the entity is destroyed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lifetime {
    /// Seconds left
    pub remaining: f64,
}

impl Lifetime {
    /// Create a lifetime
    pub fn new(seconds: f64) -> Self {
        Lifetime { remaining: seconds }
    }

    /// Count down by `dt`; returns true once expired
    pub fn tick(&mut self, dt: f64) -> bool {
        self.remaining -= dt;
        self.is_expired()
    }

    /// Whether the lifetime has run out
    pub fn is_expired(&self) -> bool {
        self.remaining <= 0.0 || self.remaining.is_nan()
    }
}

impl Component for Lifetime {}
