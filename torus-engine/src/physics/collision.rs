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
//! Obstacle and projectile collision response
//!
//! Bodies are tested against nearby walls as axis-aligned boxes on the
//! wrapped plane: a body overlaps a wall when the wrapped offset between
//! them is shorter than `collider_radius + wall_half_size` on both axes.
//!
//! Ordinary bodies stop dead on contact. Projectiles ricochet off the first
//! wall they touch, breaking it if it is destructible, and end their
//! collision check for the tick. A projectile that touches no wall is then
//! tested against the spectre.

use crate::config::PhysicsConfig;
use crate::ecs::components::{Rgba, Role};
use crate::ecs::{ComponentStorage, Entity, Storage};
use crate::effects::Effects;
use crate::events::SoundCue;
use crate::grid::SpatialGrid;
use crate::topology::Domain;
use glam::DVec2;

const WALL_BREAK_SHAKE: f64 = 4.0;
const WALL_GLANCE_SHAKE: f64 = 1.0;
const SPECTRE_HIT_SHAKE: f64 = 8.0;

/// Overlap between a body and one wall
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Wall entity
    pub wall: Entity,
    /// Wall center
    pub wall_position: DVec2,
    /// Wrapped offset from the body to the wall center
    pub delta: DVec2,
    /// Combined half-extent on each axis
    pub reach: f64,
}

/// Outcome of resolving one body for one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Resolution {
    /// The body touched at least one wall
    pub hit_wall: bool,
    /// Wall broken by a projectile; destroy at end of tick
    pub broken_wall: Option<Entity>,
    /// The projectile struck the spectre; destroy it at end of tick
    pub projectile_spent: bool,
}

/// Borrowed state collision resolution needs for one tick
pub struct CollisionContext<'a> {
    /// Wrapped plane
    pub domain: &'a Domain,
    /// Tuning
    pub config: &'a PhysicsConfig,
    /// Walls indexed this tick
    pub grid: &'a SpatialGrid,
    /// Spectre entity, if the level has one
    pub spectre: Option<Entity>,
}

/// First wall among `candidates` that overlaps a body at `position`
pub fn first_contact(
    domain: &Domain,
    storage: &Storage,
    candidates: &[Entity],
    position: DVec2,
    radius: f64,
) -> Option<Contact> {
    candidates.iter().find_map(|&wall_entity| {
        let wall = storage.walls.get(wall_entity)?;
        if wall.is_destroyed() {
            return None;
        }
        let wall_position = storage.transforms.get(wall_entity)?.position;
        let delta = domain.wrapped_delta(position, wall_position);
        let reach = radius + wall.half_size();
        (delta.x.abs() < reach && delta.y.abs() < reach).then_some(Contact {
            wall: wall_entity,
            wall_position,
            delta,
            reach,
        })
    })
}

/// Reflect a projectile off a wall and move it just outside
///
/// The axis with the larger offset is treated as the contact normal.
/// Returns the projectile's new position.
pub fn ricochet(velocity: &mut DVec2, position: DVec2, contact: &Contact, epsilon: f64) -> DVec2 {
    let clearance = contact.reach + epsilon;
    let mut position = position;
    if contact.delta.x.abs() > contact.delta.y.abs() {
        velocity.x = -velocity.x;
        position.x = if contact.delta.x > 0.0 {
            contact.wall_position.x - clearance
        } else {
            contact.wall_position.x + clearance
        };
    } else {
        velocity.y = -velocity.y;
        position.y = if contact.delta.y > 0.0 {
            contact.wall_position.y - clearance
        } else {
            contact.wall_position.y + clearance
        };
    }
    position
}

/// Resolve collisions for one body after integration
pub fn resolve(
    ctx: &CollisionContext<'_>,
    entity: Entity,
    storage: &mut Storage,
    effects: &mut Effects,
    candidates: &mut Vec<Entity>,
) -> Resolution {
    let mut resolution = Resolution::default();
    let Some(position) = storage.transforms.get(entity).map(|t| t.position) else {
        return resolution;
    };
    let Some(radius) = storage.bodies.get(entity).map(|b| b.collider_radius()) else {
        return resolution;
    };
    let is_projectile = storage.role(entity) == Some(Role::Projectile);

    ctx.grid.query_into(position, candidates);

    if !is_projectile {
        if first_contact(ctx.domain, storage, candidates, position, radius).is_some() {
            if let Some(body) = storage.bodies.get_mut(entity) {
                body.set_velocity(DVec2::ZERO);
            }
            resolution.hit_wall = true;
        }
        return resolution;
    }

    if let Some(contact) = first_contact(ctx.domain, storage, candidates, position, radius) {
        resolution.hit_wall = true;
        let velocity = bounce(ctx, entity, storage, &contact);

        let broke = storage
            .walls
            .get_mut(contact.wall)
            .map_or(false, |wall| wall.mark_destroyed());
        if broke {
            let color = tint(storage, contact.wall);
            effects.shatter(contact.wall, contact.wall_position, velocity, color);
            effects.play(SoundCue::Boom);
            effects.shake(WALL_BREAK_SHAKE);
            resolution.broken_wall = Some(contact.wall);
        } else {
            let at = storage.transforms.get(entity).map_or(position, |t| t.position);
            effects.impact(at);
            effects.shake(WALL_GLANCE_SHAKE);
        }
        return resolution;
    }

    resolution.projectile_spent = strike_spectre(ctx, entity, position, storage, effects);
    resolution
}

fn bounce(ctx: &CollisionContext<'_>, entity: Entity, storage: &mut Storage, contact: &Contact) -> DVec2 {
    let Some(body) = storage.bodies.get_mut(entity) else {
        return DVec2::ZERO;
    };
    let mut velocity = body.velocity();
    let Some(transform) = storage.transforms.get_mut(entity) else {
        return velocity;
    };
    let moved = ricochet(&mut velocity, transform.position, contact, ctx.config.separation_epsilon);
    transform.position = ctx.domain.wrap_position(moved);
    body.set_velocity(velocity);
    velocity
}

fn strike_spectre(
    ctx: &CollisionContext<'_>,
    projectile: Entity,
    position: DVec2,
    storage: &mut Storage,
    effects: &mut Effects,
) -> bool {
    let Some(spectre) = ctx.spectre else {
        return false;
    };
    let Some(target) = storage.transforms.get(spectre).map(|t| t.position) else {
        return false;
    };
    let hit_sq = ctx.config.spectre_hit_radius * ctx.config.spectre_hit_radius;
    if ctx.domain.wrapped_distance_sq(position, target) >= hit_sq {
        return false;
    }
    let Some(body) = storage.bodies.get_mut(spectre) else {
        return false;
    };
    body.raise_gravity(ctx.config.gravity_penalty);

    let impact = storage
        .bodies
        .get(projectile)
        .map_or(DVec2::ZERO, |b| b.velocity());
    let color = tint(storage, spectre);
    effects.play(SoundCue::Boom);
    effects.shake(SPECTRE_HIT_SHAKE);
    effects.shatter(spectre, target, impact, color);
    log::debug!("projectile {projectile} struck spectre {spectre}");
    true
}

fn tint(storage: &Storage, entity: Entity) -> Rgba {
    storage
        .renders
        .get(entity)
        .map_or(Rgba::WHITE, |render| render.color)
}
