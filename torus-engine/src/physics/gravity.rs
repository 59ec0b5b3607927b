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
//! Gravity from wells
//!
//! Each well pulls with an inverse-square force measured along the shortest
//! wrapped path. Distance is floored before squaring and the magnitude is
//! capped, so a body sitting on a well neither divides by zero nor gets
//! flung across the map.

use crate::config::PhysicsConfig;
use crate::ecs::{ComponentStorage, Entity, Storage};
use crate::topology::Domain;
use glam::DVec2;

/// Position and strength of one well, captured at the start of a tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WellSample {
    /// Entity carrying the well
    pub entity: Entity,
    /// Where the well sits this tick
    pub position: DVec2,
    /// Well mass
    pub mass: f64,
}

/// Snapshot every well that has a transform
///
/// Wells without a transform are skipped for the tick.
pub fn collect_wells(storage: &Storage, out: &mut Vec<WellSample>) {
    out.clear();
    for (entity, well) in storage.wells.iter() {
        match storage.transforms.get(entity) {
            Some(transform) => out.push(WellSample {
                entity,
                position: transform.position,
                mass: well.mass,
            }),
            None => log::trace!("well {entity} has no transform, skipped"),
        }
    }
}

/// Force a single well exerts on a body at `position`
///
/// The magnitude is `mass * gravity_scale / d^2` scaled by the body's
/// gravity multiplier, then clamped to `force_cap`.
///
/// # Examples
///
/// ```
/// use glam::DVec2;
/// use torus_engine::config::PhysicsConfig;
/// use torus_engine::physics::gravity::well_force;
/// use torus_engine::topology::Domain;
///
/// let domain = Domain::new(1280.0, 720.0);
/// let force = well_force(
///     &domain,
///     DVec2::new(0.0, 0.0),
///     DVec2::new(1275.0, 0.0),
///     2.0,
///     1.0,
///     &PhysicsConfig::default(),
/// );
/// assert!(force.x < 0.0);
/// ```
pub fn well_force(
    domain: &Domain,
    position: DVec2,
    well_position: DVec2,
    well_mass: f64,
    multiplier: f64,
    config: &PhysicsConfig,
) -> DVec2 {
    let delta = domain.wrapped_delta(position, well_position);
    let distance = delta.length().max(config.min_gravity_distance);
    let magnitude = well_mass * config.gravity_scale / (distance * distance) * multiplier;
    let magnitude = magnitude.clamp(-config.force_cap, config.force_cap);
    let force = delta / distance * magnitude;
    if force.is_finite() {
        force
    } else {
        DVec2::ZERO
    }
}

/// Sum the pull of every well except the body's own
pub fn accumulate(
    domain: &Domain,
    entity: Entity,
    position: DVec2,
    multiplier: f64,
    wells: &[WellSample],
    config: &PhysicsConfig,
) -> DVec2 {
    wells
        .iter()
        .filter(|well| well.entity != entity)
        .map(|well| well_force(domain, position, well.position, well.mass, multiplier, config))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn domain() -> Domain {
        Domain::new(1280.0, 720.0)
    }

    #[test]
    fn test_force_points_at_well() {
        let config = PhysicsConfig::default();
        let force = well_force(&domain(), DVec2::new(100.0, 100.0), DVec2::new(200.0, 100.0), 2.0, 1.0, &config);
        assert!(force.x > 0.0);
        assert!(force.y.abs() < 1e-12);
        // 2 * 500 / 100^2
        assert!((force.length() - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_force_is_capped() {
        let config = PhysicsConfig::default();
        let force = well_force(&domain(), DVec2::new(100.0, 100.0), DVec2::new(101.0, 100.0), 50.0, 3.0, &config);
        assert!((force.length() - config.force_cap).abs() < 1e-12);
    }

    #[test]
    fn test_coincident_body_feels_nothing() {
        let config = PhysicsConfig::default();
        let p = DVec2::new(10.0, 10.0);
        assert_eq!(well_force(&domain(), p, p, 2.0, 1.0, &config), DVec2::ZERO);
    }

    #[test]
    fn test_multiplier_scales_force() {
        let config = PhysicsConfig::default();
        let a = well_force(&domain(), DVec2::ZERO, DVec2::new(0.0, 300.0), 2.0, 1.0, &config);
        let b = well_force(&domain(), DVec2::ZERO, DVec2::new(0.0, 300.0), 2.0, 2.0, &config);
        assert!((b.y - 2.0 * a.y).abs() < 1e-12);
    }

    #[test]
    fn test_accumulate_skips_own_well() {
        let config = PhysicsConfig::default();
        let me = Entity::new(0);
        let wells = [
            WellSample { entity: me, position: DVec2::new(50.0, 0.0), mass: 9.0 },
            WellSample { entity: Entity::new(1), position: DVec2::new(0.0, 100.0), mass: 2.0 },
        ];
        let force = accumulate(&domain(), me, DVec2::ZERO, 1.0, &wells, &config);
        assert!(force.x.abs() < 1e-12);
        assert!(force.y > 0.0);
    }
}
