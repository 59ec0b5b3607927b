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
//! Semi-implicit Euler integration
//!
//! Velocity is updated from the accumulated acceleration first and the new
//! velocity moves the body, which keeps orbits stable at the fixed step.

use crate::ecs::components::PhysicsBody;
use crate::topology::Domain;
use glam::DVec2;

/// Advance one body by one tick and return its wrapped position
///
/// `v += a`, `v *= friction`, clamp `|v|` to max speed, `p += v`, wrap `p`,
/// then zero `a`.
///
/// # Examples
///
/// ```
/// use glam::DVec2;
/// use torus_engine::ecs::components::PhysicsBody;
/// use torus_engine::physics::integration::integrate;
/// use torus_engine::topology::Domain;
///
/// let domain = Domain::new(100.0, 100.0);
/// let mut body = PhysicsBody::new(10.0, 1.0, 1.0).with_velocity(DVec2::new(3.0, 0.0));
/// let p = integrate(&mut body, DVec2::new(99.0, 50.0), &domain);
/// assert_eq!(p, DVec2::new(2.0, 50.0));
/// ```
pub fn integrate(body: &mut PhysicsBody, position: DVec2, domain: &Domain) -> DVec2 {
    body.integrate_velocity();
    domain.wrap_position(position + body.velocity())
}
