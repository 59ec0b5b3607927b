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
//! Toroidal topology primitives
//!
//! The simulation plane wraps on both axes: leaving through the right edge
//! re-enters on the left, and likewise for top and bottom. Every distance,
//! direction and position fold in the engine goes through [`Domain`] so that
//! gravity, collision, script sensors and goal checks all agree on what
//! "nearby" means.
//!
//! # Shortest-path deltas
//!
//! For two points `a` and `b` the raw difference on one axis is folded into
//! `[-extent/2, extent/2]`: if it is longer than half the domain, the other
//! way around is shorter.
//!
//! ```
//! use glam::DVec2;
//! use torus_engine::topology::Domain;
//!
//! let domain = Domain::new(1280.0, 720.0);
//! let a = DVec2::new(10.0, 0.0);
//! let b = DVec2::new(1270.0, 0.0);
//! assert!((domain.wrapped_distance(a, b) - 20.0).abs() < 1e-9);
//! ```

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// Default domain width in world units
pub const DEFAULT_WIDTH: f64 = 1280.0;

/// Default domain height in world units
pub const DEFAULT_HEIGHT: f64 = 720.0;

/// A fixed-size rectangular plane that wraps on both axes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Domain {
    width: f64,
    height: f64,
}

impl Domain {
    /// Create a new domain with the given extents
    ///
    /// # Panics
    ///
    /// Panics if either extent is non-positive or not finite.
    pub fn new(width: f64, height: f64) -> Self {
        assert!(
            width > 0.0 && width.is_finite() && height > 0.0 && height.is_finite(),
            "Domain extents must be positive and finite"
        );
        Domain { width, height }
    }

    /// Get the domain width
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Get the domain height
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Get the domain extents as a vector
    pub fn extent(&self) -> DVec2 {
        DVec2::new(self.width, self.height)
    }

    /// Shortest signed vector from `from` to `to` across the wrap boundaries
    #[inline]
    pub fn wrapped_delta(&self, from: DVec2, to: DVec2) -> DVec2 {
        DVec2::new(
            fold_axis(to.x - from.x, self.width),
            fold_axis(to.y - from.y, self.height),
        )
    }

    /// Euclidean length of [`Domain::wrapped_delta`]
    #[inline]
    pub fn wrapped_distance(&self, a: DVec2, b: DVec2) -> f64 {
        self.wrapped_delta(a, b).length()
    }

    /// Squared wrapped distance, for threshold comparisons only
    #[inline]
    pub fn wrapped_distance_sq(&self, a: DVec2, b: DVec2) -> f64 {
        self.wrapped_delta(a, b).length_squared()
    }

    /// Fold an arbitrary position back into `[0, width) x [0, height)`
    ///
    /// Non-finite coordinates collapse to zero so a corrupted position can
    /// never escape the domain.
    #[inline]
    pub fn wrap_position(&self, position: DVec2) -> DVec2 {
        DVec2::new(
            wrap_axis(position.x, self.width),
            wrap_axis(position.y, self.height),
        )
    }

    /// Check that both extents are positive and finite
    ///
    /// Deserialized domains bypass [`Domain::new`], so loaders call this.
    pub fn is_valid(&self) -> bool {
        self.width > 0.0 && self.width.is_finite() && self.height > 0.0 && self.height.is_finite()
    }

    /// Check whether a position already lies inside the domain bounds
    pub fn contains(&self, position: DVec2) -> bool {
        position.x >= 0.0 && position.x < self.width && position.y >= 0.0 && position.y < self.height
    }
}

impl Default for Domain {
    fn default() -> Self {
        Domain::new(DEFAULT_WIDTH, DEFAULT_HEIGHT)
    }
}

// `%` keeps the sign of the dividend, so folding `d` and `-d` stays exactly
// symmetric, which rem_euclid would not guarantee.
#[inline]
fn fold_axis(raw: f64, extent: f64) -> f64 {
    let mut d = if raw.abs() > extent { raw % extent } else { raw };
    let half = extent * 0.5;
    if d > half {
        d -= extent;
    } else if d < -half {
        d += extent;
    }
    d
}

#[inline]
fn wrap_axis(value: f64, extent: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    let wrapped = value.rem_euclid(extent);
    // rem_euclid can round up to exactly `extent` for tiny negative inputs
    if wrapped >= extent {
        0.0
    } else {
        wrapped
    }
}
