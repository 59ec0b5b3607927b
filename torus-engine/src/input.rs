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
//! Input boundary
//!
//! The simulation never reads devices. Once per tick it polls an
//! [`InputSource`] and stores the resulting [`InputState`] in the world,
//! where both the player-input system and the `get_input_dir` script
//! function read it.

use glam::DVec2;

/// Directional intent and modifier state for one tick
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct InputState {
    /// Raw direction; each axis is usually -1, 0 or 1
    pub direction: DVec2,
    /// Boost modifier held
    pub boost: bool,
}

impl InputState {
    /// No input
    pub const IDLE: InputState = InputState {
        direction: DVec2::ZERO,
        boost: false,
    };

    /// Create an input state
    pub fn new(direction: DVec2, boost: bool) -> Self {
        let direction = if direction.is_finite() { direction } else { DVec2::ZERO };
        InputState { direction, boost }
    }

    /// Whether any direction is held
    pub fn has_direction(&self) -> bool {
        self.direction != DVec2::ZERO
    }
}

/// Something that can be polled for input once per tick
pub trait InputSource {
    /// Current intent
    fn poll(&mut self) -> InputState;
}

impl InputSource for InputState {
    fn poll(&mut self) -> InputState {
        *self
    }
}

impl<F> InputSource for F
where
    F: FnMut() -> InputState,
{
    fn poll(&mut self) -> InputState {
        self()
    }
}
