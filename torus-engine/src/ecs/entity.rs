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
//! Entity management
//!
//! Entities are plain, monotonically increasing identifiers. An id is never
//! handed out twice between world rebuilds, and the raw value doubles as the
//! row index into every component column, so no lookup table is needed.

use std::fmt;

/// Handle for an entity in the simulation world
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Entity(u64);

impl Entity {
    /// Create an entity handle from a raw id
    pub fn new(id: u64) -> Self {
        Entity(id)
    }

    /// Get the raw id
    pub fn raw(&self) -> u64 {
        self.0
    }

    /// Row index into the component columns
    #[inline]
    pub fn index(&self) -> usize {
        self.0 as usize
    }

    /// Convert a script-side integer handle back into an entity
    ///
    /// Negative values are never valid handles.
    pub fn from_script(id: i64) -> Option<Self> {
        u64::try_from(id).ok().map(Entity)
    }

    /// Integer handle handed to scripts
    pub fn to_script(&self) -> i64 {
        self.0 as i64
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_creation() {
        let entity = Entity::new(42);
        assert_eq!(entity.raw(), 42);
        assert_eq!(entity.index(), 42);
    }

    #[test]
    fn test_script_handles() {
        assert_eq!(Entity::from_script(7), Some(Entity::new(7)));
        assert_eq!(Entity::from_script(-1), None);
        assert_eq!(Entity::new(9).to_script(), 9);
    }

    #[test]
    fn test_display() {
        assert_eq!(Entity::new(3).to_string(), "Entity(3)");
    }
}
