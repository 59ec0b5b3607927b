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
//! Component storage and management
//!
//! Components are data containers attached to entities. Each component kind
//! lives in its own [`Column`]: a dense vector with one slot per entity row.
//! A slot is either `Some(component)` or `None`; absence is an explicit
//! value, never a missing row, so every column in a world has the same
//! length and presence checks are O(1).
//!
//! # Memory Layout
//!
//! ```text
//! row:         0        1        2        3
//! transforms: [Some(t), Some(t), Some(t), None   ]
//! bodies:     [Some(b), None,    Some(b), None   ]
//! walls:      [None,    Some(w), None,    None   ]
//! ```

use crate::ecs::Entity;

/// Trait that all components must implement
///
/// Components should be plain data structures without behavior.
pub trait Component: 'static {}

/// Storage interface for components keyed by entity
pub trait ComponentStorage {
    /// The component type this storage manages
    type Component: Component;

    /// Insert a component for the given entity
    ///
    /// Returns false if the entity has no row in this storage.
    fn insert(&mut self, entity: Entity, component: Self::Component) -> bool;

    /// Remove a component for the given entity
    fn remove(&mut self, entity: Entity) -> Option<Self::Component>;

    /// Get a reference to a component for the given entity
    fn get(&self, entity: Entity) -> Option<&Self::Component>;

    /// Get a mutable reference to a component for the given entity
    fn get_mut(&mut self, entity: Entity) -> Option<&mut Self::Component>;

    /// Check if an entity has this component
    fn contains(&self, entity: Entity) -> bool;

    /// Mark every slot absent, keeping the rows
    fn clear(&mut self);
}

/// Index-aligned column of optional component slots
///
/// Rows are only added or truncated by the owning world, which keeps all
/// columns the same length.
///
/// # Example
///
/// ```
/// use torus_engine::ecs::{Column, ComponentStorage, World};
/// use torus_engine::ecs::components::Lifetime;
///
/// let mut world = World::default();
/// let e = world.create_entity();
/// world.storage_mut().lifetimes.insert(e, Lifetime::new(2.0));
/// assert!(world.storage().lifetimes.contains(e));
/// ```
#[derive(Debug, Clone)]
pub struct Column<T> {
    slots: Vec<Option<T>>,
}

impl<T: Component> Column<T> {
    /// Create an empty column
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create an empty column with room for `capacity` rows
    pub fn with_capacity(capacity: usize) -> Self {
        Column {
            slots: Vec::with_capacity(capacity),
        }
    }

    /// Number of rows (present or absent)
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Check if the column has no rows
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Allocated row capacity
    pub fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    /// Number of rows holding a component
    pub fn present_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Iterate over present components with their entity
    pub fn iter(&self) -> impl Iterator<Item = (Entity, &T)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|c| (Entity::new(i as u64), c)))
    }

    /// Iterate mutably over present components with their entity
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Entity, &mut T)> + '_ {
        self.slots
            .iter_mut()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_mut().map(|c| (Entity::new(i as u64), c)))
    }

    /// Append one absent row
    pub(crate) fn push_absent(&mut self) {
        self.slots.push(None);
    }

    /// Drop all rows while keeping the backing allocation
    pub(crate) fn truncate_rows(&mut self) {
        self.slots.clear();
    }
}

impl<T: Component> Default for Column<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Component> ComponentStorage for Column<T> {
    type Component = T;

    fn insert(&mut self, entity: Entity, component: Self::Component) -> bool {
        match self.slots.get_mut(entity.index()) {
            Some(slot) => {
                *slot = Some(component);
                true
            }
            None => false,
        }
    }

    fn remove(&mut self, entity: Entity) -> Option<Self::Component> {
        self.slots.get_mut(entity.index()).and_then(Option::take)
    }

    #[inline]
    fn get(&self, entity: Entity) -> Option<&Self::Component> {
        self.slots.get(entity.index()).and_then(Option::as_ref)
    }

    #[inline]
    fn get_mut(&mut self, entity: Entity) -> Option<&mut Self::Component> {
        self.slots.get_mut(entity.index()).and_then(Option::as_mut)
    }

    #[inline]
    fn contains(&self, entity: Entity) -> bool {
        matches!(self.slots.get(entity.index()), Some(Some(_)))
    }

    fn clear(&mut self) {
        for slot in &mut self.slots {
            *slot = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq)]
    struct TestComponent {
        x: f32,
        y: f32,
    }

    impl Component for TestComponent {}

    fn column_with_rows(rows: usize) -> Column<TestComponent> {
        let mut column = Column::new();
        for _ in 0..rows {
            column.push_absent();
        }
        column
    }

    #[test]
    fn test_column_basic() {
        let mut column = column_with_rows(2);
        let entity = Entity::new(1);

        assert!(column.insert(entity, TestComponent { x: 10.0, y: 20.0 }));
        assert!(column.contains(entity));
        assert_eq!(column.get(entity).unwrap().x, 10.0);

        let removed = column.remove(entity);
        assert_eq!(removed, Some(TestComponent { x: 10.0, y: 20.0 }));
        assert!(!column.contains(entity));
        assert_eq!(column.len(), 2);
    }

    #[test]
    fn test_insert_out_of_bounds_is_rejected() {
        let mut column = column_with_rows(1);
        assert!(!column.insert(Entity::new(5), TestComponent { x: 1.0, y: 1.0 }));
        assert_eq!(column.len(), 1);
        assert!(column.get(Entity::new(5)).is_none());
        assert!(column.remove(Entity::new(5)).is_none());
    }

    #[test]
    fn test_column_update_in_place() {
        let mut column = column_with_rows(1);
        let entity = Entity::new(0);

        column.insert(entity, TestComponent { x: 1.0, y: 2.0 });
        if let Some(comp) = column.get_mut(entity) {
            comp.x = 100.0;
        }
        assert_eq!(column.get(entity).unwrap().x, 100.0);
        assert_eq!(column.present_count(), 1);
    }

    #[test]
    fn test_clear_keeps_rows() {
        let mut column = column_with_rows(3);
        column.insert(Entity::new(0), TestComponent { x: 1.0, y: 2.0 });
        column.insert(Entity::new(2), TestComponent { x: 3.0, y: 4.0 });

        column.clear();
        assert_eq!(column.len(), 3);
        assert_eq!(column.present_count(), 0);
    }

    #[test]
    fn test_truncate_keeps_capacity() {
        let mut column = column_with_rows(100);
        let capacity = column.capacity();

        column.truncate_rows();
        assert!(column.is_empty());
        assert_eq!(column.capacity(), capacity);
    }

    #[test]
    fn test_iter_skips_absent() {
        let mut column = column_with_rows(4);
        column.insert(Entity::new(1), TestComponent { x: 1.0, y: 0.0 });
        column.insert(Entity::new(3), TestComponent { x: 3.0, y: 0.0 });

        let entities: Vec<Entity> = column.iter().map(|(e, _)| e).collect();
        assert_eq!(entities, vec![Entity::new(1), Entity::new(3)]);

        let sum_x: f32 = column.iter().map(|(_, c)| c.x).sum();
        assert_eq!(sum_x, 4.0);
    }
}
