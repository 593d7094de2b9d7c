//! Slot table of stored objects with a lowest-index-first free list.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use glam::{Mat4, Vec3};

use crate::error::MboxError;

/// Liveness of a store slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// The slot holds a live object.
    Alive,
    /// The slot was released; its model/color are inert.
    Freed,
}

/// Data written into a slot on allocation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObjectCreateInfo {
    /// Composed model matrix.
    pub model: Mat4,
    /// Linear RGB color.
    pub color: Vec3,
}

/// A live object yielded by [`ObjectStore::iter`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StoredObject {
    /// Stable 0-based slot index.
    pub slot: usize,
    /// Composed model matrix.
    pub model: Mat4,
    /// Linear RGB color.
    pub color: Vec3,
}

/// Resizable table of per-object state.
///
/// Slot ids stay valid for the life of an object and are never renumbered.
/// Allocation reuses the lowest freed slot before growing the high-water
/// mark ([`position`](Self::position)).
#[derive(Debug, Clone, Default)]
pub struct ObjectStore {
    models: Vec<Mat4>,
    colors: Vec<Vec3>,
    visible: Vec<Visibility>,
    /// Min-heap of freed slots. Each freed slot appears exactly once.
    free: BinaryHeap<Reverse<usize>>,
    /// Optional cap on the high-water mark.
    capacity: Option<usize>,
    alive: usize,
}

impl ObjectStore {
    /// Empty, unbounded store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty store whose high-water mark may not exceed `capacity`.
    #[must_use]
    pub fn with_capacity(capacity: Option<usize>) -> Self {
        Self {
            capacity,
            ..Self::default()
        }
    }

    /// Store an object, returning its 0-based slot.
    ///
    /// # Errors
    ///
    /// Returns [`MboxError::CapacityExceeded`] when no freed slot exists and
    /// the store is at its configured capacity.
    pub fn alloc(&mut self, info: ObjectCreateInfo) -> Result<usize, MboxError> {
        let slot = if let Some(Reverse(slot)) = self.free.pop() {
            self.models[slot] = info.model;
            self.colors[slot] = info.color;
            self.visible[slot] = Visibility::Alive;
            slot
        } else {
            if let Some(capacity) = self.capacity {
                if self.models.len() >= capacity {
                    return Err(MboxError::CapacityExceeded { capacity });
                }
            }
            self.models.push(info.model);
            self.colors.push(info.color);
            self.visible.push(Visibility::Alive);
            self.models.len() - 1
        };

        self.alive += 1;
        log::debug!("alloc slot {slot} ({} alive)", self.alive);
        Ok(slot)
    }

    /// Release a slot. Out-of-range slots and double frees are no-ops.
    pub fn free(&mut self, slot: usize) {
        match self.visible.get_mut(slot) {
            Some(state @ Visibility::Alive) => {
                *state = Visibility::Freed;
                self.free.push(Reverse(slot));
                self.alive -= 1;
                log::debug!("free slot {slot} ({} alive)", self.alive);
            }
            Some(Visibility::Freed) => {
                log::debug!("slot {slot} already freed");
            }
            None => {
                log::debug!("free of unknown slot {slot} ignored");
            }
        }
    }

    /// Model and color of a live slot.
    #[must_use]
    pub fn get(&self, slot: usize) -> Option<ObjectCreateInfo> {
        match self.visible.get(slot) {
            Some(Visibility::Alive) => Some(ObjectCreateInfo {
                model: self.models[slot],
                color: self.colors[slot],
            }),
            _ => None,
        }
    }

    /// Liveness of a slot below the high-water mark.
    #[must_use]
    pub fn visibility(&self, slot: usize) -> Option<Visibility> {
        self.visible.get(slot).copied()
    }

    /// One past the highest slot ever used. Never decreases.
    #[must_use]
    pub fn position(&self) -> usize {
        self.models.len()
    }

    /// Number of live objects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.alive
    }

    /// Whether no object is alive.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.alive == 0
    }

    /// Configured maximum, if any.
    #[must_use]
    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    /// Live objects in ascending slot order.
    ///
    /// Every pass within a frame must draw from this same iteration so that
    /// pick ids line up with what is on screen.
    #[must_use]
    pub fn iter(&self) -> ObjectIter<'_> {
        ObjectIter {
            store: self,
            next: 0,
        }
    }
}

/// Borrowing iterator over live slots; see [`ObjectStore::iter`].
#[derive(Debug, Clone)]
pub struct ObjectIter<'a> {
    store: &'a ObjectStore,
    next: usize,
}

impl Iterator for ObjectIter<'_> {
    type Item = StoredObject;

    fn next(&mut self) -> Option<Self::Item> {
        while self.next < self.store.position() {
            let slot = self.next;
            self.next += 1;
            if self.store.visible[slot] == Visibility::Alive {
                return Some(StoredObject {
                    slot,
                    model: self.store.models[slot],
                    color: self.store.colors[slot],
                });
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.store.position() - self.next))
    }
}

impl<'a> IntoIterator for &'a ObjectStore {
    type Item = StoredObject;
    type IntoIter = ObjectIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::{compose, DecomposedTransform};

    fn info(scale: f32) -> ObjectCreateInfo {
        let transform = DecomposedTransform {
            scale,
            ..Default::default()
        };
        ObjectCreateInfo {
            model: compose(&transform),
            color: Vec3::new(1.0, 0.5, 0.31),
        }
    }

    #[test]
    fn freed_slot_is_reused_first() {
        let mut store = ObjectStore::new();
        let first = store.alloc(info(1.0)).unwrap();
        let second = store.alloc(info(1.0)).unwrap();
        store.free(first);
        let third = store.alloc(info(1.0)).unwrap();

        assert_eq!(first, 0);
        assert_eq!(second, 1);
        assert_eq!(third, first);
        assert_eq!(store.position(), 2);
    }

    #[test]
    fn lowest_freed_slot_wins() {
        let mut store = ObjectStore::new();
        for _ in 0..5 {
            let _ = store.alloc(info(1.0)).unwrap();
        }
        store.free(3);
        store.free(1);
        store.free(4);
        assert_eq!(store.alloc(info(1.0)).unwrap(), 1);
        assert_eq!(store.alloc(info(1.0)).unwrap(), 3);
        assert_eq!(store.alloc(info(1.0)).unwrap(), 4);
        assert_eq!(store.alloc(info(1.0)).unwrap(), 5);
    }

    #[test]
    fn alloc_free_alloc_scenario() {
        let mut store = ObjectStore::new();
        assert_eq!(store.alloc(info(1.0)).unwrap(), 0);
        store.free(0);
        assert_eq!(store.alloc(info(2.0)).unwrap(), 0);

        let objects: Vec<_> = store.iter().collect();
        assert_eq!(objects.len(), 1);
        assert_eq!(objects[0].slot, 0);
        assert_eq!(objects[0].model, info(2.0).model);
        assert_eq!(objects[0].color, Vec3::new(1.0, 0.5, 0.31));
    }

    #[test]
    fn double_free_does_not_duplicate_free_list() {
        let mut store = ObjectStore::new();
        let _ = store.alloc(info(1.0)).unwrap();
        let _ = store.alloc(info(1.0)).unwrap();
        store.free(0);
        store.free(0);
        store.free(42);

        assert_eq!(store.len(), 1);
        assert_eq!(store.alloc(info(1.0)).unwrap(), 0);
        // Slot 0 must not be handed out a second time.
        assert_eq!(store.alloc(info(1.0)).unwrap(), 2);
    }

    #[test]
    fn iteration_skips_freed_slots_in_ascending_order() {
        let mut store = ObjectStore::new();
        for _ in 0..4 {
            let _ = store.alloc(info(1.0)).unwrap();
        }
        store.free(1);
        store.free(2);

        let slots: Vec<_> = store.iter().map(|o| o.slot).collect();
        assert_eq!(slots, vec![0, 3]);
        // Restartable
        let again: Vec<_> = (&store).into_iter().map(|o| o.slot).collect();
        assert_eq!(slots, again);
        assert!(store.get(1).is_none());
        assert_eq!(store.visibility(1), Some(Visibility::Freed));
    }

    #[test]
    fn capacity_rejects_growth_but_allows_reuse() {
        let mut store = ObjectStore::with_capacity(Some(2));
        let _ = store.alloc(info(1.0)).unwrap();
        let _ = store.alloc(info(1.0)).unwrap();
        assert!(matches!(
            store.alloc(info(1.0)),
            Err(MboxError::CapacityExceeded { capacity: 2 })
        ));

        store.free(1);
        assert_eq!(store.alloc(info(1.0)).unwrap(), 1);
        assert_eq!(store.position(), 2);
    }
}
