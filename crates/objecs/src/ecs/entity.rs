//! # Entity Management
//!
//! Entities are lightweight identifiers consisting of:
//! - An index into the store's slot table and component columns
//! - A generation counter so a recycled slot never aliases a deleted entity

use super::component::ComponentMask;

/// Unique identifier for an entity.
///
/// The ID is split into two parts:
/// - Lower 32 bits: Index into the slot table
/// - Upper 32 bits: Generation counter for detecting stale references
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct EntityId(u64);

impl EntityId {
    /// Creates a new entity ID from index and generation.
    ///
    /// # Arguments
    ///
    /// * `index` - The slot index (0 to 2^32-1)
    /// * `generation` - The generation counter (0 to 2^32-1)
    #[inline]
    #[must_use]
    pub const fn new(index: u32, generation: u32) -> Self {
        Self(((generation as u64) << 32) | (index as u64))
    }

    /// Returns the index portion of the entity ID.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0 as u32
    }

    /// Returns the generation portion of the entity ID.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        (self.0 >> 32) as u32
    }

    /// Null/invalid entity ID.
    pub const NULL: Self = Self(u64::MAX);

    /// Checks if this entity ID is null/invalid.
    #[inline]
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.0 == u64::MAX
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::NULL
    }
}

/// One slot of the store's entity table.
///
/// A dead slot keeps the ID it last carried so the next occupant can bump
/// the generation from it.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Entity {
    /// The ID of the entity currently (or last) stored in this slot.
    pub(crate) id: EntityId,
    /// Components currently held by this entity.
    pub(crate) mask: ComponentMask,
    /// Whether this entity slot is currently alive.
    pub(crate) alive: bool,
}

impl Entity {
    /// Creates a live entity holding no components.
    #[inline]
    #[must_use]
    pub const fn new(id: EntityId) -> Self {
        Self {
            id,
            mask: ComponentMask::EMPTY,
            alive: true,
        }
    }

    /// Creates a dead/empty entity slot.
    #[inline]
    #[must_use]
    pub const fn dead() -> Self {
        Self {
            id: EntityId::NULL,
            mask: ComponentMask::EMPTY,
            alive: false,
        }
    }

    /// Returns the ID the next occupant of this slot receives.
    #[inline]
    #[must_use]
    pub(crate) const fn next_id(&self, index: u32) -> EntityId {
        EntityId::new(index, self.id.generation().wrapping_add(1))
    }

    /// Checks whether this slot is alive and still holds `id`.
    #[inline]
    #[must_use]
    pub(crate) fn is(&self, id: EntityId) -> bool {
        self.alive && self.id == id
    }

    /// Marks the slot dead, keeping its ID for the next generation bump.
    #[inline]
    pub(crate) fn kill(&mut self) {
        self.alive = false;
        self.mask = ComponentMask::EMPTY;
    }
}

impl Default for Entity {
    fn default() -> Self {
        Self::dead()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::component::ComponentId;

    #[test]
    fn test_entity_id_roundtrip() {
        let id = EntityId::new(12345, 67890);
        assert_eq!(id.index(), 12345);
        assert_eq!(id.generation(), 67890);
        assert!(!id.is_null());
        assert!(EntityId::default().is_null());
    }

    #[test]
    fn test_next_id_bumps_generation() {
        let slot = Entity::dead();
        let first = slot.next_id(7);
        assert_eq!(first.index(), 7);
        assert_eq!(first.generation(), 0);

        let mut slot = Entity::new(first);
        slot.kill();
        let second = slot.next_id(7);
        assert_eq!(second.index(), 7);
        assert_eq!(second.generation(), 1);
    }

    #[test]
    fn test_kill_clears_mask() {
        let id = EntityId::new(0, 0);
        let mut slot = Entity::new(id);
        slot.mask.insert(ComponentId::from_index(5));
        assert!(slot.is(id));

        slot.kill();
        assert!(!slot.is(id));
        assert!(slot.mask.is_empty());
        assert_eq!(slot.id, id);
    }
}
