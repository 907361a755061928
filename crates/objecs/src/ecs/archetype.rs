//! # Archetype Views
//!
//! An archetype is a live index of every entity that holds a required set of
//! components and none of an excluded set.
//!
//! ```text
//! required = {pos, vel}   excluded = {frozen}
//!
//! mask(e) = pos|vel|hp    -> member
//! mask(e) = pos           -> not a member (missing vel)
//! mask(e) = pos|vel|frozen -> not a member (excluded)
//! ```
//!
//! Views are owned by the [`Store`](super::Store), which keeps their
//! membership in sync on every mutation. A view never reads or writes the
//! store itself; it only sees the entity ID and its current mask.
//!
//! ## Membership layout
//!
//! Membership is a sparse set keyed by entity slot index:
//!
//! ```text
//! sparse: [ -, 1, -, 0, ... ]   slot index -> position in dense
//! dense:  [ e3, e1 ]            packed member IDs, iteration order
//! ```
//!
//! Insert, remove and lookup are O(1); iteration walks `dense` only.

use super::component::ComponentMask;
use super::entity::EntityId;

/// Sentinel for a slot that is not in the dense array.
const ABSENT: u32 = u32::MAX;

/// Handle to a view registered on a store.
///
/// Same layout as [`EntityId`]: a registry slot index plus a generation, so
/// a handle to a disposed view never resolves to a later one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct ViewId(u64);

impl ViewId {
    /// Creates a view ID from registry index and generation.
    #[inline]
    #[must_use]
    pub const fn new(index: u32, generation: u32) -> Self {
        Self(((generation as u64) << 32) | (index as u64))
    }

    /// Returns the registry index.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0 as u32
    }

    /// Returns the generation.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        (self.0 >> 32) as u32
    }
}

/// Sparse set of entity IDs.
#[derive(Clone, Debug, Default)]
pub(crate) struct Membership {
    /// Packed member IDs.
    dense: Vec<EntityId>,
    /// Position in `dense` by entity slot index, or [`ABSENT`].
    sparse: Vec<u32>,
}

impl Membership {
    fn position(&self, id: EntityId) -> Option<usize> {
        let pos = *self.sparse.get(id.index() as usize)?;
        if pos == ABSENT {
            return None;
        }
        let pos = pos as usize;
        (self.dense.get(pos) == Some(&id)).then_some(pos)
    }

    fn contains(&self, id: EntityId) -> bool {
        self.position(id).is_some()
    }

    /// Returns `true` if the ID was newly inserted.
    fn insert(&mut self, id: EntityId) -> bool {
        if self.contains(id) {
            return false;
        }
        let slot = id.index() as usize;
        if slot >= self.sparse.len() {
            self.sparse.resize(slot + 1, ABSENT);
        }
        let pos = self.dense.len() as u32;
        self.sparse[slot] = pos;
        self.dense.push(id);
        true
    }

    /// Returns `true` if the ID was present.
    fn remove(&mut self, id: EntityId) -> bool {
        let Some(pos) = self.position(id) else {
            return false;
        };
        self.dense.swap_remove(pos);
        self.sparse[id.index() as usize] = ABSENT;
        if let Some(&moved) = self.dense.get(pos) {
            self.sparse[moved.index() as usize] = pos as u32;
        }
        true
    }

    fn clear(&mut self) {
        for id in self.dense.drain(..) {
            self.sparse[id.index() as usize] = ABSENT;
        }
    }
}

/// A live view over every entity matching a component filter.
///
/// Obtained from [`Store::archetype`](super::Store::archetype) or
/// [`Store::without`](super::Store::without) and read through
/// [`Store::view`](super::Store::view).
#[derive(Clone, Debug)]
pub struct Archetype {
    required: ComponentMask,
    excluded: ComponentMask,
    members: Membership,
}

impl Archetype {
    /// Creates an empty view for the given filter.
    pub(crate) fn new(required: ComponentMask, excluded: ComponentMask) -> Self {
        Self {
            required,
            excluded,
            members: Membership::default(),
        }
    }

    /// Components every member must hold.
    #[inline]
    #[must_use]
    pub const fn required(&self) -> ComponentMask {
        self.required
    }

    /// Components no member may hold.
    #[inline]
    #[must_use]
    pub const fn excluded(&self) -> ComponentMask {
        self.excluded
    }

    /// Components whose presence can change this view's membership.
    #[inline]
    #[must_use]
    pub fn interest(&self) -> ComponentMask {
        self.required | self.excluded
    }

    /// Checks whether an entity with this component mask belongs in the view.
    #[inline]
    #[must_use]
    pub const fn matches(&self, mask: ComponentMask) -> bool {
        mask.contains_all(self.required) && !mask.intersects(self.excluded)
    }

    /// Current members, in no particular order.
    ///
    /// The slice borrows the store; take a
    /// [`Store::snapshot`](super::Store::snapshot) to mutate while walking it.
    #[inline]
    #[must_use]
    pub fn entities(&self) -> &[EntityId] {
        &self.members.dense
    }

    /// Iterates over the current members.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.members.dense.iter().copied()
    }

    /// Checks whether `id` is a current member.
    #[inline]
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.members.contains(id)
    }

    /// Number of current members.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.dense.len()
    }

    /// Checks if the view has no members.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.dense.is_empty()
    }

    /// Brings `id`'s membership in line with its new mask.
    #[inline]
    pub(crate) fn sync(&mut self, id: EntityId, mask: ComponentMask) {
        if self.matches(mask) {
            self.members.insert(id);
        } else {
            self.members.remove(id);
        }
    }

    /// Inserts `id` without re-checking the filter.
    #[inline]
    pub(crate) fn insert(&mut self, id: EntityId) -> bool {
        self.members.insert(id)
    }

    #[inline]
    pub(crate) fn remove(&mut self, id: EntityId) -> bool {
        self.members.remove(id)
    }

    pub(crate) fn clear(&mut self) {
        self.members.clear();
    }
}

impl<'a> IntoIterator for &'a Archetype {
    type Item = &'a EntityId;
    type IntoIter = std::slice::Iter<'a, EntityId>;

    fn into_iter(self) -> Self::IntoIter {
        self.members.dense.iter()
    }
}
