//! # Component Vocabulary
//!
//! Components are named by strings at the API boundary and by a dense
//! [`ComponentId`] internally. Each store interns names into at most
//! [`MAX_COMPONENTS`] ids so that an entity's component set fits in a single
//! `u64` bitmask and archetype matching is two bitwise operations.

use std::collections::HashMap;
use std::fmt;
use std::ops::{BitAnd, BitOr, Not};

use crate::error::{StoreError, StoreResult};

/// Maximum number of distinct component names a single store can register.
pub const MAX_COMPONENTS: usize = 64;

/// Dense identifier of a registered component name (0-63).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(u8);

impl ComponentId {
    /// Creates an ID from its bit index.
    #[inline]
    #[must_use]
    pub(crate) const fn from_index(index: u8) -> Self {
        debug_assert!((index as usize) < MAX_COMPONENTS);
        Self(index)
    }

    /// Returns the bit index of this component.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    const fn bit(self) -> u64 {
        1u64 << self.0
    }
}

/// Set of components, one bit per [`ComponentId`].
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct ComponentMask(u64);

impl ComponentMask {
    /// The mask holding no components.
    pub const EMPTY: Self = Self(0);

    /// Returns the raw bits.
    #[inline]
    #[must_use]
    pub const fn bits(self) -> u64 {
        self.0
    }

    /// Adds a component to the mask.
    #[inline]
    pub fn insert(&mut self, id: ComponentId) {
        self.0 |= id.bit();
    }

    /// Removes a component from the mask.
    #[inline]
    pub fn remove(&mut self, id: ComponentId) {
        self.0 &= !id.bit();
    }

    /// Checks whether the mask holds `id`.
    #[inline]
    #[must_use]
    pub const fn contains(self, id: ComponentId) -> bool {
        self.0 & id.bit() != 0
    }

    /// Checks whether every component of `other` is also in `self`.
    #[inline]
    #[must_use]
    pub const fn contains_all(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Checks whether the two masks share at least one component.
    #[inline]
    #[must_use]
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    /// Checks whether the mask holds no components.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns the number of components in the mask.
    #[inline]
    #[must_use]
    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Iterates over the component IDs in ascending order.
    #[inline]
    #[must_use]
    pub const fn iter(self) -> MaskIter {
        MaskIter { remaining: self.0 }
    }
}

impl BitOr for ComponentMask {
    type Output = Self;

    #[inline]
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitAnd for ComponentMask {
    type Output = Self;

    #[inline]
    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl Not for ComponentMask {
    type Output = Self;

    #[inline]
    fn not(self) -> Self {
        Self(!self.0)
    }
}

impl FromIterator<ComponentId> for ComponentMask {
    fn from_iter<I: IntoIterator<Item = ComponentId>>(iter: I) -> Self {
        let mut mask = Self::EMPTY;
        for id in iter {
            mask.insert(id);
        }
        mask
    }
}

impl IntoIterator for ComponentMask {
    type Item = ComponentId;
    type IntoIter = MaskIter;

    fn into_iter(self) -> MaskIter {
        self.iter()
    }
}

impl fmt::Debug for ComponentMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ComponentMask({:#b})", self.0)
    }
}

/// Iterator over the component IDs of a mask.
///
/// Uses `trailing_zeros` to skip unset bits.
#[derive(Clone, Debug)]
pub struct MaskIter {
    remaining: u64,
}

impl Iterator for MaskIter {
    type Item = ComponentId;

    #[inline]
    fn next(&mut self) -> Option<ComponentId> {
        if self.remaining == 0 {
            return None;
        }
        #[allow(clippy::cast_possible_truncation)]
        let bit = self.remaining.trailing_zeros() as u8;
        self.remaining &= self.remaining - 1;
        Some(ComponentId(bit))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.remaining.count_ones() as usize;
        (n, Some(n))
    }
}

impl ExactSizeIterator for MaskIter {}

/// Interns component names into [`ComponentId`]s.
#[derive(Debug, Default)]
pub struct ComponentRegistry {
    /// Names indexed by component ID.
    names: Vec<String>,
    /// Reverse lookup.
    lookup: HashMap<String, ComponentId>,
}

impl ComponentRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the ID of `name`, registering it if it is new.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ComponentLimit`] if `name` is new and
    /// [`MAX_COMPONENTS`] names are already registered.
    pub fn intern(&mut self, name: &str) -> StoreResult<ComponentId> {
        if let Some(&id) = self.lookup.get(name) {
            return Ok(id);
        }

        if self.names.len() >= MAX_COMPONENTS {
            tracing::warn!(name, limit = MAX_COMPONENTS, "component limit reached");
            return Err(StoreError::ComponentLimit {
                name: name.to_owned(),
                limit: MAX_COMPONENTS,
            });
        }

        #[allow(clippy::cast_possible_truncation)]
        let id = ComponentId::from_index(self.names.len() as u8);
        self.names.push(name.to_owned());
        self.lookup.insert(name.to_owned(), id);
        tracing::debug!(name, id = id.index(), "registered component");
        Ok(id)
    }

    /// Checks that every name in `names` can be interned.
    ///
    /// Nothing is registered; a batch either fits entirely or is rejected
    /// before any name is added.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ComponentLimit`] naming the first new name that
    /// would not fit.
    pub fn check_capacity<'a, I>(&self, names: I) -> StoreResult<()>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut fresh: Vec<&str> = Vec::new();
        for name in names {
            if self.lookup.contains_key(name) || fresh.contains(&name) {
                continue;
            }
            if self.names.len() + fresh.len() >= MAX_COMPONENTS {
                tracing::warn!(name, limit = MAX_COMPONENTS, "component limit reached");
                return Err(StoreError::ComponentLimit {
                    name: name.to_owned(),
                    limit: MAX_COMPONENTS,
                });
            }
            fresh.push(name);
        }
        Ok(())
    }

    /// Interns every name and returns the combined mask.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ComponentLimit`] if the names do not all fit.
    /// No name is registered in that case.
    pub fn intern_mask(&mut self, names: &[&str]) -> StoreResult<ComponentMask> {
        self.check_capacity(names.iter().copied())?;
        let mut mask = ComponentMask::EMPTY;
        for name in names {
            mask.insert(self.intern(name)?);
        }
        Ok(mask)
    }

    /// Looks up a registered name without registering it.
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<ComponentId> {
        self.lookup.get(name).copied()
    }

    /// Returns the name of a registered component.
    #[inline]
    #[must_use]
    pub fn name(&self, id: ComponentId) -> Option<&str> {
        self.names.get(id.index()).map(String::as_str)
    }

    /// Returns the names of every component in `mask`, in ID order.
    #[must_use]
    pub fn names(&self, mask: ComponentMask) -> Vec<&str> {
        mask.iter().filter_map(|id| self.name(id)).collect()
    }

    /// Returns the number of registered components.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Checks if no component has been registered.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
