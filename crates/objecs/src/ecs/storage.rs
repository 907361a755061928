//! # Component Storage
//!
//! Dense per-component columns indexed by entity slot.
//!
//! The storage uses a dense array strategy:
//! - One column per registered component name
//! - Access is O(1) via entity index
//! - Rows are reserved up front from the store's configured capacity and
//!   grow on demand past it

/// Storage for the values of a single component.
///
/// Values are opaque to the store; a slot holds `Some` exactly while the
/// owning entity's mask has the component bit set.
///
/// # Example
///
/// ```rust,ignore
/// let mut storage: ComponentStorage<f32> = ComponentStorage::with_capacity(1024);
/// storage.set(0, 1.5);
/// ```
#[derive(Debug)]
pub(crate) struct ComponentStorage<V> {
    /// The dense array of component slots.
    data: Vec<Option<V>>,
}

impl<V> ComponentStorage<V> {
    /// Creates component storage with `capacity` rows reserved.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
        }
    }

    /// Returns the number of rows currently backed by this column.
    #[cfg(test)]
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Checks if no row has ever been written.
    #[cfg(test)]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Gets a component by entity index.
    ///
    /// # Returns
    ///
    /// Reference to the value, or None if the slot is empty or out of bounds.
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&V> {
        self.data.get(index).and_then(Option::as_ref)
    }

    /// Gets a mutable component by entity index.
    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut V> {
        self.data.get_mut(index).and_then(Option::as_mut)
    }

    /// Sets a component at the specified index, growing the column if needed.
    ///
    /// # Returns
    ///
    /// The value previously stored in the slot, if any.
    #[inline]
    pub fn set(&mut self, index: usize, value: V) -> Option<V> {
        if index >= self.data.len() {
            self.data.resize_with(index + 1, || None);
        }
        self.data[index].replace(value)
    }

    /// Takes the value out of a slot, leaving it empty.
    #[inline]
    pub fn take(&mut self, index: usize) -> Option<V> {
        self.data.get_mut(index).and_then(Option::take)
    }

    /// Empties every slot, keeping the allocated rows.
    pub fn clear(&mut self) {
        for slot in &mut self.data {
            *slot = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_get_set() {
        let mut storage: ComponentStorage<i32> = ComponentStorage::with_capacity(4);
        assert!(storage.is_empty());

        assert_eq!(storage.set(50, 7), None);
        assert_eq!(storage.len(), 51);
        assert_eq!(storage.get(50), Some(&7));
        assert_eq!(storage.get(49), None);

        assert_eq!(storage.set(50, 8), Some(7));
        *storage.get_mut(50).unwrap() += 1;
        assert_eq!(storage.get(50), Some(&9));
    }

    #[test]
    fn test_storage_bounds() {
        let mut storage: ComponentStorage<i32> = ComponentStorage::with_capacity(0);
        assert!(storage.get(100).is_none());
        assert!(storage.get_mut(100).is_none());
        assert!(storage.take(100).is_none());
    }

    #[test]
    fn test_storage_take_and_clear() {
        let mut storage = ComponentStorage::with_capacity(2);
        storage.set(0, "a");
        storage.set(1, "b");

        assert_eq!(storage.take(0), Some("a"));
        assert_eq!(storage.take(0), None);

        storage.clear();
        assert_eq!(storage.get(1), None);
        assert_eq!(storage.len(), 2);
    }
}
