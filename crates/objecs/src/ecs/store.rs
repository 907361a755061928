//! # Entity Store
//!
//! The canonical owner of every entity and the registry of every view.
//!
//! Each mutation walks the registered views and re-evaluates the changed
//! entity in place. There is no component-to-view reverse index; a view whose
//! required and excluded masks do not touch the changed components is skipped
//! with a single AND.

use super::archetype::{Archetype, ViewId};
use super::component::{ComponentId, ComponentMask, ComponentRegistry};
use super::entity::{Entity, EntityId};
use super::storage::ComponentStorage;
use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};

/// One slot of the view registry.
#[derive(Debug)]
struct ViewSlot {
    generation: u32,
    archetype: Option<Archetype>,
}

/// Resolves a view handle against the registry.
fn lookup_view(views: &[ViewSlot], view: ViewId) -> Option<&Archetype> {
    views
        .get(view.index() as usize)
        .filter(|slot| slot.generation == view.generation())
        .and_then(|slot| slot.archetype.as_ref())
}

/// The entity store: all entities, their component values and every live
/// view over them.
///
/// `V` is the component value type. The store never inspects values; a
/// component is "held" exactly while a value is stored under its name.
///
/// # Iteration
///
/// [`Store::entities`] and [`Archetype::entities`] borrow the store, so the
/// borrow checker rules out mutation while they are alive. A tick that needs
/// to mutate while walking a view iterates a [`Store::snapshot`] instead.
///
/// # Example
///
/// ```
/// use objecs::Store;
///
/// let mut store: Store<f32> = Store::new();
/// let movers = store.archetype(&["position", "velocity"], &[]).unwrap();
///
/// let e = store.create_with([("position", 0.0), ("velocity", 2.0)]).unwrap();
/// assert!(store.view(movers).unwrap().contains(e));
///
/// for id in store.snapshot(movers).unwrap() {
///     let v = *store.get(id, "velocity").unwrap();
///     *store.get_mut(id, "position").unwrap() += v;
/// }
/// assert_eq!(store.get(e, "position"), Some(&2.0));
/// ```
#[derive(Debug)]
pub struct Store<V> {
    /// Entity slots, live and dead.
    entities: Vec<Entity>,
    /// Free list of dead slot indices for reuse.
    free_indices: Vec<u32>,
    /// Number of currently alive entities.
    alive_count: usize,

    /// Component name interning.
    registry: ComponentRegistry,
    /// One value column per registered component, indexed by `ComponentId`.
    columns: Vec<ComponentStorage<V>>,
    /// Rows reserved for each new column.
    column_capacity: usize,

    /// Registered views.
    views: Vec<ViewSlot>,
    /// Free list of disposed view slots.
    free_views: Vec<u32>,
}

impl<V> Default for Store<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Store<V> {
    /// Creates a store with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(&StoreConfig::default())
    }

    /// Creates a store with capacities reserved from `config`.
    #[must_use]
    pub fn with_config(config: &StoreConfig) -> Self {
        tracing::debug!(
            initial_capacity = config.initial_capacity,
            view_capacity = config.view_capacity,
            "creating store"
        );
        Self {
            entities: Vec::with_capacity(config.initial_capacity),
            free_indices: Vec::new(),
            alive_count: 0,
            registry: ComponentRegistry::new(),
            columns: Vec::new(),
            column_capacity: config.initial_capacity,
            views: Vec::with_capacity(config.view_capacity),
            free_views: Vec::new(),
        }
    }

    // =========================================================================
    // Entity lifecycle
    // =========================================================================

    /// Creates an entity holding no components.
    ///
    /// The entity joins every view it already matches, i.e. views with no
    /// required components.
    pub fn create(&mut self) -> EntityId {
        let id = self.allocate();
        self.refresh_all(id, ComponentMask::EMPTY);
        tracing::trace!(entity = ?id, "created entity");
        id
    }

    /// Creates an entity pre-populated with `(name, value)` pairs.
    ///
    /// Later pairs overwrite earlier pairs with the same name.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ComponentLimit`] if the names do not all fit in
    /// the vocabulary. The check runs before anything is registered or
    /// allocated, so on error the store is unchanged.
    pub fn create_with<'a, I>(&mut self, components: I) -> StoreResult<EntityId>
    where
        I: IntoIterator<Item = (&'a str, V)>,
    {
        let components: Vec<(&'a str, V)> = components.into_iter().collect();
        self.registry
            .check_capacity(components.iter().map(|&(name, _)| name))?;

        let resolved = components
            .into_iter()
            .map(|(name, value)| self.register_component(name).map(|c| (c, value)))
            .collect::<StoreResult<Vec<_>>>()?;

        let id = self.allocate();
        let index = id.index() as usize;
        let mut mask = ComponentMask::EMPTY;
        for (component, value) in resolved {
            self.columns[component.index()].set(index, value);
            mask.insert(component);
        }
        self.entities[index].mask = mask;

        self.refresh_all(id, mask);
        tracing::trace!(entity = ?id, components = mask.len(), "created entity");
        Ok(id)
    }

    /// Deletes an entity and drops it from every view.
    ///
    /// # Returns
    ///
    /// `true` if the entity was alive, `false` if it was already deleted or
    /// the ID was never issued by this store.
    pub fn delete(&mut self, id: EntityId) -> bool {
        let Some(mask) = self.mask(id) else {
            return false;
        };

        for view in self.views.iter_mut().filter_map(|slot| slot.archetype.as_mut()) {
            view.remove(id);
        }

        let index = id.index() as usize;
        for component in mask {
            self.columns[component.index()].take(index);
        }
        self.entities[index].kill();
        self.free_indices.push(id.index());
        self.alive_count -= 1;

        tracing::trace!(entity = ?id, "deleted entity");
        true
    }

    /// Deletes every entity and empties every view.
    ///
    /// Views stay registered. Every outstanding [`EntityId`] becomes stale.
    pub fn clear(&mut self) {
        for slot in &mut self.entities {
            slot.kill();
        }
        self.free_indices = (0..self.entities.len() as u32).rev().collect();
        self.alive_count = 0;

        for column in &mut self.columns {
            column.clear();
        }
        for view in self.views.iter_mut().filter_map(|slot| slot.archetype.as_mut()) {
            view.clear();
        }
        tracing::debug!(slots = self.entities.len(), "cleared store");
    }

    // =========================================================================
    // Component mutation
    // =========================================================================

    /// Sets a component on an entity, registering the name if needed.
    ///
    /// # Returns
    ///
    /// The value previously stored under `name`, if any.
    ///
    /// # Errors
    ///
    /// - [`StoreError::UnknownEntity`] if `id` is not alive.
    /// - [`StoreError::ComponentLimit`] if `name` cannot be registered.
    pub fn set_component(&mut self, id: EntityId, name: &str, value: V) -> StoreResult<Option<V>> {
        if !self.contains(id) {
            return Err(StoreError::UnknownEntity(id));
        }
        let component = self.register_component(name)?;
        self.set(id, component, value)
    }

    /// Sets a component by ID.
    ///
    /// # Errors
    ///
    /// - [`StoreError::UnknownEntity`] if `id` is not alive.
    /// - [`StoreError::UnknownComponent`] if `component` was not issued by
    ///   this store.
    pub fn set(&mut self, id: EntityId, component: ComponentId, value: V) -> StoreResult<Option<V>> {
        if !self.contains(id) {
            return Err(StoreError::UnknownEntity(id));
        }
        let index = id.index() as usize;
        let column = self
            .columns
            .get_mut(component.index())
            .ok_or(StoreError::UnknownComponent(component))?;
        let previous = column.set(index, value);

        let slot = &mut self.entities[index];
        if !slot.mask.contains(component) {
            slot.mask.insert(component);
            let mask = slot.mask;
            self.refresh(id, mask, std::iter::once(component).collect());
        }

        tracing::trace!(entity = ?id, component = component.index(), "set component");
        Ok(previous)
    }

    /// Removes the named components from an entity.
    ///
    /// Names the entity does not hold, including names never registered, are
    /// skipped. Removing components that are already gone is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UnknownEntity`] if `id` is not alive.
    pub fn remove_components(&mut self, id: EntityId, names: &[&str]) -> StoreResult<()> {
        if !self.contains(id) {
            return Err(StoreError::UnknownEntity(id));
        }
        let components: Vec<ComponentId> = names
            .iter()
            .filter_map(|name| self.registry.get(name))
            .collect();
        self.remove(id, &components)
    }

    /// Removes components by ID.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UnknownEntity`] if `id` is not alive.
    pub fn remove(&mut self, id: EntityId, components: &[ComponentId]) -> StoreResult<()> {
        let Some(mask) = self.mask(id) else {
            return Err(StoreError::UnknownEntity(id));
        };

        let requested: ComponentMask = components.iter().copied().collect();
        let removed = mask & requested;
        if removed.is_empty() {
            return Ok(());
        }

        let index = id.index() as usize;
        for component in removed {
            self.columns[component.index()].take(index);
        }
        let mask = mask & !removed;
        self.entities[index].mask = mask;
        self.refresh(id, mask, removed);

        tracing::trace!(entity = ?id, removed = removed.len(), "removed components");
        Ok(())
    }

    // =========================================================================
    // Entity queries
    // =========================================================================

    /// Checks if an entity is alive.
    #[inline]
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.entities
            .get(id.index() as usize)
            .is_some_and(|slot| slot.is(id))
    }

    /// Returns the number of currently alive entities.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.alive_count
    }

    /// Checks if the store holds no entities.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.alive_count == 0
    }

    /// Iterates over all alive entities.
    pub fn entities(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.entities.iter().filter(|e| e.alive).map(|e| e.id)
    }

    /// Collects the alive entities so the store can be mutated while walking
    /// them.
    #[must_use]
    pub fn snapshot_entities(&self) -> Vec<EntityId> {
        self.entities().collect()
    }

    /// Returns the component mask of an alive entity.
    #[inline]
    #[must_use]
    pub fn mask(&self, id: EntityId) -> Option<ComponentMask> {
        self.entities
            .get(id.index() as usize)
            .filter(|slot| slot.is(id))
            .map(|slot| slot.mask)
    }

    /// Checks whether an alive entity holds the named component.
    #[must_use]
    pub fn has_component(&self, id: EntityId, name: &str) -> bool {
        match (self.mask(id), self.registry.get(name)) {
            (Some(mask), Some(component)) => mask.contains(component),
            _ => false,
        }
    }

    /// Gets a component value by name.
    #[must_use]
    pub fn get(&self, id: EntityId, name: &str) -> Option<&V> {
        let component = self.registry.get(name)?;
        self.get_by_id(id, component)
    }

    /// Gets a mutable component value by name.
    ///
    /// Mutating a value in place never changes view membership.
    pub fn get_mut(&mut self, id: EntityId, name: &str) -> Option<&mut V> {
        let component = self.registry.get(name)?;
        self.get_by_id_mut(id, component)
    }

    /// Gets a component value by ID.
    #[inline]
    #[must_use]
    pub fn get_by_id(&self, id: EntityId, component: ComponentId) -> Option<&V> {
        if !self.contains(id) {
            return None;
        }
        self.columns.get(component.index())?.get(id.index() as usize)
    }

    /// Gets a mutable component value by ID.
    #[inline]
    pub fn get_by_id_mut(&mut self, id: EntityId, component: ComponentId) -> Option<&mut V> {
        if !self.contains(id) {
            return None;
        }
        self.columns
            .get_mut(component.index())?
            .get_mut(id.index() as usize)
    }

    /// Iterates over an entity's components as `(name, value)` pairs.
    ///
    /// Empty for dead or unknown entities.
    pub fn components(&self, id: EntityId) -> impl Iterator<Item = (&str, &V)> + '_ {
        let index = id.index() as usize;
        self.mask(id)
            .unwrap_or_default()
            .into_iter()
            .filter_map(move |component| {
                let name = self.registry.name(component)?;
                let value = self.columns.get(component.index())?.get(index)?;
                Some((name, value))
            })
    }

    // =========================================================================
    // Component vocabulary
    // =========================================================================

    /// Returns the ID of `name`, registering it if needed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ComponentLimit`] once 64 names are registered.
    pub fn register_component(&mut self, name: &str) -> StoreResult<ComponentId> {
        let component = self.registry.intern(name)?;
        self.grow_columns();
        Ok(component)
    }

    /// Looks up a registered component name.
    #[inline]
    #[must_use]
    pub fn component_id(&self, name: &str) -> Option<ComponentId> {
        self.registry.get(name)
    }

    /// The store's component registry.
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    // =========================================================================
    // Views
    // =========================================================================

    /// Registers a view over every entity holding all of `required` and none
    /// of `excluded`.
    ///
    /// The view is seeded by scanning the current population, then kept up to
    /// date by every later mutation. Unregistered names are registered, so a
    /// view can be declared before any entity holds its components.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ComponentLimit`] if the names do not all fit in
    /// the vocabulary. No name is registered in that case.
    pub fn archetype(&mut self, required: &[&str], excluded: &[&str]) -> StoreResult<ViewId> {
        self.registry
            .check_capacity(required.iter().chain(excluded).copied())?;
        let required = self.intern_mask(required)?;
        let excluded = self.intern_mask(excluded)?;

        let mut view = Archetype::new(required, excluded);
        for slot in self.entities.iter().filter(|e| e.alive) {
            if view.matches(slot.mask) {
                view.insert(slot.id);
            }
        }
        Ok(self.register_view(view))
    }

    /// Derives a view from `parent`'s current members, dropping every entity
    /// that holds any of `extra`.
    ///
    /// The new view requires what `parent` requires and excludes what
    /// `parent` excludes plus `extra`. It is seeded from the parent's
    /// membership rather than the whole population, and is tracked
    /// independently of the parent from then on.
    ///
    /// # Errors
    ///
    /// - [`StoreError::UnknownView`] if `parent` is not registered.
    /// - [`StoreError::ComponentLimit`] if the names do not all fit in the
    ///   vocabulary. No name is registered in that case.
    pub fn without(&mut self, parent: ViewId, extra: &[&str]) -> StoreResult<ViewId> {
        if self.view(parent).is_none() {
            return Err(StoreError::UnknownView(parent));
        }
        let extra = self.intern_mask(extra)?;

        let source = self.view(parent).ok_or(StoreError::UnknownView(parent))?;
        let mut view = Archetype::new(source.required(), source.excluded() | extra);
        for &id in source.entities() {
            let index = id.index() as usize;
            if !self.entities[index].mask.intersects(extra) {
                view.insert(id);
            }
        }
        Ok(self.register_view(view))
    }

    /// Unregisters a view. Its handle stops resolving and it no longer costs
    /// anything on mutation.
    ///
    /// # Returns
    ///
    /// `true` if the view was registered.
    pub fn dispose(&mut self, view: ViewId) -> bool {
        let Some(slot) = self.view_slot_mut(view) else {
            return false;
        };
        slot.archetype = None;
        self.free_views.push(view.index());
        tracing::debug!(view = ?view, "disposed view");
        true
    }

    /// Returns a registered view.
    #[must_use]
    pub fn view(&self, view: ViewId) -> Option<&Archetype> {
        lookup_view(&self.views, view)
    }

    /// Collects a view's members so the store can be mutated while walking
    /// them.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UnknownView`] if `view` is not registered.
    pub fn snapshot(&self, view: ViewId) -> StoreResult<Vec<EntityId>> {
        self.view(view)
            .map(|v| v.entities().to_vec())
            .ok_or(StoreError::UnknownView(view))
    }

    /// Runs `f` over one component of every member of a view, in place.
    ///
    /// This is the per-tick hot path: no snapshot is taken, and since values
    /// change but masks do not, membership cannot shift underneath the walk.
    /// Members that do not hold `component` are skipped.
    ///
    /// # Errors
    ///
    /// - [`StoreError::UnknownView`] if `view` is not registered.
    /// - [`StoreError::UnknownComponent`] if `component` was not issued by
    ///   this store.
    pub fn for_each_mut<F>(&mut self, view: ViewId, component: ComponentId, mut f: F) -> StoreResult<()>
    where
        F: FnMut(EntityId, &mut V),
    {
        let archetype = lookup_view(&self.views, view).ok_or(StoreError::UnknownView(view))?;
        let column = self
            .columns
            .get_mut(component.index())
            .ok_or(StoreError::UnknownComponent(component))?;

        for &id in archetype.entities() {
            if let Some(value) = column.get_mut(id.index() as usize) {
                f(id, value);
            }
        }
        Ok(())
    }

    /// Checks whether an alive entity matches a registered view's filter.
    #[must_use]
    pub fn matches(&self, view: ViewId, id: EntityId) -> bool {
        match (self.view(view), self.mask(id)) {
            (Some(view), Some(mask)) => view.matches(mask),
            _ => false,
        }
    }

    /// Number of registered views.
    #[must_use]
    pub fn view_count(&self) -> usize {
        self.views.len() - self.free_views.len()
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Takes a free slot (or grows the table) and marks it alive.
    fn allocate(&mut self) -> EntityId {
        let index = self.free_indices.pop().unwrap_or_else(|| {
            debug_assert!(self.entities.len() < u32::MAX as usize, "entity index overflow");
            self.entities.push(Entity::dead());
            (self.entities.len() - 1) as u32
        });

        let slot = &mut self.entities[index as usize];
        let id = slot.next_id(index);
        *slot = Entity::new(id);
        self.alive_count += 1;
        id
    }

    fn intern_mask(&mut self, names: &[&str]) -> StoreResult<ComponentMask> {
        let mask = self.registry.intern_mask(names)?;
        self.grow_columns();
        Ok(mask)
    }

    /// Adds a column for every component registered since the last call.
    fn grow_columns(&mut self) {
        while self.columns.len() < self.registry.len() {
            self.columns
                .push(ComponentStorage::with_capacity(self.column_capacity));
        }
    }

    /// Re-evaluates a new entity against every view.
    fn refresh_all(&mut self, id: EntityId, mask: ComponentMask) {
        for view in self.views.iter_mut().filter_map(|slot| slot.archetype.as_mut()) {
            view.sync(id, mask);
        }
    }

    /// Re-evaluates an entity against the views that care about `changed`.
    fn refresh(&mut self, id: EntityId, mask: ComponentMask, changed: ComponentMask) {
        for view in self.views.iter_mut().filter_map(|slot| slot.archetype.as_mut()) {
            if view.interest().intersects(changed) {
                view.sync(id, mask);
            }
        }
    }

    fn register_view(&mut self, archetype: Archetype) -> ViewId {
        tracing::debug!(
            required = ?self.registry.names(archetype.required()),
            excluded = ?self.registry.names(archetype.excluded()),
            seeded = archetype.len(),
            "registered view"
        );

        if let Some(index) = self.free_views.pop() {
            let slot = &mut self.views[index as usize];
            slot.generation = slot.generation.wrapping_add(1);
            slot.archetype = Some(archetype);
            return ViewId::new(index, slot.generation);
        }

        let index = self.views.len() as u32;
        self.views.push(ViewSlot {
            generation: 0,
            archetype: Some(archetype),
        });
        ViewId::new(index, 0)
    }

    fn view_slot_mut(&mut self, view: ViewId) -> Option<&mut ViewSlot> {
        self.views
            .get_mut(view.index() as usize)
            .filter(|slot| slot.generation == view.generation() && slot.archetype.is_some())
    }
}
