//! # OBJECS
//!
//! An in-process entity-component index:
//! - Entities are records of named, optional components with opaque values
//! - Archetypes are live views of every entity holding a required set of
//!   components and none of an excluded set
//! - Views are maintained incrementally, so per-tick iteration never rescans
//!   the population
//!
//! ## Architecture Rules
//!
//! 1. **The store owns everything** - entities, values and views live in the
//!    [`Store`]; callers hold [`EntityId`] and [`ViewId`] handles
//! 2. **Bitmask matching** - an entity's component set is a single `u64`
//! 3. **Snapshot before mutating** - borrowing iteration locks the store;
//!    use [`Store::snapshot`] to mutate while walking a view
//!
//! ## Example
//!
//! ```rust
//! use objecs::Store;
//!
//! let mut store: Store<i32> = Store::new();
//! let with_a = store.archetype(&["a"], &[]).unwrap();
//! let with_ab = store.archetype(&["a", "b"], &[]).unwrap();
//!
//! let e = store.create_with([("a", 1)]).unwrap();
//! store.set_component(e, "b", 2).unwrap();
//! assert_eq!(store.view(with_ab).unwrap().len(), 1);
//!
//! store.remove_components(e, &["a"]).unwrap();
//! assert!(store.view(with_a).unwrap().is_empty());
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod ecs;
pub mod error;

pub use config::StoreConfig;
pub use ecs::{
    Archetype, ComponentId, ComponentMask, ComponentRegistry, EntityId, MaskIter, Store, ViewId,
    MAX_COMPONENTS,
};
pub use error::{StoreError, StoreResult};
