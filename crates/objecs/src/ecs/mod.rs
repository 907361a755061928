//! # Entity Component Index
//!
//! Entities with dynamic component sets, and archetype views kept in sync
//! with them incrementally.
//!
//! ## Design Philosophy
//!
//! - Entity IDs are slot indices with generation counters
//! - Component sets are `u64` bitmasks; matching is two bitwise operations
//! - Component values live in dense per-component columns
//! - The store owns every view and updates them on each mutation

pub mod archetype;
mod component;
mod entity;
mod storage;
mod store;

pub use archetype::{Archetype, ViewId};
pub use component::{ComponentId, ComponentMask, ComponentRegistry, MaskIter, MAX_COMPONENTS};
pub use entity::EntityId;
pub use store::Store;
