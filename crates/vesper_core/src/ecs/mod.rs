//! # Entity Component System
//!
//! Sparse-set ECS core.
//!
//! ## Design Philosophy
//!
//! - Entity handles are an index plus a generation counter
//! - Each component type lives in its own packed sparse set
//! - Removal is swap-remove: O(1), order not preserved
//! - Views intersect stores starting from the smallest one

mod component;
mod entity;
mod registry;
mod scene;
mod storage;
mod view;

pub use component::{registered_component_count, Component, ComponentTypeId};
pub use entity::Entity;
pub use registry::EntityRegistry;
pub use scene::{Scene, SceneStats, WarningHook};
pub use storage::{AnyStore, ComponentStore, Insertion};
pub use view::{View, ViewComponents, ViewIter, ViewQuery};
