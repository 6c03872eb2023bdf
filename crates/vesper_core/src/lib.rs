//! # VESPER Core Engine
//!
//! Entity/component storage for the VESPER engine:
//! - Generational entity handles with LIFO slot recycling
//! - One sparse-set store per component type
//! - Views iterating the entities that hold a set of components
//!
//! ## Architecture Rules
//!
//! 1. **No dangling handles** - stale entities are detected by generation
//! 2. **Packed storage** - component arrays never have holes
//! 3. **Local failures** - misuse is reported as a value or a warning, never
//!    by unwinding (id-space exhaustion is the one fatal case)
//!
//! ## Example
//!
//! ```rust
//! use vesper_core::Scene;
//!
//! struct Position { x: f32, y: f32 }
//! struct Velocity { x: f32, y: f32 }
//!
//! let mut scene = Scene::new();
//! let e = scene.create_entity();
//! scene.add_component(e, Position { x: 0.0, y: 0.0 }).unwrap();
//! scene.add_component(e, Velocity { x: 1.0, y: 2.0 }).unwrap();
//!
//! let moving: Vec<_> = scene.view::<(Position, Velocity)>().iter().collect();
//! for entity in moving {
//!     let v = scene.get_component::<Velocity>(entity).map(|v| (v.x, v.y)).unwrap();
//!     let p = scene.get_component_mut::<Position>(entity).unwrap();
//!     p.x += v.0;
//!     p.y += v.1;
//! }
//! assert_eq!(scene.get_component::<Position>(e).map(|p| p.x), Some(1.0));
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod ecs;
pub mod error;

pub use config::SceneConfig;
pub use ecs::{
    AnyStore, Component, ComponentStore, ComponentTypeId, Entity, EntityRegistry, Insertion,
    Scene, SceneStats, View, ViewComponents, ViewIter, ViewQuery, WarningHook,
};
pub use error::{EcsError, EcsResult, EcsWarning};
