//! # Component Types
//!
//! Components are plain data values attached to entities. Any
//! `Send + Sync + 'static` type qualifies; there is nothing to derive.
//!
//! Each distinct component type gets a small integer [`ComponentTypeId`]
//! the first time it is seen by any scene. The table is process-wide,
//! starts empty, only ever grows, and is never reset, so an id stays
//! stable for the life of the process.

use std::any::{type_name, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

use parking_lot::RwLock;

/// Marker trait for ECS components.
///
/// Implemented for every `Send + Sync + 'static` type.
///
/// # Example
///
/// ```rust
/// use vesper_core::Scene;
///
/// struct Health(u32);
///
/// let mut scene = Scene::new();
/// let e = scene.create_entity();
/// scene.add_component(e, Health(100)).unwrap();
/// assert_eq!(scene.get_component::<Health>(e).map(|h| h.0), Some(100));
/// ```
pub trait Component: Send + Sync + 'static {}

impl<T: Send + Sync + 'static> Component for T {}

/// Dense, process-wide identifier of a component type.
///
/// Used as the index of the type's store inside a scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct ComponentTypeId(u32);

impl ComponentTypeId {
    /// Returns the id for `T`, assigning the next free one on first use.
    #[must_use]
    pub fn of<T: Component>() -> Self {
        let key = TypeId::of::<T>();
        let table = type_table();

        if let Some(&id) = table.read().ids.get(&key) {
            return id;
        }

        let mut table = table.write();
        // Another thread may have registered it between the two locks.
        if let Some(&id) = table.ids.get(&key) {
            return id;
        }
        let id = Self(table.names.len() as u32);
        table.ids.insert(key, id);
        table.names.push(type_name::<T>());
        tracing::debug!("registered component type {} as {}", type_name::<T>(), id.0);
        id
    }

    /// Returns the id already assigned to `T`, if any.
    #[must_use]
    pub fn get<T: Component>() -> Option<Self> {
        type_table().read().ids.get(&TypeId::of::<T>()).copied()
    }

    /// Returns the raw index.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Returns the Rust type name registered under this id.
    #[must_use]
    pub fn name(self) -> Option<&'static str> {
        type_table().read().names.get(self.index()).copied()
    }
}

impl fmt::Display for ComponentTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "component#{}", self.0)
    }
}

/// Append-only table of registered component types.
#[derive(Default)]
struct TypeTable {
    ids: HashMap<TypeId, ComponentTypeId>,
    /// Indexed by `ComponentTypeId`.
    names: Vec<&'static str>,
}

fn type_table() -> &'static RwLock<TypeTable> {
    static TABLE: OnceLock<RwLock<TypeTable>> = OnceLock::new();
    TABLE.get_or_init(|| RwLock::new(TypeTable::default()))
}

/// Number of component types registered so far in this process.
#[must_use]
pub fn registered_component_count() -> usize {
    type_table().read().names.len()
}
