//! # Component Storage
//!
//! Sparse-set storage for a single component type.
//!
//! ```text
//! sparse:    [ 2, -, 0, -, 1 ]     entity index -> dense slot
//! entities:  [ e2, e4, e0 ]        owner of each dense slot
//! dense:     [ c2, c4, c0 ]        packed component values
//! ```
//!
//! - Insert appends to the dense arrays: O(1) amortized
//! - Remove moves the last element into the hole: O(1)
//! - Lookup goes through `sparse`: O(1)
//! - Iteration walks contiguous memory
//!
//! Removal reorders the dense arrays. Nothing may assume that a dense slot
//! still holds the same entity after a removal; look entities up by handle.

use std::any::{type_name, Any};

use bytemuck::Pod;

use super::component::Component;
use super::entity::Entity;

/// Sentinel marking an empty `sparse` slot.
const EMPTY: u32 = u32::MAX;

/// Outcome of [`ComponentStore::insert`].
#[derive(Debug)]
pub enum Insertion<'a, T> {
    /// The value was stored.
    Added(&'a mut T),
    /// The entity already had a component of this type. The new value was
    /// dropped and the existing one is returned untouched.
    Existing(&'a mut T),
}

impl<'a, T> Insertion<'a, T> {
    /// Returns the stored component, whichever branch was taken.
    #[inline]
    pub fn into_inner(self) -> &'a mut T {
        match self {
            Self::Added(value) | Self::Existing(value) => value,
        }
    }

    /// Returns `true` if the insert hit an existing component.
    #[inline]
    #[must_use]
    pub const fn is_duplicate(&self) -> bool {
        matches!(self, Self::Existing(_))
    }
}

/// Sparse-set storage for a single component type.
///
/// # Type Parameters
///
/// * `T` - The component type to store
///
/// # Example
///
/// ```rust
/// use vesper_core::{ComponentStore, Entity};
///
/// let mut store: ComponentStore<f32> = ComponentStore::new();
/// let e = Entity::new(3, 0);
/// store.insert(e, 1.5);
/// assert_eq!(store.get(e), Some(&1.5));
/// assert_eq!(store.remove(e), Some(1.5));
/// assert!(store.is_empty());
/// ```
#[derive(Clone, Debug)]
pub struct ComponentStore<T> {
    /// Packed component values.
    dense: Vec<T>,
    /// Owner of each dense slot, parallel to `dense`.
    entities: Vec<Entity>,
    /// Entity index -> dense slot, or `EMPTY`.
    sparse: Vec<u32>,
}

impl<T> Default for ComponentStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ComponentStore<T> {
    /// Creates an empty store.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            dense: Vec::new(),
            entities: Vec::new(),
            sparse: Vec::new(),
        }
    }

    /// Creates an empty store with room for `capacity` components before
    /// the dense arrays reallocate.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            dense: Vec::with_capacity(capacity),
            entities: Vec::with_capacity(capacity),
            sparse: Vec::new(),
        }
    }

    /// Looks up the dense slot recorded for `entity`'s index, without
    /// checking the generation.
    #[inline]
    fn slot_of(&self, entity: Entity) -> Option<usize> {
        match self.sparse.get(entity.index() as usize) {
            Some(&slot) if slot != EMPTY => Some(slot as usize),
            _ => None,
        }
    }

    /// Returns the dense slot holding `entity`'s component.
    ///
    /// The slot is only meaningful until the next removal.
    #[inline]
    #[must_use]
    pub fn dense_index(&self, entity: Entity) -> Option<usize> {
        self.slot_of(entity)
            .filter(|&slot| self.entities[slot] == entity)
    }

    /// Checks if `entity` has a component in this store.
    #[inline]
    #[must_use]
    pub fn contains(&self, entity: Entity) -> bool {
        self.dense_index(entity).is_some()
    }

    /// Stores `value` for `entity`.
    ///
    /// If the entity already has a component here the store is left as is
    /// and [`Insertion::Existing`] is returned. If the index is still
    /// occupied by an older generation of the same slot, that leftover is
    /// overwritten in place.
    ///
    /// # Panics
    ///
    /// Panics if `entity` is [`Entity::NULL`].
    pub fn insert(&mut self, entity: Entity, value: T) -> Insertion<'_, T> {
        assert!(!entity.is_null(), "cannot insert a component for Entity::NULL");

        if let Some(slot) = self.slot_of(entity) {
            if self.entities[slot] == entity {
                return Insertion::Existing(&mut self.dense[slot]);
            }
            tracing::debug!(
                "replacing leftover {} of {} with {}",
                type_name::<T>(),
                self.entities[slot],
                entity
            );
            self.entities[slot] = entity;
            self.dense[slot] = value;
            return Insertion::Added(&mut self.dense[slot]);
        }

        let index = entity.index() as usize;
        if index >= self.sparse.len() {
            self.sparse.resize(index + 1, EMPTY);
        }

        let slot = self.dense.len();
        self.sparse[index] = slot as u32;
        self.dense.push(value);
        self.entities.push(entity);
        Insertion::Added(&mut self.dense[slot])
    }

    /// Removes `entity`'s component, returning it.
    ///
    /// The last dense element is moved into the vacated slot, so this is
    /// O(1) but changes iteration order. Returns `None` if the entity has
    /// no component here.
    pub fn remove(&mut self, entity: Entity) -> Option<T> {
        let slot = self.dense_index(entity)?;

        let value = self.dense.swap_remove(slot);
        self.entities.swap_remove(slot);

        // The former last element now lives at `slot`
        if let Some(&moved) = self.entities.get(slot) {
            self.sparse[moved.index() as usize] = slot as u32;
        }
        self.sparse[entity.index() as usize] = EMPTY;

        Some(value)
    }

    /// Gets `entity`'s component.
    #[inline]
    #[must_use]
    pub fn get(&self, entity: Entity) -> Option<&T> {
        self.dense_index(entity).map(|slot| &self.dense[slot])
    }

    /// Gets `entity`'s component mutably.
    #[inline]
    pub fn get_mut(&mut self, entity: Entity) -> Option<&mut T> {
        self.dense_index(entity).map(move |slot| &mut self.dense[slot])
    }

    /// Returns the number of stored components.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.dense.len()
    }

    /// Checks if the store holds no components.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dense.is_empty()
    }

    /// Returns the owner of dense slot `index`.
    #[inline]
    #[must_use]
    pub fn entity_at(&self, index: usize) -> Option<Entity> {
        self.entities.get(index).copied()
    }

    /// Returns the component in dense slot `index`.
    #[inline]
    #[must_use]
    pub fn component_at(&self, index: usize) -> Option<&T> {
        self.dense.get(index)
    }

    /// Returns the component in dense slot `index` mutably.
    #[inline]
    pub fn component_at_mut(&mut self, index: usize) -> Option<&mut T> {
        self.dense.get_mut(index)
    }

    /// Returns the packed owner list.
    #[inline]
    #[must_use]
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Returns the packed component values.
    #[inline]
    #[must_use]
    pub fn components(&self) -> &[T] {
        &self.dense
    }

    /// Returns the packed component values mutably.
    ///
    /// Values can be changed in place; ownership cannot.
    #[inline]
    pub fn components_mut(&mut self) -> &mut [T] {
        &mut self.dense
    }

    /// Iterates over `(entity, component)` pairs in dense order.
    #[inline]
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (Entity, &T)> {
        self.entities.iter().copied().zip(self.dense.iter())
    }

    /// Iterates mutably over `(entity, component)` pairs in dense order.
    #[inline]
    pub fn iter_mut(&mut self) -> impl ExactSizeIterator<Item = (Entity, &mut T)> {
        self.entities.iter().copied().zip(self.dense.iter_mut())
    }

    /// Removes every component, keeping allocated memory.
    pub fn clear(&mut self) {
        self.dense.clear();
        self.entities.clear();
        self.sparse.fill(EMPTY);
    }
}

impl<T: Pod> ComponentStore<T> {
    /// Returns the dense array as raw bytes, ready for a bulk GPU upload.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.dense)
    }
}

// ============================================================================
// TYPE ERASURE
// ============================================================================

/// Non-generic interface shared by every `ComponentStore<T>`.
///
/// Lets a scene hold stores of different component types in one
/// collection and sweep them when an entity dies.
pub trait AnyStore: Send + Sync {
    /// Removes `entity`'s component if present. Returns `true` if one was
    /// removed.
    fn remove_entity(&mut self, entity: Entity) -> bool;

    /// Checks if `entity` has a component in this store.
    fn contains_entity(&self, entity: Entity) -> bool;

    /// Returns the number of stored components.
    fn len(&self) -> usize;

    /// Checks if the store holds no components.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes every component.
    fn clear(&mut self);

    /// Returns the Rust type name of the stored component.
    fn component_name(&self) -> &'static str;

    /// Upcasts for downcasting to the concrete store.
    fn as_any(&self) -> &dyn Any;

    /// Upcasts for downcasting to the concrete store.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Component> AnyStore for ComponentStore<T> {
    fn remove_entity(&mut self, entity: Entity) -> bool {
        self.remove(entity).is_some()
    }

    fn contains_entity(&self, entity: Entity) -> bool {
        self.contains(entity)
    }

    fn len(&self) -> usize {
        self.dense.len()
    }

    fn clear(&mut self) {
        ComponentStore::clear(self);
    }

    fn component_name(&self) -> &'static str {
        type_name::<T>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
