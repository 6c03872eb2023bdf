//! # Entity Registry
//!
//! Owns the space of entity indices: issues handles, recycles destroyed
//! slots and rejects stale handles through per-slot generations.
//!
//! Recycling is LIFO: the most recently destroyed index is handed out
//! first. Generations wrap on overflow; a slot has to be recycled 2^32
//! times before an old handle could compare equal again.

use crate::config::SceneConfig;
use crate::error::{EcsError, EcsResult};

use super::entity::Entity;

/// Per-slot bookkeeping.
#[derive(Clone, Copy, Debug)]
struct Slot {
    /// Generation of the handle currently (or next) issued for this slot.
    generation: u32,
    /// Whether this slot is currently alive.
    alive: bool,
}

/// Allocator for [`Entity`] handles.
///
/// # Example
///
/// ```rust
/// use vesper_core::EntityRegistry;
///
/// let mut registry = EntityRegistry::new();
/// let a = registry.create();
/// registry.destroy(a).unwrap();
///
/// let b = registry.create();
/// assert_eq!(a.index(), b.index());
/// assert_ne!(a, b);
/// assert!(!registry.is_valid(a));
/// ```
#[derive(Clone, Debug)]
pub struct EntityRegistry {
    /// All slots ever issued; `slots.len()` is the next never-used index.
    slots: Vec<Slot>,
    /// Recycled indices, most recently freed last.
    free_list: Vec<u32>,
    /// Number of currently alive entities.
    alive_count: usize,
    /// Exclusive upper bound on issued indices.
    max_entities: u32,
}

impl Default for EntityRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityRegistry {
    /// Creates a registry with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(&SceneConfig::default())
    }

    /// Creates a registry sized from `config`.
    ///
    /// `entity_capacity` slots are reserved up front so that spawning the
    /// first wave of entities does not reallocate. The reservation is capped
    /// at [`SceneConfig::MAX_RESERVED_CAPACITY`] for configs that skipped
    /// validation.
    #[must_use]
    pub fn with_config(config: &SceneConfig) -> Self {
        let reserve = config.entity_capacity.min(SceneConfig::MAX_RESERVED_CAPACITY);
        Self {
            slots: Vec::with_capacity(reserve),
            free_list: Vec::with_capacity(reserve),
            alive_count: 0,
            max_entities: config.max_entities.min(Entity::NULL_INDEX),
        }
    }

    /// Issues a fresh or recycled handle.
    ///
    /// # Panics
    ///
    /// Panics if every index below the configured maximum is alive. Handing
    /// out an aliased index instead would corrupt every store.
    pub fn create(&mut self) -> Entity {
        match self.try_create() {
            Ok(entity) => entity,
            Err(err) => {
                tracing::error!("entity id space exhausted: {}", err);
                panic!("{err}");
            }
        }
    }

    /// Issues a fresh or recycled handle, reporting exhaustion as an error.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::EntityLimitReached`] if no index is available.
    pub fn try_create(&mut self) -> EcsResult<Entity> {
        if let Some(index) = self.free_list.pop() {
            let slot = &mut self.slots[index as usize];
            slot.alive = true;
            self.alive_count += 1;
            return Ok(Entity::new(index, slot.generation));
        }

        let index = self.slots.len();
        if index >= self.max_entities as usize {
            return Err(EcsError::EntityLimitReached {
                max: self.max_entities,
            });
        }

        self.slots.push(Slot {
            generation: 0,
            alive: true,
        });
        self.alive_count += 1;
        Ok(Entity::new(index as u32, 0))
    }

    /// Destroys an entity, bumping its slot's generation and freeing the
    /// index for reuse.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::StaleEntity`] if `entity` is null, was never
    /// issued, or is no longer alive. The registry is left untouched, so
    /// destroying twice is harmless.
    pub fn destroy(&mut self, entity: Entity) -> EcsResult<()> {
        if !self.is_valid(entity) {
            return Err(EcsError::StaleEntity(entity));
        }

        let index = entity.index();
        let slot = &mut self.slots[index as usize];
        slot.alive = false;
        slot.generation = slot.generation.wrapping_add(1);
        self.alive_count -= 1;
        self.free_list.push(index);

        Ok(())
    }

    /// Checks if a handle refers to a live entity.
    #[inline]
    #[must_use]
    pub fn is_valid(&self, entity: Entity) -> bool {
        if entity.is_null() {
            return false;
        }
        self.slots
            .get(entity.index() as usize)
            .is_some_and(|slot| slot.alive && slot.generation == entity.generation())
    }

    /// Returns the number of currently alive entities.
    #[inline]
    #[must_use]
    pub const fn alive_count(&self) -> usize {
        self.alive_count
    }

    /// Returns the number of slots ever issued (alive or free).
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns the number of recycled indices waiting for reuse.
    #[inline]
    #[must_use]
    pub fn free_count(&self) -> usize {
        self.free_list.len()
    }

    /// Returns the configured maximum number of slots.
    #[inline]
    #[must_use]
    pub const fn max_entities(&self) -> u32 {
        self.max_entities
    }

    /// Iterates over all alive entities in index order.
    pub fn iter_alive(&self) -> impl Iterator<Item = Entity> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.alive)
            .map(|(index, slot)| Entity::new(index as u32, slot.generation))
    }

    /// Destroys every alive entity.
    ///
    /// Generations are bumped exactly as in [`EntityRegistry::destroy`], so
    /// no handle issued before the clear becomes valid again.
    pub fn clear(&mut self) {
        for index in (0..self.slots.len()).rev() {
            let slot = &mut self.slots[index];
            if slot.alive {
                slot.alive = false;
                slot.generation = slot.generation.wrapping_add(1);
                self.free_list.push(index as u32);
            }
        }
        self.alive_count = 0;
    }
}
