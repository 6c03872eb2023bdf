//! # Scene
//!
//! The central container for all entities and components.
//!
//! A scene owns one [`EntityRegistry`] and one [`ComponentStore`] per
//! component type it has seen. Stores are created lazily on the first
//! `add_component::<T>` and live as long as the scene.

use std::any::type_name;
use std::fmt;

use crate::config::SceneConfig;
use crate::error::{EcsError, EcsResult, EcsWarning};

use super::component::{Component, ComponentTypeId};
use super::entity::Entity;
use super::registry::EntityRegistry;
use super::storage::{AnyStore, ComponentStore};
use super::view::{View, ViewQuery};

/// Callback receiving every [`EcsWarning`] a scene raises.
pub type WarningHook = Box<dyn FnMut(&EcsWarning) + Send + Sync>;

/// Store slots indexed by [`ComponentTypeId`].
type StoreTable = Vec<Option<Box<dyn AnyStore>>>;

/// Snapshot of scene occupancy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SceneStats {
    /// Number of live entities.
    pub alive_entities: usize,
    /// Number of component stores created so far.
    pub component_types: usize,
    /// Total number of components across all stores.
    pub components: usize,
}

/// Entity registry plus the component stores that hang off it.
///
/// # Example
///
/// ```rust
/// use vesper_core::Scene;
///
/// struct Position(f32, f32);
/// struct Velocity(f32, f32);
///
/// let mut scene = Scene::new();
/// let mover = scene.create_entity();
/// let statue = scene.create_entity();
/// scene.add_component(mover, Position(0.0, 0.0)).unwrap();
/// scene.add_component(mover, Velocity(1.0, 0.0)).unwrap();
/// scene.add_component(statue, Position(5.0, 5.0)).unwrap();
///
/// let moving: Vec<_> = scene.view::<(Position, Velocity)>().iter().collect();
/// assert_eq!(moving, vec![mover]);
/// ```
pub struct Scene {
    registry: EntityRegistry,
    stores: StoreTable,
    config: SceneConfig,
    warning_hook: Option<WarningHook>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scene")
            .field("registry", &self.registry)
            .field("stats", &self.stats())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Scene {
    /// Creates an empty scene with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(SceneConfig::default())
    }

    /// Creates an empty scene sized from `config`.
    #[must_use]
    pub fn with_config(config: SceneConfig) -> Self {
        Self {
            registry: EntityRegistry::with_config(&config),
            stores: Vec::new(),
            config,
            warning_hook: None,
        }
    }

    /// Returns the configuration this scene was built with.
    #[inline]
    #[must_use]
    pub const fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// Returns the entity registry.
    #[inline]
    #[must_use]
    pub const fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    /// Installs a callback that receives every warning, in addition to the
    /// `tracing` log line. Replaces any previous hook.
    pub fn set_warning_hook(&mut self, hook: impl FnMut(&EcsWarning) + Send + Sync + 'static) {
        self.warning_hook = Some(Box::new(hook));
    }

    /// Removes the warning callback.
    pub fn clear_warning_hook(&mut self) {
        self.warning_hook = None;
    }

    // =========================================================================
    // Entities
    // =========================================================================

    /// Creates an entity.
    ///
    /// # Panics
    ///
    /// Panics if the entity id space is exhausted.
    pub fn create_entity(&mut self) -> Entity {
        let entity = self.registry.create();
        tracing::debug!("created entity {}", entity);
        entity
    }

    /// Creates an entity, reporting id-space exhaustion as an error.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::EntityLimitReached`] if no index is available.
    pub fn try_create_entity(&mut self) -> EcsResult<Entity> {
        let entity = self.registry.try_create()?;
        tracing::debug!("created entity {}", entity);
        Ok(entity)
    }

    /// Destroys an entity and every component attached to it.
    ///
    /// # Returns
    ///
    /// `true` if the entity was destroyed, `false` if the handle was stale
    /// (a warning is raised and nothing changes).
    pub fn destroy_entity(&mut self, entity: Entity) -> bool {
        if self.registry.destroy(entity).is_err() {
            emit(
                &mut self.warning_hook,
                EcsWarning::StaleEntity {
                    entity,
                    operation: "destroy_entity",
                },
            );
            return false;
        }

        let mut removed = 0usize;
        for store in self.stores.iter_mut().flatten() {
            if store.remove_entity(entity) {
                removed += 1;
            }
        }
        tracing::debug!("destroyed entity {} ({} components)", entity, removed);
        true
    }

    /// Checks if an entity is alive.
    #[inline]
    #[must_use]
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.registry.is_valid(entity)
    }

    /// Returns the number of live entities.
    #[inline]
    #[must_use]
    pub const fn entity_count(&self) -> usize {
        self.registry.alive_count()
    }

    /// Iterates over all live entities in index order.
    pub fn entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.registry.iter_alive()
    }

    // =========================================================================
    // Components
    // =========================================================================

    /// Attaches `value` to `entity`, creating `T`'s store on first use.
    ///
    /// If the entity already has a `T` the existing value is kept and
    /// returned, and an [`EcsWarning::DuplicateComponent`] is raised.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::StaleEntity`] (and raises a warning) if `entity`
    /// is not alive.
    pub fn add_component<T: Component>(&mut self, entity: Entity, value: T) -> EcsResult<&mut T> {
        if !self.registry.is_valid(entity) {
            emit(
                &mut self.warning_hook,
                EcsWarning::StaleEntity {
                    entity,
                    operation: "add_component",
                },
            );
            return Err(EcsError::StaleEntity(entity));
        }

        let capacity = self
            .config
            .component_capacity
            .min(SceneConfig::MAX_RESERVED_CAPACITY);
        let outcome = store_entry::<T>(&mut self.stores, capacity).insert(entity, value);
        if outcome.is_duplicate() {
            emit(
                &mut self.warning_hook,
                EcsWarning::DuplicateComponent {
                    entity,
                    component: type_name::<T>(),
                },
            );
        }
        Ok(outcome.into_inner())
    }

    /// Detaches and returns `entity`'s `T`.
    ///
    /// Returns `None` if `T` was never used in this scene or the entity has
    /// no `T`. A stale handle additionally raises a warning.
    pub fn remove_component<T: Component>(&mut self, entity: Entity) -> Option<T> {
        if !self.registry.is_valid(entity) {
            emit(
                &mut self.warning_hook,
                EcsWarning::StaleEntity {
                    entity,
                    operation: "remove_component",
                },
            );
            return None;
        }
        self.store_mut::<T>()?.remove(entity)
    }

    /// Gets `entity`'s `T`, or `None` if absent or the handle is stale.
    #[inline]
    #[must_use]
    pub fn get_component<T: Component>(&self, entity: Entity) -> Option<&T> {
        if !self.registry.is_valid(entity) {
            tracing::trace!("get_component on stale entity {}", entity);
            return None;
        }
        self.store::<T>()?.get(entity)
    }

    /// Gets `entity`'s `T` mutably, or `None` if absent or the handle is
    /// stale.
    #[inline]
    pub fn get_component_mut<T: Component>(&mut self, entity: Entity) -> Option<&mut T> {
        if !self.registry.is_valid(entity) {
            tracing::trace!("get_component_mut on stale entity {}", entity);
            return None;
        }
        self.store_mut::<T>()?.get_mut(entity)
    }

    /// Checks if `entity` has a `T`.
    #[inline]
    #[must_use]
    pub fn has_component<T: Component>(&self, entity: Entity) -> bool {
        if !self.registry.is_valid(entity) {
            tracing::trace!("has_component on stale entity {}", entity);
            return false;
        }
        self.store::<T>().is_some_and(|store| store.contains(entity))
    }

    /// Returns `T`'s store, if `T` has been used in this scene.
    #[must_use]
    pub fn store<T: Component>(&self) -> Option<&ComponentStore<T>> {
        let id = ComponentTypeId::get::<T>()?;
        self.stores
            .get(id.index())?
            .as_ref()?
            .as_any()
            .downcast_ref::<ComponentStore<T>>()
    }

    /// Returns `T`'s store mutably, if `T` has been used in this scene.
    ///
    /// Components can be read and edited in place through it. The store's
    /// own `insert` does not check liveness, so attach new components
    /// through [`Scene::add_component`].
    #[must_use]
    pub fn store_mut<T: Component>(&mut self) -> Option<&mut ComponentStore<T>> {
        let id = ComponentTypeId::get::<T>()?;
        self.stores
            .get_mut(id.index())?
            .as_mut()?
            .as_any_mut()
            .downcast_mut::<ComponentStore<T>>()
    }

    /// Iterates over every `(entity, &T)` in dense order.
    pub fn iter_components<T: Component>(&self) -> impl Iterator<Item = (Entity, &T)> {
        self.store::<T>().into_iter().flat_map(|store| store.iter())
    }

    /// Iterates over every `(entity, &mut T)` in dense order.
    pub fn iter_components_mut<T: Component>(&mut self) -> impl Iterator<Item = (Entity, &mut T)> {
        self.store_mut::<T>()
            .into_iter()
            .flat_map(|store| store.iter_mut())
    }

    /// Returns the type names of every component attached to `entity`.
    #[must_use]
    pub fn component_names(&self, entity: Entity) -> Vec<&'static str> {
        self.stores
            .iter()
            .flatten()
            .filter(|store| store.contains_entity(entity))
            .map(|store| store.component_name())
            .collect()
    }

    /// Builds a view over every entity holding all components of `Q`.
    ///
    /// ```rust
    /// use vesper_core::Scene;
    ///
    /// let mut scene = Scene::new();
    /// let e = scene.create_entity();
    /// scene.add_component(e, 1u8).unwrap();
    /// scene.add_component(e, 'x').unwrap();
    ///
    /// for (entity, (byte, ch)) in scene.view::<(u8, char)>().components() {
    ///     assert_eq!((entity, *byte, *ch), (e, 1, 'x'));
    /// }
    /// ```
    #[must_use]
    pub fn view<Q: ViewQuery>(&self) -> View<'_, Q> {
        View::new(self)
    }

    // =========================================================================
    // Whole-scene operations
    // =========================================================================

    /// Returns current occupancy counts.
    #[must_use]
    pub fn stats(&self) -> SceneStats {
        let mut stats = SceneStats {
            alive_entities: self.registry.alive_count(),
            ..SceneStats::default()
        };
        for store in self.stores.iter().flatten() {
            stats.component_types += 1;
            stats.components += store.len();
        }
        stats
    }

    /// Destroys every entity and empties every store.
    ///
    /// Stores stay registered and keep their memory. Handles issued before
    /// the clear are stale afterwards.
    pub fn clear(&mut self) {
        for store in self.stores.iter_mut().flatten() {
            store.clear();
        }
        self.registry.clear();
        tracing::debug!("scene cleared");
    }
}

/// Returns `T`'s store, creating it on first use.
fn store_entry<T: Component>(stores: &mut StoreTable, capacity: usize) -> &mut ComponentStore<T> {
    let id = ComponentTypeId::of::<T>();
    let index = id.index();
    if index >= stores.len() {
        stores.resize_with(index + 1, || None);
    }

    let store = stores[index].get_or_insert_with(|| {
        tracing::debug!("created store for {} ({})", type_name::<T>(), id);
        Box::new(ComponentStore::<T>::with_capacity(capacity)) as Box<dyn AnyStore>
    });
    match store.as_any_mut().downcast_mut::<ComponentStore<T>>() {
        Some(store) => store,
        None => unreachable!("{id} is not a store of {}", type_name::<T>()),
    }
}

/// Logs a warning and forwards it to the hook, if any.
fn emit(hook: &mut Option<WarningHook>, warning: EcsWarning) {
    tracing::warn!("{}", warning);
    if let Some(hook) = hook.as_mut() {
        hook(&warning);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    #[derive(Debug, PartialEq)]
    struct Position {
        x: f32,
        y: f32,
    }

    #[derive(Debug, PartialEq)]
    struct Tag(char);

    fn collect_warnings(scene: &mut Scene) -> Arc<Mutex<Vec<EcsWarning>>> {
        let warnings = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&warnings);
        scene.set_warning_hook(move |w| sink.lock().unwrap().push(w.clone()));
        warnings
    }

    #[test]
    fn test_add_get_remove() {
        let mut scene = Scene::new();
        let e = scene.create_entity();

        scene.add_component(e, Position { x: 1.0, y: 2.0 }).unwrap();
        assert!(scene.has_component::<Position>(e));
        assert_eq!(
            scene.get_component::<Position>(e),
            Some(&Position { x: 1.0, y: 2.0 })
        );

        scene.get_component_mut::<Position>(e).unwrap().x = 5.0;
        assert_eq!(
            scene.remove_component::<Position>(e),
            Some(Position { x: 5.0, y: 2.0 })
        );
        assert!(!scene.has_component::<Position>(e));
        assert_eq!(scene.remove_component::<Position>(e), None);
    }

    #[test]
    fn test_unused_type_is_absent() {
        #[allow(dead_code)]
        struct NeverAdded;
        let mut scene = Scene::new();
        let e = scene.create_entity();
        assert!(!scene.has_component::<NeverAdded>(e));
        assert!(scene.get_component::<NeverAdded>(e).is_none());
        assert!(scene.remove_component::<NeverAdded>(e).is_none());
        assert!(scene.store::<NeverAdded>().is_none());
        assert_eq!(scene.view::<(NeverAdded,)>().iter().count(), 0);
    }

    #[test]
    fn test_duplicate_add_keeps_existing_and_warns() {
        let mut scene = Scene::new();
        let warnings = collect_warnings(&mut scene);
        let e = scene.create_entity();

        scene.add_component(e, Tag('a')).unwrap();
        let existing = scene.add_component(e, Tag('b')).unwrap();
        assert_eq!(*existing, Tag('a'));

        let warnings = warnings.lock().unwrap();
        assert_eq!(warnings.len(), 1);
        assert!(matches!(
            warnings[0],
            EcsWarning::DuplicateComponent { entity, .. } if entity == e
        ));
    }

    #[test]
    fn test_stale_handle_operations() {
        let mut scene = Scene::new();
        let warnings = collect_warnings(&mut scene);
        let e = scene.create_entity();
        scene.add_component(e, Tag('a')).unwrap();
        assert!(scene.destroy_entity(e));

        assert!(!scene.destroy_entity(e));
        assert_eq!(scene.add_component(e, Tag('b')).unwrap_err(), EcsError::StaleEntity(e));
        assert_eq!(scene.remove_component::<Tag>(e), None);
        assert_eq!(scene.get_component::<Tag>(e), None);

        let operations: Vec<_> = warnings
            .lock()
            .unwrap()
            .iter()
            .map(|w| match w {
                EcsWarning::StaleEntity { operation, .. } => *operation,
                EcsWarning::DuplicateComponent { .. } => "duplicate",
            })
            .collect();
        assert_eq!(operations, vec!["destroy_entity", "add_component", "remove_component"]);
    }

    #[test]
    fn test_destroy_sweeps_all_stores() {
        let mut scene = Scene::new();
        let a = scene.create_entity();
        let b = scene.create_entity();
        scene.add_component(a, Tag('a')).unwrap();
        scene.add_component(a, Position { x: 0.0, y: 0.0 }).unwrap();
        scene.add_component(b, Tag('b')).unwrap();

        assert!(scene.destroy_entity(a));
        assert_eq!(scene.store::<Tag>().unwrap().len(), 1);
        assert_eq!(scene.store::<Position>().unwrap().len(), 0);
        assert_eq!(scene.get_component::<Tag>(b), Some(&Tag('b')));

        // Recycled index starts with no components
        let c = scene.create_entity();
        assert_eq!(c.index(), a.index());
        assert!(scene.component_names(c).is_empty());
    }

    #[test]
    fn test_component_names() {
        let mut scene = Scene::new();
        let e = scene.create_entity();
        scene.add_component(e, Tag('a')).unwrap();
        scene.add_component(e, Position { x: 0.0, y: 0.0 }).unwrap();

        let mut names = scene.component_names(e);
        names.sort_unstable();
        assert_eq!(names.len(), 2);
        assert!(names.iter().any(|n| n.ends_with("Tag")));
        assert!(names.iter().any(|n| n.ends_with("Position")));
    }

    #[test]
    fn test_iter_components_mut() {
        let mut scene = Scene::new();
        for i in 0..3 {
            let e = scene.create_entity();
            scene.add_component(e, i as u16).unwrap();
        }
        for (_, value) in scene.iter_components_mut::<u16>() {
            *value += 10;
        }
        let mut values: Vec<_> = scene.iter_components::<u16>().map(|(_, v)| *v).collect();
        values.sort_unstable();
        assert_eq!(values, vec![10, 11, 12]);
    }

    #[test]
    fn test_stats_and_clear() {
        let mut scene = Scene::new();
        let a = scene.create_entity();
        let b = scene.create_entity();
        scene.add_component(a, Tag('a')).unwrap();
        scene.add_component(b, Tag('b')).unwrap();
        scene.add_component(b, Position { x: 0.0, y: 0.0 }).unwrap();

        assert_eq!(
            scene.stats(),
            SceneStats {
                alive_entities: 2,
                component_types: 2,
                components: 3,
            }
        );

        scene.clear();
        assert_eq!(
            scene.stats(),
            SceneStats {
                alive_entities: 0,
                component_types: 2,
                components: 0,
            }
        );
        assert!(!scene.is_alive(a));
        assert!(!scene.is_alive(b));
        assert_eq!(scene.entities().count(), 0);
    }

    #[test]
    fn test_oversized_unvalidated_config_is_capped() {
        let config = SceneConfig {
            entity_capacity: 4_000_000_000,
            component_capacity: 4_000_000_000,
            ..SceneConfig::default()
        };
        assert!(config.validate().is_err());

        let mut scene = Scene::with_config(config);
        let e = scene.create_entity();
        scene.add_component(e, Tag('a')).unwrap();
        assert_eq!(scene.get_component::<Tag>(e), Some(&Tag('a')));
    }

    #[test]
    fn test_store_mut_edits_in_place() {
        let mut scene = Scene::new();
        let e = scene.create_entity();
        scene.add_component(e, Tag('a')).unwrap();

        let store = scene.store_mut::<Tag>().unwrap();
        store.get_mut(e).unwrap().0 = 'z';
        assert_eq!(scene.get_component::<Tag>(e), Some(&Tag('z')));
        assert!(scene.store_mut::<Position>().is_none());
    }

    #[test]
    fn test_stale_queries_are_absent_without_warning() {
        let mut scene = Scene::new();
        let warnings = collect_warnings(&mut scene);
        let e = scene.create_entity();
        scene.add_component(e, Tag('a')).unwrap();
        scene.destroy_entity(e);
        let recycled = scene.create_entity();
        scene.add_component(recycled, Tag('b')).unwrap();

        assert!(!scene.has_component::<Tag>(e));
        assert!(scene.get_component::<Tag>(e).is_none());
        assert!(scene.get_component_mut::<Tag>(e).is_none());
        assert_eq!(scene.get_component::<Tag>(recycled), Some(&Tag('b')));
        assert!(warnings.lock().unwrap().is_empty());
    }

    #[test]
    fn test_try_create_respects_limit() {
        let config = SceneConfig {
            entity_capacity: 1,
            max_entities: 1,
            ..SceneConfig::default()
        };
        let mut scene = Scene::with_config(config);
        let a = scene.try_create_entity().unwrap();
        assert_eq!(
            scene.try_create_entity(),
            Err(EcsError::EntityLimitReached { max: 1 })
        );
        scene.destroy_entity(a);
        assert!(scene.try_create_entity().is_ok());
    }
}
