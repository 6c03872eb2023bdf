//! # Views
//!
//! Lazy iteration over every entity that holds a given set of components.
//!
//! ```text
//! View<(Position, Velocity)>
//!
//!   Position.entities: [e0, e3, e5, e7, e9]
//!   Velocity.entities: [e5, e0]             <- shortest, drives the pass
//!
//!   e5: Position? yes -> yield
//!   e0: Position? yes -> yield
//! ```
//!
//! The driver is picked once per pass (when [`View::iter`] or
//! [`View::components`] is called) as the store with the fewest entries;
//! every candidate is then checked against the remaining stores in O(1).
//!
//! A view borrows its scene immutably, so the scene cannot be mutated while
//! a view or one of its iterators is alive.

use std::slice;

use super::component::Component;
use super::entity::Entity;
use super::scene::Scene;
use super::storage::ComponentStore;

/// A tuple of component types a [`View`] can select on.
///
/// Implemented for tuples of one to eight component types:
/// `(A,)`, `(A, B)`, ... `(A, B, C, D, E, F, G, H)`.
pub trait ViewQuery {
    /// Borrowed stores, one per component type.
    type Stores<'a>: Copy;

    /// Borrowed components, one per component type.
    type Refs<'a>;

    /// Looks up every store of the query, or `None` if any component type
    /// has never been used in `scene`.
    fn fetch(scene: &Scene) -> Option<Self::Stores<'_>>;

    /// Returns the owner list of the store with the fewest entries.
    fn driver<'a>(stores: Self::Stores<'a>) -> &'a [Entity];

    /// Checks if `entity` is present in every store.
    fn contains_all(stores: Self::Stores<'_>, entity: Entity) -> bool;

    /// Fetches `entity`'s components from every store.
    fn get<'a>(stores: Self::Stores<'a>, entity: Entity) -> Option<Self::Refs<'a>>;
}

macro_rules! impl_view_query {
    ($($name:ident $store:ident),+) => {
        impl<$($name: Component),+> ViewQuery for ($($name,)+) {
            type Stores<'a> = ($(&'a ComponentStore<$name>,)+);
            type Refs<'a> = ($(&'a $name,)+);

            fn fetch(scene: &Scene) -> Option<Self::Stores<'_>> {
                Some(($(scene.store::<$name>()?,)+))
            }

            fn driver<'a>(stores: Self::Stores<'a>) -> &'a [Entity] {
                let ($($store,)+) = stores;
                [$($store.entities(),)+]
                    .into_iter()
                    .min_by_key(|entities| entities.len())
                    .unwrap_or(&[])
            }

            fn contains_all(stores: Self::Stores<'_>, entity: Entity) -> bool {
                let ($($store,)+) = stores;
                $($store.contains(entity))&&+
            }

            fn get<'a>(stores: Self::Stores<'a>, entity: Entity) -> Option<Self::Refs<'a>> {
                let ($($store,)+) = stores;
                Some(($($store.get(entity)?,)+))
            }
        }
    };
}

impl_view_query!(A a);
impl_view_query!(A a, B b);
impl_view_query!(A a, B b, C c);
impl_view_query!(A a, B b, C c, D d);
impl_view_query!(A a, B b, C c, D d, E e);
impl_view_query!(A a, B b, C c, D d, E e, F f);
impl_view_query!(A a, B b, C c, D d, E e, F f, G g);
impl_view_query!(A a, B b, C c, D d, E e, F f, G g, H h);

/// Read-only, restartable selection of the entities holding every
/// component in `Q`.
///
/// Created by [`Scene::view`].
pub struct View<'a, Q: ViewQuery> {
    /// `None` when some component type of `Q` has no store yet; the view
    /// is then empty.
    stores: Option<Q::Stores<'a>>,
}

impl<'a, Q: ViewQuery> View<'a, Q> {
    pub(crate) fn new(scene: &'a Scene) -> Self {
        Self {
            stores: Q::fetch(scene),
        }
    }

    fn candidates(&self) -> slice::Iter<'a, Entity> {
        self.stores.map_or(&[][..], |stores| Q::driver(stores)).iter()
    }

    /// Starts a pass over the matching entities.
    ///
    /// Each call starts again from the beginning.
    #[must_use]
    pub fn iter(&self) -> ViewIter<'a, Q> {
        ViewIter {
            stores: self.stores,
            candidates: self.candidates(),
        }
    }

    /// Starts a pass yielding each matching entity with its components.
    #[must_use]
    pub fn components(&self) -> ViewComponents<'a, Q> {
        ViewComponents {
            stores: self.stores,
            candidates: self.candidates(),
        }
    }

    /// Checks if `entity` holds every component of `Q`.
    #[must_use]
    pub fn contains(&self, entity: Entity) -> bool {
        self.stores
            .is_some_and(|stores| Q::contains_all(stores, entity))
    }

    /// Fetches `entity`'s components, if it matches the view.
    #[must_use]
    pub fn get(&self, entity: Entity) -> Option<Q::Refs<'a>> {
        Q::get(self.stores?, entity)
    }

    /// Upper bound on the number of matches: the size of the smallest
    /// store in `Q`.
    #[must_use]
    pub fn len_hint(&self) -> usize {
        self.candidates().len()
    }
}

impl<'v, 'a, Q: ViewQuery> IntoIterator for &'v View<'a, Q> {
    type Item = Entity;
    type IntoIter = ViewIter<'a, Q>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the entities of a [`View`].
pub struct ViewIter<'a, Q: ViewQuery> {
    stores: Option<Q::Stores<'a>>,
    candidates: slice::Iter<'a, Entity>,
}

impl<'a, Q: ViewQuery> Iterator for ViewIter<'a, Q> {
    type Item = Entity;

    #[inline]
    fn next(&mut self) -> Option<Entity> {
        let stores = self.stores?;
        self.candidates
            .by_ref()
            .copied()
            .find(|&entity| Q::contains_all(stores, entity))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.candidates.len()))
    }
}

/// Iterator over `(entity, components)` pairs of a [`View`].
pub struct ViewComponents<'a, Q: ViewQuery> {
    stores: Option<Q::Stores<'a>>,
    candidates: slice::Iter<'a, Entity>,
}

impl<'a, Q: ViewQuery> Iterator for ViewComponents<'a, Q> {
    type Item = (Entity, Q::Refs<'a>);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let stores = self.stores?;
        self.candidates
            .by_ref()
            .find_map(|&entity| Q::get(stores, entity).map(|refs| (entity, refs)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.candidates.len()))
    }
}
