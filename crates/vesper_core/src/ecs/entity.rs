//! # Entity Handles
//!
//! Entities are lightweight identifiers consisting of:
//! - An index naming a logical slot (shared with sparse tables)
//! - A generation counter for safe reuse

use std::fmt;

/// Versioned handle identifying an entity in a [`Scene`](super::Scene).
///
/// The handle is split into two parts:
/// - Lower 32 bits: slot index
/// - Upper 32 bits: generation counter for detecting stale references
///
/// Two handles are equal only if both parts match, so a handle kept across
/// a destroy/recreate cycle of the same slot no longer equals the new one.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Entity(u64);

impl Entity {
    /// Null/invalid entity. Never issued by a registry.
    pub const NULL: Self = Self(u64::MAX);

    /// Index reserved for [`Entity::NULL`]; registries stop one below it.
    pub const NULL_INDEX: u32 = u32::MAX;

    /// Creates a handle from index and generation.
    ///
    /// # Arguments
    ///
    /// * `index` - The slot index (0 to 2^32-2)
    /// * `generation` - The generation counter (0 to 2^32-1)
    #[inline]
    #[must_use]
    pub const fn new(index: u32, generation: u32) -> Self {
        Self(((generation as u64) << 32) | (index as u64))
    }

    /// Returns the index portion of the handle.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0 as u32
    }

    /// Returns the generation portion of the handle.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        (self.0 >> 32) as u32
    }

    /// Checks if this is the null handle.
    #[inline]
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.0 == u64::MAX
    }

    /// Returns the raw packed representation.
    #[inline]
    #[must_use]
    pub const fn to_bits(self) -> u64 {
        self.0
    }

    /// Rebuilds a handle from [`Entity::to_bits`].
    #[inline]
    #[must_use]
    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }
}

impl Default for Entity {
    fn default() -> Self {
        Self::NULL
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            f.write_str("Entity(NULL)")
        } else {
            write!(f, "Entity({}v{})", self.index(), self.generation())
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            f.write_str("null")
        } else {
            write!(f, "{}v{}", self.index(), self.generation())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_roundtrip() {
        let id = Entity::new(12345, 67890);
        assert_eq!(id.index(), 12345);
        assert_eq!(id.generation(), 67890);
        assert_eq!(Entity::from_bits(id.to_bits()), id);
    }

    #[test]
    fn test_entity_equality_needs_both_parts() {
        assert_eq!(Entity::new(4, 0), Entity::new(4, 0));
        assert_ne!(Entity::new(4, 0), Entity::new(4, 1));
        assert_ne!(Entity::new(4, 0), Entity::new(5, 0));
    }

    #[test]
    fn test_null() {
        assert!(Entity::NULL.is_null());
        assert!(Entity::default().is_null());
        assert_eq!(Entity::NULL.index(), Entity::NULL_INDEX);
        assert!(!Entity::new(0, 0).is_null());
        assert_eq!(format!("{:?}", Entity::NULL), "Entity(NULL)");
        assert_eq!(format!("{:?}", Entity::new(2, 7)), "Entity(2v7)");
    }
}
