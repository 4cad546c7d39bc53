//! Typed foreign keys: a field either still holds the key or the record it
//! points at.

use std::collections::HashMap;
use std::hash::Hash;

use serde::{Serialize, Serializer};

/// A reference record that knows its own identity.
pub trait Identified {
    type Id: Eq + Hash + Clone;

    fn id(&self) -> Self::Id;
}

/// Foreign key on a subject record.
///
/// `Unresolved` means the reference record was not available; consumers must
/// handle it. Serializes as the record when resolved and as `null` otherwise,
/// DTOs usually skip the field instead via [`Ref::is_unresolved`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ref<K, R> {
    Unresolved(K),
    Resolved(R),
}

impl<K, R> Ref<K, R> {
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }

    #[must_use]
    pub fn is_unresolved(&self) -> bool {
        !self.is_resolved()
    }

    #[must_use]
    pub fn resolved(&self) -> Option<&R> {
        match self {
            Self::Resolved(r) => Some(r),
            Self::Unresolved(_) => None,
        }
    }
}

impl<K, R> Ref<K, R>
where
    K: Eq + Hash,
    R: Clone,
{
    /// Swap the key for its reference record when the index has one.
    #[must_use]
    pub fn resolve(self, index: &ReferenceIndex<K, R>) -> Self {
        match self {
            Self::Unresolved(key) => match index.get(&key) {
                Some(found) => Self::Resolved(found.clone()),
                None => Self::Unresolved(key),
            },
            resolved @ Self::Resolved(_) => resolved,
        }
    }
}

impl<K, R: Serialize> Serialize for Ref<K, R> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Resolved(r) => r.serialize(serializer),
            Self::Unresolved(_) => serializer.serialize_none(),
        }
    }
}

/// Reference records keyed by identity. The first record wins when several
/// share an id, matching a linear "find first" scan.
#[derive(Debug, Clone)]
pub struct ReferenceIndex<K, R> {
    by_id: HashMap<K, R>,
}

impl<K, R> Default for ReferenceIndex<K, R> {
    fn default() -> Self {
        Self {
            by_id: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash, R> ReferenceIndex<K, R> {
    pub fn new<I>(references: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Identified<Id = K>,
    {
        let mut by_id = HashMap::new();
        for reference in references {
            by_id.entry(reference.id()).or_insert(reference);
        }
        Self { by_id }
    }

    #[must_use]
    pub fn get(&self, key: &K) -> Option<&R> {
        self.by_id.get(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

/// Resolve every reference against the same index, order preserved.
pub fn resolve_all<K, R, I>(refs: I, index: &ReferenceIndex<K, R>) -> Vec<Ref<K, R>>
where
    I: IntoIterator<Item = Ref<K, R>>,
    K: Eq + Hash,
    R: Clone,
{
    refs.into_iter().map(|r| r.resolve(index)).collect()
}
