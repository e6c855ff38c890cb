//! Opaque, time-ordered identifiers for domain entities.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A 128-bit, time-ordered identifier scoped to an entity type `T`.
///
/// Backed by a UUIDv7: the high bits encode a millisecond timestamp, so two
/// identifiers minted in order compare in that same order. `T` is a marker only —
/// no value of type `T` is ever stored — which is what lets `Project`, `Task`, and
/// `Employee` each get a distinct, non-interchangeable id type for free.
pub struct Identifier<T> {
    value: Uuid,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Identifier<T> {
    /// Mint a new identifier from the current time.
    pub fn new() -> Self {
        Self {
            value: Uuid::now_v7(),
            _marker: PhantomData,
        }
    }

    /// Wrap an existing UUID (used when round-tripping through storage).
    pub const fn from_uuid(value: Uuid) -> Self {
        Self {
            value,
            _marker: PhantomData,
        }
    }

    pub const fn as_uuid(&self) -> Uuid {
        self.value
    }
}

impl<T> Default for Identifier<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Identifier<T> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<T> Copy for Identifier<T> {}

impl<T> PartialEq for Identifier<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}
impl<T> Eq for Identifier<T> {}

impl<T> Hash for Identifier<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl<T> PartialOrd for Identifier<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl<T> Ord for Identifier<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value.cmp(&other.value)
    }
}

impl<T> fmt::Debug for Identifier<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl<T> fmt::Display for Identifier<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl<T> Serialize for Identifier<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.value.serialize(serializer)
    }
}

impl<'de, T> Deserialize<'de> for Identifier<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        Uuid::deserialize(deserializer).map(Self::from_uuid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Marker;

    #[test]
    fn monotonic_ordering() {
        let a: Identifier<Marker> = Identifier::new();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let b: Identifier<Marker> = Identifier::new();
        assert!(a < b, "later-minted identifier must sort after an earlier one");
    }

    #[test]
    fn equality_is_by_value() {
        let a: Identifier<Marker> = Identifier::new();
        let b: Identifier<Marker> = Identifier::from_uuid(a.as_uuid());
        assert_eq!(a, b);
    }

    #[test]
    fn roundtrips_through_serde() {
        let a: Identifier<Marker> = Identifier::new();
        let json = serde_json_lite(&a);
        let b: Identifier<Marker> = serde_json::from_str(&json).unwrap();
        assert_eq!(a, b);
    }

    fn serde_json_lite<T>(id: &Identifier<T>) -> String {
        serde_json::to_string(id).unwrap()
    }
}
