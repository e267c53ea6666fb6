//! Marker traits separating records (identity) from values (equality).

/// A persisted record whose identity survives attribute changes.
///
/// `User` and `Transaction` implement this: an updated transaction keeps its id,
/// and two snapshots with the same id describe the same record.
pub trait Entity {
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    fn id(&self) -> &Self::Id;
}

/// Immutable, compared by value. `Money::from_minor(500)` equals any other
/// `Money::from_minor(500)`; arithmetic produces a new amount.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
