//! Node shapes: what a node stores and which part of it is the key.

use std::hash::Hash;
use std::marker::PhantomData;

/// Binds a stored value type to the key used for hashing and equality.
pub trait NodeShape {
    type Key: Hash + Eq;
    type Value;

    fn key(value: &Self::Value) -> &Self::Key;
}

/// The value is its own key.
#[derive(Debug)]
pub struct SetShape<T>(PhantomData<fn() -> T>);

impl<T: Hash + Eq> NodeShape for SetShape<T> {
    type Key = T;
    type Value = T;

    fn key(value: &T) -> &T {
        value
    }
}

/// A `(key, value)` pair hashed and compared on the key only.
#[derive(Debug)]
pub struct MapShape<K, V>(PhantomData<fn() -> (K, V)>);

impl<K: Hash + Eq, V> NodeShape for MapShape<K, V> {
    type Key = K;
    type Value = (K, V);

    fn key(value: &(K, V)) -> &K {
        &value.0
    }
}
