//! Sharded per-customer map.
//!
//! Process-wide state keyed by customer. Keys are spread over a fixed number of shards so that
//! unrelated customers rarely contend on the same mutex. Shard locks are only held for in-memory
//! reads and writes, never across an `.await`.

use std::{
    hash::BuildHasher,
    sync::{Mutex, MutexGuard, PoisonError},
};

use rustc_hash::{FxBuildHasher, FxHashMap};

use crate::customers::CustomerId;

const SHARDS: usize = 16;

/// A map from customer to `V`, split into independently locked shards.
#[derive(Debug)]
pub struct ShardedMap<V> {
    shards: Vec<Mutex<FxHashMap<CustomerId, V>>>,
}

impl<V> Default for ShardedMap<V> {
    fn default() -> Self {
        Self {
            shards: (0..SHARDS).map(|_| Mutex::default()).collect(),
        }
    }
}

impl<V> ShardedMap<V> {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `f` against the shard holding `customer`.
    pub fn with_shard<R>(
        &self,
        customer: CustomerId,
        f: impl FnOnce(&mut FxHashMap<CustomerId, V>) -> R,
    ) -> R {
        let mut shard = self.lock_shard(customer);

        f(&mut shard)
    }

    /// Clones the value for `customer`.
    pub fn get(&self, customer: CustomerId) -> Option<V>
    where
        V: Clone,
    {
        self.with_shard(customer, |shard| shard.get(&customer).cloned())
    }

    /// Stores `value` for `customer`, returning the previous one.
    pub fn insert(&self, customer: CustomerId, value: V) -> Option<V> {
        self.with_shard(customer, |shard| shard.insert(customer, value))
    }

    /// Removes the value for `customer`.
    pub fn remove(&self, customer: CustomerId) -> Option<V> {
        self.with_shard(customer, |shard| shard.remove(&customer))
    }

    /// Number of customers with a value.
    pub fn len(&self) -> usize {
        self.shards
            .iter()
            .map(|shard| shard.lock().unwrap_or_else(PoisonError::into_inner).len())
            .sum()
    }

    /// Whether no customer has a value.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock_shard(&self, customer: CustomerId) -> MutexGuard<'_, FxHashMap<CustomerId, V>> {
        let index = shard_index(customer, self.shards.len());

        // Values are plain data; a panic mid-update cannot leave them half-written.
        self.shards
            .get(index)
            .or_else(|| self.shards.first())
            .map(|shard| shard.lock().unwrap_or_else(PoisonError::into_inner))
            .unwrap_or_else(|| unreachable!("sharded map always has at least one shard"))
    }
}

fn shard_index(customer: CustomerId, shards: usize) -> usize {
    let hash = FxBuildHasher.hash_one(customer);

    usize::try_from(hash % (shards.max(1) as u64)).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_get_remove() {
        let map = ShardedMap::new();
        let customer = CustomerId::new(7);

        assert_eq!(map.insert(customer, "a"), None);
        assert_eq!(map.insert(customer, "b"), Some("a"));
        assert_eq!(map.get(customer), Some("b"));
        assert_eq!(map.len(), 1);
        assert_eq!(map.remove(customer), Some("b"));
        assert!(map.is_empty(), "map should be empty after remove");
    }

    #[test]
    fn customers_are_independent() {
        let map = ShardedMap::new();

        for id in 0..100 {
            map.insert(CustomerId::new(id), id * 2);
        }

        assert_eq!(map.len(), 100);
        assert_eq!(map.get(CustomerId::new(42)), Some(84));
    }

    #[test]
    fn shard_index_is_in_range() {
        for id in [-5, 0, 1, i64::MAX] {
            assert!(
                shard_index(CustomerId::new(id), SHARDS) < SHARDS,
                "index out of range for {id}"
            );
        }
    }
}
