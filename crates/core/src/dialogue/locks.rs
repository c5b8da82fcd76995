//! Per-customer locks.

use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::{customers::CustomerId, keyed::ShardedMap};

/// One async mutex per customer, held while an event is handled.
///
/// Waiters are served in the order they asked, so a customer's events run one at a time in
/// arrival order while other customers proceed in parallel.
#[derive(Debug, Default)]
pub struct CustomerLocks {
    locks: ShardedMap<Arc<Mutex<()>>>,
}

impl CustomerLocks {
    /// Creates an empty lock table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for the customer's lock.
    pub async fn lock(&self, customer: CustomerId) -> OwnedMutexGuard<()> {
        let lock = self.locks.with_shard(customer, |shard| {
            Arc::clone(shard.entry(customer).or_default())
        });

        lock.lock_owned().await
    }

    /// Drops the customer's lock entry when nobody holds or waits for it.
    pub fn release(&self, customer: CustomerId) {
        self.locks.with_shard(customer, |shard| {
            if shard
                .get(&customer)
                .is_some_and(|lock| Arc::strong_count(lock) == 1)
            {
                shard.remove(&customer);
            }
        });
    }

    /// Number of customers with a lock entry.
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    /// Whether no customer has a lock entry.
    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time::timeout;

    use super::*;

    #[tokio::test]
    async fn same_customer_waits() {
        let locks = CustomerLocks::new();
        let customer = CustomerId::new(1);

        let guard = locks.lock(customer).await;
        let second = timeout(Duration::from_millis(20), locks.lock(customer)).await;

        assert!(second.is_err(), "second lock must wait for the first");

        drop(guard);
    }

    #[tokio::test]
    async fn other_customers_do_not_wait() {
        let locks = CustomerLocks::new();

        let _first = locks.lock(CustomerId::new(1)).await;
        let other = timeout(Duration::from_millis(20), locks.lock(CustomerId::new(2))).await;

        assert!(other.is_ok(), "different customers must not contend");
    }

    #[tokio::test]
    async fn release_keeps_held_locks() {
        let locks = CustomerLocks::new();
        let customer = CustomerId::new(1);

        let guard = locks.lock(customer).await;
        locks.release(customer);

        assert_eq!(locks.len(), 1);

        drop(guard);
        locks.release(customer);

        assert!(locks.is_empty(), "released lock entry is removed");
    }
}
