//! Order committer.

use std::{fmt, sync::Arc, time::Duration};

use jiff::{Timestamp, tz::TimeZone};
use tokio::{sync::Mutex, time::timeout};
use tracing::{error, info, warn};

use crate::{
    carts::Cart,
    customers::Customer,
    language::Language,
    orders::{
        AdminNotifier, CommitError, LedgerStore, OrderId, OrderRecord, OrderStatus, items_summary,
    },
};

/// First order number of an empty ledger.
pub const DEFAULT_ORDER_ID_BASE: u64 = 10_001;

/// How long a commit waits for the admin notice before giving up on it.
pub const DEFAULT_NOTIFY_TIMEOUT: Duration = Duration::from_secs(5);

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Delivery details collected during checkout.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Delivery {
    pub phone: String,
    pub address: String,
    pub language: Language,
}

/// Writes confirmed carts to the ledger.
///
/// Order numbers are `base + rows already in the ledger`, read right before the append. Commits
/// from this process are serialized so they cannot read the same count; two processes sharing one
/// ledger still can, and would then hand out the same number.
pub struct OrderCommitter {
    ledger: Arc<dyn LedgerStore>,
    notifier: Arc<dyn AdminNotifier>,
    order_id_base: u64,
    timezone: TimeZone,
    notify_timeout: Duration,
    commit_lock: Mutex<()>,
}

impl fmt::Debug for OrderCommitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrderCommitter")
            .field("order_id_base", &self.order_id_base)
            .field("timezone", &self.timezone)
            .field("notify_timeout", &self.notify_timeout)
            .finish_non_exhaustive()
    }
}

impl OrderCommitter {
    /// Creates a committer with the default numbering base, UTC timestamps and notify timeout.
    pub fn new(ledger: Arc<dyn LedgerStore>, notifier: Arc<dyn AdminNotifier>) -> Self {
        Self {
            ledger,
            notifier,
            order_id_base: DEFAULT_ORDER_ID_BASE,
            timezone: TimeZone::UTC,
            notify_timeout: DEFAULT_NOTIFY_TIMEOUT,
            commit_lock: Mutex::new(()),
        }
    }

    /// Sets the order number given to the first order.
    #[must_use]
    pub fn with_order_id_base(mut self, base: u64) -> Self {
        self.order_id_base = base;
        self
    }

    /// Sets the zone ledger timestamps are written in.
    #[must_use]
    pub fn with_timezone(mut self, timezone: TimeZone) -> Self {
        self.timezone = timezone;
        self
    }

    /// Sets how long to wait for the admin notice.
    #[must_use]
    pub fn with_notify_timeout(mut self, notify_timeout: Duration) -> Self {
        self.notify_timeout = notify_timeout;
        self
    }

    /// Commits `cart` as a new pending order, stamped with the current time.
    ///
    /// # Errors
    ///
    /// See [`OrderCommitter::commit_at`].
    pub async fn commit(
        &self,
        customer: &Customer,
        cart: &Cart,
        delivery: &Delivery,
    ) -> Result<OrderRecord, CommitError> {
        self.commit_at(customer, cart, delivery, Timestamp::now())
            .await
    }

    /// Commits `cart` as a new pending order placed at `placed_at`.
    ///
    /// The cart itself is left alone; clearing it is up to the caller once this succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`CommitError::EmptyCart`] for an empty cart, [`CommitError::LedgerUnavailable`]
    /// when the ledger cannot be counted and [`CommitError::LedgerAppendFailed`] when the append
    /// fails. Nothing has been written in any of these cases.
    pub async fn commit_at(
        &self,
        customer: &Customer,
        cart: &Cart,
        delivery: &Delivery,
        placed_at: Timestamp,
    ) -> Result<OrderRecord, CommitError> {
        if cart.is_empty() {
            return Err(CommitError::EmptyCart);
        }

        let record = {
            let _serialized = self.commit_lock.lock().await;

            let row_count = self
                .ledger
                .read_row_count()
                .await
                .map_err(CommitError::LedgerUnavailable)?;

            let record = OrderRecord {
                order_id: OrderId::new(self.order_id_base.saturating_add(row_count)),
                customer_id: customer.id,
                customer_handle: customer.ledger_handle().to_string(),
                phone: delivery.phone.clone(),
                items_summary: items_summary(cart.lines()),
                total: cart.total(),
                address: delivery.address.clone(),
                language: delivery.language,
                timestamp: placed_at
                    .to_zoned(self.timezone.clone())
                    .strftime(TIMESTAMP_FORMAT)
                    .to_string(),
                status: OrderStatus::Pending,
            };

            self.ledger
                .append_row(record.to_row())
                .await
                .map_err(|source| {
                    error!(customer = %customer.id, error = %source, "failed to append order");

                    CommitError::LedgerAppendFailed(source)
                })?;

            record
        };

        info!(
            order_id = %record.order_id,
            customer = %record.customer_id,
            total = record.total,
            "order committed"
        );

        self.notify_admin(&record).await;

        Ok(record)
    }

    async fn notify_admin(&self, record: &OrderRecord) {
        let message = record.admin_message();

        match timeout(self.notify_timeout, self.notifier.notify(&message)).await {
            Ok(Ok(())) => {}
            Ok(Err(source)) => {
                warn!(order_id = %record.order_id, error = %source, "admin notification failed");
            }
            Err(_elapsed) => {
                warn!(order_id = %record.order_id, "admin notification timed out");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use testresult::TestResult;

    use super::*;
    use crate::{
        catalog::{CatalogItem, LocalizedName},
        orders::{MockAdminNotifier, MockLedgerStore},
        store::StoreError,
    };

    fn cart() -> Cart {
        let mut cart = Cart::new();
        cart.add(
            &CatalogItem::new("F01", LocalizedName::new("Phở bò"), 50_000),
            Language::Vi,
            2,
        );
        cart
    }

    fn delivery() -> Delivery {
        Delivery {
            phone: "0900000000".to_string(),
            address: "123 Main St".to_string(),
            language: Language::Vi,
        }
    }

    fn quiet_notifier() -> MockAdminNotifier {
        let mut notifier = MockAdminNotifier::new();
        notifier.expect_notify().returning(|_| Ok(()));
        notifier
    }

    #[tokio::test]
    async fn order_id_is_base_plus_row_count() -> TestResult {
        let mut ledger = MockLedgerStore::new();
        ledger.expect_read_row_count().once().returning(|| Ok(4));
        ledger
            .expect_append_row()
            .once()
            .withf(|fields| fields.first().map(String::as_str) == Some("10005"))
            .returning(|_| Ok(()));

        let committer = OrderCommitter::new(Arc::new(ledger), Arc::new(quiet_notifier()));

        let record = committer
            .commit(&Customer::new(1), &cart(), &delivery())
            .await?;

        assert_eq!(record.order_id, OrderId::new(10_005));
        assert_eq!(record.total, 100_000);
        assert_eq!(record.status, OrderStatus::Pending);

        Ok(())
    }

    #[tokio::test]
    async fn timestamp_uses_configured_zone() -> TestResult {
        let mut ledger = MockLedgerStore::new();
        ledger.expect_read_row_count().returning(|| Ok(0));
        ledger.expect_append_row().returning(|_| Ok(()));

        let committer = OrderCommitter::new(Arc::new(ledger), Arc::new(quiet_notifier()))
            .with_timezone(TimeZone::fixed(jiff::tz::offset(7)));

        let placed_at: Timestamp = "2026-10-17T05:30:00Z".parse()?;
        let record = committer
            .commit_at(&Customer::new(1), &cart(), &delivery(), placed_at)
            .await?;

        assert_eq!(record.timestamp, "2026-10-17 12:30:00");

        Ok(())
    }

    #[tokio::test]
    async fn empty_cart_is_rejected_before_touching_the_ledger() {
        let mut ledger = MockLedgerStore::new();
        ledger.expect_read_row_count().never();
        ledger.expect_append_row().never();

        let committer = OrderCommitter::new(Arc::new(ledger), Arc::new(quiet_notifier()));

        let result = committer
            .commit(&Customer::new(1), &Cart::new(), &delivery())
            .await;

        assert!(
            matches!(result, Err(CommitError::EmptyCart)),
            "expected EmptyCart, got {result:?}"
        );
    }

    #[tokio::test]
    async fn append_failure_is_reported_and_admin_not_notified() {
        let mut ledger = MockLedgerStore::new();
        ledger.expect_read_row_count().returning(|| Ok(0));
        ledger
            .expect_append_row()
            .returning(|_| Err(StoreError::new("append order row", io::Error::other("quota"))));

        let mut notifier = MockAdminNotifier::new();
        notifier.expect_notify().never();

        let committer = OrderCommitter::new(Arc::new(ledger), Arc::new(notifier));

        let result = committer
            .commit(&Customer::new(1), &cart(), &delivery())
            .await;

        assert!(
            matches!(result, Err(CommitError::LedgerAppendFailed(_))),
            "expected LedgerAppendFailed, got {result:?}"
        );
    }

    #[tokio::test]
    async fn notifier_failure_does_not_fail_commit() -> TestResult {
        let mut ledger = MockLedgerStore::new();
        ledger.expect_read_row_count().returning(|| Ok(0));
        ledger.expect_append_row().returning(|_| Ok(()));

        let mut notifier = MockAdminNotifier::new();
        notifier
            .expect_notify()
            .once()
            .returning(|_| Err(StoreError::new("notify admin", io::Error::other("blocked"))));

        let committer = OrderCommitter::new(Arc::new(ledger), Arc::new(notifier));

        let record = committer
            .commit(&Customer::new(1), &cart(), &delivery())
            .await?;

        assert_eq!(record.order_id, OrderId::new(10_001));

        Ok(())
    }
}
