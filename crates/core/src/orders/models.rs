//! Order Models

use std::fmt::{Display, Formatter, Result as FmtResult};

use crate::{carts::CartLine, customers::CustomerId, language::Language};

/// Ledger column headers, in the order [`OrderRecord::to_row`] writes them.
pub const LEDGER_COLUMNS: [&str; 10] = [
    "order_id",
    "customer_id",
    "customer_handle",
    "phone",
    "items",
    "total",
    "address",
    "language",
    "timestamp",
    "status",
];

/// Human-readable order number.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OrderId(u64);

impl OrderId {
    /// Wraps a raw order number.
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Raw order number.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        Display::fmt(&self.0, f)
    }
}

/// Fulfilment status written with a new order. Later changes belong to the shop staff.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum OrderStatus {
    /// Not yet handled
    #[default]
    Pending,
}

impl OrderStatus {
    /// Status text as stored in the ledger.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
        }
    }
}

/// A committed order, as appended to the ledger.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrderRecord {
    pub order_id: OrderId,
    pub customer_id: CustomerId,
    pub customer_handle: String,
    pub phone: String,
    pub items_summary: String,
    pub total: u64,
    pub address: String,
    pub language: Language,
    pub timestamp: String,
    pub status: OrderStatus,
}

impl OrderRecord {
    /// Ledger row; field order matches [`LEDGER_COLUMNS`].
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.order_id.to_string(),
            self.customer_id.to_string(),
            self.customer_handle.clone(),
            self.phone.clone(),
            self.items_summary.clone(),
            self.total.to_string(),
            self.address.clone(),
            self.language.code().to_string(),
            self.timestamp.clone(),
            self.status.as_str().to_string(),
        ]
    }

    /// Plain-text notice for the shop's admin chat.
    pub fn admin_message(&self) -> String {
        let customer = if self.customer_handle.is_empty() {
            self.customer_id.to_string()
        } else {
            format!("{} ({})", self.customer_handle, self.customer_id)
        };

        format!(
            "New order #{}\nCustomer: {customer}\nPhone: {}\nAddress: {}\nItems: {}\nTotal: {}đ\nPlaced: {}",
            self.order_id, self.phone, self.address, self.items_summary, self.total, self.timestamp
        )
    }
}

/// Joins cart lines into `"name x quantity"` pairs, e.g. `"Phở bò x2, Trà đá x1"`.
pub fn items_summary(lines: &[CartLine]) -> String {
    lines
        .iter()
        .map(|line| format!("{} x{}", line.name, line.quantity))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ItemId;

    fn record() -> OrderRecord {
        OrderRecord {
            order_id: OrderId::new(10_001),
            customer_id: CustomerId::new(42),
            customer_handle: "@an".to_string(),
            phone: "0900000000".to_string(),
            items_summary: "Phở bò x2".to_string(),
            total: 100_000,
            address: "123 Main St".to_string(),
            language: Language::Vi,
            timestamp: "2026-10-17 12:00:00".to_string(),
            status: OrderStatus::Pending,
        }
    }

    #[test]
    fn row_follows_ledger_column_order() {
        let row = record().to_row();

        assert_eq!(row.len(), LEDGER_COLUMNS.len());
        assert_eq!(
            row,
            [
                "10001",
                "42",
                "@an",
                "0900000000",
                "Phở bò x2",
                "100000",
                "123 Main St",
                "vi",
                "2026-10-17 12:00:00",
                "pending",
            ]
        );
    }

    #[test]
    fn items_summary_joins_lines() {
        let lines = [
            CartLine {
                item_id: ItemId::new("F01"),
                name: "Phở bò".to_string(),
                unit_price: 50_000,
                quantity: 2,
            },
            CartLine {
                item_id: ItemId::new("D01"),
                name: "Trà đá".to_string(),
                unit_price: 5_000,
                quantity: 1,
            },
        ];

        assert_eq!(items_summary(&lines), "Phở bò x2, Trà đá x1");
        assert_eq!(items_summary(&[]), "");
    }

    #[test]
    fn admin_message_mentions_order_and_customer() {
        let message = record().admin_message();

        assert!(message.contains("#10001"), "missing order id: {message}");
        assert!(message.contains("@an (42)"), "missing customer: {message}");
        assert!(message.contains("100000đ"), "missing total: {message}");
    }
}
