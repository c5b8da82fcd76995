//! Catalog
//!
//! The menu as read from the catalog store. Items are loaded fresh for every query and are never
//! modified here.

use std::fmt::{Display, Formatter, Result as FmtResult};

use crate::language::Language;

pub mod columns;
pub mod errors;
pub mod reader;

pub use errors::{CatalogError, LookupError, RowError};
pub use reader::{CatalogReader, CatalogStore, MockCatalogStore, RawRow};

/// Catalog item identifier, e.g. `"F01"` or `"7"`.
///
/// Ids are opaque and compared case-insensitively.
#[derive(Clone, Debug, Eq)]
pub struct ItemId(String);

impl ItemId {
    /// Creates an id from its catalog spelling.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into().trim().to_string())
    }

    /// Returns the id as written in the catalog.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive comparison against user input.
    pub fn matches(&self, input: &str) -> bool {
        self.0.to_lowercase() == input.trim().to_lowercase()
    }
}

impl PartialEq for ItemId {
    fn eq(&self, other: &Self) -> bool {
        self.matches(&other.0)
    }
}

impl Display for ItemId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}

/// Display names of an item.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LocalizedName {
    vi: String,
    en: Option<String>,
}

impl LocalizedName {
    /// Creates a name with only the Vietnamese spelling.
    pub fn new(vi: impl Into<String>) -> Self {
        Self {
            vi: vi.into(),
            en: None,
        }
    }

    /// Adds the English spelling.
    #[must_use]
    pub fn with_en(mut self, en: impl Into<String>) -> Self {
        self.en = Some(en.into());
        self
    }

    /// Name in the given language. English falls back to Vietnamese.
    pub fn get(&self, language: Language) -> &str {
        match language {
            Language::Vi => &self.vi,
            Language::En => self.en.as_deref().unwrap_or(&self.vi),
        }
    }
}

/// Availability of a catalog item.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ItemStatus {
    /// Listed and orderable
    Active,

    /// Known but currently unavailable; hidden from listings and rejected on add
    SoldOut,
}

impl ItemStatus {
    /// Parses a status cell. Blank means [`ItemStatus::Active`]; unknown values yield `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized: String = raw
            .trim()
            .to_lowercase()
            .chars()
            .map(|c| if c == ' ' || c == '-' { '_' } else { c })
            .collect();

        match normalized.as_str() {
            "" | "active" => Some(Self::Active),
            "sold_out" | "soldout" => Some(Self::SoldOut),
            _ => None,
        }
    }
}

/// A normalized catalog row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CatalogItem {
    /// Item id
    pub id: ItemId,

    /// Display names
    pub name: LocalizedName,

    /// Unit price in đồng
    pub price: u64,

    /// Availability
    pub status: ItemStatus,
}

impl CatalogItem {
    /// Creates an active item.
    pub fn new(id: impl Into<String>, name: LocalizedName, price: u64) -> Self {
        Self {
            id: ItemId::new(id),
            name,
            price,
            status: ItemStatus::Active,
        }
    }

    /// Overrides the item status.
    #[must_use]
    pub fn with_status(mut self, status: ItemStatus) -> Self {
        self.status = status;
        self
    }

    /// Whether the item shows up in listings and can be added to a cart.
    pub fn is_orderable(&self) -> bool {
        self.status == ItemStatus::Active
    }
}

/// One snapshot of the catalog.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Catalog {
    items: Vec<CatalogItem>,
}

impl Catalog {
    /// Creates a catalog from normalized items.
    pub fn new(items: Vec<CatalogItem>) -> Self {
        Self { items }
    }

    /// Items shown to customers, in catalog order.
    pub fn listing(&self) -> impl Iterator<Item = &CatalogItem> {
        self.items.iter().filter(|item| item.is_orderable())
    }

    /// Number of orderable items.
    pub fn orderable_count(&self) -> usize {
        self.listing().count()
    }

    /// First item whose id matches `id`, regardless of status.
    pub fn find(&self, id: &str) -> Option<&CatalogItem> {
        self.items.iter().find(|item| item.id.matches(id))
    }

    /// Resolves an id typed by a customer to an item they may add.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::NotFound`] for unknown ids and [`LookupError::SoldOut`] for items
    /// that exist but cannot be ordered right now.
    pub fn resolve_orderable(&self, id: &str) -> Result<&CatalogItem, LookupError> {
        let item = self
            .find(id)
            .ok_or_else(|| LookupError::NotFound(id.trim().to_string()))?;

        if item.is_orderable() {
            Ok(item)
        } else {
            Err(LookupError::SoldOut(Box::new(item.clone())))
        }
    }

    /// All items, including sold out ones.
    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }
}
