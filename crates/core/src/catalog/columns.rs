//! Catalog column normalization.
//!
//! Menu sheets are maintained by hand, so headers come in several spellings. Each canonical
//! column declares the header names it accepts, in priority order; headers are compared after
//! trimming and lowercasing.

use rustc_hash::FxHashMap;

use crate::catalog::{CatalogItem, ItemId, ItemStatus, LocalizedName, RawRow, RowError};

/// Canonical catalog columns.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Column {
    /// Item id
    Id,

    /// Vietnamese display name
    NameVi,

    /// English display name
    NameEn,

    /// Unit price
    Price,

    /// Availability
    Status,
}

/// Accepted header spellings per canonical column.
pub const COLUMN_ALIASES: &[(Column, &[&str])] = &[
    (
        Column::Id,
        &["id", "item_id", "item id", "code", "ma", "mã", "ma_mon", "mã món"],
    ),
    (
        Column::NameVi,
        &["name_vi", "name", "ten", "tên", "ten_mon", "tên món"],
    ),
    (
        Column::NameEn,
        &["name_en", "english_name", "english name", "ten_en"],
    ),
    (
        Column::Price,
        &["price", "unit_price", "gia", "giá", "don_gia", "đơn giá"],
    ),
    (
        Column::Status,
        &["status", "state", "trang_thai", "trạng thái"],
    ),
];

/// Currency suffixes tolerated after a price.
const CURRENCY_SUFFIXES: &[&str] = &["vnđ", "vnd", "₫", "đ"];

/// Characters used as thousands separators in price cells.
const THOUSANDS_SEPARATORS: &[char] = &[',', '.', ' ', '\u{a0}', '_', '\''];

/// Result of normalizing one raw row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NormalizedRow {
    /// A listed or sold out item.
    Item(CatalogItem),

    /// The row's status is not one we know; it is neither listed nor addable.
    Filtered {
        /// Item id
        id: String,

        /// Raw status cell
        status: String,
    },
}

/// Row cells keyed by canonical column. Blank cells are left out.
#[derive(Debug, Default)]
pub struct ResolvedRow<'a> {
    cells: FxHashMap<Column, &'a str>,
}

impl<'a> ResolvedRow<'a> {
    /// Resolves a raw row against [`COLUMN_ALIASES`].
    pub fn resolve(row: &'a RawRow) -> Self {
        let by_header: FxHashMap<String, &str> = row
            .iter()
            .map(|(header, value)| (header.trim().to_lowercase(), value.trim()))
            .filter(|(_, value)| !value.is_empty())
            .collect();

        let cells = COLUMN_ALIASES
            .iter()
            .filter_map(|(column, aliases)| {
                aliases
                    .iter()
                    .find_map(|alias| by_header.get(*alias))
                    .map(|value| (*column, *value))
            })
            .collect();

        Self { cells }
    }

    /// Non-blank cell for a column.
    pub fn get(&self, column: Column) -> Option<&'a str> {
        self.cells.get(&column).copied()
    }
}

/// Normalizes one raw catalog row.
///
/// # Errors
///
/// Returns a [`RowError`] when the id, the name or the price is missing or invalid.
pub fn normalize_row(row: &RawRow) -> Result<NormalizedRow, RowError> {
    let resolved = ResolvedRow::resolve(row);

    let id = resolved.get(Column::Id).ok_or(RowError::MissingId)?;

    let name = match (resolved.get(Column::NameVi), resolved.get(Column::NameEn)) {
        (Some(vi), Some(en)) => LocalizedName::new(vi).with_en(en),
        (Some(vi), None) => LocalizedName::new(vi),
        (None, Some(en)) => LocalizedName::new(en).with_en(en),
        (None, None) => return Err(RowError::MissingName { id: id.to_string() }),
    };

    let raw_price = resolved.get(Column::Price).unwrap_or_default();
    let price = parse_price(raw_price).ok_or_else(|| RowError::InvalidPrice {
        id: id.to_string(),
        value: raw_price.to_string(),
    })?;

    let raw_status = resolved.get(Column::Status).unwrap_or_default();

    let Some(status) = ItemStatus::parse(raw_status) else {
        return Ok(NormalizedRow::Filtered {
            id: id.to_string(),
            status: raw_status.to_string(),
        });
    };

    Ok(NormalizedRow::Item(CatalogItem {
        id: ItemId::new(id),
        name,
        price,
        status,
    }))
}

/// Parses a price cell into đồng, e.g. `"50000"`, `"50.000"`, `"50,000 ₫"`, `"50000.00"`.
///
/// A trailing group of one or two digits after `.` or `,` is a fractional part and must be zero,
/// since prices are whole đồng. Longer groups are thousands.
pub fn parse_price(raw: &str) -> Option<u64> {
    let lowered = raw.trim().to_lowercase();

    let amount = CURRENCY_SUFFIXES
        .iter()
        .find_map(|suffix| lowered.strip_suffix(*suffix))
        .unwrap_or(&lowered)
        .trim();

    let whole = strip_zero_fraction(amount)?;

    let digits: String = whole
        .chars()
        .filter(|c| !THOUSANDS_SEPARATORS.contains(c))
        .collect();

    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    digits.parse().ok()
}

/// Drops a zero fractional part; `None` when the fraction is not zero.
fn strip_zero_fraction(amount: &str) -> Option<&str> {
    let Some(at) = amount.rfind(['.', ',']) else {
        return Some(amount);
    };

    let (whole, fraction) = amount.split_at_checked(at)?;
    let fraction = fraction.get(1..).unwrap_or_default();

    let is_fraction =
        (1..=2).contains(&fraction.len()) && fraction.chars().all(|c| c.is_ascii_digit());

    if !is_fraction {
        return Some(amount);
    }

    fraction.chars().all(|c| c == '0').then_some(whole)
}
