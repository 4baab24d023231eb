use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub i64);

impl ProductId {
    /// Parses the value of a product selection control.
    ///
    /// Mirrors how a select widget reports "nothing chosen": an empty value, a
    /// non-numeric value, or the placeholder id `0` all yield `None`.
    pub fn parse_selection(raw: &str) -> Option<Self> {
        let value = leading_integer(raw)?;
        (value != 0).then_some(Self(value))
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Catalog entry as served by `GET /api/products`.
///
/// The stock figure is a snapshot taken when the catalog was fetched; the
/// backend may have a different number by the time an order is submitted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub base_price: Decimal,
    #[serde(rename = "total")]
    pub stock: i64,
}

impl Product {
    pub fn in_stock(&self) -> bool {
        self.stock > 0
    }
}

/// One entry of the product selection control.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ProductOption {
    pub value: ProductId,
    pub label: String,
    pub disabled: bool,
}

impl From<&Product> for ProductOption {
    fn from(product: &Product) -> Self {
        Self {
            value: product.id,
            label: format!(
                "{} (stock: {}) - ${}",
                product.name, product.stock, product.base_price
            ),
            disabled: !product.in_stock(),
        }
    }
}

/// Integer prefix parsing with `parseInt` semantics: optional sign, then
/// digits, trailing garbage ignored.
pub(crate) fn leading_integer(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    let (sign, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };

    let end = digits.find(|ch: char| !ch.is_ascii_digit()).unwrap_or(digits.len());
    if end == 0 {
        return None;
    }

    digits[..end].parse::<i64>().ok().map(|value| sign * value)
}
