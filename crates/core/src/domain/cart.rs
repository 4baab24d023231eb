use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::product::{Product, ProductId};
use crate::errors::InputError;

/// A cart entry. Name and price are copied from the catalog snapshot when
/// the product is first added and are not refreshed afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub id: ProductId,
    pub name: String,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub price: Decimal,
    pub qty: u32,
}

impl CartLine {
    pub fn from_product(product: &Product, qty: u32) -> Self {
        Self { id: product.id, name: product.name.clone(), price: product.base_price, qty }
    }

    /// `None` when price times quantity does not fit in a `Decimal`.
    pub fn subtotal(&self) -> Option<Decimal> {
        self.price.checked_mul(Decimal::from(self.qty))
    }
}

/// Ordered cart lines; insertion order is display order and there is at
/// most one line per product id.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn line(&self, product_id: ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.id == product_id)
    }

    pub fn quantity_of(&self, product_id: ProductId) -> u32 {
        self.line(product_id).map(|line| line.qty).unwrap_or(0)
    }

    /// Adds `qty` units of `product`, merging into the existing line if the
    /// product is already in the cart. The cart is left untouched when the
    /// merged quantity or the cart total would no longer be representable.
    pub fn merge(&mut self, product: &Product, qty: u32) -> Result<(), InputError> {
        let too_large = InputError::TotalTooLarge { product_id: product.id };
        let position = self.lines.iter().position(|line| line.id == product.id);

        let mut candidate = match position {
            Some(index) => self.lines[index].clone(),
            None => CartLine::from_product(product, 0),
        };
        candidate.qty = candidate.qty.checked_add(qty).ok_or_else(|| too_large.clone())?;

        let others = self
            .lines
            .iter()
            .enumerate()
            .filter(|(index, _)| Some(*index) != position)
            .try_fold(Decimal::ZERO, |sum, (_, line)| sum.checked_add(line.subtotal()?));
        candidate
            .subtotal()
            .zip(others)
            .and_then(|(subtotal, others)| others.checked_add(subtotal))
            .ok_or(too_large)?;

        match position {
            Some(index) => self.lines[index] = candidate,
            None => self.lines.push(candidate),
        }
        Ok(())
    }

    pub fn remove(&mut self, index: usize) -> Option<CartLine> {
        (index < self.lines.len()).then(|| self.lines.remove(index))
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Sum of line subtotals. `merge` keeps this representable; a cart
    /// deserialized from elsewhere that overflows reports `Decimal::MAX`.
    pub fn total(&self) -> Decimal {
        self.lines
            .iter()
            .try_fold(Decimal::ZERO, |sum, line| sum.checked_add(line.subtotal()?))
            .unwrap_or(Decimal::MAX)
    }
}
