//! Multi-product order form: per-field quantity bounds, live summary, and
//! the pre-submit gate. The backend repeats every check.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use thiserror::Error;

use crate::domain::product::leading_integer;

pub const DEFAULT_MIN: i64 = 0;
pub const DEFAULT_MAX: i64 = 999_999;
pub const DEFAULT_LABEL: &str = "Product";

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct QuantityField {
    pub label: String,
    pub min: i64,
    pub max: i64,
    pub unit_price: Decimal,
}

impl Default for QuantityField {
    fn default() -> Self {
        Self {
            label: DEFAULT_LABEL.to_owned(),
            min: DEFAULT_MIN,
            max: DEFAULT_MAX,
            unit_price: Decimal::ZERO,
        }
    }
}

impl QuantityField {
    pub fn new(label: impl Into<String>, max: i64, unit_price: Decimal) -> Self {
        Self { label: label.into(), max, unit_price, ..Self::default() }
    }

    /// Rewrites raw input the way the field does on every keystroke: blank
    /// stays blank, junk becomes 0, numbers are clamped into `[min, max]`.
    pub fn normalize_input(&self, raw: &str) -> String {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return String::new();
        }

        let value = leading_integer(trimmed).unwrap_or(0);
        value.max(self.min).min(self.max).to_string()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuantityEntry {
    pub field: QuantityField,
    pub value: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct OrderSummary {
    pub kinds: usize,
    pub total_qty: i64,
    pub total_price: Decimal,
    pub picked: Vec<(String, i64)>,
}

impl OrderSummary {
    pub fn is_empty(&self) -> bool {
        self.total_qty == 0
    }

    pub fn text(&self) -> String {
        if self.is_empty() {
            return "No products selected yet.".to_owned();
        }

        let picked: Vec<String> =
            self.picked.iter().map(|(label, qty)| format!("{label} x {qty}")).collect();
        format!(
            "Selected {} products, {} items: {}",
            self.kinds,
            self.total_qty,
            picked.join(", ")
        )
    }

    /// `None` means the total line is hidden.
    pub fn total_text(&self) -> Option<String> {
        (!self.is_empty()).then(|| format!("Total: ${}", format_amount(self.total_price)))
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum OrderFormError {
    #[error("{label} quantity cannot be less than {min}.")]
    BelowMinimum { label: String, min: i64 },
    #[error("{label} quantity cannot exceed stock (at most {max}).")]
    AboveStock { label: String, max: i64 },
    #[error("Select a quantity greater than 0 for at least one product.")]
    NothingSelected,
    #[error("The order is too large to total.")]
    TotalTooLarge,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OrderForm {
    entries: Vec<QuantityEntry>,
}

impl OrderForm {
    pub fn new(fields: Vec<QuantityField>) -> Self {
        Self {
            entries: fields
                .into_iter()
                .map(|field| QuantityEntry { field, value: String::new() })
                .collect(),
        }
    }

    pub fn entries(&self) -> &[QuantityEntry] {
        &self.entries
    }

    /// Applies a keystroke to field `index` and returns the normalized text,
    /// or `None` for an unknown field.
    pub fn input(&mut self, index: usize, raw: &str) -> Option<&str> {
        let entry = self.entries.get_mut(index)?;
        entry.value = entry.field.normalize_input(raw);
        Some(entry.value.as_str())
    }

    /// Sets the field text without normalization, as a pasted or scripted
    /// value would arrive.
    pub fn set_raw(&mut self, index: usize, raw: impl Into<String>) {
        if let Some(entry) = self.entries.get_mut(index) {
            entry.value = raw.into();
        }
    }

    /// Live summary of the picked products. Fails only when the quantities
    /// or the price total no longer fit their types.
    pub fn summary(&self) -> Result<OrderSummary, OrderFormError> {
        let mut summary = OrderSummary {
            kinds: 0,
            total_qty: 0,
            total_price: Decimal::ZERO,
            picked: Vec::new(),
        };

        for entry in &self.entries {
            let qty = leading_integer(entry.value.trim()).unwrap_or(0);
            if qty > 0 {
                summary.total_qty =
                    summary.total_qty.checked_add(qty).ok_or(OrderFormError::TotalTooLarge)?;
                summary.total_price = entry
                    .field
                    .unit_price
                    .checked_mul(Decimal::from(qty))
                    .and_then(|line| summary.total_price.checked_add(line))
                    .ok_or(OrderFormError::TotalTooLarge)?;
                summary.picked.push((entry.field.label.clone(), qty));
            }
        }
        summary.kinds = summary.picked.len();
        Ok(summary)
    }

    /// Pre-submit gate. Returns the total quantity when the form may be sent.
    /// With several offending fields the last one is reported.
    pub fn validate(&self) -> Result<i64, OrderFormError> {
        let mut total_qty: i64 = 0;
        let mut invalid = None;

        for entry in &self.entries {
            let field = &entry.field;
            let qty = leading_integer(entry.value.trim()).unwrap_or(0);

            if qty < field.min {
                invalid =
                    Some(OrderFormError::BelowMinimum { label: field.label.clone(), min: field.min });
            }
            if qty > field.max {
                invalid =
                    Some(OrderFormError::AboveStock { label: field.label.clone(), max: field.max });
            }
            total_qty = total_qty.checked_add(qty).ok_or(OrderFormError::TotalTooLarge)?;
        }

        if let Some(error) = invalid {
            return Err(error);
        }
        if total_qty == 0 {
            return Err(OrderFormError::NothingSelected);
        }
        Ok(total_qty)
    }
}

/// Formats an amount with thousands separators and at most three fraction
/// digits, rounding half away from zero: `1234.5678` becomes `1,234.568`.
pub fn format_amount(amount: Decimal) -> String {
    let rendered = amount
        .round_dp_with_strategy(3, RoundingStrategy::MidpointAwayFromZero)
        .normalize()
        .to_string();
    let (sign, unsigned) = match rendered.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", rendered.as_str()),
    };
    let (integer, fraction) = match unsigned.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (unsigned, None),
    };

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (position, digit) in integer.chars().enumerate() {
        if position > 0 && (integer.len() - position) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    match fraction {
        Some(fraction) => format!("{sign}{grouped}.{fraction}"),
        None => format!("{sign}{grouped}"),
    }
}
