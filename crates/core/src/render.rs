use std::fmt;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::cart::Cart;
use crate::domain::product::ProductId;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CartRow {
    pub index: usize,
    pub product_id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub qty: u32,
    pub subtotal: Decimal,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CartTable {
    pub rows: Vec<CartRow>,
    pub total: Decimal,
}

/// Projects the cart into its display table. Every row and the total are
/// recomputed from the cart on each call.
pub fn render_cart(cart: &Cart) -> CartTable {
    let rows: Vec<CartRow> = cart
        .lines()
        .iter()
        .enumerate()
        .map(|(index, line)| CartRow {
            index,
            product_id: line.id,
            name: line.name.clone(),
            price: line.price,
            qty: line.qty,
            subtotal: line.subtotal().unwrap_or(Decimal::MAX),
        })
        .collect();
    let total = cart.total();

    CartTable { rows, total }
}

impl CartTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// `<tr>` rows for the cart body; names are escaped.
    pub fn to_html_rows(&self) -> String {
        self.rows
            .iter()
            .map(|row| {
                format!(
                    "<tr><td>{}</td><td>${}</td><td>{}</td><td>${}</td>\
                     <td><button type=\"button\" data-remove-index=\"{}\" class=\"btn-danger\">Remove</button></td></tr>",
                    escape_html(&row.name),
                    row.price,
                    row.qty,
                    row.subtotal,
                    row.index
                )
            })
            .collect()
    }
}

impl fmt::Display for CartTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.rows.is_empty() {
            writeln!(f, "(cart is empty)")?;
            return write!(f, "total: $0");
        }

        let name_width =
            self.rows.iter().map(|row| row.name.chars().count()).max().unwrap_or(0).max(4);
        writeln!(f, "{:>3}  {:<name_width$}  {:>10}  {:>5}  {:>12}", "#", "name", "price", "qty", "subtotal")?;
        for row in &self.rows {
            writeln!(
                f,
                "{:>3}  {:<name_width$}  {:>10}  {:>5}  {:>12}",
                row.index,
                row.name,
                format!("${}", row.price),
                row.qty,
                format!("${}", row.subtotal)
            )?;
        }
        write!(f, "total: ${}", self.total)
    }
}

pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use crate::domain::cart::Cart;
    use crate::domain::product::{Product, ProductId};

    use super::{escape_html, render_cart};

    fn cart_with(lines: &[(i64, &str, i64, u32)]) -> Cart {
        let mut cart = Cart::default();
        for (id, name, price, qty) in lines {
            let product = Product {
                id: ProductId(*id),
                name: (*name).to_owned(),
                base_price: Decimal::new(*price, 0),
                stock: 100,
            };
            cart.merge(&product, *qty).expect("small test carts fit");
        }
        cart
    }

    #[test]
    fn render_is_idempotent() {
        let cart = cart_with(&[(1, "Widget", 100, 2), (2, "Gadget", 50, 1)]);

        let first = render_cart(&cart);
        let second = render_cart(&cart);

        assert_eq!(first, second);
        assert_eq!(first.to_string(), second.to_string());
        assert_eq!(first.to_html_rows(), second.to_html_rows());
    }

    #[test]
    fn total_matches_sum_of_subtotals() {
        let table = render_cart(&cart_with(&[(1, "Widget", 100, 2), (2, "Gadget", 50, 1)]));

        assert_eq!(table.rows[0].subtotal, Decimal::new(200, 0));
        assert_eq!(table.total, Decimal::new(250, 0));
        assert!(table.to_string().ends_with("total: $250"));
    }

    #[test]
    fn html_rows_escape_product_names() {
        let table = render_cart(&cart_with(&[(1, "<b>Bold</b> & co", 5, 1)]));
        let html = table.to_html_rows();

        assert!(html.contains("&lt;b&gt;Bold&lt;/b&gt; &amp; co"));
        assert!(html.contains("data-remove-index=\"0\""));
    }

    #[test]
    fn empty_cart_renders_zero_total() {
        let table = render_cart(&Cart::default());

        assert!(table.is_empty());
        assert_eq!(table.total, Decimal::ZERO);
        assert_eq!(table.to_html_rows(), "");
    }

    #[test]
    fn escape_html_covers_quotes() {
        assert_eq!(escape_html(r#"a"b'c"#), "a&quot;b&#39;c");
    }
}
