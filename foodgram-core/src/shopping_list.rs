//! Shopping-list aggregation over the recipes in a user's cart.

use crate::error::ShoppingListError;
use serde::Serialize;
use std::collections::BTreeMap;

/// One ingredient row of one recipe in the cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    pub name: String,
    pub measurement_unit: String,
    pub amount: i64,
}

impl CartLine {
    pub fn new(name: impl Into<String>, measurement_unit: impl Into<String>, amount: i64) -> Self {
        Self {
            name: name.into(),
            measurement_unit: measurement_unit.into(),
            amount,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShoppingListEntry {
    pub name: String,
    pub measurement_unit: String,
    pub total_amount: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShoppingList {
    entries: Vec<ShoppingListEntry>,
}

pub const HEADER: &str = "Shopping list:";

impl ShoppingList {
    /// Groups by (name, unit) and sums amounts. Entries come out sorted by
    /// name, then unit, so the result does not depend on row order.
    ///
    /// `cart_recipes` is the number of recipes in the cart. Zero is
    /// [`ShoppingListError::EmptyCart`]; recipes without ingredients still
    /// produce a list, just an empty one.
    pub fn aggregate(
        cart_recipes: usize,
        lines: impl IntoIterator<Item = CartLine>,
    ) -> Result<Self, ShoppingListError> {
        if cart_recipes == 0 {
            return Err(ShoppingListError::EmptyCart);
        }

        let mut totals: BTreeMap<(String, String), i64> = BTreeMap::new();
        for line in lines {
            *totals
                .entry((line.name, line.measurement_unit))
                .or_insert(0) += line.amount;
        }

        let entries = totals
            .into_iter()
            .map(|((name, measurement_unit), total_amount)| ShoppingListEntry {
                name,
                measurement_unit,
                total_amount,
            })
            .collect();

        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[ShoppingListEntry] {
        &self.entries
    }

    /// Plain-text body of the download: a header, a blank line, then one
    /// `- {name}, ({unit}) - {total}` line per entry.
    pub fn render(&self) -> String {
        let mut out = format!("{}\n\n", HEADER);
        for entry in &self.entries {
            out.push_str(&format!(
                "- {}, ({}) - {}\n",
                entry.name, entry.measurement_unit, entry.total_amount
            ));
        }
        out
    }
}

/// Attachment name offered to the browser.
pub fn attachment_filename(username: &str) -> String {
    let safe: String = username
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || "._-".contains(c) { c } else { '_' })
        .collect();
    format!("{}_shopping_list.txt", safe)
}
