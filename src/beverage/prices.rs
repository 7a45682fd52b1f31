//! Beverage prices and the value of counted beverages.

use crate::{
    backend::BeveragePrice,
    decimal::parse_lenient_integer,
    rows::{Row, RowValue},
};

/// The price of every beverage on offer, in display order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceTable {
    prices: Vec<BeveragePrice>,
}

impl PriceTable {
    /// Create a price table. Later duplicates of a name are ignored.
    pub fn new(prices: impl IntoIterator<Item = BeveragePrice>) -> Self {
        let mut table: Vec<BeveragePrice> = Vec::new();

        for price in prices {
            if table.iter().any(|existing| existing.name == price.name) {
                tracing::warn!("ignoring duplicate price for {}", price.name);
                continue;
            }
            table.push(price);
        }

        Self { prices: table }
    }

    /// The price of `name`, zero for unknown beverages.
    pub fn price(&self, name: &str) -> f64 {
        self.prices
            .iter()
            .find(|price| price.name == name)
            .map(|price| price.price)
            .unwrap_or(0.0)
    }

    /// The beverage names in display order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.prices.iter().map(|price| price.name.as_str())
    }

    pub fn prices(&self) -> &[BeveragePrice] {
        &self.prices
    }

    /// `Σ price × quantity` over `quantities`, parsing each raw quantity leniently.
    pub fn value_of<'a>(&self, quantities: impl IntoIterator<Item = (&'a str, &'a str)>) -> f64 {
        quantities
            .into_iter()
            .map(|(name, raw)| self.price(name) * parse_lenient_integer(raw) as f64)
            .sum()
    }
}

/// Values a row by the beverages counted in its slots.
///
/// Each slot named after a beverage holds that beverage's quantity, other
/// slots are ignored.
#[derive(Debug, Clone)]
pub struct PricedQuantities(PriceTable);

impl PricedQuantities {
    pub fn new(prices: PriceTable) -> Self {
        Self(prices)
    }
}

impl RowValue for PricedQuantities {
    fn value(&self, row: &Row) -> f64 {
        self.0
            .value_of(self.0.names().map(|name| (name, row.text(name))))
    }
}
