//! The member × beverage grid, where every member's cells form a group with
//! its own sum.

use std::collections::HashMap;

use crate::{Error, backend::BeverageEntry, decimal::parse_lenient_integer};

use super::prices::PriceTable;

/// Quantities grouped by a static key, e.g. a member's e-mail address.
///
/// Each cell belongs to exactly one group and one item. Changing a cell only
/// recomputes the sum of its own group.
#[derive(Debug, Clone)]
pub struct GroupedTally {
    prices: PriceTable,
    groups: Vec<String>,
    quantities: HashMap<(usize, String), String>,
    sums: Vec<f64>,
}

impl GroupedTally {
    /// Create an empty tally with one group per key in `groups`.
    pub fn new(prices: PriceTable, groups: impl IntoIterator<Item = String>) -> Self {
        let groups: Vec<String> = groups.into_iter().collect();
        let sums = vec![0.0; groups.len()];

        Self {
            prices,
            groups,
            quantities: HashMap::new(),
            sums,
        }
    }

    /// The group keys in display order.
    pub fn groups(&self) -> &[String] {
        &self.groups
    }

    /// The position of `group` in display order.
    pub fn group_index(&self, group: &str) -> Option<usize> {
        self.groups.iter().position(|key| key == group)
    }

    pub fn prices(&self) -> &PriceTable {
        &self.prices
    }

    /// Store the raw quantity of `item` for `group` and return the group's new sum.
    ///
    /// # Errors
    /// Returns [Error::UnknownMember] if `group` is not in the tally.
    pub fn set_quantity(&mut self, group: &str, item: &str, raw: &str) -> Result<f64, Error> {
        let index = self
            .group_index(group)
            .ok_or_else(|| Error::UnknownMember(group.to_owned()))?;

        self.quantities
            .insert((index, item.to_owned()), raw.trim().to_owned());

        let sum = self.prices.value_of(
            self.quantities
                .iter()
                .filter(|((group, _), _)| *group == index)
                .map(|((_, item), raw)| (item.as_str(), raw.as_str())),
        );
        let sum = if sum.is_finite() { sum } else { 0.0 };
        self.sums[index] = sum;

        Ok(sum)
    }

    /// The raw quantity of `item` for `group`, empty if never entered.
    pub fn quantity(&self, group: &str, item: &str) -> &str {
        self.group_index(group)
            .and_then(|index| self.quantities.get(&(index, item.to_owned())))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// The sum of `group`, zero for unknown groups.
    pub fn group_sum(&self, group: &str) -> f64 {
        self.group_index(group)
            .map(|index| self.sums[index])
            .unwrap_or(0.0)
    }

    /// The sum over all groups.
    pub fn total(&self) -> f64 {
        self.sums.iter().sum()
    }

    /// One individual report entry per group and priced item with a positive count.
    pub fn entries(&self) -> Vec<BeverageEntry> {
        let mut entries = Vec::new();

        for (index, group) in self.groups.iter().enumerate() {
            for item in self.prices.names() {
                let count = self
                    .quantities
                    .get(&(index, item.to_owned()))
                    .map(|raw| parse_lenient_integer(raw))
                    .unwrap_or(0);

                if count > 0 {
                    entries.push(BeverageEntry {
                        is_event: false,
                        email: Some(group.clone()),
                        event_title: None,
                        beverage_name: item.to_owned(),
                        count,
                    });
                }
            }
        }

        entries
    }
}
