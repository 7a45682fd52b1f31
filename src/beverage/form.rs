//! A beverage report in progress: the member tally and the event rows.

use crate::{
    Error,
    backend::{BeverageEntry, BeverageReport},
    date::display_to_iso,
    decimal::parse_lenient_integer,
    rows::{AlwaysComplete, FieldSlot, RowListManager, RowTemplate, SlotKind, TemplateSource},
};

use super::{
    prices::{PriceTable, PricedQuantities},
    tally::GroupedTally,
};

/// The slot holding an event's title. Every other slot is a beverage.
pub const TITLE: &str = "title";

/// The number of empty event rows a new report starts with.
pub const INITIAL_EVENT_ROWS: usize = 2;

/// An open beverage report.
#[derive(Debug)]
pub struct BeverageForm {
    tally: GroupedTally,
    events: RowListManager,
}

impl BeverageForm {
    /// Create an empty report for `members` with [INITIAL_EVENT_ROWS] event rows.
    pub fn new(prices: PriceTable, members: impl IntoIterator<Item = String>) -> Self {
        let template = RowTemplate::new(
            std::iter::once(FieldSlot::new(TITLE, SlotKind::Text)).chain(
                prices
                    .names()
                    .map(|name| FieldSlot::new(name, SlotKind::Number)),
            ),
        );

        let mut events = RowListManager::new(AlwaysComplete, PricedQuantities::new(prices.clone()));
        events.initialize(TemplateSource::Fragment(template));
        for _ in 0..INITIAL_EVENT_ROWS {
            events.add_row();
        }

        Self {
            tally: GroupedTally::new(prices, members),
            events,
        }
    }

    pub fn tally(&self) -> &GroupedTally {
        &self.tally
    }

    pub fn tally_mut(&mut self) -> &mut GroupedTally {
        &mut self.tally
    }

    /// The event rows, each valued by its beverages.
    pub fn events(&self) -> &RowListManager {
        &self.events
    }

    pub fn events_mut(&mut self) -> &mut RowListManager {
        &mut self.events
    }

    /// Build the report for `report_date`, given as "dd.mm.yyyy".
    ///
    /// Returns `None` if no beverage was counted.
    ///
    /// # Errors
    /// Returns [Error::MissingReportDate] if the date is blank and
    /// [Error::InvalidForm] if it cannot be parsed.
    pub fn report(&self, report_date: &str) -> Result<Option<BeverageReport>, Error> {
        let report_date = report_date.trim();
        if report_date.is_empty() {
            return Err(Error::MissingReportDate);
        }

        let report_date = display_to_iso(report_date).ok_or_else(|| {
            Error::InvalidForm(format!(
                "\"{report_date}\" ist kein gültiges Datum (TT.MM.JJJJ)."
            ))
        })?;

        let mut entries = self.tally.entries();
        entries.extend(self.event_entries());

        if entries.is_empty() {
            return Ok(None);
        }

        Ok(Some(BeverageReport {
            report_date,
            prices: self.tally.prices().prices().to_vec(),
            entries,
        }))
    }

    fn event_entries(&self) -> Vec<BeverageEntry> {
        let prices = self.tally.prices();
        let mut entries = Vec::new();

        for row in self.events.complete_rows() {
            let title = row.text(TITLE).trim();

            for name in prices.names() {
                let count = parse_lenient_integer(row.text(name));

                if count > 0 {
                    entries.push(BeverageEntry {
                        is_event: true,
                        email: None,
                        event_title: Some(title.to_owned()),
                        beverage_name: name.to_owned(),
                        count,
                    });
                }
            }
        }

        entries
    }
}
