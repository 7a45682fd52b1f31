//! The rows of a list of fines and how they become backend transactions.

use crate::{
    Error,
    backend::NewTransaction,
    config::Config,
    date::{parse_display_date, to_iso},
    rows::{
        FieldSlot, RequireFilled, RowListManager, RowTemplate, SlotAmount, SlotKind,
        TemplateSource,
    },
};

/// The number of empty rows a new list starts with.
pub const INITIAL_ROWS: usize = 1;

pub const EMAIL: &str = "email";
pub const AMOUNT: &str = "amount";
pub const DESCRIPTION: &str = "description";

fn fine_template() -> RowTemplate {
    RowTemplate::new([
        FieldSlot::new(EMAIL, SlotKind::Selection),
        FieldSlot::new(AMOUNT, SlotKind::Number),
        FieldSlot::new(DESCRIPTION, SlotKind::Text),
    ])
}

/// An open list of fines.
#[derive(Debug)]
pub struct FineForm {
    rows: RowListManager,
}

impl Default for FineForm {
    fn default() -> Self {
        Self::new()
    }
}

impl FineForm {
    /// Create a list with [INITIAL_ROWS] empty rows.
    ///
    /// A fine counts towards the total once the member, amount and reason are
    /// all given.
    pub fn new() -> Self {
        let mut rows = RowListManager::new(
            RequireFilled::new([EMAIL, AMOUNT, DESCRIPTION]),
            SlotAmount::new(AMOUNT),
        );
        rows.initialize(TemplateSource::Fragment(fine_template()));

        for _ in 0..INITIAL_ROWS {
            rows.add_row();
        }

        Self { rows }
    }

    /// The fine rows.
    pub fn rows(&self) -> &RowListManager {
        &self.rows
    }

    /// The fine rows, for editing.
    pub fn rows_mut(&mut self) -> &mut RowListManager {
        &mut self.rows
    }

    /// One transaction per complete fine, dated `date` ("dd.mm.yyyy").
    ///
    /// A fine is charged to the member, so the booked amount is negative.
    /// Incomplete rows are left out.
    ///
    /// # Errors
    /// Returns [Error::NoCompleteFines] if no row is complete,
    /// [Error::UnknownMember] for a member that is not configured and
    /// [Error::InvalidForm] for a bad date or an amount that is not positive.
    pub fn transactions(&self, date: &str, config: &Config) -> Result<Vec<NewTransaction>, Error> {
        if self.rows.complete_rows().next().is_none() {
            return Err(Error::NoCompleteFines);
        }

        let date = parse_display_date(date).ok_or_else(|| {
            Error::InvalidForm(
                "Bitte das Datum der Sitzung im Format TT.MM.JJJJ angeben.".to_owned(),
            )
        })?;
        let date = to_iso(date);

        self.rows
            .complete_rows()
            .map(|row| {
                let email = row.text(EMAIL);
                if config.member(email).is_none() {
                    return Err(Error::UnknownMember(email.to_owned()));
                }

                let amount = self.rows.contribution(row);
                if amount <= 0.0 {
                    return Err(Error::InvalidForm(format!(
                        "\"{}\" ist kein gültiger Betrag.",
                        row.text(AMOUNT)
                    )));
                }

                Ok(NewTransaction {
                    email: email.to_owned(),
                    date: date.clone(),
                    amount: -amount,
                    description: format!("Strafe: {}", row.text(DESCRIPTION).trim()),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::{Error, backend::NewTransaction, test_utils::state::test_config};

    use super::{AMOUNT, DESCRIPTION, EMAIL, FineForm, INITIAL_ROWS};

    fn fill(form: &mut FineForm, index: usize, email: &str, amount: &str) {
        let id = form.rows().rows()[index].id();
        let rows = form.rows_mut();
        rows.on_field_input(id, EMAIL, email).unwrap();
        rows.on_field_input(id, AMOUNT, amount).unwrap();
        rows.on_field_input(id, DESCRIPTION, " Zu spät ").unwrap();
    }

    #[test]
    fn starts_with_one_empty_row() {
        let form = FineForm::new();

        assert_eq!(form.rows().len(), INITIAL_ROWS);
        assert_eq!(form.rows().total_display(), "0.00");
    }

    #[test]
    fn complete_rows_become_negative_transactions() {
        let mut form = FineForm::new();
        form.rows_mut().add_row();
        fill(&mut form, 0, "ben@example.com", "5,50");
        let second = form.rows().rows()[1].id();
        form.rows_mut().on_field_input(second, AMOUNT, "10").unwrap();

        let transactions = form.transactions("12.11.2024", &test_config()).unwrap();

        assert_eq!(form.rows().total_display(), "5.50");
        assert_eq!(
            transactions,
            vec![NewTransaction {
                email: "ben@example.com".to_owned(),
                date: "2024-11-12".to_owned(),
                amount: -5.5,
                description: "Strafe: Zu spät".to_owned(),
            }]
        );
    }

    #[test]
    fn no_complete_rows_is_an_error() {
        let form = FineForm::new();

        assert_eq!(
            form.transactions("12.11.2024", &test_config()).unwrap_err(),
            Error::NoCompleteFines
        );
    }

    #[test]
    fn unknown_member_is_an_error() {
        let mut form = FineForm::new();
        fill(&mut form, 0, "eve@example.com", "5");

        assert_eq!(
            form.transactions("12.11.2024", &test_config()).unwrap_err(),
            Error::UnknownMember("eve@example.com".to_owned())
        );
    }

    #[test]
    fn bad_date_or_amount_is_an_error() {
        let mut form = FineForm::new();
        fill(&mut form, 0, "anna@example.com", "5");
        assert!(matches!(
            form.transactions("2024-11-12", &test_config()),
            Err(Error::InvalidForm(_))
        ));

        fill(&mut form, 0, "anna@example.com", "abc");
        assert!(matches!(
            form.transactions("12.11.2024", &test_config()),
            Err(Error::InvalidForm(_))
        ));
    }
}
