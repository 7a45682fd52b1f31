//! The expense rows of a reimbursement request and how they become a backend request.

use serde::Deserialize;

use crate::{
    Error,
    backend::{RefundType, ReimbursementItem, ReimbursementRequest},
    date::display_to_iso,
    rows::{FieldSlot, RequireFilled, RowListManager, RowTemplate, SlotAmount, SlotKind, TemplateSource},
};

/// Descriptions offered as suggestions for every expense.
pub const DESCRIPTION_PRESETS: [&str; 5] = [
    "Fahrtkosten",
    "Getränke",
    "Veranstaltungsausgaben",
    "Materialkosten",
    "Büromaterial",
];

/// The number of empty rows a new form starts with.
pub const INITIAL_ROWS: usize = 3;

pub const DESCRIPTION: &str = "description";
pub const DATE: &str = "date";
pub const AMOUNT: &str = "amount";
pub const RECEIPT: &str = "receipt";

fn expense_template() -> RowTemplate {
    RowTemplate::new([
        FieldSlot::new(DESCRIPTION, SlotKind::Text),
        FieldSlot::new(DATE, SlotKind::Date),
        FieldSlot::new(AMOUNT, SlotKind::Number),
        FieldSlot::new(RECEIPT, SlotKind::FilePresence),
    ])
}

/// An open reimbursement form.
#[derive(Debug)]
pub struct ReimbursementForm {
    rows: RowListManager,
}

impl Default for ReimbursementForm {
    fn default() -> Self {
        Self::new()
    }
}

impl ReimbursementForm {
    /// Create a form with [INITIAL_ROWS] empty expense rows.
    ///
    /// An expense counts towards the total once its description, date,
    /// amount and receipt are all given.
    pub fn new() -> Self {
        let mut rows = RowListManager::new(
            RequireFilled::new([DESCRIPTION, DATE, AMOUNT, RECEIPT]),
            SlotAmount::new(AMOUNT),
        );
        rows.initialize(TemplateSource::Fragment(expense_template()));

        for _ in 0..INITIAL_ROWS {
            rows.add_row();
        }

        Self { rows }
    }

    /// The expense rows.
    pub fn rows(&self) -> &RowListManager {
        &self.rows
    }

    /// The expense rows, for editing.
    pub fn rows_mut(&mut self) -> &mut RowListManager {
        &mut self.rows
    }

    /// The complete expenses in the backend's format.
    ///
    /// Incomplete rows are left out.
    ///
    /// # Errors
    /// Returns [Error::NoCompleteRows] if no row is complete and
    /// [Error::InvalidForm] if a complete row has a malformed date.
    pub fn items(&self) -> Result<Vec<ReimbursementItem>, Error> {
        let items = self
            .rows
            .complete_rows()
            .map(|row| {
                let date = display_to_iso(row.text(DATE)).ok_or_else(|| {
                    Error::InvalidForm(format!(
                        "\"{}\" ist kein gültiges Datum (TT.MM.JJJJ).",
                        row.text(DATE)
                    ))
                })?;

                Ok(ReimbursementItem {
                    description: row.text(DESCRIPTION).trim().to_owned(),
                    date,
                    amount: self.rows.contribution(row),
                    receipt: row.text(RECEIPT).to_owned(),
                })
            })
            .collect::<Result<Vec<_>, Error>>()?;

        if items.is_empty() {
            return Err(Error::NoCompleteRows);
        }

        Ok(items)
    }
}

/// The request details entered below the expense rows.
#[derive(Debug, Clone, Deserialize)]
pub struct ReimbursementSubmission {
    pub email: String,
    #[serde(default)]
    pub refund_type: RefundType,
    #[serde(default)]
    pub bank_name: String,
    #[serde(default)]
    pub iban: String,
}

impl ReimbursementSubmission {
    /// Combine the details with the complete expenses.
    ///
    /// Bank details are only sent for bank refunds.
    ///
    /// # Errors
    /// Returns [Error::InvalidForm] if the e-mail address is missing or a
    /// bank refund lacks the bank name or IBAN.
    pub fn into_request(self, items: Vec<ReimbursementItem>) -> Result<ReimbursementRequest, Error> {
        let email = self.email.trim().to_owned();
        if email.is_empty() {
            return Err(Error::InvalidForm("Bitte eine E-Mail-Adresse angeben.".to_owned()));
        }

        let (bank_name, iban) = match self.refund_type {
            RefundType::Cc => (None, None),
            RefundType::Bank => {
                let bank_name = self.bank_name.trim().to_owned();
                let iban: String = self.iban.split_whitespace().collect();

                if bank_name.is_empty() || iban.is_empty() {
                    return Err(Error::InvalidForm(
                        "Bitte Bankname und IBAN angeben.".to_owned(),
                    ));
                }

                (Some(bank_name), Some(iban))
            }
        };

        Ok(ReimbursementRequest {
            email,
            refund_type: self.refund_type,
            bank_name,
            iban,
            items,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        Error,
        backend::{RefundType, ReimbursementItem},
    };

    use super::{AMOUNT, DATE, DESCRIPTION, INITIAL_ROWS, RECEIPT, ReimbursementForm, ReimbursementSubmission};

    fn fill(form: &mut ReimbursementForm, index: usize, amount: &str) {
        let id = form.rows().rows()[index].id();
        let rows = form.rows_mut();
        rows.on_field_input(id, DESCRIPTION, "Fahrtkosten").unwrap();
        rows.on_field_input(id, DATE, "14.03.2024").unwrap();
        rows.on_field_input(id, AMOUNT, amount).unwrap();
        rows.on_field_input(id, RECEIPT, "ticket.pdf").unwrap();
    }

    fn submission(refund_type: RefundType) -> ReimbursementSubmission {
        ReimbursementSubmission {
            email: "anna@example.com".to_owned(),
            refund_type,
            bank_name: " Sparkasse ".to_owned(),
            iban: "DE89 3704 0044 0532 0130 00".to_owned(),
        }
    }

    #[test]
    fn starts_with_three_empty_rows() {
        let form = ReimbursementForm::new();

        assert_eq!(form.rows().len(), INITIAL_ROWS);
        assert_eq!(form.rows().total_display(), "0.00");
    }

    #[test]
    fn items_contain_only_complete_rows() {
        let mut form = ReimbursementForm::new();
        fill(&mut form, 1, "12.50");
        let first = form.rows().rows()[0].id();
        form.rows_mut().on_field_input(first, AMOUNT, "99").unwrap();

        let items = form.items().unwrap();

        assert_eq!(
            items,
            vec![ReimbursementItem {
                description: "Fahrtkosten".to_owned(),
                date: "2024-03-14".to_owned(),
                amount: 12.5,
                receipt: "ticket.pdf".to_owned(),
            }]
        );
    }

    #[test]
    fn no_complete_rows_is_an_error() {
        let form = ReimbursementForm::new();

        assert_eq!(form.items().unwrap_err(), Error::NoCompleteRows);
    }

    #[test]
    fn malformed_date_is_an_error() {
        let mut form = ReimbursementForm::new();
        fill(&mut form, 0, "5");
        let id = form.rows().rows()[0].id();
        form.rows_mut().on_field_input(id, DATE, "14/03/2024").unwrap();

        assert!(matches!(form.items(), Err(Error::InvalidForm(_))));
    }

    #[test]
    fn card_refund_drops_bank_details() {
        let request = submission(RefundType::Cc).into_request(Vec::new()).unwrap();

        assert_eq!(request.bank_name, None);
        assert_eq!(request.iban, None);
    }

    #[test]
    fn bank_refund_keeps_normalized_bank_details() {
        let request = submission(RefundType::Bank)
            .into_request(Vec::new())
            .unwrap();

        assert_eq!(request.bank_name.as_deref(), Some("Sparkasse"));
        assert_eq!(request.iban.as_deref(), Some("DE89370400440532013000"));
    }

    #[test]
    fn bank_refund_requires_iban() {
        let mut submission = submission(RefundType::Bank);
        submission.iban = "  ".to_owned();

        assert!(matches!(
            submission.into_request(Vec::new()),
            Err(Error::InvalidForm(_))
        ));
    }
}
