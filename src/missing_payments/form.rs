//! Detecting unpaid months and the selection of payments to book.

use std::collections::{HashMap, HashSet};

use time::Date;

use crate::{
    Error,
    backend::{MissingPayment, Transaction},
    config::MonthlyFees,
    date::{months_between, to_iso},
    decimal::format_fixed,
    member::Member,
    rows::{
        FieldSlot, Row, RowError, RowId, RowListManager, RowTemplate, SelectedOnly, SlotAmount,
        SlotKind, TemplateSource,
    },
};

/// The slot holding a payment's chosen amount.
pub const AMOUNT: &str = "amount";

/// Transactions whose description starts with this pay for the month they are booked in.
pub const CONTRIBUTION_PREFIX: &str = "Monthly contribution for";

/// The number of recorded contributions shown before the rest is collapsed.
pub const VISIBLE_CONTRIBUTIONS: usize = 2;

/// Whether `transaction` is a booked monthly contribution.
pub fn is_contribution(transaction: &Transaction) -> bool {
    transaction.description.starts_with(CONTRIBUTION_PREFIX)
}

/// "yyyy-mm", matching the start of an ISO date.
fn month_key(date: Date) -> String {
    format!("{:04}-{:02}", date.year(), u8::from(date.month()))
}

/// The first day of every month from the member's creation up to `today`
/// without a booked contribution.
///
/// Members who do not pay contributions owe nothing.
pub fn missing_months(member: &Member, transactions: &[Transaction], today: Date) -> Vec<Date> {
    if !member.pays_contributions() {
        return Vec::new();
    }

    let paid: HashSet<&str> = transactions
        .iter()
        .filter(|transaction| is_contribution(transaction))
        .filter_map(|transaction| transaction.date.get(..7))
        .collect();

    months_between(member.created_at, today)
        .into_iter()
        .filter(|month| !paid.contains(month_key(*month).as_str()))
        .collect()
}

/// A month a member still has to pay for.
#[derive(Debug, Clone, PartialEq)]
pub struct DueMonth {
    /// The member's e-mail address.
    pub email: String,
    /// The first day of the month.
    pub month: Date,
}

/// One member's card on the page.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberDues {
    /// The member's e-mail address.
    pub email: String,
    /// "First Last".
    pub name: String,
    /// The rows of the member's unpaid months, oldest first.
    pub rows: Vec<RowId>,
    /// The member's booked contributions, oldest first.
    pub recorded: Vec<Transaction>,
}

impl MemberDues {
    /// The most recent contributions, shown without expanding the card.
    pub fn latest_contributions(&self) -> &[Transaction] {
        let start = self.recorded.len().saturating_sub(VISIBLE_CONTRIBUTIONS);
        &self.recorded[start..]
    }

    /// The older contributions, collapsed by default.
    pub fn older_contributions(&self) -> &[Transaction] {
        let end = self.recorded.len().saturating_sub(VISIBLE_CONTRIBUTIONS);
        &self.recorded[..end]
    }
}

/// The open selection of missing payments.
///
/// Only selected rows count towards the total and get booked. While a row is
/// selected its amount cannot be changed.
#[derive(Debug)]
pub struct MissingPaymentsForm {
    rows: RowListManager,
    due: HashMap<RowId, DueMonth>,
    members: Vec<MemberDues>,
    fees: MonthlyFees,
    choices: Vec<String>,
}

impl MissingPaymentsForm {
    /// Create an empty selection offering both of `fees` as amounts.
    pub fn new(fees: MonthlyFees) -> Self {
        let mut rows = RowListManager::new(SelectedOnly, SlotAmount::new(AMOUNT));
        rows.initialize(TemplateSource::Fragment(RowTemplate::new([FieldSlot::new(
            AMOUNT,
            SlotKind::Selection,
        )])));

        let mut choices = vec![format_fixed(fees.resident)];
        let non_resident = format_fixed(fees.non_resident);
        if !choices.contains(&non_resident) {
            choices.push(non_resident);
        }

        Self {
            rows,
            due: HashMap::new(),
            members: Vec::new(),
            fees,
            choices,
        }
    }

    /// Add a card for `member` with a row for every unpaid month up to `today`.
    ///
    /// Each row defaults to the fee matching the member's residency.
    pub fn add_member(
        &mut self,
        member: &Member,
        transactions: &[Transaction],
        today: Date,
    ) -> Result<(), Error> {
        let amount = format_fixed(self.fees.for_member(member.is_resident));
        let mut rows = Vec::new();

        for month in missing_months(member, transactions, today) {
            let id = self.rows.add_row().ok_or(Error::NotFound)?;
            self.rows.on_field_input(id, AMOUNT, &amount)?;
            self.due.insert(
                id,
                DueMonth {
                    email: member.email.clone(),
                    month,
                },
            );
            rows.push(id);
        }

        let mut recorded: Vec<Transaction> = transactions
            .iter()
            .filter(|transaction| is_contribution(transaction))
            .cloned()
            .collect();
        recorded.sort_by(|a, b| a.date.cmp(&b.date));

        tracing::debug!("{} has {} unpaid months", member.email, rows.len());
        self.members.push(MemberDues {
            email: member.email.clone(),
            name: member.full_name(),
            rows,
            recorded,
        });

        Ok(())
    }

    /// The member cards in display order.
    pub fn members(&self) -> &[MemberDues] {
        &self.members
    }

    /// The amounts a payment may be booked with, e.g. "15.00".
    pub fn choices(&self) -> &[String] {
        &self.choices
    }

    pub fn rows(&self) -> &RowListManager {
        &self.rows
    }

    /// The month row `id` stands for.
    pub fn due(&self, id: RowId) -> Option<&DueMonth> {
        self.due.get(&id)
    }

    /// Change the amount of row `id` to one of the [MissingPaymentsForm::choices].
    ///
    /// # Errors
    /// Returns [Error::AmountLocked] while the row is selected and
    /// [Error::InvalidForm] for an amount that is not on offer.
    pub fn set_amount(&mut self, id: RowId, raw: &str) -> Result<&Row, Error> {
        let selected = self
            .rows
            .row(id)
            .ok_or(RowError::UnknownRow(id))?
            .is_selected();
        if selected {
            return Err(Error::AmountLocked(id));
        }

        let amount = raw.trim();
        if !self.choices.iter().any(|choice| choice == amount) {
            return Err(Error::InvalidForm(format!(
                "\"{amount}\" ist kein gültiger Betrag."
            )));
        }

        self.rows
            .on_field_input(id, AMOUNT, amount)?
            .ok_or(Error::InvalidRowEdit(RowError::UnknownRow(id)))
    }

    /// Select or deselect row `id`.
    pub fn toggle(&mut self, id: RowId) -> Result<&Row, Error> {
        self.rows
            .toggle_selected(id)
            .ok_or(Error::InvalidRowEdit(RowError::UnknownRow(id)))
    }

    /// The selected payments in display order.
    pub fn payload(&self) -> Vec<MissingPayment> {
        self.rows
            .complete_rows()
            .filter_map(|row| {
                let due = self.due.get(&row.id())?;

                Some(MissingPayment {
                    email: due.email.clone(),
                    date: to_iso(due.month),
                    amount: row.text(AMOUNT).to_owned(),
                })
            })
            .collect()
    }
}
