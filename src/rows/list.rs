//! The row list manager: owns the rows of one form, keeps each row's
//! completeness up to date and recomputes the aggregate total after every
//! change.

use std::{collections::HashMap, fmt};

use serde::{Deserialize, Serialize};

use crate::decimal::format_fixed;

use super::{
    policy::{CompletenessPolicy, RowValue},
    template::{RowTemplate, SlotKind, TemplateSource},
    value::SlotValue,
};

/// Identifies a row within its list for the list's whole lifetime.
///
/// IDs come from a counter and are never reused, even after the row is removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowId(u64);

impl RowId {
    /// Wrap a raw ID, e.g. one parsed from a URL.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// The raw ID.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The errors that may occur when editing a row.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum RowError {
    /// The row does not exist, e.g. because it was removed.
    #[error("there is no row with the ID {0}")]
    UnknownRow(RowId),

    /// The row template has no slot with the given name.
    #[error("the row template has no slot called \"{0}\"")]
    UnknownSlot(String),

    /// The new value does not match the slot's kind.
    #[error("slot \"{slot}\" holds {expected:?} values, got a {got:?} value")]
    KindMismatch {
        /// The slot that was edited.
        slot: String,
        /// The kind declared by the template.
        expected: SlotKind,
        /// The kind of the rejected value.
        got: SlotKind,
    },
}

/// One entry in a row list.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    id: RowId,
    values: HashMap<String, SlotValue>,
    complete: bool,
    selected: bool,
}

impl Row {
    /// The row's ID.
    pub fn id(&self) -> RowId {
        self.id
    }

    /// The current value of `slot`.
    pub fn value(&self, slot: &str) -> Option<&SlotValue> {
        self.values.get(slot)
    }

    /// The current value of `slot` as text, empty if the slot does not exist.
    pub fn text(&self, slot: &str) -> &str {
        self.value(slot).map(SlotValue::as_str).unwrap_or("")
    }

    /// Whether `slot` is filled, which drives the field's "filled" indicator.
    pub fn is_filled(&self, slot: &str) -> bool {
        self.value(slot).is_some_and(SlotValue::is_filled)
    }

    /// Whether the row satisfied the list's completeness policy after its last change.
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Whether the user has selected the row.
    pub fn is_selected(&self) -> bool {
        self.selected
    }
}

/// Owns an ordered list of rows cloned from one template.
///
/// Every change goes through the manager so that each row's completeness and
/// the aggregate total always match the rows' current values.
pub struct RowListManager {
    template: Option<RowTemplate>,
    rows: Vec<Row>,
    next_id: u64,
    total: f64,
    policy: Box<dyn CompletenessPolicy>,
    row_value: Box<dyn RowValue>,
}

impl fmt::Debug for RowListManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RowListManager")
            .field("template", &self.template)
            .field("rows", &self.rows)
            .field("next_id", &self.next_id)
            .field("total", &self.total)
            .finish_non_exhaustive()
    }
}

impl RowListManager {
    /// Create an empty, uninitialized manager.
    ///
    /// `policy` decides which rows count towards the total and `row_value`
    /// decides how much each of them adds.
    pub fn new(
        policy: impl CompletenessPolicy + 'static,
        row_value: impl RowValue + 'static,
    ) -> Self {
        Self {
            template: None,
            rows: Vec::new(),
            next_id: 1,
            total: 0.0,
            policy: Box::new(policy),
            row_value: Box::new(row_value),
        }
    }

    /// Store the template new rows are cloned from.
    ///
    /// Only the first call has an effect, later calls are ignored and return
    /// `false`.
    pub fn initialize(&mut self, source: TemplateSource) -> bool {
        if self.template.is_some() {
            tracing::warn!("row list is already initialized, ignoring new template");
            return false;
        }

        self.template = Some(source.into_template());
        true
    }

    /// Append a new row with every slot empty and return its ID.
    ///
    /// Does nothing and returns `None` if the manager has not been initialized.
    pub fn add_row(&mut self) -> Option<RowId> {
        let template = self.template.as_ref()?;

        let id = RowId(self.next_id);
        self.next_id += 1;

        let mut row = Row {
            id,
            values: template.empty_values(),
            complete: false,
            selected: false,
        };
        row.complete = self.policy.is_complete(&row);

        self.rows.push(row);
        self.recompute_total();

        Some(id)
    }

    /// Remove the row `id` and return it.
    ///
    /// Removing a row that does not exist does nothing and returns `None`.
    pub fn remove_row(&mut self, id: RowId) -> Option<Row> {
        let index = self.index_of(id)?;
        let row = self.rows.remove(index);
        self.recompute_total();

        Some(row)
    }

    /// Set `slot` of row `id` to `value`.
    ///
    /// This is the only way to edit a row's values. The row's completeness
    /// and the total are recomputed before returning the edited row.
    ///
    /// Does nothing and returns `Ok(None)` if the manager has not been
    /// initialized.
    ///
    /// # Errors
    /// Returns an error, leaving every row unchanged, if the row or slot does
    /// not exist or `value` is the wrong kind for the slot.
    pub fn on_field_change(
        &mut self,
        id: RowId,
        slot: &str,
        value: SlotValue,
    ) -> Result<Option<&Row>, RowError> {
        if self.template.is_none() {
            return Ok(None);
        }

        let expected = self.slot_kind(slot)?;
        if value.kind() != expected {
            return Err(RowError::KindMismatch {
                slot: slot.to_owned(),
                expected,
                got: value.kind(),
            });
        }

        let index = self.index_of(id).ok_or(RowError::UnknownRow(id))?;
        self.rows[index].values.insert(slot.to_owned(), value);
        self.refresh(index);

        Ok(Some(&self.rows[index]))
    }

    /// Like [RowListManager::on_field_change], converting the raw form input
    /// according to the slot's kind.
    ///
    /// # Errors
    /// Returns an error if the row or slot does not exist.
    pub fn on_field_input(
        &mut self,
        id: RowId,
        slot: &str,
        raw: &str,
    ) -> Result<Option<&Row>, RowError> {
        if self.template.is_none() {
            return Ok(None);
        }

        let value = self.slot_kind(slot)?.value_from_input(raw);

        self.on_field_change(id, slot, value)
    }

    /// Set whether row `id` is selected.
    ///
    /// Returns `None` if the row does not exist.
    pub fn set_selected(&mut self, id: RowId, selected: bool) -> Option<&Row> {
        let index = self.index_of(id)?;
        self.rows[index].selected = selected;
        self.refresh(index);

        Some(&self.rows[index])
    }

    /// Flip whether row `id` is selected.
    ///
    /// Returns `None` if the row does not exist.
    pub fn toggle_selected(&mut self, id: RowId) -> Option<&Row> {
        let selected = self.row(id)?.selected;

        self.set_selected(id, !selected)
    }

    /// The rows in display order.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Look up a row by ID.
    pub fn row(&self, id: RowId) -> Option<&Row> {
        self.rows.iter().find(|row| row.id == id)
    }

    /// The rows that currently satisfy the completeness policy.
    pub fn complete_rows(&self) -> impl Iterator<Item = &Row> {
        self.rows.iter().filter(|row| row.complete)
    }

    /// The number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the list has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// What `row` would add to the total if it were complete.
    pub fn contribution(&self, row: &Row) -> f64 {
        finite_or_zero(self.row_value.value(row))
    }

    /// The sum of the contributions of all complete rows.
    pub fn total(&self) -> f64 {
        self.total
    }

    /// The total formatted with two decimal places, e.g. "12.50".
    pub fn total_display(&self) -> String {
        format_fixed(self.total)
    }

    fn slot_kind(&self, slot: &str) -> Result<SlotKind, RowError> {
        self.template
            .as_ref()
            .and_then(|template| template.slot(slot))
            .map(|slot| slot.kind())
            .ok_or_else(|| RowError::UnknownSlot(slot.to_owned()))
    }

    fn index_of(&self, id: RowId) -> Option<usize> {
        self.rows.iter().position(|row| row.id == id)
    }

    fn refresh(&mut self, index: usize) {
        let complete = self.policy.is_complete(&self.rows[index]);
        self.rows[index].complete = complete;
        self.recompute_total();
    }

    fn recompute_total(&mut self) {
        self.total = self
            .rows
            .iter()
            .filter(|row| row.complete)
            .map(|row| finite_or_zero(self.row_value.value(row)))
            .sum();
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}
