//! Pluggable rules deciding which rows count towards a list's total and what
//! each of them contributes.

use super::list::Row;

/// Decides whether a row is complete, i.e. whether it contributes to the
/// aggregate total.
pub trait CompletenessPolicy: Send + Sync {
    /// Whether `row` is complete.
    fn is_complete(&self, row: &Row) -> bool;
}

impl<F> CompletenessPolicy for F
where
    F: Fn(&Row) -> bool + Send + Sync,
{
    fn is_complete(&self, row: &Row) -> bool {
        self(row)
    }
}

/// A row is complete once all of the listed slots are filled.
#[derive(Debug, Clone)]
pub struct RequireFilled(Vec<String>);

impl RequireFilled {
    /// Require every slot in `slots` to be filled.
    pub fn new<S: Into<String>>(slots: impl IntoIterator<Item = S>) -> Self {
        Self(slots.into_iter().map(Into::into).collect())
    }
}

impl CompletenessPolicy for RequireFilled {
    fn is_complete(&self, row: &Row) -> bool {
        self.0.iter().all(|slot| row.is_filled(slot))
    }
}

/// Every row is complete.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysComplete;

impl CompletenessPolicy for AlwaysComplete {
    fn is_complete(&self, _row: &Row) -> bool {
        true
    }
}

/// A row is complete while the user has it selected.
#[derive(Debug, Clone, Copy, Default)]
pub struct SelectedOnly;

impl CompletenessPolicy for SelectedOnly {
    fn is_complete(&self, row: &Row) -> bool {
        row.is_selected()
    }
}

/// Extracts the number a row adds to the aggregate total.
pub trait RowValue: Send + Sync {
    /// The contribution of `row`. Must be finite.
    fn value(&self, row: &Row) -> f64;
}

impl<F> RowValue for F
where
    F: Fn(&Row) -> f64 + Send + Sync,
{
    fn value(&self, row: &Row) -> f64 {
        self(row)
    }
}

/// The lenient decimal value of a single slot.
#[derive(Debug, Clone)]
pub struct SlotAmount(String);

impl SlotAmount {
    /// Sum the slot called `slot`.
    pub fn new(slot: impl Into<String>) -> Self {
        Self(slot.into())
    }
}

impl RowValue for SlotAmount {
    fn value(&self, row: &Row) -> f64 {
        row.value(&self.0).map(|value| value.as_decimal()).unwrap_or(0.0)
    }
}
