//! The current value held by one slot of a row.

use crate::decimal::parse_lenient_decimal;

use super::template::SlotKind;

/// A slot's value as it was last entered by the user.
#[derive(Debug, Clone, PartialEq)]
pub enum SlotValue {
    /// Free text.
    Text(String),
    /// The raw text of a numeric input.
    Number(String),
    /// A date in the date picker's display format.
    Date(String),
    /// The name of an attached file, if any.
    File(Option<String>),
    /// The chosen option, if any.
    Selection(Option<String>),
}

impl SlotValue {
    /// The kind of slot this value belongs in.
    pub fn kind(&self) -> SlotKind {
        match self {
            SlotValue::Text(_) => SlotKind::Text,
            SlotValue::Number(_) => SlotKind::Number,
            SlotValue::Date(_) => SlotKind::Date,
            SlotValue::File(_) => SlotKind::FilePresence,
            SlotValue::Selection(_) => SlotKind::Selection,
        }
    }

    /// Whether the user has filled in this value.
    ///
    /// Text must contain something other than whitespace.
    pub fn is_filled(&self) -> bool {
        match self {
            SlotValue::Text(text) => !text.trim().is_empty(),
            SlotValue::Number(text) | SlotValue::Date(text) => !text.is_empty(),
            SlotValue::File(name) | SlotValue::Selection(name) => {
                name.as_deref().is_some_and(|name| !name.is_empty())
            }
        }
    }

    /// The value as text, or an empty string for absent files and selections.
    pub fn as_str(&self) -> &str {
        match self {
            SlotValue::Text(text) | SlotValue::Number(text) | SlotValue::Date(text) => text,
            SlotValue::File(name) | SlotValue::Selection(name) => name.as_deref().unwrap_or(""),
        }
    }

    /// The value parsed as a decimal number, zero when it is not numeric.
    pub fn as_decimal(&self) -> f64 {
        match self {
            SlotValue::File(_) => 0.0,
            value => parse_lenient_decimal(value.as_str()),
        }
    }
}
