//! The immutable prototype that every row in a list is cloned from.

use std::collections::HashMap;

use super::value::SlotValue;

/// The kind of input backing a [FieldSlot].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotKind {
    /// Free text, e.g. a description.
    Text,
    /// A numeric input holding the raw text the user typed.
    Number,
    /// A date picker value in the display format.
    Date,
    /// A file input where only the presence of an attachment matters.
    FilePresence,
    /// A choice from a fixed list of options.
    Selection,
}

impl SlotKind {
    /// The empty value for this kind of slot.
    pub fn empty_value(self) -> SlotValue {
        match self {
            SlotKind::Text => SlotValue::Text(String::new()),
            SlotKind::Number => SlotValue::Number(String::new()),
            SlotKind::Date => SlotValue::Date(String::new()),
            SlotKind::FilePresence => SlotValue::File(None),
            SlotKind::Selection => SlotValue::Selection(None),
        }
    }

    /// Convert raw form input into a value of this kind.
    ///
    /// For file slots `raw` is the attached file name, an empty string meaning
    /// no file.
    pub fn value_from_input(self, raw: &str) -> SlotValue {
        let non_empty = || (!raw.is_empty()).then(|| raw.to_owned());

        match self {
            SlotKind::Text => SlotValue::Text(raw.to_owned()),
            SlotKind::Number => SlotValue::Number(raw.trim().to_owned()),
            SlotKind::Date => SlotValue::Date(raw.trim().to_owned()),
            SlotKind::FilePresence => SlotValue::File(non_empty()),
            SlotKind::Selection => SlotValue::Selection(non_empty()),
        }
    }
}

/// One named input in a row.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSlot {
    name: String,
    kind: SlotKind,
}

impl FieldSlot {
    /// Create a slot called `name` of the given `kind`.
    pub fn new(name: impl Into<String>, kind: SlotKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    /// The slot's name, also used as its `data-role` marker in HTML.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The kind of input backing the slot.
    pub fn kind(&self) -> SlotKind {
        self.kind
    }
}

/// The ordered set of slots that make up one row.
///
/// A template has no mutators, its slot set is fixed once it is built.
#[derive(Debug, Clone, PartialEq)]
pub struct RowTemplate {
    slots: Vec<FieldSlot>,
}

impl RowTemplate {
    /// Create a template from `slots`, keeping their order.
    ///
    /// Later slots with a name that was already used are dropped.
    pub fn new(slots: impl IntoIterator<Item = FieldSlot>) -> Self {
        let mut unique: Vec<FieldSlot> = Vec::new();

        for slot in slots {
            if unique.iter().any(|existing| existing.name == slot.name) {
                tracing::warn!("ignoring duplicate slot \"{}\" in row template", slot.name);
                continue;
            }

            unique.push(slot);
        }

        Self { slots: unique }
    }

    /// The slots in display order.
    pub fn slots(&self) -> &[FieldSlot] {
        &self.slots
    }

    /// Look up a slot by name.
    pub fn slot(&self, name: &str) -> Option<&FieldSlot> {
        self.slots.iter().find(|slot| slot.name == name)
    }

    /// A fresh set of values with every slot empty.
    pub fn empty_values(&self) -> HashMap<String, SlotValue> {
        self.slots
            .iter()
            .map(|slot| (slot.name.clone(), slot.kind.empty_value()))
            .collect()
    }
}

/// Where a row list takes its template from.
#[derive(Debug, Clone)]
pub enum TemplateSource {
    /// A predefined fragment with no example data.
    Fragment(RowTemplate),
    /// A row captured from existing markup, still carrying its example data.
    ///
    /// The values are never copied into new rows.
    CapturedRow {
        /// The shape of the captured row.
        template: RowTemplate,
        /// Whatever the captured row contained at capture time.
        values: HashMap<String, SlotValue>,
    },
}

impl TemplateSource {
    pub(crate) fn into_template(self) -> RowTemplate {
        match self {
            TemplateSource::Fragment(template) => template,
            TemplateSource::CapturedRow { template, values } => {
                tracing::debug!(
                    "discarding {} example values from captured row template",
                    values.len()
                );
                template
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{FieldSlot, RowTemplate, SlotKind};
    use crate::rows::SlotValue;

    #[test]
    fn keeps_slot_order_and_drops_duplicates() {
        let template = RowTemplate::new([
            FieldSlot::new("description", SlotKind::Text),
            FieldSlot::new("amount", SlotKind::Number),
            FieldSlot::new("description", SlotKind::Date),
        ]);

        let names: Vec<_> = template.slots().iter().map(FieldSlot::name).collect();
        assert_eq!(names, ["description", "amount"]);
        assert_eq!(
            template.slot("description").map(FieldSlot::kind),
            Some(SlotKind::Text)
        );
    }

    #[test]
    fn empty_values_cover_every_slot() {
        let template = RowTemplate::new([
            FieldSlot::new("receipt", SlotKind::FilePresence),
            FieldSlot::new("amount", SlotKind::Selection),
        ]);

        let values = template.empty_values();

        assert_eq!(values.len(), 2);
        assert_eq!(values["receipt"], SlotValue::File(None));
        assert_eq!(values["amount"], SlotValue::Selection(None));
    }

    #[test]
    fn input_conversion_treats_empty_files_as_absent() {
        assert_eq!(
            SlotKind::FilePresence.value_from_input(""),
            SlotValue::File(None)
        );
        assert_eq!(
            SlotKind::FilePresence.value_from_input("receipt.pdf"),
            SlotValue::File(Some("receipt.pdf".to_owned()))
        );
        assert_eq!(
            SlotKind::Number.value_from_input(" 12.50 "),
            SlotValue::Number("12.50".to_owned())
        );
    }
}
