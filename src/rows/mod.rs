//! A reusable manager for forms made of repeated rows, e.g. expense lines.
//!
//! Rows are cloned from a [RowTemplate] and edited only through
//! [RowListManager::on_field_change]. After every change the manager
//! re-evaluates the row against its [CompletenessPolicy] and recomputes the
//! aggregate total from the complete rows using a [RowValue] extractor.

mod list;
pub(crate) mod markup;
mod policy;
mod template;
mod value;

pub use list::{Row, RowError, RowId, RowListManager};
pub use policy::{AlwaysComplete, CompletenessPolicy, RequireFilled, RowValue, SelectedOnly, SlotAmount};
pub use template::{FieldSlot, RowTemplate, SlotKind, TemplateSource};
pub use value::SlotValue;
