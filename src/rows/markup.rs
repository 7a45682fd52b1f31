//! Shared markup for rendering rows.
//!
//! Rows are found in the page through two markers: `data-row-id` on the
//! element grouping a row's fields, and `data-role="<slot name>"` on each
//! field. Handlers target these markers, never the page layout.
//!
//! Row endpoints answer with out-of-band swaps only, see [crate::alert].

use maud::{Markup, html};
use serde::Deserialize;

use super::{Row, RowId};

/// The form sent when a single field of a row changes.
///
/// Field inputs are named `value` and carry their slot name in `hx-vals`,
/// see [slot_vals].
#[derive(Debug, Clone, Deserialize)]
pub struct FieldEdit {
    /// The name of the edited slot.
    pub slot: String,
    /// The raw input value.
    #[serde(default)]
    pub value: String,
}

/// The `hx-vals` attribute telling the edit handler which slot an input belongs to.
pub fn slot_vals(slot: &str) -> String {
    serde_json::json!({ "slot": slot }).to_string()
}

/// Classes for a field whose slot is filled.
pub const FILLED_STYLE: &str = "border-green-500 dark:border-green-400";

/// Classes for a row that counts towards the total.
pub const COMPLETE_ROW_STYLE: &str = "bg-green-50 dark:bg-green-900/20";

/// The DOM ID of the element grouping the fields of `row` in the list `list`.
pub fn row_dom_id(list: &str, row: RowId) -> String {
    format!("{list}-row-{row}")
}

/// The DOM ID of the filled indicator of `slot` in `row`.
pub fn indicator_dom_id(list: &str, row: RowId, slot: &str) -> String {
    format!("{list}-row-{row}-{slot}-filled")
}

/// A small marker showing whether a field is filled.
///
/// Set `oob` when the indicator is sent as an out-of-band swap after an edit.
pub fn filled_indicator(list: &str, row: RowId, slot: &str, filled: bool, oob: bool) -> Markup {
    let style = if filled {
        "text-green-600 dark:text-green-400"
    } else {
        "text-gray-300 dark:text-gray-600"
    };

    html! {
        span
            id=(indicator_dom_id(list, row, slot))
            data-role=(format!("{slot}-filled"))
            data-filled=(filled)
            hx-swap-oob=[oob.then_some("true")]
            class={ "text-xs " (style) }
            aria-hidden="true"
        {
            "●"
        }
    }
}

/// Shows whether `row` counts towards the total.
pub fn row_status(list: &str, row: &Row, oob: bool) -> Markup {
    html! {
        span
            id=(format!("{}-status", row_dom_id(list, row.id())))
            data-role="complete"
            data-complete=(row.is_complete())
            hx-swap-oob=[oob.then_some("true")]
            class="w-4 text-green-600 dark:text-green-400"
            title=[row.is_complete().then_some("Vollständig")]
        {
            @if row.is_complete() { "✓" }
        }
    }
}

/// The aggregate total of a list, formatted with two decimals.
pub fn total_view(dom_id: &str, total: &str, oob: bool) -> Markup {
    html! {
        span
            id=(dom_id)
            data-role="total"
            hx-swap-oob=[oob.then_some("true")]
            class="font-semibold tabular-nums"
        {
            (total)
        }
    }
}

/// Append `row` to the element with the ID `container_id`.
pub fn append_row(container_id: &str, row: Markup) -> Markup {
    html! {
        div hx-swap-oob=(format!("beforeend:#{container_id}")) { (row) }
    }
}

/// Remove the element grouping the fields of `row`.
pub fn remove_row(list: &str, row: RowId) -> Markup {
    html! {
        div id=(row_dom_id(list, row)) hx-swap-oob="delete" {}
    }
}

/// The indicator of the edited `slot`, the row's status and the list's total
/// after an edit.
pub fn edit_feedback(list: &str, row: &Row, slot: &str, total_dom_id: &str, total: &str) -> Markup {
    html! {
        (filled_indicator(list, row.id(), slot, row.is_filled(slot), true))
        (row_status(list, row, true))
        (total_view(total_dom_id, total, true))
    }
}
