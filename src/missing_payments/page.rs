//! The missing payments page: every member's unpaid months, selected and
//! booked in one go.

use std::sync::Arc;

use axum::{
    Form,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use axum_htmx::HxRefresh;
use maud::{Markup, html};

use crate::{
    AppState, Error,
    alert::Alert,
    backend::{BackendClient, Transaction},
    config::Config,
    date::{parse_any_date, to_display, to_iso, to_month_display, today},
    decimal::format_fixed,
    endpoints::{self, format_endpoint},
    html::{
        BUTTON_SECONDARY_STYLE, CARD_HEADER_STYLE, CARD_STYLE, FORM_TEXT_INPUT_STYLE,
        PAGE_CONTAINER_STYLE, base, submit_button,
    },
    member::{SharedRoster, lock_roster},
    navigation::NavBar,
    rows::{
        Row, RowError, RowId,
        markup::{COMPLETE_ROW_STYLE, FieldEdit, row_dom_id, slot_vals, total_view},
    },
    store::{FormId, SharedFormStore, lock_forms, with_form},
};

use super::form::{AMOUNT, MemberDues, MissingPaymentsForm};

const LIST: &str = "payment";
const TOTAL_ID: &str = "payment-total";
const PAYMENT_ROW_STYLE: &str = "flex items-center gap-4 p-2 rounded";

/// The state needed for the missing payments page.
#[derive(Debug, Clone)]
pub struct MissingPaymentsState {
    pub forms: SharedFormStore<MissingPaymentsForm>,
    pub backend: BackendClient,
    pub config: Arc<Config>,
    pub members: SharedRoster,
}

impl FromRef<AppState> for MissingPaymentsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            forms: state.missing_payment_forms.clone(),
            backend: state.backend.clone(),
            config: state.config.clone(),
            members: state.members.clone(),
        }
    }
}

/// Render the missing payments of every paying member.
///
/// Fetches each member's transactions from the backend.
pub async fn get_missing_payments_page(State(state): State<MissingPaymentsState>) -> Response {
    match open_form(&state).await {
        Ok(markup) => markup.into_response(),
        Err(error) => error.into_response(),
    }
}

async fn open_form(state: &MissingPaymentsState) -> Result<Markup, Error> {
    let members: Vec<_> = lock_roster(&state.members)?
        .iter()
        .filter(|member| member.pays_contributions())
        .cloned()
        .collect();

    let today = today();
    let mut form = MissingPaymentsForm::new(state.config.fees);

    for member in &members {
        let transactions = state.backend.get_transactions(&member.email).await?;
        form.add_member(member, &transactions, today)?;
    }

    let mut forms = lock_forms(&state.forms)?;
    let form_id = forms.insert(form);
    let form = forms.get(form_id).ok_or(Error::UnknownForm(form_id))?;

    Ok(missing_payments_view(form_id, form))
}

/// Change the amount of an unselected payment.
pub async fn update_payment_amount(
    State(state): State<MissingPaymentsState>,
    Path((form_id, row_id)): Path<(FormId, RowId)>,
    Form(edit): Form<FieldEdit>,
) -> Response {
    let result = with_form(&state.forms, form_id, |form| {
        if edit.slot != AMOUNT {
            return Err(RowError::UnknownSlot(edit.slot.clone()).into());
        }

        form.set_amount(row_id, &edit.value)?;

        Ok(total_view(TOTAL_ID, &form.rows().total_display(), true))
    });

    match result {
        Ok(markup) => markup.into_response(),
        Err(error) => error.into_alert_response(),
    }
}

/// Select or deselect a payment and re-render its row.
pub async fn toggle_payment(
    State(state): State<MissingPaymentsState>,
    Path((form_id, row_id)): Path<(FormId, RowId)>,
) -> Response {
    let result = with_form(&state.forms, form_id, |form| {
        let row = form.toggle(row_id)?.clone();

        Ok(html! {
            (payment_row_view(form_id, form, &row, true))
            (total_view(TOTAL_ID, &form.rows().total_display(), true))
        })
    });

    match result {
        Ok(markup) => markup.into_response(),
        Err(error) => error.into_alert_response(),
    }
}

/// Book the selected payments and reload the page on success.
///
/// Nothing is sent if no payment is selected.
pub async fn submit_missing_payments(
    State(state): State<MissingPaymentsState>,
    Path(form_id): Path<FormId>,
) -> Response {
    match submit(&state, form_id).await {
        Ok(response) => response,
        Err(error) => error.into_alert_response(),
    }
}

async fn submit(state: &MissingPaymentsState, form_id: FormId) -> Result<Response, Error> {
    let (payload, _guard) = {
        let forms = lock_forms(&state.forms)?;
        let form = forms.get(form_id).ok_or(Error::UnknownForm(form_id))?;
        let payload = form.payload();

        if payload.is_empty() {
            return Ok(Alert::ErrorSimple {
                message: "Keine Zahlungen ausgewählt.".to_owned(),
            }
            .into_response());
        }

        (payload, forms.begin_submission(form_id)?)
    };

    if !state.backend.save_missing_payments(&payload).await? {
        return Err(Error::PaymentsNotSaved);
    }

    tracing::info!("booked {} missing payments", payload.len());

    Ok((
        HxRefresh(true),
        Alert::SuccessSimple {
            message: format!("{} Zahlungen gespeichert.", payload.len()),
        },
    )
        .into_response())
}

fn missing_payments_view(form_id: FormId, form: &MissingPaymentsForm) -> Markup {
    let nav_bar = NavBar::new(endpoints::MISSING_PAYMENTS_VIEW).into_html();
    let submit_endpoint = format_endpoint(endpoints::MISSING_PAYMENTS_SUBMIT, &[form_id.as_u64()]);

    let content = html! {
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-4xl space-y-6"
            {
                h1 class="text-xl font-bold" { "Fehlende Beiträge" }

                @for dues in form.members() {
                    (member_card_view(form_id, form, dues))
                }

                form
                    hx-post=(submit_endpoint)
                    hx-target="#alert-container"
                    hx-disabled-elt="find button[type=submit]"
                    class={ (CARD_STYLE) " p-4 space-y-4" }
                {
                    p
                    {
                        "Ausgewählt: "
                        (total_view(TOTAL_ID, &form.rows().total_display(), false))
                        " €"
                    }

                    (submit_button("Ausgewählte Zahlungen buchen"))
                }
            }
        }
    };

    base("Fehlende Beiträge", &[], &content)
}

fn member_card_view(form_id: FormId, form: &MissingPaymentsForm, dues: &MemberDues) -> Markup {
    let older = dues.older_contributions();

    html! {
        section class=(CARD_STYLE) data-member=(dues.email)
        {
            div class={ (CARD_HEADER_STYLE) " flex justify-between items-center" }
            {
                h2 { (dues.name) }
                span class="text-sm" { (dues.email) }
            }

            div class="p-4 space-y-3"
            {
                @if dues.rows.is_empty() {
                    p class="text-sm text-gray-500" { "Keine fehlenden Beiträge." }
                } @else {
                    div class="space-y-2"
                    {
                        @for id in &dues.rows {
                            @if let Some(row) = form.rows().row(*id) {
                                (payment_row_view(form_id, form, row, false))
                            }
                        }
                    }
                }

                @if !dues.recorded.is_empty() {
                    div data-role="recorded-contributions" class="text-sm"
                    {
                        h3 class="font-semibold" { "Gebuchte Beiträge" }

                        @if !older.is_empty() {
                            details
                            {
                                summary class="cursor-pointer text-blue-600"
                                {
                                    (older.len()) " ältere anzeigen"
                                }
                                ul
                                {
                                    @for transaction in older {
                                        (contribution_view(transaction))
                                    }
                                }
                            }
                        }

                        ul
                        {
                            @for transaction in dues.latest_contributions() {
                                (contribution_view(transaction))
                            }
                        }
                    }
                }
            }
        }
    }
}

fn contribution_view(transaction: &Transaction) -> Markup {
    let date = parse_any_date(transaction.date.get(..10).unwrap_or(&transaction.date))
        .map(to_display)
        .unwrap_or_else(|| transaction.date.clone());

    html! {
        li data-role="contribution" { (date) ": " (format_fixed(transaction.amount.abs())) " €" }
    }
}

fn payment_row_view(form_id: FormId, form: &MissingPaymentsForm, row: &Row, oob: bool) -> Markup {
    let ids = [form_id.as_u64(), row.id().as_u64()];
    let amount_endpoint = format_endpoint(endpoints::MISSING_PAYMENT, &ids);
    let toggle_endpoint = format_endpoint(endpoints::MISSING_PAYMENT_TOGGLE, &ids);
    let selected = row.is_selected();
    let state = if selected { "true" } else { "false" };
    let style = if selected {
        format!("{PAYMENT_ROW_STYLE} {COMPLETE_ROW_STYLE}")
    } else {
        PAYMENT_ROW_STYLE.to_owned()
    };
    let (email, month) = form
        .due(row.id())
        .map(|due| (due.email.as_str(), Some(due.month)))
        .unwrap_or(("", None));

    html! {
        div
            id=(row_dom_id(LIST, row.id()))
            data-row-id=(row.id())
            data-email=(email)
            data-date=[month.map(to_iso)]
            data-selected=(state)
            hx-swap-oob=[oob.then_some("true")]
            class=(style)
        {
            span class="w-24 tabular-nums" { (month.map(to_month_display).unwrap_or_default()) }

            select
                name="value"
                data-role=(AMOUNT)
                disabled[selected]
                hx-put=(amount_endpoint)
                hx-vals=(slot_vals(AMOUNT))
                hx-trigger="change"
                hx-target="#alert-container"
                class={ "w-32 " (FORM_TEXT_INPUT_STYLE) }
            {
                @for choice in form.choices() {
                    option value=(choice) selected[row.text(AMOUNT) == choice] { (choice) " €" }
                }
            }

            button
                type="button"
                hx-post=(toggle_endpoint)
                hx-target="#alert-container"
                aria-pressed=(state)
                class=(BUTTON_SECONDARY_STYLE)
            {
                @if selected { "✓ Ausgewählt" } @else { "+ Auswählen" }
            }
        }
    }
}
