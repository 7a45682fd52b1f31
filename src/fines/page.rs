//! The fines page and the endpoints behind its rows.

use std::sync::Arc;

use axum::{
    Form,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use serde::Deserialize;

use crate::{
    AppState, Error,
    alert::Alert,
    backend::BackendClient,
    config::Config,
    endpoints::{self, format_endpoint},
    html::{
        BUTTON_DELETE_STYLE, BUTTON_SECONDARY_STYLE, CARD_STYLE, FORM_LABEL_STYLE,
        FORM_TEXT_INPUT_STYLE, LIVE_INPUT_TRIGGER, PAGE_CONTAINER_STYLE, base, date_picker_head,
        format_euro, submit_button,
    },
    navigation::NavBar,
    rows::{
        Row, RowError, RowId,
        markup::{
            FieldEdit, append_row, edit_feedback, filled_indicator, remove_row, row_dom_id,
            row_status, slot_vals, total_view,
        },
    },
    store::{FormId, SharedFormStore, lock_forms, with_form},
};

use super::form::{AMOUNT, DESCRIPTION, EMAIL, FineForm};

const LIST: &str = "fine";
const ROWS_ID: &str = "fine-rows";
const TOTAL_ID: &str = "fine-total";

/// The state needed for the fines page.
#[derive(Debug, Clone)]
pub struct FinesState {
    pub forms: SharedFormStore<FineForm>,
    pub backend: BackendClient,
    pub config: Arc<Config>,
}

impl FromRef<AppState> for FinesState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            forms: state.fine_forms.clone(),
            backend: state.backend.clone(),
            config: state.config.clone(),
        }
    }
}

/// The meeting date entered below the fine rows.
#[derive(Debug, Clone, Deserialize)]
pub struct FineSubmission {
    #[serde(default)]
    pub date: String,
}

/// Render the fines page with a fresh list.
pub async fn get_fines_page(State(state): State<FinesState>) -> Response {
    let mut forms = match lock_forms(&state.forms) {
        Ok(forms) => forms,
        Err(error) => return error.into_response(),
    };

    let form_id = forms.insert(FineForm::new());
    tracing::debug!("opened fines form {form_id}");

    match forms.get(form_id) {
        Some(form) => fines_view(form_id, form, &state.config).into_response(),
        None => Error::UnknownForm(form_id).into_response(),
    }
}

/// Append an empty fine row.
pub async fn add_fine_row(
    State(state): State<FinesState>,
    Path(form_id): Path<FormId>,
) -> Response {
    let result = with_form(&state.forms, form_id, |form| {
        let id = form.rows_mut().add_row().ok_or(Error::NotFound)?;
        let row = form.rows().row(id).ok_or(Error::NotFound)?;

        Ok(append_row(ROWS_ID, fine_row_view(form_id, row, &state.config)))
    });

    match result {
        Ok(markup) => markup.into_response(),
        Err(error) => error.into_alert_response(),
    }
}

/// Store the new value of one field of a fine row.
pub async fn update_fine_field(
    State(state): State<FinesState>,
    Path((form_id, row_id)): Path<(FormId, RowId)>,
    Form(edit): Form<FieldEdit>,
) -> Response {
    let result = with_form(&state.forms, form_id, |form| {
        let row = form
            .rows_mut()
            .on_field_input(row_id, &edit.slot, &edit.value)?
            .cloned()
            .ok_or(RowError::UnknownRow(row_id))?;

        Ok(edit_feedback(
            LIST,
            &row,
            &edit.slot,
            TOTAL_ID,
            &form.rows().total_display(),
        ))
    });

    match result {
        Ok(markup) => markup.into_response(),
        Err(error) => error.into_alert_response(),
    }
}

/// Remove a fine row. Removing a row twice does nothing.
pub async fn remove_fine_row(
    State(state): State<FinesState>,
    Path((form_id, row_id)): Path<(FormId, RowId)>,
) -> Response {
    let result = with_form(&state.forms, form_id, |form| {
        form.rows_mut().remove_row(row_id);

        Ok(html! {
            (remove_row(LIST, row_id))
            (total_view(TOTAL_ID, &form.rows().total_display(), true))
        })
    });

    match result {
        Ok(markup) => markup.into_response(),
        Err(error) => error.into_alert_response(),
    }
}

/// Book every complete fine as a transaction of its member.
pub async fn submit_fines(
    State(state): State<FinesState>,
    Path(form_id): Path<FormId>,
    Form(submission): Form<FineSubmission>,
) -> Response {
    match submit(&state, form_id, submission).await {
        Ok(response) => response,
        Err(error) => error.into_alert_response(),
    }
}

async fn submit(
    state: &FinesState,
    form_id: FormId,
    submission: FineSubmission,
) -> Result<Response, Error> {
    let (transactions, total, _guard) = {
        let forms = lock_forms(&state.forms)?;
        let form = forms.get(form_id).ok_or(Error::UnknownForm(form_id))?;
        let transactions = form.transactions(&submission.date, &state.config)?;
        let total = form.rows().total();
        let guard = forms.begin_submission(form_id)?;

        (transactions, total, guard)
    };

    for transaction in &transactions {
        state.backend.add_transaction(transaction).await?;
        tracing::info!(
            "booked fine \"{}\" for {}",
            transaction.description,
            transaction.email
        );
    }

    Ok(Alert::Success {
        message: "Strafen gebucht".to_owned(),
        details: format!(
            "{} Strafen über {} wurden gebucht.",
            transactions.len(),
            format_euro(total)
        ),
    }
    .into_response())
}

fn fines_view(form_id: FormId, form: &FineForm, config: &Config) -> Markup {
    let nav_bar = NavBar::new(endpoints::FINES_VIEW).into_html();
    let rows_endpoint = format_endpoint(endpoints::FINE_ROWS, &[form_id.as_u64()]);
    let submit_endpoint = format_endpoint(endpoints::FINES_SUBMIT, &[form_id.as_u64()]);
    let rows = form.rows();

    let content = html! {
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class={ (CARD_STYLE) " max-w-4xl p-6 space-y-6" }
            {
                h1 class="text-xl font-bold" { "Strafen" }

                div
                    class="hidden md:grid grid-cols-[1rem_2fr_1fr_3fr_auto] gap-2
                        text-xs uppercase text-gray-500"
                {
                    span {}
                    span { "Mitglied" }
                    span { "Betrag" }
                    span { "Grund" }
                    span {}
                }

                div id=(ROWS_ID)
                {
                    @for row in rows.rows() {
                        (fine_row_view(form_id, row, config))
                    }
                }

                div class="flex items-center justify-between"
                {
                    button
                        type="button"
                        hx-post=(rows_endpoint)
                        hx-target="#alert-container"
                        class=(BUTTON_SECONDARY_STYLE)
                    {
                        "+ Strafe hinzufügen"
                    }

                    p class="text-lg"
                    {
                        "Gesamt: "
                        (total_view(TOTAL_ID, &rows.total_display(), false))
                        " €"
                    }
                }

                form
                    hx-post=(submit_endpoint)
                    hx-target="#alert-container"
                    hx-disabled-elt="find button[type=submit]"
                    class="space-y-4"
                {
                    div
                    {
                        label for="date" class=(FORM_LABEL_STYLE) { "Datum der Sitzung" }
                        input
                            id="date"
                            type="text"
                            name="date"
                            placeholder="TT.MM.JJJJ"
                            required
                            class={ "date-input " (FORM_TEXT_INPUT_STYLE) };
                    }

                    (submit_button("Strafen buchen"))
                }
            }
        }
    };

    base("Strafen", &date_picker_head(), &content)
}

fn fine_row_view(form_id: FormId, row: &Row, config: &Config) -> Markup {
    let row_endpoint = format_endpoint(endpoints::FINE_ROW, &[form_id.as_u64(), row.id().as_u64()]);
    let indicator = |slot: &str| filled_indicator(LIST, row.id(), slot, row.is_filled(slot), false);
    let email = row.text(EMAIL);

    html! {
        div
            id=(row_dom_id(LIST, row.id()))
            data-row-id=(row.id())
            class="grid grid-cols-1 md:grid-cols-[1rem_2fr_1fr_3fr_auto] items-center gap-2 py-2"
        {
            (row_status(LIST, row, false))

            div class="flex items-center gap-1"
            {
                select
                    name="value"
                    data-role=(EMAIL)
                    hx-put=(row_endpoint)
                    hx-vals=(slot_vals(EMAIL))
                    hx-trigger="change"
                    hx-target="#alert-container"
                    class=(FORM_TEXT_INPUT_STYLE)
                {
                    option value="" disabled selected[email.is_empty()] { "Mitglied wählen…" }
                    @for member in &config.members {
                        option value=(member.email) selected[member.email == email] {
                            (member.full_name())
                        }
                    }
                }
                (indicator(EMAIL))
            }

            div class="flex items-center gap-1"
            {
                input
                    type="number"
                    name="value"
                    data-role=(AMOUNT)
                    value=(row.text(AMOUNT))
                    step="0.01"
                    min="0"
                    placeholder="€"
                    hx-put=(row_endpoint)
                    hx-vals=(slot_vals(AMOUNT))
                    hx-trigger=(LIVE_INPUT_TRIGGER)
                    hx-sync="this:replace"
                    hx-target="#alert-container"
                    class=(FORM_TEXT_INPUT_STYLE);
                (indicator(AMOUNT))
            }

            div class="flex items-center gap-1"
            {
                input
                    type="text"
                    name="value"
                    data-role=(DESCRIPTION)
                    value=(row.text(DESCRIPTION))
                    placeholder="Grund"
                    hx-put=(row_endpoint)
                    hx-vals=(slot_vals(DESCRIPTION))
                    hx-trigger=(LIVE_INPUT_TRIGGER)
                    hx-sync="this:replace"
                    hx-target="#alert-container"
                    class=(FORM_TEXT_INPUT_STYLE);
                (indicator(DESCRIPTION))
            }

            button
                type="button"
                hx-delete=(row_endpoint)
                hx-target="#alert-container"
                aria-label="Strafe entfernen"
                class=(BUTTON_DELETE_STYLE)
            {
                "✕"
            }
        }
    }
}

#[cfg(test)]
mod fines_page_tests {
    use axum::{
        Form,
        extract::{FromRef, Path, State},
        http::StatusCode,
    };
    use scraper::Selector;

    use crate::{
        endpoints::{self, format_endpoint},
        fines::page::{FinesState, add_fine_row, get_fines_page, remove_fine_row, update_fine_field},
        rows::{RowId, markup::FieldEdit},
        store::FormId,
        test_utils::{
            RecordingTransport, assert_hx_endpoint, assert_valid_html, must_get_form,
            parse_html_document, parse_html_fragment, test_state,
        },
    };

    fn get_state() -> FinesState {
        let transport = RecordingTransport::answering(200, "");
        FinesState::from_ref(&test_state(&transport))
    }

    fn edit(slot: &str, value: &str) -> Form<FieldEdit> {
        Form(FieldEdit {
            slot: slot.to_owned(),
            value: value.to_owned(),
        })
    }

    #[tokio::test]
    async fn page_offers_every_member() {
        let state = get_state();

        let response = get_fines_page(State(state)).await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let rows = html
            .select(&Selector::parse("#fine-rows > [data-row-id]").unwrap())
            .count();
        assert_eq!(rows, 1);
        let options: Vec<_> = html
            .select(&Selector::parse("select[data-role=email] option").unwrap())
            .filter_map(|option| option.value().attr("value"))
            .collect();
        assert_eq!(
            options,
            ["", "anna@example.com", "ben@example.com", "carl@example.com"]
        );

        let form = must_get_form(&html);
        assert_hx_endpoint(
            &form,
            &format_endpoint(endpoints::FINES_SUBMIT, &[1]),
            "hx-post",
        );
    }

    #[tokio::test]
    async fn completing_a_fine_updates_the_total() {
        let state = get_state();
        get_fines_page(State(state.clone())).await;
        let form_id = FormId::new(1);
        let row_id = RowId::new(1);

        for (slot, value) in [("email", "ben@example.com"), ("description", "Zu spät")] {
            update_fine_field(State(state.clone()), Path((form_id, row_id)), edit(slot, value))
                .await;
        }
        let response = update_fine_field(
            State(state.clone()),
            Path((form_id, row_id)),
            edit("amount", "7,5"),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        let status = html
            .select(&Selector::parse("#fine-row-1-status").unwrap())
            .next()
            .expect("status missing");
        assert_eq!(status.value().attr("data-complete"), Some("true"));
        let total = html
            .select(&Selector::parse("#fine-total").unwrap())
            .next()
            .expect("total missing");
        assert_eq!(total.text().collect::<String>(), "7.50");
    }

    #[tokio::test]
    async fn fine_without_member_does_not_count() {
        let state = get_state();
        get_fines_page(State(state.clone())).await;
        let form_id = FormId::new(1);
        let row_id = RowId::new(1);

        update_fine_field(
            State(state.clone()),
            Path((form_id, row_id)),
            edit("description", "Zu spät"),
        )
        .await;
        let response = update_fine_field(
            State(state.clone()),
            Path((form_id, row_id)),
            edit("amount", "5"),
        )
        .await;

        let html = parse_html_fragment(response).await;
        let total = html
            .select(&Selector::parse("#fine-total").unwrap())
            .next()
            .expect("total missing");
        assert_eq!(total.text().collect::<String>(), "0.00");
    }

    #[tokio::test]
    async fn rows_can_be_added_and_removed() {
        let state = get_state();
        get_fines_page(State(state.clone())).await;
        let form_id = FormId::new(1);

        let response = add_fine_row(State(state.clone()), Path(form_id)).await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        let row = html
            .select(&Selector::parse("[data-row-id]").unwrap())
            .next()
            .expect("row missing");
        assert_eq!(row.value().attr("data-row-id"), Some("2"));

        let response = remove_fine_row(State(state.clone()), Path((form_id, RowId::new(1)))).await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        let removal = html
            .select(&Selector::parse("#fine-row-1").unwrap())
            .next()
            .expect("removal missing");
        assert_eq!(removal.value().attr("hx-swap-oob"), Some("delete"));
        let forms = state.forms.lock().unwrap();
        assert_eq!(forms.get(form_id).unwrap().rows().len(), 1);
    }
}
