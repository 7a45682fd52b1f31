//! The reimbursement page and the endpoints behind its expense rows.

use axum::{
    Form,
    extract::{FromRef, Multipart, Path, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use serde::Deserialize;

use crate::{
    AppState, Error,
    alert::Alert,
    backend::{BackendClient, RefundType},
    endpoints::{self, format_endpoint},
    html::{
        BUTTON_DELETE_STYLE, BUTTON_SECONDARY_STYLE, CARD_STYLE, FORM_LABEL_STYLE,
        FORM_RADIO_GROUP_STYLE, FORM_RADIO_INPUT_STYLE, FORM_RADIO_LABEL_STYLE,
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

use super::form::{
    AMOUNT, DATE, DESCRIPTION, DESCRIPTION_PRESETS, RECEIPT, ReimbursementForm,
    ReimbursementSubmission,
};

const LIST: &str = "expense";
const ROWS_ID: &str = "expense-rows";
const TOTAL_ID: &str = "expense-total";
const BANK_DETAILS_ID: &str = "bank-details";

/// The state needed for the reimbursement page.
#[derive(Debug, Clone)]
pub struct ReimbursementState {
    pub forms: SharedFormStore<ReimbursementForm>,
    pub backend: BackendClient,
}

impl FromRef<AppState> for ReimbursementState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            forms: state.reimbursement_forms.clone(),
            backend: state.backend.clone(),
        }
    }
}

/// Render the reimbursement page with a fresh form.
pub async fn get_reimbursement_page(State(state): State<ReimbursementState>) -> Response {
    let mut forms = match lock_forms(&state.forms) {
        Ok(forms) => forms,
        Err(error) => return error.into_response(),
    };

    let form_id = forms.insert(ReimbursementForm::new());
    tracing::debug!("opened reimbursement form {form_id}");

    match forms.get(form_id) {
        Some(form) => reimbursement_view(form_id, form).into_response(),
        None => Error::UnknownForm(form_id).into_response(),
    }
}

/// Append an empty expense row.
pub async fn add_expense_row(
    State(state): State<ReimbursementState>,
    Path(form_id): Path<FormId>,
) -> Response {
    let result = with_form(&state.forms, form_id, |form| {
        let id = form.rows_mut().add_row().ok_or(Error::NotFound)?;
        let row = form.rows().row(id).ok_or(Error::NotFound)?;

        Ok(append_row(ROWS_ID, expense_row_view(form_id, row)))
    });

    match result {
        Ok(markup) => markup.into_response(),
        Err(error) => error.into_alert_response(),
    }
}

/// Store the new value of one field of an expense row.
pub async fn update_expense_field(
    State(state): State<ReimbursementState>,
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

/// Remove an expense row. Removing a row twice does nothing.
pub async fn remove_expense_row(
    State(state): State<ReimbursementState>,
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

/// Attach a receipt to an expense row.
///
/// Only the file's name is kept. Sending the form without a file removes the
/// receipt.
pub async fn upload_receipt(
    State(state): State<ReimbursementState>,
    Path((form_id, row_id)): Path<(FormId, RowId)>,
    multipart: Multipart,
) -> Response {
    let file_name = match receipt_file_name(multipart).await {
        Ok(file_name) => file_name,
        Err(error) => {
            tracing::warn!("could not read receipt upload for form {form_id}: {error}");
            return error.into_alert_response();
        }
    };

    let result = with_form(&state.forms, form_id, |form| {
        let row = form
            .rows_mut()
            .on_field_input(row_id, RECEIPT, &file_name)?
            .cloned()
            .ok_or(RowError::UnknownRow(row_id))?;

        Ok(html! {
            (edit_feedback(LIST, &row, RECEIPT, TOTAL_ID, &form.rows().total_display()))
            (receipt_name_view(&row, true))
        })
    });

    match result {
        Ok(markup) => markup.into_response(),
        Err(error) => error.into_alert_response(),
    }
}

/// The largest receipt upload accepted, well above what phone scans weigh.
///
/// Only the file name is kept, the bytes are skipped.
pub const RECEIPT_UPLOAD_LIMIT: usize = 32 * 1024 * 1024;

async fn receipt_file_name(mut multipart: Multipart) -> Result<String, Error> {
    let mut file_name = String::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|error| Error::MultipartError(error.to_string()))?
    {
        if field.name() == Some(RECEIPT) {
            file_name = field.file_name().unwrap_or_default().to_owned();
        }
    }

    Ok(file_name)
}

/// The refund type chosen in the refund type selection.
#[derive(Debug, Deserialize)]
pub struct BankDetailsQuery {
    #[serde(default)]
    pub refund_type: RefundType,
}

/// Show the bank detail inputs for bank refunds and hide them otherwise.
pub async fn get_bank_details(Query(query): Query<BankDetailsQuery>) -> Response {
    bank_details_view(query.refund_type).into_response()
}

/// Submit the complete expense rows to the backend.
pub async fn submit_reimbursement(
    State(state): State<ReimbursementState>,
    Path(form_id): Path<FormId>,
    Form(submission): Form<ReimbursementSubmission>,
) -> Response {
    match submit(&state, form_id, submission).await {
        Ok(response) => response,
        Err(error) => error.into_alert_response(),
    }
}

async fn submit(
    state: &ReimbursementState,
    form_id: FormId,
    submission: ReimbursementSubmission,
) -> Result<Response, Error> {
    let (request, total, _guard) = {
        let forms = lock_forms(&state.forms)?;
        let form = forms.get(form_id).ok_or(Error::UnknownForm(form_id))?;
        let request = submission.into_request(form.items()?)?;
        let total = form.rows().total();
        let guard = forms.begin_submission(form_id)?;

        (request, total, guard)
    };

    state.backend.submit_reimbursement(&request).await?;
    tracing::info!(
        "submitted reimbursement request for {} with {} expenses",
        request.email,
        request.items.len()
    );

    Ok(Alert::Success {
        message: "Antrag eingereicht".to_owned(),
        details: format!(
            "{} Ausgaben über {} wurden eingereicht.",
            request.items.len(),
            format_euro(total)
        ),
    }
    .into_response())
}

fn reimbursement_view(form_id: FormId, form: &ReimbursementForm) -> Markup {
    let nav_bar = NavBar::new(endpoints::REIMBURSEMENT_VIEW).into_html();
    let rows_endpoint = format_endpoint(endpoints::REIMBURSEMENT_ROWS, &[form_id.as_u64()]);
    let submit_endpoint = format_endpoint(endpoints::REIMBURSEMENT_SUBMIT, &[form_id.as_u64()]);
    let rows = form.rows();

    let content = html! {
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class={ (CARD_STYLE) " max-w-5xl p-6 space-y-6" }
            {
                h1 class="text-xl font-bold" { "Auslagenerstattung" }

                datalist id="description-presets"
                {
                    @for preset in DESCRIPTION_PRESETS {
                        option value=(preset) {}
                    }
                }

                div
                    class="hidden md:grid grid-cols-[1rem_2fr_1fr_1fr_2fr_auto] gap-2
                        text-xs uppercase text-gray-500"
                {
                    span {}
                    span { "Bezeichnung" }
                    span { "Datum" }
                    span { "Betrag" }
                    span { "Beleg" }
                    span {}
                }

                div id=(ROWS_ID)
                {
                    @for row in rows.rows() {
                        (expense_row_view(form_id, row))
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
                        "+ Ausgabe hinzufügen"
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
                        label for="email" class=(FORM_LABEL_STYLE) { "E-Mail" }
                        input
                            id="email"
                            type="email"
                            name="email"
                            required
                            class=(FORM_TEXT_INPUT_STYLE);
                    }

                    fieldset
                    {
                        legend class=(FORM_LABEL_STYLE) { "Erstattung auf" }

                        div class=(FORM_RADIO_GROUP_STYLE)
                        {
                            (refund_type_option(RefundType::Cc, "Clubkonto", true))
                            (refund_type_option(RefundType::Bank, "Bankkonto", false))
                        }
                    }

                    (bank_details_view(RefundType::Cc))

                    (submit_button("Antrag einreichen"))
                }
            }
        }
    };

    base("Auslagen", &date_picker_head(), &content)
}

fn refund_type_option(refund_type: RefundType, label: &str, checked: bool) -> Markup {
    let value = match refund_type {
        RefundType::Cc => "cc",
        RefundType::Bank => "bank",
    };
    let id = format!("refund-type-{value}");

    html! {
        div class="flex flex-1 items-center gap-2"
        {
            input
                id=(id)
                type="radio"
                name="refund_type"
                value=(value)
                checked[checked]
                hx-get=(endpoints::REIMBURSEMENT_BANK_DETAILS)
                hx-trigger="change"
                hx-target={ "#" (BANK_DETAILS_ID) }
                hx-swap="outerHTML"
                class=(FORM_RADIO_INPUT_STYLE);
            label for=(id) class=(FORM_RADIO_LABEL_STYLE) { (label) }
        }
    }
}

fn bank_details_view(refund_type: RefundType) -> Markup {
    html! {
        div id=(BANK_DETAILS_ID) class="space-y-4"
        {
            @if refund_type == RefundType::Bank {
                div
                {
                    label for="bank_name" class=(FORM_LABEL_STYLE) { "Bank" }
                    input
                        id="bank_name"
                        type="text"
                        name="bank_name"
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="iban" class=(FORM_LABEL_STYLE) { "IBAN" }
                    input
                        id="iban"
                        type="text"
                        name="iban"
                        required
                        autocomplete="off"
                        class=(FORM_TEXT_INPUT_STYLE);
                }
            }
        }
    }
}

fn expense_row_view(form_id: FormId, row: &Row) -> Markup {
    let ids = [form_id.as_u64(), row.id().as_u64()];
    let row_endpoint = format_endpoint(endpoints::REIMBURSEMENT_ROW, &ids);
    let receipt_endpoint = format_endpoint(endpoints::REIMBURSEMENT_RECEIPT, &ids);
    let indicator = |slot: &str| filled_indicator(LIST, row.id(), slot, row.is_filled(slot), false);

    html! {
        div
            id=(row_dom_id(LIST, row.id()))
            data-row-id=(row.id())
            class="grid grid-cols-1 md:grid-cols-[1rem_2fr_1fr_1fr_2fr_auto] items-center gap-2 py-2"
        {
            (row_status(LIST, row, false))

            div class="flex items-center gap-1"
            {
                input
                    type="text"
                    name="value"
                    data-role=(DESCRIPTION)
                    value=(row.text(DESCRIPTION))
                    list="description-presets"
                    placeholder="Bezeichnung"
                    hx-put=(row_endpoint)
                    hx-vals=(slot_vals(DESCRIPTION))
                    hx-trigger=(LIVE_INPUT_TRIGGER)
                    hx-sync="this:replace"
                    hx-target="#alert-container"
                    class=(FORM_TEXT_INPUT_STYLE);
                (indicator(DESCRIPTION))
            }

            div class="flex items-center gap-1"
            {
                input
                    type="text"
                    name="value"
                    data-role=(DATE)
                    value=(row.text(DATE))
                    placeholder="TT.MM.JJJJ"
                    hx-put=(row_endpoint)
                    hx-vals=(slot_vals(DATE))
                    hx-trigger=(LIVE_INPUT_TRIGGER)
                    hx-sync="this:replace"
                    hx-target="#alert-container"
                    class={ "date-input " (FORM_TEXT_INPUT_STYLE) };
                (indicator(DATE))
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
                    type="file"
                    name=(RECEIPT)
                    data-role=(RECEIPT)
                    accept="application/pdf,image/*"
                    hx-post=(receipt_endpoint)
                    hx-encoding="multipart/form-data"
                    hx-trigger="change"
                    hx-target="#alert-container"
                    class="block w-full text-sm text-gray-900 dark:text-gray-400";
                (receipt_name_view(row, false))
                (indicator(RECEIPT))
            }

            button
                type="button"
                hx-delete=(row_endpoint)
                hx-target="#alert-container"
                aria-label="Ausgabe entfernen"
                class=(BUTTON_DELETE_STYLE)
            {
                "✕"
            }
        }
    }
}

fn receipt_name_view(row: &Row, oob: bool) -> Markup {
    html! {
        span
            id=(format!("{}-receipt-name", row_dom_id(LIST, row.id())))
            hx-swap-oob=[oob.then_some("true")]
            class="text-xs text-gray-500 truncate"
        {
            (row.text(RECEIPT))
        }
    }
}

#[cfg(test)]
mod reimbursement_page_tests {
    use axum::{
        Form,
        extract::{Path, Query, State},
        http::StatusCode,
    };
    use scraper::Selector;

    use crate::{
        endpoints::{self, format_endpoint},
        backend::RefundType,
        reimbursement::{
            get_reimbursement_page,
            page::{
                BankDetailsQuery, ReimbursementState, add_expense_row, get_bank_details,
                remove_expense_row, update_expense_field,
            },
        },
        rows::{RowId, markup::FieldEdit},
        store::FormId,
        test_utils::{
            RecordingTransport, assert_hx_endpoint, assert_valid_html, must_get_form,
            parse_html_document, parse_html_fragment, test_state,
        },
    };

    fn get_state() -> ReimbursementState {
        let transport = RecordingTransport::answering(200, "");
        axum::extract::FromRef::from_ref(&test_state(&transport))
    }

    /// Forms are numbered from one in a fresh store.
    fn first_form_id() -> FormId {
        FormId::new(1)
    }

    fn edit(slot: &str, value: &str) -> Form<FieldEdit> {
        Form(FieldEdit {
            slot: slot.to_owned(),
            value: value.to_owned(),
        })
    }

    #[tokio::test]
    async fn page_starts_with_three_rows() {
        let state = get_state();

        let response = get_reimbursement_page(State(state.clone())).await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let rows = html
            .select(&Selector::parse("#expense-rows > [data-row-id]").unwrap())
            .count();
        assert_eq!(rows, 3);
        let total = html
            .select(&Selector::parse("#expense-total").unwrap())
            .next()
            .expect("total missing");
        assert_eq!(total.text().collect::<String>(), "0.00");
        let presets_selector = Selector::parse("#description-presets option").unwrap();
        let presets = html.select(&presets_selector);
        assert_eq!(presets.count(), 5);

        let form = must_get_form(&html);
        let form_id = first_form_id();
        assert_hx_endpoint(
            &form,
            &format_endpoint(endpoints::REIMBURSEMENT_SUBMIT, &[form_id.as_u64()]),
            "hx-post",
        );
    }

    #[tokio::test]
    async fn completing_a_row_updates_status_and_total() {
        let state = get_state();
        get_reimbursement_page(State(state.clone())).await;
        let form_id = first_form_id();
        let row_id = RowId::new(2);

        for (slot, value) in [
            ("description", "Fahrtkosten"),
            ("date", "14.03.2024"),
            ("receipt", "ticket.pdf"),
        ] {
            update_expense_field(State(state.clone()), Path((form_id, row_id)), edit(slot, value))
                .await;
        }
        let response = update_expense_field(
            State(state.clone()),
            Path((form_id, row_id)),
            edit("amount", "12,5"),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        let indicator = html
            .select(&Selector::parse("#expense-row-2-amount-filled").unwrap())
            .next()
            .expect("indicator missing");
        assert_eq!(indicator.value().attr("data-filled"), Some("true"));
        let status = html
            .select(&Selector::parse("#expense-row-2-status").unwrap())
            .next()
            .expect("status missing");
        assert_eq!(status.value().attr("data-complete"), Some("true"));
        let total = html
            .select(&Selector::parse("#expense-total").unwrap())
            .next()
            .expect("total missing");
        assert_eq!(total.text().collect::<String>(), "12.50");
    }

    #[tokio::test]
    async fn incomplete_row_does_not_count() {
        let state = get_state();
        get_reimbursement_page(State(state.clone())).await;
        let form_id = first_form_id();

        let response = update_expense_field(
            State(state.clone()),
            Path((form_id, RowId::new(1))),
            edit("amount", "99"),
        )
        .await;

        let html = parse_html_fragment(response).await;
        let total = html
            .select(&Selector::parse("#expense-total").unwrap())
            .next()
            .expect("total missing");
        assert_eq!(total.text().collect::<String>(), "0.00");
    }

    #[tokio::test]
    async fn unknown_slot_is_rejected() {
        let state = get_state();
        get_reimbursement_page(State(state.clone())).await;
        let form_id = first_form_id();

        let response = update_expense_field(
            State(state.clone()),
            Path((form_id, RowId::new(1))),
            edit("colour", "red"),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn added_rows_get_fresh_ids() {
        let state = get_state();
        get_reimbursement_page(State(state.clone())).await;
        let form_id = first_form_id();

        let response = add_expense_row(State(state.clone()), Path(form_id)).await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        let row = html
            .select(&Selector::parse("[data-row-id]").unwrap())
            .next()
            .expect("row missing");
        assert_eq!(row.value().attr("data-row-id"), Some("4"));
        assert_eq!(
            row.select(&Selector::parse("[data-role=amount]").unwrap())
                .next()
                .and_then(|input| input.value().attr("value")),
            Some("")
        );
    }

    #[tokio::test]
    async fn removing_a_row_deletes_its_group() {
        let state = get_state();
        get_reimbursement_page(State(state.clone())).await;
        let form_id = first_form_id();

        let response =
            remove_expense_row(State(state.clone()), Path((form_id, RowId::new(3)))).await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        let removal = html
            .select(&Selector::parse("#expense-row-3").unwrap())
            .next()
            .expect("removal missing");
        assert_eq!(removal.value().attr("hx-swap-oob"), Some("delete"));
        let forms = state.forms.lock().unwrap();
        assert_eq!(forms.get(form_id).unwrap().rows().len(), 2);
    }

    #[tokio::test]
    async fn editing_an_expired_form_is_not_found() {
        let state = get_state();
        let form_id = first_form_id();

        let response = add_expense_row(State(state), Path(form_id)).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn bank_details_only_for_bank_refunds() {
        let response = get_bank_details(Query(BankDetailsQuery {
            refund_type: RefundType::Bank,
        }))
        .await;
        let html = parse_html_fragment(response).await;
        assert!(
            html.select(&Selector::parse("#bank-details input[name=iban]").unwrap())
                .next()
                .is_some()
        );

        let response = get_bank_details(Query(BankDetailsQuery {
            refund_type: RefundType::Cc,
        }))
        .await;
        let html = parse_html_fragment(response).await;
        assert!(
            html.select(&Selector::parse("#bank-details input").unwrap())
                .next()
                .is_none()
        );
    }
}

#[cfg(test)]
mod submit_reimbursement_tests {
    use axum::{
        Router,
        http::StatusCode,
        routing::{get, post, put},
    };
    use axum_test::{
        TestServer,
        multipart::{MultipartForm, Part},
    };
    use serde_json::json;

    use crate::{
        build_router,
        endpoints::{self, format_endpoint},
        reimbursement::{
            get_reimbursement_page, submit_reimbursement, update_expense_field, upload_receipt,
        },
        test_utils::{RecordingTransport, test_state},
    };

    fn get_server(transport: &RecordingTransport) -> TestServer {
        let app = Router::new()
            .route(endpoints::REIMBURSEMENT_VIEW, get(get_reimbursement_page))
            .route(endpoints::REIMBURSEMENT_ROW, put(update_expense_field))
            .route(endpoints::REIMBURSEMENT_RECEIPT, post(upload_receipt))
            .route(endpoints::REIMBURSEMENT_SUBMIT, post(submit_reimbursement))
            .with_state(test_state(transport));

        TestServer::try_new(app).expect("Could not create test server.")
    }

    async fn fill_first_row(server: &TestServer) {
        let row = format_endpoint(endpoints::REIMBURSEMENT_ROW, &[1, 1]);
        for (slot, value) in [
            ("description", "Getränke"),
            ("date", "02.05.2024"),
            ("amount", "23.40"),
        ] {
            server
                .put(&row)
                .form(&[("slot", slot), ("value", value)])
                .await
                .assert_status_ok();
        }

        let receipt = MultipartForm::new().add_part(
            "receipt",
            Part::bytes(b"%PDF-1.4".as_slice())
                .file_name("kassenbon.pdf")
                .mime_type("application/pdf"),
        );
        server
            .post(&format_endpoint(endpoints::REIMBURSEMENT_RECEIPT, &[1, 1]))
            .multipart(receipt)
            .await
            .assert_status_ok();
    }

    #[tokio::test]
    async fn receipts_larger_than_the_default_body_limit_are_accepted() {
        let transport = RecordingTransport::answering(200, "{}");
        let server = TestServer::try_new(build_router(test_state(&transport)))
            .expect("Could not create test server.");
        server.get(endpoints::REIMBURSEMENT_VIEW).await.assert_status_ok();
        let scan = vec![0_u8; 3 * 1024 * 1024];
        let receipt = MultipartForm::new().add_part(
            "receipt",
            Part::bytes(scan)
                .file_name("scan.jpg")
                .mime_type("image/jpeg"),
        );

        let response = server
            .post(&format_endpoint(endpoints::REIMBURSEMENT_RECEIPT, &[1, 1]))
            .multipart(receipt)
            .await;

        response.assert_status_ok();
        assert!(response.text().contains("scan.jpg"));
    }

    #[tokio::test]
    async fn submits_complete_rows() {
        let transport = RecordingTransport::answering(200, "{}");
        let server = get_server(&transport);
        server.get(endpoints::REIMBURSEMENT_VIEW).await.assert_status_ok();
        fill_first_row(&server).await;

        let response = server
            .post(&format_endpoint(endpoints::REIMBURSEMENT_SUBMIT, &[1]))
            .form(&[
                ("email", "anna@example.com"),
                ("refund_type", "bank"),
                ("bank_name", "Sparkasse"),
                ("iban", "DE89 3704 0044 0532 0130 00"),
            ])
            .await;

        response.assert_status_ok();
        assert!(response.text().contains("Antrag eingereicht"));
        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].path, "/submit_reimbursement");
        assert_eq!(
            requests[0].body,
            Some(json!({
                "email": "anna@example.com",
                "refund_type": "bank",
                "bank_name": "Sparkasse",
                "iban": "DE89370400440532013000",
                "items": [{
                    "description": "Getränke",
                    "date": "2024-05-02",
                    "amount": 23.4,
                    "receipt": "kassenbon.pdf"
                }]
            }))
        );
    }

    #[tokio::test]
    async fn no_complete_rows_makes_no_request() {
        let transport = RecordingTransport::answering(200, "{}");
        let server = get_server(&transport);
        server.get(endpoints::REIMBURSEMENT_VIEW).await.assert_status_ok();

        let response = server
            .post(&format_endpoint(endpoints::REIMBURSEMENT_SUBMIT, &[1]))
            .form(&[("email", "anna@example.com"), ("refund_type", "cc")])
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert!(response.text().contains("Keine vollständigen Ausgaben"));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn backend_failure_is_shown() {
        let transport = RecordingTransport::unreachable();
        let server = get_server(&transport);
        server.get(endpoints::REIMBURSEMENT_VIEW).await.assert_status_ok();
        fill_first_row(&server).await;

        let response = server
            .post(&format_endpoint(endpoints::REIMBURSEMENT_SUBMIT, &[1]))
            .form(&[("email", "anna@example.com"), ("refund_type", "cc")])
            .await;

        response.assert_status(StatusCode::BAD_GATEWAY);
        assert!(response.text().contains("Ein Fehler ist aufgetreten."));
        assert_eq!(transport.requests().len(), 1);
    }
}
