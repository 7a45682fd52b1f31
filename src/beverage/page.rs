//! The beverage report page: counts per member, counts per event and the
//! submission of the whole report.

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
    decimal::format_fixed,
    endpoints::{self, format_endpoint},
    html::{
        BUTTON_DELETE_STYLE, BUTTON_SECONDARY_STYLE, CARD_HEADER_STYLE, CARD_STYLE,
        FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, LIVE_INPUT_TRIGGER, PAGE_CONTAINER_STYLE,
        TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, date_picker_head,
        submit_button,
    },
    navigation::NavBar,
    rows::{
        Row, RowError, RowId,
        markup::{FieldEdit, append_row, remove_row, row_dom_id, slot_vals, total_view},
    },
    store::{FormId, SharedFormStore, lock_forms, with_form},
};

use super::{
    form::{BeverageForm, TITLE},
    prices::PriceTable,
};

const LIST: &str = "event";
const EVENT_ROWS_ID: &str = "event-rows";
const EVENT_TOTAL_ID: &str = "event-total";
const TALLY_TOTAL_ID: &str = "tally-total";

/// The state needed for the beverage report page.
#[derive(Debug, Clone)]
pub struct BeverageState {
    pub forms: SharedFormStore<BeverageForm>,
    pub backend: BackendClient,
    pub config: Arc<Config>,
}

impl FromRef<AppState> for BeverageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            forms: state.beverage_forms.clone(),
            backend: state.backend.clone(),
            config: state.config.clone(),
        }
    }
}

/// One edited cell of the member tally.
#[derive(Debug, Clone, Deserialize)]
pub struct TallyEdit {
    /// The member's e-mail address.
    pub member: String,
    /// The beverage's name.
    pub beverage: String,
    /// The raw quantity.
    #[serde(default)]
    pub value: String,
}

/// The fields of the report submission form.
#[derive(Debug, Clone, Deserialize)]
pub struct BeverageSubmission {
    /// "dd.mm.yyyy"
    #[serde(default)]
    pub report_date: String,
}

/// Render the beverage report page with a fresh report.
pub async fn get_beverages_page(State(state): State<BeverageState>) -> Response {
    let form = BeverageForm::new(
        PriceTable::new(state.config.beverages.iter().cloned()),
        state.config.members.iter().map(|member| member.email.clone()),
    );

    let mut forms = match lock_forms(&state.forms) {
        Ok(forms) => forms,
        Err(error) => return error.into_response(),
    };

    let form_id = forms.insert(form);
    tracing::debug!("opened beverage report {form_id}");

    match forms.get(form_id) {
        Some(form) => beverages_view(form_id, form, &state.config).into_response(),
        None => Error::UnknownForm(form_id).into_response(),
    }
}

/// Store one member's count of one beverage and update that member's sum.
pub async fn update_tally(
    State(state): State<BeverageState>,
    Path(form_id): Path<FormId>,
    Form(edit): Form<TallyEdit>,
) -> Response {
    let result = with_form(&state.forms, form_id, |form| {
        let tally = form.tally_mut();
        let sum = tally.set_quantity(&edit.member, &edit.beverage, &edit.value)?;
        let index = tally
            .group_index(&edit.member)
            .ok_or_else(|| Error::UnknownMember(edit.member.clone()))?;

        Ok(html! {
            (total_view(&tally_sum_id(index), &format_fixed(sum), true))
            (total_view(TALLY_TOTAL_ID, &format_fixed(tally.total()), true))
        })
    });

    match result {
        Ok(markup) => markup.into_response(),
        Err(error) => error.into_alert_response(),
    }
}

/// Append an empty event row.
pub async fn add_event_row(
    State(state): State<BeverageState>,
    Path(form_id): Path<FormId>,
) -> Response {
    let result = with_form(&state.forms, form_id, |form| {
        let id = form.events_mut().add_row().ok_or(Error::NotFound)?;
        let row = form.events().row(id).ok_or(Error::NotFound)?;

        Ok(append_row(EVENT_ROWS_ID, event_row_view(form_id, form, row)))
    });

    match result {
        Ok(markup) => markup.into_response(),
        Err(error) => error.into_alert_response(),
    }
}

/// Store the new value of one field of an event row.
pub async fn update_event_field(
    State(state): State<BeverageState>,
    Path((form_id, row_id)): Path<(FormId, RowId)>,
    Form(edit): Form<FieldEdit>,
) -> Response {
    let result = with_form(&state.forms, form_id, |form| {
        let events = form.events_mut();
        let row = events
            .on_field_input(row_id, &edit.slot, &edit.value)?
            .cloned()
            .ok_or(RowError::UnknownRow(row_id))?;

        Ok(html! {
            (event_sum_view(&row, events.contribution(&row), true))
            (total_view(EVENT_TOTAL_ID, &events.total_display(), true))
        })
    });

    match result {
        Ok(markup) => markup.into_response(),
        Err(error) => error.into_alert_response(),
    }
}

/// Remove an event row with all of its cells.
pub async fn remove_event_row(
    State(state): State<BeverageState>,
    Path((form_id, row_id)): Path<(FormId, RowId)>,
) -> Response {
    let result = with_form(&state.forms, form_id, |form| {
        form.events_mut().remove_row(row_id);

        Ok(html! {
            (remove_row(LIST, row_id))
            (total_view(EVENT_TOTAL_ID, &form.events().total_display(), true))
        })
    });

    match result {
        Ok(markup) => markup.into_response(),
        Err(error) => error.into_alert_response(),
    }
}

/// Send the report to the backend.
///
/// A report without any counted beverage is not sent.
pub async fn submit_beverage_report(
    State(state): State<BeverageState>,
    Path(form_id): Path<FormId>,
    Form(submission): Form<BeverageSubmission>,
) -> Response {
    match submit(&state, form_id, &submission).await {
        Ok(response) => response,
        Err(error) => error.into_alert_response(),
    }
}

async fn submit(
    state: &BeverageState,
    form_id: FormId,
    submission: &BeverageSubmission,
) -> Result<Response, Error> {
    let (report, _guard) = {
        let forms = lock_forms(&state.forms)?;
        let form = forms.get(form_id).ok_or(Error::UnknownForm(form_id))?;

        let Some(report) = form.report(&submission.report_date)? else {
            tracing::debug!("beverage report {form_id} is empty, nothing to send");
            return Ok(Alert::ErrorSimple {
                message: "Keine Getränke eingetragen.".to_owned(),
            }
            .into_response());
        };

        (report, forms.begin_submission(form_id)?)
    };

    state.backend.save_beverage_report(&report).await?;
    tracing::info!(
        "saved beverage report for {} with {} entries",
        report.report_date,
        report.entries.len()
    );

    Ok(Alert::Success {
        message: "Getränkeabrechnung gespeichert".to_owned(),
        details: format!(
            "{} Einträge vom {} wurden gespeichert.",
            report.entries.len(),
            submission.report_date.trim()
        ),
    }
    .into_response())
}

fn tally_sum_id(member_index: usize) -> String {
    format!("tally-sum-{member_index}")
}

fn beverages_view(form_id: FormId, form: &BeverageForm, config: &Config) -> Markup {
    let nav_bar = NavBar::new(endpoints::BEVERAGES_VIEW).into_html();
    let tally_endpoint = format_endpoint(endpoints::BEVERAGE_TALLY, &[form_id.as_u64()]);
    let events_endpoint = format_endpoint(endpoints::BEVERAGE_EVENTS, &[form_id.as_u64()]);
    let submit_endpoint = format_endpoint(endpoints::BEVERAGE_SUBMIT, &[form_id.as_u64()]);
    let tally = form.tally();
    let beverages: Vec<&str> = tally.prices().names().collect();

    let content = html! {
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-6xl space-y-6"
            {
                h1 class="text-xl font-bold" { "Getränkeabrechnung" }

                details open class=(CARD_STYLE) data-card="tally"
                {
                    summary class=(CARD_HEADER_STYLE) { h2 class="inline" { "Mitglieder" } }

                    div class="overflow-x-auto"
                    {
                        table class="w-full text-sm text-left"
                        {
                            thead class=(TABLE_HEADER_STYLE)
                            {
                                tr
                                {
                                    th scope="col" class=(TABLE_CELL_STYLE) { "Mitglied" }
                                    @for beverage in &beverages {
                                        th scope="col" class=(TABLE_CELL_STYLE)
                                        {
                                            (beverage)
                                            br;
                                            span class="normal-case font-normal"
                                            {
                                                (format_fixed(tally.prices().price(beverage))) " €"
                                            }
                                        }
                                    }
                                    th scope="col" class=(TABLE_CELL_STYLE) { "Summe" }
                                }
                            }

                            tbody
                            {
                                @for (index, member) in config.members.iter().enumerate() {
                                    tr class=(TABLE_ROW_STYLE) data-member=(member.email)
                                    {
                                        th scope="row" class=(TABLE_CELL_STYLE) { (member.full_name()) }

                                        @for beverage in &beverages {
                                            td class="px-2 py-2"
                                            {
                                                input
                                                    type="number"
                                                    min="0"
                                                    step="1"
                                                    name="value"
                                                    value=(tally.quantity(&member.email, beverage))
                                                    data-member=(member.email)
                                                    data-role=(beverage)
                                                    hx-put=(tally_endpoint)
                                                    hx-vals=(serde_json::json!({
                                                        "member": member.email,
                                                        "beverage": beverage,
                                                    }).to_string())
                                                    hx-trigger=(LIVE_INPUT_TRIGGER)
                                                    hx-sync="this:replace"
                                                    hx-target="#alert-container"
                                                    class={ "w-20 " (FORM_TEXT_INPUT_STYLE) };
                                            }
                                        }

                                        td class=(TABLE_CELL_STYLE)
                                        {
                                            (total_view(
                                                &tally_sum_id(index),
                                                &format_fixed(tally.group_sum(&member.email)),
                                                false
                                            ))
                                        }
                                    }
                                }
                            }
                        }
                    }

                    p class="px-4 py-3 text-right"
                    {
                        "Mitglieder gesamt: "
                        (total_view(TALLY_TOTAL_ID, &format_fixed(tally.total()), false))
                        " €"
                    }
                }

                details open class=(CARD_STYLE) data-card="events"
                {
                    summary class=(CARD_HEADER_STYLE) { h2 class="inline" { "Veranstaltungen" } }

                    div class="p-4 space-y-2"
                    {
                        div id=(EVENT_ROWS_ID)
                        {
                            @for row in form.events().rows() {
                                (event_row_view(form_id, form, row))
                            }
                        }

                        div class="flex items-center justify-between"
                        {
                            button
                                type="button"
                                hx-post=(events_endpoint)
                                hx-target="#alert-container"
                                class=(BUTTON_SECONDARY_STYLE)
                            {
                                "+ Veranstaltung"
                            }

                            p
                            {
                                "Veranstaltungen gesamt: "
                                (total_view(EVENT_TOTAL_ID, &form.events().total_display(), false))
                                " €"
                            }
                        }
                    }
                }

                form
                    hx-post=(submit_endpoint)
                    hx-target="#alert-container"
                    hx-disabled-elt="find button[type=submit]"
                    class={ (CARD_STYLE) " p-4 space-y-4" }
                {
                    div
                    {
                        label for="report_date" class=(FORM_LABEL_STYLE) { "Datum der Abrechnung" }
                        input
                            id="report_date"
                            type="text"
                            name="report_date"
                            placeholder="TT.MM.JJJJ"
                            class={ "date-input " (FORM_TEXT_INPUT_STYLE) };
                    }

                    (submit_button("Abrechnung speichern"))
                }
            }
        }
    };

    base("Getränke", &date_picker_head(), &content)
}

fn event_row_view(form_id: FormId, form: &BeverageForm, row: &Row) -> Markup {
    let row_endpoint = format_endpoint(
        endpoints::BEVERAGE_EVENT,
        &[form_id.as_u64(), row.id().as_u64()],
    );

    html! {
        div
            id=(row_dom_id(LIST, row.id()))
            data-row-id=(row.id())
            class="flex flex-wrap items-center gap-2 py-1"
        {
            input
                type="text"
                name="value"
                data-role=(TITLE)
                value=(row.text(TITLE))
                placeholder="Veranstaltung"
                hx-put=(row_endpoint)
                hx-vals=(slot_vals(TITLE))
                hx-trigger=(LIVE_INPUT_TRIGGER)
                hx-sync="this:replace"
                hx-target="#alert-container"
                class={ "w-48 " (FORM_TEXT_INPUT_STYLE) };

            @for beverage in form.tally().prices().names() {
                input
                    type="number"
                    min="0"
                    step="1"
                    name="value"
                    data-role=(beverage)
                    value=(row.text(beverage))
                    placeholder=(beverage)
                    title=(beverage)
                    hx-put=(row_endpoint)
                    hx-vals=(slot_vals(beverage))
                    hx-trigger=(LIVE_INPUT_TRIGGER)
                    hx-sync="this:replace"
                    hx-target="#alert-container"
                    class={ "w-20 " (FORM_TEXT_INPUT_STYLE) };
            }

            (event_sum_view(row, form.events().contribution(row), false))

            button
                type="button"
                hx-delete=(row_endpoint)
                hx-target="#alert-container"
                aria-label="Veranstaltung entfernen"
                class=(BUTTON_DELETE_STYLE)
            {
                "✕"
            }
        }
    }
}

fn event_sum_view(row: &Row, sum: f64, oob: bool) -> Markup {
    html! {
        span
            id=(format!("{}-sum", row_dom_id(LIST, row.id())))
            data-role="sum"
            hx-swap-oob=[oob.then_some("true")]
            class="w-20 text-right tabular-nums"
        {
            (format_fixed(sum))
        }
    }
}

#[cfg(test)]
mod beverages_page_tests {
    use axum::{
        Form,
        extract::{FromRef, Path, State},
        http::StatusCode,
    };
    use scraper::Selector;

    use crate::{
        beverage::page::{
            BeverageState, TallyEdit, add_event_row, get_beverages_page, remove_event_row,
            update_event_field, update_tally,
        },
        rows::{RowId, markup::FieldEdit},
        store::FormId,
        test_utils::{
            RecordingTransport, assert_valid_html, parse_html_document, parse_html_fragment,
            test_state,
        },
    };

    async fn open_page() -> (BeverageState, FormId) {
        let transport = RecordingTransport::answering(200, "");
        let state = BeverageState::from_ref(&test_state(&transport));
        get_beverages_page(State(state.clone())).await;

        (state, FormId::new(1))
    }

    fn tally_edit(member: &str, beverage: &str, value: &str) -> Form<TallyEdit> {
        Form(TallyEdit {
            member: member.to_owned(),
            beverage: beverage.to_owned(),
            value: value.to_owned(),
        })
    }

    fn text_of(html: &scraper::Html, selector: &str) -> String {
        html.select(&Selector::parse(selector).unwrap())
            .next()
            .unwrap_or_else(|| panic!("{selector} missing"))
            .text()
            .collect()
    }

    #[tokio::test]
    async fn page_has_a_row_per_member_and_two_events() {
        let transport = RecordingTransport::answering(200, "");
        let state = BeverageState::from_ref(&test_state(&transport));

        let response = get_beverages_page(State(state)).await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let members_selector = Selector::parse("tbody tr[data-member]").unwrap();
        let members = html.select(&members_selector);
        assert_eq!(members.count(), 3);
        let cells_selector = Selector::parse("input[data-member='anna@example.com']").unwrap();
        let cells = html.select(&cells_selector);
        assert_eq!(cells.count(), 2);
        let events_selector = Selector::parse("#event-rows > [data-row-id]").unwrap();
        let events = html.select(&events_selector);
        assert_eq!(events.count(), 2);
    }

    #[tokio::test]
    async fn quantity_inputs_update_while_typing() {
        let transport = RecordingTransport::answering(200, "");
        let state = BeverageState::from_ref(&test_state(&transport));

        let response = get_beverages_page(State(state)).await;

        let html = parse_html_document(response).await;
        let inputs: Vec<_> = html
            .select(&Selector::parse("input[data-member], #event-rows input").unwrap())
            .collect();
        assert!(!inputs.is_empty());
        for input in inputs {
            assert_eq!(
                input.value().attr("hx-trigger"),
                Some("input changed delay:200ms, change")
            );
            assert_eq!(input.value().attr("hx-sync"), Some("this:replace"));
        }
    }

    #[tokio::test]
    async fn cards_collapse_from_their_header() {
        let transport = RecordingTransport::answering(200, "");
        let state = BeverageState::from_ref(&test_state(&transport));

        let response = get_beverages_page(State(state)).await;

        let html = parse_html_document(response).await;
        for card in ["tally", "events"] {
            let selector = Selector::parse(&format!("details[data-card={card}]")).unwrap();
            let details = html
                .select(&selector)
                .next()
                .unwrap_or_else(|| panic!("no collapsible {card} card"));
            assert!(details.value().attr("open").is_some());
            assert!(
                details
                    .select(&Selector::parse("summary h2").unwrap())
                    .next()
                    .is_some()
            );
        }
        assert!(
            html.select(&Selector::parse("details[data-card=tally] input[data-member]").unwrap())
                .next()
                .is_some()
        );
        assert!(
            html.select(&Selector::parse("details[data-card=events] #event-rows").unwrap())
                .next()
                .is_some()
        );
    }

    #[tokio::test]
    async fn tally_edit_updates_only_that_members_sum() {
        let (state, form_id) = open_page().await;
        update_tally(
            State(state.clone()),
            Path(form_id),
            tally_edit("ben@example.com", "Wasser", "4"),
        )
        .await;

        let response = update_tally(
            State(state.clone()),
            Path(form_id),
            tally_edit("anna@example.com", "Bier", "3"),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        assert_eq!(text_of(&html, "#tally-sum-0"), "3.60");
        assert!(
            html.select(&Selector::parse("#tally-sum-1").unwrap())
                .next()
                .is_none(),
            "other members' sums must not be swapped"
        );
        assert_eq!(text_of(&html, "#tally-total"), "5.60");
    }

    #[tokio::test]
    async fn tally_edit_for_unknown_member_is_rejected() {
        let (state, form_id) = open_page().await;

        let response = update_tally(
            State(state),
            Path(form_id),
            tally_edit("eve@example.com", "Bier", "3"),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn event_edit_updates_row_sum_and_total() {
        let (state, form_id) = open_page().await;

        let response = update_event_field(
            State(state.clone()),
            Path((form_id, RowId::new(2))),
            Form(FieldEdit {
                slot: "Bier".to_owned(),
                value: "10".to_owned(),
            }),
        )
        .await;

        let html = parse_html_fragment(response).await;
        assert_eq!(text_of(&html, "#event-row-2-sum"), "12.00");
        assert_eq!(text_of(&html, "#event-total"), "12.00");
    }

    #[tokio::test]
    async fn removing_an_event_subtracts_its_sum() {
        let (state, form_id) = open_page().await;
        update_event_field(
            State(state.clone()),
            Path((form_id, RowId::new(1))),
            Form(FieldEdit {
                slot: "Wasser".to_owned(),
                value: "2".to_owned(),
            }),
        )
        .await;

        let response = remove_event_row(State(state.clone()), Path((form_id, RowId::new(1)))).await;

        let html = parse_html_fragment(response).await;
        assert_eq!(text_of(&html, "#event-total"), "0.00");
        let forms = state.forms.lock().unwrap();
        assert_eq!(forms.get(form_id).unwrap().events().len(), 1);
    }

    #[tokio::test]
    async fn added_event_row_has_a_cell_per_beverage() {
        let (state, form_id) = open_page().await;

        let response = add_event_row(State(state), Path(form_id)).await;

        let html = parse_html_fragment(response).await;
        let row = html
            .select(&Selector::parse("[data-row-id='3']").unwrap())
            .next()
            .expect("new row missing");
        assert_eq!(row.select(&Selector::parse("input").unwrap()).count(), 3);
        assert_eq!(text_of(&html, "#event-row-3-sum"), "0.00");
    }
}

#[cfg(test)]
mod submit_beverage_report_tests {
    use axum::{
        Router,
        http::StatusCode,
        routing::{get, post, put},
    };
    use axum_test::TestServer;
    use serde_json::json;

    use crate::{
        beverage::{get_beverages_page, submit_beverage_report, update_event_field, update_tally},
        endpoints::{self, format_endpoint},
        test_utils::{RecordingTransport, test_state},
    };

    fn get_server(transport: &RecordingTransport) -> TestServer {
        let app = Router::new()
            .route(endpoints::BEVERAGES_VIEW, get(get_beverages_page))
            .route(endpoints::BEVERAGE_TALLY, put(update_tally))
            .route(endpoints::BEVERAGE_EVENT, put(update_event_field))
            .route(endpoints::BEVERAGE_SUBMIT, post(submit_beverage_report))
            .with_state(test_state(transport));

        TestServer::try_new(app).expect("Could not create test server.")
    }

    #[tokio::test]
    async fn empty_report_is_not_sent() {
        let transport = RecordingTransport::answering(200, "");
        let server = get_server(&transport);
        server.get(endpoints::BEVERAGES_VIEW).await.assert_status_ok();

        let response = server
            .post(&format_endpoint(endpoints::BEVERAGE_SUBMIT, &[1]))
            .form(&[("report_date", "15.05.2025")])
            .await;

        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        assert!(response.text().contains("Keine Getränke eingetragen."));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn report_without_date_is_rejected() {
        let transport = RecordingTransport::answering(200, "");
        let server = get_server(&transport);
        server.get(endpoints::BEVERAGES_VIEW).await.assert_status_ok();
        server
            .put(&format_endpoint(endpoints::BEVERAGE_TALLY, &[1]))
            .form(&[("member", "anna@example.com"), ("beverage", "Bier"), ("value", "2")])
            .await
            .assert_status_ok();

        let response = server
            .post(&format_endpoint(endpoints::BEVERAGE_SUBMIT, &[1]))
            .form(&[("report_date", "")])
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn report_is_sent_with_prices_and_entries() {
        let transport = RecordingTransport::answering(200, "");
        let server = get_server(&transport);
        server.get(endpoints::BEVERAGES_VIEW).await.assert_status_ok();
        server
            .put(&format_endpoint(endpoints::BEVERAGE_TALLY, &[1]))
            .form(&[("member", "anna@example.com"), ("beverage", "Bier"), ("value", "2")])
            .await
            .assert_status_ok();
        let event = format_endpoint(endpoints::BEVERAGE_EVENT, &[1, 1]);
        server
            .put(&event)
            .form(&[("slot", "title"), ("value", "Sommerfest")])
            .await
            .assert_status_ok();
        server
            .put(&event)
            .form(&[("slot", "Wasser"), ("value", "6")])
            .await
            .assert_status_ok();

        let response = server
            .post(&format_endpoint(endpoints::BEVERAGE_SUBMIT, &[1]))
            .form(&[("report_date", "15.05.2025")])
            .await;

        response.assert_status_ok();
        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].path, "/admin/save_beverage_report");
        assert_eq!(
            requests[0].body,
            Some(json!({
                "report_date": "2025-05-15",
                "prices": [{"name": "Bier", "price": 1.2}, {"name": "Wasser", "price": 0.5}],
                "entries": [
                    {"is_event": false, "email": "anna@example.com", "event_title": null,
                     "beverage_name": "Bier", "count": 2},
                    {"is_event": true, "email": null, "event_title": "Sommerfest",
                     "beverage_name": "Wasser", "count": 6}
                ]
            }))
        );
    }
}
