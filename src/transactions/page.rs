//! The transactions admin page: list, delete and add a member's transactions.

use std::sync::Arc;

use axum::{
    Form,
    extract::{FromRef, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use serde::Deserialize;

use crate::{
    AppState, Error,
    alert::Alert,
    backend::{BackendClient, NewTransaction, Transaction},
    config::Config,
    date::{parse_any_date, parse_display_date, to_display, to_iso},
    decimal::format_fixed,
    endpoints::{self, format_endpoint},
    html::{
        BUTTON_DELETE_STYLE, CARD_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
        PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base,
        date_picker_head, submit_button,
    },
    navigation::NavBar,
};

use super::description::{
    DescriptionInputs, PROTOCOL_TYPES, SEMESTERS, TransactionKind, build_description,
};

const TABLE_ID: &str = "transaction-table";
const BUILDER_ID: &str = "description-builder";

/// The state needed for the transactions page.
#[derive(Debug, Clone)]
pub struct TransactionsState {
    pub backend: BackendClient,
    pub config: Arc<Config>,
}

impl FromRef<AppState> for TransactionsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            backend: state.backend.clone(),
            config: state.config.clone(),
        }
    }
}

/// Selects whose transactions to list.
#[derive(Debug, Clone, Deserialize)]
pub struct MemberQuery {
    pub email: String,
}

/// The add transaction form.
#[derive(Debug, Clone, Deserialize)]
pub struct AddTransactionForm {
    /// The member to book the transaction for.
    pub email: String,
    /// Signed, a comma is accepted as the decimal separator.
    #[serde(default)]
    pub amount: String,
    #[serde(flatten)]
    pub inputs: DescriptionInputs,
}

impl AddTransactionForm {
    /// Validate the form and build the request for the backend.
    ///
    /// # Errors
    /// Returns [Error::UnknownMember] for an e-mail address that is not
    /// configured and [Error::InvalidForm] for a bad date, amount, an empty
    /// description or a generated description with unfilled fields.
    pub fn into_request(self, config: &Config) -> Result<NewTransaction, Error> {
        if config.member(&self.email).is_none() {
            return Err(Error::UnknownMember(self.email));
        }

        if let Some(field) = self.inputs.missing_field() {
            return Err(Error::InvalidForm(format!("Bitte {field} angeben.")));
        }

        let date = parse_display_date(&self.inputs.date).ok_or_else(|| {
            Error::InvalidForm("Bitte ein Datum im Format TT.MM.JJJJ angeben.".to_owned())
        })?;

        let amount = self
            .amount
            .trim()
            .replace(',', ".")
            .parse::<f64>()
            .ok()
            .filter(|amount| amount.is_finite())
            .ok_or_else(|| {
                Error::InvalidForm(format!("\"{}\" ist kein gültiger Betrag.", self.amount))
            })?;

        let description = build_description(&self.inputs);
        if description.is_empty() {
            return Err(Error::InvalidForm(
                "Bitte eine Beschreibung angeben.".to_owned(),
            ));
        }

        Ok(NewTransaction {
            email: self.email,
            date: to_iso(date),
            amount,
            description,
        })
    }
}

/// Render the transactions page. The table is loaded once the page is shown.
pub async fn get_transactions_page(State(state): State<TransactionsState>) -> Response {
    transactions_view(&state.config).into_response()
}

/// Render the table of one member's transactions.
pub async fn get_transactions_table(
    State(state): State<TransactionsState>,
    Query(query): Query<MemberQuery>,
) -> Response {
    match state.backend.get_transactions(&query.email).await {
        Ok(transactions) => transactions_table(&query.email, &transactions).into_response(),
        Err(error) => error.into_alert_response(),
    }
}

/// Render the description builder for the selected transaction type.
pub async fn get_description_builder(Query(inputs): Query<DescriptionInputs>) -> Response {
    description_builder(&inputs).into_response()
}

/// Delete a transaction and render the member's updated table.
pub async fn delete_transaction(
    State(state): State<TransactionsState>,
    Path(transaction_id): Path<i64>,
    Query(query): Query<MemberQuery>,
) -> Response {
    if let Err(error) = state
        .backend
        .delete_transaction(&query.email, transaction_id)
        .await
    {
        tracing::warn!("could not delete transaction {transaction_id}: {error}");

        let message = match error {
            Error::BackendRejected { body, .. } => format!("Error deleting transaction: {body}"),
            Error::BackendUnavailable(_) => "Network error while deleting.".to_owned(),
            error => return error.into_alert_response(),
        };

        return (StatusCode::BAD_GATEWAY, Alert::ErrorSimple { message }.into_html())
            .into_response();
    }

    tracing::info!("deleted transaction {transaction_id} of {}", query.email);

    match state.backend.get_transactions(&query.email).await {
        Ok(transactions) => transactions_table(&query.email, &transactions).into_response(),
        Err(error) => error.into_alert_response(),
    }
}

/// Book a new transaction and refresh the member's table.
pub async fn add_transaction(
    State(state): State<TransactionsState>,
    Form(form): Form<AddTransactionForm>,
) -> Response {
    match add(&state, form).await {
        Ok(response) => response,
        Err(error) => error.into_alert_response(),
    }
}

async fn add(state: &TransactionsState, form: AddTransactionForm) -> Result<Response, Error> {
    let transaction = form.into_request(&state.config)?;

    state.backend.add_transaction(&transaction).await?;
    tracing::info!(
        "added transaction \"{}\" for {}",
        transaction.description,
        transaction.email
    );

    let transactions = state.backend.get_transactions(&transaction.email).await?;

    Ok(html! {
        (Alert::Success {
            message: "Transaktion gespeichert".to_owned(),
            details: format!(
                "{} über {} € wurde gebucht.",
                transaction.description,
                format_fixed(transaction.amount)
            ),
        }.into_markup())

        div id=(TABLE_ID) hx-swap-oob="innerHTML"
        {
            (transactions_table(&transaction.email, &transactions))
        }
    }
    .into_response())
}

fn transactions_view(config: &Config) -> Markup {
    let nav_bar = NavBar::new(endpoints::TRANSACTIONS_VIEW).into_html();

    let content = html! {
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-4xl space-y-6"
            {
                h1 class="text-xl font-bold" { "Transaktionen" }

                form
                    hx-post=(endpoints::TRANSACTIONS_VIEW)
                    hx-target="#alert-container"
                    hx-disabled-elt="find button[type=submit]"
                    class={ (CARD_STYLE) " p-4 space-y-4" }
                {
                    div
                    {
                        label for="email" class=(FORM_LABEL_STYLE) { "Mitglied" }
                        select
                            id="email"
                            name="email"
                            hx-get=(endpoints::TRANSACTIONS_TABLE)
                            hx-trigger="load, change"
                            hx-target={ "#" (TABLE_ID) }
                            class=(FORM_TEXT_INPUT_STYLE)
                        {
                            @for member in &config.members {
                                option value=(member.email) { (member.full_name()) }
                            }
                        }
                    }

                    div class="grid grid-cols-2 gap-4"
                    {
                        div
                        {
                            label for="date" class=(FORM_LABEL_STYLE) { "Datum" }
                            input
                                id="date"
                                name="date"
                                type="text"
                                placeholder="TT.MM.JJJJ"
                                required
                                hx-get=(endpoints::TRANSACTION_DESCRIPTION)
                                hx-include="closest form"
                                hx-trigger="change"
                                hx-target={ "#" (BUILDER_ID) }
                                class={ "date-input " (FORM_TEXT_INPUT_STYLE) };
                        }

                        div
                        {
                            label for="amount" class=(FORM_LABEL_STYLE) { "Betrag (€)" }
                            input
                                id="amount"
                                name="amount"
                                type="number"
                                step="0.01"
                                required
                                class=(FORM_TEXT_INPUT_STYLE);
                        }
                    }

                    div
                    {
                        label for="kind" class=(FORM_LABEL_STYLE) { "Art" }
                        select
                            id="kind"
                            name="kind"
                            hx-get=(endpoints::TRANSACTION_DESCRIPTION)
                            hx-include="closest form"
                            hx-trigger="change"
                            hx-target={ "#" (BUILDER_ID) }
                            class=(FORM_TEXT_INPUT_STYLE)
                        {
                            @for kind in TransactionKind::ALL {
                                option value=(kind.as_str()) { (kind.label()) }
                            }
                        }
                    }

                    div id=(BUILDER_ID)
                    {
                        (description_builder(&DescriptionInputs::default()))
                    }

                    (submit_button("Transaktion hinzufügen"))
                }

                div id=(TABLE_ID) class=(CARD_STYLE) {}
            }
        }
    };

    base("Transaktionen", &date_picker_head(), &content)
}

/// The extra fields of the selected type and the resulting description.
fn description_builder(inputs: &DescriptionInputs) -> Markup {
    let refresh = |field: Markup| -> Markup {
        html! {
            div
                hx-get=(endpoints::TRANSACTION_DESCRIPTION)
                hx-include="closest form"
                hx-trigger="change"
                hx-target={ "#" (BUILDER_ID) }
            {
                (field)
            }
        }
    };

    let extra_fields = match inputs.kind {
        TransactionKind::Drinks => refresh(date_field(
            "drinks_report_date",
            "Datum der Getränkeabrechnung",
            &inputs.drinks_report_date,
        )),
        TransactionKind::Reimbursement => refresh(date_field(
            "refund_request_date",
            "Datum des Antrags auf Auslagenrückerstattung",
            &inputs.refund_request_date,
        )),
        TransactionKind::Fine => refresh(html! {
            div class="grid grid-cols-3 gap-4"
            {
                div
                {
                    label for="protocol_number" class=(FORM_LABEL_STYLE) { "Protokollnummer" }
                    input
                        id="protocol_number"
                        name="protocol_number"
                        type="number"
                        min="1"
                        value=(inputs.protocol_number)
                        class=(FORM_TEXT_INPUT_STYLE);
                }
                (choice_field("protocol_type", "Protokolltyp", &PROTOCOL_TYPES, &inputs.protocol_type))
                (choice_field("semester", "Semester", &SEMESTERS, &inputs.semester))
            }
        }),
        TransactionKind::Custom | TransactionKind::Credit => html! {},
    };

    let editable = inputs.kind.is_editable();
    let description_style = if editable {
        FORM_TEXT_INPUT_STYLE.to_owned()
    } else {
        format!("{FORM_TEXT_INPUT_STYLE} cursor-not-allowed bg-gray-200 dark:bg-gray-600")
    };

    html! {
        div class="space-y-4"
        {
            (extra_fields)

            div
            {
                label for="description" class=(FORM_LABEL_STYLE) { "Beschreibung" }
                input
                    id="description"
                    name="description"
                    type="text"
                    value=(build_description(inputs))
                    readonly[!editable]
                    required[editable]
                    class=(description_style);
            }
        }
    }
}

fn date_field(name: &str, label: &str, value: &str) -> Markup {
    html! {
        label for=(name) class=(FORM_LABEL_STYLE) { (label) }
        input
            id=(name)
            name=(name)
            type="text"
            placeholder="TT.MM.JJJJ"
            value=(value)
            class={ "date-input " (FORM_TEXT_INPUT_STYLE) };
    }
}

fn choice_field(name: &str, label: &str, choices: &[&str], value: &str) -> Markup {
    html! {
        div
        {
            label for=(name) class=(FORM_LABEL_STYLE) { (label) }
            select id=(name) name=(name) class=(FORM_TEXT_INPUT_STYLE)
            {
                @for choice in choices {
                    option value=(choice) selected[*choice == value] { (choice) }
                }
            }
        }
    }
}

/// The table of `email`'s transactions. Entries without an ID are skipped.
fn transactions_table(email: &str, transactions: &[Transaction]) -> Markup {
    html! {
        table class="w-full text-sm text-left"
        {
            thead class=(TABLE_HEADER_STYLE)
            {
                tr
                {
                    th scope="col" class=(TABLE_CELL_STYLE) { "Datum" }
                    th scope="col" class=(TABLE_CELL_STYLE) { "Betrag" }
                    th scope="col" class=(TABLE_CELL_STYLE) { "Beschreibung" }
                    th scope="col" class=(TABLE_CELL_STYLE) { span class="sr-only" { "Aktionen" } }
                }
            }

            tbody id="transaction-body"
            {
                @for transaction in transactions {
                    @if let Some(id) = transaction.id {
                        (transaction_row(email, id, transaction))
                    }
                }
            }
        }
    }
}

fn transaction_row(email: &str, id: i64, transaction: &Transaction) -> Markup {
    let delete_endpoint = format_endpoint(endpoints::DELETE_TRANSACTION, &[id as u64]);
    let date = parse_any_date(transaction.date.get(..10).unwrap_or(&transaction.date))
        .map(to_display)
        .unwrap_or_else(|| transaction.date.clone());

    html! {
        tr class=(TABLE_ROW_STYLE) data-transaction-id=(id)
        {
            td class=(TABLE_CELL_STYLE) { (date) }
            td class={ (TABLE_CELL_STYLE) " text-right tabular-nums" } { (format_fixed(transaction.amount)) }
            td class=(TABLE_CELL_STYLE) { (transaction.description) }
            td class=(TABLE_CELL_STYLE)
            {
                button
                    type="button"
                    title="Löschen"
                    hx-delete=(delete_endpoint)
                    hx-vals=(serde_json::json!({ "email": email }).to_string())
                    hx-confirm="Are you sure you want to delete this transaction?"
                    hx-target={ "#" (TABLE_ID) }
                    class=(BUTTON_DELETE_STYLE)
                {
                    "Löschen"
                }
            }
        }
    }
}
