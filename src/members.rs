//! The member editor: change a member's title and residency.
//!
//! The roster in [AppState] is the snapshot every edit is compared with. It
//! only changes after the backend has stored the new status.

use axum::{
    Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use serde::Deserialize;

use crate::{
    AppState, Error,
    alert::Alert,
    backend::{BackendClient, MemberStatusUpdate},
    endpoints,
    html::{
        BUTTON_SECONDARY_STYLE, CARD_STYLE, FORM_TEXT_INPUT_STYLE, PAGE_CONTAINER_STYLE,
        TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base,
    },
    member::{Member, MemberTitle, SharedRoster, lock_roster},
    navigation::NavBar,
};

/// The state needed for the member editor.
#[derive(Debug, Clone)]
pub struct MembersState {
    pub backend: BackendClient,
    pub members: SharedRoster,
}

impl FromRef<AppState> for MembersState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            backend: state.backend.clone(),
            members: state.members.clone(),
        }
    }
}

/// The fields of one member's row.
#[derive(Debug, Clone, Deserialize)]
pub struct MemberStatusForm {
    pub email: String,
    /// One of the [MemberTitle] labels.
    pub title: String,
    /// Present only if the checkbox is ticked.
    #[serde(default)]
    pub is_resident: Option<String>,
}

impl MemberStatusForm {
    fn parse(&self) -> Result<(MemberTitle, bool), Error> {
        let title = MemberTitle::parse(&self.title)
            .ok_or_else(|| Error::InvalidForm(format!("Unbekannter Status \"{}\".", self.title)))?;

        Ok((title, self.is_resident.is_some()))
    }
}

/// Whether the action button offers to save or to edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionState {
    /// The row differs from the saved snapshot.
    Unsaved,
    /// The row matches the saved snapshot.
    Saved,
}

impl ActionState {
    /// Compare the row's values with the saved `member`.
    pub fn of(member: &Member, title: MemberTitle, is_resident: bool) -> Self {
        if member.title != title || member.is_resident != is_resident {
            ActionState::Unsaved
        } else {
            ActionState::Saved
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            ActionState::Unsaved => "unsaved",
            ActionState::Saved => "saved",
        }
    }
}

/// Render the member editor.
pub async fn get_members_page(State(state): State<MembersState>) -> Response {
    let members = match lock_roster(&state.members) {
        Ok(members) => members.clone(),
        Err(error) => return error.into_response(),
    };

    members_view(&members).into_response()
}

/// Compare a row with the saved snapshot and update its action button.
pub async fn check_member_changes(
    State(state): State<MembersState>,
    Form(form): Form<MemberStatusForm>,
) -> Response {
    let result = form.parse().and_then(|(title, is_resident)| {
        let members = lock_roster(&state.members)?;
        let (index, member) = find_member(&members, &form.email)?;

        Ok(action_button(
            index,
            ActionState::of(member, title, is_resident),
            true,
        ))
    });

    match result {
        Ok(markup) => markup.into_response(),
        Err(error) => error.into_alert_response(),
    }
}

/// Save a member's title and residency.
///
/// The snapshot is only updated once the backend accepted the change.
pub async fn update_member_status(
    State(state): State<MembersState>,
    Form(form): Form<MemberStatusForm>,
) -> Response {
    match save(&state, &form).await {
        Ok(markup) => markup.into_response(),
        Err(error @ (Error::BackendRejected { .. } | Error::BackendUnavailable(_))) => {
            tracing::error!("could not update status of {}: {error}", form.email);

            (
                StatusCode::BAD_GATEWAY,
                Alert::ErrorSimple {
                    message: "Fehler beim Speichern.".to_owned(),
                }
                .into_html(),
            )
                .into_response()
        }
        Err(error) => error.into_alert_response(),
    }
}

async fn save(state: &MembersState, form: &MemberStatusForm) -> Result<Markup, Error> {
    let (title, is_resident) = form.parse()?;
    {
        let members = lock_roster(&state.members)?;
        find_member(&members, &form.email)?;
    }

    state
        .backend
        .update_member_status(&MemberStatusUpdate {
            email: form.email.clone(),
            title: title.as_str().to_owned(),
            is_resident,
        })
        .await?;

    let mut members = lock_roster(&state.members)?;
    let index = find_member(&members, &form.email)?.0;
    let member = &mut members[index];
    member.title = title;
    member.is_resident = is_resident;
    tracing::info!("{} is now {title}, resident: {is_resident}", form.email);

    Ok(html! {
        (Alert::SuccessSimple {
            message: format!("Status von {} gespeichert.", member.full_name()),
        }.into_markup())
        (action_button(index, ActionState::Saved, true))
    })
}

fn find_member<'a>(members: &'a [Member], email: &str) -> Result<(usize, &'a Member), Error> {
    members
        .iter()
        .enumerate()
        .find(|(_, member)| member.email == email)
        .ok_or_else(|| Error::UnknownMember(email.to_owned()))
}

fn members_view(members: &[Member]) -> Markup {
    let nav_bar = NavBar::new(endpoints::MEMBERS_VIEW).into_html();

    let content = html! {
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class={ (CARD_STYLE) " max-w-5xl overflow-x-auto" }
            {
                table class="w-full text-sm text-left"
                {
                    thead class=(TABLE_HEADER_STYLE)
                    {
                        tr
                        {
                            th scope="col" class=(TABLE_CELL_STYLE) { "Name" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "E-Mail" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Status" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Im Haus" }
                            th scope="col" class=(TABLE_CELL_STYLE) { span class="sr-only" { "Aktionen" } }
                        }
                    }

                    tbody
                    {
                        @for (index, member) in members.iter().enumerate() {
                            (member_row(index, member))
                        }
                    }
                }
            }
        }
    };

    base("Mitglieder", &[], &content)
}

fn member_row(index: usize, member: &Member) -> Markup {
    html! {
        tr
            class=(TABLE_ROW_STYLE)
            data-member=(member.email)
            hx-post=(endpoints::MEMBER_CHANGES)
            hx-trigger="change"
            hx-include="this"
            hx-target="#alert-container"
        {
            th scope="row" class=(TABLE_CELL_STYLE) { (member.full_name()) }
            td class=(TABLE_CELL_STYLE)
            {
                (member.email)
                input type="hidden" name="email" value=(member.email);
            }
            td class=(TABLE_CELL_STYLE)
            {
                select
                    id={ "title-" (index) }
                    name="title"
                    data-original=(member.title.as_str())
                    class=(FORM_TEXT_INPUT_STYLE)
                {
                    @for title in MemberTitle::ALL {
                        option value=(title.as_str()) selected[title == member.title] { (title.as_str()) }
                    }
                }
            }
            td class=(TABLE_CELL_STYLE)
            {
                input
                    id={ "residency-" (index) }
                    type="checkbox"
                    name="is_resident"
                    value="true"
                    data-original=(if member.is_resident { "true" } else { "false" })
                    checked[member.is_resident];
            }
            td class={ (TABLE_CELL_STYLE) " flex gap-2" }
            {
                (action_button(index, ActionState::Saved, false))

                button
                    type="button"
                    hx-post=(endpoints::SEND_REPORT)
                    hx-vals=(serde_json::json!({ "email": member.email }).to_string())
                    hx-target="#alert-container"
                    title="Bericht senden"
                    class=(BUTTON_SECONDARY_STYLE)
                {
                    "Bericht"
                }
            }
        }
    }
}

fn action_button(index: usize, state: ActionState, oob: bool) -> Markup {
    let (label, title) = match state {
        ActionState::Unsaved => ("💾", "Änderungen speichern"),
        ActionState::Saved => ("✎", "Bearbeiten"),
    };

    html! {
        button
            id={ "action-" (index) }
            type="button"
            data-state=(state.as_str())
            hx-post=(endpoints::MEMBER_STATUS)
            hx-include="closest tr"
            hx-target="#alert-container"
            hx-swap-oob=[oob.then_some("true")]
            title=(title)
            class=(BUTTON_SECONDARY_STYLE)
        {
            (label)
        }
    }
}

#[cfg(test)]
mod members_tests {
    use axum::{
        Router,
        http::StatusCode,
        routing::{get, post},
    };
    use axum_test::TestServer;
    use scraper::{Html, Selector};
    use serde_json::json;

    use crate::{
        AppState, endpoints,
        member::MemberTitle,
        members::{check_member_changes, get_members_page, update_member_status},
        test_utils::{RecordingTransport, assert_valid_html, test_state},
    };

    fn get_server(state: AppState) -> TestServer {
        let app = Router::new()
            .route(endpoints::MEMBERS_VIEW, get(get_members_page))
            .route(endpoints::MEMBER_CHANGES, post(check_member_changes))
            .route(endpoints::MEMBER_STATUS, post(update_member_status))
            .with_state(state);

        TestServer::try_new(app).expect("Could not create test server.")
    }

    fn action_state(text: &str) -> String {
        let html = Html::parse_fragment(text);
        html.select(&Selector::parse("[data-state]").unwrap())
            .next()
            .expect("action button missing")
            .attr("data-state")
            .unwrap()
            .to_owned()
    }

    #[tokio::test]
    async fn page_shows_saved_values() {
        let transport = RecordingTransport::answering(200, "{}");
        let server = get_server(test_state(&transport));

        let response = server.get(endpoints::MEMBERS_VIEW).await;

        response.assert_status_ok();
        let html = Html::parse_document(&response.text());
        assert_valid_html(&html);
        let title = html
            .select(&Selector::parse("#title-1 option[selected]").unwrap())
            .next()
            .unwrap();
        assert_eq!(title.attr("value"), Some("F"));
        let resident = html
            .select(&Selector::parse("#residency-0").unwrap())
            .next()
            .unwrap();
        assert!(resident.attr("checked").is_some());
    }

    #[tokio::test]
    async fn changed_row_is_unsaved_until_reverted() {
        let transport = RecordingTransport::answering(200, "{}");
        let server = get_server(test_state(&transport));

        let changed = server
            .post(endpoints::MEMBER_CHANGES)
            .form(&[("email", "anna@example.com"), ("title", "iaCB"), ("is_resident", "true")])
            .await;
        let reverted = server
            .post(endpoints::MEMBER_CHANGES)
            .form(&[("email", "anna@example.com"), ("title", "CB"), ("is_resident", "true")])
            .await;

        assert_eq!(action_state(&changed.text()), "unsaved");
        assert_eq!(action_state(&reverted.text()), "saved");
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn unticked_checkbox_means_not_resident() {
        let transport = RecordingTransport::answering(200, "{}");
        let server = get_server(test_state(&transport));

        let response = server
            .post(endpoints::MEMBER_CHANGES)
            .form(&[("email", "anna@example.com"), ("title", "CB")])
            .await;

        assert_eq!(action_state(&response.text()), "unsaved");
    }

    #[tokio::test]
    async fn saving_updates_the_snapshot() {
        let transport = RecordingTransport::answering(200, "{}");
        let state = test_state(&transport);
        let server = get_server(state.clone());

        let response = server
            .post(endpoints::MEMBER_STATUS)
            .form(&[("email", "ben@example.com"), ("title", "CB"), ("is_resident", "true")])
            .await;

        response.assert_status_ok();
        assert_eq!(action_state(&response.text()), "saved");
        assert_eq!(
            transport.requests()[0].body,
            Some(json!({"email": "ben@example.com", "title": "CB", "is_resident": true}))
        );
        let members = state.members.lock().unwrap();
        assert_eq!(members[1].title, MemberTitle::Cb);
        assert!(members[1].is_resident);
    }

    #[tokio::test]
    async fn failed_save_keeps_the_snapshot() {
        let transport = RecordingTransport::answering(500, "database down");
        let state = test_state(&transport);
        let server = get_server(state.clone());

        let response = server
            .post(endpoints::MEMBER_STATUS)
            .form(&[("email", "ben@example.com"), ("title", "CB")])
            .await;

        response.assert_status(StatusCode::BAD_GATEWAY);
        assert!(response.text().contains("Fehler beim Speichern."));
        assert_eq!(state.members.lock().unwrap()[1].title, MemberTitle::F);

        let check = server
            .post(endpoints::MEMBER_CHANGES)
            .form(&[("email", "ben@example.com"), ("title", "CB")])
            .await;
        assert_eq!(action_state(&check.text()), "unsaved");
    }

    #[tokio::test]
    async fn unknown_title_is_rejected() {
        let transport = RecordingTransport::answering(200, "{}");
        let server = get_server(test_state(&transport));

        let response = server
            .post(endpoints::MEMBER_STATUS)
            .form(&[("email", "ben@example.com"), ("title", "Boss")])
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert!(transport.requests().is_empty());
    }
}
