//! Application router configuration.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    response::Redirect,
    routing::{delete, get, post, put},
};
use tower_http::services::ServeDir;

use crate::{
    AppState,
    beverage::{
        add_event_row, get_beverages_page, remove_event_row, submit_beverage_report,
        update_event_field, update_tally,
    },
    endpoints,
    fines::{add_fine_row, get_fines_page, remove_fine_row, submit_fines, update_fine_field},
    members::{check_member_changes, get_members_page, update_member_status},
    missing_payments::{
        get_missing_payments_page, submit_missing_payments, toggle_payment, update_payment_amount,
    },
    not_found::get_404_not_found,
    reimbursement::{
        RECEIPT_UPLOAD_LIMIT, add_expense_row, get_bank_details, get_reimbursement_page,
        remove_expense_row, submit_reimbursement, update_expense_field, upload_receipt,
    },
    report::send_report,
    transactions::{
        add_transaction, delete_transaction, get_description_builder, get_transactions_page,
        get_transactions_table,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let reimbursement_routes = Router::new()
        .route(endpoints::REIMBURSEMENT_VIEW, get(get_reimbursement_page))
        .route(endpoints::REIMBURSEMENT_BANK_DETAILS, get(get_bank_details))
        .route(endpoints::REIMBURSEMENT_ROWS, post(add_expense_row))
        .route(
            endpoints::REIMBURSEMENT_ROW,
            put(update_expense_field).delete(remove_expense_row),
        )
        .route(
            endpoints::REIMBURSEMENT_RECEIPT,
            post(upload_receipt).layer(DefaultBodyLimit::max(RECEIPT_UPLOAD_LIMIT)),
        )
        .route(endpoints::REIMBURSEMENT_SUBMIT, post(submit_reimbursement));

    let beverage_routes = Router::new()
        .route(endpoints::BEVERAGES_VIEW, get(get_beverages_page))
        .route(endpoints::BEVERAGE_TALLY, put(update_tally))
        .route(endpoints::BEVERAGE_EVENTS, post(add_event_row))
        .route(
            endpoints::BEVERAGE_EVENT,
            put(update_event_field).delete(remove_event_row),
        )
        .route(endpoints::BEVERAGE_SUBMIT, post(submit_beverage_report));

    let admin_routes = Router::new()
        .route(
            endpoints::MISSING_PAYMENTS_VIEW,
            get(get_missing_payments_page),
        )
        .route(endpoints::MISSING_PAYMENT, put(update_payment_amount))
        .route(endpoints::MISSING_PAYMENT_TOGGLE, post(toggle_payment))
        .route(
            endpoints::MISSING_PAYMENTS_SUBMIT,
            post(submit_missing_payments),
        )
        .route(endpoints::FINES_VIEW, get(get_fines_page))
        .route(endpoints::FINE_ROWS, post(add_fine_row))
        .route(
            endpoints::FINE_ROW,
            put(update_fine_field).delete(remove_fine_row),
        )
        .route(endpoints::FINES_SUBMIT, post(submit_fines))
        .route(
            endpoints::TRANSACTIONS_VIEW,
            get(get_transactions_page).post(add_transaction),
        )
        .route(endpoints::TRANSACTIONS_TABLE, get(get_transactions_table))
        .route(
            endpoints::TRANSACTION_DESCRIPTION,
            get(get_description_builder),
        )
        .route(endpoints::DELETE_TRANSACTION, delete(delete_transaction))
        .route(endpoints::MEMBERS_VIEW, get(get_members_page))
        .route(endpoints::MEMBER_CHANGES, post(check_member_changes))
        .route(endpoints::MEMBER_STATUS, post(update_member_status))
        .route(endpoints::SEND_REPORT, post(send_report));

    Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .merge(reimbursement_routes)
        .merge(beverage_routes)
        .merge(admin_routes)
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .with_state(state)
}

/// The root path '/' redirects to the reimbursement form.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::REIMBURSEMENT_VIEW)
}

#[cfg(test)]
mod root_route_tests {
    use axum::http::StatusCode;
    use axum_test::TestServer;

    use crate::{
        build_router, endpoints,
        test_utils::{RecordingTransport, test_state},
    };

    fn get_server() -> TestServer {
        let transport = RecordingTransport::answering(200, "[]");

        TestServer::try_new(build_router(test_state(&transport)))
            .expect("Could not create test server.")
    }

    #[tokio::test]
    async fn root_redirects_to_reimbursement() {
        let server = get_server();

        let response = server.get(endpoints::ROOT).await;

        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(response.header("location"), endpoints::REIMBURSEMENT_VIEW);
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let server = get_server();

        let response = server.get("/does/not/exist").await;

        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn every_page_renders() {
        let server = get_server();

        for page in [
            endpoints::REIMBURSEMENT_VIEW,
            endpoints::BEVERAGES_VIEW,
            endpoints::MISSING_PAYMENTS_VIEW,
            endpoints::FINES_VIEW,
            endpoints::TRANSACTIONS_VIEW,
            endpoints::MEMBERS_VIEW,
        ] {
            let response = server.get(page).await;

            response.assert_status_ok();
            assert!(response.text().contains("<!DOCTYPE html>"), "{page} is not a page");
        }
    }
}
