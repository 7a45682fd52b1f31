//! Implements a struct that holds the state of the web server.

use std::sync::{Arc, Mutex};

use crate::{
    backend::BackendClient,
    beverage::BeverageForm,
    config::Config,
    fines::FineForm,
    member::SharedRoster,
    missing_payments::MissingPaymentsForm,
    reimbursement::ReimbursementForm,
    store::{FormStore, SharedFormStore},
};

/// The state of the web server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The client for the backend API that owns the club's data.
    pub backend: BackendClient,

    /// The members, beverage prices and fees loaded at startup.
    pub config: Arc<Config>,

    /// The members as last saved to the backend.
    ///
    /// Seeded from the config and updated after every successful status change.
    pub members: SharedRoster,

    /// The open reimbursement forms.
    pub reimbursement_forms: SharedFormStore<ReimbursementForm>,

    /// The open beverage reports.
    pub beverage_forms: SharedFormStore<BeverageForm>,

    /// The open missing payment selections.
    pub missing_payment_forms: SharedFormStore<MissingPaymentsForm>,

    /// The open lists of fines.
    pub fine_forms: SharedFormStore<FineForm>,
}

impl AppState {
    /// Create a new [AppState].
    ///
    /// Each page type keeps at most `session_capacity` open forms.
    pub fn new(config: Config, backend: BackendClient, session_capacity: usize) -> Self {
        let members = config.members.clone();

        Self {
            backend,
            config: Arc::new(config),
            members: Arc::new(Mutex::new(members)),
            reimbursement_forms: Arc::new(Mutex::new(FormStore::new(session_capacity))),
            beverage_forms: Arc::new(Mutex::new(FormStore::new(session_capacity))),
            missing_payment_forms: Arc::new(Mutex::new(FormStore::new(session_capacity))),
            fine_forms: Arc::new(Mutex::new(FormStore::new(session_capacity))),
        }
    }
}
