use crate::{AppState, config::Config, store::DEFAULT_SESSION_CAPACITY};

use super::RecordingTransport;

/// A resident, a non-resident candidate and an alumnus, with two beverages.
pub(crate) const TEST_CONFIG: &str = r#"{
    "members": [
        {"email": "anna@example.com", "first_name": "Anna", "last_name": "Schmidt",
         "title": "CB", "is_resident": true, "created_at": "2024-01-10"},
        {"email": "ben@example.com", "first_name": "Ben", "last_name": "Weber",
         "title": "F", "is_resident": false, "created_at": "2024-02-01"},
        {"email": "carl@example.com", "first_name": "Carl", "last_name": "Meyer",
         "title": "AH", "is_resident": false, "created_at": "2020-05-01"}
    ],
    "beverages": [{"name": "Bier", "price": 1.2}, {"name": "Wasser", "price": 0.5}]
}"#;

pub(crate) fn test_config() -> Config {
    Config::from_json(TEST_CONFIG).expect("Could not parse test config")
}

/// App state talking to `transport`.
pub(crate) fn test_state(transport: &RecordingTransport) -> AppState {
    AppState::new(test_config(), transport.client(), DEFAULT_SESSION_CAPACITY)
}
