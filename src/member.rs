//! Club members as configured for the treasury pages.

use std::{
    fmt,
    sync::{Arc, Mutex, MutexGuard},
};

use serde::{Deserialize, Deserializer, Serialize};
use time::Date;

use crate::{Error, date::parse_iso_date};

/// The members as last saved to the backend, shared between request handlers.
pub type SharedRoster = Arc<Mutex<Vec<Member>>>;

/// Lock `roster`, logging a poisoned lock.
pub fn lock_roster(roster: &Mutex<Vec<Member>>) -> Result<MutexGuard<'_, Vec<Member>>, Error> {
    roster.lock().map_err(|error| {
        tracing::error!("could not acquire member roster lock: {error}");
        Error::MemberLockError
    })
}

/// A member's status in the club.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemberTitle {
    /// Full member.
    #[serde(rename = "CB")]
    Cb,
    /// Inactive full member.
    #[serde(rename = "iaCB")]
    IaCb,
    /// Alumnus, no longer pays monthly contributions.
    #[serde(rename = "AH")]
    Ah,
    /// Candidate.
    #[serde(rename = "F")]
    F,
}

impl MemberTitle {
    /// Every title in the order they are offered.
    pub const ALL: [MemberTitle; 4] = [
        MemberTitle::Cb,
        MemberTitle::IaCb,
        MemberTitle::Ah,
        MemberTitle::F,
    ];

    /// The title as shown and sent to the backend, e.g. "iaCB".
    pub fn as_str(self) -> &'static str {
        match self {
            MemberTitle::Cb => "CB",
            MemberTitle::IaCb => "iaCB",
            MemberTitle::Ah => "AH",
            MemberTitle::F => "F",
        }
    }

    /// Parse a title as sent by the title selection.
    pub fn parse(text: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|title| title.as_str() == text)
    }
}

impl fmt::Display for MemberTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A club member.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Member {
    /// Identifies the member towards the backend.
    pub email: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// The member's current status.
    pub title: MemberTitle,
    /// Whether the member lives in the house, which decides their monthly fee.
    pub is_resident: bool,
    /// The day the member joined, monthly contributions are due from this month on.
    #[serde(deserialize_with = "deserialize_iso_date")]
    pub created_at: Date,
}

impl Member {
    /// Whether the member owes monthly contributions.
    pub fn pays_contributions(&self) -> bool {
        self.title != MemberTitle::Ah
    }

    /// "First Last".
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

fn deserialize_iso_date<'de, D>(deserializer: D) -> Result<Date, D::Error>
where
    D: Deserializer<'de>,
{
    let text = String::deserialize(deserializer)?;

    parse_iso_date(&text)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid date \"{text}\", want YYYY-MM-DD")))
}
