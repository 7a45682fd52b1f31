//! The configuration file listing members, beverage prices and monthly fees.

use std::{collections::HashSet, fs, path::Path};

use serde::Deserialize;

use crate::{Error, backend::BeveragePrice, member::Member};

/// The monthly contribution for a resident member, in euros.
pub const DEFAULT_RESIDENT_FEE: f64 = 15.0;
/// The monthly contribution for a member living elsewhere, in euros.
pub const DEFAULT_NON_RESIDENT_FEE: f64 = 12.5;

/// The monthly contributions members owe.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct MonthlyFees {
    /// Owed by members living in the house.
    #[serde(default = "default_resident_fee")]
    pub resident: f64,
    /// Owed by everyone else.
    #[serde(default = "default_non_resident_fee")]
    pub non_resident: f64,
}

impl Default for MonthlyFees {
    fn default() -> Self {
        Self {
            resident: DEFAULT_RESIDENT_FEE,
            non_resident: DEFAULT_NON_RESIDENT_FEE,
        }
    }
}

impl MonthlyFees {
    /// The fee owed by a member with the given residency.
    pub fn for_member(&self, is_resident: bool) -> f64 {
        if is_resident {
            self.resident
        } else {
            self.non_resident
        }
    }
}

fn default_resident_fee() -> f64 {
    DEFAULT_RESIDENT_FEE
}

fn default_non_resident_fee() -> f64 {
    DEFAULT_NON_RESIDENT_FEE
}

/// Everything the pages need to know that is not fetched from the backend.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Config {
    /// The club's members in display order.
    pub members: Vec<Member>,
    /// The beverage assortment and its prices.
    #[serde(default)]
    pub beverages: Vec<BeveragePrice>,
    /// The monthly contributions.
    #[serde(default)]
    pub fees: MonthlyFees,
}

impl Config {
    /// Read the configuration from the JSON file at `path`.
    ///
    /// # Errors
    /// Returns [Error::ConfigError] if the file cannot be read or is invalid.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let text = fs::read_to_string(path).map_err(|error| {
            Error::ConfigError(format!("could not read {}: {error}", path.display()))
        })?;

        Self::from_json(&text)
    }

    /// Parse and validate a configuration.
    ///
    /// # Errors
    /// Returns [Error::ConfigError] if the JSON is malformed, a member's
    /// e-mail address appears twice or a price is negative.
    pub fn from_json(text: &str) -> Result<Self, Error> {
        let config: Config =
            serde_json::from_str(text).map_err(|error| Error::ConfigError(error.to_string()))?;

        let mut emails = HashSet::new();
        for member in &config.members {
            if !emails.insert(member.email.to_lowercase()) {
                return Err(Error::ConfigError(format!(
                    "the member {} is listed more than once",
                    member.email
                )));
            }
        }

        if let Some(beverage) = config
            .beverages
            .iter()
            .find(|beverage| !beverage.price.is_finite() || beverage.price < 0.0)
        {
            return Err(Error::ConfigError(format!(
                "the price of {} must be a non-negative number",
                beverage.name
            )));
        }

        Ok(config)
    }

    /// Find a member by e-mail address, ignoring case.
    pub fn member(&self, email: &str) -> Option<&Member> {
        self.members
            .iter()
            .find(|member| member.email.eq_ignore_ascii_case(email))
    }
}
