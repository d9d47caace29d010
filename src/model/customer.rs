use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Type-safe identifier for Customers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CustomerId(pub u32);

impl From<u32> for CustomerId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl Display for CustomerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "customer_{}", self.0)
    }
}

/// A buyer, known by a display alias (a live-platform handle or a synthesized one) and
/// optionally by a real name.
///
/// The alias is unique case-insensitively; see [`alias_key`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub alias: String,
    pub real_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for creating a new customer.
#[derive(Debug, Clone)]
pub struct CustomerCreate {
    pub alias: String,
    pub real_name: Option<String>,
}

/// Profile edit. `None` leaves a field unchanged; a blank real name clears it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomerUpdate {
    pub alias: Option<String>,
    pub real_name: Option<String>,
}

impl Customer {
    /// Real name when known, alias otherwise.
    pub fn display_name(&self) -> &str {
        self.real_name.as_deref().unwrap_or(&self.alias)
    }

    pub fn has_real_name(&self) -> bool {
        self.real_name
            .as_deref()
            .is_some_and(|name| !name.trim().is_empty())
    }
}

/// Unique-key form of an alias: trimmed and lowercased, so `@Amy` and ` @amy` collide.
pub fn alias_key(alias: &str) -> String {
    format!("alias:{}", alias.trim().to_lowercase())
}

/// Trims a free-text name, mapping blank input to `None`.
pub fn clean_name(name: &str) -> Option<String> {
    let trimmed = name.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Internal alias for a customer only known by real name, e.g. `@rasoa_be_123456`.
///
/// `stamp` disambiguates homonyms; its last six digits are used.
pub fn synthesize_alias(real_name: &str, stamp: i64) -> String {
    let slug = real_name
        .trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_");
    format!("@{}_{:06}", slug, stamp.rem_euclid(1_000_000))
}
