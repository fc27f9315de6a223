use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::MarketError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Provider,
    Customer,
}

impl FromStr for Role {
    type Err = MarketError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim() {
            "provider" => Ok(Role::Provider),
            "customer" => Ok(Role::Customer),
            other => Err(MarketError::Validation(format!("unknown role: {other}"))),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Provider => f.write_str("provider"),
            Role::Customer => f.write_str("customer"),
        }
    }
}

/// Public-facing details a provider attaches to their account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderProfile {
    pub bio: String,
    pub phone: String,
    pub expertise: String,
    pub city: String,
    pub district: String,
}

impl ProviderProfile {
    /// Trims every field; phone, city and district must stay non-empty.
    pub fn normalized(self) -> Result<Self, MarketError> {
        let profile = Self {
            bio: self.bio.trim().to_string(),
            phone: self.phone.trim().to_string(),
            expertise: self.expertise.trim().to_string(),
            city: self.city.trim().to_string(),
            district: self.district.trim().to_string(),
        };
        if profile.phone.is_empty() || profile.city.is_empty() || profile.district.is_empty() {
            return Err(MarketError::Validation(
                "phone, city and district are required".to_string(),
            ));
        }
        Ok(profile)
    }
}

/// A registered account as held by the identity store.
///
/// The credential hash lives here and nowhere else; clients hand out
/// [`PublicUser`] instead.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub provider: Option<ProviderProfile>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for creating a new user. Fields arrive already validated and hashed.
#[derive(Debug, Clone)]
pub struct UserCreate {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub at: DateTime<Utc>,
}

/// Replaces the provider profile of an existing user.
#[derive(Debug, Clone)]
pub struct UserPatch {
    pub provider: ProviderProfile,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<ProviderProfile>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            provider: user.provider,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Lower-cases and trims an email so lookups and uniqueness ignore case and padding.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
