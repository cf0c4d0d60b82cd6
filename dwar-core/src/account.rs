//! Account records and identity
//!
//! Accounts are the identity store records behind the login flow. The core
//! account struct is defined as follows:
//!
//! | Field           | Type                         | Description                                      |
//! | --------------- | ---------------------------- | ------------------------------------------------ |
//! | `id`            | `AccountId`                  | The unique identifier for the account.           |
//! | `username`      | `String`                     | The display handle for the account.              |
//! | `email`         | `String`                     | The email delivery channel (always present).     |
//! | `phone`         | `Option<String>`             | The SMS delivery channel, if registered.         |
//! | `role`          | `Role`                       | Authorization tag applied after verification.    |
//! | `refresh_token` | `Option<RefreshTokenRecord>` | The single active long-lived token, if any.      |
//! | `created_at`    | `DateTime`                   | The timestamp when the account was created.      |
//! | `updated_at`    | `DateTime`                   | The timestamp when the account was last updated. |
//!
//! The refresh token and its expiry live inside one `Option` so they are
//! always set together or cleared together.

use crate::{
    Error,
    error::ValidationError,
    id::{generate_prefixed_id, validate_prefixed_id},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A unique, stable identifier for a specific account
/// This value should be treated as opaque.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct AccountId(String);

impl AccountId {
    pub fn new(id: &str) -> Self {
        AccountId(id.to_string())
    }

    pub fn new_random() -> Self {
        AccountId(generate_prefixed_id("usr"))
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Validate that this ID has the correct format for an account ID
    pub fn is_valid(&self) -> bool {
        validate_prefixed_id(&self.0, "usr")
    }
}

impl Default for AccountId {
    fn default() -> Self {
        Self::new_random()
    }
}

impl From<String> for AccountId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for AccountId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Authorization tag carried in access-token claims.
///
/// Role gating happens after OTP verification, never inside the OTP
/// mechanism itself, so the same issue/verify path serves every role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    WardAdmin,
    SuperAdmin,
}

impl Role {
    /// Whether this role may use the admin login endpoints.
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::WardAdmin | Role::SuperAdmin)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::WardAdmin => "ward_admin",
            Role::SuperAdmin => "super_admin",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "user" => Some(Role::User),
            "ward_admin" => Some(Role::WardAdmin),
            "super_admin" => Some(Role::SuperAdmin),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The persisted long-lived token and its expiry.
///
/// At most one of these is live per account; issuing a new session overwrites
/// the previous record, which silently invalidates the older token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshTokenRecord {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl RefreshTokenRecord {
    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }
}

/// Representation of an account in dwar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,

    pub username: String,

    pub email: String,

    pub phone: Option<String>,

    pub role: Role,

    pub refresh_token: Option<RefreshTokenRecord>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Account {
    pub fn builder() -> AccountBuilder {
        AccountBuilder::default()
    }

    /// The value of the requested delivery channel, if the account has one.
    pub fn channel_value(&self, channel: crate::challenge::DeliveryChannel) -> Option<&str> {
        match channel {
            crate::challenge::DeliveryChannel::Email => Some(self.email.as_str()),
            crate::challenge::DeliveryChannel::Sms => self.phone.as_deref(),
        }
    }

    /// The caller-facing view of the account, with the refresh token omitted.
    pub fn profile(&self) -> AccountProfile {
        AccountProfile {
            id: self.id.clone(),
            username: self.username.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            role: self.role,
            created_at: self.created_at,
        }
    }
}

/// The account fields safe to return over the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountProfile {
    pub id: AccountId,
    pub username: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

#[derive(Default)]
pub struct AccountBuilder {
    id: Option<AccountId>,
    username: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    role: Option<Role>,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
}

impl AccountBuilder {
    pub fn id(mut self, id: AccountId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn phone(mut self, phone: Option<String>) -> Self {
        self.phone = phone;
        self
    }

    pub fn role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    pub fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    pub fn updated_at(mut self, updated_at: DateTime<Utc>) -> Self {
        self.updated_at = Some(updated_at);
        self
    }

    pub fn build(self) -> Result<Account, Error> {
        let now = Utc::now();
        Ok(Account {
            id: self.id.unwrap_or_default(),
            username: self.username.ok_or(ValidationError::MissingField(
                "Username is required".to_string(),
            ))?,
            email: self.email.ok_or(ValidationError::MissingField(
                "Email is required".to_string(),
            ))?,
            phone: self.phone,
            role: self.role.unwrap_or(Role::User),
            refresh_token: None,
            created_at: self.created_at.unwrap_or(now),
            updated_at: self.updated_at.unwrap_or(now),
        })
    }
}

/// Fields required to create a new account record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAccount {
    pub id: AccountId,
    pub username: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: Role,
}

impl NewAccount {
    pub fn new(username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: AccountId::new_random(),
            username: username.into(),
            email: email.into(),
            phone: None,
            role: Role::User,
        }
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }
}
