//! Operator accounts.

use chrono::{DateTime, Utc};
use rentdesk_shared::Role;
use rentdesk_shared::types::UserId;
use serde::{Deserialize, Serialize};

use crate::error::{RentalError, RentalResult};
use crate::user::password::{hash_password, verify_password};

/// Shortest password accepted for an account.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// An operator who signs in to the desk.
///
/// The password hash never leaves the process in serialized form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    /// Unique identifier.
    pub id: UserId,
    /// Display name, used in ledger descriptions and logs.
    pub name: String,
    /// Sign-in name, stored trimmed and lowercase.
    pub username: String,
    /// Argon2id PHC string.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Admin or employee.
    pub role: Role,
    /// Phone number.
    pub phone: Option<String>,
    /// Disabled accounts cannot sign in.
    pub active: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
    /// Soft-delete marker.
    pub deleted_at: Option<DateTime<Utc>>,
}

impl User {
    /// Returns true if the user has been soft-deleted.
    #[must_use]
    pub const fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Returns true for a live, enabled administrator.
    #[must_use]
    pub const fn is_active_admin(&self) -> bool {
        !self.is_deleted() && self.active && self.role.is_admin()
    }
}

/// Trims and lowercases a username.
#[must_use]
pub fn normalize_username(username: &str) -> String {
    username.trim().to_lowercase()
}

fn default_role() -> Role {
    Role::Employee
}

const fn default_active() -> bool {
    true
}

/// Input for creating an account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    /// Display name.
    pub name: String,
    /// Sign-in name.
    pub username: String,
    /// Plaintext password; hashed before storage.
    pub password: String,
    /// Role, employee unless stated.
    #[serde(default = "default_role")]
    pub role: Role,
    /// Phone number.
    #[serde(default)]
    pub phone: Option<String>,
    /// Whether the account may sign in right away.
    #[serde(default = "default_active")]
    pub active: bool,
}

impl NewUser {
    /// Creates the input for an active account.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
        role: Role,
    ) -> Self {
        Self {
            name: name.into(),
            username: username.into(),
            password: password.into(),
            role,
            phone: None,
            active: true,
        }
    }

    /// Validates the input.
    pub fn validate(&self) -> RentalResult<()> {
        validate_user_fields(&self.name, &self.username)?;
        validate_password(&self.password)
    }

    /// Validates the input, hashes the password and builds the account.
    pub fn into_user(self) -> RentalResult<User> {
        self.validate()?;
        let password_hash = hash_password(&self.password)?;
        let now = Utc::now();
        Ok(User {
            id: UserId::new(),
            name: self.name.trim().to_string(),
            username: normalize_username(&self.username),
            password_hash,
            role: self.role,
            phone: self.phone,
            active: self.active,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        })
    }
}

/// Partial update for an account.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UserPatch {
    /// New display name.
    pub name: Option<String>,
    /// New sign-in name.
    pub username: Option<String>,
    /// New plaintext password.
    pub password: Option<String>,
    /// New role.
    pub role: Option<Role>,
    /// New phone.
    pub phone: Option<String>,
    /// Enable or disable the account.
    pub active: Option<bool>,
}

impl UserPatch {
    /// Validates and hashes the new password, if the patch carries one.
    ///
    /// Kept apart from [`UserPatch::apply`] so the slow hash runs before any
    /// record is locked.
    pub fn hash_new_password(&self) -> RentalResult<Option<String>> {
        self.password
            .as_deref()
            .map(|password| {
                validate_password(password)?;
                hash_password(password)
            })
            .transpose()
    }

    /// Applies the patch to a user and validates the result.
    pub fn apply(self, user: &mut User, password_hash: Option<String>) -> RentalResult<()> {
        let mut next = user.clone();
        if let Some(name) = self.name {
            next.name = name.trim().to_string();
        }
        if let Some(username) = self.username {
            next.username = normalize_username(&username);
        }
        if let Some(hash) = password_hash {
            next.password_hash = hash;
        }
        if let Some(role) = self.role {
            next.role = role;
        }
        if self.phone.is_some() {
            next.phone = self.phone;
        }
        if let Some(active) = self.active {
            next.active = active;
        }
        validate_user_fields(&next.name, &next.username)?;
        next.updated_at = Utc::now();
        *user = next;
        Ok(())
    }
}

/// Filter for account listings.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UserFilter {
    /// Only users with this role.
    pub role: Option<Role>,
    /// Only enabled or only disabled users.
    pub active: Option<bool>,
    /// Include soft-deleted users.
    pub include_deleted: bool,
}

impl UserFilter {
    /// Returns true if the user passes the filter.
    #[must_use]
    pub fn matches(&self, user: &User) -> bool {
        (self.include_deleted || !user.is_deleted())
            && self.role.is_none_or(|role| user.role == role)
            && self.active.is_none_or(|active| user.active == active)
    }
}

/// Checks the fields shared by creation and update.
pub fn validate_user_fields(name: &str, username: &str) -> RentalResult<()> {
    if name.trim().is_empty() {
        return Err(RentalError::MissingField("name"));
    }
    if username.trim().is_empty() {
        return Err(RentalError::MissingField("username"));
    }
    Ok(())
}

/// Rejects passwords shorter than [`MIN_PASSWORD_LENGTH`] characters.
pub fn validate_password(password: &str) -> RentalResult<()> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(RentalError::PasswordTooShort {
            min: MIN_PASSWORD_LENGTH,
        });
    }
    Ok(())
}

/// Refuses a change that would leave no enabled administrator.
///
/// `before` is the account being changed, `after` its new state (`None` when
/// it is deleted), and `other_admins` the count of other active admins.
pub fn ensure_admin_remains(
    before: &User,
    after: Option<&User>,
    other_admins: usize,
) -> RentalResult<()> {
    let still_admin = after.is_some_and(User::is_active_admin);
    if before.is_active_admin() && !still_admin && other_admins == 0 {
        return Err(RentalError::LastAdmin);
    }
    Ok(())
}

/// Checks a sign-in attempt against the stored account, if any.
///
/// Unknown and deleted users look the same as a wrong password. A disabled
/// account is reported only after the password matched.
pub fn check_sign_in(user: Option<&User>, password: &str) -> RentalResult<()> {
    let Some(user) = user.filter(|user| !user.is_deleted()) else {
        return Err(RentalError::InvalidCredentials);
    };
    if !verify_password(password, &user.password_hash)? {
        return Err(RentalError::InvalidCredentials);
    }
    if !user.active {
        return Err(RentalError::AccountDisabled);
    }
    Ok(())
}
