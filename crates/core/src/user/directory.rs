//! In-memory user directory.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use chrono::Utc;
use rentdesk_shared::types::UserId;

use crate::error::{RentalError, RentalResult};
use crate::user::types::{User, UserFilter, UserPatch, ensure_admin_remains, normalize_username};

/// Operator accounts by id.
///
/// Usernames are unique among accounts that are not deleted. Password
/// hashing happens before records reach the directory.
#[derive(Debug, Clone, Default)]
pub struct UserDirectory {
    users: BTreeMap<UserId, User>,
}

impl UserDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a user, including soft-deleted ones.
    pub fn get(&self, id: UserId) -> RentalResult<&User> {
        self.users.get(&id).ok_or(RentalError::UserNotFound(id))
    }

    /// Finds a live user by sign-in name.
    #[must_use]
    pub fn find_by_username(&self, username: &str) -> Option<&User> {
        let username = normalize_username(username);
        self.users
            .values()
            .find(|user| !user.is_deleted() && user.username == username)
    }

    /// Lists users matching the filter, newest first.
    #[must_use]
    pub fn list(&self, filter: &UserFilter) -> Vec<User> {
        let mut users: Vec<User> = self
            .users
            .values()
            .filter(|user| filter.matches(user))
            .cloned()
            .collect();
        users.sort_by_key(|user| Reverse((user.created_at, user.id)));
        users
    }

    /// Adds an account built by [`NewUser::into_user`](crate::user::NewUser::into_user).
    pub fn create(&mut self, user: User) -> RentalResult<User> {
        self.ensure_username_free(&user.username, user.id)?;
        self.users.insert(user.id, user.clone());
        Ok(user)
    }

    /// Inserts a user as-is. Used when loading persisted state.
    pub fn insert(&mut self, user: User) {
        self.users.insert(user.id, user);
    }

    /// Applies a patch to a live user.
    pub fn update(
        &mut self,
        id: UserId,
        patch: UserPatch,
        password_hash: Option<String>,
    ) -> RentalResult<User> {
        let current = self.live(id)?.clone();
        let mut next = current.clone();
        patch.apply(&mut next, password_hash)?;
        self.ensure_username_free(&next.username, id)?;
        ensure_admin_remains(&current, Some(&next), self.other_active_admins(id))?;
        self.users.insert(id, next.clone());
        Ok(next)
    }

    /// Enables or disables a live user.
    pub fn set_active(&mut self, id: UserId, active: bool) -> RentalResult<User> {
        let patch = UserPatch {
            active: Some(active),
            ..UserPatch::default()
        };
        self.update(id, patch, None)
    }

    /// Soft-deletes a user. Deleting twice is a no-op.
    pub fn soft_delete(&mut self, id: UserId) -> RentalResult<()> {
        let current = self.get(id)?.clone();
        if current.is_deleted() {
            return Ok(());
        }
        ensure_admin_remains(&current, None, self.other_active_admins(id))?;
        if let Some(user) = self.users.get_mut(&id) {
            let now = Utc::now();
            user.deleted_at = Some(now);
            user.updated_at = now;
        }
        Ok(())
    }

    /// Number of live accounts.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.users.values().filter(|user| !user.is_deleted()).count()
    }

    fn live(&self, id: UserId) -> RentalResult<&User> {
        let user = self.get(id)?;
        if user.is_deleted() {
            return Err(RentalError::UserDeleted(id));
        }
        Ok(user)
    }

    fn ensure_username_free(&self, username: &str, owner: UserId) -> RentalResult<()> {
        match self.find_by_username(username) {
            Some(holder) if holder.id != owner => {
                Err(RentalError::UsernameTaken(username.to_string()))
            }
            _ => Ok(()),
        }
    }

    fn other_active_admins(&self, id: UserId) -> usize {
        self.users
            .values()
            .filter(|user| user.id != id && user.is_active_admin())
            .count()
    }
}
