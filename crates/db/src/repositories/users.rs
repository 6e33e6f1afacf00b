//! Operator account operations of the rental repository.

use chrono::Utc;
use rentdesk_core::RentalError;
use rentdesk_core::user::{
    NewUser, User, UserFilter, UserPatch, check_sign_in, ensure_admin_remains,
    normalize_username,
};
use rentdesk_shared::Role;
use rentdesk_shared::types::UserId;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseTransaction, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, TransactionTrait,
};
use tracing::info;

use super::{RentalRepository, RepositoryResult};
use crate::entities::users;

async fn load_user<C: ConnectionTrait>(conn: &C, id: UserId, lock: bool) -> RepositoryResult<User> {
    let mut query = users::Entity::find_by_id(id.into_inner());
    if lock {
        query = query.lock_exclusive();
    }
    let model = query.one(conn).await?.ok_or(RentalError::UserNotFound(id))?;
    Ok(model.into_domain()?)
}

async fn find_live_by_username<C: ConnectionTrait>(
    conn: &C,
    username: &str,
) -> RepositoryResult<Option<User>> {
    let model = users::Entity::find()
        .filter(users::Column::Username.eq(normalize_username(username)))
        .filter(users::Column::DeletedAt.is_null())
        .one(conn)
        .await?;
    Ok(model.map(users::Model::into_domain).transpose()?)
}

async fn ensure_username_free(
    txn: &DatabaseTransaction,
    username: &str,
    owner: UserId,
) -> RepositoryResult<()> {
    match find_live_by_username(txn, username).await? {
        Some(holder) if holder.id != owner => {
            Err(RentalError::UsernameTaken(username.to_string()).into())
        }
        _ => Ok(()),
    }
}

/// Locks and counts the enabled admins other than `id`.
async fn other_active_admins(txn: &DatabaseTransaction, id: UserId) -> RepositoryResult<usize> {
    let admins = users::Entity::find()
        .filter(users::Column::Role.eq(Role::Admin.as_str()))
        .filter(users::Column::Active.eq(true))
        .filter(users::Column::DeletedAt.is_null())
        .filter(users::Column::Id.ne(id.into_inner()))
        .lock_exclusive()
        .all(txn)
        .await?;
    Ok(admins.len())
}

impl RentalRepository {
    /// Creates an operator account.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is invalid, the username is taken, or
    /// the insert fails.
    pub async fn create_user(&self, input: NewUser) -> RepositoryResult<User> {
        let user = input.into_user()?;
        let txn = self.db.begin().await?;

        ensure_username_free(&txn, &user.username, user.id).await?;
        users::ActiveModel::from(&user).insert(&txn).await?;

        txn.commit().await?;
        info!(user_id = %user.id, role = %user.role, "User created");
        Ok(user)
    }

    /// Looks up a user, deleted or not.
    ///
    /// # Errors
    ///
    /// Returns an error if the user is missing or the query fails.
    pub async fn get_user(&self, id: UserId) -> RepositoryResult<User> {
        load_user(&self.db, id, false).await
    }

    /// Lists users, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_users(&self, filter: &UserFilter) -> RepositoryResult<Vec<User>> {
        let mut query = users::Entity::find();
        if !filter.include_deleted {
            query = query.filter(users::Column::DeletedAt.is_null());
        }
        if let Some(role) = filter.role {
            query = query.filter(users::Column::Role.eq(role.as_str()));
        }
        if let Some(active) = filter.active {
            query = query.filter(users::Column::Active.eq(active));
        }

        let models = query
            .order_by_desc(users::Column::CreatedAt)
            .order_by_desc(users::Column::Id)
            .all(&self.db)
            .await?;
        let users = models
            .into_iter()
            .map(users::Model::into_domain)
            .collect::<Result<_, _>>()?;
        Ok(users)
    }

    /// Updates a live user.
    ///
    /// # Errors
    ///
    /// Returns an error if the user is missing or deleted, the patch is
    /// invalid, the new username is taken, the change would leave no active
    /// admin, or the database operation fails.
    pub async fn update_user(&self, id: UserId, patch: UserPatch) -> RepositoryResult<User> {
        let password_hash = patch.hash_new_password()?;
        let txn = self.db.begin().await?;

        let current = load_user(&txn, id, true).await?;
        if current.is_deleted() {
            return Err(RentalError::UserDeleted(id).into());
        }
        let mut user = current.clone();
        patch.apply(&mut user, password_hash)?;
        ensure_username_free(&txn, &user.username, id).await?;
        ensure_admin_remains(&current, Some(&user), other_active_admins(&txn, id).await?)?;
        users::ActiveModel::from(&user).update(&txn).await?;

        txn.commit().await?;
        info!(user_id = %id, active = user.active, role = %user.role, "User updated");
        Ok(user)
    }

    /// Enables or disables a live user.
    ///
    /// # Errors
    ///
    /// Same as [`RentalRepository::update_user`].
    pub async fn set_user_active(&self, id: UserId, active: bool) -> RepositoryResult<User> {
        let patch = UserPatch {
            active: Some(active),
            ..UserPatch::default()
        };
        self.update_user(id, patch).await
    }

    /// Soft-deletes a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the user is missing, is the last active admin, or
    /// the update fails.
    pub async fn delete_user(&self, id: UserId) -> RepositoryResult<()> {
        let txn = self.db.begin().await?;

        let mut user = load_user(&txn, id, true).await?;
        if !user.is_deleted() {
            ensure_admin_remains(&user, None, other_active_admins(&txn, id).await?)?;
            let now = Utc::now();
            user.deleted_at = Some(now);
            user.updated_at = now;
            users::ActiveModel::from(&user).update(&txn).await?;
        }

        txn.commit().await?;
        info!(user_id = %id, "User deleted");
        Ok(())
    }

    /// Checks a username and password and returns the account.
    ///
    /// # Errors
    ///
    /// Returns `InvalidCredentials` or `AccountDisabled` when sign-in is
    /// refused, or an error if the query fails.
    pub async fn authenticate(&self, username: &str, password: &str) -> RepositoryResult<User> {
        let user = find_live_by_username(&self.db, username).await?;
        check_sign_in(user.as_ref(), password)?;
        Ok(user.ok_or(RentalError::InvalidCredentials)?)
    }
}
