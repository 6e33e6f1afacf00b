//! `SeaORM` Entity for users table.

use chrono::Utc;
use rentdesk_core::user::User;
use rentdesk_shared::Role;
use rentdesk_shared::types::UserId;
use sea_orm::Set;
use sea_orm::entity::prelude::*;

use super::decode;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub username: String,
    pub password_hash: String,
    pub role: String,
    pub phone: Option<String>,
    pub active: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub deleted_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Converts the row into the domain user.
    pub fn into_domain(self) -> Result<User, DbErr> {
        Ok(User {
            id: UserId::from_uuid(self.id),
            role: decode(Role::parse(&self.role), "role", &self.role)?,
            name: self.name,
            username: self.username,
            password_hash: self.password_hash,
            phone: self.phone,
            active: self.active,
            created_at: self.created_at.with_timezone(&Utc),
            updated_at: self.updated_at.with_timezone(&Utc),
            deleted_at: self.deleted_at.map(|at| at.with_timezone(&Utc)),
        })
    }
}

impl From<&User> for ActiveModel {
    fn from(user: &User) -> Self {
        Self {
            id: Set(user.id.into_inner()),
            name: Set(user.name.clone()),
            username: Set(user.username.clone()),
            password_hash: Set(user.password_hash.clone()),
            role: Set(user.role.as_str().to_string()),
            phone: Set(user.phone.clone()),
            active: Set(user.active),
            created_at: Set(user.created_at.into()),
            updated_at: Set(user.updated_at.into()),
            deleted_at: Set(user.deleted_at.map(Into::into)),
        }
    }
}
