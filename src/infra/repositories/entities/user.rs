//! User database entity for SeaORM.

use std::collections::BTreeSet;

use sea_orm::entity::prelude::*;

use crate::domain::User;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Unique on lower(email)
    pub email: String,
    pub name: String,
    pub age: i32,
    #[sea_orm(column_type = "Text")]
    pub hashed_password: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Convert to the domain entity with its role membership
    pub fn into_domain(self, role_ids: BTreeSet<Uuid>) -> User {
        User {
            id: Some(self.id),
            email: self.email,
            name: self.name,
            age: self.age,
            hashed_password: self.hashed_password,
            role_ids,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
