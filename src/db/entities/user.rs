//! User entity

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub username: String,
    pub password_hash: String,
    pub is_staff: bool,
    pub is_superuser: bool,
    /// Granted permissions, comma-separated (e.g. "catalog.can_mark_returned")
    pub permissions: String,
    pub created_at: i64,
}

impl Model {
    /// Superusers implicitly hold every permission.
    pub fn has_perm(&self, perm: &str) -> bool {
        self.is_superuser || self.has_explicit_perm(perm)
    }

    /// Granted by name, ignoring superuser status.
    pub fn has_explicit_perm(&self, perm: &str) -> bool {
        self.permissions
            .split(',')
            .map(str::trim)
            .any(|p| p == perm)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::vegetable_instance::Entity")]
    Loans,
}

impl Related<super::vegetable_instance::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Loans.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
