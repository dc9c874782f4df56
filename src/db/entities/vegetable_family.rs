//! Vegetable <-> Family link table

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "vegetable_families")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub vegetable_id: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub family_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::vegetable::Entity",
        from = "Column::VegetableId",
        to = "super::vegetable::Column::Id",
        on_delete = "Cascade"
    )]
    Vegetable,
    #[sea_orm(
        belongs_to = "super::family::Entity",
        from = "Column::FamilyId",
        to = "super::family::Column::Id",
        on_delete = "Cascade"
    )]
    Family,
}

impl Related<super::vegetable::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vegetable.def()
    }
}

impl Related<super::family::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Family.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
