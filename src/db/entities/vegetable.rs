//! Vegetable entity - the catalog record, not a specific harvested instance

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "vegetables")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    pub farmer_id: Option<i32>,
    pub summary: String,
    pub isbn: String, // 13 characters
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::farmer::Entity",
        from = "Column::FarmerId",
        to = "super::farmer::Column::Id",
        on_delete = "SetNull"
    )]
    Farmer,
    #[sea_orm(has_many = "super::vegetable_instance::Entity")]
    Instances,
    #[sea_orm(has_many = "super::vegetable_family::Entity")]
    VegetableFamilies,
}

impl Related<super::farmer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Farmer.def()
    }
}

impl Related<super::vegetable_instance::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Instances.def()
    }
}

impl Related<super::family::Entity> for Entity {
    fn to() -> RelationDef {
        super::vegetable_family::Relation::Family.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::vegetable_family::Relation::Vegetable.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
