//! Family entity - a categorical grouping (e.g. "Root Vegetable")

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "families")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::vegetable_family::Entity")]
    VegetableFamilies,
    #[sea_orm(has_many = "super::farmer_family::Entity")]
    FarmerFamilies,
}

impl Related<super::vegetable::Entity> for Entity {
    fn to() -> RelationDef {
        super::vegetable_family::Relation::Vegetable.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::vegetable_family::Relation::Family.def().rev())
    }
}

impl Related<super::farmer::Entity> for Entity {
    fn to() -> RelationDef {
        super::farmer_family::Relation::Farmer.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::farmer_family::Relation::Family.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
