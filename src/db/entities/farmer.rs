//! Farmer entity

use std::fmt;

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "farmers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<Date>,
    pub date_of_death: Option<Date>,
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.last_name, self.first_name)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::vegetable::Entity")]
    Vegetables,
    #[sea_orm(has_many = "super::farmer_family::Entity")]
    FarmerFamilies,
}

impl Related<super::vegetable::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vegetables.def()
    }
}

impl Related<super::family::Entity> for Entity {
    fn to() -> RelationDef {
        super::farmer_family::Relation::Family.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::farmer_family::Relation::Farmer.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
