use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "equipment")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Equipment descriptor shown in reports, e.g. "Автокран 25 т".
    pub name: String,
    pub brand: Option<String>,
    pub lessor_organization_id: Option<i32>,
    /// Contract cost of one hour of work.
    pub hourly_cost: f64,
    pub is_active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::lessor_organizations::Entity",
        from = "Column::LessorOrganizationId",
        to = "super::lessor_organizations::Column::Id"
    )]
    LessorOrganizations,
    #[sea_orm(has_many = "super::license_plates::Entity")]
    LicensePlates,
}

impl Related<super::lessor_organizations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LessorOrganizations.def()
    }
}

impl Related<super::license_plates::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LicensePlates.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
