use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Request for equipment in one work shift at a warehouse.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "shift_requests")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub work_date: Date,
    /// "day" or "night", see [`crate::models::shift::Shift`].
    pub shift: String,
    pub department_id: i32,
    pub warehouse_id: i32,
    pub area_id: Option<i32>,
    pub equipment_id: i32,
    pub license_plate_id: Option<i32>,
    pub requested_count: i32,
    pub worked_hours: f64,
    pub actual_cost: Option<f64>,
    pub is_worked: bool,
    pub comment: Option<String>,
    pub created_by: i32,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::departments::Entity",
        from = "Column::DepartmentId",
        to = "super::departments::Column::Id"
    )]
    Departments,
    #[sea_orm(
        belongs_to = "super::warehouses::Entity",
        from = "Column::WarehouseId",
        to = "super::warehouses::Column::Id"
    )]
    Warehouses,
    #[sea_orm(
        belongs_to = "super::equipment::Entity",
        from = "Column::EquipmentId",
        to = "super::equipment::Column::Id"
    )]
    Equipment,
}

impl Related<super::departments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Departments.def()
    }
}

impl Related<super::warehouses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Warehouses.def()
    }
}

impl Related<super::equipment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Equipment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
