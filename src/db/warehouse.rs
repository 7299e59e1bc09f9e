//! Warehouse and area repository.

use crate::entities::{areas, prelude::*, warehouses};
use crate::models::warehouse::{CreateArea, CreateWarehouse, UpdateWarehouse};
use sea_orm::*;

/// List all warehouses ordered by name.
pub async fn list_all(db: &DatabaseConnection) -> Result<Vec<warehouses::Model>, DbErr> {
    Warehouses::find()
        .order_by_asc(warehouses::Column::Name)
        .all(db)
        .await
}

/// List warehouses of a department.
pub async fn list_by_department(db: &DatabaseConnection, department_id: i32) -> Result<Vec<warehouses::Model>, DbErr> {
    Warehouses::find()
        .filter(warehouses::Column::DepartmentId.eq(department_id))
        .order_by_asc(warehouses::Column::Name)
        .all(db)
        .await
}

pub async fn create(db: &DatabaseConnection, data: CreateWarehouse) -> Result<warehouses::Model, DbErr> {
    let model = warehouses::ActiveModel {
        department_id: Set(data.department_id),
        name: Set(data.name),
        is_active: Set(true),
        ..Default::default()
    };
    model.insert(db).await
}

pub async fn update(
    db: &DatabaseConnection,
    id: i32,
    data: UpdateWarehouse,
) -> Result<Option<warehouses::Model>, DbErr> {
    let Some(model) = Warehouses::find_by_id(id).one(db).await? else {
        return Ok(None);
    };

    let mut active: warehouses::ActiveModel = model.into();
    if let Some(department_id) = data.department_id {
        active.department_id = Set(department_id);
    }
    if let Some(name) = data.name {
        active.name = Set(name);
    }
    if let Some(is_active) = data.is_active {
        active.is_active = Set(is_active);
    }

    Ok(Some(active.update(db).await?))
}

pub async fn delete(db: &DatabaseConnection, id: i32) -> Result<bool, DbErr> {
    let result = Warehouses::delete_by_id(id).exec(db).await?;
    Ok(result.rows_affected > 0)
}

/// Every area, for name lookups.
pub async fn list_areas(db: &DatabaseConnection) -> Result<Vec<areas::Model>, DbErr> {
    Areas::find().order_by_asc(areas::Column::Name).all(db).await
}

/// List areas of a warehouse.
pub async fn list_areas_by_warehouse(db: &DatabaseConnection, warehouse_id: i32) -> Result<Vec<areas::Model>, DbErr> {
    Areas::find()
        .filter(areas::Column::WarehouseId.eq(warehouse_id))
        .order_by_asc(areas::Column::Name)
        .all(db)
        .await
}

pub async fn create_area(db: &DatabaseConnection, data: CreateArea) -> Result<areas::Model, DbErr> {
    let model = areas::ActiveModel {
        warehouse_id: Set(data.warehouse_id),
        name: Set(data.name),
        ..Default::default()
    };
    model.insert(db).await
}
