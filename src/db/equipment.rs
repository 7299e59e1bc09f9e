//! Equipment, license plate and warehouse attachment repository.

use crate::entities::{equipment, equipment_dependencies, license_plates, prelude::*};
use crate::models::equipment::{CreateEquipment, CreateLicensePlate, UpdateEquipment};
use sea_orm::*;

/// List all equipment ordered by name.
pub async fn list_all(db: &DatabaseConnection) -> Result<Vec<equipment::Model>, DbErr> {
    Equipment::find()
        .order_by_asc(equipment::Column::Name)
        .all(db)
        .await
}

/// List only active equipment.
pub async fn list_active(db: &DatabaseConnection) -> Result<Vec<equipment::Model>, DbErr> {
    Equipment::find()
        .filter(equipment::Column::IsActive.eq(true))
        .order_by_asc(equipment::Column::Name)
        .all(db)
        .await
}

pub async fn get_by_id(db: &DatabaseConnection, id: i32) -> Result<Option<equipment::Model>, DbErr> {
    Equipment::find_by_id(id).one(db).await
}

pub async fn create(db: &DatabaseConnection, data: CreateEquipment) -> Result<equipment::Model, DbErr> {
    let model = equipment::ActiveModel {
        name: Set(data.name),
        brand: Set(data.brand),
        lessor_organization_id: Set(data.lessor_organization_id),
        hourly_cost: Set(data.hourly_cost),
        is_active: Set(true),
        ..Default::default()
    };
    model.insert(db).await
}

pub async fn update(
    db: &DatabaseConnection,
    id: i32,
    data: UpdateEquipment,
) -> Result<Option<equipment::Model>, DbErr> {
    let Some(model) = Equipment::find_by_id(id).one(db).await? else {
        return Ok(None);
    };

    let mut active: equipment::ActiveModel = model.into();
    if let Some(name) = data.name {
        active.name = Set(name);
    }
    if let Some(brand) = data.brand {
        active.brand = Set(brand);
    }
    if let Some(lessor) = data.lessor_organization_id {
        active.lessor_organization_id = Set(lessor);
    }
    if let Some(hourly_cost) = data.hourly_cost {
        active.hourly_cost = Set(hourly_cost);
    }
    if let Some(is_active) = data.is_active {
        active.is_active = Set(is_active);
    }

    Ok(Some(active.update(db).await?))
}

pub async fn delete(db: &DatabaseConnection, id: i32) -> Result<bool, DbErr> {
    let result = Equipment::delete_by_id(id).exec(db).await?;
    Ok(result.rows_affected > 0)
}

/// Every license plate, for number lookups.
pub async fn list_plates(db: &DatabaseConnection) -> Result<Vec<license_plates::Model>, DbErr> {
    LicensePlates::find()
        .order_by_asc(license_plates::Column::PlateNumber)
        .all(db)
        .await
}

pub async fn list_plates_for_equipment(
    db: &DatabaseConnection,
    equipment_id: i32,
) -> Result<Vec<license_plates::Model>, DbErr> {
    LicensePlates::find()
        .filter(license_plates::Column::EquipmentId.eq(equipment_id))
        .order_by_asc(license_plates::Column::PlateNumber)
        .all(db)
        .await
}

pub async fn create_plate(db: &DatabaseConnection, data: CreateLicensePlate) -> Result<license_plates::Model, DbErr> {
    let model = license_plates::ActiveModel {
        equipment_id: Set(data.equipment_id),
        plate_number: Set(data.plate_number.trim().to_uppercase()),
        is_active: Set(true),
        ..Default::default()
    };
    model.insert(db).await
}

pub async fn delete_plate(db: &DatabaseConnection, id: i32) -> Result<bool, DbErr> {
    let result = LicensePlates::delete_by_id(id).exec(db).await?;
    Ok(result.rows_affected > 0)
}

/// Equipment attached to a warehouse.
pub async fn list_for_warehouse(db: &DatabaseConnection, warehouse_id: i32) -> Result<Vec<equipment::Model>, DbErr> {
    let ids: Vec<i32> = EquipmentDependencies::find()
        .filter(equipment_dependencies::Column::WarehouseId.eq(warehouse_id))
        .all(db)
        .await?
        .into_iter()
        .map(|d| d.equipment_id)
        .collect();

    if ids.is_empty() {
        return Ok(Vec::new());
    }

    Equipment::find()
        .filter(equipment::Column::Id.is_in(ids))
        .order_by_asc(equipment::Column::Name)
        .all(db)
        .await
}

/// Attach equipment to a warehouse. Attaching twice is a no-op.
pub async fn attach_to_warehouse(
    db: &DatabaseConnection,
    equipment_id: i32,
    warehouse_id: i32,
) -> Result<equipment_dependencies::Model, DbErr> {
    let existing = EquipmentDependencies::find()
        .filter(equipment_dependencies::Column::EquipmentId.eq(equipment_id))
        .filter(equipment_dependencies::Column::WarehouseId.eq(warehouse_id))
        .one(db)
        .await?;
    if let Some(dependency) = existing {
        return Ok(dependency);
    }

    equipment_dependencies::ActiveModel {
        equipment_id: Set(equipment_id),
        warehouse_id: Set(warehouse_id),
        ..Default::default()
    }
    .insert(db)
    .await
}
