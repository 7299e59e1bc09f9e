//! Shift request repository.

use chrono::Utc;
use crate::entities::{prelude::*, shift_requests};
use crate::models::shift::{CreateShiftRequest, ShiftQuery, UpdateShiftRequest};
use sea_orm::*;

/// Shift requests matching the query, oldest first.
pub async fn find(db: &DatabaseConnection, query: &ShiftQuery) -> Result<Vec<shift_requests::Model>, DbErr> {
    let mut select = ShiftRequests::find()
        .filter(shift_requests::Column::WorkDate.between(query.start_date, query.end_date));

    if let Some(id) = query.department_id {
        select = select.filter(shift_requests::Column::DepartmentId.eq(id));
    }
    if let Some(id) = query.warehouse_id {
        select = select.filter(shift_requests::Column::WarehouseId.eq(id));
    }
    if let Some(id) = query.equipment_id {
        select = select.filter(shift_requests::Column::EquipmentId.eq(id));
    }
    if query.only_worked {
        select = select.filter(shift_requests::Column::IsWorked.eq(true));
    }

    select
        .order_by_asc(shift_requests::Column::WorkDate)
        .order_by_asc(shift_requests::Column::Id)
        .all(db)
        .await
}

pub async fn get_by_id(db: &DatabaseConnection, id: i32) -> Result<Option<shift_requests::Model>, DbErr> {
    ShiftRequests::find_by_id(id).one(db).await
}

/// Create a pending (not yet worked) shift request.
pub async fn create(db: &DatabaseConnection, data: CreateShiftRequest) -> Result<shift_requests::Model, DbErr> {
    let model = shift_requests::ActiveModel {
        work_date: Set(data.work_date),
        shift: Set(data.shift.as_str().to_owned()),
        department_id: Set(data.department_id),
        warehouse_id: Set(data.warehouse_id),
        area_id: Set(data.area_id),
        equipment_id: Set(data.equipment_id),
        license_plate_id: Set(data.license_plate_id),
        requested_count: Set(data.requested_count),
        worked_hours: Set(0.0),
        actual_cost: Set(None),
        is_worked: Set(false),
        comment: Set(data.comment),
        created_by: Set(data.created_by),
        created_at: Set(Utc::now().into()),
        ..Default::default()
    };
    model.insert(db).await
}

/// Record the outcome of a shift.
pub async fn update(
    db: &DatabaseConnection,
    id: i32,
    data: UpdateShiftRequest,
) -> Result<Option<shift_requests::Model>, DbErr> {
    let Some(model) = ShiftRequests::find_by_id(id).one(db).await? else {
        return Ok(None);
    };

    let mut active: shift_requests::ActiveModel = model.into();
    if let Some(hours) = data.worked_hours {
        active.worked_hours = Set(hours);
    }
    if let Some(cost) = data.actual_cost {
        active.actual_cost = Set(cost);
    }
    if let Some(is_worked) = data.is_worked {
        active.is_worked = Set(is_worked);
    }
    if let Some(plate) = data.license_plate_id {
        active.license_plate_id = Set(plate);
    }
    if let Some(comment) = data.comment {
        active.comment = Set(comment);
    }

    Ok(Some(active.update(db).await?))
}
