//! Transport program (annual plan) repository.

use crate::entities::{prelude::*, transport_programs};
use crate::models::program::UpsertTransportProgram;
use sea_orm::*;

/// Plans of a year, optionally narrowed to a month, department or equipment.
pub async fn find(
    db: &DatabaseConnection,
    year: i32,
    month: Option<u32>,
    department_id: Option<i32>,
    equipment_id: Option<i32>,
) -> Result<Vec<transport_programs::Model>, DbErr> {
    let mut select = TransportPrograms::find().filter(transport_programs::Column::Year.eq(year));

    if let Some(month) = month {
        select = select.filter(transport_programs::Column::Month.eq(month as i32));
    }
    if let Some(id) = department_id {
        select = select.filter(transport_programs::Column::DepartmentId.eq(id));
    }
    if let Some(id) = equipment_id {
        select = select.filter(transport_programs::Column::EquipmentId.eq(id));
    }

    select
        .order_by_asc(transport_programs::Column::DepartmentId)
        .order_by_asc(transport_programs::Column::EquipmentId)
        .order_by_asc(transport_programs::Column::Month)
        .all(db)
        .await
}

/// Insert a plan or replace the one with the same department/equipment/month.
pub async fn upsert(db: &DatabaseConnection, data: UpsertTransportProgram) -> Result<transport_programs::Model, DbErr> {
    if !(1..=12).contains(&data.month) {
        return Err(DbErr::Custom(format!("month must be within 1..=12, got {}", data.month)));
    }

    let existing = TransportPrograms::find()
        .filter(transport_programs::Column::DepartmentId.eq(data.department_id))
        .filter(transport_programs::Column::EquipmentId.eq(data.equipment_id))
        .filter(transport_programs::Column::Year.eq(data.year))
        .filter(transport_programs::Column::Month.eq(data.month))
        .one(db)
        .await?;

    match existing {
        Some(model) => {
            let mut active: transport_programs::ActiveModel = model.into();
            active.planned_hours = Set(data.planned_hours);
            active.hourly_cost = Set(data.hourly_cost);
            active.update(db).await
        }
        None => {
            transport_programs::ActiveModel {
                department_id: Set(data.department_id),
                equipment_id: Set(data.equipment_id),
                year: Set(data.year),
                month: Set(data.month),
                planned_hours: Set(data.planned_hours),
                hourly_cost: Set(data.hourly_cost),
                ..Default::default()
            }
            .insert(db)
            .await
        }
    }
}
