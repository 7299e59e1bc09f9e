//! Department (branch) repository.
//!
//! Departments own warehouses, shift requests and transport programs, so a
//! department that is still referenced can only be deactivated.

use crate::access::AccessScope;
use crate::entities::{departments, prelude::*, shift_requests, transport_programs, warehouses};
use crate::models::department::{CreateDepartment, UpdateDepartment};
use sea_orm::*;
use tracing::debug;

pub async fn list_all(db: &DatabaseConnection) -> Result<Vec<departments::Model>, DbErr> {
    Departments::find()
        .order_by_asc(departments::Column::Name)
        .all(db)
        .await
}

pub async fn list_active(db: &DatabaseConnection) -> Result<Vec<departments::Model>, DbErr> {
    Departments::find()
        .filter(departments::Column::IsActive.eq(true))
        .order_by_asc(departments::Column::Name)
        .all(db)
        .await
}

/// Active departments the scope can see, directly or through one of their warehouses.
pub async fn list_visible(db: &DatabaseConnection, scope: &AccessScope) -> Result<Vec<departments::Model>, DbErr> {
    let mut departments = list_active(db).await?;
    departments.retain(|d| scope.allows_department(d.id));
    Ok(departments)
}

pub async fn get_by_id(db: &DatabaseConnection, id: i32) -> Result<Option<departments::Model>, DbErr> {
    Departments::find_by_id(id).one(db).await
}

/// Create an active department. The name is stored trimmed and must be unique.
pub async fn create(db: &DatabaseConnection, data: CreateDepartment) -> Result<departments::Model, DbErr> {
    let name = data.name.trim().to_string();
    if name.is_empty() {
        return Err(DbErr::Custom("department name is empty".into()));
    }
    if name_exists(db, &name, None).await? {
        return Err(DbErr::Custom(format!("department '{name}' already exists")));
    }

    departments::ActiveModel {
        name: Set(name),
        is_active: Set(true),
        ..Default::default()
    }
    .insert(db)
    .await
}

pub async fn update(
    db: &DatabaseConnection,
    id: i32,
    data: UpdateDepartment,
) -> Result<Option<departments::Model>, DbErr> {
    let Some(model) = Departments::find_by_id(id).one(db).await? else {
        return Ok(None);
    };
    let mut active: departments::ActiveModel = model.into();

    if let Some(name) = data.name {
        let name = name.trim().to_string();
        if name_exists(db, &name, Some(id)).await? {
            return Err(DbErr::Custom(format!("department '{name}' already exists")));
        }
        active.name = Set(name);
    }
    if let Some(is_active) = data.is_active {
        active.is_active = Set(is_active);
    }

    active.update(db).await.map(Some)
}

/// Delete a department nothing refers to. Returns false when it does not exist.
pub async fn delete(db: &DatabaseConnection, id: i32) -> Result<bool, DbErr> {
    let references = Warehouses::find()
        .filter(warehouses::Column::DepartmentId.eq(id))
        .count(db)
        .await?
        + ShiftRequests::find()
            .filter(shift_requests::Column::DepartmentId.eq(id))
            .count(db)
            .await?
        + TransportPrograms::find()
            .filter(transport_programs::Column::DepartmentId.eq(id))
            .count(db)
            .await?;
    if references > 0 {
        debug!("Department {id} still has {references} dependent records");
        return Err(DbErr::Custom(format!(
            "department {id} is referenced by {references} records; deactivate it instead"
        )));
    }

    let result = Departments::delete_by_id(id).exec(db).await?;
    Ok(result.rows_affected > 0)
}

/// Whether another department already uses `name` (compared trimmed).
pub async fn name_exists(db: &DatabaseConnection, name: &str, exclude_id: Option<i32>) -> Result<bool, DbErr> {
    let mut query = Departments::find().filter(departments::Column::Name.eq(name.trim()));
    if let Some(id) = exclude_id {
        query = query.filter(departments::Column::Id.ne(id));
    }
    Ok(query.count(db).await? > 0)
}
