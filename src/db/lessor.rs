//! Lessor organization repository.

use crate::entities::{lessor_organizations, prelude::*};
use crate::models::equipment::CreateLessor;
use sea_orm::*;

pub async fn list_all(db: &DatabaseConnection) -> Result<Vec<lessor_organizations::Model>, DbErr> {
    LessorOrganizations::find()
        .order_by_asc(lessor_organizations::Column::Name)
        .all(db)
        .await
}

pub async fn create(db: &DatabaseConnection, data: CreateLessor) -> Result<lessor_organizations::Model, DbErr> {
    let model = lessor_organizations::ActiveModel {
        name: Set(data.name),
        phone: Set(data.phone),
        ..Default::default()
    };
    model.insert(db).await
}
