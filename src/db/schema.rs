//! Schema bootstrap from the entity definitions.

use sea_orm::{ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, Schema};
use tracing::info;

use crate::entities::prelude::*;

async fn create_table<E: EntityTrait>(db: &DatabaseConnection, schema: &Schema, entity: E) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let mut stmt = schema.create_table_from_entity(entity);
    stmt.if_not_exists();
    db.execute(backend.build(&stmt)).await?;
    Ok(())
}

/// Create every table that does not exist yet, parents before children.
pub async fn create_all(db: &DatabaseConnection) -> Result<(), DbErr> {
    let schema = Schema::new(db.get_database_backend());

    create_table(db, &schema, Departments).await?;
    create_table(db, &schema, Warehouses).await?;
    create_table(db, &schema, Areas).await?;
    create_table(db, &schema, LessorOrganizations).await?;
    create_table(db, &schema, Equipment).await?;
    create_table(db, &schema, LicensePlates).await?;
    create_table(db, &schema, Roles).await?;
    create_table(db, &schema, Users).await?;
    create_table(db, &schema, UserAccess).await?;
    create_table(db, &schema, EquipmentDependencies).await?;
    create_table(db, &schema, ShiftRequests).await?;
    create_table(db, &schema, TransportPrograms).await?;
    create_table(db, &schema, Favorites).await?;
    create_table(db, &schema, AuditLog).await?;

    info!("Schema ready");
    Ok(())
}
