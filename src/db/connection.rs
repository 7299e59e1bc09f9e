//! Database connection pool and utility functions.

use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, DbErr, PaginatorTrait, Statement,
};
use std::time::Duration;
use tracing::log::LevelFilter;

/// Create a new database connection with configured pool settings.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(database_url);
    opt.max_connections(5)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(10))
        .idle_timeout(Duration::from_secs(300))
        .sqlx_logging(true)
        .sqlx_logging_level(LevelFilter::Debug);

    Database::connect(opt).await
}

/// Test database connection by executing a simple query.
pub async fn test_connection(db: &DatabaseConnection) -> Result<(), DbErr> {
    db.execute_unprepared("SELECT 1").await?;
    Ok(())
}

/// Get the server version string for the connected backend.
pub async fn get_version(db: &DatabaseConnection) -> Result<String, DbErr> {
    let backend = db.get_database_backend();
    let sql = match backend {
        DatabaseBackend::Sqlite => "SELECT 'SQLite ' || sqlite_version() AS version",
        _ => "SELECT version() AS version",
    };

    let result = db.query_one(Statement::from_string(backend, sql.to_owned())).await?;

    match result {
        Some(row) => {
            let version: String = row.try_get("", "version")?;
            Ok(version)
        }
        None => Ok("Unknown".to_owned()),
    }
}

/// Registry and workload counters for the dashboard.
pub async fn get_table_counts(db: &DatabaseConnection) -> Result<TableCounts, DbErr> {
    use crate::entities::{departments, equipment, prelude::*, shift_requests, warehouses};
    use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};

    Ok(TableCounts {
        departments: Departments::find()
            .filter(departments::Column::IsActive.eq(true))
            .count(db)
            .await?,
        warehouses: Warehouses::find()
            .filter(warehouses::Column::IsActive.eq(true))
            .count(db)
            .await?,
        equipment: Equipment::find()
            .filter(equipment::Column::IsActive.eq(true))
            .count(db)
            .await?,
        lessors: LessorOrganizations::find().count(db).await?,
        shift_requests: ShiftRequests::find().count(db).await?,
        worked_shifts: ShiftRequests::find()
            .filter(shift_requests::Column::IsWorked.eq(true))
            .count(db)
            .await?,
        transport_programs: TransportPrograms::find().count(db).await?,
    })
}

/// Dashboard counters. Reference tables count active rows only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableCounts {
    pub departments: u64,
    pub warehouses: u64,
    pub equipment: u64,
    pub lessors: u64,
    pub shift_requests: u64,
    pub worked_shifts: u64,
    pub transport_programs: u64,
}

impl TableCounts {
    /// Shift requests not (yet) marked as worked.
    pub fn open_shifts(&self) -> u64 {
        self.shift_requests.saturating_sub(self.worked_shifts)
    }
}
