//! Shared fixtures: an in-memory SQLite database with reference data.

#![allow(dead_code)]

use chrono::NaiveDate;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};

use special_equipment::db;
use special_equipment::entities::shift_requests;
use special_equipment::models::department::CreateDepartment;
use special_equipment::models::equipment::{CreateEquipment, CreateLessor, CreateLicensePlate};
use special_equipment::models::program::UpsertTransportProgram;
use special_equipment::models::shift::{CreateShiftRequest, Shift, UpdateShiftRequest};
use special_equipment::models::user::{CreateRole, CreateUser};
use special_equipment::models::warehouse::{CreateArea, CreateWarehouse};

pub const CRANE_RATE: f64 = 2500.0;
pub const LOADER_RATE: f64 = 1500.0;

/// IDs of the seeded reference rows.
pub struct Seed {
    pub north: i32,
    pub south: i32,
    pub north_main: i32,
    pub north_spare: i32,
    pub south_main: i32,
    pub crane: i32,
    pub loader: i32,
    pub crane_plate: i32,
    pub area: i32,
    pub admin: i32,
    pub operator: i32,
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Empty in-memory database without tables.
pub async fn connect_memory() -> DatabaseConnection {
    let mut opt = ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1).min_connections(1).sqlx_logging(false);
    Database::connect(opt).await.unwrap()
}

/// In-memory database with all tables created.
pub async fn setup_db() -> DatabaseConnection {
    special_equipment::logging::init_test();
    let conn = connect_memory().await;
    db::schema::create_all(&conn).await.unwrap();
    conn
}

/// Two departments, three warehouses, two equipment units and two users.
///
/// `operator` has a grant on the whole south department and on the main
/// warehouse of the north department only.
pub async fn seed(conn: &DatabaseConnection) -> Seed {
    let north = db::department::create(conn, CreateDepartment { name: "Северный филиал".into() })
        .await
        .unwrap()
        .id;
    let south = db::department::create(conn, CreateDepartment { name: "Южный филиал".into() })
        .await
        .unwrap()
        .id;

    let warehouse = |department_id: i32, name: &str| CreateWarehouse {
        department_id,
        name: name.to_string(),
    };
    let north_main = db::warehouse::create(conn, warehouse(north, "Склад №1")).await.unwrap().id;
    let north_spare = db::warehouse::create(conn, warehouse(north, "Склад №2")).await.unwrap().id;
    let south_main = db::warehouse::create(conn, warehouse(south, "Склад №3")).await.unwrap().id;

    let area = db::warehouse::create_area(
        conn,
        CreateArea {
            warehouse_id: north_main,
            name: "Погрузочная площадка".into(),
        },
    )
    .await
    .unwrap()
    .id;

    let lessor = db::lessor::create(
        conn,
        CreateLessor {
            name: "ООО Техаренда".into(),
            phone: None,
        },
    )
    .await
    .unwrap()
    .id;

    let crane = db::equipment::create(
        conn,
        CreateEquipment {
            name: "Автокран 25 т".into(),
            brand: Some("Галичанин".into()),
            lessor_organization_id: Some(lessor),
            hourly_cost: CRANE_RATE,
        },
    )
    .await
    .unwrap()
    .id;
    let loader = db::equipment::create(
        conn,
        CreateEquipment {
            name: "Погрузчик".into(),
            brand: None,
            lessor_organization_id: None,
            hourly_cost: LOADER_RATE,
        },
    )
    .await
    .unwrap()
    .id;

    let crane_plate = db::equipment::create_plate(
        conn,
        CreateLicensePlate {
            equipment_id: crane,
            plate_number: " а123вс77 ".into(),
        },
    )
    .await
    .unwrap()
    .id;

    let admin_role = db::user::create_role(
        conn,
        CreateRole {
            name: "Администратор".into(),
            is_admin: true,
        },
    )
    .await
    .unwrap()
    .id;
    let operator_role = db::user::create_role(
        conn,
        CreateRole {
            name: "Диспетчер".into(),
            is_admin: false,
        },
    )
    .await
    .unwrap()
    .id;

    let admin = db::user::create(
        conn,
        CreateUser {
            login: "admin".into(),
            full_name: "Иванов И.И.".into(),
            role_id: admin_role,
        },
    )
    .await
    .unwrap()
    .id;
    let operator = db::user::create(
        conn,
        CreateUser {
            login: "operator".into(),
            full_name: "Петров П.П.".into(),
            role_id: operator_role,
        },
    )
    .await
    .unwrap()
    .id;

    db::user::grant_department(conn, operator, south).await.unwrap();
    db::user::grant_warehouse(conn, operator, north_main).await.unwrap();

    Seed {
        north,
        south,
        north_main,
        north_spare,
        south_main,
        crane,
        loader,
        crane_plate,
        area,
        admin,
        operator,
    }
}

/// Insert a shift request and record its outcome.
#[allow(clippy::too_many_arguments)]
pub async fn add_shift(
    conn: &DatabaseConnection,
    seed: &Seed,
    work_date: NaiveDate,
    department_id: i32,
    warehouse_id: i32,
    equipment_id: i32,
    worked_hours: Option<f64>,
    actual_cost: Option<f64>,
) -> shift_requests::Model {
    let created = db::shift_request::create(
        conn,
        CreateShiftRequest {
            work_date,
            shift: Shift::Day,
            department_id,
            warehouse_id,
            area_id: None,
            equipment_id,
            license_plate_id: None,
            requested_count: 1,
            comment: None,
            created_by: seed.admin,
        },
    )
    .await
    .unwrap();

    let Some(hours) = worked_hours else {
        return created;
    };
    db::shift_request::update(
        conn,
        created.id,
        UpdateShiftRequest {
            worked_hours: Some(hours),
            actual_cost: Some(actual_cost),
            is_worked: Some(true),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .unwrap()
}

/// Ten crane shifts in January 2024 at the north main warehouse.
///
/// Records 3, 6 and 9 are not worked; the rest worked 8 h at the
/// contract rate.
pub async fn seed_ten_shifts(conn: &DatabaseConnection, seed: &Seed) {
    for i in 0..10u32 {
        let worked = !matches!(i, 2 | 5 | 8);
        add_shift(
            conn,
            seed,
            date(2024, 1, 1 + i * 3),
            seed.north,
            seed.north_main,
            seed.crane,
            worked.then_some(8.0),
            worked.then_some(8.0 * CRANE_RATE),
        )
        .await;
    }
}

pub async fn add_plan(
    conn: &DatabaseConnection,
    department_id: i32,
    equipment_id: i32,
    month: i32,
    planned_hours: f64,
    hourly_cost: f64,
) {
    db::transport_program::upsert(
        conn,
        UpsertTransportProgram {
            department_id,
            equipment_id,
            year: 2024,
            month,
            planned_hours,
            hourly_cost,
        },
    )
    .await
    .unwrap();
}
