mod common;

use common::*;
use special_equipment::access::AccessScope;
use special_equipment::reports::{DisplayColor, ReportDataService, ReportKind, ReportParameters, ReportRows};

fn january() -> ReportParameters {
    ReportParameters::execution(date(2024, 1, 1), date(2024, 1, 31))
}

#[tokio::test]
async fn test_execution_report_totals() {
    let conn = setup_db().await;
    let seed = seed(&conn).await;
    seed_ten_shifts(&conn, &seed).await;

    let service = ReportDataService::for_user(conn, seed.admin).await.unwrap();
    let (items, summary) = service.generate_execution_report(&january()).await.unwrap();

    assert_eq!(items.len(), 10);
    assert_eq!(items.first().map(|i| i.row_number), Some(1));
    assert_eq!(items.last().map(|i| i.row_number), Some(10));
    assert!(items.windows(2).all(|w| w[0].work_date <= w[1].work_date));

    assert_eq!(summary.total_records, 10);
    assert_eq!(summary.total_requested, 10);
    assert!((summary.total_hours - 56.0).abs() < 1e-9);
    assert!((summary.total_amount - 7.0 * 8.0 * CRANE_RATE).abs() < 1e-6);
    assert!((summary.completion_percentage - 70.0).abs() < 1e-9);
    assert!((summary.average_hourly_cost - CRANE_RATE).abs() < 1e-9);
    assert_eq!(summary.completion_color(), DisplayColor::Red);

    let not_worked = items.iter().filter(|i| !i.is_worked).count();
    assert_eq!(not_worked, 3);
    assert!(items.iter().all(|i| i.created_by == "Иванов И.И."));
}

#[tokio::test]
async fn test_execution_item_names() {
    let conn = setup_db().await;
    let seed = seed(&conn).await;
    add_shift(&conn, &seed, date(2024, 1, 5), seed.north, seed.north_main, seed.crane, Some(4.0), None).await;

    let service = ReportDataService::new(conn, AccessScope::Unrestricted);
    let (items, _) = service.generate_execution_report(&january()).await.unwrap();

    let item = &items[0];
    assert_eq!(item.department_name, "Северный филиал");
    assert_eq!(item.warehouse_name, "Склад №1");
    assert_eq!(item.equipment_name, "Автокран 25 т");
    assert_eq!(item.brand.as_deref(), Some("Галичанин"));
    assert_eq!(item.lessor_name.as_deref(), Some("ООО Техаренда"));
    assert_eq!(item.shift_name, "Дневная");
    assert_eq!(item.status_text(), "Отработано");
    assert_eq!(item.actual_cost, None);
}

#[tokio::test]
async fn test_filters_narrow_rows_and_summary() {
    let conn = setup_db().await;
    let seed = seed(&conn).await;
    seed_ten_shifts(&conn, &seed).await;
    add_shift(&conn, &seed, date(2024, 1, 10), seed.south, seed.south_main, seed.loader, Some(6.0), None).await;
    // Outside the period
    add_shift(&conn, &seed, date(2024, 2, 1), seed.north, seed.north_main, seed.crane, Some(8.0), None).await;

    let service = ReportDataService::new(conn, AccessScope::Unrestricted);

    let all = service.generate(&january()).await.unwrap();
    assert_eq!(all.rows.len(), 11);

    let mut params = january();
    params.equipment_id = Some(seed.loader);
    let report = service.generate(&params).await.unwrap();
    assert_eq!(report.rows.len(), 1);
    assert!((report.summary.total_hours - 6.0).abs() < 1e-9);
    assert_eq!(report.filter_labels, vec!["Техника: Погрузчик".to_string()]);

    let mut params = january();
    params.only_worked = true;
    params.department_id = Some(seed.north);
    let report = service.generate(&params).await.unwrap();
    assert_eq!(report.summary.total_records, 7);
    assert!((report.summary.completion_percentage - 100.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_restricted_user_sees_subset() {
    let conn = setup_db().await;
    let seed = seed(&conn).await;
    seed_ten_shifts(&conn, &seed).await;
    add_shift(&conn, &seed, date(2024, 1, 3), seed.north, seed.north_spare, seed.loader, Some(5.0), None).await;
    add_shift(&conn, &seed, date(2024, 1, 4), seed.south, seed.south_main, seed.loader, Some(7.0), None).await;

    let admin = ReportDataService::for_user(conn.clone(), seed.admin).await.unwrap();
    let operator = ReportDataService::for_user(conn, seed.operator).await.unwrap();
    assert!(admin.scope().is_unrestricted());
    assert!(!operator.scope().is_unrestricted());

    let (all, _) = admin.generate_execution_report(&january()).await.unwrap();
    let (visible, summary) = operator.generate_execution_report(&january()).await.unwrap();

    assert_eq!(all.len(), 12);
    // Ten shifts at the granted warehouse plus the whole south department
    assert_eq!(visible.len(), 11);
    assert!(visible.iter().all(|v| v.warehouse_name != "Склад №2"));
    for item in &visible {
        assert!(all.iter().any(|a| a.work_date == item.work_date
            && a.warehouse_name == item.warehouse_name
            && a.equipment_name == item.equipment_name));
    }
    assert_eq!(summary.total_records, visible.len());
    assert!((summary.total_hours - (56.0 + 7.0)).abs() < 1e-9);
}

#[tokio::test]
async fn test_unknown_user_sees_nothing() {
    let conn = setup_db().await;
    let seed = seed(&conn).await;
    seed_ten_shifts(&conn, &seed).await;

    let service = ReportDataService::for_user(conn, 9999).await.unwrap();
    let report = service.generate(&january()).await.unwrap();

    assert!(report.rows.is_empty());
    assert_eq!(report.summary.total_records, 0);
    assert_eq!(report.summary.total_hours, 0.0);
    assert_eq!(report.summary.completion_percentage, 0.0);
}

#[tokio::test]
async fn test_invalid_range_fails_before_query() {
    // No tables: any query would fail with a database error
    let conn = connect_memory().await;
    let service = ReportDataService::new(conn, AccessScope::Unrestricted);

    let params = ReportParameters::execution(date(2024, 1, 31), date(2024, 1, 1));
    let err = service.generate(&params).await.unwrap_err();
    assert!(err.is_validation());

    let mut params = ReportParameters::transport_program(2024);
    params.month = Some(13);
    let err = service.generate_transport_program_report(&params).await.unwrap_err();
    assert!(err.is_validation());
}

#[tokio::test]
async fn test_transport_program_yearly() {
    let conn = setup_db().await;
    let seed = seed(&conn).await;
    seed_ten_shifts(&conn, &seed).await;
    add_plan(&conn, seed.north, seed.crane, 1, 100.0, CRANE_RATE).await;
    add_plan(&conn, seed.north, seed.crane, 2, 50.0, CRANE_RATE).await;
    add_plan(&conn, seed.south, seed.loader, 1, 20.0, LOADER_RATE).await;

    let service = ReportDataService::new(conn, AccessScope::Unrestricted);
    let report = service.generate(&ReportParameters::transport_program(2024)).await.unwrap();
    assert_eq!(report.kind(), ReportKind::TransportProgram);

    let ReportRows::TransportProgram(items) = &report.rows else {
        panic!("expected transport program rows");
    };
    assert_eq!(items.len(), 2);

    let crane = &items[0];
    assert_eq!(crane.department_name, "Северный филиал");
    assert_eq!(crane.month, None);
    assert!((crane.planned_hours - 150.0).abs() < 1e-9);
    assert!((crane.actual_hours - 56.0).abs() < 1e-9);
    assert!((crane.planned_cost - 150.0 * CRANE_RATE).abs() < 1e-6);
    assert!((crane.actual_cost - 56.0 * CRANE_RATE).abs() < 1e-6);
    assert!((crane.completion_percentage - 56.0 / 150.0 * 100.0).abs() < 1e-9);
    assert_eq!(crane.difference_color, DisplayColor::Green);

    let loader = &items[1];
    assert_eq!(loader.actual_hours, 0.0);
    assert_eq!(loader.completion_percentage, 0.0);

    let summary = &report.summary;
    assert!((summary.total_planned_hours - 170.0).abs() < 1e-9);
    assert!((summary.completion_percentage - 56.0 / 170.0 * 100.0).abs() < 1e-9);
    assert!(summary.cost_difference < 0.0);
    assert_eq!(summary.difference_color(), DisplayColor::Green);
}

#[tokio::test]
async fn test_transport_program_monthly_breakdown() {
    let conn = setup_db().await;
    let seed = seed(&conn).await;
    seed_ten_shifts(&conn, &seed).await;
    add_plan(&conn, seed.north, seed.crane, 1, 40.0, 2000.0).await;
    add_plan(&conn, seed.north, seed.crane, 2, 50.0, 2000.0).await;

    let mut params = ReportParameters::transport_program(2024);
    params.monthly_breakdown = true;
    params.department_id = Some(seed.north);

    let service = ReportDataService::new(conn, AccessScope::Unrestricted);
    let (items, summary) = service.generate_transport_program_report(&params).await.unwrap();

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].month, Some(1));
    assert_eq!(items[0].period_label(), "Январь 2024");
    // Shifts carry their own cost
    assert!((items[0].actual_cost - 56.0 * CRANE_RATE).abs() < 1e-6);
    assert!((items[0].planned_cost - 80_000.0).abs() < 1e-6);
    assert_eq!(items[0].difference_color, DisplayColor::Red);
    assert_eq!(items[0].completion_color(), DisplayColor::Green);
    assert_eq!(items[1].actual_hours, 0.0);

    assert_eq!(summary.total_records, 2);
}

#[tokio::test]
async fn test_transport_program_scope_filters_plans() {
    let conn = setup_db().await;
    let seed = seed(&conn).await;
    add_plan(&conn, seed.north, seed.crane, 1, 100.0, CRANE_RATE).await;
    add_plan(&conn, seed.south, seed.loader, 1, 20.0, LOADER_RATE).await;
    add_shift(&conn, &seed, date(2024, 1, 10), seed.north, seed.north_spare, seed.crane, Some(8.0), None).await;

    let service = ReportDataService::new(conn, AccessScope::restricted([seed.south], Vec::<(i32, i32)>::new()));
    let (items, _) = service
        .generate_transport_program_report(&ReportParameters::transport_program(2024))
        .await
        .unwrap();

    assert_eq!(items.len(), 1);
    assert_eq!(items[0].department_name, "Южный филиал");
}

#[tokio::test]
async fn test_transport_program_warehouse_filter_narrows_plans() {
    let conn = setup_db().await;
    let seed = seed(&conn).await;
    seed_ten_shifts(&conn, &seed).await;
    add_plan(&conn, seed.north, seed.crane, 1, 100.0, CRANE_RATE).await;
    add_plan(&conn, seed.south, seed.loader, 1, 20.0, LOADER_RATE).await;

    let mut params = ReportParameters::transport_program(2024);
    params.warehouse_id = Some(seed.north_main);

    let service = ReportDataService::new(conn, AccessScope::Unrestricted);
    let report = service.generate(&params).await.unwrap();
    assert_eq!(report.filter_labels, vec!["Склад: Склад №1".to_string()]);

    let ReportRows::TransportProgram(items) = &report.rows else {
        panic!("expected transport program rows");
    };
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].department_name, "Северный филиал");
    assert!((items[0].actual_hours - 56.0).abs() < 1e-9);
    assert!((report.summary.total_planned_hours - 100.0).abs() < 1e-9);
    assert!((report.summary.completion_percentage - 56.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_transport_program_ignores_only_worked_label() {
    let conn = setup_db().await;
    seed(&conn).await;

    let mut params = ReportParameters::transport_program(2024);
    params.only_worked = true;
    let service = ReportDataService::new(conn, AccessScope::Unrestricted);
    let report = service.generate(&params).await.unwrap();
    assert!(report.filter_labels.is_empty());
}
