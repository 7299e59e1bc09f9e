//! Shaping raw records into report rows and summaries.

use std::collections::{BTreeMap, HashMap};

use chrono::Datelike;
use sea_orm::{DatabaseConnection, DbErr};
use tracing::warn;

use crate::db;
use crate::entities::{equipment, shift_requests, transport_programs};
use crate::models::shift::Shift;

use super::items::{ExecutionReportItem, ReportSummary, TransportProgramReportItem, completion_percentage};
use super::params::{ReportKind, ReportParameters};

/// Master data needed to turn IDs into names.
#[derive(Debug, Clone, Default)]
pub struct Lookups {
    pub departments: HashMap<i32, String>,
    pub warehouses: HashMap<i32, String>,
    /// Warehouse id to the department that owns it.
    pub warehouse_departments: HashMap<i32, i32>,
    pub areas: HashMap<i32, String>,
    pub equipment: HashMap<i32, equipment::Model>,
    pub plates: HashMap<i32, String>,
    pub lessors: HashMap<i32, String>,
    pub users: HashMap<i32, String>,
}

impl Lookups {
    pub async fn load(conn: &DatabaseConnection) -> Result<Self, DbErr> {
        let warehouses = db::warehouse::list_all(conn).await?;
        Ok(Self {
            departments: db::department::list_all(conn)
                .await?
                .into_iter()
                .map(|d| (d.id, d.name))
                .collect(),
            warehouse_departments: warehouses.iter().map(|w| (w.id, w.department_id)).collect(),
            warehouses: warehouses.into_iter().map(|w| (w.id, w.name)).collect(),
            areas: db::warehouse::list_areas(conn)
                .await?
                .into_iter()
                .map(|a| (a.id, a.name))
                .collect(),
            equipment: db::equipment::list_all(conn)
                .await?
                .into_iter()
                .map(|e| (e.id, e))
                .collect(),
            plates: db::equipment::list_plates(conn)
                .await?
                .into_iter()
                .map(|p| (p.id, p.plate_number))
                .collect(),
            lessors: db::lessor::list_all(conn)
                .await?
                .into_iter()
                .map(|l| (l.id, l.name))
                .collect(),
            users: db::user::list_all(conn)
                .await?
                .into_iter()
                .map(|u| (u.id, u.full_name))
                .collect(),
        })
    }

    fn department_name(&self, id: i32) -> String {
        self.departments.get(&id).cloned().unwrap_or_else(|| format!("#{id}"))
    }

    fn warehouse_name(&self, id: i32) -> String {
        self.warehouses.get(&id).cloned().unwrap_or_else(|| format!("#{id}"))
    }

    /// Department owning a warehouse, if the warehouse is known.
    pub fn warehouse_department(&self, warehouse_id: i32) -> Option<i32> {
        self.warehouse_departments.get(&warehouse_id).copied()
    }

    fn equipment_name(&self, id: i32) -> String {
        self.equipment
            .get(&id)
            .map(|e| e.name.clone())
            .unwrap_or_else(|| format!("#{id}"))
    }

    fn equipment_rate(&self, id: i32) -> f64 {
        self.equipment.get(&id).map(|e| e.hourly_cost).unwrap_or(0.0)
    }

    /// Labels of the active filters for the description row.
    pub fn filter_labels(&self, params: &ReportParameters) -> Vec<String> {
        let mut labels = Vec::new();
        if let Some(id) = params.department_id {
            labels.push(format!("Подразделение: {}", self.department_name(id)));
        }
        if let Some(id) = params.warehouse_id {
            labels.push(format!("Склад: {}", self.warehouse_name(id)));
        }
        if let Some(id) = params.equipment_id {
            labels.push(format!("Техника: {}", self.equipment_name(id)));
        }
        // Program actuals always come from worked shifts.
        if params.only_worked && params.kind == ReportKind::Execution {
            labels.push("Только отработанные".to_string());
        }
        labels
    }
}

fn shift_rank(shift: &str) -> u8 {
    match shift.parse::<Shift>() {
        Ok(Shift::Day) => 0,
        Ok(Shift::Night) => 1,
        Err(_) => 2,
    }
}

/// Rows of the execution report, sorted and numbered from 1.
pub fn build_execution_items(records: &[shift_requests::Model], lookups: &Lookups) -> Vec<ExecutionReportItem> {
    let mut keyed: Vec<(u8, ExecutionReportItem)> = records
        .iter()
        .map(|r| {
            let equipment = lookups.equipment.get(&r.equipment_id);
            let item = ExecutionReportItem {
                row_number: 0,
                work_date: r.work_date,
                shift_name: r
                    .shift
                    .parse::<Shift>()
                    .map(|s| s.display_name().to_string())
                    .unwrap_or_else(|_| r.shift.clone()),
                department_name: lookups.department_name(r.department_id),
                warehouse_name: lookups.warehouse_name(r.warehouse_id),
                area_name: r.area_id.and_then(|id| lookups.areas.get(&id).cloned()),
                equipment_name: lookups.equipment_name(r.equipment_id),
                plate_number: r.license_plate_id.and_then(|id| lookups.plates.get(&id).cloned()),
                lessor_name: equipment
                    .and_then(|e| e.lessor_organization_id)
                    .and_then(|id| lookups.lessors.get(&id).cloned()),
                brand: equipment.and_then(|e| e.brand.clone()),
                requested_count: r.requested_count,
                worked_hours: r.worked_hours,
                actual_cost: r.actual_cost,
                hourly_cost: equipment.map(|e| e.hourly_cost).unwrap_or(0.0),
                is_worked: r.is_worked,
                comment: r.comment.clone(),
                created_by: lookups
                    .users
                    .get(&r.created_by)
                    .cloned()
                    .unwrap_or_default(),
            };
            (shift_rank(&r.shift), item)
        })
        .collect();

    keyed.sort_by(|(rank_a, a), (rank_b, b)| {
        a.work_date
            .cmp(&b.work_date)
            .then(rank_a.cmp(rank_b))
            .then_with(|| a.department_name.cmp(&b.department_name))
            .then_with(|| a.warehouse_name.cmp(&b.warehouse_name))
            .then_with(|| a.equipment_name.cmp(&b.equipment_name))
    });

    keyed
        .into_iter()
        .enumerate()
        .map(|(idx, (_, mut item))| {
            item.row_number = idx + 1;
            item
        })
        .collect()
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 { 0.0 } else { sum / count as f64 }
}

/// Summary of execution rows. Completion is the share of worked rows.
pub fn summarize_execution(items: &[ExecutionReportItem]) -> ReportSummary {
    let worked = items.iter().filter(|i| i.is_worked).count();
    ReportSummary {
        total_records: items.len(),
        total_hours: items.iter().map(|i| i.worked_hours).sum(),
        total_amount: items.iter().filter_map(|i| i.actual_cost).sum(),
        average_hourly_cost: mean(items.iter().map(|i| i.hourly_cost)),
        completion_percentage: completion_percentage(worked as f64, items.len() as f64),
        total_requested: items.iter().map(|i| i64::from(i.requested_count)).sum(),
        ..Default::default()
    }
}

#[derive(Default)]
struct ProgramAccumulator {
    planned_hours: f64,
    planned_cost: f64,
    rate: Option<f64>,
    actual_hours: f64,
    actual_cost: f64,
}

/// Rows of the transport program report.
///
/// One row per department/equipment pair for the year, or per pair and
/// month with `monthly`. Worked shifts without a plan still produce a row
/// with zero planned values. A shift without an actual cost is valued at
/// the plan rate of its month, then the equipment contract rate.
pub fn build_program_items(
    year: i32,
    plans: &[transport_programs::Model],
    worked: &[shift_requests::Model],
    lookups: &Lookups,
    monthly: bool,
) -> Vec<TransportProgramReportItem> {
    // (department, equipment, month or 0)
    let mut groups: BTreeMap<(i32, i32, u32), ProgramAccumulator> = BTreeMap::new();
    let mut plan_rates: HashMap<(i32, i32, u32), f64> = HashMap::new();

    for plan in plans {
        let Some(month) = u32::try_from(plan.month).ok().filter(|m| (1..=12).contains(m)) else {
            warn!("Skipping transport program {} with month {}", plan.id, plan.month);
            continue;
        };
        plan_rates.insert((plan.department_id, plan.equipment_id, month), plan.hourly_cost);

        let key = (plan.department_id, plan.equipment_id, if monthly { month } else { 0 });
        let acc = groups.entry(key).or_default();
        acc.planned_hours += plan.planned_hours;
        acc.planned_cost += plan.planned_hours * plan.hourly_cost;
        acc.rate.get_or_insert(plan.hourly_cost);
    }

    for shift in worked.iter().filter(|s| s.is_worked) {
        let month = shift.work_date.month();
        let rate = plan_rates
            .get(&(shift.department_id, shift.equipment_id, month))
            .copied()
            .unwrap_or_else(|| lookups.equipment_rate(shift.equipment_id));

        let key = (shift.department_id, shift.equipment_id, if monthly { month } else { 0 });
        let acc = groups.entry(key).or_default();
        acc.actual_hours += shift.worked_hours;
        acc.actual_cost += shift.actual_cost.unwrap_or(shift.worked_hours * rate);
    }

    let mut items: Vec<TransportProgramReportItem> = groups
        .into_iter()
        .map(|((department_id, equipment_id, month), acc)| {
            let hourly_cost = if acc.planned_hours > 0.0 {
                acc.planned_cost / acc.planned_hours
            } else {
                acc.rate.unwrap_or_else(|| lookups.equipment_rate(equipment_id))
            };
            TransportProgramReportItem::new(
                lookups.department_name(department_id),
                lookups.equipment_name(equipment_id),
                year,
                (month > 0).then_some(month),
                hourly_cost,
                acc.planned_hours,
                acc.planned_cost,
                acc.actual_hours,
                acc.actual_cost,
            )
        })
        .collect();

    items.sort_by(|a, b| {
        a.department_name
            .cmp(&b.department_name)
            .then_with(|| a.equipment_name.cmp(&b.equipment_name))
            .then_with(|| a.month.cmp(&b.month))
    });
    for (idx, item) in items.iter_mut().enumerate() {
        item.row_number = idx + 1;
    }
    items
}

/// Summary of program rows. Completion is total actual over total plan.
pub fn summarize_program(items: &[TransportProgramReportItem]) -> ReportSummary {
    let total_hours: f64 = items.iter().map(|i| i.actual_hours).sum();
    let total_planned_hours: f64 = items.iter().map(|i| i.planned_hours).sum();
    let total_amount: f64 = items.iter().map(|i| i.actual_cost).sum();
    let total_planned_amount: f64 = items.iter().map(|i| i.planned_cost).sum();

    ReportSummary {
        total_records: items.len(),
        total_hours,
        total_amount,
        average_hourly_cost: mean(items.iter().map(|i| i.hourly_cost)),
        completion_percentage: completion_percentage(total_hours, total_planned_hours),
        total_requested: 0,
        total_planned_hours,
        total_planned_amount,
        cost_difference: total_amount - total_planned_amount,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    fn lookups() -> Lookups {
        let mut l = Lookups::default();
        l.departments.insert(1, "Северный".into());
        l.departments.insert(2, "Южный".into());
        l.warehouses.insert(10, "Склад А".into());
        l.warehouses.insert(20, "Склад Б".into());
        l.warehouse_departments.insert(10, 1);
        l.warehouse_departments.insert(20, 2);
        l.lessors.insert(5, "ООО Аренда".into());
        l.users.insert(7, "Иванов И.И.".into());
        l.plates.insert(3, "А123ВС77".into());
        l.equipment.insert(
            100,
            equipment::Model {
                id: 100,
                name: "Автокран 25 т".into(),
                brand: Some("Ивановец".into()),
                lessor_organization_id: Some(5),
                hourly_cost: 2500.0,
                is_active: true,
            },
        );
        l.equipment.insert(
            200,
            equipment::Model {
                id: 200,
                name: "Погрузчик".into(),
                brand: None,
                lessor_organization_id: None,
                hourly_cost: 1500.0,
                is_active: true,
            },
        );
        l
    }

    fn shift(id: i32, date: (i32, u32, u32), shift: &str, dept: i32, equipment: i32) -> shift_requests::Model {
        shift_requests::Model {
            id,
            work_date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            shift: shift.to_string(),
            department_id: dept,
            warehouse_id: if dept == 1 { 10 } else { 20 },
            area_id: None,
            equipment_id: equipment,
            license_plate_id: None,
            requested_count: 1,
            worked_hours: 8.0,
            actual_cost: None,
            is_worked: true,
            comment: None,
            created_by: 7,
            created_at: Utc::now().into(),
        }
    }

    fn plan(dept: i32, equipment: i32, month: i32, hours: f64, rate: f64) -> transport_programs::Model {
        transport_programs::Model {
            id: 0,
            department_id: dept,
            equipment_id: equipment,
            year: 2024,
            month,
            planned_hours: hours,
            hourly_cost: rate,
        }
    }

    #[test]
    fn test_execution_items_sorted_and_numbered() {
        let records = vec![
            shift(1, (2024, 1, 2), "day", 1, 100),
            shift(2, (2024, 1, 1), "night", 1, 100),
            shift(3, (2024, 1, 1), "day", 2, 200),
            shift(4, (2024, 1, 1), "day", 1, 200),
        ];
        let items = build_execution_items(&records, &lookups());

        let order: Vec<(usize, &str, &str)> = items
            .iter()
            .map(|i| (i.row_number, i.shift_name.as_str(), i.department_name.as_str()))
            .collect();
        assert_eq!(
            order,
            vec![
                (1, "Дневная", "Северный"),
                (2, "Дневная", "Южный"),
                (3, "Ночная", "Северный"),
                (4, "Дневная", "Северный"),
            ]
        );
        assert_eq!(items[3].work_date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
    }

    #[test]
    fn test_execution_item_resolves_names() {
        let mut record = shift(1, (2024, 1, 1), "day", 1, 100);
        record.license_plate_id = Some(3);
        let items = build_execution_items(&[record], &lookups());
        let item = &items[0];

        assert_eq!(item.equipment_name, "Автокран 25 т");
        assert_eq!(item.brand.as_deref(), Some("Ивановец"));
        assert_eq!(item.lessor_name.as_deref(), Some("ООО Аренда"));
        assert_eq!(item.plate_number.as_deref(), Some("А123ВС77"));
        assert_eq!(item.created_by, "Иванов И.И.");
        assert_eq!(item.hourly_cost, 2500.0);
    }

    #[test]
    fn test_execution_summary() {
        let mut records: Vec<_> = (1..=4).map(|i| shift(i, (2024, 1, 1), "day", 1, 100)).collect();
        records[0].actual_cost = Some(20_000.0);
        records[1].actual_cost = Some(10_000.0);
        records[2].is_worked = false;
        records[2].worked_hours = 0.0;
        records[3].equipment_id = 200;
        records[3].requested_count = 3;

        let items = build_execution_items(&records, &lookups());
        let summary = summarize_execution(&items);

        assert_eq!(summary.total_records, 4);
        assert!(approx_eq(summary.total_hours, 24.0));
        assert!(approx_eq(summary.total_amount, 30_000.0));
        // (2500 * 3 + 1500) / 4
        assert!(approx_eq(summary.average_hourly_cost, 2250.0));
        assert!(approx_eq(summary.completion_percentage, 75.0));
        assert_eq!(summary.total_requested, 6);
    }

    #[test]
    fn test_empty_summary_is_zero() {
        let summary = summarize_execution(&[]);
        assert_eq!(summary.total_records, 0);
        assert_eq!(summary.average_hourly_cost, 0.0);
        assert_eq!(summary.completion_percentage, 0.0);

        let summary = summarize_program(&[]);
        assert_eq!(summary.completion_percentage, 0.0);
    }

    #[test]
    fn test_program_items_yearly() {
        let plans = vec![plan(1, 100, 1, 100.0, 2000.0), plan(1, 100, 2, 100.0, 3000.0)];
        let mut worked = vec![
            shift(1, (2024, 1, 10), "day", 1, 100),
            shift(2, (2024, 2, 10), "day", 1, 100),
        ];
        worked[1].actual_cost = Some(50_000.0);

        let items = build_program_items(2024, &plans, &worked, &lookups(), false);
        assert_eq!(items.len(), 1);
        let item = &items[0];

        assert_eq!(item.month, None);
        assert!(approx_eq(item.planned_hours, 200.0));
        assert!(approx_eq(item.planned_cost, 500_000.0));
        assert!(approx_eq(item.hourly_cost, 2500.0));
        assert!(approx_eq(item.actual_hours, 16.0));
        // January shift valued at the January plan rate.
        assert!(approx_eq(item.actual_cost, 8.0 * 2000.0 + 50_000.0));
        assert!(approx_eq(item.completion_percentage, 8.0));
        assert!(approx_eq(item.cost_difference, item.actual_cost - item.planned_cost));
    }

    #[test]
    fn test_program_items_monthly_and_unplanned() {
        let plans = vec![plan(1, 100, 1, 10.0, 2000.0), plan(1, 100, 2, 0.0, 2000.0)];
        let worked = vec![
            shift(1, (2024, 1, 10), "day", 1, 100),
            shift(2, (2024, 1, 11), "day", 1, 100),
            shift(3, (2024, 2, 10), "day", 1, 100),
            shift(4, (2024, 3, 10), "night", 2, 200),
        ];

        let items = build_program_items(2024, &plans, &worked, &lookups(), true);
        let keys: Vec<(&str, Option<u32>)> = items
            .iter()
            .map(|i| (i.department_name.as_str(), i.month))
            .collect();
        assert_eq!(
            keys,
            vec![("Северный", Some(1)), ("Северный", Some(2)), ("Южный", Some(3))]
        );

        // January: 16 of 10 planned hours.
        assert!(approx_eq(items[0].completion_percentage, 160.0));
        // February: zero plan.
        assert_eq!(items[1].completion_percentage, 0.0);
        // Unplanned usage valued at the contract rate, over budget.
        assert!(approx_eq(items[2].planned_hours, 0.0));
        assert!(approx_eq(items[2].actual_cost, 8.0 * 1500.0));
        assert!(approx_eq(items[2].hourly_cost, 1500.0));
        assert_eq!(items[2].difference_color, crate::reports::DisplayColor::Red);

        let numbers: Vec<usize> = items.iter().map(|i| i.row_number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
    }

    #[test]
    fn test_program_summary_uses_totals() {
        let plans = vec![plan(1, 100, 1, 100.0, 1000.0), plan(2, 200, 1, 300.0, 1000.0)];
        let worked = vec![shift(1, (2024, 1, 10), "day", 1, 100)];
        let items = build_program_items(2024, &plans, &worked, &lookups(), false);
        let summary = summarize_program(&items);

        assert_eq!(summary.total_records, 2);
        assert!(approx_eq(summary.total_planned_hours, 400.0));
        assert!(approx_eq(summary.total_hours, 8.0));
        assert!(approx_eq(summary.completion_percentage, 2.0));
        assert!(approx_eq(summary.cost_difference, 8_000.0 - 400_000.0));
        assert_eq!(summary.difference_color(), crate::reports::DisplayColor::Green);
    }

    #[test]
    fn test_program_items_skip_out_of_range_months() {
        let plans = vec![
            plan(1, 100, 0, 50.0, 2000.0),
            plan(1, 100, 12, 30.0, 2000.0),
            plan(1, 100, 13, 100.0, 2000.0),
        ];
        let items = build_program_items(2024, &plans, &[], &lookups(), true);

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].month, Some(12));
        assert!(approx_eq(items[0].planned_hours, 30.0));
    }

    #[test]
    fn test_only_worked_label_for_execution_only() {
        let mut params = ReportParameters::execution(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
        );
        params.only_worked = true;
        params.warehouse_id = Some(10);
        assert_eq!(
            lookups().filter_labels(&params),
            vec!["Склад: Склад А".to_string(), "Только отработанные".to_string()]
        );

        let mut params = ReportParameters::transport_program(2024);
        params.only_worked = true;
        assert!(lookups().filter_labels(&params).is_empty());
        assert_eq!(lookups().warehouse_department(20), Some(2));
        assert_eq!(lookups().warehouse_department(99), None);
    }
}
