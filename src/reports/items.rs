//! Report rows and summary, created per request and never persisted.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::params::{ReportKind, month_name};

/// Completion of a plan in percent. A zero plan counts as 0%.
pub fn completion_percentage(actual: f64, planned: f64) -> f64 {
    if planned == 0.0 { 0.0 } else { actual / planned * 100.0 }
}

/// Text color of a value cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DisplayColor {
    Green,
    Red,
}

impl DisplayColor {
    /// Spending at or under plan is favorable.
    pub fn for_cost_difference(difference: f64) -> Self {
        if difference <= 0.0 { Self::Green } else { Self::Red }
    }

    /// Meeting or exceeding the plan is favorable.
    pub fn for_completion(percentage: f64) -> Self {
        if percentage >= 100.0 { Self::Green } else { Self::Red }
    }

    pub fn for_worked(is_worked: bool) -> Self {
        if is_worked { Self::Green } else { Self::Red }
    }

    pub fn rgb(&self) -> u32 {
        match self {
            Self::Green => 0x00_80_00,
            Self::Red => 0xC0_00_00,
        }
    }
}

/// One shift/equipment assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionReportItem {
    pub row_number: usize,
    pub work_date: NaiveDate,
    pub shift_name: String,
    pub department_name: String,
    pub warehouse_name: String,
    pub area_name: Option<String>,
    pub equipment_name: String,
    pub plate_number: Option<String>,
    pub lessor_name: Option<String>,
    pub brand: Option<String>,
    pub requested_count: i32,
    pub worked_hours: f64,
    pub actual_cost: Option<f64>,
    /// Contract rate of the equipment.
    pub hourly_cost: f64,
    pub is_worked: bool,
    pub comment: Option<String>,
    pub created_by: String,
}

impl ExecutionReportItem {
    pub fn status_text(&self) -> &'static str {
        if self.is_worked { "Отработано" } else { "Не отработано" }
    }

    pub fn status_color(&self) -> DisplayColor {
        DisplayColor::for_worked(self.is_worked)
    }
}

/// Plan vs fact for one department/equipment pair over a year or month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransportProgramReportItem {
    pub row_number: usize,
    pub department_name: String,
    pub equipment_name: String,
    pub year: i32,
    /// Set when the report is broken down by month.
    pub month: Option<u32>,
    pub hourly_cost: f64,
    pub planned_hours: f64,
    pub actual_hours: f64,
    pub completion_percentage: f64,
    pub planned_cost: f64,
    pub actual_cost: f64,
    /// `actual_cost - planned_cost`
    pub cost_difference: f64,
    pub difference_color: DisplayColor,
}

impl TransportProgramReportItem {
    /// Build a row, deriving completion, difference and color.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        department_name: String,
        equipment_name: String,
        year: i32,
        month: Option<u32>,
        hourly_cost: f64,
        planned_hours: f64,
        planned_cost: f64,
        actual_hours: f64,
        actual_cost: f64,
    ) -> Self {
        let cost_difference = actual_cost - planned_cost;
        Self {
            row_number: 0,
            department_name,
            equipment_name,
            year,
            month,
            hourly_cost,
            planned_hours,
            actual_hours,
            completion_percentage: completion_percentage(actual_hours, planned_hours),
            planned_cost,
            actual_cost,
            cost_difference,
            difference_color: DisplayColor::for_cost_difference(cost_difference),
        }
    }

    /// "2024" or "Март 2024".
    pub fn period_label(&self) -> String {
        match self.month {
            Some(month) => format!("{} {}", month_name(month), self.year),
            None => self.year.to_string(),
        }
    }

    pub fn completion_color(&self) -> DisplayColor {
        DisplayColor::for_completion(self.completion_percentage)
    }
}

/// Aggregates over exactly the items of one report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub total_records: usize,
    /// Worked hours (execution) or actual hours (program).
    pub total_hours: f64,
    /// Actual cost.
    pub total_amount: f64,
    /// Unweighted mean of per-item hourly costs.
    pub average_hourly_cost: f64,
    pub completion_percentage: f64,
    /// Execution only: requested equipment units.
    pub total_requested: i64,
    /// Program only.
    pub total_planned_hours: f64,
    /// Program only.
    pub total_planned_amount: f64,
    /// Program only: `total_amount - total_planned_amount`.
    pub cost_difference: f64,
}

impl ReportSummary {
    pub fn difference_color(&self) -> DisplayColor {
        DisplayColor::for_cost_difference(self.cost_difference)
    }

    pub fn completion_color(&self) -> DisplayColor {
        DisplayColor::for_completion(self.completion_percentage)
    }
}

/// Rows of a generated report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ReportRows {
    Execution(Vec<ExecutionReportItem>),
    TransportProgram(Vec<TransportProgramReportItem>),
}

impl ReportRows {
    pub fn len(&self) -> usize {
        match self {
            ReportRows::Execution(items) => items.len(),
            ReportRows::TransportProgram(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Result of one report request, ready for preview or export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedReport {
    pub rows: ReportRows,
    pub summary: ReportSummary,
    /// Human-readable filters ("Подразделение: Склад №1", ...).
    pub filter_labels: Vec<String>,
}

impl GeneratedReport {
    pub fn kind(&self) -> ReportKind {
        match self.rows {
            ReportRows::Execution(_) => ReportKind::Execution,
            ReportRows::TransportProgram(_) => ReportKind::TransportProgram,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_guards_zero_plan() {
        assert_eq!(completion_percentage(10.0, 0.0), 0.0);
        assert_eq!(completion_percentage(0.0, 0.0), 0.0);
        assert!((completion_percentage(45.0, 60.0) - 75.0).abs() < 1e-9);
    }

    #[test]
    fn test_program_item_derives_fields() {
        let item = TransportProgramReportItem::new(
            "Склад".into(),
            "Кран".into(),
            2024,
            None,
            1000.0,
            100.0,
            100_000.0,
            120.0,
            125_000.0,
        );
        assert!((item.completion_percentage - 120.0).abs() < 1e-9);
        assert!((item.cost_difference - 25_000.0).abs() < 1e-9);
        assert_eq!(item.difference_color, DisplayColor::Red);
        assert_eq!(item.completion_color(), DisplayColor::Green);
    }

    #[test]
    fn test_difference_color_boundary() {
        assert_eq!(DisplayColor::for_cost_difference(0.0), DisplayColor::Green);
        assert_eq!(DisplayColor::for_cost_difference(-0.01), DisplayColor::Green);
        assert_eq!(DisplayColor::for_cost_difference(0.01), DisplayColor::Red);
    }

    #[test]
    fn test_completion_color_boundary() {
        assert_eq!(DisplayColor::for_completion(100.0), DisplayColor::Green);
        assert_eq!(DisplayColor::for_completion(99.99), DisplayColor::Red);
    }

    #[test]
    fn test_period_label() {
        let mut item =
            TransportProgramReportItem::new("A".into(), "B".into(), 2024, None, 0.0, 0.0, 0.0, 0.0, 0.0);
        assert_eq!(item.period_label(), "2024");
        item.month = Some(1);
        assert_eq!(item.period_label(), "Январь 2024");
    }
}
