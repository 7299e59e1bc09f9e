//! Report kinds and request parameters.

use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Available reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ReportKind {
    /// Shift-by-shift execution of equipment requests.
    #[default]
    Execution,
    /// Planned vs actual utilization per department and equipment.
    TransportProgram,
}

impl ReportKind {
    /// Title printed in the first sheet row.
    pub fn title(&self) -> &'static str {
        match self {
            ReportKind::Execution => "Отчет об исполнении заявок на спецтехнику",
            ReportKind::TransportProgram => "Исполнение транспортной программы",
        }
    }

    /// Worksheet name (Excel limits it to 31 characters).
    pub fn sheet_name(&self) -> &'static str {
        match self {
            ReportKind::Execution => "Исполнение заявок",
            ReportKind::TransportProgram => "Транспортная программа",
        }
    }

    /// File name stem, title with whitespace replaced.
    pub fn file_title(&self) -> String {
        self.title().split_whitespace().collect::<Vec<_>>().join("_")
    }

    /// Number of sheet columns.
    pub fn column_count(&self) -> u16 {
        match self {
            ReportKind::Execution => 15,
            ReportKind::TransportProgram => 11,
        }
    }
}

/// Russian month name, 1-based.
pub fn month_name(month: u32) -> &'static str {
    const NAMES: [&str; 12] = [
        "Январь",
        "Февраль",
        "Март",
        "Апрель",
        "Май",
        "Июнь",
        "Июль",
        "Август",
        "Сентябрь",
        "Октябрь",
        "Ноябрь",
        "Декабрь",
    ];
    month
        .checked_sub(1)
        .and_then(|i| NAMES.get(i as usize))
        .copied()
        .unwrap_or("")
}

/// First and last day of a year, or of one month of it.
pub fn period_bounds(year: i32, month: Option<u32>) -> Option<(NaiveDate, NaiveDate)> {
    match month {
        None => Some((
            NaiveDate::from_ymd_opt(year, 1, 1)?,
            NaiveDate::from_ymd_opt(year, 12, 31)?,
        )),
        Some(month) => {
            let start = NaiveDate::from_ymd_opt(year, month, 1)?;
            let next = if month == 12 {
                NaiveDate::from_ymd_opt(year + 1, 1, 1)?
            } else {
                NaiveDate::from_ymd_opt(year, month + 1, 1)?
            };
            Some((start, next.pred_opt()?))
        }
    }
}

/// Filter input collected from the parameters form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportParameters {
    pub kind: ReportKind,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub department_id: Option<i32>,
    pub warehouse_id: Option<i32>,
    pub equipment_id: Option<i32>,
    pub only_worked: bool,
    pub monthly_breakdown: bool,
}

impl Default for ReportParameters {
    fn default() -> Self {
        let today = Local::now().date_naive();
        Self {
            kind: ReportKind::Execution,
            start_date: today.with_day(1).unwrap_or(today),
            end_date: today,
            year: Some(today.year()),
            month: None,
            department_id: None,
            warehouse_id: None,
            equipment_id: None,
            only_worked: false,
            monthly_breakdown: false,
        }
    }
}

impl ReportParameters {
    /// Execution report over an inclusive date range.
    pub fn execution(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            kind: ReportKind::Execution,
            start_date,
            end_date,
            ..Default::default()
        }
    }

    /// Transport program report for a year.
    pub fn transport_program(year: i32) -> Self {
        Self {
            kind: ReportKind::TransportProgram,
            year: Some(year),
            ..Default::default()
        }
    }

    /// Check the invariants of the selected report kind.
    pub fn validate(&self) -> Result<()> {
        self.validate_for(self.kind)
    }

    /// Check the invariants of `kind`, regardless of `self.kind`.
    pub fn validate_for(&self, kind: ReportKind) -> Result<()> {
        match kind {
            ReportKind::Execution => {
                if self.start_date > self.end_date {
                    return Err(AppError::validation(format!(
                        "start date {} is after end date {}",
                        self.start_date.format("%d.%m.%Y"),
                        self.end_date.format("%d.%m.%Y")
                    )));
                }
            }
            ReportKind::TransportProgram => {
                let Some(year) = self.year else {
                    return Err(AppError::validation("transport program report requires a year"));
                };
                if !(2000..=2100).contains(&year) {
                    return Err(AppError::validation(format!("year {year} is out of range")));
                }
                if let Some(month) = self.month
                    && !(1..=12).contains(&month)
                {
                    return Err(AppError::validation(format!("month {month} is out of range")));
                }
            }
        }
        Ok(())
    }

    pub fn title(&self) -> &'static str {
        self.kind.title()
    }

    /// Description row: period, then the active filters.
    pub fn description(&self, filter_labels: &[String]) -> String {
        std::iter::once(self.period_label())
            .chain(filter_labels.iter().cloned())
            .collect::<Vec<_>>()
            .join("; ")
    }

    /// Period part of the description row.
    pub fn period_label(&self) -> String {
        match self.kind {
            ReportKind::Execution => format!(
                "Период: {} – {}",
                self.start_date.format("%d.%m.%Y"),
                self.end_date.format("%d.%m.%Y")
            ),
            ReportKind::TransportProgram => {
                let year = self.year.map(|y| y.to_string()).unwrap_or_default();
                match self.month {
                    Some(month) => format!("Период: {} {}", month_name(month), year),
                    None => format!("Период: {year} год"),
                }
            }
        }
    }
}
