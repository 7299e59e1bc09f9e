//! Shift request DTOs and the shift kind.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Work shift. Stored as `"day"` / `"night"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shift {
    Day,
    Night,
}

impl Shift {
    /// Value stored in the `shift` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            Shift::Day => "day",
            Shift::Night => "night",
        }
    }

    /// Name shown in reports.
    pub fn display_name(&self) -> &'static str {
        match self {
            Shift::Day => "Дневная",
            Shift::Night => "Ночная",
        }
    }
}

impl FromStr for Shift {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" => Ok(Shift::Day),
            "night" => Ok(Shift::Night),
            other => Err(format!("unknown shift '{other}'")),
        }
    }
}

impl fmt::Display for Shift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// DTO for creating a shift request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateShiftRequest {
    pub work_date: NaiveDate,
    pub shift: Shift,
    pub department_id: i32,
    pub warehouse_id: i32,
    pub area_id: Option<i32>,
    pub equipment_id: i32,
    pub license_plate_id: Option<i32>,
    pub requested_count: i32,
    pub comment: Option<String>,
    pub created_by: i32,
}

/// DTO for recording the outcome of a shift.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateShiftRequest {
    pub worked_hours: Option<f64>,
    pub actual_cost: Option<Option<f64>>,
    pub is_worked: Option<bool>,
    pub license_plate_id: Option<Option<i32>>,
    pub comment: Option<Option<String>>,
}

/// Filter for shift request queries. Both dates are inclusive.
#[derive(Debug, Clone, PartialEq)]
pub struct ShiftQuery {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub department_id: Option<i32>,
    pub warehouse_id: Option<i32>,
    pub equipment_id: Option<i32>,
    pub only_worked: bool,
}

impl ShiftQuery {
    pub fn between(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            start_date,
            end_date,
            department_id: None,
            warehouse_id: None,
            equipment_id: None,
            only_worked: false,
        }
    }
}
