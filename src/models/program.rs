//! Transport program DTOs.

use serde::{Deserialize, Serialize};

/// Plan for one department/equipment pair in one month.
/// Replaces an existing plan for the same key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpsertTransportProgram {
    pub department_id: i32,
    pub equipment_id: i32,
    pub year: i32,
    pub month: i32,
    pub planned_hours: f64,
    pub hourly_cost: f64,
}
