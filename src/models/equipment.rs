//! Equipment, license plate and lessor DTOs.

use serde::{Deserialize, Serialize};

/// DTO for creating an equipment unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEquipment {
    pub name: String,
    pub brand: Option<String>,
    pub lessor_organization_id: Option<i32>,
    pub hourly_cost: f64,
}

/// DTO for updating an equipment unit.
///
/// Nested options distinguish "leave as is" from "clear".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateEquipment {
    pub name: Option<String>,
    pub brand: Option<Option<String>>,
    pub lessor_organization_id: Option<Option<i32>>,
    pub hourly_cost: Option<f64>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateLicensePlate {
    pub equipment_id: i32,
    pub plate_number: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateLessor {
    pub name: String,
    pub phone: Option<String>,
}
