//! Department DTOs for create and update operations.

use serde::{Deserialize, Serialize};

/// DTO for creating a department.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDepartment {
    pub name: String,
}

/// DTO for updating a department.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateDepartment {
    pub name: Option<String>,
    pub is_active: Option<bool>,
}
