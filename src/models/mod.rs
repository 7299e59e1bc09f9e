//! DTOs for master data, shift requests and transport programs.

pub mod department;
pub mod equipment;
pub mod program;
pub mod shift;
pub mod user;
pub mod warehouse;

pub use department::{CreateDepartment, UpdateDepartment};
pub use equipment::{CreateEquipment, CreateLessor, CreateLicensePlate, UpdateEquipment};
pub use program::UpsertTransportProgram;
pub use shift::{CreateShiftRequest, Shift, ShiftQuery, UpdateShiftRequest};
pub use user::{CreateRole, CreateUser};
pub use warehouse::{CreateArea, CreateWarehouse, UpdateWarehouse};
