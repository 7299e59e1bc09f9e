pub use super::areas::Entity as Areas;
pub use super::audit_log::Entity as AuditLog;
pub use super::departments::Entity as Departments;
pub use super::equipment::Entity as Equipment;
pub use super::equipment_dependencies::Entity as EquipmentDependencies;
pub use super::favorites::Entity as Favorites;
pub use super::lessor_organizations::Entity as LessorOrganizations;
pub use super::license_plates::Entity as LicensePlates;
pub use super::roles::Entity as Roles;
pub use super::shift_requests::Entity as ShiftRequests;
pub use super::transport_programs::Entity as TransportPrograms;
pub use super::user_access::Entity as UserAccess;
pub use super::users::Entity as Users;
pub use super::warehouses::Entity as Warehouses;
