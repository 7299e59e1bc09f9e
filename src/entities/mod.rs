//! SeaORM entity models, one module per table.

pub mod prelude;

pub mod areas;
pub mod audit_log;
pub mod departments;
pub mod equipment;
pub mod equipment_dependencies;
pub mod favorites;
pub mod lessor_organizations;
pub mod license_plates;
pub mod roles;
pub mod shift_requests;
pub mod transport_programs;
pub mod user_access;
pub mod users;
pub mod warehouses;
