//! Database connection, schema bootstrap and repositories.

pub mod audit;
pub mod connection;
pub mod department;
pub mod equipment;
pub mod favorite;
pub mod lessor;
pub mod schema;
pub mod shift_request;
pub mod transport_program;
pub mod user;
pub mod warehouse;

pub use connection::{TableCounts, connect, get_table_counts, get_version, test_connection};
