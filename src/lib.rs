pub mod access;
pub mod config;
pub mod credentials;
pub mod db;
pub mod entities;
pub mod error;
pub mod logging;
pub mod models;
pub mod reports;
pub mod search;
pub mod ui;

pub use error::{AppError, Result};
