//! Database module - MySQL implementations using SQLx
//!
//! - Connection pool management
//! - `refresh_rotations` rotation store
//! - Read-only user directory over the platform `users` table

pub mod connection;
pub mod mysql;


pub use connection::{DatabasePool, PoolStatistics};
pub use mysql::{MySqlIdentityDirectory, MySqlRotationStore};
