//! # Database Module
//!
//! Storage for the electricians collection: the [`ElectricianStore`] seam,
//! its PostgreSQL implementation on a deadpool/tokio-postgres pool, an
//! in-memory implementation, models and migrations.

pub mod connection;
pub mod electricians;
pub mod memory;
pub mod migrations;
pub mod models;
pub mod store;

pub use connection::{DatabaseConfig, DatabaseConnection};
pub use memory::MemoryStore;
pub use models::{Electrician, NewElectrician};
pub use store::{ElectricianStore, Proximity, SearchQuery, StoreError};
