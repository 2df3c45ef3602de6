//! Electrician store abstraction
//!
//! Handlers talk to the collection through [`ElectricianStore`] so the
//! PostgreSQL backend and the in-memory backend are interchangeable.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::database::models::Electrician;

/// Page size when the client does not ask for one
pub const DEFAULT_SEARCH_LIMIT: u32 = 10;

/// Radius of a proximity search, in meters
pub const DEFAULT_SEARCH_RADIUS_METERS: f64 = 90_000.0;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to get DB connection")]
    Pool(#[from] deadpool_postgres::PoolError),

    #[error("database query failed")]
    Query(#[from] tokio_postgres::Error),

    #[error("invalid stored record: {0}")]
    InvalidRecord(String),
}

/// Proximity filter around a coordinate pair
#[derive(Debug, Clone, PartialEq)]
pub struct Proximity {
    pub longitude: f64,
    pub latitude: f64,
    pub max_distance_meters: f64,
}

/// Conjunctive search over the collection, sorted by name
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    pub skip: u32,
    /// Page size; `None` returns every match after `skip`
    pub limit: Option<u32>,
    /// Full-text terms over name and address; any term may match
    pub text: Option<String>,
    /// Case-insensitive name prefix
    pub name_prefix: Option<String>,
    pub near: Option<Proximity>,
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: Some(DEFAULT_SEARCH_LIMIT),
            text: None,
            name_prefix: None,
            near: None,
        }
    }
}

#[async_trait]
pub trait ElectricianStore: Send + Sync {
    /// Every record, in insertion order
    async fn list(&self) -> Result<Vec<Electrician>, StoreError>;

    async fn search(&self, query: &SearchQuery) -> Result<Vec<Electrician>, StoreError>;

    async fn insert(&self, electrician: &Electrician) -> Result<(), StoreError>;

    /// Returns `false` when no record had this id
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;

    async fn health_check(&self) -> Result<(), StoreError>;
}
