//! In-memory electrician store
//!
//! Used by `serve --memory` for local runs and by the handler tests. Search
//! semantics follow the PostgreSQL backend as closely as plain string
//! matching allows.

use async_trait::async_trait;
use parking_lot::RwLock;
use uuid::Uuid;

use crate::database::models::Electrician;
use crate::database::store::{ElectricianStore, SearchQuery, StoreError};

#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<Vec<Electrician>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

fn matches_text(electrician: &Electrician, text: &str) -> bool {
    let haystack = format!("{} {}", electrician.name, electrician.address).to_lowercase();
    text.split_whitespace()
        .any(|term| haystack.contains(&term.to_lowercase()))
}

fn matches(electrician: &Electrician, query: &SearchQuery) -> bool {
    if let Some(prefix) = &query.name_prefix {
        if !electrician.name.to_lowercase().starts_with(&prefix.to_lowercase()) {
            return false;
        }
    }

    if let Some(text) = &query.text {
        if !matches_text(electrician, text) {
            return false;
        }
    }

    if let Some(near) = &query.near {
        match &electrician.location {
            Some(location) => {
                if location.distance_meters(near.longitude, near.latitude) > near.max_distance_meters {
                    return false;
                }
            }
            None => return false,
        }
    }

    true
}

#[async_trait]
impl ElectricianStore for MemoryStore {
    async fn list(&self) -> Result<Vec<Electrician>, StoreError> {
        Ok(self.records.read().clone())
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<Electrician>, StoreError> {
        let mut found: Vec<Electrician> = self
            .records
            .read()
            .iter()
            .filter(|e| matches(e, query))
            .cloned()
            .collect();

        // Byte order, like `COLLATE "C"` in the PostgreSQL backend. The
        // stable sort keeps insertion order between equal names.
        found.sort_by(|a, b| a.name.cmp(&b.name));

        let limit = query.limit.map_or(usize::MAX, |l| l as usize);
        Ok(found
            .into_iter()
            .skip(query.skip as usize)
            .take(limit)
            .collect())
    }

    async fn insert(&self, electrician: &Electrician) -> Result<(), StoreError> {
        self.records.write().push(electrician.clone());
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut records = self.records.write();
        let before = records.len();
        records.retain(|e| e.id != id);
        Ok(records.len() != before)
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
