//! PostgreSQL-backed electrician store

use async_trait::async_trait;
use tokio_postgres::types::ToSql;
use uuid::Uuid;

use crate::database::connection::DatabaseConnection;
use crate::database::models::{Electrician, FromRow, EARTH_RADIUS_METERS};
use crate::database::store::{ElectricianStore, SearchQuery, StoreError};

const COLUMNS: &str = "id, name, address, longitude, latitude";

type Param = Box<dyn ToSql + Sync + Send>;

/// Escape LIKE metacharacters so the hint only ever matches literally
fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn push_param(params: &mut Vec<Param>, value: impl ToSql + Sync + Send + 'static) -> String {
    params.push(Box::new(value));
    format!("${}", params.len())
}

/// Build the SQL and parameters for a search
pub(crate) fn build_search(query: &SearchQuery) -> (String, Vec<Param>) {
    let mut params: Vec<Param> = Vec::new();
    let mut clauses: Vec<String> = Vec::new();

    if let Some(near) = &query.near {
        let lon = push_param(&mut params, near.longitude);
        let lat = push_param(&mut params, near.latitude);
        let radius = push_param(&mut params, near.max_distance_meters);
        clauses.push(format!(
            "latitude IS NOT NULL AND 2 * {EARTH_RADIUS_METERS:.1} * asin(least(1.0, sqrt(\
             power(sin(radians(latitude - {lat}) / 2), 2) + \
             cos(radians({lat})) * cos(radians(latitude)) * \
             power(sin(radians(longitude - {lon}) / 2), 2)))) <= {radius}"
        ));
    }

    if let Some(text) = &query.text {
        // plainto_tsquery ANDs the terms; rewrite to OR so any term matches.
        let p = push_param(&mut params, text.clone());
        clauses.push(format!(
            "search_vector @@ replace(plainto_tsquery('english', {p})::text, '&', '|')::tsquery"
        ));
    }

    if let Some(prefix) = &query.name_prefix {
        let p = push_param(&mut params, format!("{}%", escape_like(prefix)));
        clauses.push(format!("name ILIKE {p}"));
    }

    let mut sql = format!("SELECT {COLUMNS} FROM electricians");
    if !clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }

    // Byte-order collation so paging matches the in-memory store regardless
    // of the cluster locale.
    let offset = push_param(&mut params, i64::from(query.skip));
    sql.push_str(&format!(" ORDER BY name COLLATE \"C\", seq OFFSET {offset}"));
    if let Some(limit) = query.limit {
        let limit = push_param(&mut params, i64::from(limit));
        sql.push_str(&format!(" LIMIT {limit}"));
    }

    (sql, params)
}

#[async_trait]
impl ElectricianStore for DatabaseConnection {
    async fn list(&self) -> Result<Vec<Electrician>, StoreError> {
        let client = self.pool().get().await?;
        let rows = client
            .query(&format!("SELECT {COLUMNS} FROM electricians ORDER BY seq"), &[])
            .await?;
        rows.iter().map(Electrician::from_row).collect()
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<Electrician>, StoreError> {
        let (sql, params) = build_search(query);
        tracing::debug!("Search SQL: {}", sql);

        let refs: Vec<&(dyn ToSql + Sync)> = params
            .iter()
            .map(|p| p.as_ref() as &(dyn ToSql + Sync))
            .collect();

        let client = self.pool().get().await?;
        let rows = client.query(&sql, &refs).await?;
        rows.iter().map(Electrician::from_row).collect()
    }

    async fn insert(&self, electrician: &Electrician) -> Result<(), StoreError> {
        let longitude = electrician.location.as_ref().map(|l| l.longitude());
        let latitude = electrician.location.as_ref().map(|l| l.latitude());

        let client = self.pool().get().await?;
        client
            .execute(
                "INSERT INTO electricians (id, name, address, longitude, latitude) \
                 VALUES ($1, $2, $3, $4, $5)",
                &[
                    &electrician.id,
                    &electrician.name,
                    &electrician.address,
                    &longitude,
                    &latitude,
                ],
            )
            .await?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let client = self.pool().get().await?;
        let n = client
            .execute("DELETE FROM electricians WHERE id = $1", &[&id])
            .await?;
        Ok(n > 0)
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        self.ping().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::store::{Proximity, DEFAULT_SEARCH_RADIUS_METERS};

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("Jo"), "Jo");
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
    }

    #[test]
    fn test_unfiltered_search_sql() {
        let (sql, params) = build_search(&SearchQuery::default());

        assert_eq!(
            sql,
            "SELECT id, name, address, longitude, latitude FROM electricians \
             ORDER BY name COLLATE \"C\", seq OFFSET $1 LIMIT $2"
        );
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_search_without_limit_sql() {
        let query = SearchQuery {
            skip: 3,
            limit: None,
            ..SearchQuery::default()
        };
        let (sql, params) = build_search(&query);

        assert!(sql.ends_with("ORDER BY name COLLATE \"C\", seq OFFSET $1"));
        assert!(!sql.contains("LIMIT"));
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn test_all_filters_are_anded() {
        let query = SearchQuery {
            skip: 5,
            limit: Some(2),
            text: Some("wiring".to_string()),
            name_prefix: Some("Jo".to_string()),
            near: Some(Proximity {
                longitude: 10.75,
                latitude: 59.91,
                max_distance_meters: DEFAULT_SEARCH_RADIUS_METERS,
            }),
        };
        let (sql, params) = build_search(&query);

        assert_eq!(params.len(), 7);
        assert!(sql.contains("<= $3"));
        assert!(sql.contains("plainto_tsquery('english', $4)"));
        assert!(sql.contains("name ILIKE $5"));
        assert!(sql.ends_with("ORDER BY name COLLATE \"C\", seq OFFSET $6 LIMIT $7"));
        assert_eq!(sql.matches(" AND ").count(), 3);
        assert!(sql.contains("2 * 6371000.0 * asin"));
    }
}
